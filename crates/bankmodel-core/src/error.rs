use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("Insufficient funds")]
    InsufficientFunds,
}

pub type Result<T> = std::result::Result<T, BankError>;
