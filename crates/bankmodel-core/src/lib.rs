//! Core domain model for bankmodel.
//!
//! An [`Account`] is a shared handle over one owner's exact decimal balance.
//! A [`Bank`] keeps an ordered collection of those handles and moves funds
//! between accounts with overdraft protection.

pub mod account;
pub mod bank;
pub mod error;

// Re-export key types at crate root for convenience
pub use account::Account;
pub use bank::Bank;
pub use error::{BankError, Result};
pub use bigdecimal::BigDecimal;
