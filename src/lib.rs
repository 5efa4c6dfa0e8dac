pub mod config;
pub mod error;
pub mod scenario;

pub use bankmodel_core::{Account, Bank, BankError, BigDecimal};
