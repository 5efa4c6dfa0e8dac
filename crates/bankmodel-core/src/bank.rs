use std::{fmt, sync::Arc};

use bigdecimal::BigDecimal;
use parking_lot::RwLock;

use crate::{account::Account, error::Result};

pub(crate) struct BankShared {
    name: RwLock<Option<Arc<str>>>,
    accounts: RwLock<Vec<Account>>,
}

/// Handle to a bank and its ordered account collection.
///
/// Accounts point back at the bank through a weak reference, so the bank is
/// dropped once the last `Bank` handle goes away.
#[derive(Clone)]
pub struct Bank {
    shared: Arc<BankShared>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(BankShared {
                name: RwLock::new(None),
                accounts: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn with_name(name: impl Into<Arc<str>>) -> Self {
        let bank = Self::new();
        bank.set_name(name);
        bank
    }

    pub(crate) fn from_shared(shared: Arc<BankShared>) -> Self {
        Self { shared }
    }

    pub fn name(&self) -> Option<Arc<str>> {
        self.shared.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<Arc<str>>) {
        let name = name.into();
        tracing::debug!(bank = %name, "Bank renamed");
        *self.shared.name.write() = Some(name);
    }

    /// Appends `account` and points its back-reference at this bank.
    ///
    /// Adding the same account twice stores it twice.
    pub fn add_account(&self, account: &Account) {
        account.attach(Arc::downgrade(&self.shared));
        self.shared.accounts.write().push(account.clone());
        tracing::debug!(bank = ?self.name(), owner = %account.owner(), "Account added");
    }

    /// Registered accounts in insertion order. The returned handles share
    /// state with the bank's own.
    pub fn accounts(&self) -> Vec<Account> {
        self.shared.accounts.read().clone()
    }

    /// True when this exact account (not merely an equal one) is registered.
    pub fn holds(&self, account: &Account) -> bool {
        self.shared
            .accounts
            .read()
            .iter()
            .any(|a| a.same_account(account))
    }

    pub fn total_balance(&self) -> BigDecimal {
        self.shared
            .accounts
            .read()
            .iter()
            .map(Account::balance)
            .sum()
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// The debit runs first; if it fails the credit is never attempted and
    /// neither balance changes. Neither account needs to be registered here.
    pub fn transfer(&self, from: &Account, to: &Account, amount: &BigDecimal) -> Result<()> {
        from.debit(amount)?;
        to.credit(amount);
        tracing::debug!(
            bank = ?self.name(),
            from = %from.owner(),
            to = %to.owner(),
            %amount,
            "Transfer completed"
        );
        Ok(())
    }

    pub fn same_bank(&self, other: &Bank) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bank")
            .field("name", &self.name())
            .field("accounts", &self.accounts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BankError;
    use bigdecimal::Zero;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_bank_is_unnamed_and_empty() {
        let bank = Bank::new();
        assert!(bank.name().is_none());
        assert!(bank.accounts().is_empty());
        assert!(bank.total_balance().is_zero());
    }

    #[test]
    fn test_set_name() {
        let bank = Bank::new();
        bank.set_name("bienestar");
        assert_eq!(bank.name().as_deref(), Some("bienestar"));
        assert_eq!(Bank::with_name("bienestar").name(), bank.name());
    }

    #[test]
    fn test_add_account_sets_back_reference() {
        let bank = Bank::with_name("bienestar");
        let account = Account::new("emiliano", dec("1000.12345"));
        bank.add_account(&account);

        let owner_bank = account.bank().expect("account should reference its bank");
        assert!(owner_bank.same_bank(&bank));
        assert_eq!(owner_bank.name().as_deref(), Some("bienestar"));
        assert!(bank.holds(&account));
    }

    #[test]
    fn test_back_reference_moves_to_latest_bank() {
        let first = Bank::with_name("first");
        let second = Bank::with_name("second");
        let account = Account::new("emiliano", dec("1"));
        first.add_account(&account);
        second.add_account(&account);

        assert!(account.bank().unwrap().same_bank(&second));
        // No removal from the previous bank's collection.
        assert!(first.holds(&account));
    }

    #[test]
    fn test_back_reference_does_not_keep_bank_alive() {
        let account = Account::new("emiliano", dec("1"));
        {
            let bank = Bank::with_name("temporary");
            bank.add_account(&account);
            assert!(account.bank().is_some());
        }
        assert!(account.bank().is_none());
    }

    #[test]
    fn test_add_same_account_twice() {
        let bank = Bank::new();
        let account = Account::new("emiliano", dec("10"));
        bank.add_account(&account);
        bank.add_account(&account);
        assert_eq!(bank.accounts().len(), 2);
        assert_eq!(bank.total_balance(), dec("20"));
    }

    #[test]
    fn test_accounts_are_live() {
        let bank = Bank::new();
        let account = Account::new("emiliano", dec("10"));
        bank.add_account(&account);
        let listed = bank.accounts();

        account.credit(&dec("5"));
        assert_eq!(listed[0].balance(), dec("15"));
        assert!(listed[0].same_account(&account));
    }

    #[test]
    fn test_holds_uses_identity() {
        let bank = Bank::new();
        bank.add_account(&Account::new("emiliano", dec("10")));
        assert!(!bank.holds(&Account::new("emiliano", dec("10"))));
    }

    #[test]
    fn test_transfer() {
        let bank = Bank::with_name("bienestar");
        let from = Account::new("andres", dec("2000.521"));
        let to = Account::new("emiliano", dec("1000.12345"));

        bank.transfer(&from, &to, &BigDecimal::from(500)).unwrap();

        assert_eq!(from.balance().to_plain_string(), "1500.521");
        assert_eq!(to.balance().to_plain_string(), "1500.12345");
        assert_eq!(from.balance() + to.balance(), dec("3000.64445"));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let bank = Bank::new();
        let from = Account::new("andres", dec("100"));
        let to = Account::new("emiliano", dec("50"));

        let err = bank.transfer(&from, &to, &dec("100.01")).unwrap_err();

        assert_eq!(err, BankError::InsufficientFunds);
        assert_eq!(from.balance(), dec("100"));
        assert_eq!(to.balance(), dec("50"));
    }

    #[test]
    fn test_transfer_conserves_total_beyond_28_digits() {
        let bank = Bank::new();
        let from = Account::new("andres", dec("99999999999999999999999999999999.5"));
        let to = Account::new("emiliano", dec("0.00000000000000000000000000000001"));
        bank.add_account(&from);
        bank.add_account(&to);
        let before = bank.total_balance();

        bank.transfer(&from, &to, &dec("99999999999999999999999999999999")).unwrap();

        assert_eq!(from.balance().to_plain_string(), "0.5");
        assert_eq!(to.balance().to_plain_string(), "99999999999999999999999999999999.00000000000000000000000000000001");
        assert_eq!(bank.total_balance(), before);
    }

    #[test]
    fn test_transfer_to_self_is_neutral() {
        let bank = Bank::new();
        let account = Account::new("emiliano", dec("100"));
        bank.transfer(&account, &account, &dec("60")).unwrap();
        assert_eq!(account.balance(), dec("100"));
    }
}
