use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

use bigdecimal::BigDecimal;
use parking_lot::RwLock;

use crate::{
    bank::{Bank, BankShared},
    error::{BankError, Result},
};

struct AccountState {
    owner: Arc<str>,
    balance: BigDecimal,
    bank: Weak<BankShared>,
}

/// Handle to one owner's balance.
///
/// Cloning an `Account` shares the underlying state: a debit made through one
/// clone is visible through every other clone, including the ones held by a
/// [`Bank`]. Equality and hashing look at the owner and balance only, so two
/// independently opened accounts with the same values compare equal.
///
/// Balances are unbounded decimals. Addition and subtraction keep every digit
/// of both operands and never overflow.
#[derive(Clone)]
pub struct Account {
    state: Arc<RwLock<AccountState>>,
}

impl Account {
    pub fn new(owner: impl Into<Arc<str>>, balance: BigDecimal) -> Self {
        Self {
            state: Arc::new(RwLock::new(AccountState {
                owner: owner.into(),
                balance,
                bank: Weak::new(),
            })),
        }
    }

    pub fn owner(&self) -> Arc<str> {
        self.state.read().owner.clone()
    }

    pub fn balance(&self) -> BigDecimal {
        self.state.read().balance.clone()
    }

    /// Overwrites the balance without any validation.
    pub fn set_balance(&self, balance: BigDecimal) {
        self.state.write().balance = balance;
    }

    /// Withdraws `amount`, refusing to take the balance below zero.
    ///
    /// On failure the balance is left untouched.
    pub fn debit(&self, amount: &BigDecimal) -> Result<()> {
        let mut state = self.state.write();
        if *amount > state.balance {
            tracing::warn!(owner = %state.owner, %amount, balance = %state.balance, "Debit rejected");
            return Err(BankError::InsufficientFunds);
        }
        state.balance = &state.balance - amount;
        tracing::debug!(owner = %state.owner, %amount, balance = %state.balance, "Account debited");
        Ok(())
    }

    /// Deposits `amount`. The sign is not checked, so a negative amount
    /// lowers the balance without the overdraft check `debit` applies.
    pub fn credit(&self, amount: &BigDecimal) {
        let mut state = self.state.write();
        state.balance = &state.balance + amount;
        tracing::debug!(owner = %state.owner, %amount, balance = %state.balance, "Account credited");
    }

    /// The bank this account was last added to, if it is still alive.
    pub fn bank(&self) -> Option<Bank> {
        self.state.read().bank.upgrade().map(Bank::from_shared)
    }

    pub(crate) fn attach(&self, bank: Weak<BankShared>) {
        self.state.write().bank = bank;
    }

    /// True when both handles point at the same account, regardless of value.
    pub fn same_account(&self, other: &Account) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        if self.same_account(other) {
            return true;
        }
        // Never hold both locks at once.
        let (owner, balance) = {
            let left = self.state.read();
            (left.owner.clone(), left.balance.clone())
        };
        let right = other.state.read();
        owner == right.owner && balance == right.balance
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let inner = self.state.read();
        inner.owner.hash(state);
        inner.balance.hash(state);
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Account")
            .field("owner", &state.owner)
            .field("balance", &state.balance.to_plain_string())
            .finish()
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        write!(f, "{}: {}", state.owner, state.balance.to_plain_string())
    }
}
