use std::{collections::HashMap, fmt::Display, sync::Arc};

use bankmodel_core::{Account, Bank, BankError, BigDecimal};
use prettytable::{row, Table};

use crate::{
    config::{AccountConfig, Config, TransferConfig},
    error::ScenarioError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Applied,
    Rejected(BankError),
}

impl Display for TransferOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOutcome::Applied => f.write_str("applied"),
            TransferOutcome::Rejected(e) => write!(f, "rejected: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub from: Arc<str>,
    pub to: Arc<str>,
    pub amount: BigDecimal,
    pub outcome: TransferOutcome,
}

/// A bank populated from config, with its accounts addressable by owner.
pub struct Scenario {
    bank: Bank,
    by_owner: HashMap<Arc<str>, Account>,
}

impl Scenario {
    pub fn from_config(config: &Config) -> Result<Self, ScenarioError> {
        let bank = Bank::new();
        if let Some(ref name) = config.bank.name {
            bank.set_name(name.as_str());
        }
        Self::with_accounts(bank, &config.accounts)
    }

    pub fn with_accounts(bank: Bank, accounts: &[AccountConfig]) -> Result<Self, ScenarioError> {
        let mut by_owner = HashMap::new();
        for entry in accounts {
            let owner: Arc<str> = Arc::from(entry.owner.as_str());
            if by_owner.contains_key(&owner) {
                return Err(ScenarioError::DuplicateOwner(entry.owner.clone()));
            }
            let account = Account::new(owner.clone(), entry.balance.clone());
            bank.add_account(&account);
            by_owner.insert(owner, account);
        }

        Ok(Self { bank, by_owner })
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn account(&self, owner: &str) -> Option<&Account> {
        self.by_owner.get(owner)
    }

    fn resolve(&self, owner: &str) -> Result<&Account, ScenarioError> {
        self.account(owner)
            .ok_or_else(|| ScenarioError::UnknownOwner(owner.to_string()))
    }

    /// Applies `transfers` in order.
    ///
    /// Every owner is resolved before any money moves, so an unknown owner
    /// leaves all balances untouched. Transfers rejected for insufficient
    /// funds are reported and the run carries on.
    pub fn run(&self, transfers: &[TransferConfig]) -> Result<Vec<TransferReport>, ScenarioError> {
        let mut resolved = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            resolved.push((self.resolve(&transfer.from)?, self.resolve(&transfer.to)?, &transfer.amount));
        }

        let mut reports = Vec::with_capacity(resolved.len());
        for (from, to, amount) in resolved {
            let outcome = match self.bank.transfer(from, to, amount) {
                Ok(()) => TransferOutcome::Applied,
                Err(e) => {
                    tracing::warn!(from = %from.owner(), to = %to.owner(), %amount, error = %e, "Transfer rejected");
                    TransferOutcome::Rejected(e)
                }
            };
            reports.push(TransferReport {
                from: from.owner(),
                to: to.owner(),
                amount: amount.clone(),
                outcome,
            });
        }

        Ok(reports)
    }

    pub fn balances_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Owner", "Balance"]);
        table.add_empty_row();

        for account in self.bank.accounts() {
            table.add_row(row![account.owner(), account.balance().to_plain_string()]);
        }

        table.add_empty_row();
        table.add_row(row!["Total", self.bank.total_balance().to_plain_string()]);
        table
    }

    pub fn transfers_table(reports: &[TransferReport]) -> Table {
        let mut table = Table::new();
        table.add_row(row!["From", "To", "Amount", "Outcome"]);
        table.add_empty_row();

        for report in reports {
            table.add_row(row![report.from, report.to, report.amount.to_plain_string(), report.outcome]);
        }

        table
    }
}
