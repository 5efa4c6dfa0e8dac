use bankmodel::config::{CliArgs, Config, LoggingConfig};
use bankmodel::error::Result;
use bankmodel::scenario::{Scenario, TransferOutcome};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli)?;
    init_tracing(&config.logging);

    let scenario = Scenario::from_config(&config)?;
    tracing::info!(
        bank = ?scenario.bank().name(),
        accounts = config.accounts.len(),
        transfers = config.transfers.len(),
        "Scenario loaded"
    );

    let reports = scenario.run(&config.transfers)?;
    let rejected = reports
        .iter()
        .filter(|r| r.outcome != TransferOutcome::Applied)
        .count();
    tracing::info!(applied = reports.len() - rejected, rejected, "Transfers finished");

    if !reports.is_empty() {
        println!("{}", Scenario::transfers_table(&reports));
    }
    println!("{}", scenario.balances_table());

    Ok(())
}
