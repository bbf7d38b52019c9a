use std::io;

use anyhow::Context;
use dotenv::dotenv;
use log::info;

use vehicle_expense_tracker::{Config, PriceFetcher, Shell, VehicleStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let config = Config::from_env()?;

    let store = VehicleStore::new(&config.database_path);
    store
        .initialize()
        .await
        .with_context(|| format!("failed to open {}", store.path().display()))?;
    info!("Using expense log {}", store.path().display());

    let prices = PriceFetcher::new(&config.prices).context("failed to build HTTP client")?;

    let stdin = io::stdin();
    let mut shell = Shell::new(store, prices, stdin.lock(), io::stdout(), config.currency);
    shell.run().await?;

    Ok(())
}
