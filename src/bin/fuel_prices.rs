//! Prints the current fuel prices scraped from the configured price page.

use dotenv::dotenv;

use vehicle_expense_tracker::prices::PriceFetcher;
use vehicle_expense_tracker::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    let fetcher = PriceFetcher::new(&config.prices)?;

    let prices = fetcher.try_fetch().await?;
    for (fuel, price) in &prices {
        println!("{}: {} {}", fuel, price, config.currency);
    }

    Ok(())
}
