//! Personal vehicle expense tracker: fuel and part replacement logs kept in
//! SQLite, maintenance reminders, spending totals and an optional fuel price
//! scraper for pre-filling prices.

pub mod config;
pub mod error;
pub mod model;
pub mod prices;
pub mod shell;
pub mod store;

pub use config::Config;
pub use error::{ConfigError, PriceFetchError, ShellError, StoreError};
pub use model::{CostSummary, FuelEntry, FuelPrices, NewPart, PartEntry, Reminder};
pub use prices::{FuelPriceSource, PriceFetcher};
pub use shell::Shell;
pub use store::VehicleStore;
