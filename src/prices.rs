//! Best-effort scraping of current fuel prices.
//!
//! The price page is expected to hold a `<table class="table-price">` whose
//! body rows start with a fuel name cell followed by a price cell. Any
//! deviation from that layout, or any network trouble, yields an empty
//! mapping so callers can fall back to manual price entry.

use async_trait::async_trait;
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};

use crate::config::PriceSourceConfig;
use crate::error::PriceFetchError;
use crate::model::FuelPrices;

const PRICE_TABLE_SELECTOR: &str = "table.table-price";
const BODY_ROW_SELECTOR: &str = "tbody > tr";

/// Anything that can offer current fuel prices to the fuel workflow.
#[async_trait]
pub trait FuelPriceSource {
    /// Returns fuel name to price text, empty when prices are unavailable.
    async fn fetch_fuel_prices(&self) -> FuelPrices;
}

pub struct PriceFetcher {
    client: reqwest::Client,
    url: String,
}

impl PriceFetcher {
    pub fn new(config: &PriceSourceConfig) -> Result<Self, PriceFetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Downloads and parses the price page, reporting why no prices came back.
    pub async fn try_fetch(&self) -> Result<FuelPrices, PriceFetchError> {
        info!("Fetching fuel prices from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PriceFetchError::Status(status));
        }

        let body = response.text().await?;
        debug!("Downloaded {} bytes of price page", body.len());

        let prices = parse_price_table(&body)?;
        if prices.is_empty() {
            return Err(PriceFetchError::NoRows);
        }
        Ok(prices)
    }
}

#[async_trait]
impl FuelPriceSource for PriceFetcher {
    async fn fetch_fuel_prices(&self) -> FuelPrices {
        match self.try_fetch().await {
            Ok(prices) => {
                info!("Fetched {} fuel prices", prices.len());
                prices
            }
            Err(e) => {
                warn!("Could not fetch fuel prices: {}", e);
                FuelPrices::new()
            }
        }
    }
}

/// Extracts `name -> price` pairs from the price table in `html`.
///
/// Rows with fewer than two cells or an empty name or price are skipped. A
/// name seen twice keeps the price of its last row.
pub fn parse_price_table(html: &str) -> Result<FuelPrices, PriceFetchError> {
    let table_selector = selector(PRICE_TABLE_SELECTOR)?;
    let row_selector = selector(BODY_ROW_SELECTOR)?;

    let document = Html::parse_document(html);
    let table = document
        .select(&table_selector)
        .next()
        .ok_or(PriceFetchError::TableMissing)?;

    let mut prices = FuelPrices::new();
    for row in table.select(&row_selector) {
        let mut cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| cell.value().name() == "td");

        let (Some(name), Some(price)) = (cells.next(), cells.next()) else {
            continue;
        };
        let name = cell_text(name);
        let price = cell_text(price);
        if !name.is_empty() && !price.is_empty() {
            prices.insert(name, price);
        }
    }

    Ok(prices)
}

fn selector(css: &str) -> Result<Selector, PriceFetchError> {
    Selector::parse(css).map_err(|e| PriceFetchError::Selector(format!("{}: {}", css, e)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parses scraped price text such as `2.36` or `2,36`.
pub fn parse_price(text: &str) -> Option<f64> {
    let price = text.trim().replace(',', ".").parse::<f64>().ok()?;
    (price.is_finite() && price > 0.0).then_some(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE_PAGE: &str = r#"
        <html><body>
          <table class="table table-price">
            <thead><tr><th>Fuel</th><th>Price, BYN</th></tr></thead>
            <tbody>
              <tr><td> AI-92-K5-Euro </td><td> 2.36 </td></tr>
              <tr><td>AI-95-K5-Euro</td><td>2.51</td></tr>
              <tr><td>DT-K5</td><td>2.51</td><td>note</td></tr>
            </tbody>
          </table>
        </body></html>
    "#;

    #[test]
    fn parses_name_and_price_columns() {
        let prices = parse_price_table(PRICE_PAGE).unwrap();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices["AI-92-K5-Euro"], "2.36");
        assert_eq!(prices["AI-95-K5-Euro"], "2.51");
        assert_eq!(prices["DT-K5"], "2.51");
    }

    #[test]
    fn missing_table_is_reported() {
        let html = "<html><body><table class=\"other\"><tr><td>A</td><td>1</td></tr></table></body></html>";
        assert!(matches!(
            parse_price_table(html),
            Err(PriceFetchError::TableMissing)
        ));
    }

    #[test]
    fn later_rows_overwrite_earlier_names() {
        let html = r#"
            <table class="table-price"><tbody>
              <tr><td>AI-92</td><td>2.30</td></tr>
              <tr><td>AI-92</td><td>2.36</td></tr>
            </tbody></table>
        "#;
        let prices = parse_price_table(html).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices["AI-92"], "2.36");
    }

    #[test]
    fn skips_short_and_blank_rows() {
        let html = r#"
            <table class="table-price"><tbody>
              <tr><td>Only name</td></tr>
              <tr><td>  </td><td>2.10</td></tr>
              <tr><td>Gas</td><td></td></tr>
              <tr><td>LPG</td><td>1.20</td></tr>
            </tbody></table>
        "#;
        let prices = parse_price_table(html).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices["LPG"], "1.20");
    }

    #[test]
    fn parse_price_accepts_comma_decimal() {
        assert_eq!(parse_price("2,36"), Some(2.36));
        assert_eq!(parse_price(" 2.51 "), Some(2.51));
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("0"), None);
    }
}
