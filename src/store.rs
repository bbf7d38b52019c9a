use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};

use crate::error::StoreError;
use crate::model::{round2, CostSummary, FuelEntry, LastReplacement, NewPart, PartEntry, Reminder};

/// Append-only log of fuel purchases and part replacements, kept in a
/// single SQLite file.
///
/// Every operation opens its own connection and closes it before
/// returning, so at most one handle is open per call.
#[derive(Debug, Clone)]
pub struct VehicleStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl VehicleStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        Self { path, options }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        Ok(self.options.connect().await?)
    }

    /// Creates both tables if they do not exist yet.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fuel_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                log_date DATE NOT NULL,
                odometer INTEGER NOT NULL,
                liters REAL NOT NULL,
                price_per_liter REAL NOT NULL,
                total_cost REAL NOT NULL
            )
            "#,
        )
        .execute(&mut conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parts_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                part_name TEXT NOT NULL,
                replacement_date DATE NOT NULL,
                replacement_odometer INTEGER NOT NULL,
                price REAL NOT NULL,
                lifespan_km INTEGER,
                notes TEXT
            )
            "#,
        )
        .execute(&mut conn)
        .await?;

        conn.close().await?;
        debug!("Expense log ready at {}", self.path.display());
        Ok(())
    }

    /// Records a refuel dated today and returns its total cost.
    pub async fn add_fuel_record(
        &self,
        odometer: u32,
        liters: f64,
        price_per_liter: f64,
    ) -> Result<f64, StoreError> {
        if !(liters.is_finite() && liters > 0.0) {
            return Err(StoreError::InvalidInput(format!(
                "liters must be positive, got {}",
                liters
            )));
        }
        if !(price_per_liter.is_finite() && price_per_liter > 0.0) {
            return Err(StoreError::InvalidInput(format!(
                "price per liter must be positive, got {}",
                price_per_liter
            )));
        }

        let total_cost = round2(liters * price_per_liter);

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO fuel_log (log_date, odometer, liters, price_per_liter, total_cost)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Local::now().date_naive())
        .bind(odometer)
        .bind(liters)
        .bind(price_per_liter)
        .bind(total_cost)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        conn.close().await?;

        info!(
            "Fuel entry added: {} km, {} l at {} = {}",
            odometer, liters, price_per_liter, total_cost
        );
        Ok(total_cost)
    }

    /// Records a part replacement dated today.
    pub async fn add_part_record(&self, part: &NewPart) -> Result<(), StoreError> {
        let name = part.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput(
                "part name must not be empty".to_string(),
            ));
        }
        if !(part.price.is_finite() && part.price >= 0.0) {
            return Err(StoreError::InvalidInput(format!(
                "part price must not be negative, got {}",
                part.price
            )));
        }
        if part.lifespan_km == Some(0) {
            return Err(StoreError::InvalidInput(
                "lifespan must be positive when given".to_string(),
            ));
        }

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO parts_log
            (part_name, replacement_date, replacement_odometer, price, lifespan_km, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(Local::now().date_naive())
        .bind(part.odometer)
        .bind(part.price)
        .bind(part.lifespan_km)
        .bind(&part.notes)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        conn.close().await?;

        info!("Part replacement added: '{}' at {} km", name, part.odometer);
        Ok(())
    }

    /// Highest odometer reading in either log, or 0 when both are empty.
    pub async fn latest_odometer(&self) -> Result<u32, StoreError> {
        let mut conn = self.connect().await?;

        let fuel = sqlx::query_scalar::<_, Option<u32>>("SELECT MAX(odometer) FROM fuel_log")
            .fetch_one(&mut conn)
            .await?;
        let parts = sqlx::query_scalar::<_, Option<u32>>(
            "SELECT MAX(replacement_odometer) FROM parts_log",
        )
        .fetch_one(&mut conn)
        .await?;

        conn.close().await?;
        Ok(fuel.unwrap_or(0).max(parts.unwrap_or(0)))
    }

    /// Replacement reminders for every part with a lifespan, judged by the
    /// part's replacement at the highest odometer. Sorted by part name.
    pub async fn reminders(&self, current_odometer: u32) -> Result<Vec<Reminder>, StoreError> {
        let mut conn = self.connect().await?;

        // SQLite takes the bare lifespan_km column from the row holding the MAX.
        let latest = sqlx::query_as::<_, LastReplacement>(
            r#"
            SELECT part_name, MAX(replacement_odometer) AS replacement_odometer, lifespan_km
            FROM parts_log
            WHERE lifespan_km IS NOT NULL
            GROUP BY part_name
            ORDER BY part_name
            "#,
        )
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;

        Ok(latest
            .iter()
            .filter_map(|part| {
                Reminder::evaluate(
                    &part.part_name,
                    part.replacement_odometer,
                    part.lifespan_km,
                    current_odometer,
                )
            })
            .collect())
    }

    /// Total spending on fuel and parts.
    pub async fn full_analysis(&self) -> Result<CostSummary, StoreError> {
        let mut conn = self.connect().await?;

        let fuel = sqlx::query_scalar::<_, f64>("SELECT TOTAL(total_cost) FROM fuel_log")
            .fetch_one(&mut conn)
            .await?;
        let parts = sqlx::query_scalar::<_, f64>("SELECT TOTAL(price) FROM parts_log")
            .fetch_one(&mut conn)
            .await?;

        conn.close().await?;

        Ok(CostSummary {
            total_fuel: round2(fuel),
            total_parts: round2(parts),
            grand_total: round2(fuel + parts),
        })
    }

    pub async fn fuel_history(&self) -> Result<Vec<FuelEntry>, StoreError> {
        let mut conn = self.connect().await?;
        let entries = sqlx::query_as::<_, FuelEntry>(
            r#"
            SELECT id, log_date, odometer, liters, price_per_liter, total_cost
            FROM fuel_log
            ORDER BY id
            "#,
        )
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(entries)
    }

    pub async fn part_history(&self) -> Result<Vec<PartEntry>, StoreError> {
        let mut conn = self.connect().await?;
        let entries = sqlx::query_as::<_, PartEntry>(
            r#"
            SELECT id, part_name, replacement_date, replacement_odometer, price, lifespan_km,
                   COALESCE(notes, '') AS notes
            FROM parts_log
            ORDER BY id
            "#,
        )
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(entries)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::VehicleStore;
    use tempfile::TempDir;

    /// Initialized store in a fresh temp directory. Keep the `TempDir` alive
    /// for as long as the store is used.
    pub async fn temp_store() -> (TempDir, VehicleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join("car_data.db"));
        store.initialize().await.unwrap();
        (dir, store)
    }
}
