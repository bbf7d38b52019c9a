use std::io::{BufRead, Write};

use log::debug;

use crate::error::ShellError;
use crate::model::NewPart;
use crate::prices::{parse_price, FuelPriceSource};
use crate::store::VehicleStore;

/// Numbered console menu over the expense log.
pub struct Shell<R, W, P> {
    store: VehicleStore,
    prices: P,
    input: R,
    output: W,
    currency: String,
}

impl<R, W, P> Shell<R, W, P>
where
    R: BufRead,
    W: Write,
    P: FuelPriceSource,
{
    pub fn new(
        store: VehicleStore,
        prices: P,
        input: R,
        output: W,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            prices,
            input,
            output,
            currency: currency.into(),
        }
    }

    /// Runs the menu until the user picks `0` or the input ends.
    pub async fn run(&mut self) -> Result<(), ShellError> {
        match self.menu_loop().await {
            Err(ShellError::InputClosed) => {
                debug!("Console input closed, leaving menu");
                Ok(())
            }
            other => other,
        }
    }

    async fn menu_loop(&mut self) -> Result<(), ShellError> {
        loop {
            let odometer = self.store.latest_odometer().await?;
            writeln!(self.output)?;
            writeln!(self.output, "===== Vehicle Expense Tracker =====")?;
            writeln!(self.output, "Last known odometer: {} km", odometer)?;
            writeln!(self.output)?;
            writeln!(self.output, "1. Add fuel entry (with current prices)")?;
            writeln!(self.output, "2. Add part replacement")?;
            writeln!(self.output, "3. Show replacement reminders")?;
            writeln!(self.output, "4. Show cost analysis")?;
            writeln!(self.output, "5. Show history")?;
            writeln!(self.output, "0. Exit")?;

            let choice = self.read_line("\n> ")?;
            match choice.trim() {
                "1" => self.add_fuel().await?,
                "2" => self.add_part().await?,
                "3" => self.show_reminders().await?,
                "4" => self.show_analysis().await?,
                "5" => self.show_history().await?,
                "0" => {
                    writeln!(self.output, "See you on the road!")?;
                    return Ok(());
                }
                other => writeln!(self.output, "Unknown choice '{}', try again.", other)?,
            }
        }
    }

    async fn add_fuel(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "--- Add fuel entry ---")?;
        writeln!(self.output, "Fetching current fuel prices...")?;

        let prices = self.prices.fetch_fuel_prices().await;
        let mut price_per_liter = None;

        if prices.is_empty() {
            writeln!(self.output, "Fuel prices unavailable, enter the price manually.")?;
        } else {
            let options: Vec<(&String, &String)> = prices.iter().collect();
            writeln!(self.output, "\nChoose fuel type:")?;
            for (i, (name, price)) in options.iter().enumerate() {
                writeln!(self.output, "{}. {} - {} {}", i + 1, name, price, self.currency)?;
            }
            writeln!(self.output, "0. Enter price manually")?;

            let choice = self.prompt_u32("\nYour choice: ")? as usize;
            if (1..=options.len()).contains(&choice) {
                let (name, text) = options[choice - 1];
                price_per_liter = parse_price(text);
                if price_per_liter.is_none() {
                    writeln!(self.output, "Cannot read price '{}' for {}.", text, name)?;
                }
            }
        }

        let price_per_liter = match price_per_liter {
            Some(price) => price,
            None => self.prompt_amount("Price per liter: ", false)?,
        };

        let last = self.store.latest_odometer().await?;
        writeln!(self.output, "\nLast known odometer: {} km", last)?;
        let odometer = self.prompt_u32("Current odometer (km): ")?;
        let liters = self.prompt_amount("Liters: ", false)?;

        let total = self
            .store
            .add_fuel_record(odometer, liters, price_per_liter)
            .await?;
        writeln!(self.output, "\nFuel entry added! Total: {:.2} {}", total, self.currency)?;
        Ok(())
    }

    async fn add_part(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "--- Add part replacement ---")?;

        let name = loop {
            let name = self.read_line("Part name (e.g. 'Engine oil' or 'Air filter'): ")?;
            let name = name.trim();
            if !name.is_empty() {
                break name.to_string();
            }
            writeln!(self.output, "Part name cannot be empty.")?;
        };

        let last = self.store.latest_odometer().await?;
        writeln!(self.output, "\nLast known odometer: {} km", last)?;
        let odometer = self.prompt_u32("Odometer at replacement (km): ")?;
        let price = self.prompt_amount("Cost of part and labour: ", true)?;

        let lifespan = self.read_line("Part lifespan in km (leave empty if none): ")?;
        let lifespan_km = lifespan.trim().parse::<u32>().ok().filter(|km| *km > 0);

        let notes = self.read_line("Notes (optional): ")?.trim().to_string();

        let part = NewPart {
            name,
            odometer,
            price,
            lifespan_km,
            notes,
        };
        self.store.add_part_record(&part).await?;
        writeln!(self.output, "\nPart replacement '{}' added!", part.name)?;
        Ok(())
    }

    async fn show_reminders(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "--- Replacement reminders ---")?;

        let last = self.store.latest_odometer().await?;
        writeln!(self.output, "Last known odometer: {} km", last)?;
        let current = self.prompt_u32("CURRENT odometer to check against: ")?;

        let reminders = self.store.reminders(current).await?;
        if reminders.is_empty() {
            writeln!(self.output, "\nNo reminders for now.")?;
        } else {
            writeln!(self.output, "\nAttention:")?;
            for reminder in &reminders {
                writeln!(self.output, "- {}", reminder)?;
            }
        }
        Ok(())
    }

    async fn show_analysis(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "--- Cost analysis ---")?;

        let summary = self.store.full_analysis().await?;
        writeln!(self.output, "\nFuel: {:.2} {}", summary.total_fuel, self.currency)?;
        writeln!(self.output, "Parts and labour: {:.2} {}", summary.total_parts, self.currency)?;
        writeln!(self.output, "{}", "-".repeat(30))?;
        writeln!(self.output, "TOTAL: {:.2} {}", summary.grand_total, self.currency)?;
        Ok(())
    }

    async fn show_history(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "--- History ---")?;

        let fuel = self.store.fuel_history().await?;
        writeln!(self.output, "\nFuel entries: {}", fuel.len())?;
        for entry in &fuel {
            writeln!(
                self.output,
                "{}  {} km  {} l x {} = {:.2} {}",
                entry.log_date,
                entry.odometer,
                entry.liters,
                entry.price_per_liter,
                entry.total_cost,
                self.currency
            )?;
        }

        let parts = self.store.part_history().await?;
        writeln!(self.output, "\nPart replacements: {}", parts.len())?;
        for entry in &parts {
            let lifespan = entry
                .lifespan_km
                .map(|km| format!("lifespan {} km", km))
                .unwrap_or_else(|| "no lifespan".to_string());
            write!(
                self.output,
                "{}  {} km  {}  {:.2} {}  ({})",
                entry.replacement_date,
                entry.replacement_odometer,
                entry.part_name,
                entry.price,
                self.currency,
                lifespan
            )?;
            if entry.notes.is_empty() {
                writeln!(self.output)?;
            } else {
                writeln!(self.output, "  {}", entry.notes)?;
            }
        }
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, ShellError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShellError::InputClosed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn prompt_u32(&mut self, prompt: &str) -> Result<u32, ShellError> {
        loop {
            let line = self.read_line(prompt)?;
            match line.trim().parse::<u32>() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "Error! Please enter a whole non-negative number.")?,
            }
        }
    }

    fn prompt_amount(&mut self, prompt: &str, allow_zero: bool) -> Result<f64, ShellError> {
        loop {
            let line = self.read_line(prompt)?;
            let value = line.trim().replace(',', ".").parse::<f64>().ok();
            match value {
                Some(v) if v.is_finite() && (v > 0.0 || (allow_zero && v == 0.0)) => return Ok(v),
                _ if allow_zero => writeln!(self.output, "Error! Please enter a non-negative number.")?,
                _ => writeln!(self.output, "Error! Please enter a positive number.")?,
            }
        }
    }
}
