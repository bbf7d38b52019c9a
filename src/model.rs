use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Distance before the end of a part's lifespan at which an upcoming
/// replacement is reported.
pub const REMINDER_LEAD_KM: i64 = 2000;

/// Fuel type name mapped to the price text scraped from the price page.
pub type FuelPrices = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FuelEntry {
    pub id: i64,
    pub log_date: NaiveDate,
    pub odometer: u32,
    pub liters: f64,
    pub price_per_liter: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PartEntry {
    pub id: i64,
    pub part_name: String,
    pub replacement_date: NaiveDate,
    pub replacement_odometer: u32,
    pub price: f64,
    pub lifespan_km: Option<u32>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPart {
    pub name: String,
    pub odometer: u32,
    pub price: f64,
    pub lifespan_km: Option<u32>,
    pub notes: String,
}

/// Latest replacement of a part that has a lifespan.
#[derive(Debug, sqlx::FromRow)]
pub struct LastReplacement {
    pub part_name: String,
    pub replacement_odometer: u32,
    pub lifespan_km: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostSummary {
    pub total_fuel: f64,
    pub total_parts: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reminder {
    Urgent {
        part_name: String,
        km_since: i64,
        lifespan_km: u32,
    },
    Upcoming {
        part_name: String,
        remaining_km: i64,
    },
}

impl Reminder {
    /// Applies the replacement thresholds to the last replacement of a part.
    pub fn evaluate(
        part_name: &str,
        last_odometer: u32,
        lifespan_km: u32,
        current_odometer: u32,
    ) -> Option<Self> {
        let km_since = i64::from(current_odometer) - i64::from(last_odometer);
        let lifespan = i64::from(lifespan_km);

        if km_since >= lifespan {
            Some(Reminder::Urgent {
                part_name: part_name.to_string(),
                km_since,
                lifespan_km,
            })
        } else if lifespan - km_since <= REMINDER_LEAD_KM {
            Some(Reminder::Upcoming {
                part_name: part_name.to_string(),
                remaining_km: lifespan - km_since,
            })
        } else {
            None
        }
    }

    pub fn part_name(&self) -> &str {
        match self {
            Reminder::Urgent { part_name, .. } | Reminder::Upcoming { part_name, .. } => part_name,
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Reminder::Urgent { .. })
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reminder::Urgent {
                part_name,
                km_since,
                lifespan_km,
            } => write!(
                f,
                "URGENT: replace '{}'. Driven {} km since replacement (lifespan {} km).",
                part_name, km_since, lifespan_km
            ),
            Reminder::Upcoming {
                part_name,
                remaining_km,
            } => write!(
                f,
                "Replacement soon: '{}'. {} km left until scheduled replacement.",
                part_name, remaining_km
            ),
        }
    }
}

/// Rounds a money amount to cents.
///
/// Works on the exact decimal value of the double, ties to even, so
/// `12.094999999999999` becomes `12.09` and `0.125` becomes `0.12`.
pub fn round2(value: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let cents = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    cents.mantissa() as f64 / 10f64.powi(cents.scale() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_upcoming_inside_lead_distance() {
        let reminder = Reminder::evaluate("Oil", 0, 10_000, 8_001).unwrap();
        assert_eq!(
            reminder,
            Reminder::Upcoming {
                part_name: "Oil".to_string(),
                remaining_km: 1_999,
            }
        );
    }

    #[test]
    fn reminder_urgent_at_lifespan() {
        let reminder = Reminder::evaluate("Oil", 0, 10_000, 10_000).unwrap();
        assert!(reminder.is_urgent());
        assert_eq!(
            reminder.to_string(),
            "URGENT: replace 'Oil'. Driven 10000 km since replacement (lifespan 10000 km)."
        );
    }

    #[test]
    fn reminder_none_outside_lead_distance() {
        assert_eq!(Reminder::evaluate("Oil", 0, 10_000, 7_999), None);
    }

    #[test]
    fn reminder_upcoming_at_exact_lead_distance() {
        let reminder = Reminder::evaluate("Belt", 5_000, 60_000, 63_000).unwrap();
        assert_eq!(
            reminder.to_string(),
            "Replacement soon: 'Belt'. 2000 km left until scheduled replacement."
        );
    }

    #[test]
    fn reminder_with_odometer_behind_last_replacement() {
        // A short lifespan still triggers when the entered odometer is stale.
        let reminder = Reminder::evaluate("Wipers", 1_000, 1_000, 500).unwrap();
        assert_eq!(
            reminder,
            Reminder::Upcoming {
                part_name: "Wipers".to_string(),
                remaining_km: 1_500,
            }
        );
        assert_eq!(Reminder::evaluate("Tires", 1_000, 40_000, 500), None);
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(45.667), 45.67);
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(45.667 + 10.004), 55.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn round2_uses_exact_binary_value() {
        // Exact double values sit just below the half-cent.
        assert_eq!(round2(5.9 * 2.05), 12.09);
        assert_eq!(round2(6.1 * 2.05), 12.5);
        assert_eq!(round2(5.1 * 2.45), 12.49);
        assert_eq!(round2(6.095), 6.09);
    }

    #[test]
    fn round2_breaks_exact_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.5), 2.5);
    }
}
