use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};

pub type Id = uuid::Uuid;
pub type Time = DateTime<Utc>;
pub type Date = NaiveDate;

/// Converts a whole-cents count into an exact two-decimal BigDecimal
///
/// All monetary arithmetic in this crate runs on values built from whole
/// cents, so repeated additions never accumulate binary floating-point
/// drift.
pub fn cents_to_decimal(cents: i64) -> BigDecimal {
	BigDecimal::from(cents) / BigDecimal::from(100)
}

/// Render a monetary value with exactly two decimal places, e.g. `21.00`
pub fn format_amount(amount: &BigDecimal) -> String {
	amount.with_scale(2).to_string()
}
