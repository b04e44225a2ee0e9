use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::cents_to_decimal;

/// US state and territory postal codes
const STATE_CODES: [&str; 56] = [
	"AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA",
	"HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD",
	"MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
	"NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC",
	"SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
	"DC", "PR", "GU", "VI", "AS", "MP",
];

/// Top-level domain endings that are almost always transcription errors
const EMAIL_TYPO_TLDS: [&str; 3] = [".con", ".cm", ".om"];

const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

const MIN_FUNDING_CENTS: i64 = 1;
const MAX_FUNDING_CENTS: i64 = 1_000_000;

pub fn validate_email(email: &str) -> Result<()> {
	let mut parts = email.splitn(2, '@');
	let local = parts.next().unwrap_or("");
	let domain = parts.next().unwrap_or("");

	let syntactically_valid = !local.is_empty()
		&& !domain.is_empty()
		&& !email.contains(char::is_whitespace)
		&& domain.contains('.')
		&& !domain.starts_with('.')
		&& !domain.ends_with('.')
		&& !domain.contains("..");

	if !syntactically_valid {
		return Err(Error::validation("Invalid email address"));
	}

	let lower = email.to_ascii_lowercase();
	if EMAIL_TYPO_TLDS.iter().any(|tld| lower.ends_with(tld)) || lower.contains(".co.") {
		return Err(Error::validation("Possible email typo detected."));
	}

	Ok(())
}

/// Password policy; the first unmet rule wins
pub fn validate_password(password: &str) -> Result<()> {
	if password.len() < 8 {
		return Err(Error::validation("Password must be at least 8 characters"));
	}
	if !password.chars().any(|c| c.is_ascii_uppercase()) {
		return Err(Error::validation("Password must contain an uppercase letter"));
	}
	if !password.chars().any(|c| c.is_ascii_lowercase()) {
		return Err(Error::validation("Password must contain a lowercase letter"));
	}
	if !password.chars().any(|c| c.is_ascii_digit()) {
		return Err(Error::validation("Password must contain a number"));
	}
	if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
		return Err(Error::validation("Password must contain a symbol"));
	}

	Ok(())
}

/// Parse a `YYYY-MM-DD` date of birth and check the holder is an adult
///
/// Age is calendar-accurate: a birthday later in the current year has not
/// happened yet.
pub fn validate_date_of_birth(date_of_birth: &str) -> Result<NaiveDate> {
	let dob = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d")
		.map_err(|_| Error::validation("Invalid date of birth"))?;

	let today = Utc::today().naive_utc();
	if dob > today {
		return Err(Error::validation("Date of birth cannot be in the future"));
	}

	let mut age = today.year() - dob.year();
	if (today.month(), today.day()) < (dob.month(), dob.day()) {
		age -= 1;
	}

	if age < 18 {
		return Err(Error::validation("You must be at least 18 years old"));
	}

	Ok(dob)
}

/// Check a two-letter US state or territory code, returning it uppercased
pub fn validate_state_code(state: &str) -> Result<String> {
	let normalized = state.trim().to_ascii_uppercase();

	if normalized.len() != 2 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
		return Err(Error::validation("Invalid state code"));
	}
	if !STATE_CODES.contains(&normalized.as_str()) {
		return Err(Error::validation("Invalid state code"));
	}

	Ok(normalized)
}

/// Ten digits, with an optional `+1` or `1` country prefix
pub fn validate_phone(phone: &str) -> Result<()> {
	let rest = if let Some(stripped) = phone.strip_prefix("+1") {
		stripped
	} else if phone.len() == 11 {
		phone.strip_prefix('1').unwrap_or(phone)
	} else {
		phone
	};

	if rest.len() != 10 || !rest.chars().all(|c| c.is_ascii_digit()) {
		return Err(Error::validation("Phone number must be 10 digits"));
	}

	Ok(())
}

/// Format check only; there is no checksum to verify on an SSN
pub fn validate_ssn(ssn: &str) -> Result<()> {
	if ssn.len() != 9 || !ssn.chars().all(|c| c.is_ascii_digit()) {
		return Err(Error::validation("SSN must be 9 digits"));
	}

	Ok(())
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CardNetwork {
	Visa,
	Mastercard,
	Amex,
	Discover,
}

impl CardNetwork {
	pub fn as_str(&self) -> &str {
		match self {
			CardNetwork::Visa => "Visa",
			CardNetwork::Mastercard => "Mastercard",
			CardNetwork::Amex => "American Express",
			CardNetwork::Discover => "Discover",
		}
	}
}

/// Detect the card network from its fixed prefix and length
///
/// An unrecognized prefix means the number is rejected before the checksum
/// is even looked at.
pub fn detect_network(card_number: &str) -> Option<CardNetwork> {
	let digits = card_number;
	if !digits.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}

	let len = digits.len();
	let visa = digits.starts_with('4') && (len == 13 || len == 16);
	if visa {
		return Some(CardNetwork::Visa);
	}

	let mastercard = len == 16
		&& digits.starts_with('5')
		&& matches!(digits.as_bytes()[1], b'1'..=b'5');
	if mastercard {
		return Some(CardNetwork::Mastercard);
	}

	let amex = len == 15 && (digits.starts_with("34") || digits.starts_with("37"));
	if amex {
		return Some(CardNetwork::Amex);
	}

	let discover = len == 16
		&& (digits.starts_with("6011")
			|| (digits.starts_with("65"))
			|| (digits.starts_with("64") && matches!(digits.as_bytes()[2], b'4'..=b'9')));
	if discover {
		return Some(CardNetwork::Discover);
	}

	None
}

/// Luhn checksum: double every second digit from the right, subtract 9 from
/// anything above 9, and require the sum to be divisible by 10
pub fn is_valid_luhn(card_number: &str) -> bool {
	if card_number.is_empty() || !card_number.chars().all(|c| c.is_ascii_digit()) {
		return false;
	}

	let sum: u32 = card_number
		.bytes()
		.rev()
		.enumerate()
		.map(|(i, b)| {
			let digit = (b - b'0') as u32;
			if i % 2 == 1 {
				let doubled = digit * 2;
				if doubled > 9 { doubled - 9 } else { doubled }
			} else {
				digit
			}
		})
		.sum();

	sum % 10 == 0
}

/// Full card-number check: network detection first, then the Luhn checksum
pub fn validate_card_number(card_number: &str) -> Result<CardNetwork> {
	let network = detect_network(card_number)
		.ok_or_else(|| Error::validation("Unsupported card network"))?;

	if !is_valid_luhn(card_number) {
		return Err(Error::validation("Invalid card number"));
	}

	Ok(network)
}

pub fn validate_routing_number(routing_number: &str) -> Result<()> {
	if routing_number.len() != 9 || !routing_number.chars().all(|c| c.is_ascii_digit()) {
		return Err(Error::validation("Routing number must be 9 digits"));
	}

	Ok(())
}

#[derive(Debug, PartialEq, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
	Card,
	Bank,
}

/// Where funding money comes from, as supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct FundingSource {
	pub source_type: SourceType,
	pub card_number: Option<String>,
	pub routing_number: Option<String>,
	pub account_number: Option<String>,
}

/// Validate a funding source before any storage is touched
///
/// Returns the detected card network for card sources, `None` for bank
/// sources.
pub fn validate_funding_source(source: &FundingSource) -> Result<Option<CardNetwork>> {
	match source.source_type {
		SourceType::Card => {
			let card_number = source
				.card_number
				.as_deref()
				.ok_or_else(|| Error::validation("Card number is required"))?;
			validate_card_number(card_number).map(Some)
		}
		SourceType::Bank => {
			let routing_number = source
				.routing_number
				.as_deref()
				.ok_or_else(|| Error::validation("Routing number must be 9 digits"))?;
			validate_routing_number(routing_number)?;

			if source.account_number.as_deref().map_or(true, str::is_empty) {
				return Err(Error::validation("Bank account number is required"));
			}

			Ok(None)
		}
	}
}

/// Round a funding amount to whole cents and bounds-check it
///
/// The cents value is computed as `round(amount * 100)` with ties going
/// away from zero, then carried exactly from there on.
pub fn normalize_amount(amount: f64) -> Result<BigDecimal> {
	if !amount.is_finite() {
		return Err(Error::validation("Amount must be between $0.01 and $10,000"));
	}

	let cents = (amount * 100.0).round() as i64;
	if cents < MIN_FUNDING_CENTS || cents > MAX_FUNDING_CENTS {
		return Err(Error::validation("Amount must be between $0.01 and $10,000"));
	}

	Ok(cents_to_decimal(cents))
}
