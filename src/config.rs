use std::env;

use dotenv::dotenv;
use log::warn;

use crate::error::{Error, Result};

const SESSION_SECRET_VAR: &str = "SESSION_SECRET";
const SSN_SECRET_VAR: &str = "SSN_SECRET";

// Well-known fallbacks, usable only through `Config::insecure()`
const INSECURE_SESSION_SECRET: &str = "insecure-dev-session-secret";
const INSECURE_SSN_SECRET: &str = "insecure-dev-ssn-secret";

/// Process-wide secrets, resolved once at startup and injected into the
/// services that need them
#[derive(Clone)]
pub struct Config {
	/// HMAC key for signing session tokens
	pub session_secret: String,
	/// Symmetric secret the SSN encryption key is derived from
	pub ssn_secret: String,
}

impl Config {
	/// Read both secrets from the environment
	///
	/// Refuses to start when either secret is unset. There is no silent
	/// fallback on this path; dev and test environments that want the
	/// well-known keys must opt in through `Config::insecure()`.
	pub fn from_env() -> Result<Config> {
		dotenv().ok();

		let session_secret = env::var(SESSION_SECRET_VAR)
			.map_err(|_| Error::internal(format!("{} must be set", SESSION_SECRET_VAR)))?;
		let ssn_secret = env::var(SSN_SECRET_VAR)
			.map_err(|_| Error::internal(format!("{} must be set", SSN_SECRET_VAR)))?;

		Ok(Config { session_secret, ssn_secret })
	}

	/// Well-known development keys
	///
	/// Logs loudly on every call so a misconfigured deployment cannot end up
	/// on these keys without trace.
	pub fn insecure() -> Config {
		warn!("using well-known insecure secrets; set {} and {} in production",
			  SESSION_SECRET_VAR, SSN_SECRET_VAR);

		Config {
			session_secret: INSECURE_SESSION_SECRET.to_string(),
			ssn_secret: INSECURE_SSN_SECRET.to_string(),
		}
	}
}
