use std::fmt;

use crate::db;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while serving a banking operation
#[derive(Debug, PartialEq)]
pub struct Error {
	kind: Kind,
}

impl Error {
	pub fn new(kind: Kind) -> Error {
		Error { kind }
	}

	pub fn kind(&self) -> &Kind {
		&self.kind
	}

	pub fn validation(msg: impl Into<String>) -> Error {
		Error::new(Kind::Validation(msg.into()))
	}

	pub fn conflict(msg: impl Into<String>) -> Error {
		Error::new(Kind::Conflict(msg.into()))
	}

	pub fn internal(msg: impl Into<String>) -> Error {
		Error::new(Kind::Internal(msg.into()))
	}
}

/// The kind of an error that can occur.
///
/// Ownership failures surface as `NotFound` so callers cannot distinguish
/// "someone else's account" from "no such account". Credential failures
/// surface as `Unauthorized` with a single message regardless of whether
/// the email or the password was wrong.
#[derive(Debug, PartialEq)]
pub enum Kind {
	/// Malformed or policy-violating input; the message names the exact rule
	Validation(String),
	/// Duplicate email, duplicate account type
	Conflict(String),
	/// Bad credentials or a missing/expired session
	Unauthorized,
	/// Resource absent, or present but not owned by the caller
	NotFound,
	/// Persistence failed after a successful precondition check
	Internal(String),
	Database(db::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			Kind::Validation(msg) => write!(f, "{}", msg),
			Kind::Conflict(msg) => write!(f, "{}", msg),
			Kind::Unauthorized => write!(f, "Invalid email or password"),
			Kind::NotFound => write!(f, "Account not found"),
			Kind::Internal(msg) => write!(f, "internal error: {}", msg),
			Kind::Database(e) => write!(f, "db error: {}", e),
		}
	}
}

impl std::error::Error for Error {}

impl From<db::Error> for Error {
	fn from(e: db::Error) -> Self {
		match e {
			db::Error::RecordNotFound => Error::new(Kind::NotFound),
			db::Error::RecordAlreadyExists => Error::conflict("record already exists"),
			_ => Error::new(Kind::Database(e)),
		}
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		Error::from(db::Error::from(e))
	}
}

impl From<r2d2::Error> for Error {
	fn from(e: r2d2::Error) -> Self {
		Error::new(Kind::Database(db::Error::from(e)))
	}
}
