use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::crypto;
use crate::db;
use crate::error::{Error, Kind, Result};
use crate::session::{self, NewSession};
use crate::user::{self, NewUser, Profile, User, UserKey};
use crate::validate;

/// Sessions live for seven days from issuance
const SESSION_TTL_SECONDS: i64 = 604_800;

/// A session this close to expiry is already treated as dead, so a request
/// can never start on a session that lapses mid-flight
const EXPIRY_MARGIN_SECONDS: i64 = 60;

const COOKIE_NAME: &str = "session";

/// Session cookie as handed to the transport layer
///
/// Issued with the full session lifetime; cleared with an empty value and
/// Max-Age=0.
#[derive(PartialEq, Debug)]
pub struct SessionCookie {
	pub token: String,
	pub max_age: i64,
}

impl SessionCookie {
	fn issue(token: String) -> Self {
		SessionCookie { token, max_age: SESSION_TTL_SECONDS }
	}

	fn clear() -> Self {
		SessionCookie { token: String::new(), max_age: 0 }
	}

	pub fn header_value(&self) -> String {
		format!(
			"{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
			COOKIE_NAME, self.token, self.max_age
		)
	}
}

/// Pull the session token out of a raw `Cookie` request header
fn session_token(cookie_header: &str) -> Option<&str> {
	cookie_header
		.split(';')
		.map(str::trim)
		.find_map(|pair| pair.strip_prefix(COOKIE_NAME)?.strip_prefix('='))
		.filter(|token| !token.is_empty())
}

#[derive(Deserialize, Debug, Clone)]
pub struct SignupInput {
	pub email: String,
	pub password: String,
	pub first_name: String,
	pub family_name: String,
	pub phone_number: String,
	pub date_of_birth: String,
	pub street: String,
	pub city: String,
	pub state: String,
	pub zip: String,
	pub ssn: String,
}

#[derive(Debug, PartialEq)]
pub struct LogoutOutcome {
	pub success: bool,
	pub message: &'static str,
}

/// Service for signup, login, and request authentication
pub struct AuthService {
	users: user::Repo,
	sessions: session::Repo,
	config: Config,
}

impl AuthService {
	pub fn new(users: user::Repo, sessions: session::Repo, config: Config) -> Self {
		AuthService { users, sessions, config }
	}

	/// Register a new user and log them in
	///
	/// Validation runs over every field before anything is persisted. The
	/// password is hashed, the SSN encrypted; neither ever leaves this
	/// service in readable form.
	pub fn signup(&self, input: &SignupInput) -> Result<(Profile, SessionCookie)> {
		validate::validate_email(&input.email)?;
		validate::validate_password(&input.password)?;
		let date_of_birth = validate::validate_date_of_birth(&input.date_of_birth)?;
		let state = validate::validate_state_code(&input.state)?;
		validate::validate_phone(&input.phone_number)?;
		validate::validate_ssn(&input.ssn)?;

		match self.users.find_user(UserKey::Email(&input.email)) {
			Ok(_) => return Err(Error::conflict("An account with this email already exists")),
			Err(db::Error::RecordNotFound) => {}
			Err(e) => return Err(e.into()),
		}

		let password_hash = crypto::hash_password(&input.password)?;
		let ssn_encrypted = crypto::encrypt_ssn(&input.ssn, &self.config.ssn_secret)?;

		let user = self.users.create_user(NewUser {
			email: &input.email,
			password_hash: &password_hash,
			first_name: &input.first_name,
			family_name: &input.family_name,
			phone_number: &input.phone_number,
			date_of_birth,
			street: &input.street,
			city: &input.city,
			state: &state,
			zip: &input.zip,
			ssn_encrypted: &ssn_encrypted,
		}).map_err(|e| match e {
			db::Error::RecordAlreadyExists =>
				Error::conflict("An account with this email already exists"),
			e => e.into(),
		})?;

		let cookie = self.open_session(&user)?;
		Ok((user.profile(), cookie))
	}

	/// Exchange credentials for a fresh session
	///
	/// Unknown email and wrong password produce the same error, so callers
	/// cannot probe which addresses have accounts. A successful login
	/// revokes every session the user held before this one.
	pub fn login(&self, email: &str, password: &str) -> Result<(Profile, SessionCookie)> {
		let user = match self.users.find_user(UserKey::Email(email)) {
			Ok(user) => user,
			Err(db::Error::RecordNotFound) => return Err(Error::new(Kind::Unauthorized)),
			Err(e) => return Err(e.into()),
		};

		if !crypto::verify_password(password, &user.password_hash) {
			return Err(Error::new(Kind::Unauthorized));
		}

		let cookie = self.open_session(&user)?;
		Ok((user.profile(), cookie))
	}

	/// End the caller's session
	///
	/// Calling without an authenticated session is a soft negative result,
	/// not an error. Reports success only when a session row was actually
	/// deleted.
	pub fn logout(&self, cookie_header: Option<&str>) -> Result<(LogoutOutcome, Option<SessionCookie>)> {
		if self.authenticate(cookie_header).is_none() {
			return Ok((LogoutOutcome { success: false, message: "No active session" }, None));
		}

		// authenticate() succeeded, so the token is present and well formed
		let token = match cookie_header.and_then(session_token) {
			Some(token) => token,
			None => return Ok((LogoutOutcome { success: false, message: "No active session" }, None)),
		};

		let deleted = self.sessions.delete_by_token(token)?;
		let outcome = if deleted > 0 {
			LogoutOutcome { success: true, message: "Logged out" }
		} else {
			LogoutOutcome { success: false, message: "No active session" }
		};

		Ok((outcome, Some(SessionCookie::clear())))
	}

	/// Resolve the identity behind a request, if any
	///
	/// Applied to every request before dispatch. Bad signatures, unknown
	/// tokens, and sessions inside the expiry margin all degrade to `None`;
	/// nothing on this path raises. Expired rows are left in place for the
	/// next login to clean up.
	pub fn authenticate(&self, cookie_header: Option<&str>) -> Option<User> {
		let token = cookie_header.and_then(session_token)?;

		if !crypto::verify_token(token, &self.config.session_secret) {
			return None;
		}

		let session = self.sessions.find_by_token(token).ok()?;

		let remaining = session.expires_at.signed_duration_since(Utc::now());
		if remaining.num_seconds() <= EXPIRY_MARGIN_SECONDS {
			return None;
		}

		self.users.find_user(UserKey::ID(session.user_id)).ok()
	}

	/// Issue a signed token and persist the session behind it, revoking any
	/// session the user already had
	fn open_session(&self, user: &User) -> Result<SessionCookie> {
		self.sessions.delete_for_user(&user.id)?;

		let token = crypto::issue_token(&self.config.session_secret)?;
		self.sessions.create(NewSession {
			token: &token,
			user_id: user.id,
			expires_at: Utc::now() + Duration::seconds(SESSION_TTL_SECONDS),
		})?;

		Ok(SessionCookie::issue(token))
	}
}
