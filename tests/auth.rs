use chrono::{Duration, Utc};

use demobank::*;

use crate::common::{cookie_header, signup_input, Fixture, Suite};

mod common;

#[test]
fn signup_creates_user_and_session() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let auth = f.auth_service();

	let (profile, cookie) = auth.signup(&signup_input("bob@gmail.com")).unwrap();

	assert_eq!(profile.email, "bob@gmail.com");
	assert_eq!(profile.state, "NY");
	assert_eq!(cookie.max_age, 604_800);

	// the persisted user carries a hash and an encrypted SSN, never the raw values
	let user = suite.user_repo.find_user(UserKey::Email("bob@gmail.com")).unwrap();
	assert_ne!(user.password_hash, "Str0ng!pass");
	assert_ne!(user.ssn_encrypted, "123456789");
	assert!(user.ssn_encrypted.contains(':'));

	let authenticated = auth.authenticate(Some(&cookie_header(&cookie))).unwrap();
	assert_eq!(authenticated.id, user.id);
}

#[test]
fn signup_rejects_duplicate_email() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let auth = f.auth_service();

	auth.signup(&signup_input("dup@gmail.com")).unwrap();
	let err = auth.signup(&signup_input("dup@gmail.com")).unwrap_err();

	assert_eq!(
		err,
		Error::conflict("An account with this email already exists")
	);
}

#[test]
fn signup_validates_before_persisting() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let auth = f.auth_service();

	let mut input = signup_input("teen@gmail.com");
	let today = Utc::today().naive_utc();
	input.date_of_birth = format!("{}", today - Duration::days(17 * 365));

	let err = auth.signup(&input).unwrap_err();
	assert_eq!(err, Error::validation("You must be at least 18 years old"));

	// nothing was written
	let found = suite.user_repo.find_user(UserKey::Email("teen@gmail.com"));
	assert!(found.is_err());
}

#[test]
fn login_does_not_reveal_which_credential_failed() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let auth = f.auth_service();

	auth.signup(&signup_input("carol@gmail.com")).unwrap();

	let unknown_email = auth.login("nobody@gmail.com", "Str0ng!pass").unwrap_err();
	let wrong_password = auth.login("carol@gmail.com", "Wr0ng!pass").unwrap_err();

	assert_eq!(unknown_email, Error::new(Kind::Unauthorized));
	assert_eq!(wrong_password, unknown_email);
}

#[test]
fn second_login_revokes_first_session() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let auth = f.auth_service();

	let (_, first) = auth.signup(&signup_input("dave@gmail.com")).unwrap();
	assert!(auth.authenticate(Some(&cookie_header(&first))).is_some());

	// "second device"
	let (_, second) = auth.login("dave@gmail.com", "Str0ng!pass").unwrap();

	assert!(auth.authenticate(Some(&cookie_header(&first))).is_none());
	assert!(auth.authenticate(Some(&cookie_header(&second))).is_some());
}

#[test]
fn session_expiry_has_a_safety_margin() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let auth = f.auth_service();

	let user = f.user_factory.bob();

	// 30 seconds of lifetime left: inside the margin, treated as expired
	let token = crypto::issue_token(&f.config.session_secret).unwrap();
	suite.session_repo.create(NewSession {
		token: &token,
		user_id: user.id,
		expires_at: Utc::now() + Duration::seconds(30),
	}).unwrap();

	let header = format!("session={}", token);
	assert!(auth.authenticate(Some(&header)).is_none());

	// the row is left in place for the next login to clean up
	assert!(suite.session_repo.find_by_token(&token).is_ok());

	// 120 seconds of lifetime left: outside the margin, still valid
	let token = crypto::issue_token(&f.config.session_secret).unwrap();
	suite.session_repo.create(NewSession {
		token: &token,
		user_id: user.id,
		expires_at: Utc::now() + Duration::seconds(120),
	}).unwrap();

	let header = format!("session={}", token);
	assert_eq!(auth.authenticate(Some(&header)).unwrap().id, user.id);
}

#[test]
fn unsigned_token_never_authenticates() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let auth = f.auth_service();

	let user = f.user_factory.lucy();

	// a session row whose token was not signed by us
	suite.session_repo.create(NewSession {
		token: "forged-token",
		user_id: user.id,
		expires_at: Utc::now() + Duration::days(7),
	}).unwrap();

	assert!(auth.authenticate(Some("session=forged-token")).is_none());
}

#[test]
fn logout_without_session_is_soft_failure() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let auth = f.auth_service();

	let (outcome, cookie) = auth.logout(None).unwrap();

	assert!(!outcome.success);
	assert_eq!(outcome.message, "No active session");
	assert!(cookie.is_none());
}

#[test]
fn logout_deletes_the_session_and_clears_the_cookie() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let auth = f.auth_service();

	let (_, session_cookie) = auth.signup(&signup_input("eve@gmail.com")).unwrap();
	let header = cookie_header(&session_cookie);

	let (outcome, cleared) = auth.logout(Some(&header)).unwrap();
	assert!(outcome.success);

	let cleared = cleared.unwrap();
	assert_eq!(cleared.token, "");
	assert_eq!(cleared.max_age, 0);

	// the token is dead; a second logout finds nothing
	assert!(auth.authenticate(Some(&header)).is_none());
	let (outcome, _) = auth.logout(Some(&header)).unwrap();
	assert!(!outcome.success);
}
