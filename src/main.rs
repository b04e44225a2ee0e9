use std::env;
use std::sync::Arc;

use log::*;
use pretty_env_logger;
use warp::filters::log::Info;
use warp::Filter;

use demobank::{account, api, auth::AuthService, bank::BankService, config::Config, db, session, transaction, user};

#[tokio::main]
async fn main() {
	env::set_var("RUST_LOG", "debug");
	pretty_env_logger::init();

	let config = if env::var("DEMOBANK_INSECURE").is_ok() {
		Config::insecure()
	} else {
		Config::from_env().expect("SESSION_SECRET and SSN_SECRET must be set")
	};

	let pool = db::pg_connection();
	let auth = Arc::new(AuthService::new(
		user::Repo::new(pool.clone()),
		session::Repo::new(pool.clone()),
		config,
	));
	let bank = Arc::new(BankService::new(
		account::Repo::new(pool.clone()),
		transaction::Repo::new(pool),
	));

	let log = warp::log::custom(|info: Info| {
		info!(
			target: "demobank::api",
			"\"{} {} {:?}\" \t{} {} {:?}",
			info.method(),
			info.path(),
			info.version(),
			info.status().canonical_reason().unwrap_or_else(|| "-"),
			info.status().as_u16(),
			info.elapsed(),
		);
	});

	let routes = api::routes(auth, bank).with(log);
	warp::serve(routes).run(([127, 0, 0, 1], 3030)).await;
}
