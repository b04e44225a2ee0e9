use std::convert::Infallible;
use std::sync::Arc;

use log::error;
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::account::{AccountType, AccountView};
use crate::auth::{AuthService, SessionCookie, SignupInput};
use crate::bank::BankService;
use crate::error::{Error, Kind};
use crate::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::types::{format_amount, Id, Time};
use crate::user::User;
use crate::validate::FundingSource;

#[derive(Deserialize)]
struct LoginInput {
	email: String,
	password: String,
}

#[derive(Deserialize)]
struct CreateAccountInput {
	account_type: AccountType,
}

#[derive(Deserialize)]
struct FundInput {
	amount: f64,
	funding_source: FundingSource,
}

#[derive(Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Serialize)]
struct LogoutBody {
	success: bool,
	message: &'static str,
}

#[derive(Serialize)]
struct TransactionBody {
	id: i64,
	account_id: Id,
	transaction_type: TransactionType,
	amount: String,
	description: String,
	status: TransactionStatus,
	created_at: Time,
	processed_at: Option<Time>,
}

impl From<Transaction> for TransactionBody {
	fn from(t: Transaction) -> Self {
		TransactionBody {
			id: t.id,
			account_id: t.account_id,
			transaction_type: t.transaction_type,
			amount: format_amount(&t.amount),
			description: t.description,
			status: t.status,
			created_at: t.created_at,
			processed_at: t.processed_at,
		}
	}
}

/// All routes of the HTTP surface
///
/// The transport stays a thin adapter: handlers parse input, resolve the
/// caller through `AuthService`, call a service, and translate the error
/// taxonomy to status codes.
pub fn routes(
	auth: Arc<AuthService>,
	bank: Arc<BankService>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
	let with_auth = {
		let auth = auth.clone();
		warp::any().map(move || auth.clone())
	};
	let with_bank = warp::any().map(move || bank.clone());
	let cookie = warp::header::optional::<String>("cookie");

	let signup = warp::path!("signup")
		.and(warp::post())
		.and(warp::body::json())
		.and(with_auth.clone())
		.and_then(signup);

	let login = warp::path!("login")
		.and(warp::post())
		.and(warp::body::json())
		.and(with_auth.clone())
		.and_then(login);

	let logout = warp::path!("logout")
		.and(warp::post())
		.and(cookie)
		.and(with_auth.clone())
		.and_then(logout);

	let me = warp::path!("me")
		.and(warp::get())
		.and(cookie)
		.and(with_auth.clone())
		.and_then(me);

	let create_account = warp::path!("accounts")
		.and(warp::post())
		.and(warp::body::json())
		.and(cookie)
		.and(with_auth.clone())
		.and(with_bank.clone())
		.and_then(create_account);

	let get_accounts = warp::path!("accounts")
		.and(warp::get())
		.and(cookie)
		.and(with_auth.clone())
		.and(with_bank.clone())
		.and_then(get_accounts);

	let fund_account = warp::path!("accounts" / Id / "fund")
		.and(warp::post())
		.and(warp::body::json())
		.and(cookie)
		.and(with_auth.clone())
		.and(with_bank.clone())
		.and_then(fund_account);

	let get_transactions = warp::path!("accounts" / Id / "transactions")
		.and(warp::get())
		.and(cookie)
		.and(with_auth)
		.and(with_bank)
		.and_then(get_transactions);

	signup
		.or(login)
		.or(logout)
		.or(me)
		.or(create_account)
		.or(get_accounts)
		.or(fund_account)
		.or(get_transactions)
}

async fn signup(
	input: SignupInput,
	auth: Arc<AuthService>,
) -> Result<warp::reply::Response, Infallible> {
	Ok(match auth.signup(&input) {
		Ok((profile, cookie)) => with_cookie(
			warp::reply::with_status(warp::reply::json(&profile), StatusCode::CREATED),
			&cookie,
		),
		Err(e) => error_reply(e),
	})
}

async fn login(
	input: LoginInput,
	auth: Arc<AuthService>,
) -> Result<warp::reply::Response, Infallible> {
	Ok(match auth.login(&input.email, &input.password) {
		Ok((profile, cookie)) => with_cookie(warp::reply::json(&profile), &cookie),
		Err(e) => error_reply(e),
	})
}

async fn logout(
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
) -> Result<warp::reply::Response, Infallible> {
	Ok(match auth.logout(cookie_header.as_deref()) {
		Ok((outcome, cleared)) => {
			let body = LogoutBody { success: outcome.success, message: outcome.message };
			let reply = warp::reply::json(&body);
			match cleared {
				Some(cookie) => with_cookie(reply, &cookie),
				None => reply.into_response(),
			}
		}
		Err(e) => error_reply(e),
	})
}

async fn me(
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
) -> Result<warp::reply::Response, Infallible> {
	Ok(match authenticated(&auth, cookie_header.as_deref()) {
		Ok(user) => warp::reply::json(&user.profile()).into_response(),
		Err(e) => error_reply(e),
	})
}

async fn create_account(
	input: CreateAccountInput,
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
	bank: Arc<BankService>,
) -> Result<warp::reply::Response, Infallible> {
	let result = authenticated(&auth, cookie_header.as_deref())
		.and_then(|user| bank.create_account(&user, input.account_type));

	Ok(match result {
		Ok(account) => warp::reply::with_status(
			warp::reply::json(&AccountView::from(account)),
			StatusCode::CREATED,
		)
		.into_response(),
		Err(e) => error_reply(e),
	})
}

async fn get_accounts(
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
	bank: Arc<BankService>,
) -> Result<warp::reply::Response, Infallible> {
	let result = authenticated(&auth, cookie_header.as_deref())
		.and_then(|user| bank.get_accounts(&user));

	Ok(match result {
		Ok(accounts) => {
			let views: Vec<AccountView> = accounts.into_iter().map(Into::into).collect();
			warp::reply::json(&views).into_response()
		}
		Err(e) => error_reply(e),
	})
}

async fn fund_account(
	account_id: Id,
	input: FundInput,
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
	bank: Arc<BankService>,
) -> Result<warp::reply::Response, Infallible> {
	let result = authenticated(&auth, cookie_header.as_deref())
		.and_then(|user| bank.fund_account(&user, &account_id, input.amount, &input.funding_source));

	Ok(match result {
		Ok(transaction) => {
			warp::reply::json(&TransactionBody::from(transaction)).into_response()
		}
		Err(e) => error_reply(e),
	})
}

async fn get_transactions(
	account_id: Id,
	cookie_header: Option<String>,
	auth: Arc<AuthService>,
	bank: Arc<BankService>,
) -> Result<warp::reply::Response, Infallible> {
	let result = authenticated(&auth, cookie_header.as_deref())
		.and_then(|user| bank.get_transactions(&user, &account_id));

	Ok(match result {
		Ok(transactions) => warp::reply::json(&transactions).into_response(),
		Err(e) => error_reply(e),
	})
}

fn authenticated(auth: &AuthService, cookie_header: Option<&str>) -> Result<User, Error> {
	auth.authenticate(cookie_header)
		.ok_or_else(|| Error::new(Kind::Unauthorized))
}

fn with_cookie(reply: impl Reply, cookie: &SessionCookie) -> warp::reply::Response {
	warp::reply::with_header(reply, "set-cookie", cookie.header_value()).into_response()
}

fn error_reply(err: Error) -> warp::reply::Response {
	let (status, message) = match err.kind() {
		Kind::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
		Kind::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
		Kind::Unauthorized => (StatusCode::UNAUTHORIZED, err.to_string()),
		Kind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
		Kind::Internal(_) | Kind::Database(_) => {
			error!("request failed: {}", err);
			(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
		}
	};

	warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
		.into_response()
}
