#[macro_use]
extern crate diesel;

pub mod schema;
pub mod types;
pub mod db;
pub mod error;
pub mod config;
pub mod crypto;
pub mod validate;
pub mod user;
pub mod session;
pub mod account;
pub mod transaction;
pub mod auth;
pub mod bank;
pub mod api;

pub use crate::account::{Account, AccountStatus, AccountType, AccountView, NewAccount};
pub use crate::auth::{AuthService, SessionCookie, SignupInput};
pub use crate::bank::BankService;
pub use crate::config::Config;
pub use crate::db::{pg_connection, PgPool};
pub use crate::error::{Error, Kind, Result};
pub use crate::session::{NewSession, Session};
pub use crate::transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionView};
pub use crate::user::{NewUser, Profile, User, UserKey};
pub use crate::validate::{CardNetwork, FundingSource, SourceType};
