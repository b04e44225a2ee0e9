use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::{deserialize, serialize};
use diesel::deserialize::FromSql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{Output, ToSql};
use diesel::sql_types::Varchar;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::db;
use crate::schema::accounts;
use crate::types::{format_amount, Id, Time};
use crate::user;

#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(user::User)]
pub struct Account {
	pub id: Id,
	pub user_id: Id,
	/// Ten decimal digits, unique across all accounts
	pub account_number: String,
	pub account_type: AccountType,
	pub balance: BigDecimal,
	pub status: AccountStatus,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "accounts"]
pub struct NewAccount<'a> {
	pub user_id: Id,
	pub account_number: &'a str,
	pub account_type: AccountType,
}

#[derive(AsExpression, FromSqlRow, PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
#[sql_type = "Varchar"]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
	Checking,
	Savings,
}

impl AccountType {
	pub fn as_str(&self) -> &str {
		match self {
			AccountType::Checking => "checking",
			AccountType::Savings => "savings",
		}
	}
}

impl ToSql<Varchar, Pg> for AccountType {
	fn to_sql<W: std::io::Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
		ToSql::<Varchar, Pg>::to_sql(self.as_str(), out)
	}
}

impl FromSql<Varchar, Pg> for AccountType {
	fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
		let o = bytes.ok_or_else(|| "error deserializing from varchar")?;
		let x = std::str::from_utf8(o)?;
		match x {
			"checking" => Ok(AccountType::Checking),
			"savings" => Ok(AccountType::Savings),
			_ => Err("invalid account type".into())
		}
	}
}

#[derive(AsExpression, FromSqlRow, Eq, PartialEq, EnumString, Display, Debug, Clone, Copy, Serialize)]
#[sql_type = "Varchar"]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
	/// Open for funding and queries
	Active,
	/// Created but not yet usable
	Pending,
	Closed,
}

impl ToSql<Varchar, Pg> for AccountStatus {
	fn to_sql<W: std::io::Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
		ToSql::<Varchar, Pg>::to_sql(&self.to_string(), out)
	}
}

impl FromSql<Varchar, Pg> for AccountStatus {
	fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
		let bytes = bytes.ok_or_else(|| "error deserializing from varchar")?;
		let s = std::str::from_utf8(bytes)?;

		AccountStatus::from_str(s).map_err(|_| "invalid account status".into())
	}
}

/// Account shape returned to clients; the balance is rendered as an exact
/// decimal string
#[derive(Serialize, PartialEq, Debug)]
pub struct AccountView {
	pub id: Id,
	pub account_number: String,
	pub account_type: AccountType,
	pub balance: String,
	pub status: AccountStatus,
	pub created_at: Time,
}

impl From<Account> for AccountView {
	fn from(a: Account) -> Self {
		AccountView {
			id: a.id,
			account_number: a.account_number,
			account_type: a.account_type,
			balance: format_amount(&a.balance),
			status: a.status,
			created_at: a.created_at,
		}
	}
}

/// Data store implementation for operating on accounts in the database
pub struct Repo {
	db: db::PgPool,
}

impl Repo {
	pub fn new(db: db::PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_account: NewAccount) -> db::Result<Account> {
		let conn = &self.db.get()?;
		diesel::insert_into(accounts::table)
			.values(&new_account)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_for_user(&self, user_id: &Id) -> db::Result<Vec<Account>> {
		let conn = &self.db.get()?;
		accounts::table
			.filter(accounts::user_id.eq(user_id))
			.load::<Account>(conn)
			.map_err(Into::into)
	}

	/// Look up an account by id AND owner in one predicate
	///
	/// An account that exists but belongs to someone else comes back as
	/// `RecordNotFound`, indistinguishable from an account that does not
	/// exist at all.
	pub fn find_owned(&self, account_id: &Id, user_id: &Id) -> db::Result<Account> {
		let conn = &self.db.get()?;
		accounts::table
			.filter(accounts::id.eq(account_id))
			.filter(accounts::user_id.eq(user_id))
			.first::<Account>(conn)
			.map_err(Into::into)
	}

	pub fn find_of_type(&self, user_id: &Id, account_type: AccountType) -> db::Result<Account> {
		let conn = &self.db.get()?;
		accounts::table
			.filter(accounts::user_id.eq(user_id))
			.filter(accounts::account_type.eq(account_type))
			.first::<Account>(conn)
			.map_err(Into::into)
	}

	pub fn number_exists(&self, account_number: &str) -> db::Result<bool> {
		use diesel::dsl::{exists, select};

		let conn = &self.db.get()?;
		select(exists(accounts::table.filter(accounts::account_number.eq(account_number))))
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn set_balance(&self, account_id: &Id, balance: &BigDecimal) -> db::Result<Account> {
		let conn = &self.db.get()?;
		diesel::update(accounts::table)
			.filter(accounts::id.eq(account_id))
			.set(accounts::balance.eq(balance))
			.get_result(conn)
			.map_err(Into::into)
	}
}
