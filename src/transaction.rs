use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::{deserialize, serialize};
use diesel::deserialize::FromSql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{Output, ToSql};
use diesel::sql_types::Varchar;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::account::AccountType;
use crate::db;
use crate::schema::transactions;
use crate::types::{format_amount, Id, Time};

/// A ledger entry against a single account
///
/// Rows are append-only; the key is a sequence so "most recent" is defined
/// by identifier order.
#[derive(Queryable, Identifiable, PartialEq, Debug)]
pub struct Transaction {
	pub id: i64,
	pub account_id: Id,
	pub transaction_type: TransactionType,
	pub amount: BigDecimal,
	pub description: String,
	pub status: TransactionStatus,
	pub created_at: Time,
	pub processed_at: Option<Time>,
}

#[derive(AsExpression, FromSqlRow, Eq, PartialEq, EnumString, Display, Debug, Clone, Copy, Serialize)]
#[sql_type = "Varchar"]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
	/// Funds moving into an account from an outside source
	Deposit,
}

#[derive(AsExpression, FromSqlRow, Eq, PartialEq, EnumString, Display, Debug, Clone, Copy, Serialize)]
#[sql_type = "Varchar"]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
	Completed,
	Pending,
	Failed,
}

impl ToSql<Varchar, Pg> for TransactionType {
	fn to_sql<W: std::io::Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
		ToSql::<Varchar, Pg>::to_sql(&self.to_string(), out)
	}
}

impl FromSql<Varchar, Pg> for TransactionType {
	fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
		let bytes = bytes.ok_or_else(|| "error deserializing from varchar")?;
		let s = std::str::from_utf8(bytes)?;

		TransactionType::from_str(s).map_err(|_| "invalid transaction type".into())
	}
}

impl ToSql<Varchar, Pg> for TransactionStatus {
	fn to_sql<W: std::io::Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
		ToSql::<Varchar, Pg>::to_sql(&self.to_string(), out)
	}
}

impl FromSql<Varchar, Pg> for TransactionStatus {
	fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
		let bytes = bytes.ok_or_else(|| "error deserializing from varchar")?;
		let s = std::str::from_utf8(bytes)?;

		TransactionStatus::from_str(s).map_err(|_| "invalid transaction status".into())
	}
}

#[derive(Insertable)]
#[table_name = "transactions"]
pub struct NewTransaction<'a> {
	pub account_id: &'a Id,
	pub transaction_type: TransactionType,
	pub amount: &'a BigDecimal,
	pub description: &'a str,
	pub status: TransactionStatus,
	pub processed_at: Option<Time>,
}

/// Data store implementation for operating on transactions in the database
pub struct Repo {
	db: db::PgPool,
}

impl Repo {
	pub fn new(db: db::PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_transaction: NewTransaction) -> db::Result<usize> {
		let conn = &self.db.get()?;
		diesel::insert_into(transactions::table)
			.values(&new_transaction)
			.execute(conn)
			.map_err(Into::into)
	}

	/// The newest transaction on an account, by identifier order
	pub fn latest_for_account(&self, account_id: &Id) -> db::Result<Transaction> {
		let conn = &self.db.get()?;
		transactions::table
			.filter(transactions::account_id.eq(account_id))
			.order(transactions::id.desc())
			.first::<Transaction>(conn)
			.map_err(Into::into)
	}

	/// Every transaction on an account, newest first
	pub fn find_for_account(&self, account_id: &Id) -> db::Result<Vec<Transaction>> {
		let conn = &self.db.get()?;
		transactions::table
			.filter(transactions::account_id.eq(account_id))
			.order(transactions::created_at.desc())
			.load::<Transaction>(conn)
			.map_err(Into::into)
	}
}

/// A transaction enriched with the type of the account it belongs to,
/// denormalized from the account row the caller already fetched
#[derive(Serialize, PartialEq, Debug)]
pub struct TransactionView {
	pub id: i64,
	pub account_id: Id,
	pub transaction_type: TransactionType,
	pub amount: String,
	pub description: String,
	pub status: TransactionStatus,
	pub created_at: Time,
	pub processed_at: Option<Time>,
	pub account_type: AccountType,
}

impl TransactionView {
	pub fn new(t: Transaction, account_type: AccountType) -> Self {
		TransactionView {
			id: t.id,
			account_id: t.account_id,
			transaction_type: t.transaction_type,
			amount: format_amount(&t.amount),
			description: t.description,
			status: t.status,
			created_at: t.created_at,
			processed_at: t.processed_at,
			account_type,
		}
	}
}
