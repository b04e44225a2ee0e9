use diesel::prelude::*;

use crate::db;
use crate::schema::sessions;
use crate::types::{Id, Time};

#[derive(Queryable, Identifiable, PartialEq, Debug)]
pub struct Session {
	pub id: Id,
	pub token: String,
	pub user_id: Id,
	pub expires_at: Time,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "sessions"]
pub struct NewSession<'a> {
	pub token: &'a str,
	pub user_id: Id,
	pub expires_at: Time,
}

/// Data store implementation for operating on sessions in the database
pub struct Repo {
	db: db::PgPool,
}

impl Repo {
	pub fn new(db: db::PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_session: NewSession) -> db::Result<Session> {
		let conn = &self.db.get()?;
		diesel::insert_into(sessions::table)
			.values(&new_session)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_token(&self, token: &str) -> db::Result<Session> {
		let conn = &self.db.get()?;
		sessions::table
			.filter(sessions::token.eq(token))
			.first::<Session>(conn)
			.map_err(Into::into)
	}

	/// Remove every session a user holds
	///
	/// Creating a session always goes through this first, so a user never
	/// has more than one live session row.
	pub fn delete_for_user(&self, user_id: &Id) -> db::Result<usize> {
		let conn = &self.db.get()?;
		diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id)))
			.execute(conn)
			.map_err(Into::into)
	}

	/// Delete a single session by its token, returning how many rows went away
	pub fn delete_by_token(&self, token: &str) -> db::Result<usize> {
		let conn = &self.db.get()?;
		diesel::delete(sessions::table.filter(sessions::token.eq(token)))
			.execute(conn)
			.map_err(Into::into)
	}
}
