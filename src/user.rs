use diesel::prelude::*;
use serde::Serialize;

use crate::db;
use crate::schema::users;
use crate::types::{Date, Id, Time};

#[derive(Queryable, Identifiable, PartialEq, Debug, Clone)]
pub struct User {
	pub id: Id,
	pub email: String,
	pub password_hash: String,
	pub first_name: String,
	pub family_name: String,
	pub phone_number: String,
	pub date_of_birth: Date,
	pub street: String,
	pub city: String,
	pub state: String,
	pub zip: String,
	pub ssn_encrypted: String,
	pub created_at: Time,
}

impl User {
	/// View of the user that is safe to return to clients: no password
	/// hash, no SSN in any form
	pub fn profile(&self) -> Profile {
		Profile {
			id: self.id,
			email: self.email.clone(),
			first_name: self.first_name.clone(),
			family_name: self.family_name.clone(),
			phone_number: self.phone_number.clone(),
			date_of_birth: self.date_of_birth,
			street: self.street.clone(),
			city: self.city.clone(),
			state: self.state.clone(),
			zip: self.zip.clone(),
			created_at: self.created_at,
		}
	}
}

#[derive(Serialize, PartialEq, Debug)]
pub struct Profile {
	pub id: Id,
	pub email: String,
	pub first_name: String,
	pub family_name: String,
	pub phone_number: String,
	pub date_of_birth: Date,
	pub street: String,
	pub city: String,
	pub state: String,
	pub zip: String,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub password_hash: &'a str,
	pub first_name: &'a str,
	pub family_name: &'a str,
	pub phone_number: &'a str,
	pub date_of_birth: Date,
	pub street: &'a str,
	pub city: &'a str,
	pub state: &'a str,
	pub zip: &'a str,
	pub ssn_encrypted: &'a str,
}

pub enum UserKey<'a> {
	ID(Id),
	Email(&'a str),
}

/// Data store implementation for operating on users in the database
pub struct Repo {
	db: db::PgPool,
}

impl Repo {
	pub fn new(db: db::PgPool) -> Self {
		Repo { db }
	}

	pub fn create_user(&self, new_user: NewUser) -> db::Result<User> {
		let conn = &self.db.get()?;
		diesel::insert_into(users::table)
			.values(&new_user)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_user(&self, key: UserKey) -> db::Result<User> {
		let conn = &self.db.get()?;
		match key {
			UserKey::ID(id) => {
				users::table
					.find(id)
					.first::<User>(conn)
					.map_err(Into::into)
			}
			UserKey::Email(email) => {
				users::table
					.filter(users::email.eq(email))
					.first::<User>(conn)
					.map_err(Into::into)
			}
		}
	}
}
