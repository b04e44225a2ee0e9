use diesel::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use r2d2::PooledConnection;
use rand::rngs::OsRng;
use rand::Rng;

pub use demobank::*;
use demobank::schema::accounts;

pub struct Fixture {
	pub pool: PgPool,
	pub config: Config,
	pub user_factory: UserFactory,
	pub account_factory: AccountFactory,
}

impl Fixture {
	pub fn new() -> Self {
		let pool = pg_connection();
		let config = Config::insecure();
		let user_factory = UserFactory::new(pool.clone(), config.clone());
		let account_factory = AccountFactory::new(pool.clone());
		Fixture {
			pool,
			config,
			user_factory,
			account_factory,
		}
	}

	pub fn conn(&self) -> PooledConnection<ConnectionManager<PgConnection>> {
		self.pool.get().unwrap()
	}

	pub fn auth_service(&self) -> AuthService {
		AuthService::new(
			user::Repo::new(self.pool.clone()),
			session::Repo::new(self.pool.clone()),
			self.config.clone(),
		)
	}

	pub fn bank_service(&self) -> BankService {
		BankService::new(
			account::Repo::new(self.pool.clone()),
			transaction::Repo::new(self.pool.clone()),
		)
	}

	pub fn teardown(&self) {
		let tables = vec![
			"sessions",
			"transactions",
			"accounts",
			"users",
		];
		println!("\n--- clean up ---");
		for table in tables {
			diesel::sql_query(format!("DELETE FROM {}", table))
				.execute(&self.conn())
				.map(|n| println!("deleting {} from '{}' table", n, table))
				.expect("deleting db table");
		}
	}
}

pub struct Suite {
	pub user_repo: user::Repo,
	pub session_repo: session::Repo,
	pub account_repo: account::Repo,
	pub transaction_repo: transaction::Repo,
}

impl Suite {
	pub fn setup() -> Self {
		let fixture = Fixture::new();
		fixture.teardown();

		Suite {
			user_repo: user::Repo::new(fixture.pool.clone()),
			session_repo: session::Repo::new(fixture.pool.clone()),
			account_repo: account::Repo::new(fixture.pool.clone()),
			transaction_repo: transaction::Repo::new(fixture.pool.clone()),
		}
	}
}

pub struct UserFactory {
	pool: PgPool,
	config: Config,
}

impl UserFactory {
	fn new(pool: PgPool, config: Config) -> Self {
		UserFactory { pool, config }
	}

	pub fn user(&self, email: &str) -> User {
		let password_hash = crypto::hash_password("G00d!pass").unwrap();
		let ssn_encrypted = crypto::encrypt_ssn("123456789", &self.config.ssn_secret).unwrap();

		let repo = user::Repo::new(self.pool.clone());
		repo.create_user(NewUser {
			email,
			password_hash: &password_hash,
			first_name: "Default",
			family_name: "Default",
			phone_number: "5551234567",
			date_of_birth: chrono::NaiveDate::from_ymd(1990, 6, 15),
			street: "1 Main St",
			city: "Springfield",
			state: "NY",
			zip: "10001",
			ssn_encrypted: &ssn_encrypted,
		}).unwrap()
	}

	pub fn bob(&self) -> User {
		self.user("bob@gmail.com")
	}

	pub fn lucy(&self) -> User {
		self.user("lucy@gmail.com")
	}
}

pub struct AccountFactory {
	pool: PgPool,
}

impl AccountFactory {
	pub fn new(pool: PgPool) -> Self {
		AccountFactory { pool }
	}

	pub fn account(&self, user_id: uuid::Uuid, account_type: AccountType) -> Account {
		let number: u64 = OsRng.gen_range(1_000_000_000..10_000_000_000);
		let payload = NewAccount {
			user_id,
			account_number: &number.to_string(),
			account_type,
		};
		let conn = self.pool.get().unwrap();
		diesel::insert_into(accounts::table)
			.values(payload)
			.get_result(&conn)
			.unwrap()
	}

	pub fn checking_account(&self, user_id: uuid::Uuid) -> Account {
		self.account(user_id, AccountType::Checking)
	}

	pub fn close_account(&self, account_id: &uuid::Uuid) {
		let conn = self.pool.get().unwrap();
		diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
			.set(accounts::status.eq(AccountStatus::Closed))
			.execute(&conn)
			.unwrap();
	}
}

/// A complete, valid signup payload; tests override the fields they exercise
pub fn signup_input(email: &str) -> SignupInput {
	SignupInput {
		email: email.to_string(),
		password: "Str0ng!pass".to_string(),
		first_name: "Bob".to_string(),
		family_name: "Roberts".to_string(),
		phone_number: "5551234567".to_string(),
		date_of_birth: "1990-06-15".to_string(),
		street: "1 Main St".to_string(),
		city: "Springfield".to_string(),
		state: "NY".to_string(),
		zip: "10001".to_string(),
		ssn: "123456789".to_string(),
	}
}

/// Build the `Cookie` request header a browser would send back
pub fn cookie_header(cookie: &SessionCookie) -> String {
	format!("session={}", cookie.token)
}
