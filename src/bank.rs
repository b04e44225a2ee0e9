use bigdecimal::BigDecimal;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;

use crate::account::{self, Account, AccountStatus, AccountType, NewAccount};
use crate::db;
use crate::error::{Error, Result};
use crate::transaction::{self, NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionView};
use crate::types::Id;
use crate::user::User;
use crate::validate::{self, CardNetwork, FundingSource};

/// Service for account and ledger operations
///
/// Every operation takes the already-authenticated user; there is no path
/// to another user's accounts from here.
pub struct BankService {
	accounts: account::Repo,
	transactions: transaction::Repo,
}

impl BankService {
	pub fn new(accounts: account::Repo, transactions: transaction::Repo) -> Self {
		BankService { accounts, transactions }
	}

	/// Open an account of the given type for the user
	///
	/// A user holds at most one account per type. The account number comes
	/// from a cryptographically secure source, not a counter, and is
	/// regenerated until it collides with nothing in storage.
	pub fn create_account(&self, user: &User, account_type: AccountType) -> Result<Account> {
		match self.accounts.find_of_type(&user.id, account_type) {
			Ok(_) => {
				return Err(Error::conflict(
					format!("User already has a {} account", account_type.as_str()),
				));
			}
			Err(db::Error::RecordNotFound) => {}
			Err(e) => return Err(e.into()),
		}

		let account_number = self.unused_account_number()?;
		let created = self.accounts.create(NewAccount {
			user_id: user.id,
			account_number: &account_number,
			account_type,
		})?;

		// read our own write rather than trusting the insert result
		self.accounts.find_owned(&created.id, &user.id).map_err(|e| match e {
			db::Error::RecordNotFound => Error::internal("account missing after insert"),
			e => e.into(),
		})
	}

	pub fn get_accounts(&self, user: &User) -> Result<Vec<Account>> {
		self.accounts.find_for_user(&user.id).map_err(Into::into)
	}

	/// Deposit funds into an account from a card or bank source
	///
	/// The funding source and amount are validated before storage is
	/// touched. The account must belong to the caller and be active.
	/// Returns the transaction created by this call.
	pub fn fund_account(
		&self,
		user: &User,
		account_id: &Id,
		amount: f64,
		source: &FundingSource,
	) -> Result<Transaction> {
		let network = validate::validate_funding_source(source)?;
		let amount = validate::normalize_amount(amount)?;

		let account = self.accounts.find_owned(account_id, &user.id)?;
		if account.status != AccountStatus::Active {
			return Err(Error::validation("Account is not active"));
		}

		let description = funding_description(network, source);
		self.transactions.create(NewTransaction {
			account_id,
			transaction_type: TransactionType::Deposit,
			amount: &amount,
			description: &description,
			status: TransactionStatus::Completed,
			processed_at: Some(Utc::now()),
		})?;

		// the row this call just appended is the newest one on the account
		let created = self.transactions.latest_for_account(account_id)?;

		let new_balance: BigDecimal = account.balance + amount;
		self.accounts.set_balance(account_id, &new_balance)?;

		Ok(created)
	}

	/// Transaction history for an account, newest first, each row carrying
	/// the account's type
	pub fn get_transactions(&self, user: &User, account_id: &Id) -> Result<Vec<TransactionView>> {
		let account = self.accounts.find_owned(account_id, &user.id)?;

		let rows = self.transactions.find_for_account(&account.id)?;
		Ok(rows
			.into_iter()
			.map(|t| TransactionView::new(t, account.account_type))
			.collect())
	}

	fn unused_account_number(&self) -> Result<String> {
		loop {
			let candidate: u64 = OsRng.gen_range(1_000_000_000..10_000_000_000);
			let candidate = candidate.to_string();

			if !self.accounts.number_exists(&candidate)? {
				return Ok(candidate);
			}
		}
	}
}

fn funding_description(network: Option<CardNetwork>, source: &FundingSource) -> String {
	match network {
		Some(network) => {
			let last4 = source
				.card_number
				.as_deref()
				.map(|n| &n[n.len().saturating_sub(4)..])
				.unwrap_or("");
			format!("{} deposit ending in {}", network.as_str(), last4)
		}
		None => "Bank transfer deposit".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use crate::validate::SourceType;

	use super::*;

	#[test]
	fn card_funding_description_names_network_and_last4() {
		let source = FundingSource {
			source_type: SourceType::Card,
			card_number: Some("4111111111111111".to_string()),
			routing_number: None,
			account_number: None,
		};

		let description = funding_description(Some(CardNetwork::Visa), &source);
		assert_eq!(description, "Visa deposit ending in 1111");
	}

	#[test]
	fn bank_funding_description() {
		let source = FundingSource {
			source_type: SourceType::Bank,
			card_number: None,
			routing_number: Some("021000021".to_string()),
			account_number: Some("000123456789".to_string()),
		};

		assert_eq!(funding_description(None, &source), "Bank transfer deposit");
	}
}
