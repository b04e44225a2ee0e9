use bigdecimal::BigDecimal;

use demobank::*;

use crate::common::{Fixture, Suite};

mod common;

fn visa_source() -> FundingSource {
	FundingSource {
		source_type: SourceType::Card,
		card_number: Some("4111111111111111".to_string()),
		routing_number: None,
		account_number: None,
	}
}

fn bank_source() -> FundingSource {
	FundingSource {
		source_type: SourceType::Bank,
		card_number: None,
		routing_number: Some("021000021".to_string()),
		account_number: Some("000123456789".to_string()),
	}
}

#[test]
fn create_account() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = bank.create_account(&bob, AccountType::Checking).unwrap();

	assert_eq!(account.user_id, bob.id);
	assert_eq!(account.account_type, AccountType::Checking);
	assert_eq!(account.balance, BigDecimal::from(0));
	assert_eq!(account.status, AccountStatus::Active);
	assert_eq!(account.account_number.len(), 10);
	assert!(account.account_number.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn one_account_per_type() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	bank.create_account(&bob, AccountType::Checking).unwrap();

	let err = bank.create_account(&bob, AccountType::Checking).unwrap_err();
	assert_eq!(err, Error::conflict("User already has a checking account"));

	// a different type is fine, and so is the same type for another user
	bank.create_account(&bob, AccountType::Savings).unwrap();
	let lucy = f.user_factory.lucy();
	bank.create_account(&lucy, AccountType::Checking).unwrap();
}

#[test]
fn get_accounts_lists_only_the_callers() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let lucy = f.user_factory.lucy();

	let checking = bank.create_account(&bob, AccountType::Checking).unwrap();
	let savings = bank.create_account(&bob, AccountType::Savings).unwrap();
	bank.create_account(&lucy, AccountType::Checking).unwrap();

	let accounts = bank.get_accounts(&bob).unwrap();
	let mut ids: Vec<_> = accounts.iter().map(|a| a.id).collect();
	ids.sort();

	let mut want = vec![checking.id, savings.id];
	want.sort();
	assert_eq!(ids, want);
}

#[test]
fn funding_accumulates_exactly() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = f.account_factory.checking_account(bob.id);

	// twenty $1.05 deposits make exactly $21.00
	for _ in 0..20 {
		bank.fund_account(&bob, &account.id, 1.05, &visa_source()).unwrap();
	}

	let account = suite.account_repo.find_owned(&account.id, &bob.id).unwrap();
	assert_eq!(account.balance, BigDecimal::from(21));
}

#[test]
fn funding_returns_the_transaction_just_created() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = f.account_factory.checking_account(bob.id);

	let first = bank.fund_account(&bob, &account.id, 10.0, &visa_source()).unwrap();
	let second = bank.fund_account(&bob, &account.id, 20.5, &bank_source()).unwrap();

	assert_ne!(second.id, first.id);
	assert_eq!(second.amount, "20.5".parse::<BigDecimal>().unwrap());
	assert_eq!(second.transaction_type, TransactionType::Deposit);
	assert_eq!(second.status, TransactionStatus::Completed);
	assert!(second.processed_at.is_some());
	assert_eq!(second.description, "Bank transfer deposit");
	assert_eq!(first.description, "Visa deposit ending in 1111");
}

#[test]
fn funding_is_validated_before_any_write() {
	let f = Fixture::new();
	let suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = f.account_factory.checking_account(bob.id);

	let mut bad_card = visa_source();
	bad_card.card_number = Some("4111111111111112".to_string());
	let err = bank.fund_account(&bob, &account.id, 10.0, &bad_card).unwrap_err();
	assert_eq!(err, Error::validation("Invalid card number"));

	let err = bank.fund_account(&bob, &account.id, 10_000.01, &visa_source()).unwrap_err();
	assert_eq!(err, Error::validation("Amount must be between $0.01 and $10,000"));

	// no ledger rows and no balance movement
	assert!(suite.transaction_repo.latest_for_account(&account.id).is_err());
	let account = suite.account_repo.find_owned(&account.id, &bob.id).unwrap();
	assert_eq!(account.balance, BigDecimal::from(0));
}

#[test]
fn funding_someone_elses_account_reads_as_absent() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let lucy = f.user_factory.lucy();
	let lucy_account = f.account_factory.checking_account(lucy.id);

	let err = bank.fund_account(&bob, &lucy_account.id, 10.0, &visa_source()).unwrap_err();
	assert_eq!(err, Error::new(Kind::NotFound));

	let err = bank.get_transactions(&bob, &lucy_account.id).unwrap_err();
	assert_eq!(err, Error::new(Kind::NotFound));
}

#[test]
fn funding_requires_an_active_account() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = f.account_factory.checking_account(bob.id);
	f.account_factory.close_account(&account.id);

	let err = bank.fund_account(&bob, &account.id, 10.0, &visa_source()).unwrap_err();
	assert_eq!(err, Error::validation("Account is not active"));
}

#[test]
fn transaction_history_is_newest_first_and_carries_account_type() {
	let f = Fixture::new();
	let _suite = Suite::setup();
	let bank = f.bank_service();

	let bob = f.user_factory.bob();
	let account = f.account_factory.account(bob.id, AccountType::Savings);

	bank.fund_account(&bob, &account.id, 10.0, &visa_source()).unwrap();
	bank.fund_account(&bob, &account.id, 20.5, &bank_source()).unwrap();

	let history = bank.get_transactions(&bob, &account.id).unwrap();

	assert_eq!(history.len(), 2);
	assert_eq!(history[0].amount, "20.50");
	assert_eq!(history[1].amount, "10.00");
	assert!(history[0].created_at >= history[1].created_at);
	assert!(history.iter().all(|t| t.account_type == AccountType::Savings));
}
