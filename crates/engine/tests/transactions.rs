use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Account, Currency, Customer, DEFAULT_COMMENT, Engine, EngineError, RecordError,
    TransactionKind, TransferInput,
};
use migration::MigratorTrait;
use uuid::Uuid;

struct Ledger {
    engine: Engine,
    db: DatabaseConnection,
    usd: Currency,
    eur: Currency,
    alice: Customer,
    account: Account,
}

async fn ledger() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let usd = engine.new_currency("USD", "US Dollar").await.unwrap();
    let eur = engine.new_currency("EUR", "Euro").await.unwrap();
    let alice = engine.new_customer("Alice").await.unwrap();
    let account = engine
        .open_account(alice.id, usd.id, dec!(200))
        .await
        .unwrap();

    Ledger {
        engine,
        db,
        usd,
        eur,
        alice,
        account,
    }
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

#[tokio::test]
async fn same_currency_forces_unit_rate() {
    let l = ledger().await;

    let input = TransferInput::new(dec!(100)).rate(dec!(7.25));
    let (record, request) = l
        .engine
        .record_transaction(input, &l.alice, &l.account, TransactionKind::Debit, &l.usd)
        .await
        .unwrap();

    assert_eq!(record.amount, dec!(100));
    assert_eq!(record.exchange_rate.rate, Decimal::ONE);
    assert_eq!(record.exchange_rate.converted_amount, dec!(100));
    assert_eq!(record.exchange_rate.from_currency_id, l.usd.id);
    assert_eq!(record.exchange_rate.to_currency_id, l.usd.id);
    assert_eq!(record.kind, TransactionKind::Debit);
    assert_eq!(record.customer_id, l.alice.id);
    assert_eq!(record.from_account_id, l.account.id);
    assert_eq!(request.exchange_rate.rate, Decimal::ONE);
    assert_eq!(request.amount, record.amount);
}

#[tokio::test]
async fn negative_amount_is_recorded_as_magnitude_and_converted() {
    let l = ledger().await;

    let input = TransferInput::new(dec!(-50)).rate(dec!(0.9));
    let (record, request) = l
        .engine
        .record_transaction(input, &l.alice, &l.account, TransactionKind::Credit, &l.eur)
        .await
        .unwrap();

    assert_eq!(record.amount, dec!(50));
    assert_eq!(request.amount, dec!(50));
    assert_eq!(record.exchange_rate.rate, dec!(0.9));
    assert_eq!(record.exchange_rate.converted_amount, dec!(45));
    assert_eq!(record.exchange_rate.to_currency_id, l.eur.id);

    let stored = l.engine.transaction(record.id).await.unwrap();
    assert_eq!(stored.amount, dec!(50));
    assert_eq!(stored.exchange_rate.converted_amount, dec!(45));
    assert_eq!(stored.exchange_rate.id, record.exchange_rate.id);
    assert_eq!(stored.kind, TransactionKind::Credit);
}

#[tokio::test]
async fn converted_amount_keeps_decimal_precision() {
    let l = ledger().await;

    let input = TransferInput::new(dec!(19.99)).rate(dec!(1.0837));
    let (record, _) = l
        .engine
        .record_transaction(input, &l.alice, &l.account, TransactionKind::Transfer, &l.eur)
        .await
        .unwrap();

    let stored = l.engine.transaction(record.id).await.unwrap();
    assert_eq!(stored.exchange_rate.converted_amount, dec!(21.663163));
}

#[tokio::test]
async fn comment_defaults_to_sentinel() {
    let l = ledger().await;

    let (record, request) = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(5)),
            &l.alice,
            &l.account,
            TransactionKind::Fee,
            &l.usd,
        )
        .await
        .unwrap();
    assert_eq!(record.comment, DEFAULT_COMMENT);
    assert_eq!(request.comment, "N/A");

    let (record, _) = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(5)).comment("monthly fee"),
            &l.alice,
            &l.account,
            TransactionKind::Fee,
            &l.usd,
        )
        .await
        .unwrap();
    assert_eq!(
        l.engine.transaction(record.id).await.unwrap().comment,
        "monthly fee"
    );

    let (record, _) = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(5)).comment("  "),
            &l.alice,
            &l.account,
            TransactionKind::Fee,
            &l.usd,
        )
        .await
        .unwrap();
    assert_eq!(l.engine.transaction(record.id).await.unwrap().comment, "  ");
}

#[tokio::test]
async fn identical_calls_create_distinct_records() {
    let l = ledger().await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let (record, _) = l
            .engine
            .record_transaction(
                TransferInput::new(dec!(10)),
                &l.alice,
                &l.account,
                TransactionKind::Debit,
                &l.usd,
            )
            .await
            .unwrap();
        ids.push((record.id, record.exchange_rate.id));
    }

    assert_ne!(ids[0].0, ids[1].0);
    assert_ne!(ids[0].1, ids[1].1);
    assert_eq!(l.engine.exchange_rate_count().await.unwrap(), 2);
    let listed = l.engine.account_transactions(l.account.id).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn balance_is_snapshotted_not_updated() {
    let l = ledger().await;

    let (record, _) = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(75)),
            &l.alice,
            &l.account,
            TransactionKind::Withdrawal,
            &l.usd,
        )
        .await
        .unwrap();
    assert_eq!(record.balance_snapshot, dec!(200));

    // The live balance is untouched by recording.
    let account = l.engine.account(l.account.id).await.unwrap();
    assert_eq!(account.balance, dec!(200));

    // A later balance change does not rewrite history.
    let db_tx = l.engine.begin().await.unwrap();
    l.engine
        .set_account_balance_in(&db_tx, l.account.id, dec!(125))
        .await
        .unwrap();
    db_tx.commit().await.unwrap();

    let stored = l.engine.transaction(record.id).await.unwrap();
    assert_eq!(stored.balance_snapshot, dec!(200));
    assert_eq!(
        l.engine.account(l.account.id).await.unwrap().balance,
        dec!(125)
    );
}

#[tokio::test]
async fn failed_transaction_save_leaves_no_exchange_rate() {
    let l = ledger().await;

    // Not persisted: the exchange rate insert succeeds, the transaction insert
    // then violates the account foreign key.
    let ghost = Account::new(l.alice.id, l.usd.clone(), dec!(10));

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(10)).rate(dec!(0.5)),
            &l.alice,
            &ghost,
            TransactionKind::Debit,
            &l.eur,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RecordError::Failed(EngineError::Database(_))));
    assert_eq!(err.to_string(), "unable to create transaction");
    assert!(std::error::Error::source(&err).is_some());

    assert_eq!(l.engine.exchange_rate_count().await.unwrap(), 0);
    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
    assert_eq!(count_rows(&l.db, "transactions").await, 0);
    assert!(
        l.engine
            .account_transactions(ghost.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn failed_exchange_rate_save_leaves_no_rows() {
    let l = ledger().await;

    // Never persisted: the exchange rate insert violates the currency foreign key.
    let jpy = Currency::new("JPY", "Yen").unwrap();

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(10)).rate(dec!(150)),
            &l.alice,
            &l.account,
            TransactionKind::Transfer,
            &jpy,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RecordError::Failed(EngineError::Database(_))));
    assert_eq!(err.to_string(), "unable to create transaction");
    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
    assert_eq!(count_rows(&l.db, "transactions").await, 0);
}

#[tokio::test]
async fn converted_amount_overflow_fails_without_writing() {
    let l = ledger().await;

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(Decimal::MAX).rate(dec!(150)),
            &l.alice,
            &l.account,
            TransactionKind::Transfer,
            &l.eur,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RecordError::Failed(EngineError::InvalidAmount(
            "converted amount too large".to_string()
        ))
    );
    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
    assert_eq!(count_rows(&l.db, "transactions").await, 0);

    // The caller-owned variant reports the same cause and leaves `db_tx` usable.
    let db_tx = l.engine.begin().await.unwrap();
    let err = l
        .engine
        .record_transaction_in(
            &db_tx,
            TransferInput::new(Decimal::MIN).rate(dec!(150)),
            &l.alice,
            &l.account,
            TransactionKind::Transfer,
            &l.eur,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    db_tx.rollback().await.unwrap();
    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
}

#[tokio::test]
async fn missing_rate_across_currencies_is_rejected_up_front() {
    let l = ledger().await;

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(10)),
            &l.alice,
            &l.account,
            TransactionKind::Debit,
            &l.eur,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RecordError::Invalid(EngineError::MissingRate(
            "a rate is required to convert USD to EUR".to_string()
        ))
    );
    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
}

#[tokio::test]
async fn zero_amount_and_non_positive_rate_are_rejected() {
    let l = ledger().await;

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(Decimal::ZERO),
            &l.alice,
            &l.account,
            TransactionKind::Debit,
            &l.usd,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.cause(),
        EngineError::InvalidAmount(msg) if msg == "amount must be non-zero"
    ));

    let err = l
        .engine
        .record_transaction(
            TransferInput::new(dec!(3)).rate(Decimal::ZERO),
            &l.alice,
            &l.account,
            TransactionKind::Debit,
            &l.eur,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid(EngineError::InvalidRate(_))));
}

#[tokio::test]
async fn caller_owned_unit_of_work_still_validates_input() {
    let l = ledger().await;

    let db_tx = l.engine.begin().await.unwrap();
    let err = l
        .engine
        .record_transaction_in(
            &db_tx,
            TransferInput::new(dec!(10)),
            &l.alice,
            &l.account,
            TransactionKind::Debit,
            &l.eur,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingRate(_)));
    db_tx.commit().await.unwrap();

    assert_eq!(count_rows(&l.db, "exchange_rates").await, 0);
    assert_eq!(count_rows(&l.db, "transactions").await, 0);
}

#[tokio::test]
async fn caller_owned_unit_of_work_commits_record_and_balance_together() {
    let l = ledger().await;

    let db_tx = l.engine.begin().await.unwrap();
    let (record, request) = l
        .engine
        .record_transaction_in(
            &db_tx,
            TransferInput::new(dec!(-30)),
            &l.alice,
            &l.account,
            TransactionKind::Debit,
            &l.usd,
        )
        .await
        .unwrap();
    l.engine
        .set_account_balance_in(&db_tx, l.account.id, request.balance_snapshot - request.amount)
        .await
        .unwrap();
    db_tx.commit().await.unwrap();

    assert_eq!(
        l.engine.account(l.account.id).await.unwrap().balance,
        dec!(170)
    );
    assert_eq!(
        l.engine.transaction(record.id).await.unwrap().balance_snapshot,
        dec!(200)
    );
}

#[tokio::test]
async fn caller_owned_unit_of_work_rolls_back_both_records() {
    let l = ledger().await;

    let db_tx = l.engine.begin().await.unwrap();
    let (record, _) = l
        .engine
        .record_transaction_in(
            &db_tx,
            TransferInput::new(dec!(12)).rate(dec!(1.1)),
            &l.alice,
            &l.account,
            TransactionKind::Transfer,
            &l.eur,
        )
        .await
        .unwrap();
    db_tx.rollback().await.unwrap();

    assert_eq!(
        l.engine.transaction(record.id).await.unwrap_err(),
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
    assert_eq!(l.engine.exchange_rate_count().await.unwrap(), 0);
}

#[tokio::test]
async fn directory_resolves_currencies_customers_and_accounts() {
    let l = ledger().await;

    assert_eq!(l.engine.currency_by_code("usd").await.unwrap(), l.usd);
    assert_eq!(l.engine.currency(l.eur.id).await.unwrap(), l.eur);
    assert_eq!(l.engine.customer(l.alice.id).await.unwrap(), l.alice);
    assert_eq!(l.engine.account(l.account.id).await.unwrap(), l.account);

    assert_eq!(
        l.engine.new_currency("usd", "Dollar again").await.unwrap_err(),
        EngineError::ExistingKey("USD".to_string())
    );
    assert!(matches!(
        l.engine.new_customer("   ").await,
        Err(EngineError::InvalidName(_))
    ));
    assert_eq!(
        l.engine
            .open_account(Uuid::new_v4(), l.usd.id, dec!(0))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("customer not exists".to_string())
    );
    assert_eq!(
        l.engine.account(Uuid::new_v4()).await.unwrap_err(),
        EngineError::KeyNotFound("account not exists".to_string())
    );

    let stub = l.account.stub(&l.alice);
    assert_eq!(stub.id, l.account.id);
    assert_eq!(stub.customer_id, l.alice.id);
    assert_eq!(stub.currency_id, l.usd.id);
}
