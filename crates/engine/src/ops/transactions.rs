//! Transaction recording.
//!
//! Recording writes two rows, the exchange-rate record and the transaction
//! that owns it, inside one unit of work. Either both become visible or
//! neither does.

use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, Currency, Customer, EngineError, ExchangeRateRecord, RecordError, ResultEngine,
    TransactionKind, TransactionRecord, TransferInput, TransferRequest, exchange_rates,
    transactions,
};

use super::Engine;

impl Engine {
    /// Record a transaction for `from_account` in its own unit of work.
    ///
    /// The input is validated first; a rejected input returns
    /// [`RecordError::Invalid`] without touching the database. Any failure
    /// after the unit of work is opened rolls it back, is logged with full
    /// detail and comes back as [`RecordError::Failed`].
    ///
    /// The live balance of `from_account` is not modified: the record only
    /// keeps a snapshot of it.
    pub async fn record_transaction(
        &self,
        input: TransferInput,
        customer: &Customer,
        from_account: &Account,
        kind: TransactionKind,
        to_currency: &Currency,
    ) -> Result<(TransactionRecord, TransferRequest), RecordError> {
        input
            .validate(from_account, to_currency)
            .map_err(RecordError::Invalid)?;

        let db_tx = self
            .database
            .begin()
            .await
            .map_err(|err| failed(from_account, err.into()))?;

        match self
            .write_transaction(&db_tx, input, customer, from_account, kind, to_currency)
            .await
        {
            Ok((record, request)) => {
                db_tx
                    .commit()
                    .await
                    .map_err(|err| failed(from_account, err.into()))?;
                tracing::info!(
                    id = %record.id,
                    account = %record.from_account_id,
                    kind = %record.kind,
                    amount = %record.amount,
                    "transaction recorded"
                );
                Ok((record, request))
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(failed(from_account, err))
            }
        }
    }

    /// Record a transaction inside a unit of work owned by the caller.
    ///
    /// Nothing is committed or rolled back here: the caller decides, for
    /// example after updating the live balance on the same `db_tx`.
    pub async fn record_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        input: TransferInput,
        customer: &Customer,
        from_account: &Account,
        kind: TransactionKind,
        to_currency: &Currency,
    ) -> ResultEngine<(TransactionRecord, TransferRequest)> {
        input.validate(from_account, to_currency)?;
        self.write_transaction(db_tx, input, customer, from_account, kind, to_currency)
            .await
    }

    /// Normalize an already validated input and insert both rows on `db_tx`.
    async fn write_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        input: TransferInput,
        customer: &Customer,
        from_account: &Account,
        kind: TransactionKind,
        to_currency: &Currency,
    ) -> ResultEngine<(TransactionRecord, TransferRequest)> {
        let request = TransferRequest::normalize(input, customer, from_account, to_currency)?;
        tracing::debug!(
            account = %from_account.id,
            amount = %request.amount,
            rate = %request.exchange_rate.rate,
            from = %request.exchange_rate.from_currency,
            to = %request.exchange_rate.to_currency,
            "normalized transfer request"
        );

        let rate = ExchangeRateRecord::derive(&request.exchange_rate, request.amount)?;
        let rate_model = exchange_rates::ActiveModel::from(&rate)
            .insert(db_tx)
            .await?;
        let rate = ExchangeRateRecord::try_from(rate_model)?;

        let record = TransactionRecord::derive(&request, rate, kind);
        let model = transactions::ActiveModel::from(&record)
            .insert(db_tx)
            .await?;
        let record = TransactionRecord::try_from((model, record.exchange_rate))?;

        Ok((record, request))
    }

    /// Load a recorded transaction with its exchange rate.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<TransactionRecord> {
        let (model, rate) = transactions::Entity::find_by_id(transaction_id.to_string())
            .find_also_related(exchange_rates::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        to_record(model, rate)
    }

    /// List the transactions recorded against an account, oldest first.
    pub async fn account_transactions(
        &self,
        account_id: Uuid,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        transactions::Entity::find()
            .filter(transactions::Column::FromAccountId.eq(account_id.to_string()))
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .find_also_related(exchange_rates::Entity)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(model, rate)| to_record(model, rate))
            .collect()
    }

    /// Number of persisted exchange-rate records.
    pub async fn exchange_rate_count(&self) -> ResultEngine<u64> {
        Ok(exchange_rates::Entity::find().count(&self.database).await?)
    }
}

fn to_record(
    model: transactions::Model,
    rate: Option<exchange_rates::Model>,
) -> ResultEngine<TransactionRecord> {
    let rate = rate.ok_or_else(|| {
        EngineError::KeyNotFound(format!("exchange rate of transaction {}", model.id))
    })?;
    TransactionRecord::try_from((model, ExchangeRateRecord::try_from(rate)?))
}

fn failed(from_account: &Account, err: EngineError) -> RecordError {
    tracing::error!(account = %from_account.id, error = %err, "unable to create transaction");
    RecordError::Failed(err)
}
