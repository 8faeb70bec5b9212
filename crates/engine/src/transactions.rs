//! Transaction records.
//!
//! A `TransactionRecord` is an append-only ledger entry: it is written once,
//! together with the `ExchangeRateRecord` it owns, and never changed after.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExchangeRateRecord, TransferRequest,
    util::{parse_decimal, parse_uuid},
};

/// What a transaction means for its account. Chosen by the caller; the amount
/// itself is always non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Debit,
    Credit,
    Transfer,
    Deposit,
    Withdrawal,
    Fee,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Transfer => "transfer",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Fee => "fee",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            "transfer" => Ok(Self::Transfer),
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "fee" => Ok(Self::Fee),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Balance of the source account when the transaction was created.
    pub balance_snapshot: Decimal,
    pub comment: String,
    pub customer_id: Uuid,
    pub from_account_id: Uuid,
    pub exchange_rate: ExchangeRateRecord,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Build the ledger entry for `request`, owning `exchange_rate`.
    pub fn derive(
        request: &TransferRequest,
        exchange_rate: ExchangeRateRecord,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount: request.amount,
            balance_snapshot: request.balance_snapshot,
            comment: request.comment.clone(),
            customer_id: request.customer.id,
            from_account_id: request.from_account.id,
            exchange_rate,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount: String,
    pub balance_snapshot: String,
    pub comment: String,
    pub customer_id: String,
    pub from_account_id: String,
    #[sea_orm(unique)]
    pub exchange_rate_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::exchange_rates::Entity",
        from = "Column::ExchangeRateId",
        to = "super::exchange_rates::Column::Id"
    )]
    ExchangeRate,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::exchange_rates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExchangeRate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionRecord> for ActiveModel {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.to_string()),
            balance_snapshot: ActiveValue::Set(tx.balance_snapshot.to_string()),
            comment: ActiveValue::Set(tx.comment.clone()),
            customer_id: ActiveValue::Set(tx.customer_id.to_string()),
            from_account_id: ActiveValue::Set(tx.from_account_id.to_string()),
            exchange_rate_id: ActiveValue::Set(tx.exchange_rate.id.to_string()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<(Model, ExchangeRateRecord)> for TransactionRecord {
    type Error = EngineError;

    fn try_from((model, exchange_rate): (Model, ExchangeRateRecord)) -> Result<Self, Self::Error> {
        if parse_uuid(&model.exchange_rate_id, "exchange rate")? != exchange_rate.id {
            return Err(EngineError::InvalidId(format!(
                "transaction {} does not own exchange rate {}",
                model.id, exchange_rate.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: parse_decimal(&model.amount, "amount")?,
            balance_snapshot: parse_decimal(&model.balance_snapshot, "balance snapshot")?,
            comment: model.comment,
            customer_id: parse_uuid(&model.customer_id, "customer")?,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            exchange_rate,
            created_at: model.created_at,
        })
    }
}
