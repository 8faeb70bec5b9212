//! Exchange-rate records.
//!
//! One record is written for every transaction, holding the rate applied and
//! the converted amount. Records are never updated or shared: each belongs to
//! the single transaction that references it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExchangeRateSpec, ResultEngine,
    util::{parse_decimal, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    pub id: Uuid,
    pub from_currency_id: Uuid,
    pub to_currency_id: Uuid,
    pub rate: Decimal,
    /// `amount * rate`, in the destination currency.
    pub converted_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ExchangeRateRecord {
    /// Build a fresh record converting `amount` with `spec`.
    ///
    /// Fails with `InvalidAmount` when `amount * rate` does not fit a
    /// `Decimal`.
    pub fn derive(spec: &ExchangeRateSpec, amount: Decimal) -> ResultEngine<Self> {
        let converted_amount = amount.checked_mul(spec.rate).ok_or_else(|| {
            EngineError::InvalidAmount("converted amount too large".to_string())
        })?;
        Ok(Self {
            id: Uuid::new_v4(),
            from_currency_id: spec.from_currency.id,
            to_currency_id: spec.to_currency.id,
            rate: spec.rate,
            converted_amount,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_currency_id: String,
    pub to_currency_id: String,
    pub rate: String,
    pub converted_amount: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::FromCurrencyId",
        to = "super::currency::Column::Id"
    )]
    FromCurrency,
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::ToCurrencyId",
        to = "super::currency::Column::Id"
    )]
    ToCurrency,
    #[sea_orm(has_one = "super::transactions::Entity")]
    Transaction,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExchangeRateRecord> for ActiveModel {
    fn from(record: &ExchangeRateRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            from_currency_id: ActiveValue::Set(record.from_currency_id.to_string()),
            to_currency_id: ActiveValue::Set(record.to_currency_id.to_string()),
            rate: ActiveValue::Set(record.rate.to_string()),
            converted_amount: ActiveValue::Set(record.converted_amount.to_string()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for ExchangeRateRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "exchange rate")?,
            from_currency_id: parse_uuid(&model.from_currency_id, "currency")?,
            to_currency_id: parse_uuid(&model.to_currency_id, "currency")?,
            rate: parse_decimal(&model.rate, "rate")?,
            converted_amount: parse_decimal(&model.converted_amount, "converted amount")?,
            created_at: model.created_at,
        })
    }
}
