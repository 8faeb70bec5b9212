//! The module contains `Account` struct and its implementation.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Customer, EngineError,
    util::{parse_decimal, parse_uuid},
};

/// A customer account.
///
/// An account holds money in exactly one currency. The `balance` is the live
/// balance as stored when the account was loaded; transactions only keep a
/// snapshot of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: Currency,
    pub balance: Decimal,
}

/// Lightweight account reference: ids only, no balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountStub {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency_id: Uuid,
}

impl Account {
    pub fn new(customer_id: Uuid, currency: Currency, balance: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            currency,
            balance,
        }
    }

    /// Build an id-only reference to this account, owned by `customer`.
    ///
    /// The customer id is taken from `customer`, not from the account, so the
    /// stub reflects the pairing the caller resolved.
    #[must_use]
    pub fn stub(&self, customer: &Customer) -> AccountStub {
        AccountStub {
            id: self.id,
            customer_id: customer.id,
            currency_id: self.currency.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub currency_id: String,
    pub balance: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::currency::Entity",
        from = "Column::CurrencyId",
        to = "super::currency::Column::Id"
    )]
    Currency,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::currency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currency.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            customer_id: ActiveValue::Set(account.customer_id.to_string()),
            currency_id: ActiveValue::Set(account.currency.id.to_string()),
            balance: ActiveValue::Set(account.balance.to_string()),
        }
    }
}

impl TryFrom<(Model, Currency)> for Account {
    type Error = EngineError;

    fn try_from((model, currency): (Model, Currency)) -> Result<Self, Self::Error> {
        if model.currency_id != currency.id.to_string() {
            return Err(EngineError::InvalidCurrency(format!(
                "account currency is {}, got {}",
                model.currency_id, currency.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            customer_id: parse_uuid(&model.customer_id, "customer")?,
            currency,
            balance: parse_decimal(&model.balance, "balance")?,
        })
    }
}
