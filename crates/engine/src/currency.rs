//! Currencies known to the ledger.
//!
//! A currency is a persisted reference: accounts and exchange rates point to
//! it by id and never own it. Two currencies are the same currency only when
//! their ids match.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub id: Uuid,
    /// ISO-like code, always 3 uppercase ASCII letters (e.g. `EUR`).
    pub code: String,
    pub name: String,
}

impl Currency {
    pub fn new(code: &str, name: &str) -> ResultEngine<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidName(
                "currency name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            code: normalize_code(code)?,
            name: name.to_string(),
        })
    }

    /// `true` when `other` is the very same persisted currency.
    #[must_use]
    pub fn same_as(&self, other: &Currency) -> bool {
        self.id == other.id
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}

/// Trim and uppercase a currency code, rejecting anything that is not 3 ASCII
/// letters.
pub fn normalize_code(value: &str) -> ResultEngine<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(EngineError::InvalidCurrency(format!(
            "unsupported currency code: {}",
            value.trim()
        )));
    }
    Ok(code)
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Currency> for ActiveModel {
    fn from(currency: &Currency) -> Self {
        Self {
            id: ActiveValue::Set(currency.id.to_string()),
            code: ActiveValue::Set(currency.code.clone()),
            name: ActiveValue::Set(currency.name.clone()),
        }
    }
}

impl TryFrom<Model> for Currency {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "currency")?,
            code: normalize_code(&model.code)?,
            name: model.name,
        })
    }
}
