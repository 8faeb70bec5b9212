//! Currencies, customers and accounts.
//!
//! The recorder only ever receives resolved values; these operations are how
//! callers create and resolve them.

use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, Currency, Customer, EngineError, ResultEngine, accounts,
    currency::{self, normalize_code},
    customers,
    util::{normalize_required_name, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Open a unit of work owned by the caller.
    ///
    /// Pass it to the `*_in` operations and commit (or roll back) it yourself.
    pub async fn begin(&self) -> ResultEngine<DatabaseTransaction> {
        Ok(self.database.begin().await?)
    }

    /// Register a new currency. Codes are unique.
    pub async fn new_currency(&self, code: &str, name: &str) -> ResultEngine<Currency> {
        let currency = Currency::new(code, name)?;
        with_tx!(self, |db_tx| {
            let exists = currency::Entity::find()
                .filter(currency::Column::Code.eq(currency.code.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                Err(EngineError::ExistingKey(currency.code.clone()))
            } else {
                currency::ActiveModel::from(&currency).insert(&db_tx).await?;
                tracing::debug!(code = %currency.code, id = %currency.id, "currency created");
                Ok(currency)
            }
        })
    }

    pub async fn currency(&self, currency_id: Uuid) -> ResultEngine<Currency> {
        load_currency(&self.database, currency_id).await
    }

    /// Resolve a currency by code (case-insensitive).
    pub async fn currency_by_code(&self, code: &str) -> ResultEngine<Currency> {
        let code = normalize_code(code)?;
        let model = currency::Entity::find()
            .filter(currency::Column::Code.eq(code.as_str()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(code.clone()))?;
        Currency::try_from(model)
    }

    pub async fn new_customer(&self, name: &str) -> ResultEngine<Customer> {
        let customer = Customer::new(normalize_required_name(name, "customer")?);
        customers::ActiveModel::from(&customer)
            .insert(&self.database)
            .await?;
        tracing::debug!(id = %customer.id, "customer created");
        Ok(customer)
    }

    pub async fn customer(&self, customer_id: Uuid) -> ResultEngine<Customer> {
        let model = customers::Entity::find_by_id(customer_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;
        Customer::try_from(model)
    }

    /// Open an account for `customer_id` in `currency_id`.
    pub async fn open_account(
        &self,
        customer_id: Uuid,
        currency_id: Uuid,
        opening_balance: Decimal,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            customers::Entity::find_by_id(customer_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;
            let currency = load_currency(&db_tx, currency_id).await?;

            let account = Account::new(customer_id, currency, opening_balance);
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            tracing::debug!(
                id = %account.id,
                customer = %customer_id,
                currency = %account.currency,
                "account opened"
            );
            Ok(account)
        })
    }

    /// Return an account with its current balance and resolved currency.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        let currency_id = parse_uuid(&model.currency_id, "currency")?;
        let currency = load_currency(&self.database, currency_id).await?;
        Account::try_from((model, currency))
    }

    /// Overwrite the live balance of an account inside a caller-owned unit of
    /// work.
    ///
    /// Recording a transaction never touches the live balance; callers that
    /// want both changes to land together run this on the same `db_tx`.
    pub async fn set_account_balance_in(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        balance: Decimal,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(balance.to_string()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        Ok(())
    }
}

async fn load_currency<C: ConnectionTrait>(db: &C, currency_id: Uuid) -> ResultEngine<Currency> {
    let model = currency::Entity::find_by_id(currency_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("currency not exists".to_string()))?;
    Currency::try_from(model)
}
