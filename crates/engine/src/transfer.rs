//! Transfer request types.
//!
//! [`TransferInput`] is what a caller hands in: an amount with any sign, an
//! optional rate and an optional comment. [`TransferRequest`] is the
//! normalized form the recorder works from and hands back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Account, Currency, Customer, EngineError, ResultEngine};

/// Comment stored when the caller does not supply one.
pub const DEFAULT_COMMENT: &str = "N/A";

/// Raw transfer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferInput {
    /// Amount in the source account currency. The sign is ignored: the
    /// direction of a transaction is carried by its kind.
    pub amount: Decimal,
    /// Conversion multiplier, required when the destination currency differs
    /// from the account currency.
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TransferInput {
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            rate: None,
            comment: None,
        }
    }

    #[must_use]
    pub fn rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check the input against the resolved account and destination currency.
    ///
    /// Rules:
    /// - the amount must be non-zero (any sign)
    /// - across currencies a rate is required and must be > 0
    /// - within one currency the rate is ignored, whatever its value
    pub fn validate(&self, from_account: &Account, to_currency: &Currency) -> ResultEngine<()> {
        if self.amount.is_zero() {
            return Err(EngineError::InvalidAmount(
                "amount must be non-zero".to_string(),
            ));
        }
        if from_account.currency.same_as(to_currency) {
            return Ok(());
        }
        match self.rate {
            None => Err(missing_rate(&from_account.currency, to_currency)),
            Some(rate) if rate <= Decimal::ZERO => Err(EngineError::InvalidRate(format!(
                "rate {}->{} must be > 0, got {rate}",
                from_account.currency.code, to_currency.code
            ))),
            Some(_) => Ok(()),
        }
    }
}

fn missing_rate(from: &Currency, to: &Currency) -> EngineError {
    EngineError::MissingRate(format!(
        "a rate is required to convert {} to {}",
        from.code, to.code
    ))
}

/// Conversion applied to one transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSpec {
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub rate: Decimal,
}

/// Normalized transfer, built from a [`TransferInput`] at recording time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Always `>= 0`.
    pub amount: Decimal,
    pub customer: Customer,
    pub from_account: Account,
    /// Balance of `from_account` when the request was built.
    pub balance_snapshot: Decimal,
    pub exchange_rate: ExchangeRateSpec,
    pub comment: String,
}

impl TransferRequest {
    /// Normalize `input`.
    ///
    /// Within one currency the rate is forced to exactly 1. Across currencies
    /// the supplied rate is used as is; a missing rate is an error, never
    /// replaced by a default.
    pub fn normalize(
        input: TransferInput,
        customer: &Customer,
        from_account: &Account,
        to_currency: &Currency,
    ) -> ResultEngine<Self> {
        let rate = if from_account.currency.same_as(to_currency) {
            Decimal::ONE
        } else {
            input
                .rate
                .ok_or_else(|| missing_rate(&from_account.currency, to_currency))?
        };

        Ok(Self {
            amount: input.amount.abs(),
            customer: customer.clone(),
            from_account: from_account.clone(),
            balance_snapshot: from_account.balance,
            exchange_rate: ExchangeRateSpec {
                from_currency: from_account.currency.clone(),
                to_currency: to_currency.clone(),
                rate,
            },
            comment: input
                .comment
                .unwrap_or_else(|| DEFAULT_COMMENT.to_string()),
        })
    }
}
