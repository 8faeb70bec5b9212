//! Ledger engine: records customer transactions with their currency
//! conversion in one atomic unit of work.
//!
//! The entry point is [`Engine`]. A typical write resolves the customer, the
//! source account and the destination currency, then calls
//! [`Engine::record_transaction`]:
//!
//! ```no_run
//! # async fn demo(engine: engine::Engine) -> Result<(), Box<dyn std::error::Error>> {
//! use engine::{TransactionKind, TransferInput};
//! use rust_decimal::Decimal;
//!
//! let usd = engine.currency_by_code("USD").await?;
//! let eur = engine.currency_by_code("EUR").await?;
//! let alice = engine.new_customer("Alice").await?;
//! let account = engine.open_account(alice.id, usd.id, Decimal::new(200, 0)).await?;
//!
//! let input = TransferInput::new(Decimal::new(-50, 0)).rate(Decimal::new(9, 1));
//! let (record, _request) = engine
//!     .record_transaction(input, &alice, &account, TransactionKind::Debit, &eur)
//!     .await?;
//! assert_eq!(record.exchange_rate.converted_amount, Decimal::new(45, 0));
//! # Ok(())
//! # }
//! ```

pub use accounts::{Account, AccountStub};
pub use currency::Currency;
pub use customers::Customer;
pub use error::{EngineError, RecordError};
pub use exchange_rates::ExchangeRateRecord;
pub use ops::{Engine, EngineBuilder};
pub use transactions::{TransactionKind, TransactionRecord};
pub use transfer::{DEFAULT_COMMENT, ExchangeRateSpec, TransferInput, TransferRequest};

mod accounts;
mod currency;
mod customers;
mod error;
mod exchange_rates;
mod ops;
mod transactions;
mod transfer;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
