use clap::{Args, Parser, Subcommand};
use engine::TransactionKind;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "remit")]
#[command(about = "Record customer transactions with currency conversion")]
pub struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    pub config: String,

    /// Database connection string; overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Currency(CurrencyArgs),
    Customer(CustomerArgs),
    Account(AccountArgs),
    Transaction(TransactionArgs),
}

#[derive(Args, Debug)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
pub enum CurrencyCommand {
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    Open {
        #[arg(long)]
        customer: Uuid,
        /// Currency code, e.g. `EUR`.
        #[arg(long)]
        currency: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: Decimal,
    },
    Show {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct TransactionArgs {
    #[command(subcommand)]
    pub command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    Record(RecordArgs),
    Show {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        account: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long)]
    pub customer: Uuid,
    #[arg(long)]
    pub account: Uuid,
    /// Destination currency code.
    #[arg(long)]
    pub to_currency: String,
    #[arg(long, value_parser = parse_kind)]
    pub kind: TransactionKind,
    /// Amount in the account currency; the sign is ignored.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,
    /// Required when the destination currency differs from the account one.
    #[arg(long)]
    pub rate: Option<Decimal>,
    #[arg(long)]
    pub comment: Option<String>,
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}
