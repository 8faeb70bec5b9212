use std::error::Error;

use clap::Parser;
use engine::{Engine, TransactionRecord, TransferInput};
use migration::{Migrator, MigratorTrait};

use cli::{
    AccountArgs, AccountCommand, Cli, Command, CurrencyArgs, CurrencyCommand, CustomerArgs,
    CustomerCommand, RecordArgs, TransactionArgs, TransactionCommand,
};

mod cli;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "remit={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let engine = connect_engine(&url).await?;

    match cli.command {
        Command::Currency(CurrencyArgs {
            command: CurrencyCommand::Create { code, name },
        }) => {
            let currency = engine.new_currency(&code, &name).await?;
            println!("created currency: {} ({})", currency.code, currency.id);
        }
        Command::Customer(CustomerArgs {
            command: CustomerCommand::Create { name },
        }) => {
            let customer = engine.new_customer(&name).await?;
            println!("created customer: {} ({})", customer.name, customer.id);
        }
        Command::Account(AccountArgs {
            command:
                AccountCommand::Open {
                    customer,
                    currency,
                    balance,
                },
        }) => {
            let currency = engine.currency_by_code(&currency).await?;
            let account = engine.open_account(customer, currency.id, balance).await?;
            println!(
                "opened account: {} ({} {})",
                account.id, account.balance, account.currency
            );
        }
        Command::Account(AccountArgs {
            command: AccountCommand::Show { id },
        }) => {
            let account = engine.account(id).await?;
            let customer = engine.customer(account.customer_id).await?;
            let stub = account.stub(&customer);
            println!("account:  {}", stub.id);
            println!("customer: {} ({})", customer.name, stub.customer_id);
            println!("currency: {} ({})", account.currency, stub.currency_id);
            println!("balance:  {}", account.balance);
        }
        Command::Transaction(TransactionArgs {
            command: TransactionCommand::Record(args),
        }) => record(&engine, args).await?,
        Command::Transaction(TransactionArgs {
            command: TransactionCommand::Show { id },
        }) => {
            let record = engine.transaction(id).await?;
            print_record(&record);
        }
        Command::Transaction(TransactionArgs {
            command: TransactionCommand::List { account },
        }) => {
            let records = engine.account_transactions(account).await?;
            if records.is_empty() {
                println!("no transactions for account {account}");
            }
            for record in &records {
                print_record(record);
            }
        }
    }

    Ok(())
}

async fn connect_engine(url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!("database ready");
    Ok(Engine::builder().database(database).build().await?)
}

async fn record(engine: &Engine, args: RecordArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let customer = engine.customer(args.customer).await?;
    let account = engine.account(args.account).await?;
    if account.customer_id != customer.id {
        return Err(format!(
            "account {} does not belong to customer {}",
            account.id, customer.id
        )
        .into());
    }
    let to_currency = engine.currency_by_code(&args.to_currency).await?;

    let mut input = TransferInput::new(args.amount);
    input.rate = args.rate;
    input.comment = args.comment;

    let (record, request) = engine
        .record_transaction(input, &customer, &account, args.kind, &to_currency)
        .await?;
    print_record(&record);
    println!(
        "converted {} {} -> {} {}",
        request.amount,
        request.exchange_rate.from_currency,
        record.exchange_rate.converted_amount,
        request.exchange_rate.to_currency
    );
    Ok(())
}

fn print_record(record: &TransactionRecord) {
    println!(
        "{} {} {:<10} amount={} rate={} converted={} snapshot={} comment={}",
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.id,
        record.kind.as_str(),
        record.amount,
        record.exchange_rate.rate,
        record.exchange_rate.converted_amount,
        record.balance_snapshot,
        record.comment
    );
}
