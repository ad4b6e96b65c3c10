//! Runs a single spot trade and prints the confirmation as JSON.
//!
//! Market data comes from the command line. Wallets are seeded in memory
//! from `--balance` flags unless `database_url` is configured, in which case
//! the PostgreSQL ledger and pair directory are used.
//!
//! ```text
//! settle --pair BTCUSDT --bid 29000 --ask 29050 \
//!        --balance USDT=1000 --balance BTC=0 \
//!        --side buy --quantity 0.01
//! ```

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use rust_decimal::Decimal;
use spot_settlement::application::{TradeService, TradeServiceConfig};
use spot_settlement::config::SettlementConfig;
use spot_settlement::domain::entities::{BestPrice, TradeRequest};
use spot_settlement::domain::value_objects::{PairId, Price, Symbol, TradeType, UserId};
use spot_settlement::infrastructure::persistence::in_memory::{
    InMemoryLedger, InMemoryPairDirectory, InMemoryPriceOracle,
};
use spot_settlement::infrastructure::persistence::postgres::{PostgresLedger, PostgresPairDirectory};
use spot_settlement::infrastructure::persistence::traits::{
    LedgerStore, PairResolver, WalletReader,
};
use spot_settlement::telemetry::init_tracing;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "settle", about = "Execute one spot trade")]
struct Args {
    /// Configuration file (without extension is fine).
    #[arg(long)]
    config: Option<String>,

    /// Pair listing name, e.g. BTCUSDT.
    #[arg(long)]
    pair: String,

    /// Pair id to list the pair under (in-memory mode).
    #[arg(long, default_value_t = 1)]
    pair_id: i64,

    /// Best bid.
    #[arg(long)]
    bid: Option<Decimal>,

    /// Best ask.
    #[arg(long)]
    ask: Option<Decimal>,

    /// Trading user.
    #[arg(long, default_value_t = 1)]
    user: i64,

    /// BUY or SELL.
    #[arg(long)]
    side: TradeType,

    /// Base-currency quantity.
    #[arg(long)]
    quantity: Decimal,

    /// Starting balance as SYMBOL=AMOUNT (in-memory mode, repeatable).
    #[arg(long = "balance")]
    balances: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = SettlementConfig::load(args.config.as_deref())?;
    init_tracing(&config.log);

    let quote_symbols = config.quote_symbols()?;
    let oracle = InMemoryPriceOracle::new();
    oracle.publish(BestPrice::new(
        args.pair.to_ascii_uppercase(),
        args.bid.map(Price::new).transpose()?,
        args.ask.map(Price::new).transpose()?,
    ));

    let user_id = UserId::new(args.user);
    let resolver: Arc<dyn PairResolver>;
    let wallets: Arc<dyn WalletReader>;
    let ledger: Arc<dyn LedgerStore>;
    let pair_id = match &config.database_url {
        Some(url) => {
            let store = Arc::new(PostgresLedger::connect(url, 5).await?);
            let directory = PostgresPairDirectory::new(store.pool().clone());
            let pair_id = directory
                .resolve_pair_id(&args.pair.to_ascii_uppercase())
                .await?
                .ok_or_else(|| anyhow!("pair {} is not listed", args.pair))?;
            resolver = Arc::new(directory);
            wallets = store.clone();
            ledger = store;
            pair_id
        }
        None => {
            let directory = InMemoryPairDirectory::new();
            let pair = directory.list_name(PairId::new(args.pair_id), &args.pair, &quote_symbols)?;
            let store = Arc::new(InMemoryLedger::new());
            for entry in &args.balances {
                let (symbol, amount) = parse_balance(entry)?;
                store.set_balance(user_id, symbol, amount).await;
            }
            resolver = Arc::new(directory);
            wallets = store.clone();
            ledger = store;
            pair.id()
        }
    };

    let service = TradeService::new(
        Arc::new(oracle),
        resolver,
        wallets,
        ledger,
        TradeServiceConfig::from(&config),
    );

    let request = TradeRequest::new(user_id, pair_id, args.side, args.quantity);
    match service.execute_trade(request).await {
        Ok(confirmation) => {
            println!("{}", serde_json::to_string_pretty(&confirmation)?);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_balance(entry: &str) -> anyhow::Result<(Symbol, Decimal)> {
    let Some((symbol, amount)) = entry.split_once('=') else {
        bail!("balance must look like SYMBOL=AMOUNT, got {entry}");
    };
    let symbol = Symbol::new(symbol)?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .with_context(|| format!("invalid amount in {entry}"))?;
    Ok((symbol, amount))
}
