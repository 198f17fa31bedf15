//! GapFinder service entry point.

use clap::{Parser, Subcommand};
use gapfinder::{
    cache::ResultCache,
    config::Config,
    gap,
    gate::{self, RateLimitGate},
    server::{self, AppState},
    session::{Phase, ScanSession},
    source::BybitSource,
    storage::Store,
    ticker::CyclingDisplay,
    types::InvestmentAmount,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gapfinder")]
#[command(about = "Cross-venue price gap scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (scan + status)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a single scan from the terminal
    Scan {
        /// Notional amount for the profit projection
        #[arg(short, long)]
        amount: Option<u32>,
    },
    /// Show cooldown and the cached result
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => serve_api(config, port).await,
        Commands::Scan { amount } => run_scan(config, amount).await,
        Commands::Status => show_status(config).await,
    }
}

async fn build_session(config: &Config) -> anyhow::Result<Arc<ScanSession>> {
    let store = Store::connect(&config.storage.expanded_path()).await?;
    let feed = Arc::new(BybitSource::new(&config.quote)?);
    let cache = ResultCache::new(store.clone(), config.cache.ttl_hours);
    let gate = RateLimitGate::new(store, config.gate.cooldown_hours);
    let session = ScanSession::new(feed, cache, gate, config.scan.clone());

    if session.hydrate().await? {
        tracing::info!("hydrated previous scan result from cache");
    }
    Ok(session)
}

async fn serve_api(config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    let session = build_session(&config).await?;
    let display = CyclingDisplay::spawn(&config.ticker, session.phase_watch());
    let port = port_override.unwrap_or(config.server.port);

    let state = Arc::new(AppState {
        session,
        display,
        config,
    });
    server::serve(state, port)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

async fn run_scan(config: Config, amount: Option<u32>) -> anyhow::Result<()> {
    let amount = InvestmentAmount::new(amount.unwrap_or(config.scan.default_investment))?;
    let session = build_session(&config).await?;

    let mut snapshot = session.snapshot().await;
    if snapshot.phase == Phase::Revealed {
        println!("Showing cached result (scan again after the cooldown expires)");
    } else {
        session.start().await?;
        println!("Scanning exchanges...");
        loop {
            tokio::time::sleep(Duration::from_millis(200)).await;
            snapshot = session.snapshot().await;
            if snapshot.phase == Phase::Revealed {
                break;
            }
        }
    }

    if let (Some(quote), Some(gap_figures)) = (snapshot.quote, snapshot.gap) {
        let projection = gap::project(amount, quote.reference_price, gap_figures.comparison_price);
        println!("\n✅ Gap found: Bybit ↔ KvamDex ({})", config.quote.symbol);
        println!("Bybit rate:    ${:.6}", quote.reference_price);
        println!("KvamDex rate:  ${:.6}", gap_figures.comparison_price);
        println!("Gap:           +{:.2}%", gap_figures.gap_percent);
        println!(
            "On {:.0} USDT:  +${:.2} ({:.2} USDT total)",
            amount.get(),
            projection.profit,
            projection.final_amount
        );
    }

    session.dispose().await;
    Ok(())
}

async fn show_status(config: Config) -> anyhow::Result<()> {
    let session = build_session(&config).await?;

    println!("\n📊 GapFinder Status\n");
    match session.cooldown_remaining().await? {
        Some(remaining) => println!("Cooldown: {} remaining", gate::format_remaining(remaining)),
        None => println!("Cooldown: none, ready to scan"),
    }

    let snapshot = session.snapshot().await;
    match (snapshot.quote, snapshot.gap) {
        (Some(quote), Some(gap_figures)) => {
            println!("Cached result (captured {}):", quote.fetched_at);
            println!("  Bybit rate:   ${:.6}", quote.reference_price);
            println!("  KvamDex rate: ${:.6}", gap_figures.comparison_price);
            println!("  Gap:          +{:.2}%", gap_figures.gap_percent);
        }
        _ => println!("No cached result"),
    }

    println!("\nVenues:");
    println!("  {}", config.links.reference_venue);
    println!("  {}", config.links.comparison_venue);
    println!("Contact: {}", config.links.contact);

    session.dispose().await;
    Ok(())
}
