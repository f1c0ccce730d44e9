use alerter::{ConsoleSink, LineAlerter, NotificationSink, deliver};
use anyhow::Context;
use api_client::{MarketDataProvider, NewsClient, ReferenceScraper, YahooClient};
use clap::{Parser, Subcommand};
use configuration::{
    Config, InstrumentConfig, LineConfig, MarketConfig, MemoryTarget, PanicPriority, ScalarSource,
    init_logging, load_config,
};
use core_types::{NewsSentiment, SpotTrend};
use futures::future::join_all;
use report::{
    InstrumentReport, MaWindows, MemoryEntry, MemoryReport, MemoryStockReport, RadarReport,
    ReportEntry, memory_table, summary_table,
};
use std::path::PathBuf;
use strategies::settlement::{days_to_settlement, market_today};
use strategies::{
    AuxiliaryInputs, SnapshotBuilder, StrategyError, create_evaluator, evaluate_memory,
    memory_averages,
};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// The main entry point for the radar application.
///
/// Only configuration and logging setup failures produce a non-zero exit;
/// per-instrument fetch problems end up as notices inside the report.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // LINE credentials usually live in a local .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    let run_id = Uuid::new_v4();
    match cli.command {
        Commands::Scan(args) => {
            if let Some(priority) = args.panic_priority {
                config.rules.panic_priority = priority;
            }
            let span = info_span!("run", %run_id, command = "scan");
            handle_scan(args, &config).instrument(span).await
        }
        Commands::Memory(args) => {
            let span = info_span!("run", %run_id, command = "memory");
            handle_memory(args, &config).instrument(span).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Daily threshold signals for leveraged funds, index funds and equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured instrument and push the radar report.
    Scan(ScanArgs),
    /// Run the memory-sector scan (spot prices, contract news, memory stocks).
    Memory(MemoryArgs),
}

#[derive(Parser)]
struct ScanArgs {
    /// Print the report and a summary table instead of pushing it.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print the report as JSON.
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Override which rule wins when take-profit and panic-buy both fire.
    #[arg(long, value_enum)]
    panic_priority: Option<PanicPriority>,
}

#[derive(Parser)]
struct MemoryArgs {
    /// Print the report and a summary table instead of pushing it.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print the report as JSON.
    #[arg(long, requires = "dry_run")]
    json: bool,
}

// ==============================================================================
// Scan Command Logic
// ==============================================================================

async fn handle_scan(args: ScanArgs, config: &Config) -> anyhow::Result<()> {
    let provider = YahooClient::new(&config.market).context("Failed to build market data client")?;
    let scraper = ReferenceScraper::new(&config.market).context("Failed to build scraper")?;

    let today = market_today(config.market.utc_offset_hours);
    let days = days_to_settlement(today);
    let volatility = fetch_volatility_index(&provider, &config.market).await;
    info!(%today, ?days, ?volatility, instruments = config.instruments.len(), "Starting scan");

    let builder = SnapshotBuilder::new(&config.indicators);
    let context = ScanContext {
        provider: &provider,
        scraper: &scraper,
        builder: &builder,
        config,
        volatility,
        days_to_settlement: days,
    };

    // Instruments are independent; fetch them concurrently, keep config order.
    let tasks = config.instruments.iter().map(|instrument| {
        let span = info_span!("instrument", symbol = %instrument.symbol);
        scan_instrument(&context, instrument).instrument(span)
    });
    let entries = join_all(tasks).await;

    let mut report = RadarReport::new(today, MaWindows::from(&config.indicators));
    for entry in entries {
        report.push(entry);
    }

    let message = report.render();
    if args.dry_run {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        } else {
            println!("{}\n", message);
            println!("{}", summary_table(&report));
        }
        return Ok(());
    }

    publish(&config.line, &message).await;
    Ok(())
}

/// Everything one instrument evaluation borrows from the run.
struct ScanContext<'a> {
    provider: &'a dyn MarketDataProvider,
    scraper: &'a ReferenceScraper,
    builder: &'a SnapshotBuilder,
    config: &'a Config,
    volatility: Option<f64>,
    days_to_settlement: Option<u32>,
}

async fn scan_instrument(ctx: &ScanContext<'_>, instrument: &InstrumentConfig) -> ReportEntry {
    let symbol = instrument.symbol.as_str();

    let (candles, nav, spread) = tokio::join!(
        ctx.provider
            .fetch_daily_candles(symbol, &ctx.config.market.history_range),
        optional_scalar(ctx.scraper, instrument.nav_source.as_ref()),
        optional_scalar(ctx.scraper, instrument.spread_source.as_ref()),
    );

    let candles = match candles {
        Ok(candles) => candles,
        Err(e) => {
            warn!(error = %e, "Failed to fetch price history");
            return ReportEntry::Failed {
                symbol: symbol.to_string(),
                error: e.to_string(),
            };
        }
    };

    let aux = AuxiliaryInputs {
        volatility_index: ctx.volatility,
        nav,
        settlement_spread: spread,
        days_to_settlement: if instrument.futures_linked {
            ctx.days_to_settlement
        } else {
            None
        },
    };

    let snapshot = match ctx.builder.build(symbol, &candles, aux) {
        Ok(snapshot) => snapshot,
        Err(StrategyError::InsufficientData { required, available }) => {
            warn!(required, available, "Not enough history to evaluate");
            return ReportEntry::InsufficientData {
                symbol: symbol.to_string(),
                required,
            };
        }
        Err(e) => {
            warn!(error = %e, "Failed to build snapshot");
            return ReportEntry::Failed {
                symbol: symbol.to_string(),
                error: e.to_string(),
            };
        }
    };

    let evaluator = match create_evaluator(instrument.class, ctx.config) {
        Ok(evaluator) => evaluator,
        Err(e) => {
            warn!(error = %e, "Failed to create evaluator");
            return ReportEntry::Failed {
                symbol: symbol.to_string(),
                error: e.to_string(),
            };
        }
    };

    let signal = evaluator.evaluate(&snapshot);
    info!(action = ?signal.action, reason = %signal.reason, "Instrument evaluated");

    ReportEntry::Evaluated(InstrumentReport {
        name: instrument.display_name().to_string(),
        snapshot,
        signal,
    })
}

async fn optional_scalar(scraper: &ReferenceScraper, source: Option<&ScalarSource>) -> Option<f64> {
    match source {
        Some(source) => scraper.fetch_scalar(source).await,
        None => None,
    }
}

/// The market-wide volatility gauge. `None` when disabled or unavailable.
async fn fetch_volatility_index(
    provider: &dyn MarketDataProvider,
    market: &MarketConfig,
) -> Option<f64> {
    let symbol = market.volatility_symbol.as_deref()?;
    match provider.fetch_latest_close(symbol).await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(symbol, error = %e, "Volatility index unavailable, panic rules disabled");
            None
        }
    }
}

// ==============================================================================
// Memory Command Logic
// ==============================================================================

async fn handle_memory(args: MemoryArgs, config: &Config) -> anyhow::Result<()> {
    let provider = YahooClient::new(&config.market).context("Failed to build market data client")?;
    let scraper = ReferenceScraper::new(&config.market).context("Failed to build scraper")?;
    let news = NewsClient::new(&config.market, &config.memory).context("Failed to build news client")?;

    let memory = &config.memory;
    let today = market_today(config.market.utc_offset_hours);

    let (board, digest) = tokio::join!(scraper.fetch_spot_board(&memory.spot_url), news.fetch_digest());
    info!(
        trend = ?board.trend,
        fallback = board.from_fallback,
        news = ?digest.sentiment,
        headlines = digest.titles.len(),
        "Memory sector context gathered"
    );

    let tasks = memory.targets.iter().map(|target| {
        let span = info_span!("memory_target", symbol = %target.symbol);
        scan_memory_target(&provider, config, target, board.trend, digest.sentiment).instrument(span)
    });
    let entries = join_all(tasks).await;

    let mut report = MemoryReport::new(
        today,
        board,
        digest.sentiment,
        digest.titles,
        memory.ma_slow,
    );
    for entry in entries {
        report.push(entry);
    }

    let message = report.render();
    if args.dry_run {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        } else {
            println!("{}\n", message);
            println!("{}", memory_table(&report));
        }
        return Ok(());
    }

    publish(&config.line, &message).await;
    Ok(())
}

async fn scan_memory_target(
    provider: &dyn MarketDataProvider,
    config: &Config,
    target: &MemoryTarget,
    trend: SpotTrend,
    news: NewsSentiment,
) -> MemoryEntry {
    let memory = &config.memory;
    let candles = match provider
        .fetch_daily_candles(&target.symbol, &memory.history_range)
        .await
    {
        Ok(candles) => candles,
        Err(e) => {
            warn!(error = %e, "Failed to fetch price history");
            return MemoryEntry::Failed {
                name: target.name.clone(),
                error: e.to_string(),
            };
        }
    };

    let averages = match memory_averages(&candles, memory.ma_fast, memory.ma_slow) {
        Ok(averages) => averages,
        Err(e) => {
            warn!(error = %e, "Not enough history to evaluate");
            return MemoryEntry::InsufficientData {
                name: target.name.clone(),
            };
        }
    };

    let signal = evaluate_memory(&averages, trend, news);
    info!(action = ?signal.action, "Memory stock evaluated");

    MemoryEntry::Evaluated(MemoryStockReport {
        code: target.code.clone(),
        name: target.name.clone(),
        focus: target.focus,
        price: averages.price,
        ma_slow: averages.ma_slow,
        signal,
    })
}

// ==============================================================================
// Delivery
// ==============================================================================

/// Pushes to LINE when credentials are present, otherwise prints.
async fn publish(line: &LineConfig, message: &str) {
    let sink: Box<dyn NotificationSink> = match LineAlerter::new(line) {
        Some(alerter) => Box::new(alerter),
        None => Box::new(ConsoleSink),
    };
    deliver(sink.as_ref(), message).await;
}
