use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};

use reactwatch::config::Config;
use reactwatch::db::DedupStore;
use reactwatch::linkedin::client::LinkedInClient;
use reactwatch::notify::discord::DiscordNotifier;
use reactwatch::pipeline::{self, PollContext, Scheduler};

/// Reactwatch: announce new LinkedIn post reactions in a Discord channel.
///
/// Polls the tracked person's or organization's recent posts, finds
/// reactions it hasn't announced yet, posts each one to Discord once, and
/// remembers it so it is never announced again.
#[derive(Parser)]
#[command(name = "reactwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Poll forever on the configured interval until interrupted
    Run,

    /// Run a single poll cycle and exit
    PollOnce,

    /// Show how many reactions have been announced
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reactwatch=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Reactwatch database...");
            let config = Config::load()?;
            let db = init_database(&config).await?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", database_label(&config));
            println!("Tables created: {table_count}");
            println!("\nReactwatch is ready. Next step: set up your .env file");
            println!("  (see .env.example for required variables)");
            println!("\nThen run: cargo run -- run");
        }

        Commands::Run => {
            let config = Config::load()?;
            let ctx = build_context(&config).await?;

            let (trigger, signal) = pipeline::shutdown_channel();
            tokio::spawn(async move {
                wait_for_shutdown_signal().await;
                info!("Shutdown signal received, finishing in-flight work");
                trigger.trigger();
            });

            let summary = Scheduler::new(ctx, config.poll_interval).run(signal).await;
            println!(
                "{} ({} cycles run, {} overlapped)",
                "Reactwatch stopped.".bold(),
                summary.cycles_completed,
                summary.cycles_overlapped
            );
        }

        Commands::PollOnce => {
            let config = Config::load()?;
            let ctx = build_context(&config).await?;

            let (trigger, signal) = pipeline::shutdown_channel();
            tokio::spawn(async move {
                wait_for_shutdown_signal().await;
                trigger.trigger();
            });

            let report = pipeline::run_cycle(ctx, signal).await;
            print_cycle_report(&report);
        }

        Commands::Status => {
            let config = Config::load()?;
            let db = open_database(&config).await?;
            reactwatch::status::show(&db, &database_label(&config)).await?;
        }
    }

    Ok(())
}

/// Build the shared context for `run` and `poll-once`.
///
/// Every failure here is fatal: missing credentials, a Discord token or
/// channel that doesn't check out, or a store that can't be opened.
async fn build_context(config: &Config) -> Result<Arc<PollContext>> {
    config.require_linkedin()?;
    config.require_discord()?;

    let notifier = DiscordNotifier::new(
        &config.discord_api_url,
        &config.discord_token,
        &config.discord_channel_id,
    )?;
    notifier.verify().await?;

    let store = init_database(config).await?;

    let social = LinkedInClient::new(
        &config.linkedin_api_url,
        &config.linkedin_api_key,
        config.entity.clone(),
    )?;

    info!(
        entity = config.entity.id.as_str(),
        kind = config.entity.kind.as_str(),
        interval_secs = config.poll_interval.as_secs(),
        post_delay_ms = config.post_delay.as_millis() as u64,
        "Tracking LinkedIn reactions"
    );

    Ok(Arc::new(PollContext {
        social: Arc::new(social),
        notifier: Arc::new(notifier),
        store,
        post_delay: config.post_delay,
    }))
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler, using Ctrl-C only"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_cycle_report(report: &pipeline::CycleReport) {
    println!("Posts tracked: {}", report.posts_listed);
    println!(
        "Posts processed: {} ({} failed)",
        report.posts_processed, report.posts_failed
    );
    println!("Reactions fetched: {}", report.reactions_fetched);
    println!(
        "New reactions announced: {}",
        report.announced.to_string().bold()
    );
    if report.notify_failures > 0 {
        println!(
            "  {} {} announcements failed, will retry next cycle",
            "Warning:".yellow(),
            report.notify_failures
        );
    }
    if report.store_failures > 0 {
        println!(
            "  {} {} store operations failed, those reactions may be announced again",
            "Warning:".yellow(),
            report.store_failures
        );
    }
    if report.interrupted {
        println!("  {}", "Cycle interrupted by shutdown.".dimmed());
    }
}

fn database_label(config: &Config) -> String {
    match config.database_url {
        Some(ref url) if is_postgres_url(url) => "PostgreSQL (DATABASE_URL)".to_string(),
        _ => config.db_path.clone(),
    }
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Open an existing store for read-only reporting.
///
/// When DATABASE_URL is set and points to PostgreSQL, uses the Postgres backend
/// (requires the `postgres` feature). Otherwise, falls back to SQLite.
async fn open_database(config: &Config) -> Result<Arc<dyn DedupStore>> {
    if let Some(ref url) = config.database_url {
        if is_postgres_url(url) {
            #[cfg(feature = "postgres")]
            {
                info!("Using PostgreSQL backend");
                return reactwatch::db::connect_postgres(url).await;
            }
            #[cfg(not(feature = "postgres"))]
            anyhow::bail!(
                "DATABASE_URL points to PostgreSQL but the 'postgres' feature is not compiled in.\n\
                 Rebuild with: cargo build --features postgres"
            );
        }
    }
    reactwatch::db::open_sqlite(&config.db_path)
}

/// Open the store, creating tables if needed.
async fn init_database(config: &Config) -> Result<Arc<dyn DedupStore>> {
    if let Some(ref url) = config.database_url {
        if is_postgres_url(url) {
            #[cfg(feature = "postgres")]
            {
                info!("Using PostgreSQL backend");
                return reactwatch::db::connect_postgres(url).await;
            }
            #[cfg(not(feature = "postgres"))]
            anyhow::bail!(
                "DATABASE_URL points to PostgreSQL but the 'postgres' feature is not compiled in.\n\
                 Rebuild with: cargo build --features postgres"
            );
        }
    }
    reactwatch::db::initialize_sqlite(&config.db_path)
}
