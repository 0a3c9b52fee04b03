use std::{sync::Arc, time::Duration};

use clap::Parser;
use engine::{ChangeConsumer, ChannelNotifier, Engine, LedgerService};
use migration::{Migrator, MigratorTrait};
use settings::Database;
use tokio_util::sync::CancellationToken;

mod recalculator;
mod settings;

/// Ledger service with per-user balance aggregation.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Settings file, without extension.
    #[arg(short, long, env = "FUNDS_CONFIG", default_value = "settings")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "funds={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;

    let (notifier, receiver) = ChannelNotifier::channel(settings.notifier.capacity);
    let mut builder = Engine::builder()
        .database(db)
        .notifier(Arc::new(notifier));
    if let Some(deadline_ms) = settings.engine.deadline_ms {
        builder = builder.deadline(Duration::from_millis(deadline_ms));
    }
    let service: Arc<dyn LedgerService> = Arc::new(builder.build()?);

    let cancel = CancellationToken::new();

    let consumer = ChangeConsumer::new(
        receiver,
        recalculator::BalanceRefresher::new(Arc::clone(&service)),
    );
    let token = cancel.clone();
    tasks.spawn(async move {
        let stats = consumer.run(token).await;
        tracing::info!(
            processed = stats.processed,
            failed = stats.failed,
            skipped = stats.skipped,
            acknowledged = stats.acknowledged,
            "change consumer stopped"
        );
    });

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let token = cancel.clone();
    tasks.spawn(async move {
        if let Err(err) = server::run(service, &addr, token.clone().cancelled_owned()).await {
            tracing::error!("server failed: {err}");
        }
        token.cancel();
    });

    let token = cancel.clone();
    tasks.spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    tracing::error!("failed to listen for ctrl-c: {err}");
                }
                tracing::info!("shutting down");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    });

    while let Some(result) = tasks.join_next().await {
        if let Err(err) = result {
            tracing::error!("task failed: {err}");
            cancel.cancel();
        }
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
