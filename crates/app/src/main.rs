use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod reminders;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "samiti={level},server={level},engine={level},notifier={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server_settings) = settings.server else {
        tracing::warn!("No server settings found, nothing to run");
        return Ok(());
    };

    let db = parse_database(&server_settings.database).await?;
    let engine = Arc::new(engine::Engine::builder().database(db.clone()).build().await?);
    let (events_tx, events_rx) = notifier::channel();

    {
        tracing::info!("Found server settings...");
        let engine = engine.clone();
        let db = db.clone();
        let events = events_tx.clone();
        tasks.spawn(async move {
            let bind = server_settings
                .bind
                .clone()
                .unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server_settings.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, db, events, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    {
        let mut builder = notifier::Notifier::builder();
        if let Some(cfg) = settings.notifier {
            if let Some(url) = cfg.gateway_url {
                builder = builder.gateway_url(url);
            }
            if let Some(sender) = cfg.sender {
                builder = builder.sender(sender);
            }
        }
        match builder.build() {
            Ok(worker) => {
                let engine = engine.clone();
                tasks.spawn(async move {
                    worker.run(events_rx, engine).await;
                });
            }
            Err(err) => tracing::error!("failed to initialize notifier: {err}"),
        }
    }

    {
        let engine = engine.clone();
        let events = events_tx.clone();
        let (interval_hours, due_soon_days) = settings
            .reminders
            .map(|r| {
                (
                    r.interval_hours.unwrap_or(reminders::DEFAULT_INTERVAL_HOURS),
                    r.due_soon_days.unwrap_or(reminders::DEFAULT_DUE_SOON_DAYS),
                )
            })
            .unwrap_or((
                reminders::DEFAULT_INTERVAL_HOURS,
                reminders::DEFAULT_DUE_SOON_DAYS,
            ));
        tasks.spawn(async move {
            reminders::run(engine, events, interval_hours, due_soon_days).await;
        });
    }

    // The spawned tasks hold their own senders; dropping this one lets the
    // notifier stop once every producer is gone.
    drop(events_tx);

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
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
    Ok(database)
}
