//! Periodic loan reminders.
//!
//! A daily tick (configurable) reads loan state through the engine: loans
//! due within the reminder window produce due-soon events, loans past due
//! are transitioned to overdue and produce overdue events. The tick never
//! mutates state outside the engine's guarded operations.

use std::sync::Arc;

use chrono::Utc;
use engine::Engine;
use notifier::Event;
use tokio::sync::mpsc::UnboundedSender;

pub const DEFAULT_INTERVAL_HOURS: u64 = 24;
pub const DEFAULT_DUE_SOON_DAYS: i64 = 2;

pub async fn run(
    engine: Arc<Engine>,
    events: UnboundedSender<Event>,
    interval_hours: u64,
    due_soon_days: i64,
) {
    tracing::info!("Starting loan reminder task (every {interval_hours}h)...");
    let period = std::time::Duration::from_secs(interval_hours * 60 * 60);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        tick(&engine, &events, due_soon_days).await;
    }
}

async fn tick(engine: &Engine, events: &UnboundedSender<Event>, due_soon_days: i64) {
    let now = Utc::now();

    match engine.loans_due_within(now, due_soon_days).await {
        Ok(members) => {
            for member in members {
                if let Some(event) = Event::loan_due_soon(&member) {
                    if events.send(event).is_err() {
                        tracing::warn!("notifier channel closed, dropping due-soon reminder");
                    }
                }
            }
        }
        Err(err) => tracing::error!("due-soon scan failed: {err}"),
    }

    match engine.mark_overdue_loans(now).await {
        Ok(members) => {
            if !members.is_empty() {
                tracing::info!("{} loans transitioned to overdue", members.len());
            }
            for member in members {
                if let Some(event) = Event::loan_overdue(&member) {
                    if events.send(event).is_err() {
                        tracing::warn!("notifier channel closed, dropping overdue alert");
                    }
                }
            }
        }
        Err(err) => tracing::error!("overdue scan failed: {err}"),
    }
}
