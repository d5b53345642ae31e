//! Outbound side-effect worker.
//!
//! The core responds to its caller first; afterwards the server (or the
//! reminder task) drops an [`Event`] on an unbounded channel and moves on.
//! This worker drains the channel, renders a notification mail per event,
//! POSTs it to a configured mail-gateway URL and, for ledger writes, renders
//! and stores a plain-text receipt. Failures here are logged and never
//! surface to the operation that produced the event.

use std::sync::Arc;

use base64::Engine as _;
use base64::prelude::*;
use engine::{Engine, SaveReceiptCmd};
use reqwest::Client;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

pub use event::Event;

mod event;
mod render;

const DEFAULT_SENDER: &str = "Society Management <no-reply@samiti.local>";

/// Channel the core's callers publish events on.
pub fn channel() -> (UnboundedSender<Event>, UnboundedReceiver<Event>) {
    unbounded_channel()
}

pub struct Notifier {
    gateway_url: Option<String>,
    sender: String,
    client: Client,
}

impl Notifier {
    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::default()
    }

    /// Drain events until every sender is dropped.
    pub async fn run(self, mut events: UnboundedReceiver<Event>, engine: Arc<Engine>) {
        tracing::info!("Starting notifier worker...");
        while let Some(event) = events.recv().await {
            self.handle(&engine, event).await;
        }
        tracing::info!("notifier channel closed, stopping");
    }

    async fn handle(&self, engine: &Engine, event: Event) {
        if let Event::TransactionRecorded { transaction } = &event {
            let document = render::receipt_document(transaction);
            let cmd = SaveReceiptCmd::new(
                transaction.id,
                "system",
                BASE64_STANDARD.encode(document),
            );
            if let Err(err) = engine.save_receipt(cmd).await {
                tracing::warn!(
                    "failed to store receipt for transaction {}: {err}",
                    transaction.id
                );
            }
        }

        self.deliver(render::mail_for(&event)).await;
    }

    async fn deliver(&self, mail: render::Mail) {
        let Some(url) = self.gateway_url.as_deref() else {
            tracing::info!(
                to = %mail.to,
                subject = %mail.subject,
                "mail gateway not configured, skipping delivery"
            );
            return;
        };

        let payload = serde_json::json!({
            "from": self.sender,
            "to": mail.to,
            "subject": mail.subject,
            "body": mail.body,
        });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(to = %mail.to, "mail gateway returned {}", response.status());
            }
            Err(err) => tracing::warn!(to = %mail.to, "mail delivery failed: {err}"),
        }
    }
}

#[derive(Default, Debug)]
pub struct NotifierBuilder {
    gateway_url: Option<String>,
    sender: Option<String>,
}

impl NotifierBuilder {
    /// Mail-gateway endpoint receiving `{from, to, subject, body}` JSON.
    pub fn gateway_url(mut self, url: impl Into<String>) -> NotifierBuilder {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> NotifierBuilder {
        self.sender = Some(sender.into());
        self
    }

    pub fn build(self) -> Result<Notifier, String> {
        let client = Client::builder()
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Notifier {
            gateway_url: self.gateway_url,
            sender: self.sender.unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            client,
        })
    }
}
