use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{members, receipts, settings, statistics, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub events: tokio::sync::mpsc::UnboundedSender<notifier::Event>,
}

/// Fire-and-forget handoff to the notifier worker. A closed channel only
/// means notifications are off; the primary operation already succeeded.
pub(crate) fn emit(state: &ServerState, event: notifier::Event) {
    if state.events.send(event).is_err() {
        tracing::warn!("notifier channel closed, dropping event");
    }
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let member = engine::members::Entity::find()
        .filter(engine::members::Column::Email.eq(auth_header.username()))
        .filter(engine::members::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(member) = member else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(member);
    Ok(next.run(request).await)
}

/// Assemble the router. Split from [`run_with_listener`] so tests can drive
/// the service directly.
pub fn build_router(
    engine: Arc<Engine>,
    db: DatabaseConnection,
    events: tokio::sync::mpsc::UnboundedSender<notifier::Event>,
) -> Router {
    router(ServerState { engine, db, events })
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/members", get(members::list))
        .route(
            "/members/{id}",
            get(members::get_one)
                .patch(members::update_profile)
                .delete(members::remove),
        )
        .route(
            "/members/{id}/transactions",
            get(transactions::member_list),
        )
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/bonus", post(transactions::distribute_bonus))
        .route("/stats", get(statistics::get_stats))
        .route("/receipts", post(receipts::save))
        .route("/receipts/{transaction_id}", get(receipts::get_one))
        .route("/settings", get(settings::list).put(settings::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        // Registration stays outside the auth layer.
        .route("/auth/register", post(members::register))
        .with_state(state)
}

pub async fn run(
    engine: Arc<Engine>,
    db: DatabaseConnection,
    events: tokio::sync::mpsc::UnboundedSender<notifier::Event>,
) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, events, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    db: DatabaseConnection,
    events: tokio::sync::mpsc::UnboundedSender<notifier::Event>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, build_router(engine, db, events)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    db: DatabaseConnection,
    events: tokio::sync::mpsc::UnboundedSender<notifier::Event>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, events, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
