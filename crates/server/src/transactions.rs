//! Transactions API endpoints

use api_types::bonus::{BonusDistribute, BonusResult};
use api_types::transaction::{
    TransactionKind as ApiKind, TransactionNew, TransactionView, TransactionsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, require_admin, require_self_or_admin, server::ServerState, server::emit};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Contribution => ApiKind::Contribution,
        engine::TransactionKind::LoanIssued => ApiKind::LoanIssued,
        engine::TransactionKind::LoanPayment => ApiKind::LoanPayment,
        engine::TransactionKind::Bonus => ApiKind::Bonus,
    }
}

pub(crate) fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        member_id: tx.member_id,
        member_name: tx.member_name,
        member_email: tx.member_email,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        description: tx.description,
        interest_rate_percent: tx.interest_rate_percent,
        duration_months: tx.duration_months,
        created_at: tx.created_at,
    }
}

fn required_amount(payload: &TransactionNew) -> Result<i64, ServerError> {
    payload
        .amount_minor
        .ok_or_else(|| ServerError::Generic("amount_minor is required".to_string()))
}

/// Apply one financial event to one member (admin only).
pub async fn create(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    require_admin(&caller)?;

    let engine = &state.engine;
    let tx = match payload.kind {
        ApiKind::Contribution => {
            let mut cmd = engine::ContributionCmd::new(payload.member_id);
            if let Some(amount_minor) = payload.amount_minor {
                cmd = cmd.amount_minor(amount_minor);
            }
            if let Some(description) = payload.description.clone() {
                cmd = cmd.description(description);
            }
            engine.contribution(cmd).await?
        }
        ApiKind::LoanIssued => {
            let mut cmd = engine::LoanIssueCmd::new(payload.member_id, required_amount(&payload)?);
            if let Some(rate) = payload.interest_rate_percent {
                cmd = cmd.interest_rate_percent(rate);
            }
            if let Some(months) = payload.duration_months {
                cmd = cmd.duration_months(months);
            }
            if let Some(description) = payload.description.clone() {
                cmd = cmd.description(description);
            }
            engine.issue_loan(cmd).await?
        }
        ApiKind::LoanPayment => {
            let mut cmd =
                engine::LoanPaymentCmd::new(payload.member_id, required_amount(&payload)?);
            if let Some(description) = payload.description.clone() {
                cmd = cmd.description(description);
            }
            engine.repay_loan(cmd).await?
        }
        ApiKind::Bonus => {
            let mut cmd = engine::BonusCmd::new(payload.member_id, required_amount(&payload)?);
            if let Some(description) = payload.description.clone() {
                cmd = cmd.description(description);
            }
            engine.bonus(cmd).await?
        }
    };

    emit(&state, notifier::Event::transaction(tx.clone()));

    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

/// List the full transaction log, newest first (admin only).
pub async fn list(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    require_admin(&caller)?;

    let transactions = state.engine.transactions(query.limit).await?;
    Ok(Json(TransactionsResponse {
        transactions: transactions.into_iter().map(map_transaction).collect(),
    }))
}

/// List one member's transaction history (self or admin).
pub async fn member_list(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    require_self_or_admin(&caller, id)?;

    let transactions = state.engine.member_transactions(id).await?;
    Ok(Json(TransactionsResponse {
        transactions: transactions.into_iter().map(map_transaction).collect(),
    }))
}

/// Credit the same bonus to every member (admin only).
pub async fn distribute_bonus(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BonusDistribute>,
) -> Result<(StatusCode, Json<BonusResult>), ServerError> {
    require_admin(&caller)?;

    let distribution = state
        .engine
        .distribute_bonus(
            payload.amount_minor,
            payload.description.as_deref().unwrap_or(""),
        )
        .await?;

    // One independent notification per recipient.
    for tx in &distribution.transactions {
        emit(&state, notifier::Event::transaction(tx.clone()));
    }

    Ok((
        StatusCode::CREATED,
        Json(BonusResult {
            distributed_count: distribution.distributed_count,
            total_amount_minor: distribution.total_amount_minor,
        }),
    ))
}
