//! Receipts API endpoints

use api_types::receipt::{ReceiptSave, ReceiptView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, require_admin, require_self_or_admin, server::ServerState};

fn map_receipt(receipt: engine::Receipt) -> ReceiptView {
    ReceiptView {
        transaction_id: receipt.transaction_id,
        member_id: receipt.member_id,
        member_name: receipt.member_name,
        kind: receipt.kind,
        amount_minor: receipt.amount_minor,
        generated_by: receipt.generated_by,
        document_b64: receipt.document_b64,
        generated_at: receipt.generated_at,
    }
}

/// Store an externally rendered receipt document (admin only).
pub async fn save(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptSave>,
) -> Result<(StatusCode, Json<ReceiptView>), ServerError> {
    require_admin(&caller)?;

    let receipt = state
        .engine
        .save_receipt(engine::SaveReceiptCmd::new(
            payload.transaction_id,
            payload.generated_by,
            payload.document_b64,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(map_receipt(receipt))))
}

/// Fetch the receipt for a transaction (owner or admin).
pub async fn get_one(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<ReceiptView>, ServerError> {
    let receipt = state.engine.receipt(transaction_id).await?;
    require_self_or_admin(&caller, receipt.member_id)?;

    Ok(Json(map_receipt(receipt)))
}
