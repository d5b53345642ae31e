//! Statistics API endpoints

use api_types::stats::StatsView;
use axum::{Extension, Json, extract::State};

use crate::{ServerError, require_admin, server::ServerState};

/// Handle requests for society-wide statistics (admin only).
///
/// Recomputed from scratch on every call; see the engine's stats module for
/// the consistency caveats.
pub async fn get_stats(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<StatsView>, ServerError> {
    require_admin(&caller)?;

    let stats = state.engine.compute_stats().await?;

    Ok(Json(StatsView {
        total_members: stats.total_members,
        total_collection_minor: stats.total_collection_minor,
        pending_minor: stats.pending_minor,
        outstanding_loan_minor: stats.outstanding_loan_minor,
        active_loans: stats.active_loans,
    }))
}
