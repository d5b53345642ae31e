use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use serde::Serialize;
use uuid::Uuid;

pub use server::{build_router, run, run_with_listener, spawn_with_listener};

mod members;
mod receipts;
mod server;
mod settings;
mod statistics;
mod transactions;

pub mod types {
    pub mod member {
        pub use api_types::member::{MemberRegister, MemberView, MembersResponse, ProfileUpdate};
    }

    pub mod transaction {
        pub use api_types::transaction::{TransactionNew, TransactionView, TransactionsResponse};
    }

    pub mod bonus {
        pub use api_types::bonus::{BonusDistribute, BonusResult};
    }

    pub mod stats {
        pub use api_types::stats::StatsView;
    }

    pub mod receipt {
        pub use api_types::receipt::{ReceiptSave, ReceiptView};
    }

    pub mod setting {
        pub use api_types::setting::{SettingUpdate, SettingView, SettingsResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Forbidden(String),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Admin-only routes gate on the authenticated member's role.
pub(crate) fn require_admin(member: &engine::members::Model) -> Result<(), ServerError> {
    if member.role == engine::MemberRole::Admin.as_str() {
        Ok(())
    } else {
        Err(ServerError::Forbidden("admin access required".to_string()))
    }
}

/// Members may read their own records; admins everyone's.
pub(crate) fn require_self_or_admin(
    member: &engine::members::Model,
    target: Uuid,
) -> Result<(), ServerError> {
    if member.id == target.to_string() {
        return Ok(());
    }
    require_admin(member)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = ServerError::Forbidden("admin access required".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
