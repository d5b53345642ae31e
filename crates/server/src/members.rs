//! Member API endpoints

use api_types::member::{
    CollectionStatus as ApiCollectionStatus, CollectionView, LoanStatus as ApiLoanStatus,
    LoanView, MemberRegister, MemberView, MembersResponse, ProfileUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, require_admin, require_self_or_admin, server::ServerState, server::emit};

pub(crate) fn map_member(member: engine::Member) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name,
        email: member.email,
        mobile: member.mobile,
        address: member.address,
        role: match member.role {
            engine::MemberRole::Admin => api_types::MemberRole::Admin,
            engine::MemberRole::Member => api_types::MemberRole::Member,
        },
        registration_number: member.registration_number,
        plan_amount_minor: member.plan_amount_minor,
        plan_duration_years: member.plan_duration_years,
        registered_at: member.registered_at,
        collection: CollectionView {
            status: match member.collection.status {
                engine::CollectionStatus::Due => ApiCollectionStatus::Due,
                engine::CollectionStatus::Paid => ApiCollectionStatus::Paid,
            },
            amount_paid_minor: member.collection.amount_paid_minor,
            last_paid_at: member.collection.last_paid_at,
        },
        loan: LoanView {
            active: member.loan.active,
            loan_id: member.loan.loan_id,
            principal_minor: member.loan.principal_minor,
            interest_rate_percent: member.loan.interest_rate_percent,
            issued_at: member.loan.issued_at,
            due_at: member.loan.due_at,
            remaining_minor: member.loan.remaining_minor,
            status: match member.loan.status {
                engine::LoanStatus::Active => ApiLoanStatus::Active,
                engine::LoanStatus::Overdue => ApiLoanStatus::Overdue,
                engine::LoanStatus::Paid => ApiLoanStatus::Paid,
            },
        },
    }
}

/// Handle public member registration.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<MemberRegister>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let mut cmd = engine::RegisterMemberCmd::new(
        payload.name,
        payload.email,
        payload.mobile,
        payload.password,
    );
    if let Some(address) = payload.address {
        cmd = cmd.address(address);
    }
    if let Some(amount_minor) = payload.plan_amount_minor {
        cmd = cmd.plan_amount_minor(amount_minor);
    }
    if let Some(years) = payload.plan_duration_years {
        cmd = cmd.plan_duration_years(years);
    }

    let member = state.engine.register_member(cmd).await?;
    emit(&state, notifier::Event::welcome(&member));

    Ok((StatusCode::CREATED, Json(map_member(member))))
}

/// Handle requests for listing society members (admin only).
pub async fn list(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MembersResponse>, ServerError> {
    require_admin(&caller)?;

    let members = state
        .engine
        .list_members(Some(engine::MemberRole::Member))
        .await?;

    Ok(Json(MembersResponse {
        members: members.into_iter().map(map_member).collect(),
    }))
}

pub async fn get_one(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberView>, ServerError> {
    require_self_or_admin(&caller, id)?;

    let member = state.engine.member(id).await?;
    Ok(Json(map_member(member)))
}

pub async fn update_profile(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    require_self_or_admin(&caller, id)?;

    let mut cmd = engine::ProfileUpdateCmd::new(id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(address) = payload.address {
        cmd = cmd.address(address);
    }
    if let Some(mobile) = payload.mobile {
        cmd = cmd.mobile(mobile);
    }
    if let Some(amount_minor) = payload.plan_amount_minor {
        cmd = cmd.plan_amount_minor(amount_minor);
    }
    if let Some(years) = payload.plan_duration_years {
        cmd = cmd.plan_duration_years(years);
    }

    let member = state.engine.update_profile(cmd).await?;
    Ok(Json(map_member(member)))
}

/// Delete a member and its transaction history (admin only).
pub async fn remove(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_admin(&caller)?;

    state.engine.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
