//! Member lifecycle: registration, lookup, profile edits and deletion.
//!
//! Profile edits deliberately cannot reach the financial columns; those
//! change only through the ledger operations.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CollectionState, EngineError, LoanState, Member, MemberRole, ProfileUpdateCmd,
    RegisterMemberCmd, ResultEngine, members, receipts, transactions,
};

use super::{Engine, normalize_email, normalize_required_text, with_tx};

/// Human-facing registration number, e.g. `SOC-4F9A01BC`.
fn new_registration_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("SOC-{}", id[..8].to_uppercase())
}

/// Ten digits starting with 7, 8 or 9.
fn validate_mobile(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 10
        && trimmed.starts_with(['7', '8', '9'])
        && trimmed.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(EngineError::InvalidAmount(
            "invalid mobile number, must be 10 digits starting with 7, 8 or 9".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Register a new member with due collection and no loan.
    ///
    /// Email and mobile uniqueness fail with distinct conflict messages so
    /// the caller can tell which rule was violated.
    pub async fn register_member(&self, cmd: RegisterMemberCmd) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let name = normalize_required_text(&cmd.name, "name")?;
            let email = normalize_email(&cmd.email)?;
            let mobile = validate_mobile(&cmd.mobile)?;
            if cmd.password.is_empty() {
                return Err(EngineError::InvalidAmount(
                    "password must not be empty".to_string(),
                ));
            }

            if members::Entity::find()
                .filter(members::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::Conflict(
                    "email already registered".to_string(),
                ));
            }
            if members::Entity::find()
                .filter(members::Column::Mobile.eq(mobile.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::Conflict(
                    "mobile number already registered".to_string(),
                ));
            }

            let (default_plan_minor, default_plan_years) = self.plan_defaults_in(&db_tx).await?;
            let plan_amount_minor = cmd.plan_amount_minor.unwrap_or(default_plan_minor);
            let plan_duration_years = cmd.plan_duration_years.unwrap_or(default_plan_years);
            if plan_amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "plan amount must be > 0".to_string(),
                ));
            }
            if plan_duration_years <= 0 {
                return Err(EngineError::InvalidAmount(
                    "plan duration must be > 0 years".to_string(),
                ));
            }

            let member = Member {
                id: Uuid::new_v4(),
                name,
                email,
                mobile,
                address: cmd.address.clone(),
                role: cmd.role,
                registration_number: new_registration_number(),
                plan_amount_minor,
                plan_duration_years,
                registered_at: Utc::now(),
                collection: CollectionState::new_due(),
                loan: LoanState::none(),
            };

            let model = members::ActiveModel {
                id: ActiveValue::Set(member.id.to_string()),
                name: ActiveValue::Set(member.name.clone()),
                email: ActiveValue::Set(member.email.clone()),
                mobile: ActiveValue::Set(member.mobile.clone()),
                address: ActiveValue::Set(member.address.clone()),
                password: ActiveValue::Set(cmd.password.clone()),
                role: ActiveValue::Set(member.role.as_str().to_string()),
                registration_number: ActiveValue::Set(member.registration_number.clone()),
                plan_amount_minor: ActiveValue::Set(member.plan_amount_minor),
                plan_duration_years: ActiveValue::Set(member.plan_duration_years),
                registered_at: ActiveValue::Set(member.registered_at),
                collection_status: ActiveValue::Set(member.collection.status.as_str().to_string()),
                collection_paid_minor: ActiveValue::Set(member.collection.amount_paid_minor),
                collection_last_paid_at: ActiveValue::Set(member.collection.last_paid_at),
                loan_active: ActiveValue::Set(member.loan.active),
                loan_id: ActiveValue::Set(None),
                loan_principal_minor: ActiveValue::Set(member.loan.principal_minor),
                loan_interest_rate_percent: ActiveValue::Set(member.loan.interest_rate_percent),
                loan_issued_at: ActiveValue::Set(member.loan.issued_at),
                loan_due_at: ActiveValue::Set(member.loan.due_at),
                loan_remaining_minor: ActiveValue::Set(member.loan.remaining_minor),
                loan_status: ActiveValue::Set(member.loan.status.as_str().to_string()),
            };
            model.insert(&db_tx).await?;

            Ok(member)
        })
    }

    /// Return one member.
    pub async fn member(&self, member_id: Uuid) -> ResultEngine<Member> {
        self.require_member(&self.database, member_id).await
    }

    /// List members, optionally restricted to one role, newest first.
    pub async fn list_members(&self, role: Option<MemberRole>) -> ResultEngine<Vec<Member>> {
        let mut query = members::Entity::find().order_by_desc(members::Column::RegisteredAt);
        if let Some(role) = role {
            query = query.filter(members::Column::Role.eq(role.as_str()));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Member::try_from).collect()
    }

    /// Update non-financial profile fields.
    pub async fn update_profile(&self, cmd: ProfileUpdateCmd) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = members::Entity::find_by_id(cmd.member_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            let mut active = members::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };
            if let Some(name) = cmd.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required_text(name, "name")?);
            }
            if let Some(address) = cmd.address.as_deref() {
                active.address = ActiveValue::Set(Some(address.trim().to_string()));
            }
            if let Some(mobile) = cmd.mobile.as_deref() {
                let mobile = validate_mobile(mobile)?;
                let taken = members::Entity::find()
                    .filter(members::Column::Mobile.eq(mobile.clone()))
                    .filter(members::Column::Id.ne(model.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::Conflict(
                        "mobile number already registered".to_string(),
                    ));
                }
                active.mobile = ActiveValue::Set(mobile);
            }
            if let Some(amount_minor) = cmd.plan_amount_minor {
                if amount_minor <= 0 {
                    return Err(EngineError::InvalidAmount(
                        "plan amount must be > 0".to_string(),
                    ));
                }
                active.plan_amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(years) = cmd.plan_duration_years {
                if years <= 0 {
                    return Err(EngineError::InvalidAmount(
                        "plan duration must be > 0 years".to_string(),
                    ));
                }
                active.plan_duration_years = ActiveValue::Set(years);
            }
            active.update(&db_tx).await?;

            self.require_member(&db_tx, cmd.member_id).await
        })
    }

    /// Delete a member and everything referencing it: transactions first,
    /// receipts of those transactions alongside. Destructive and final.
    pub async fn delete_member(&self, member_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = members::Entity::find_by_id(member_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            receipts::Entity::delete_many()
                .filter(receipts::Column::MemberId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            transactions::Entity::delete_many()
                .filter(transactions::Column::MemberId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            members::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    pub(super) async fn require_member<C: ConnectionTrait>(
        &self,
        db: &C,
        member_id: Uuid,
    ) -> ResultEngine<Member> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;
        Member::try_from(model)
    }
}
