//! The module contains the representation of a society member and the
//! financial sub-state the ledger mutates.
//!
//! A member carries two independent financial machines:
//!
//! - a collection state (monthly contribution: due or paid, running total,
//!   last payment date);
//! - a loan state (at most one outstanding loan at any time, monotonically
//!   decreasing balance, due-date driven overdue transition).
//!
//! Amounts are stored as integer minor units (`i64` paise).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Due,
    Paid,
}

impl CollectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for CollectionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "due" => Ok(Self::Due),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid collection status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Overdue,
    Paid,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for LoanStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "overdue" => Ok(Self::Overdue),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid loan status: {other}"
            ))),
        }
    }
}

/// Monthly contribution state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    pub status: CollectionStatus,
    pub amount_paid_minor: i64,
    pub last_paid_at: Option<DateTime<Utc>>,
}

impl CollectionState {
    pub fn new_due() -> Self {
        Self {
            status: CollectionStatus::Due,
            amount_paid_minor: 0,
            last_paid_at: None,
        }
    }

    /// Records a contribution payment: adds to the running total and marks
    /// the collection as paid.
    pub fn record_payment(&mut self, amount_minor: i64, paid_at: DateTime<Utc>) {
        self.amount_paid_minor += amount_minor;
        self.status = CollectionStatus::Paid;
        self.last_paid_at = Some(paid_at);
    }
}

/// Loan sub-state.
///
/// Invariants:
/// - `active == true` implies `remaining_minor > 0` after every transition;
/// - `remaining_minor` never goes below 0 (overpayment clamps);
/// - reaching 0 forces `active = false` and `status = Paid`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    pub active: bool,
    pub loan_id: Option<Uuid>,
    pub principal_minor: i64,
    pub interest_rate_percent: f64,
    pub issued_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub remaining_minor: i64,
    pub status: LoanStatus,
}

impl LoanState {
    /// The zero state of a member with no loan history.
    pub fn none() -> Self {
        Self {
            active: false,
            loan_id: None,
            principal_minor: 0,
            interest_rate_percent: 0.0,
            issued_at: None,
            due_at: None,
            remaining_minor: 0,
            status: LoanStatus::Paid,
        }
    }

    /// A member has an outstanding loan when the loan is active and money is
    /// still owed. The conflict check for new issuances keys on this, not on
    /// the status string, so a fully repaid loan never blocks a new one.
    pub fn has_outstanding(&self) -> bool {
        self.active && self.remaining_minor > 0
    }

    /// Replaces the loan state with a freshly issued loan.
    pub fn issue(
        principal_minor: i64,
        interest_rate_percent: f64,
        issued_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if principal_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "loan principal must be > 0".to_string(),
            ));
        }
        if interest_rate_percent < 0.0 {
            return Err(EngineError::InvalidAmount(
                "interest rate must not be negative".to_string(),
            ));
        }
        Ok(Self {
            active: true,
            loan_id: Some(Uuid::new_v4()),
            principal_minor,
            interest_rate_percent,
            issued_at: Some(issued_at),
            due_at: Some(due_at),
            remaining_minor: principal_minor,
            status: LoanStatus::Active,
        })
    }

    /// Applies a repayment, clamping at zero. Returns the new remaining
    /// balance.
    pub fn apply_payment(&mut self, amount_minor: i64) -> i64 {
        self.remaining_minor = (self.remaining_minor - amount_minor).max(0);
        if self.remaining_minor == 0 {
            self.status = LoanStatus::Paid;
            self.active = false;
        }
        self.remaining_minor
    }

    /// Flips an active, past-due loan to overdue. Returns `true` when the
    /// transition happened.
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if !self.active || self.status == LoanStatus::Overdue {
            return false;
        }
        match self.due_at {
            Some(due_at) if due_at < now => {
                self.status = LoanStatus::Overdue;
                true
            }
            _ => false,
        }
    }
}

/// A registered member with its current financial snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: Option<String>,
    pub role: MemberRole,
    pub registration_number: String,
    pub plan_amount_minor: i64,
    pub plan_duration_years: i32,
    pub registered_at: DateTime<Utc>,
    pub collection: CollectionState,
    pub loan: LoanState,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: Option<String>,
    pub password: String,
    pub role: String,
    pub registration_number: String,
    pub plan_amount_minor: i64,
    pub plan_duration_years: i32,
    pub registered_at: DateTimeUtc,
    pub collection_status: String,
    pub collection_paid_minor: i64,
    pub collection_last_paid_at: Option<DateTimeUtc>,
    pub loan_active: bool,
    pub loan_id: Option<String>,
    pub loan_principal_minor: i64,
    pub loan_interest_rate_percent: f64,
    pub loan_issued_at: Option<DateTimeUtc>,
    pub loan_due_at: Option<DateTimeUtc>,
    pub loan_remaining_minor: i64,
    pub loan_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("member not exists".to_string()))?,
            name: model.name,
            email: model.email,
            mobile: model.mobile,
            address: model.address,
            role: MemberRole::try_from(model.role.as_str())?,
            registration_number: model.registration_number,
            plan_amount_minor: model.plan_amount_minor,
            plan_duration_years: model.plan_duration_years,
            registered_at: model.registered_at,
            collection: CollectionState {
                status: CollectionStatus::try_from(model.collection_status.as_str())?,
                amount_paid_minor: model.collection_paid_minor,
                last_paid_at: model.collection_last_paid_at,
            },
            loan: LoanState {
                active: model.loan_active,
                loan_id: model.loan_id.and_then(|s| Uuid::parse_str(&s).ok()),
                principal_minor: model.loan_principal_minor,
                interest_rate_percent: model.loan_interest_rate_percent,
                issued_at: model.loan_issued_at,
                due_at: model.loan_due_at,
                remaining_minor: model.loan_remaining_minor,
                status: LoanStatus::try_from(model.loan_status.as_str())?,
            },
        })
    }
}

/// Active-model fragment for the loan columns only. Used by the guarded
/// update paths so a ledger write never touches profile columns.
pub(crate) fn loan_active_model(loan: &LoanState) -> ActiveModel {
    ActiveModel {
        loan_active: ActiveValue::Set(loan.active),
        loan_id: ActiveValue::Set(loan.loan_id.map(|id| id.to_string())),
        loan_principal_minor: ActiveValue::Set(loan.principal_minor),
        loan_interest_rate_percent: ActiveValue::Set(loan.interest_rate_percent),
        loan_issued_at: ActiveValue::Set(loan.issued_at),
        loan_due_at: ActiveValue::Set(loan.due_at),
        loan_remaining_minor: ActiveValue::Set(loan.remaining_minor),
        loan_status: ActiveValue::Set(loan.status.as_str().to_string()),
        ..Default::default()
    }
}
