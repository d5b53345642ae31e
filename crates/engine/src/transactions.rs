//! Transaction primitives.
//!
//! A `Transaction` is one immutable entry in the financial log: a
//! contribution, a loan issuance, a loan repayment or a bonus credit. The
//! member name/email are captured at creation time and intentionally never
//! re-synced with later profile edits.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Contribution,
    LoanIssued,
    LoanPayment,
    Bonus,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::LoanIssued => "loan_issued",
            Self::LoanPayment => "loan_payment",
            Self::Bonus => "bonus",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "contribution" => Ok(Self::Contribution),
            "loan_issued" => Ok(Self::LoanIssued),
            "loan_payment" => Ok(Self::LoanPayment),
            "bonus" => Ok(Self::Bonus),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub member_email: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub interest_rate_percent: Option<f64>,
    pub duration_months: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        member_id: Uuid,
        member_name: String,
        member_email: String,
        kind: TransactionKind,
        amount_minor: i64,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            member_id,
            member_name,
            member_email,
            kind,
            amount_minor,
            description,
            interest_rate_percent: None,
            duration_months: None,
            created_at,
        })
    }

    /// Attaches the loan terms carried only by `loan_issued` entries.
    #[must_use]
    pub fn with_loan_terms(mut self, interest_rate_percent: f64, duration_months: i32) -> Self {
        self.interest_rate_percent = Some(interest_rate_percent);
        self.duration_months = Some(duration_months);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub member_email: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub interest_rate_percent: Option<f64>,
    pub duration_months: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Members,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            member_id: ActiveValue::Set(tx.member_id.to_string()),
            member_name: ActiveValue::Set(tx.member_name.clone()),
            member_email: ActiveValue::Set(tx.member_email.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            interest_rate_percent: ActiveValue::Set(tx.interest_rate_percent),
            duration_months: ActiveValue::Set(tx.duration_months),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            member_id: Uuid::parse_str(&model.member_id)
                .map_err(|_| EngineError::KeyNotFound("member not exists".to_string()))?,
            member_name: model.member_name,
            member_email: model.member_email,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            interest_rate_percent: model.interest_rate_percent,
            duration_months: model.duration_months,
            created_at: model.created_at,
        })
    }
}
