use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
}

pub mod member {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CollectionStatus {
        Due,
        Paid,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LoanStatus {
        Active,
        Overdue,
        Paid,
    }

    /// Request body for registering a new member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberRegister {
        pub name: String,
        pub email: String,
        /// Ten digits starting with 7, 8 or 9.
        pub mobile: String,
        pub address: Option<String>,
        pub password: String,
        /// When absent, the society default plan applies.
        pub plan_amount_minor: Option<i64>,
        pub plan_duration_years: Option<i32>,
    }

    /// Request body for updating a profile.
    ///
    /// Financial state is not reachable from here; it changes only through
    /// ledger operations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub address: Option<String>,
        pub mobile: Option<String>,
        pub plan_amount_minor: Option<i64>,
        pub plan_duration_years: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CollectionView {
        pub status: CollectionStatus,
        pub amount_paid_minor: i64,
        pub last_paid_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanView {
        pub active: bool,
        pub loan_id: Option<Uuid>,
        pub principal_minor: i64,
        pub interest_rate_percent: f64,
        pub issued_at: Option<DateTime<Utc>>,
        pub due_at: Option<DateTime<Utc>>,
        pub remaining_minor: i64,
        pub status: LoanStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub mobile: String,
        pub address: Option<String>,
        pub role: super::MemberRole,
        pub registration_number: String,
        pub plan_amount_minor: i64,
        pub plan_duration_years: i32,
        pub registered_at: DateTime<Utc>,
        pub collection: CollectionView,
        pub loan: LoanView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Contribution,
        LoanIssued,
        LoanPayment,
        Bonus,
    }

    /// Request body for applying one financial event to one member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub member_id: Uuid,
        pub kind: TransactionKind,
        /// Required for every kind except `contribution`, which defaults to
        /// the member's plan amount.
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        /// Only meaningful for `loan_issued`; defaults from settings.
        pub interest_rate_percent: Option<f64>,
        /// Only meaningful for `loan_issued`; defaults from settings.
        pub duration_months: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub member_id: Uuid,
        /// Snapshot at creation time; not re-synced with profile edits.
        pub member_name: String,
        pub member_email: String,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub interest_rate_percent: Option<f64>,
        pub duration_months: Option<i32>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod bonus {
    use super::*;

    /// Request body for a society-wide bonus distribution.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BonusDistribute {
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BonusResult {
        pub distributed_count: u64,
        pub total_amount_minor: i64,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsView {
        pub total_members: u64,
        pub total_collection_minor: i64,
        pub pending_minor: i64,
        pub outstanding_loan_minor: i64,
        pub active_loans: u64,
    }
}

pub mod receipt {
    use super::*;

    /// Request body for storing an externally rendered receipt document.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptSave {
        pub transaction_id: Uuid,
        pub generated_by: String,
        /// Base64 of the rendered document.
        pub document_b64: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptView {
        pub transaction_id: Uuid,
        pub member_id: Uuid,
        pub member_name: String,
        pub kind: String,
        pub amount_minor: i64,
        pub generated_by: String,
        pub document_b64: String,
        pub generated_at: DateTime<Utc>,
    }
}

pub mod setting {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingUpdate {
        pub key: String,
        pub value: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingView {
        pub key: String,
        pub value: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingsResponse {
        pub settings: Vec<SettingView>,
    }
}
