//! Settings table (key -> value store).
//!
//! Collaborators read these when constructing default values; the ledger
//! never writes them.

use sea_orm::entity::prelude::*;

/// Monthly contribution default, in minor units.
pub const DEFAULT_PLAN_AMOUNT_MINOR: &str = "default_plan_amount_minor";
/// Loan interest default, percent.
pub const DEFAULT_INTEREST_RATE_PERCENT: &str = "default_interest_rate_percent";
/// Loan duration default, months.
pub const DEFAULT_LOAN_DURATION_MONTHS: &str = "default_loan_duration_months";

/// Fallbacks used when a key is absent from the table.
pub const FALLBACK_PLAN_AMOUNT_MINOR: i64 = 1_000_00;
pub const FALLBACK_INTEREST_RATE_PERCENT: f64 = 2.0;
pub const FALLBACK_LOAN_DURATION_MONTHS: i32 = 12;
pub const FALLBACK_PLAN_DURATION_YEARS: i32 = 1;

/// Defaults applied to a loan issuance that does not carry explicit terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoanDefaults {
    pub interest_rate_percent: f64,
    pub duration_months: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
