//! Command structs for engine operations.
//!
//! These types group parameters for write operations (contribution, loan
//! issuance, repayment, bonus, registration), keeping call sites readable
//! and avoiding long argument lists.

use uuid::Uuid;

use crate::MemberRole;

/// Record a contribution payment for one member.
#[derive(Clone, Debug)]
pub struct ContributionCmd {
    pub member_id: Uuid,
    /// When `None`, the member's current plan amount is charged.
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
}

impl ContributionCmd {
    #[must_use]
    pub fn new(member_id: Uuid) -> Self {
        Self {
            member_id,
            amount_minor: None,
            description: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Issue a new loan to one member.
#[derive(Clone, Debug)]
pub struct LoanIssueCmd {
    pub member_id: Uuid,
    pub amount_minor: i64,
    /// When `None`, the settings default applies.
    pub interest_rate_percent: Option<f64>,
    /// When `None`, the settings default applies.
    pub duration_months: Option<i32>,
    pub description: Option<String>,
}

impl LoanIssueCmd {
    #[must_use]
    pub fn new(member_id: Uuid, amount_minor: i64) -> Self {
        Self {
            member_id,
            amount_minor,
            interest_rate_percent: None,
            duration_months: None,
            description: None,
        }
    }

    #[must_use]
    pub fn interest_rate_percent(mut self, rate: f64) -> Self {
        self.interest_rate_percent = Some(rate);
        self
    }

    #[must_use]
    pub fn duration_months(mut self, months: i32) -> Self {
        self.duration_months = Some(months);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Record a repayment against a member's active loan.
#[derive(Clone, Debug)]
pub struct LoanPaymentCmd {
    pub member_id: Uuid,
    pub amount_minor: i64,
    pub description: Option<String>,
}

impl LoanPaymentCmd {
    #[must_use]
    pub fn new(member_id: Uuid, amount_minor: i64) -> Self {
        Self {
            member_id,
            amount_minor,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Credit a bonus to one member (log entry only).
#[derive(Clone, Debug)]
pub struct BonusCmd {
    pub member_id: Uuid,
    pub amount_minor: i64,
    pub description: Option<String>,
}

impl BonusCmd {
    #[must_use]
    pub fn new(member_id: Uuid, amount_minor: i64) -> Self {
        Self {
            member_id,
            amount_minor,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Register a new member.
#[derive(Clone, Debug)]
pub struct RegisterMemberCmd {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: Option<String>,
    pub password: String,
    /// When `None`, the settings default applies.
    pub plan_amount_minor: Option<i64>,
    pub plan_duration_years: Option<i32>,
    pub role: MemberRole,
}

impl RegisterMemberCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            mobile: mobile.into(),
            address: None,
            password: password.into(),
            plan_amount_minor: None,
            plan_duration_years: None,
            role: MemberRole::Member,
        }
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn plan_amount_minor(mut self, amount_minor: i64) -> Self {
        self.plan_amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn plan_duration_years(mut self, years: i32) -> Self {
        self.plan_duration_years = Some(years);
        self
    }

    #[must_use]
    pub fn role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }
}

/// Update a member's profile.
///
/// Only non-financial fields are reachable from here; collection and loan
/// state change exclusively through the ledger operations.
#[derive(Clone, Debug)]
pub struct ProfileUpdateCmd {
    pub member_id: Uuid,
    pub name: Option<String>,
    pub address: Option<String>,
    pub mobile: Option<String>,
    pub plan_amount_minor: Option<i64>,
    pub plan_duration_years: Option<i32>,
}

impl ProfileUpdateCmd {
    #[must_use]
    pub fn new(member_id: Uuid) -> Self {
        Self {
            member_id,
            name: None,
            address: None,
            mobile: None,
            plan_amount_minor: None,
            plan_duration_years: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    #[must_use]
    pub fn plan_amount_minor(mut self, amount_minor: i64) -> Self {
        self.plan_amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn plan_duration_years(mut self, years: i32) -> Self {
        self.plan_duration_years = Some(years);
        self
    }
}

/// Upsert a rendered receipt for a transaction.
#[derive(Clone, Debug)]
pub struct SaveReceiptCmd {
    pub transaction_id: Uuid,
    pub generated_by: String,
    pub document_b64: String,
}

impl SaveReceiptCmd {
    #[must_use]
    pub fn new(
        transaction_id: Uuid,
        generated_by: impl Into<String>,
        document_b64: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id,
            generated_by: generated_by.into(),
            document_b64: document_b64.into(),
        }
    }
}
