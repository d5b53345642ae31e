//! Events emitted by the core after a successful commit.
//!
//! An event carries everything the worker needs to render a notification,
//! so handling one never reads mutable ledger state.

use chrono::{DateTime, Utc};
use engine::{Member, Transaction};

#[derive(Clone, Debug)]
pub enum Event {
    /// A member registered.
    Welcome {
        name: String,
        email: String,
        registration_number: String,
        plan_amount_minor: i64,
    },
    /// One accepted ledger write (including each bonus recipient).
    TransactionRecorded { transaction: Transaction },
    /// An active loan is due within the reminder window.
    LoanDueSoon {
        name: String,
        email: String,
        remaining_minor: i64,
        due_at: DateTime<Utc>,
    },
    /// An active loan went past its due date.
    LoanOverdue {
        name: String,
        email: String,
        remaining_minor: i64,
        due_at: DateTime<Utc>,
    },
}

impl Event {
    pub fn welcome(member: &Member) -> Self {
        Self::Welcome {
            name: member.name.clone(),
            email: member.email.clone(),
            registration_number: member.registration_number.clone(),
            plan_amount_minor: member.plan_amount_minor,
        }
    }

    pub fn transaction(transaction: Transaction) -> Self {
        Self::TransactionRecorded { transaction }
    }

    /// `None` when the member has no due date on record.
    pub fn loan_due_soon(member: &Member) -> Option<Self> {
        member.loan.due_at.map(|due_at| Self::LoanDueSoon {
            name: member.name.clone(),
            email: member.email.clone(),
            remaining_minor: member.loan.remaining_minor,
            due_at,
        })
    }

    pub fn loan_overdue(member: &Member) -> Option<Self> {
        member.loan.due_at.map(|due_at| Self::LoanOverdue {
            name: member.name.clone(),
            email: member.email.clone(),
            remaining_minor: member.loan.remaining_minor,
            due_at,
        })
    }
}
