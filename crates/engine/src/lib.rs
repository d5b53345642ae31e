//! Society fund ledger engine.
//!
//! The engine owns every financial state transition: contribution payments,
//! the loan lifecycle, bonus credits, the append-only transaction log and
//! the derived society-wide statistics. Callers (HTTP layer, reminder task,
//! admin tooling) go through [`Engine`]; nothing else mutates a member's
//! financial columns.

pub use commands::{
    BonusCmd, ContributionCmd, LoanIssueCmd, LoanPaymentCmd, ProfileUpdateCmd, RegisterMemberCmd,
    SaveReceiptCmd,
};
pub use error::EngineError;
pub use members::{
    CollectionState, CollectionStatus, LoanState, LoanStatus, Member, MemberRole,
};
pub use ops::{BonusDistribution, Engine, EngineBuilder, Stats};
pub use receipts::Receipt;
pub use settings::LoanDefaults;
pub use transactions::{Transaction, TransactionKind};

mod commands;
mod error;
pub mod members;
mod ops;
pub mod receipts;
pub mod settings;
pub mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
