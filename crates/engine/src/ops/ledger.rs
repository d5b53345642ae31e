//! The ledger state machine: applies exactly one financial event to one
//! member and appends the matching log entry, atomically.
//!
//! Every write path here runs inside a DB transaction and guards the member
//! update with a condition evaluated by the store itself (conditional
//! update / compare-and-swap), so two concurrent requests for the same
//! member cannot both win a race on the loan state.

use chrono::{Months, Utc};
use sea_orm::{
    ConnectionTrait, Condition, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    BonusCmd, CollectionStatus, ContributionCmd, EngineError, LoanIssueCmd, LoanPaymentCmd,
    LoanState, ResultEngine, Transaction, TransactionKind, members, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Record a contribution payment.
    ///
    /// The amount defaults to the member's current plan amount. The running
    /// total is incremented by the store (`paid = paid + amount`), not by a
    /// read value, so concurrent contributions both count.
    pub async fn contribution(&self, cmd: ContributionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let member = self.require_member(&db_tx, cmd.member_id).await?;
            let amount_minor = cmd.amount_minor.unwrap_or(member.plan_amount_minor);
            let now = Utc::now();
            let tx = Transaction::new(
                member.id,
                member.name.clone(),
                member.email.clone(),
                TransactionKind::Contribution,
                amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                now,
            )?;

            let rows = members::Entity::update_many()
                .col_expr(
                    members::Column::CollectionPaidMinor,
                    Expr::col(members::Column::CollectionPaidMinor).add(amount_minor),
                )
                .col_expr(
                    members::Column::CollectionStatus,
                    Expr::value(CollectionStatus::Paid.as_str()),
                )
                .col_expr(members::Column::CollectionLastPaidAt, Expr::value(now))
                .filter(members::Column::Id.eq(member.id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if rows == 0 {
                return Err(EngineError::KeyNotFound("member not exists".to_string()));
            }

            self.insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Issue a new loan.
    ///
    /// Interest rate and duration default from settings. The member row is
    /// only updated where no outstanding loan exists; losing that condition
    /// means another issuance won, and the caller gets a conflict.
    pub async fn issue_loan(&self, cmd: LoanIssueCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            if cmd.amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "loan principal must be > 0".to_string(),
                ));
            }
            let member = self.require_member(&db_tx, cmd.member_id).await?;
            let defaults = self.loan_defaults_in(&db_tx).await?;
            let interest_rate_percent = cmd
                .interest_rate_percent
                .unwrap_or(defaults.interest_rate_percent);
            let duration_months = cmd.duration_months.unwrap_or(defaults.duration_months);
            if duration_months <= 0 {
                return Err(EngineError::InvalidAmount(
                    "loan duration must be > 0 months".to_string(),
                ));
            }

            let now = Utc::now();
            let due_at = now
                .checked_add_months(Months::new(duration_months as u32))
                .ok_or_else(|| {
                    EngineError::InvalidAmount("loan duration out of range".to_string())
                })?;
            let loan = LoanState::issue(cmd.amount_minor, interest_rate_percent, now, due_at)?;

            let rows = members::Entity::update_many()
                .set(members::loan_active_model(&loan))
                .filter(members::Column::Id.eq(member.id.to_string()))
                .filter(
                    Condition::any()
                        .add(members::Column::LoanActive.eq(false))
                        .add(members::Column::LoanRemainingMinor.lte(0)),
                )
                .exec(&db_tx)
                .await?
                .rows_affected;
            if rows == 0 {
                return Err(EngineError::Conflict(
                    "member already has an active loan, clear it first".to_string(),
                ));
            }

            let tx = Transaction::new(
                member.id,
                member.name.clone(),
                member.email.clone(),
                TransactionKind::LoanIssued,
                cmd.amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                now,
            )?
            .with_loan_terms(interest_rate_percent, duration_months);
            self.insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Record a repayment against the member's active loan.
    ///
    /// Overpayment clamps at zero; reaching zero closes the loan. The update
    /// is a compare-and-swap on the balance that was read, so a concurrent
    /// repayment fails the swap instead of double-applying.
    pub async fn repay_loan(&self, cmd: LoanPaymentCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            if cmd.amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "payment amount must be > 0".to_string(),
                ));
            }
            let member = self.require_member(&db_tx, cmd.member_id).await?;
            if !member.loan.active {
                return Err(EngineError::Conflict(
                    "member has no active loan".to_string(),
                ));
            }

            let mut loan = member.loan.clone();
            let previous_remaining = loan.remaining_minor;
            loan.apply_payment(cmd.amount_minor);

            let rows = members::Entity::update_many()
                .set(members::loan_active_model(&loan))
                .filter(members::Column::Id.eq(member.id.to_string()))
                .filter(members::Column::LoanActive.eq(true))
                .filter(members::Column::LoanRemainingMinor.eq(previous_remaining))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if rows == 0 {
                return Err(EngineError::Conflict(
                    "loan state changed concurrently, retry".to_string(),
                ));
            }

            let now = Utc::now();
            let tx = Transaction::new(
                member.id,
                member.name.clone(),
                member.email.clone(),
                TransactionKind::LoanPayment,
                cmd.amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                now,
            )?;
            self.insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Credit a bonus to one member.
    ///
    /// Purely an additive log entry; bonus totals are derived by summing the
    /// log, never stored on the member row.
    pub async fn bonus(&self, cmd: BonusCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let member = self.require_member(&db_tx, cmd.member_id).await?;
            let tx = Transaction::new(
                member.id,
                member.name.clone(),
                member.email.clone(),
                TransactionKind::Bonus,
                cmd.amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                Utc::now(),
            )?;
            self.insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    pub(super) async fn insert_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db).await?;
        Ok(())
    }
}
