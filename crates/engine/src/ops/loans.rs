//! Loan clock: due-soon listing and the overdue transition.
//!
//! Driven by a periodic external trigger (the reminder task); state changes
//! go through the same guarded update path as every other loan mutation.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{LoanStatus, Member, ResultEngine, members};

use super::{Engine, with_tx};

impl Engine {
    /// Flip active loans past their due date to overdue.
    ///
    /// Returns the members whose loan was transitioned by this call; a loan
    /// already overdue is not returned again.
    pub async fn mark_overdue_loans(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            let models = members::Entity::find()
                .filter(members::Column::LoanActive.eq(true))
                .filter(members::Column::LoanStatus.eq(LoanStatus::Active.as_str()))
                .filter(members::Column::LoanDueAt.lt(now))
                .all(&db_tx)
                .await?;

            let mut flipped = Vec::with_capacity(models.len());
            for model in models {
                let mut member = Member::try_from(model)?;
                if !member.loan.mark_overdue(now) {
                    continue;
                }
                let rows = members::Entity::update_many()
                    .set(members::loan_active_model(&member.loan))
                    .filter(members::Column::Id.eq(member.id.to_string()))
                    .filter(members::Column::LoanActive.eq(true))
                    .filter(members::Column::LoanStatus.eq(LoanStatus::Active.as_str()))
                    .exec(&db_tx)
                    .await?
                    .rows_affected;
                if rows > 0 {
                    flipped.push(member);
                }
            }
            Ok(flipped)
        })
    }

    /// Active, not-yet-overdue loans whose due date falls within the next
    /// `days` days. Used for due-soon reminders.
    pub async fn loans_due_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> ResultEngine<Vec<Member>> {
        let horizon = now + Duration::days(days);
        let models = members::Entity::find()
            .filter(members::Column::LoanActive.eq(true))
            .filter(members::Column::LoanStatus.eq(LoanStatus::Active.as_str()))
            .filter(members::Column::LoanDueAt.gte(now))
            .filter(members::Column::LoanDueAt.lte(horizon))
            .all(&self.database)
            .await?;
        models.into_iter().map(Member::try_from).collect()
    }
}
