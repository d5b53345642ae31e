//! Bonus distribution: the fan-out variant of the ledger write.
//!
//! One administrative action credits the same amount to every member. All
//! log inserts happen in a single DB transaction, so a failed insert rejects
//! the whole batch and nobody gets partial credit. Notification side effects
//! are the caller's business and are per-member independent.

use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Member, MemberRole, ResultEngine, Transaction, TransactionKind, members,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Outcome of a bonus distribution.
#[derive(Clone, Debug)]
pub struct BonusDistribution {
    pub distributed_count: u64,
    pub total_amount_minor: i64,
    /// One bonus transaction per member, in distribution order.
    pub transactions: Vec<Transaction>,
}

impl Engine {
    /// Credit `amount_minor` to every member with the member role.
    pub async fn distribute_bonus(
        &self,
        amount_minor: i64,
        description: &str,
    ) -> ResultEngine<BonusDistribution> {
        with_tx!(self, |db_tx| {
            if amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "bonus amount must be > 0".to_string(),
                ));
            }
            let description = normalize_optional_text(Some(description))
                .unwrap_or_else(|| "Annual dividend / bonus".to_string());

            let member_models = members::Entity::find()
                .filter(members::Column::Role.eq(MemberRole::Member.as_str()))
                .order_by_asc(members::Column::RegisteredAt)
                .all(&db_tx)
                .await?;
            if member_models.is_empty() {
                return Err(EngineError::InvalidAmount(
                    "no members to distribute bonus to".to_string(),
                ));
            }

            let now = Utc::now();
            let mut transactions = Vec::with_capacity(member_models.len());
            for model in member_models {
                let member = Member::try_from(model)?;
                let tx = Transaction::new(
                    member.id,
                    member.name,
                    member.email,
                    TransactionKind::Bonus,
                    amount_minor,
                    Some(description.clone()),
                    now,
                )?;
                self.insert_transaction(&db_tx, &tx).await?;
                transactions.push(tx);
            }

            let distributed_count = transactions.len() as u64;
            Ok(BonusDistribution {
                distributed_count,
                total_amount_minor: amount_minor * distributed_count as i64,
                transactions,
            })
        })
    }
}
