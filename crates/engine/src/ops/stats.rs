//! Society-wide statistics, recomputed from scratch on every call.
//!
//! The scans run without a surrounding transaction: concurrent ledger writes
//! may make the snapshot internally inconsistent by a small margin, which is
//! accepted. Callers wanting a caching layer wrap this interface.

use sea_orm::{ConnectionTrait, Statement, Value};

use crate::{CollectionStatus, MemberRole, ResultEngine};

use super::Engine;

/// Point-in-time aggregate over all members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_members: u64,
    pub total_collection_minor: i64,
    pub pending_minor: i64,
    pub outstanding_loan_minor: i64,
    pub active_loans: u64,
}

impl Engine {
    pub async fn compute_stats(&self) -> ResultEngine<Stats> {
        let total_members = self
            .count_query(
                "SELECT COUNT(*) AS cnt FROM members WHERE role = ?",
                vec![MemberRole::Member.as_str().into()],
            )
            .await?;

        let total_collection_minor = self
            .sum_query(
                "SELECT COALESCE(SUM(collection_paid_minor), 0) AS sum \
                 FROM members WHERE role = ?",
                vec![MemberRole::Member.as_str().into()],
            )
            .await?;

        let pending_minor = self
            .sum_query(
                "SELECT COALESCE(SUM(plan_amount_minor), 0) AS sum \
                 FROM members WHERE role = ? AND collection_status = ?",
                vec![
                    MemberRole::Member.as_str().into(),
                    CollectionStatus::Due.as_str().into(),
                ],
            )
            .await?;

        let outstanding_loan_minor = self
            .sum_query(
                "SELECT COALESCE(SUM(loan_remaining_minor), 0) AS sum \
                 FROM members WHERE role = ? AND loan_active = ?",
                vec![MemberRole::Member.as_str().into(), true.into()],
            )
            .await?;

        let active_loans = self
            .count_query(
                "SELECT COUNT(*) AS cnt FROM members WHERE role = ? AND loan_active = ?",
                vec![MemberRole::Member.as_str().into(), true.into()],
            )
            .await?;

        Ok(Stats {
            total_members,
            total_collection_minor,
            pending_minor,
            outstanding_loan_minor,
            active_loans,
        })
    }

    async fn sum_query(&self, sql: &str, values: Vec<Value>) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, values);
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    async fn count_query(&self, sql: &str, values: Vec<Value>) -> ResultEngine<u64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, values);
        let row = self.database.query_one(stmt).await?;
        let count: i64 = row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0);
        Ok(count.max(0) as u64)
    }
}
