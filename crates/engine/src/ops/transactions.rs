//! Transaction log reads. The log itself is append-only; nothing here
//! mutates it.

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::Engine;

impl Engine {
    /// List transactions across all members, newest first.
    pub async fn transactions(&self, limit: Option<u64>) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// List one member's transactions, newest first. Unknown members fail
    /// with not-found instead of returning an empty history.
    pub async fn member_transactions(&self, member_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        self.require_member(&self.database, member_id).await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::MemberId.eq(member_id.to_string()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Return one transaction.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }
}
