//! Receipts table.
//!
//! One row per transaction that has had a receipt rendered. Keyed by the
//! transaction id and upserted: regenerating a receipt replaces the stored
//! document.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub kind: String,
    pub amount_minor: i64,
    pub generated_by: String,
    /// Base64 of the rendered document.
    pub document_b64: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    pub member_id: String,
    pub member_name: String,
    pub kind: String,
    pub amount_minor: i64,
    pub generated_by: String,
    pub document_b64: String,
    pub generated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Receipt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_id: Uuid::parse_str(&model.transaction_id)
                .map_err(|_| EngineError::KeyNotFound("receipt not exists".to_string()))?,
            member_id: Uuid::parse_str(&model.member_id)
                .map_err(|_| EngineError::KeyNotFound("member not exists".to_string()))?,
            member_name: model.member_name,
            kind: model.kind,
            amount_minor: model.amount_minor,
            generated_by: model.generated_by,
            document_b64: model.document_b64,
            generated_at: model.generated_at,
        })
    }
}
