//! Receipt persistence: one rendered document per transaction, upserted.

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Receipt, ResultEngine, SaveReceiptCmd, Transaction, receipts,
    transactions};

use super::{Engine, with_tx};

impl Engine {
    /// Store a rendered receipt for a transaction, replacing any earlier one.
    pub async fn save_receipt(&self, cmd: SaveReceiptCmd) -> ResultEngine<Receipt> {
        with_tx!(self, |db_tx| {
            let tx_model = transactions::Entity::find_by_id(cmd.transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let tx = Transaction::try_from(tx_model)?;

            if cmd.document_b64.is_empty() {
                return Err(EngineError::InvalidAmount(
                    "receipt document must not be empty".to_string(),
                ));
            }

            let receipt = Receipt {
                transaction_id: tx.id,
                member_id: tx.member_id,
                member_name: tx.member_name.clone(),
                kind: tx.kind.as_str().to_string(),
                amount_minor: tx.amount_minor,
                generated_by: cmd.generated_by.clone(),
                document_b64: cmd.document_b64.clone(),
                generated_at: Utc::now(),
            };

            let existing = receipts::Entity::find_by_id(tx.id.to_string())
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => {
                    let mut active: receipts::ActiveModel = model.into();
                    active.member_name = ActiveValue::Set(receipt.member_name.clone());
                    active.amount_minor = ActiveValue::Set(receipt.amount_minor);
                    active.kind = ActiveValue::Set(receipt.kind.clone());
                    active.generated_by = ActiveValue::Set(receipt.generated_by.clone());
                    active.document_b64 = ActiveValue::Set(receipt.document_b64.clone());
                    active.generated_at = ActiveValue::Set(receipt.generated_at);
                    active.update(&db_tx).await?;
                }
                None => {
                    let active = receipts::ActiveModel {
                        transaction_id: ActiveValue::Set(receipt.transaction_id.to_string()),
                        member_id: ActiveValue::Set(receipt.member_id.to_string()),
                        member_name: ActiveValue::Set(receipt.member_name.clone()),
                        kind: ActiveValue::Set(receipt.kind.clone()),
                        amount_minor: ActiveValue::Set(receipt.amount_minor),
                        generated_by: ActiveValue::Set(receipt.generated_by.clone()),
                        document_b64: ActiveValue::Set(receipt.document_b64.clone()),
                        generated_at: ActiveValue::Set(receipt.generated_at),
                    };
                    active.insert(&db_tx).await?;
                }
            }

            Ok(receipt)
        })
    }

    /// Return the receipt stored for a transaction.
    pub async fn receipt(&self, transaction_id: Uuid) -> ResultEngine<Receipt> {
        let model = receipts::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("receipt not exists".to_string()))?;
        Receipt::try_from(model)
    }
}
