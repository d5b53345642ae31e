//! Settings access: read-through with fallbacks, upsert for admin edits.

use sea_orm::{ActiveValue, ConnectionTrait, TransactionTrait, prelude::*};

use crate::{
    LoanDefaults, ResultEngine,
    settings::{
        self, DEFAULT_INTEREST_RATE_PERCENT, DEFAULT_LOAN_DURATION_MONTHS,
        DEFAULT_PLAN_AMOUNT_MINOR, FALLBACK_INTEREST_RATE_PERCENT,
        FALLBACK_LOAN_DURATION_MONTHS, FALLBACK_PLAN_AMOUNT_MINOR,
        FALLBACK_PLAN_DURATION_YEARS,
    },
};

use super::{Engine, with_tx};

impl Engine {
    /// Return one setting value, if present.
    pub async fn setting(&self, key: &str) -> ResultEngine<Option<String>> {
        let model = settings::Entity::find_by_id(key.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.value))
    }

    /// List all settings.
    pub async fn list_settings(&self) -> ResultEngine<Vec<(String, String)>> {
        let models = settings::Entity::find().all(&self.database).await?;
        Ok(models.into_iter().map(|m| (m.key, m.value)).collect())
    }

    /// Upsert a setting.
    pub async fn set_setting(&self, key: &str, value: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let existing = settings::Entity::find_by_id(key.to_string())
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => {
                    let mut active: settings::ActiveModel = model.into();
                    active.value = ActiveValue::Set(value.to_string());
                    active.update(&db_tx).await?;
                }
                None => {
                    let active = settings::ActiveModel {
                        key: ActiveValue::Set(key.to_string()),
                        value: ActiveValue::Set(value.to_string()),
                    };
                    active.insert(&db_tx).await?;
                }
            }
            Ok(())
        })
    }

    /// Loan terms to apply when an issuance carries none.
    pub async fn loan_defaults(&self) -> ResultEngine<LoanDefaults> {
        self.loan_defaults_in(&self.database).await
    }

    pub(super) async fn loan_defaults_in<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<LoanDefaults> {
        // Unparsable values fall back to the compiled defaults.
        let interest_rate_percent = self
            .setting_value_in(db, DEFAULT_INTEREST_RATE_PERCENT)
            .await?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(FALLBACK_INTEREST_RATE_PERCENT);
        let duration_months = self
            .setting_value_in(db, DEFAULT_LOAN_DURATION_MONTHS)
            .await?
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(FALLBACK_LOAN_DURATION_MONTHS);
        Ok(LoanDefaults {
            interest_rate_percent,
            duration_months,
        })
    }

    /// `(plan_amount_minor, plan_duration_years)` for registrations that
    /// carry no explicit plan.
    pub(super) async fn plan_defaults_in<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<(i64, i32)> {
        let plan_amount_minor = self
            .setting_value_in(db, DEFAULT_PLAN_AMOUNT_MINOR)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(FALLBACK_PLAN_AMOUNT_MINOR);
        Ok((plan_amount_minor, FALLBACK_PLAN_DURATION_YEARS))
    }

    async fn setting_value_in<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
    ) -> ResultEngine<Option<String>> {
        let model = settings::Entity::find_by_id(key.to_string()).one(db).await?;
        Ok(model.map(|m| m.value))
    }
}
