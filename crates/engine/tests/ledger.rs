use chrono::{Duration, Utc};
use sea_orm::{ActiveValue, Database, DatabaseConnection, EntityTrait};

use engine::{
    BonusCmd, CollectionStatus, ContributionCmd, Engine, EngineError, LoanIssueCmd,
    LoanPaymentCmd, LoanStatus, Member, MemberRole, ProfileUpdateCmd, RegisterMemberCmd,
    SaveReceiptCmd, TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn register(engine: &Engine, name: &str, email: &str, mobile: &str) -> Member {
    engine
        .register_member(RegisterMemberCmd::new(name, email, mobile, "password"))
        .await
        .unwrap()
}

#[tokio::test]
async fn registration_initializes_financials() {
    let (engine, _db) = engine_with_db().await;

    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    assert_eq!(member.role, MemberRole::Member);
    assert!(member.registration_number.starts_with("SOC-"));
    assert_eq!(member.collection.status, CollectionStatus::Due);
    assert_eq!(member.collection.amount_paid_minor, 0);
    assert!(member.collection.last_paid_at.is_none());
    assert!(!member.loan.active);
    assert_eq!(member.loan.remaining_minor, 0);

    // Plan defaults come from settings fallbacks.
    assert_eq!(member.plan_amount_minor, 1_000_00);
    assert_eq!(member.plan_duration_years, 1);
}

#[tokio::test]
async fn duplicate_email_and_mobile_have_distinct_messages() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let err = engine
        .register_member(RegisterMemberCmd::new(
            "Other",
            // Same address modulo case: normalization makes it collide.
            "ASHA@example.com",
            "9876543211",
            "password",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("email already registered".to_string())
    );

    let err = engine
        .register_member(RegisterMemberCmd::new(
            "Other",
            "other@example.com",
            "9876543210",
            "password",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("mobile number already registered".to_string())
    );
}

#[tokio::test]
async fn contribution_marks_collection_paid() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let tx = engine
        .contribution(
            ContributionCmd::new(member.id)
                .amount_minor(1_000)
                .description("June collection"),
        )
        .await
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::Contribution);
    assert_eq!(tx.amount_minor, 1_000);
    assert_eq!(tx.member_name, "Asha");
    assert_eq!(tx.member_email, "asha@example.com");

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.collection.status, CollectionStatus::Paid);
    assert_eq!(member.collection.amount_paid_minor, 1_000);
    assert!(member.collection.last_paid_at.is_some());

    let history = engine.member_transactions(member.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, tx.id);
}

#[tokio::test]
async fn contribution_defaults_to_plan_amount() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let tx = engine
        .contribution(ContributionCmd::new(member.id))
        .await
        .unwrap();
    assert_eq!(tx.amount_minor, member.plan_amount_minor);

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.collection.amount_paid_minor, member.plan_amount_minor);
}

#[tokio::test]
async fn loan_issue_sets_state_and_second_issue_conflicts() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let tx = engine
        .issue_loan(
            LoanIssueCmd::new(member.id, 5_000)
                .interest_rate_percent(2.0)
                .duration_months(12),
        )
        .await
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::LoanIssued);
    assert_eq!(tx.interest_rate_percent, Some(2.0));
    assert_eq!(tx.duration_months, Some(12));

    let member = engine.member(member.id).await.unwrap();
    assert!(member.loan.active);
    assert_eq!(member.loan.principal_minor, 5_000);
    assert_eq!(member.loan.remaining_minor, 5_000);
    assert_eq!(member.loan.interest_rate_percent, 2.0);
    assert_eq!(member.loan.status, LoanStatus::Active);
    assert!(member.loan.loan_id.is_some());
    assert!(member.loan.due_at.unwrap() > member.loan.issued_at.unwrap());

    let err = engine
        .issue_loan(
            LoanIssueCmd::new(member.id, 5_000)
                .interest_rate_percent(2.0)
                .duration_months(12),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn loan_issue_uses_settings_defaults() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    engine
        .set_setting("default_interest_rate_percent", "3.5")
        .await
        .unwrap();
    engine
        .set_setting("default_loan_duration_months", "6")
        .await
        .unwrap();

    let tx = engine
        .issue_loan(LoanIssueCmd::new(member.id, 2_000))
        .await
        .unwrap();
    assert_eq!(tx.interest_rate_percent, Some(3.5));
    assert_eq!(tx.duration_months, Some(6));

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.loan.interest_rate_percent, 3.5);
}

#[tokio::test]
async fn loan_issue_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let err = engine
        .issue_loan(LoanIssueCmd::new(member.id, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .issue_loan(LoanIssueCmd::new(member.id, 1_000).duration_months(0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn overpayment_clamps_to_zero_and_closes_loan() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    engine
        .issue_loan(LoanIssueCmd::new(member.id, 300))
        .await
        .unwrap();
    engine
        .repay_loan(LoanPaymentCmd::new(member.id, 500))
        .await
        .unwrap();

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.loan.remaining_minor, 0);
    assert_eq!(member.loan.status, LoanStatus::Paid);
    assert!(!member.loan.active);
}

#[tokio::test]
async fn payments_summing_to_principal_close_exactly() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    engine
        .issue_loan(LoanIssueCmd::new(member.id, 5_000))
        .await
        .unwrap();
    for amount in [2_000, 2_000, 1_000] {
        engine
            .repay_loan(LoanPaymentCmd::new(member.id, amount))
            .await
            .unwrap();
    }

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.loan.remaining_minor, 0);
    assert_eq!(member.loan.status, LoanStatus::Paid);
    assert!(!member.loan.active);

    // Once paid, further payments are rejected, never negative.
    let err = engine
        .repay_loan(LoanPaymentCmd::new(member.id, 100))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("member has no active loan".to_string())
    );
}

#[tokio::test]
async fn payment_without_active_loan_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let err = engine
        .repay_loan(LoanPaymentCmd::new(member.id, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn cleared_loan_allows_a_new_one() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    engine
        .issue_loan(LoanIssueCmd::new(member.id, 1_000))
        .await
        .unwrap();
    engine
        .repay_loan(LoanPaymentCmd::new(member.id, 1_000))
        .await
        .unwrap();

    let tx = engine
        .issue_loan(LoanIssueCmd::new(member.id, 7_000))
        .await
        .unwrap();
    assert_eq!(tx.amount_minor, 7_000);

    let member = engine.member(member.id).await.unwrap();
    assert!(member.loan.active);
    assert_eq!(member.loan.principal_minor, 7_000);
    assert_eq!(member.loan.remaining_minor, 7_000);
}

#[tokio::test]
async fn unknown_member_fails_with_not_found() {
    let (engine, _db) = engine_with_db().await;

    let missing = uuid::Uuid::new_v4();
    let err = engine
        .contribution(ContributionCmd::new(missing))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("member not exists".to_string())
    );

    let err = engine.member_transactions(missing).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn bonus_distribution_creates_one_transaction_per_member() {
    let (engine, _db) = engine_with_db().await;
    let asha = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let binod = register(&engine, "Binod", "binod@example.com", "9876543211").await;
    engine
        .register_member(
            RegisterMemberCmd::new("Admin", "admin@example.com", "9876543212", "password")
                .role(MemberRole::Admin),
        )
        .await
        .unwrap();

    let distribution = engine.distribute_bonus(500, "Diwali Bonus").await.unwrap();

    // Admins are not recipients.
    assert_eq!(distribution.distributed_count, 2);
    assert_eq!(distribution.total_amount_minor, 1_000);

    for member_id in [asha.id, binod.id] {
        let history = engine.member_transactions(member_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Bonus);
        assert_eq!(history[0].amount_minor, 500);
        assert_eq!(history[0].description.as_deref(), Some("Diwali Bonus"));
    }

    // Bonus credits leave the financial state untouched.
    let member = engine.member(asha.id).await.unwrap();
    assert_eq!(member.collection.status, CollectionStatus::Due);
    assert!(!member.loan.active);
}

#[tokio::test]
async fn single_member_bonus_is_log_only() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    let tx = engine
        .bonus(BonusCmd::new(member.id, 250).description("Festival gift"))
        .await
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Bonus);
    assert_eq!(tx.amount_minor, 250);

    let after = engine.member(member.id).await.unwrap();
    assert_eq!(after.collection.status, CollectionStatus::Due);
    assert_eq!(after.collection.amount_paid_minor, 0);
    assert!(!after.loan.active);
}

#[tokio::test]
async fn bonus_distribution_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.distribute_bonus(500, "Bonus").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("no members to distribute bonus to".to_string())
    );

    register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let err = engine.distribute_bonus(0, "Bonus").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn stats_over_empty_store_are_zero() {
    let (engine, _db) = engine_with_db().await;

    let stats = engine.compute_stats().await.unwrap();
    assert_eq!(stats.total_members, 0);
    assert_eq!(stats.total_collection_minor, 0);
    assert_eq!(stats.pending_minor, 0);
    assert_eq!(stats.outstanding_loan_minor, 0);
    assert_eq!(stats.active_loans, 0);
}

#[tokio::test]
async fn stats_reflect_member_state() {
    let (engine, _db) = engine_with_db().await;
    let asha = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let binod = register(&engine, "Binod", "binod@example.com", "9876543211").await;

    engine
        .contribution(ContributionCmd::new(asha.id).amount_minor(1_500))
        .await
        .unwrap();
    engine
        .issue_loan(LoanIssueCmd::new(binod.id, 4_000))
        .await
        .unwrap();
    engine
        .repay_loan(LoanPaymentCmd::new(binod.id, 1_000))
        .await
        .unwrap();

    let stats = engine.compute_stats().await.unwrap();
    assert_eq!(stats.total_members, 2);
    assert_eq!(stats.total_collection_minor, 1_500);
    // Binod still owes this month's plan.
    assert_eq!(stats.pending_minor, binod.plan_amount_minor);
    assert_eq!(stats.outstanding_loan_minor, 3_000);
    assert_eq!(stats.active_loans, 1);
}

#[tokio::test]
async fn delete_member_cascades_and_spares_others() {
    let (engine, _db) = engine_with_db().await;
    let asha = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let binod = register(&engine, "Binod", "binod@example.com", "9876543211").await;

    let asha_tx = engine
        .contribution(ContributionCmd::new(asha.id))
        .await
        .unwrap();
    let binod_tx = engine
        .contribution(ContributionCmd::new(binod.id))
        .await
        .unwrap();
    engine
        .save_receipt(SaveReceiptCmd::new(asha_tx.id, "system", "ZG9jdW1lbnQ="))
        .await
        .unwrap();

    engine.delete_member(asha.id).await.unwrap();

    assert!(matches!(
        engine.member(asha.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.transaction(asha_tx.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.receipt(asha_tx.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // The other member's history is untouched.
    let history = engine.member_transactions(binod.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, binod_tx.id);
}

#[tokio::test]
async fn transactions_list_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;

    engine
        .contribution(ContributionCmd::new(member.id))
        .await
        .unwrap();
    engine
        .issue_loan(LoanIssueCmd::new(member.id, 2_000))
        .await
        .unwrap();
    let last = engine
        .repay_loan(LoanPaymentCmd::new(member.id, 500))
        .await
        .unwrap();

    let all = engine.transactions(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, last.id);

    let limited = engine.transactions(Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn overdue_transition_fires_once() {
    let (engine, db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    engine
        .issue_loan(LoanIssueCmd::new(member.id, 5_000))
        .await
        .unwrap();

    let now = Utc::now();

    // Nothing due yet.
    let flipped = engine.mark_overdue_loans(now).await.unwrap();
    assert!(flipped.is_empty());

    // Backdate the due date past the clock.
    let active = engine::members::ActiveModel {
        id: ActiveValue::Set(member.id.to_string()),
        loan_due_at: ActiveValue::Set(Some(now - Duration::days(3))),
        ..Default::default()
    };
    engine::members::Entity::update(active).exec(&db).await.unwrap();

    let flipped = engine.mark_overdue_loans(now).await.unwrap();
    assert_eq!(flipped.len(), 1);
    assert_eq!(flipped[0].loan.status, LoanStatus::Overdue);
    assert!(flipped[0].loan.active);

    // Second sweep finds nothing new.
    let flipped = engine.mark_overdue_loans(now).await.unwrap();
    assert!(flipped.is_empty());

    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.loan.status, LoanStatus::Overdue);

    // Overdue loans can still be repaid to completion.
    engine
        .repay_loan(LoanPaymentCmd::new(member.id, 5_000))
        .await
        .unwrap();
    let member = engine.member(member.id).await.unwrap();
    assert_eq!(member.loan.status, LoanStatus::Paid);
}

#[tokio::test]
async fn loans_due_within_window() {
    let (engine, db) = engine_with_db().await;
    let soon = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let later = register(&engine, "Binod", "binod@example.com", "9876543211").await;

    engine
        .issue_loan(LoanIssueCmd::new(soon.id, 1_000))
        .await
        .unwrap();
    engine
        .issue_loan(LoanIssueCmd::new(later.id, 1_000))
        .await
        .unwrap();

    let now = Utc::now();
    let active = engine::members::ActiveModel {
        id: ActiveValue::Set(soon.id.to_string()),
        loan_due_at: ActiveValue::Set(Some(now + Duration::days(1))),
        ..Default::default()
    };
    engine::members::Entity::update(active).exec(&db).await.unwrap();

    let due = engine.loans_due_within(now, 2).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, soon.id);
}

#[tokio::test]
async fn receipt_save_is_an_upsert() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let tx = engine
        .contribution(ContributionCmd::new(member.id))
        .await
        .unwrap();

    engine
        .save_receipt(SaveReceiptCmd::new(tx.id, "system", "Zmlyc3Q="))
        .await
        .unwrap();
    engine
        .save_receipt(SaveReceiptCmd::new(tx.id, "admin@example.com", "c2Vjb25k"))
        .await
        .unwrap();

    let receipt = engine.receipt(tx.id).await.unwrap();
    assert_eq!(receipt.document_b64, "c2Vjb25k");
    assert_eq!(receipt.generated_by, "admin@example.com");
    assert_eq!(receipt.member_name, "Asha");

    let err = engine
        .save_receipt(SaveReceiptCmd::new(uuid::Uuid::new_v4(), "system", "eA=="))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn profile_update_cannot_touch_financials() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    engine
        .issue_loan(LoanIssueCmd::new(member.id, 2_000))
        .await
        .unwrap();
    let before = engine.member(member.id).await.unwrap();

    let updated = engine
        .update_profile(
            ProfileUpdateCmd::new(member.id)
                .name("Asha Rao")
                .address("12 Lake Road")
                .mobile("8876543210"),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Asha Rao");
    assert_eq!(updated.address.as_deref(), Some("12 Lake Road"));
    assert_eq!(updated.mobile, "8876543210");
    assert_eq!(updated.collection, before.collection);
    assert_eq!(updated.loan, before.loan);
}

#[tokio::test]
async fn transaction_snapshots_survive_profile_renames() {
    let (engine, _db) = engine_with_db().await;
    let member = register(&engine, "Asha", "asha@example.com", "9876543210").await;
    let tx = engine
        .contribution(ContributionCmd::new(member.id))
        .await
        .unwrap();

    engine
        .update_profile(ProfileUpdateCmd::new(member.id).name("Asha Rao"))
        .await
        .unwrap();

    // The log keeps the name as it was when the event happened.
    let stored = engine.transaction(tx.id).await.unwrap();
    assert_eq!(stored.member_name, "Asha");
}
