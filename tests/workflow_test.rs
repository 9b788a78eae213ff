//! End-to-end tests for registration, approval and the partner menu
//!
//! Run with: cargo test --test workflow_test

mod common;

use common::{TestEnv, ADMIN_ID};
use pretty_assertions::assert_eq;

use partnerbot::core::AppError;
use partnerbot::referral::{Access, AdminAction, RegistrationRequest, SharedContact};
use partnerbot::storage::UserState;

const PARTNER_ID: i64 = 1_454_702_347;

fn request(telegram_id: i64, name: &str) -> RegistrationRequest {
    RegistrationRequest {
        telegram_id,
        name: name.to_string(),
        phone: "+7 (999) 123-45-67".to_string(),
        username: Some("anna_partner".to_string()),
    }
}

#[tokio::test]
async fn test_registration_to_balance() {
    let env = TestEnv::new();
    assert_eq!(env.workflow.access(PARTNER_ID).unwrap(), Access::Unseen);

    let pending = env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    assert_eq!(pending.state, UserState::Pending);
    assert_eq!(pending.phone, "+79991234567");
    assert!(matches!(env.workflow.access(PARTNER_ID).unwrap(), Access::Pending(_)));

    let decision = env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();
    assert!(!decision.already_decided);
    assert!(decision.sheet_appended);
    assert_eq!(decision.sheet_error, None);
    assert_eq!(decision.user.state, UserState::Approved);
    assert!(decision.user.decided_at.is_some());
    assert_eq!(env.ledger.rows_with_code("1454702347"), 1);

    // Phone and name columns never count toward the balance
    let approved = decision.user;
    let fresh = env.menu.balance(&approved).await.unwrap();
    assert_eq!(fresh, 0.0);
    assert!(fresh.is_sign_positive());

    env.ledger.add_amounts("1454702347", &[100.50, 200.75]);
    assert_eq!(env.menu.balance(&approved).await.unwrap(), 301.25);

    let card = env.menu.referral_card(&approved).unwrap();
    assert_eq!(card.url, "https://taplink.cc/partners?ref=1454702347");
    assert!(card.qr.is_some());
}

#[tokio::test]
async fn test_repeat_approve_does_not_duplicate_row() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();

    env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();
    let again = env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();

    assert!(again.already_decided);
    assert!(!again.sheet_appended);
    assert_eq!(env.ledger.appends(), 1);
    assert_eq!(env.ledger.rows_with_code("1454702347"), 1);
}

#[tokio::test]
async fn test_sheet_failure_keeps_approval() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    env.ledger.set_failing(true);

    let decision = env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();
    assert!(decision.sheet_error.is_some());
    assert!(matches!(env.workflow.access(PARTNER_ID).unwrap(), Access::Approved(_)));
    assert_eq!(env.ledger.rows_with_code("1454702347"), 0);

    // Retry once the sheet is back
    env.ledger.set_failing(false);
    let retry = env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();
    assert!(retry.already_decided);
    assert!(retry.sheet_appended);
    assert_eq!(env.ledger.rows_with_code("1454702347"), 1);
}

#[tokio::test]
async fn test_balance_error_surfaces_when_sheet_down() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    let approved = env
        .workflow
        .decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID))
        .await
        .unwrap()
        .user;

    env.ledger.set_failing(true);
    let err = env.menu.balance(&approved).await.unwrap_err();
    assert!(err.is_integration());
}

#[tokio::test]
async fn test_rejected_user_is_gated() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();

    let decision = env.workflow.decide(ADMIN_ID, AdminAction::Reject(PARTNER_ID)).await.unwrap();
    assert_eq!(decision.user.state, UserState::Rejected);
    assert_eq!(env.ledger.appends(), 0);

    let Access::Rejected(user) = env.workflow.access(PARTNER_ID).unwrap() else {
        panic!("expected rejected access");
    };
    assert!(matches!(env.menu.balance(&user).await, Err(AppError::Validation(_))));
    assert!(matches!(env.menu.referral_card(&user), Err(AppError::Validation(_))));

    // No way back from a final state
    assert!(matches!(
        env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        env.workflow.register(request(PARTNER_ID, "Анна")),
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_reject_after_approve_is_refused() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap();

    let result = env.workflow.decide(ADMIN_ID, AdminAction::Reject(PARTNER_ID)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(matches!(env.workflow.access(PARTNER_ID).unwrap(), Access::Approved(_)));
}

#[tokio::test]
async fn test_pending_user_has_no_menu() {
    let env = TestEnv::new();
    let pending = env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();

    assert!(matches!(env.menu.balance(&pending).await, Err(AppError::Validation(_))));
    assert!(matches!(env.menu.referral_card(&pending), Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_decide_unknown_user() {
    let env = TestEnv::new();
    let result = env.workflow.decide(ADMIN_ID, AdminAction::Approve(42)).await;
    assert!(matches!(result, Err(AppError::NotFound(42))));
}

#[tokio::test]
async fn test_non_admin_cannot_decide() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();

    let result = env.workflow.decide(PARTNER_ID, AdminAction::Approve(PARTNER_ID)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(matches!(env.workflow.access(PARTNER_ID).unwrap(), Access::Pending(_)));
}

#[test]
fn test_contact_must_belong_to_sender() {
    let env = TestEnv::new();

    let own = SharedContact {
        owner_id: Some(PARTNER_ID),
        phone: "8 999 123 45 67".to_string(),
    };
    assert_eq!(env.workflow.verify_contact(PARTNER_ID, &own).unwrap(), "89991234567");

    let foreign = SharedContact {
        owner_id: Some(7),
        phone: "+79990000000".to_string(),
    };
    assert!(matches!(
        env.workflow.verify_contact(PARTNER_ID, &foreign),
        Err(AppError::Validation(_))
    ));

    let address_book = SharedContact {
        owner_id: None,
        phone: "+79990000000".to_string(),
    };
    assert!(env.workflow.verify_contact(PARTNER_ID, &address_book).is_err());
}

#[test]
fn test_invalid_name_is_not_stored() {
    let env = TestEnv::new();
    assert!(matches!(
        env.workflow.register(request(PARTNER_ID, "A")),
        Err(AppError::Validation(_))
    ));
    assert_eq!(env.workflow.access(PARTNER_ID).unwrap(), Access::Unseen);
}

#[test]
fn test_pending_registration_can_be_resubmitted() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    let updated = env.workflow.register(request(PARTNER_ID, "Анна Петрова")).unwrap();

    assert_eq!(updated.name, "Анна Петрова");
    assert_eq!(updated.state, UserState::Pending);
    assert_eq!(env.workflow.pending().unwrap().len(), 1);
}

#[tokio::test]
async fn test_counts_and_lists() {
    let env = TestEnv::new();
    for id in [11, 12, 13] {
        env.workflow.register(request(id, "Партнер")).unwrap();
    }
    env.workflow.decide(ADMIN_ID, AdminAction::Approve(11)).await.unwrap();
    env.workflow.decide(ADMIN_ID, AdminAction::Reject(12)).await.unwrap();

    let counts = env.workflow.counts().unwrap();
    assert_eq!((counts.pending, counts.approved, counts.rejected), (1, 1, 1));
    assert_eq!(counts.total(), 3);

    let approved: Vec<i64> = env.workflow.approved().unwrap().iter().map(|u| u.telegram_id).collect();
    assert_eq!(approved, vec![11]);
    let pending: Vec<i64> = env.workflow.pending().unwrap().iter().map(|u| u.telegram_id).collect();
    assert_eq!(pending, vec![13]);
}

#[tokio::test]
async fn test_storage_failure_has_user_message() {
    let env = TestEnv::new();
    env.workflow.register(request(PARTNER_ID, "Анна")).unwrap();
    env.pool.get().unwrap().execute("DROP TABLE users", []).unwrap();

    let failures = [
        env.workflow.access(PARTNER_ID).unwrap_err(),
        env.workflow.pending().unwrap_err(),
        env.workflow.approved().unwrap_err(),
        env.workflow.counts().unwrap_err(),
        env.workflow.decide(ADMIN_ID, AdminAction::Approve(PARTNER_ID)).await.unwrap_err(),
    ];
    for err in failures {
        assert!(matches!(err, AppError::Database(_)), "unexpected {:?}", err);
        assert_eq!(err.user_message(), "Ошибка базы данных. Попробуйте позже.");
    }
}
