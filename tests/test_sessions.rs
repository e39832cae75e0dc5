//! Session lifecycle over a recording gateway connector.

mod support;

use battery_passport_gateway::{GatewayError, Identity, IdentityStore, Role, Settings};
use std::time::Duration;
use support::{org, Harness};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unprovisioned_org_fails_before_connecting() {
    let h = Harness::new(Settings::default());

    let err = h.context.sessions.open_session(&org("org3")).await.err().unwrap();
    assert!(matches!(err, GatewayError::UnknownIdentity(ref o) if o == "org3"), "got {err:?}");
    assert_eq!(h.connector.connects(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn admin_identity_is_used_when_no_app_user_exists() {
    let h = Harness::new(Settings::default());
    let admin = Identity::new(org("org5"), Role::Admin, "CERT".into(), "KEY".into());
    h.wallet.put("admin", &admin).await.unwrap();

    let session = h.context.sessions.open_session(&org("org5")).await.unwrap();
    assert_eq!(session.channel(), "public-channel");
    assert_eq!(session.contract_name(), "public");
    session.close().await;

    assert_eq!(h.connector.connects(), 1);
    assert_eq!(h.connector.closes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn with_contract_closes_once_on_success_and_failure() {
    let h = Harness::new(Settings::default());
    h.provision_all().await;
    let sessions = &h.context.sessions;

    let out = sessions
        .with_contract(&org("org1"), |contract| async move {
            contract.evaluate_transaction("QueryAllMaterials", &[]).await
        })
        .await
        .unwrap();
    assert_eq!(out, b"{}");
    assert_eq!(h.connector.closes(), 1);

    h.connector.fail_with("chaincode panicked");
    let err = sessions
        .with_contract(&org("org1"), |contract| async move {
            contract.submit_transaction("VerifyMaterial", &["M1".to_string()]).await
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transaction(ref m) if m == "chaincode panicked"));
    assert_eq!(h.connector.connects(), 2);
    assert_eq!(h.connector.closes(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unconfigured_org_is_rejected() {
    let mut settings = Settings::default();
    settings.orgs.truncate(1);
    let h = Harness::new(settings);

    let err = h.context.sessions.open_session(&org("org9")).await.err().unwrap();
    assert!(matches!(err, GatewayError::InvalidRequest(_)), "got {err:?}");
    assert_eq!(h.connector.connects(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_request_still_closes_its_session() {
    let h = Harness::new(Settings::default());
    h.provision_all().await;

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        h.context.sessions.with_contract(&org("org1"), |_contract| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }),
    )
    .await;
    assert!(outcome.is_err(), "the contract call should have been cut short");

    for _ in 0..50 {
        if h.connector.closes() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(h.connector.connects(), 1);
    assert_eq!(h.connector.closes(), 1);
}
