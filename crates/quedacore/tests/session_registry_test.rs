//! Cross-device exclusivity through the public registry API: the binding
//! marker on the account record is a lock, and nobody steals it.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use quedacore::{LoginError, SessionRegistry};

const CHAT_MOVIL: i64 = 1;
const CHAT_PORTATIL: i64 = 2;

#[tokio::test]
async fn an_account_lives_in_one_chat_at_a_time() {
    let plataforma = common::plataforma();
    let registro = SessionRegistry::new(common::como_gateway(&plataforma));

    registro
        .login(CHAT_MOVIL, "ana", common::CONTRASENA)
        .await
        .expect("first login wins");

    let rechazo = registro
        .login(CHAT_PORTATIL, "ana", common::CONTRASENA)
        .await
        .expect_err("the second device must be refused");
    assert!(matches!(rechazo, LoginError::AlreadyLoggedInElsewhere));
    assert!(registro.is_logged_in(CHAT_MOVIL));
    assert!(!registro.is_logged_in(CHAT_PORTATIL));

    // Logging out hands the account over.
    assert!(registro.logout(CHAT_MOVIL).await);
    registro
        .login(CHAT_PORTATIL, "ana", common::CONTRASENA)
        .await
        .expect("the account is free again");
}

#[tokio::test]
async fn two_registries_share_the_marker_through_the_backend() {
    // Two bot processes pointed at the same backend must still agree,
    // because the lock lives in the account record, not in memory.
    let plataforma = common::plataforma();
    let registro_a = SessionRegistry::new(common::como_gateway(&plataforma));
    let registro_b = SessionRegistry::new(common::como_gateway(&plataforma));

    registro_a
        .login(CHAT_MOVIL, "ana", common::CONTRASENA)
        .await
        .expect("first login wins");

    let rechazo = registro_b
        .login(CHAT_PORTATIL, "ana", common::CONTRASENA)
        .await
        .expect_err("the marker must be respected across processes");
    assert!(matches!(rechazo, LoginError::AlreadyLoggedInElsewhere));
}

#[tokio::test]
async fn same_chat_relogin_is_not_a_conflict() {
    let plataforma = common::plataforma();
    let registro = SessionRegistry::new(common::como_gateway(&plataforma));

    registro
        .login(CHAT_MOVIL, "ana", common::CONTRASENA)
        .await
        .expect("first login");
    registro
        .login(CHAT_MOVIL, "ana", common::CONTRASENA)
        .await
        .expect("the same chat may refresh its own session");
    assert_eq!(registro.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn expiry_releases_the_marker_for_other_devices() {
    let plataforma = common::plataforma();
    let registro = SessionRegistry::new(common::como_gateway(&plataforma));

    registro
        .login(CHAT_MOVIL, "ana", common::CONTRASENA)
        .await
        .expect("first login");

    tokio::time::advance(Duration::from_secs(2 * 60 * 60)).await;
    assert_eq!(registro.evict_idle(Duration::from_secs(60 * 60)).await, 1);

    registro
        .login(CHAT_PORTATIL, "ana", common::CONTRASENA)
        .await
        .expect("an expired session must not hold the account hostage");
}

#[tokio::test]
async fn bad_credentials_never_create_sessions() {
    let plataforma = common::plataforma();
    let registro = SessionRegistry::new(common::como_gateway(&plataforma));

    let rechazo = registro
        .login(CHAT_MOVIL, "ana", "incorrecta")
        .await
        .expect_err("wrong password");
    assert!(matches!(rechazo, LoginError::InvalidCredentials));
    assert!(registro.is_empty());
}
