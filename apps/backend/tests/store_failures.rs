mod common;
mod support;

use backend_test_support::unique_helpers::unique_email;
use identity::error::AppError;
use identity::services::identity::PasswordReset;
use support::harness::failing_store_harness;

const PASSWORD: &str = "correct horse battery staple";

#[tokio::test]
async fn login_fails_when_refresh_token_cannot_be_stored() {
    let h = failing_store_harness().await;
    let email = unique_email("store-login");
    h.register_confirmed(&email, PASSWORD).await;

    assert_eq!(
        h.state.identity.login(&email, PASSWORD).await.unwrap_err(),
        AppError::TokenError
    );
}

#[tokio::test]
async fn forgot_password_succeeds_when_code_cannot_be_stored() {
    let h = failing_store_harness().await;
    let email = unique_email("store-forgot");
    h.register_confirmed(&email, PASSWORD).await;

    h.state.identity.forgot_password(&email).await.unwrap();

    // The mail still goes out
    let mail = h.mailer.last_to(&email).expect("reset mail sent");
    assert!(mail.subject.ends_with("Reset Password"));
}

#[tokio::test]
async fn reset_password_is_database_error_when_code_cannot_be_read() {
    let h = failing_store_harness().await;
    let email = unique_email("store-reset");
    h.register_confirmed(&email, PASSWORD).await;

    let err = h
        .state
        .identity
        .reset_password(PasswordReset {
            email: email.clone(),
            password: "new password".to_string(),
            code: "123456".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, AppError::DatabaseError);
}

#[tokio::test]
async fn logout_is_database_error_when_token_cannot_be_revoked() {
    let h = failing_store_harness().await;
    let email = unique_email("store-logout");
    let user = h.register_confirmed(&email, PASSWORD).await;

    assert_eq!(
        h.state.identity.logout(user.id).await.unwrap_err(),
        AppError::DatabaseError
    );
}
