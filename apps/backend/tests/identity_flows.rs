mod common;
mod support;

use std::sync::Arc;

use backend_test_support::unique_helpers::unique_email;
use identity::auth::TokenPurpose;
use identity::error::AppError;
use identity::mail::RecordingMailer;
use identity::services::identity::PasswordReset;
use identity::store::EphemeralStore;
use support::harness::{harness_with_mailer, registration, APP_NAME, FRONTEND_URL};
use support::test_harness;

const PASSWORD: &str = "correct horse battery staple";

fn reset(email: &str, password: &str, code: &str) -> PasswordReset {
    PasswordReset {
        email: email.to_string(),
        password: password.to_string(),
        code: code.to_string(),
    }
}

#[tokio::test]
async fn register_creates_unconfirmed_user_and_mails_link() {
    let h = test_harness().await;
    let email = unique_email("register");

    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();

    let user = h.user(&email).await;
    assert!(!user.email_confirmed);
    assert_ne!(user.password_hash, PASSWORD);
    assert_eq!(user.full_name(), "Ada Lovelace");

    let mail = h.mailer.last_to(&email).expect("mail sent");
    assert_eq!(
        mail.subject,
        format!("Welcome to {APP_NAME} - Verify Your Account")
    );
    assert!(mail
        .html
        .contains(&format!("{FRONTEND_URL}/account/verify-account?token=")));
}

#[tokio::test]
async fn second_registration_is_email_exists() {
    let h = test_harness().await;
    let email = unique_email("dup");

    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();
    let err = h
        .state
        .identity
        .register(registration(&email, "another password"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::EmailExists);
}

#[tokio::test]
async fn registration_survives_mail_failure() {
    let h = harness_with_mailer(Arc::new(RecordingMailer::failing())).await;
    let email = unique_email("nomail");

    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();

    assert!(!h.user(&email).await.email_confirmed);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn login_checks_password_before_confirmation() {
    let h = test_harness().await;
    let email = unique_email("unconfirmed");
    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();

    assert_eq!(
        h.state.identity.login(&email, "wrong").await.unwrap_err(),
        AppError::PasswordInvalid
    );
    assert_eq!(
        h.state.identity.login(&email, PASSWORD).await.unwrap_err(),
        AppError::EmailNotConfirmed
    );
}

#[tokio::test]
async fn login_unknown_email_is_email_not_found() {
    let h = test_harness().await;
    let err = h
        .state
        .identity
        .login(&unique_email("ghost"), PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err, AppError::EmailNotFound);
}

#[tokio::test]
async fn issued_tokens_verify_to_the_same_identity() {
    let h = test_harness().await;
    let email = unique_email("tokens");
    let user = h.register_confirmed(&email, PASSWORD).await;

    let session = h.state.identity.login(&email, PASSWORD).await.unwrap();
    let tokens = h.state.identity.tokens();

    let access = tokens
        .verify(&session.access_token, TokenPurpose::Access)
        .unwrap();
    let refresh = tokens
        .verify(&session.refresh_token, TokenPurpose::Refresh)
        .unwrap();

    assert_eq!(access, refresh);
    assert_eq!(access.id, user.id);
    assert_eq!(access.email, email);
    assert_eq!(session.access_expires_in, 15 * 60);
    assert_eq!(session.refresh_expires_in, 7 * 24 * 60 * 60);

    // Purposes do not cross over
    assert!(tokens
        .verify(&session.access_token, TokenPurpose::Refresh)
        .is_err());
}

#[tokio::test]
async fn verify_email_twice_is_already_confirmed() {
    let h = test_harness().await;
    let email = unique_email("verify");
    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();
    let token = h.confirmation_token(&email);

    h.state.identity.verify_email(&token).await.unwrap();
    assert!(h.user(&email).await.email_confirmed);

    assert_eq!(
        h.state.identity.verify_email(&token).await.unwrap_err(),
        AppError::EmailAlreadyConfirmed
    );
}

#[tokio::test]
async fn verify_email_rejects_other_purposes_and_garbage() {
    let h = test_harness().await;
    let email = unique_email("verify-bad");
    h.register_confirmed(&email, PASSWORD).await;
    let session = h.state.identity.login(&email, PASSWORD).await.unwrap();

    for token in [session.access_token.as_str(), "not-a-token", ""] {
        assert_eq!(
            h.state.identity.verify_email(token).await.unwrap_err(),
            AppError::TokenError,
            "{token:?}"
        );
    }
}

#[tokio::test]
async fn forgot_password_unknown_email_is_email_not_found() {
    let h = test_harness().await;
    assert_eq!(
        h.state
            .identity
            .forgot_password(&unique_email("ghost"))
            .await
            .unwrap_err(),
        AppError::EmailNotFound
    );
}

#[tokio::test]
async fn only_latest_otp_resets_password() {
    let h = test_harness().await;
    let email = unique_email("otp");
    h.register_confirmed(&email, PASSWORD).await;

    h.state.identity.forgot_password(&email).await.unwrap();
    let first = h.stored_otp(&email).await;
    assert_eq!(first.len(), 6);
    assert!(first.chars().all(|c| c.is_ascii_digit()));

    let mail = h.mailer.last_to(&email).unwrap();
    assert_eq!(mail.subject, format!("{APP_NAME} - Reset Password"));
    assert!(mail.html.contains(&first));

    // Regenerate until the code actually changes; equal draws are possible.
    let mut latest = first.clone();
    while latest == first {
        h.state.identity.forgot_password(&email).await.unwrap();
        latest = h.stored_otp(&email).await;
    }

    assert_eq!(
        h.state
            .identity
            .reset_password(reset(&email, "new password", &first))
            .await
            .unwrap_err(),
        AppError::OtpInvalid
    );

    h.state
        .identity
        .reset_password(reset(&email, "new password", &latest))
        .await
        .unwrap();
    h.state.identity.login(&email, "new password").await.unwrap();
}

#[tokio::test]
async fn empty_code_never_matches() {
    let h = test_harness().await;
    let email = unique_email("empty-otp");
    h.register_confirmed(&email, PASSWORD).await;

    // No code stored at all
    assert_eq!(h.stored_otp(&email).await, "");
    assert_eq!(
        h.state
            .identity
            .reset_password(reset(&email, "new password", ""))
            .await
            .unwrap_err(),
        AppError::OtpInvalid
    );
}

#[tokio::test]
async fn otp_cannot_be_replayed() {
    let h = test_harness().await;
    let email = unique_email("replay");
    h.register_confirmed(&email, PASSWORD).await;

    h.state.identity.forgot_password(&email).await.unwrap();
    let code = h.stored_otp(&email).await;

    h.state
        .identity
        .reset_password(reset(&email, "second password", &code))
        .await
        .unwrap();
    assert_eq!(h.stored_otp(&email).await, "");

    assert_eq!(
        h.state
            .identity
            .reset_password(reset(&email, "third password", &code))
            .await
            .unwrap_err(),
        AppError::OtpInvalid
    );
    h.state
        .identity
        .login(&email, "second password")
        .await
        .unwrap();
}

#[tokio::test]
async fn refresh_rotates_and_revokes_previous_token() {
    let h = test_harness().await;
    let email = unique_email("refresh");
    let user = h.register_confirmed(&email, PASSWORD).await;

    let first = h.state.identity.login(&email, PASSWORD).await.unwrap();
    let second = h
        .state
        .identity
        .refresh(&first.refresh_token)
        .await
        .unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(
        h.state.identity.tokens().stored_refresh_token(user.id).await.unwrap(),
        second.refresh_token
    );

    assert_eq!(
        h.state
            .identity
            .refresh(&first.refresh_token)
            .await
            .unwrap_err(),
        AppError::TokenError
    );
    h.state
        .identity
        .refresh(&second.refresh_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let h = test_harness().await;
    let email = unique_email("refresh-access");
    h.register_confirmed(&email, PASSWORD).await;
    let session = h.state.identity.login(&email, PASSWORD).await.unwrap();

    assert_eq!(
        h.state
            .identity
            .refresh(&session.access_token)
            .await
            .unwrap_err(),
        AppError::TokenError
    );
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let h = test_harness().await;
    let email = unique_email("logout");
    let user = h.register_confirmed(&email, PASSWORD).await;
    let session = h.state.identity.login(&email, PASSWORD).await.unwrap();

    h.state.identity.logout(user.id).await.unwrap();

    assert!(h.store.get(&identity::store::refresh_token_key(user.id)).await.unwrap().is_empty());
    assert_eq!(
        h.state
            .identity
            .refresh(&session.refresh_token)
            .await
            .unwrap_err(),
        AppError::TokenError
    );
}

#[tokio::test]
async fn profile_reports_full_name() {
    let h = test_harness().await;
    let email = unique_email("profile");
    let user = h.register_confirmed(&email, PASSWORD).await;

    let profile = h.state.users.get_profile(user.id).await.unwrap();
    assert_eq!(profile.id, user.id);
    assert_eq!(profile.email, email);
    assert_eq!(profile.full_name, "Ada Lovelace");
    assert_eq!(profile.avatar, None);

    assert_eq!(
        h.state
            .users
            .get_profile(uuid::Uuid::new_v4())
            .await
            .unwrap_err(),
        AppError::UserNotFound
    );
}

/// register → verify → login → forgot → wrong OTP → correct OTP → login with
/// the new password succeeds and with the old one fails.
#[tokio::test]
async fn end_to_end_account_lifecycle() {
    let h = test_harness().await;
    let email = unique_email("e2e");

    h.state
        .identity
        .register(registration(&email, PASSWORD))
        .await
        .unwrap();
    let token = h.confirmation_token(&email);
    h.state.identity.verify_email(&token).await.unwrap();
    h.state.identity.login(&email, PASSWORD).await.unwrap();

    h.state.identity.forgot_password(&email).await.unwrap();
    let code = h.stored_otp(&email).await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    assert_eq!(
        h.state
            .identity
            .reset_password(reset(&email, "brand new password", wrong))
            .await
            .unwrap_err(),
        AppError::OtpInvalid
    );
    h.state
        .identity
        .reset_password(reset(&email, "brand new password", &code))
        .await
        .unwrap();

    h.state
        .identity
        .login(&email, "brand new password")
        .await
        .unwrap();
    assert_eq!(
        h.state.identity.login(&email, PASSWORD).await.unwrap_err(),
        AppError::PasswordInvalid
    );
}
