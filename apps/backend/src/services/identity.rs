//! Account lifecycle: registration, email confirmation, login, password
//! reset, refresh-token rotation and logout.
//!
//! Every flow fails with exactly one leaf [`AppError`]; the lower-level cause
//! is logged here and dropped. Mail, template and OTP-store side effects are
//! best effort and never fail the flow that triggered them.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::otp::{generate_otp, OTP_TTL_SECS};
use crate::auth::{PasswordHasher, TokenIssuer, TokenPayload, TokenPurpose};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::mail::{render, Mailer, Template};
use crate::repos::users::{NewUser, User, UserRepo};
use crate::store::{forgot_password_key, EphemeralStore};

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub app_name: String,
    /// Base URL the confirmation link points at, without trailing slash.
    pub frontend_url: String,
}

impl IdentitySettings {
    pub fn confirmation_url(&self, token: &str) -> String {
        format!(
            "{}/account/verify-account?token={token}",
            self.frontend_url.trim_end_matches('/')
        )
    }

    pub fn welcome_subject(&self) -> String {
        format!("Welcome to {} - Verify Your Account", self.app_name)
    }

    pub fn reset_subject(&self) -> String {
        format!("{} - Reset Password", self.app_name)
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub email: String,
    pub password: String,
    pub code: String,
}

/// Token pair handed out by login and refresh; lifetimes in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_in: u64,
    pub refresh_expires_in: u64,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepo>,
    store: Arc<dyn EphemeralStore>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    settings: IdentitySettings,
}

/// Any lookup/write failure other than absence is a database error.
fn db_failure(op: &'static str, err: DomainError) -> AppError {
    error!(op, error = %err, "Database operation failed");
    AppError::DatabaseError
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        store: Arc<dyn EphemeralStore>,
        tokens: TokenIssuer,
        hasher: PasswordHasher,
        mailer: Arc<dyn Mailer>,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            users,
            store,
            tokens,
            hasher,
            mailer,
            settings,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    async fn require_user_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .find_by_email(email)
            .await
            .map_err(|e| db_failure("find_by_email", e))?
            .ok_or(AppError::EmailNotFound)
    }

    /// Create an unconfirmed account and send the confirmation mail.
    ///
    /// The prior lookup is only a fast path; the unique index on email is
    /// what settles concurrent registrations.
    pub async fn register(&self, input: Registration) -> Result<(), AppError> {
        let existing = self
            .users
            .find_by_email(&input.email)
            .await
            .map_err(|e| db_failure("find_by_email", e))?;
        if existing.is_some() {
            debug!(email = %Redacted(&input.email), "Registration for existing email");
            return Err(AppError::EmailExists);
        }

        let password_hash = self.hasher.hash(&input.password).await.map_err(|e| {
            error!(error = %e, "Password hashing failed");
            AppError::HashingFailure
        })?;

        let new_user = NewUser::new(&input.email, password_hash)
            .with_name(input.first_name, input.last_name);
        let user = self.users.create(new_user).await.map_err(|e| {
            if e.is_unique_email() {
                debug!(email = %Redacted(&input.email), "Registration lost unique-email race");
                AppError::EmailExists
            } else {
                db_failure("create_user", e)
            }
        })?;

        info!(user_id = %user.id, email = %Redacted(&user.email), "User registered");
        self.send_confirmation(&user).await;
        Ok(())
    }

    async fn send_confirmation(&self, user: &User) {
        let payload = TokenPayload::new(user.id, &user.email);
        let token = match self.tokens.issue(TokenPurpose::VerifyEmail, &payload).await {
            Ok(token) => token,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Could not issue verification token");
                return;
            }
        };

        let url = self.settings.confirmation_url(&token);
        let html = match render(&Template::AccountConfirmation {
            app_name: &self.settings.app_name,
            confirmation_url: &url,
        }) {
            Ok(html) => html,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Could not render confirmation mail");
                return;
            }
        };

        if let Err(e) = self
            .mailer
            .send_html(&user.email, &self.settings.welcome_subject(), &html)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Could not send confirmation mail");
        }
    }

    /// Check credentials and hand out an access/refresh pair.
    ///
    /// The password is checked before the confirmation flag, so an
    /// unconfirmed account with a wrong password reports `PasswordInvalid`.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AppError> {
        let user = match self.require_user_by_email(email).await {
            Err(AppError::EmailNotFound) => {
                security::login_failed("email_not_found", email);
                return Err(AppError::EmailNotFound);
            }
            other => other?,
        };

        let matches = match self.hasher.verify(password, &user.password_hash).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash unusable");
                false
            }
        };
        if !matches {
            security::login_failed("password_invalid", email);
            return Err(AppError::PasswordInvalid);
        }

        if !user.email_confirmed {
            security::login_failed("email_not_confirmed", email);
            return Err(AppError::EmailNotConfirmed);
        }

        let session = self.issue_session(&user).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(session)
    }

    async fn issue_session(&self, user: &User) -> Result<SessionTokens, AppError> {
        let payload = TokenPayload::new(user.id, &user.email);

        let access_token = self
            .tokens
            .issue(TokenPurpose::Access, &payload)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Access token issuance failed");
                AppError::TokenError
            })?;
        let refresh_token = self
            .tokens
            .issue(TokenPurpose::Refresh, &payload)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Refresh token issuance failed");
                AppError::TokenError
            })?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            access_expires_in: self.tokens.lifetime_secs(TokenPurpose::Access),
            refresh_expires_in: self.tokens.lifetime_secs(TokenPurpose::Refresh),
        })
    }

    /// Confirm the email named in a verification token.
    pub async fn verify_email(&self, token: &str) -> Result<(), AppError> {
        let payload = self
            .tokens
            .verify(token, TokenPurpose::VerifyEmail)
            .map_err(|e| {
                security::token_rejected(TokenPurpose::VerifyEmail.as_str(), e.reason());
                AppError::TokenError
            })?;

        let mut user = self.require_user_by_email(&payload.email).await?;
        if user.email_confirmed {
            return Err(AppError::EmailAlreadyConfirmed);
        }

        user.email_confirmed = true;
        self.users
            .update(&user)
            .await
            .map_err(|e| db_failure("confirm_email", e))?;

        info!(user_id = %user.id, "Email confirmed");
        Ok(())
    }

    /// Store a fresh reset code (replacing any earlier one) and mail it.
    /// Succeeds once the user is found; store and mail failures are logged.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = self.require_user_by_email(email).await?;

        let code = generate_otp();
        if let Err(e) = self
            .store
            .set(&forgot_password_key(user.id), &code, OTP_TTL_SECS)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Could not store reset code");
        }

        match render(&Template::ForgotPassword {
            app_name: &self.settings.app_name,
            code: &code,
        }) {
            Ok(html) => {
                if let Err(e) = self
                    .mailer
                    .send_html(&user.email, &self.settings.reset_subject(), &html)
                    .await
                {
                    warn!(user_id = %user.id, error = %e, "Could not send reset mail");
                }
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "Could not render reset mail"),
        }

        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Replace the password when `code` matches the stored reset code. The
    /// code is consumed on success.
    pub async fn reset_password(&self, input: PasswordReset) -> Result<(), AppError> {
        let mut user = self.require_user_by_email(&input.email).await?;

        let key = forgot_password_key(user.id);
        let stored = self.store.get(&key).await.map_err(|e| {
            error!(user_id = %user.id, error = %e, "Could not read reset code");
            AppError::DatabaseError
        })?;

        if stored.is_empty() || stored != input.code {
            security::otp_mismatch(&input.email);
            return Err(AppError::OtpInvalid);
        }

        user.password_hash = self.hasher.hash(&input.password).await.map_err(|e| {
            error!(error = %e, "Password hashing failed");
            AppError::HashingFailure
        })?;
        self.users
            .update(&user)
            .await
            .map_err(|e| db_failure("update_password", e))?;

        if let Err(e) = self.store.delete(&key).await {
            warn!(user_id = %user.id, error = %e, "Could not delete used reset code");
        }

        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// Exchange the current refresh token for a new pair. The new refresh
    /// token overwrites the stored one, so the presented token is dead after
    /// this call.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AppError> {
        let payload = self
            .tokens
            .verify(refresh_token, TokenPurpose::Refresh)
            .map_err(|e| {
                security::token_rejected(TokenPurpose::Refresh.as_str(), e.reason());
                AppError::TokenError
            })?;

        let stored = self
            .tokens
            .stored_refresh_token(payload.id)
            .await
            .map_err(|e| {
                error!(user_id = %payload.id, error = %e, "Could not read refresh token");
                AppError::DatabaseError
            })?;
        if stored.is_empty() || stored != refresh_token {
            security::token_rejected(TokenPurpose::Refresh.as_str(), "not_current");
            return Err(AppError::TokenError);
        }

        let user = self
            .users
            .find_by_id(payload.id)
            .await
            .map_err(|e| db_failure("find_by_id", e))?
            .ok_or(AppError::UserNotFound)?;

        let session = self.issue_session(&user).await?;
        debug!(user_id = %user.id, "Session refreshed");
        Ok(session)
    }

    /// Revoke the user's refresh token.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.tokens
            .revoke_refresh_token(user_id)
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Could not revoke refresh token");
                AppError::DatabaseError
            })?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
