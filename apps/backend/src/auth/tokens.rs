use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenPayload, TokenPurpose};
use crate::state::security_config::SecurityConfig;
use crate::store::{refresh_token_key, EphemeralStore, StoreError};

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not signed with an HMAC algorithm")]
    InvalidSignatureMethod,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token issuer mismatch")]
    InvalidIssuer,
    #[error("token audience mismatch")]
    InvalidAudience,
    #[error("token expired")]
    Expired,
    #[error("token purpose mismatch: expected {expected:?}, found {found:?}")]
    PurposeMismatch {
        expected: TokenPurpose,
        found: TokenPurpose,
    },
    #[error("token malformed: {0}")]
    Malformed(String),
    #[error("failed to sign token: {0}")]
    Encode(String),
    #[error("refresh token store: {0}")]
    Store(#[from] StoreError),
}

impl TokenError {
    /// Short reason for security logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidSignatureMethod => "invalid_signature_method",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidIssuer => "invalid_issuer",
            TokenError::InvalidAudience => "invalid_audience",
            TokenError::Expired => "expired",
            TokenError::PurposeMismatch { .. } => "purpose_mismatch",
            TokenError::Malformed(_) => "malformed",
            TokenError::Encode(_) => "encode",
            TokenError::Store(_) => "store",
        }
    }
}

/// Signs and verifies access, refresh and email-verification tokens.
///
/// Refresh tokens are mirrored into the ephemeral store under
/// `identity:refresh_token:{user_id}`; issuing a new one overwrites the old,
/// which is what makes rotation revoke the previous token.
#[derive(Clone)]
pub struct TokenIssuer {
    security: SecurityConfig,
    store: Arc<dyn EphemeralStore>,
}

impl TokenIssuer {
    pub fn new(security: SecurityConfig, store: Arc<dyn EphemeralStore>) -> Self {
        Self { security, store }
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    /// Configured lifetime for `purpose`, in seconds.
    pub fn lifetime_secs(&self, purpose: TokenPurpose) -> u64 {
        self.security.settings(purpose).ttl.as_secs()
    }

    pub async fn issue(
        &self,
        purpose: TokenPurpose,
        payload: &TokenPayload,
    ) -> Result<String, TokenError> {
        self.issue_at(purpose, payload, SystemTime::now()).await
    }

    /// Sign a token as of `now`; refresh tokens are also written to the store
    /// and a store failure aborts issuance.
    pub async fn issue_at(
        &self,
        purpose: TokenPurpose,
        payload: &TokenPayload,
        now: SystemTime,
    ) -> Result<String, TokenError> {
        let token = self.sign(purpose, payload, now)?;

        if purpose == TokenPurpose::Refresh {
            self.store
                .set(
                    &refresh_token_key(payload.id),
                    &token,
                    self.lifetime_secs(TokenPurpose::Refresh),
                )
                .await?;
        }

        Ok(token)
    }

    /// Sign without side effects.
    pub fn sign(
        &self,
        purpose: TokenPurpose,
        payload: &TokenPayload,
        now: SystemTime,
    ) -> Result<String, TokenError> {
        let settings = self.security.settings(purpose);
        let iat = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::Encode("clock before unix epoch".to_string()))?
            .as_secs() as i64;

        let exp = i64::try_from(settings.ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| TokenError::Encode("token lifetime out of range".to_string()))?;

        let claims = Claims {
            id: payload.id,
            email: payload.email.clone(),
            iat,
            exp,
            iss: self.security.issuer.clone(),
            aud: self.security.audience.clone(),
            purpose,
            jti: Uuid::new_v4(),
        };

        encode(
            &Header::new(self.security.algorithm),
            &claims,
            &EncodingKey::from_secret(&settings.secret),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify `token` against the secret configured for `purpose`.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<TokenPayload, TokenError> {
        self.verify_with_secret(token, &self.security.settings(purpose).secret, purpose)
    }

    /// Verify `token` against an explicit secret.
    ///
    /// Checks, in order: HMAC header algorithm, signature, expiry (no
    /// leeway), issuer, audience, then the embedded purpose.
    pub fn verify_with_secret(
        &self,
        token: &str,
        secret: &[u8],
        purpose: TokenPurpose,
    ) -> Result<TokenPayload, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::InvalidSignatureMethod);
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_issuer(&[self.security.issuer.as_str()]);
        validation.set_audience(&[self.security.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                ErrorKind::InvalidAudience => TokenError::InvalidAudience,
                ErrorKind::InvalidAlgorithm => TokenError::InvalidSignatureMethod,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if claims.purpose != purpose {
            return Err(TokenError::PurposeMismatch {
                expected: purpose,
                found: claims.purpose,
            });
        }

        Ok(claims.into())
    }

    /// Refresh token currently stored for the user; empty when none.
    pub async fn stored_refresh_token(&self, user_id: Uuid) -> Result<String, StoreError> {
        self.store.get(&refresh_token_key(user_id)).await
    }

    pub async fn revoke_refresh_token(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.store.delete(&refresh_token_key(user_id)).await
    }
}
