use std::time::Duration;

use jsonwebtoken::Algorithm;
use rand::distr::{Alphanumeric, SampleString};

use crate::auth::claims::TokenPurpose;

/// Secret and lifetime for one token purpose.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// JWT settings: one secret and lifetime per purpose, plus the issuer and
/// audience stamped into (and required from) every token.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub access: TokenSettings,
    pub refresh: TokenSettings,
    pub verify_email: TokenSettings,
    pub issuer: String,
    pub audience: String,
    /// Signing algorithm (HS256)
    pub algorithm: Algorithm,
}

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_VERIFY_EMAIL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

impl SecurityConfig {
    pub fn new(
        access_secret: impl Into<Vec<u8>>,
        refresh_secret: impl Into<Vec<u8>>,
        verify_email_secret: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            access: TokenSettings::new(access_secret, DEFAULT_ACCESS_TTL),
            refresh: TokenSettings::new(refresh_secret, DEFAULT_REFRESH_TTL),
            verify_email: TokenSettings::new(verify_email_secret, DEFAULT_VERIFY_EMAIL_TTL),
            issuer: "identity".to_string(),
            audience: "identity-clients".to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    pub fn with_ttls(mut self, access: Duration, refresh: Duration, verify_email: Duration) -> Self {
        self.access.ttl = access;
        self.refresh.ttl = refresh;
        self.verify_email.ttl = verify_email;
        self
    }

    pub fn settings(&self, purpose: TokenPurpose) -> &TokenSettings {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
            TokenPurpose::VerifyEmail => &self.verify_email,
        }
    }

    /// Random, distinct secrets per purpose. Used by tests and local tooling.
    pub fn for_tests() -> Self {
        let mut rng = rand::rng();
        Self::new(
            Alphanumeric.sample_string(&mut rng, 48),
            Alphanumeric.sample_string(&mut rng, 48),
            Alphanumeric.sample_string(&mut rng, 48),
        )
    }
}
