use sea_orm::DatabaseConnection;

use crate::auth::TokenIssuer;
use crate::services::{IdentityService, UserService};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Database connection, used directly only by the health probe
    pub db: DatabaseConnection,
    pub identity: IdentityService,
    pub users: UserService,
    /// Shared with `identity`; the JWT middleware verifies access tokens with it
    pub tokens: TokenIssuer,
    /// Whether the refresh-token cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        identity: IdentityService,
        users: UserService,
        cookie_secure: bool,
    ) -> Self {
        let tokens = identity.tokens().clone();
        Self {
            db,
            identity,
            users,
            tokens,
            cookie_secure,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("security", self.tokens.security())
            .field("cookie_secure", &self.cookie_secure)
            .finish_non_exhaustive()
    }
}
