//! Rate limiting for the account endpoints.
//!
//! Registration, login and password reset are the brute-force and
//! mail-bombing surface: 10 requests per 60 seconds per client IP.
//! Everything else, including the health probe, is unlimited.

use std::time::Duration;

use actix_extensible_rate_limit::backend::SimpleInputFunctionBuilder;

pub const ACCOUNT_LIMIT: u64 = 10;
pub const ACCOUNT_WINDOW: Duration = Duration::from_secs(60);

/// Limits: [`ACCOUNT_LIMIT`] requests per [`ACCOUNT_WINDOW`] per IP address.
pub fn account_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(ACCOUNT_WINDOW, ACCOUNT_LIMIT).real_ip_key()
}
