//! Security audit events, emitted under stable `event` names so they can be
//! filtered out of the JSON log stream.

use tracing::warn;

use crate::logging::pii::Redacted;
use crate::trace_ctx;

pub fn login_failed(reason: &str, email: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %Redacted(email),
        reason,
        "Authentication failure"
    );
}

pub fn token_rejected(purpose: &str, reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_TOKEN_REJECTED",
        %trace_id,
        purpose,
        reason,
        "Token verification failed"
    );
}

pub fn otp_mismatch(email: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_OTP_MISMATCH",
        %trace_id,
        email = %Redacted(email),
        "Password reset code did not match"
    );
}

pub fn rate_limit_hit(endpoint: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_RATE_LIMIT_HIT",
        %trace_id,
        endpoint,
        "Rate limit exceeded"
    );
}
