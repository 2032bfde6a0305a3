//! Task-local correlation id for the request being served.
//!
//! `RequestTrace` scopes every request future with the id it adopted from
//! `X-Request-Id` (or generated), so services and adapters can stamp log
//! lines without threading the id through their signatures.

use std::cell::RefCell;

use tokio::task_local;

/// Header used to carry the correlation id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

task_local! {
    static REQUEST_ID: RefCell<Option<String>>;
}

/// Correlation id of the current task, or "unknown" outside a request.
pub fn trace_id() -> String {
    REQUEST_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn with_trace_id<F, R>(id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    REQUEST_ID.scope(RefCell::new(Some(id)), future).await
}

/// Accept a client-supplied id only when it is short and printable.
pub fn sanitize_incoming(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let acceptable = !trimmed.is_empty()
        && trimmed.len() <= 128
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    acceptable.then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_outside_request() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn scoped_id_is_visible_and_restored() {
        let seen = with_trace_id("req-42".to_string(), async { trace_id() }).await;
        assert_eq!(seen, "req-42");
        assert_eq!(trace_id(), "unknown");
    }

    #[test]
    fn rejects_unprintable_or_oversized_ids() {
        assert_eq!(sanitize_incoming(" abc-123 "), Some("abc-123".to_string()));
        assert_eq!(sanitize_incoming(""), None);
        assert_eq!(sanitize_incoming("has space"), None);
        assert_eq!(sanitize_incoming(&"a".repeat(129)), None);
    }
}
