//! Backend test support utilities
//!
//! Logging initialization, unique test data and envelope assertions shared
//! by the backend's integration tests. Nothing here depends on backend types.

pub mod envelope;
pub mod logging;
pub mod unique_helpers;
