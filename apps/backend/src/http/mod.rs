//! HTTP response shapes shared by every route.

pub mod envelope;

pub use envelope::ApiResponse;
