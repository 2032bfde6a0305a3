//! Repository traits and domain models for persistence.

pub mod users;
