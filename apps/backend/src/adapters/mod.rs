//! Database adapters (SeaORM implementations of the repository traits).

pub mod users_sea;
