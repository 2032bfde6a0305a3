#![allow(dead_code)]

pub mod app_builder;
pub mod harness;

// Not every test binary uses both
#[allow(unused_imports)]
pub use app_builder::create_test_app;
#[allow(unused_imports)]
pub use harness::test_harness;
