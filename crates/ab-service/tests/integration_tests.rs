//! Integration tests for AuthBridge
//!
//! This is the top-level integration test harness that Cargo discovers.
//! Test modules are organized in the integration/ subdirectory.

#[path = "integration/health_tests.rs"]
mod health_tests;

#[path = "integration/login_tests.rs"]
mod login_tests;

#[path = "integration/validate_tests.rs"]
mod validate_tests;

#[path = "integration/me_tests.rs"]
mod me_tests;

#[path = "integration/diagnostics_tests.rs"]
mod diagnostics_tests;
