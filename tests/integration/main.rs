//! Integration tests for pam-grants.
//!
//! These tests drive [`GrantLifecycleManager`](pam_grants::GrantLifecycleManager)
//! over the REST transport against a wiremock stand-in for the Privileged
//! Access Manager API. No cloud project is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With transport logs
//! RUST_LOG=pam_grants=debug cargo test --test integration -- --nocapture
//! ```

mod common;
mod identity_tests;
mod lifecycle_tests;
