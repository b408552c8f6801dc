//! # ebb-test
//!
//! Integration tests for the EbbDB retention harness.
//!
//! This crate contains:
//! - End-to-end scenario tests against the in-process mock engine
//! - The `ttlcheck` suite-runner binary
//! - Shared fixtures (logging init, mock deployment wiring)

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test fixtures and helpers.
pub mod utils;
