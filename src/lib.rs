// ABOUTME: Library root for pipedeploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod client;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod registry;
pub mod signal;
pub mod types;
