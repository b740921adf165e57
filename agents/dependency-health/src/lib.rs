//! Dependency Health Agent
//!
//! Turns dependency telemetry for a monitored service instance into a
//! per-component health report with one overall status.
//!
//! # Design Principles
//! - Deterministic: the same two query results always produce the same report
//! - Stateless: nothing is kept between requests besides the component registries
//! - Fail whole: any fault fails the report; there are no partial reports

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod query;
pub mod telemetry;

// Re-export contracts
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{HealthReportError, Result};

pub const AGENT_ID: &str = "dependency-health-agent";
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");
