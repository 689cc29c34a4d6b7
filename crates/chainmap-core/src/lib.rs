//! chainmap-core: Shared types, configuration, and error handling for chainmap.
//!
//! This crate provides the foundational pieces used across the chainmap
//! components:
//! - Domain types (vulnerabilities, attack nodes/edges/paths, analysis results)
//! - The capability registry mapping vulnerability types to attack techniques
//! - Engine configuration (limits, scoring coefficients, policies)
//! - Common error types

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::{EngineConfig, ScoringConfig};
pub use error::ChainmapError;
pub use registry::{Capability, CapabilityRegistry};
