//! # RealtySync Domain
//!
//! Business domain types and models for the RealtySync calendar sync engine.
//!
//! This crate contains:
//! - Sync account, canonical event, and timeline entry types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The deterministic event classifier (type inference, address extraction)
//!
//! ## Architecture
//! - No dependencies on other RealtySync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::event_classifier::{classify_event, extract_property_reference, infer_event_type};
