//! Cognitive self-assessment pipeline for the talent matching platform.
//!
//! The crate owns the assessment catalog, the per-session response state machine,
//! local scoring, the best-effort analysis and submission gateways, and the
//! coordinator that keeps the downstream match list keyed on completed assessments.

pub mod assessments;
pub mod config;
pub mod error;
pub mod telemetry;
