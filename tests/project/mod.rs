//! Project building tests
//!
//! Tests for:
//! - Import graphs, cycles and wildcards
//! - Reuse of unchanged imports across generations
//! - SDK imports
//! - Property values driving import evaluation
//! - Sessions: global properties, cancellation, host metadata

pub mod tests_caching;
pub mod tests_imports;
pub mod tests_properties;
pub mod tests_sdk;
pub mod tests_session;
