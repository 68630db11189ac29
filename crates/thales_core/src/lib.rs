//! Thales Core - backend logic for the entity detection pipeline.
//!
//! This crate pairs voice transcripts with their videos, drives an external
//! entity detector over each pair and folds the results into JSON reports.
//! It has no CLI dependencies and can be embedded in other front-ends.

pub mod config;
pub mod detection;
pub mod logging;
pub mod orchestrator;
pub mod pairing;
pub mod report;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
