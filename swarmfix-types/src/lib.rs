//! Shared DTOs (schemas-as-code) for the swarmfix workspace.
//!
//! # Design constraints
//! - These types are serialized to disk next to the text summary of a run.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod change;
pub mod decision;
pub mod domain;
pub mod report;
pub mod rule;

pub use domain::Domain;
pub use rule::RuleMeta;

/// Schema identifiers.
pub mod schema {
    pub const SWARMFIX_REPORT_V1: &str = "swarmfix.report.v1";
}
