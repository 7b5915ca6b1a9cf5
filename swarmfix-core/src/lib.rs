//! Embeddable core library for swarmfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into a CI helper
//! binary or another host process.
//!
//! # Port traits
//!
//! I/O is abstracted behind port traits:
//! - [`ArtifactSource`] yields downloaded build-log files
//! - [`VcsPort`](ports::VcsPort) stages changes and reports whether the tree is dirty
//! - [`WritePort`](ports::WritePort) writes the report artifacts
//! - [`ToolRunner`] runs external generators for patch actions
//!
//! The [`adapters`] module provides default filesystem- and git-backed implementations.
//!
//! # Entry points
//!
//! - [`run_swarm`](pipeline::run_swarm) loads logs, dispatches rules and builds the report
//! - [`write_report_artifacts`](pipeline::write_report_artifacts) persists it

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-exported so embedders don't need the lower crates directly.
pub use swarmfix_domain::RepoLayout;
pub use swarmfix_edit::{ProcessToolRunner, ToolRunner};
pub use swarmfix_logs::{ArtifactSource, FsArtifactSource, InMemoryArtifactSource, LogSources};
