//! Edit engine for swarmfix patch actions.
//!
//! Responsibilities:
//! - Write-if-changed file mutations, journaled with sha256 before/after.
//! - A dry-run overlay that later reads observe.
//! - A unified diff preview of everything touched.
//! - Best-effort external tool invocation and git staging.

pub mod error;
pub mod git;
pub mod hash;
pub mod tool;
pub mod workspace;

pub use error::{EditError, EditResult};
pub use git::{has_changes, stage_all};
pub use hash::sha256_hex;
pub use tool::{
    DryRunToolRunner, ProcessToolRunner, RecordingToolRunner, ToolInvocation, ToolOutcome,
    ToolRunner,
};
pub use workspace::{Workspace, WorkspaceOptions};
