//! Domain logic: match build-log text against the rule registry and run the fired rules'
//! patch actions.
//!
//! This crate owns *what* gets patched and when. How files are written, journaled and
//! previewed is the `swarmfix-edit` crate's job.

mod dispatch;
mod layout;
mod rules;
mod triggers;

pub use dispatch::{
    DispatchError, DispatchOutcome, Dispatcher, DispatcherConfig, Overlap, RuleRun,
};
pub use layout::RepoLayout;
pub use rules::templates;
pub use rules::{Rule, RuleContext, builtin_rule_metas, builtin_rules};
pub use triggers::{Trigger, TriggerSet};
