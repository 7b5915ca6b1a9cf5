use crate::Domain;
use crate::change::FileChange;
use crate::decision::DispatchDecision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Summary of one swarm run.
///
/// Deliberately carries no timestamps: identical inputs produce an identical report,
/// so rewriting it is a no-op on reruns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub decisions: DispatchDecision,

    /// Byte length of each domain's text buffer: the decoded sources plus the newlines
    /// inserted between fragments that lacked one.
    #[serde(default)]
    pub buffer_sizes: BTreeMap<Domain, u64>,

    /// Log lines around the first project/scheme trigger, when one fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<LogExcerpt>,

    pub files_staged: bool,
    pub actions_ran: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<FileChange>,
}

impl ChangeReport {
    pub fn new(tool: ToolInfo, decisions: DispatchDecision) -> Self {
        Self {
            schema: crate::schema::SWARMFIX_REPORT_V1.to_string(),
            tool,
            decisions,
            buffer_sizes: BTreeMap::new(),
            excerpt: None,
            files_staged: false,
            actions_ran: false,
            dry_run: false,
            changes: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogExcerpt {
    pub domain: Domain,
    /// Rule whose trigger anchored the excerpt.
    pub rule: String,
    /// 1-based line number of the first excerpt line.
    pub first_line: u64,
    /// 1-based line number of the matching line.
    pub match_line: u64,
    pub text: String,
}
