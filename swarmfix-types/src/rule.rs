use crate::Domain;
use serde::{Deserialize, Serialize};

/// Catalogue entry describing a built-in rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMeta {
    pub name: String,
    pub domain: Domain,
    pub title: String,
    pub description: String,

    /// Human-readable trigger phrases or patterns.
    pub triggers: Vec<String>,

    /// Repo-relative paths the rule's action may write or delete.
    pub owns: Vec<String>,

    /// Whether a firing of this rule attaches a log excerpt to the report.
    #[serde(default)]
    pub excerpt: bool,
}
