//! Rule catalogue for the `list-rules` and `explain` commands.

use swarmfix_domain::{RepoLayout, builtin_rule_metas};
use swarmfix_types::RuleMeta;

const RULE: &str =
    "================================================================================";
const SECTION: &str =
    "--------------------------------------------------------------------------------";

/// Catalogue of the built-in rules, with paths resolved against `layout`.
pub fn catalogue(layout: &RepoLayout) -> Vec<RuleMeta> {
    builtin_rule_metas(layout)
}

pub fn lookup_rule(layout: &RepoLayout, name: &str) -> Option<RuleMeta> {
    catalogue(layout).into_iter().find(|m| m.name == name)
}

pub fn list_rule_names(layout: &RepoLayout) -> Vec<String> {
    catalogue(layout).into_iter().map(|m| m.name).collect()
}

/// Tabular listing printed by `list-rules`.
pub fn render_rule_list(metas: &[RuleMeta]) -> String {
    let mut out = String::from("Available rules:\n\n");
    out.push_str(&format!("  {:<20} {:<8} TITLE\n", "NAME", "DOMAIN"));
    out.push_str(&format!("  {:<20} {:<8} -----\n", "----", "------"));
    for m in metas {
        out.push_str(&format!("  {:<20} {:<8} {}\n", m.name, m.domain.as_str(), m.title));
    }
    out.push_str("\nUse 'swarmfix explain <rule>' for details.\n");
    out
}

/// Long-form description printed by `explain`.
pub fn render_explanation(meta: &RuleMeta) -> String {
    let mut out = String::new();
    out.push_str(&format!("{RULE}\nRULE: {}\n{RULE}\n\n", meta.title));
    out.push_str(&format!("Name:    {}\n", meta.name));
    out.push_str(&format!("Domain:  {} log\n", meta.domain));
    out.push_str(&format!(
        "Excerpt: {}\n\n",
        if meta.excerpt { "attached when fired" } else { "no" }
    ));

    out.push_str(&format!("DESCRIPTION\n{SECTION}\n{}\n\n", meta.description));

    out.push_str(&format!("TRIGGERS\n{SECTION}\n"));
    out.push_str(&format!("Fires when any of these match the {} log:\n\n", meta.domain));
    for t in &meta.triggers {
        out.push_str(&format!("  - {t}\n"));
    }
    out.push('\n');

    out.push_str(&format!("FILES OWNED\n{SECTION}\n"));
    for p in &meta.owns {
        out.push_str(&format!("  - {p}\n"));
    }
    out
}
