//! Rendering helpers (plain text and markdown) for swarm run reports.
//!
//! Everything here is string building: rendering never fails.

mod excerpt;

pub use excerpt::{DEFAULT_CONTEXT_LINES, MAX_CONTEXT_LINES, MAX_LINE_CHARS, log_excerpt};

use swarmfix_types::Domain;
use swarmfix_types::change::FileChange;
use swarmfix_types::report::ChangeReport;

/// Deterministic plain-text report, written to the summary file and printed to stdout.
pub fn render_report_text(report: &ChangeReport) -> String {
    let mut out = String::new();
    out.push_str("swarmfix report\n");
    out.push_str("===============\n");
    if report.dry_run {
        out.push_str("mode: dry-run (no files were written)\n");
    }
    out.push('\n');

    out.push_str("rules:\n");
    if report.decisions.rules.is_empty() {
        out.push_str("  (none registered)\n");
    }
    let width = report
        .decisions
        .rules
        .iter()
        .map(|d| d.rule.len())
        .max()
        .unwrap_or(0);
    for d in &report.decisions.rules {
        out.push_str(&format!(
            "  {:<width$}  {:<6}  {}\n",
            d.rule,
            d.domain.as_str(),
            d.state.as_str(),
            width = width
        ));
    }
    out.push('\n');

    out.push_str("buffers:\n");
    for domain in Domain::ALL {
        let bytes = report.buffer_sizes.get(&domain).copied().unwrap_or(0);
        out.push_str(&format!("  {:<6}  {} bytes\n", domain.as_str(), bytes));
    }
    out.push('\n');

    out.push_str(&format!("actions_ran: {}\n", report.actions_ran));
    out.push_str(&format!("files_staged: {}\n", report.files_staged));

    if !report.changes.is_empty() {
        out.push_str("\nchanges:\n");
        for c in &report.changes {
            out.push_str(&format!("  {}\n", change_line(c)));
        }
    }

    if let Some(ex) = &report.excerpt {
        out.push_str(&format!(
            "\nexcerpt ({} log, rule {}, line {}):\n",
            ex.domain, ex.rule, ex.match_line
        ));
        out.push_str("----\n");
        out.push_str(&ex.text);
        if !ex.text.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("----\n");
    }

    out
}

/// Markdown rendering of the same report, for PR comments and job summaries.
pub fn render_report_md(report: &ChangeReport) -> String {
    let mut out = String::new();
    out.push_str("# swarmfix report\n\n");
    if report.dry_run {
        out.push_str("_Dry run: no files were written._\n\n");
    }
    out.push_str(&format!(
        "- Actions ran: `{}`\n- Files staged: `{}`\n",
        report.actions_ran, report.files_staged
    ));
    for domain in Domain::ALL {
        let bytes = report.buffer_sizes.get(&domain).copied().unwrap_or(0);
        out.push_str(&format!("- `{}` log: {} bytes\n", domain, bytes));
    }
    out.push('\n');

    out.push_str("## Rules\n\n");
    if report.decisions.rules.is_empty() {
        out.push_str("_No rules registered._\n");
    } else {
        out.push_str("| Rule | Domain | State |\n|---|---|---|\n");
        for d in &report.decisions.rules {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                d.rule,
                d.domain,
                d.state.as_str()
            ));
        }
    }

    if !report.changes.is_empty() {
        out.push_str("\n## Changes\n\n");
        for c in &report.changes {
            let before = c.sha256_before.as_deref().map(short_sha).unwrap_or("-");
            let after = c.sha256_after.as_deref().map(short_sha).unwrap_or("-");
            out.push_str(&format!(
                "- `{}` {} ({}) {} → {}\n",
                c.path,
                c.kind.as_str(),
                c.rule.as_deref().unwrap_or("-"),
                before,
                after
            ));
        }
    }

    if let Some(ex) = &report.excerpt {
        out.push_str(&format!(
            "\n## Log excerpt\n\n`{}` log around line {} (rule `{}`):\n\n```text\n",
            ex.domain, ex.match_line, ex.rule
        ));
        out.push_str(&ex.text);
        if !ex.text.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n");
    }

    out
}

fn change_line(c: &FileChange) -> String {
    match &c.rule {
        Some(rule) => format!("{:<11} {} [{}]", c.kind.as_str(), c.path, rule),
        None => format!("{:<11} {}", c.kind.as_str(), c.path),
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
