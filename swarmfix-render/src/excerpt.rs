use swarmfix_types::Domain;
use swarmfix_types::report::LogExcerpt;

pub const DEFAULT_CONTEXT_LINES: usize = 20;
pub const MAX_CONTEXT_LINES: usize = 50;
/// Longer lines are cut and end with `…`.
pub const MAX_LINE_CHARS: usize = 400;

/// Lines of `text` around the line holding byte `offset`.
///
/// At most `context_lines` lines on each side of the matching line (clamped to
/// [`MAX_CONTEXT_LINES`]), so the excerpt never exceeds `2 * context + 1` lines.
pub fn log_excerpt(
    domain: Domain,
    rule: &str,
    text: &str,
    offset: usize,
    context_lines: usize,
) -> LogExcerpt {
    let context = context_lines.min(MAX_CONTEXT_LINES);
    let lines: Vec<&str> = text.lines().collect();

    let mut at = offset.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    let match_idx = text[..at]
        .matches('\n')
        .count()
        .min(lines.len().saturating_sub(1));

    let first = match_idx.saturating_sub(context);
    let last = (match_idx + context).min(lines.len().saturating_sub(1));

    let mut out = String::new();
    if !lines.is_empty() {
        for line in &lines[first..=last] {
            out.push_str(&clip(line));
            out.push('\n');
        }
    }

    LogExcerpt {
        domain,
        rule: rule.to_string(),
        first_line: first as u64 + 1,
        match_line: match_idx as u64 + 1,
        text: out,
    }
}

fn clip(line: &str) -> String {
    match line.char_indices().nth(MAX_LINE_CHARS) {
        Some((cut, _)) => format!("{}…", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn window_is_centered_on_match() {
        let text = numbered(10);
        let offset = text.find("line 5").unwrap();
        let ex = log_excerpt(Domain::App, "scheme", &text, offset, 2);
        assert_eq!(ex.first_line, 3);
        assert_eq!(ex.match_line, 5);
        assert_eq!(ex.text, "line 3\nline 4\nline 5\nline 6\nline 7\n");
    }

    #[test]
    fn window_is_clipped_at_edges() {
        let text = numbered(3);
        let ex = log_excerpt(Domain::App, "scheme", &text, 0, 5);
        assert_eq!(ex.first_line, 1);
        assert_eq!(ex.text, text);

        let end = log_excerpt(Domain::App, "scheme", &text, text.len(), 1);
        assert_eq!(end.match_line, 3);
        assert_eq!(end.text, "line 2\nline 3\n");
    }

    #[test]
    fn long_lines_are_cut() {
        let long = "x".repeat(MAX_LINE_CHARS + 10);
        let ex = log_excerpt(Domain::Plugin, "build-config", &long, 0, 0);
        assert_eq!(ex.text.chars().count(), MAX_LINE_CHARS + 2);
        assert!(ex.text.ends_with("…\n"));
    }

    #[test]
    fn empty_text_gives_empty_excerpt() {
        let ex = log_excerpt(Domain::App, "scheme", "", 0, 20);
        assert_eq!(ex.text, "");
        assert_eq!(ex.match_line, 1);
    }

    #[test]
    fn context_is_clamped() {
        let text = numbered(500);
        let offset = text.find("line 250\n").unwrap();
        let ex = log_excerpt(Domain::App, "scheme", &text, offset, 10_000);
        assert_eq!(ex.text.lines().count(), 2 * MAX_CONTEXT_LINES + 1);
    }
}
