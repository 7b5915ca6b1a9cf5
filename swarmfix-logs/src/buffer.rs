use std::collections::BTreeMap;
use swarmfix_types::Domain;

/// Immutable text of one domain, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    domain: Domain,
    text: String,
    sources: Vec<String>,
}

impl TextBuffer {
    pub fn new(domain: Domain, text: String, sources: Vec<String>) -> Self {
        Self {
            domain,
            text,
            sources,
        }
    }

    pub fn empty(domain: Domain) -> Self {
        Self::new(domain, String::new(), vec![])
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Names of the fragments that were concatenated, in discovery order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

impl AsRef<str> for TextBuffer {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// The two per-domain buffers of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffers {
    pub app: TextBuffer,
    pub plugin: TextBuffer,
}

impl LogBuffers {
    pub fn new(app: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            app: TextBuffer::new(Domain::App, app.into(), vec!["<inline>".to_string()]),
            plugin: TextBuffer::new(Domain::Plugin, plugin.into(), vec!["<inline>".to_string()]),
        }
    }

    pub fn empty() -> Self {
        Self {
            app: TextBuffer::empty(Domain::App),
            plugin: TextBuffer::empty(Domain::Plugin),
        }
    }

    pub fn get(&self, domain: Domain) -> &TextBuffer {
        match domain {
            Domain::App => &self.app,
            Domain::Plugin => &self.plugin,
        }
    }

    pub fn sizes(&self) -> BTreeMap<Domain, u64> {
        Domain::ALL
            .iter()
            .map(|d| (*d, self.get(*d).len() as u64))
            .collect()
    }
}

impl Default for LogBuffers {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_cover_both_domains() {
        let buffers = LogBuffers::new("abc", "");
        let sizes = buffers.sizes();
        assert_eq!(sizes[&Domain::App], 3);
        assert_eq!(sizes[&Domain::Plugin], 0);
    }

    #[test]
    fn get_routes_by_domain() {
        let buffers = LogBuffers::new("app text", "plugin text");
        assert_eq!(buffers.get(Domain::App).text(), "app text");
        assert_eq!(buffers.get(Domain::Plugin).text(), "plugin text");
        assert_eq!(buffers.get(Domain::Plugin).domain(), Domain::Plugin);
    }
}
