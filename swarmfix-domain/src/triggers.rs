use regex::Regex;

/// A pure predicate over log text.
#[derive(Debug, Clone)]
pub enum Trigger {
    Contains(&'static str),
    Matches(&'static Regex),
}

impl Trigger {
    /// Byte offset of the first match.
    pub fn find(&self, text: &str) -> Option<usize> {
        match self {
            Trigger::Contains(needle) => text.find(needle),
            Trigger::Matches(re) => re.find(text).map(|m| m.start()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Trigger::Contains(needle) => format!("contains \"{needle}\""),
            Trigger::Matches(re) => format!("matches /{}/", re.as_str()),
        }
    }
}

/// Any-of combination of triggers.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    triggers: Vec<Trigger>,
}

impl TriggerSet {
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self { triggers }
    }

    pub fn contains(needles: &[&'static str]) -> Self {
        Self::new(needles.iter().copied().map(Trigger::Contains).collect())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.triggers.iter().any(|t| t.find(text).is_some())
    }

    /// Earliest byte offset matched by any trigger.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.triggers.iter().filter_map(|t| t.find(text)).min()
    }

    pub fn describe(&self) -> Vec<String> {
        self.triggers.iter().map(Trigger::describe).collect()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
