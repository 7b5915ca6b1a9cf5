use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log category a rule is scoped to.
///
/// Each domain owns exactly one text buffer per run. Rules never look at another
/// domain's buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Xcode app build output.
    App,
    /// Native plugin (CMake configure/build) output.
    Plugin,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::App, Domain::Plugin];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::App => "app",
            Domain::Plugin => "plugin",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown domain '{}' (expected app or plugin)", self.0)
    }
}

impl std::error::Error for UnknownDomain {}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "app" => Ok(Domain::App),
            "plugin" | "native" => Ok(Domain::Plugin),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("App".parse::<Domain>().unwrap(), Domain::App);
        assert_eq!(" plugin ".parse::<Domain>().unwrap(), Domain::Plugin);
        assert_eq!("native".parse::<Domain>().unwrap(), Domain::Plugin);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "docs".parse::<Domain>().expect_err("unknown");
        assert!(err.to_string().contains("docs"));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Domain::Plugin).expect("serialize");
        assert_eq!(json, "\"plugin\"");
    }
}
