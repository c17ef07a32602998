use crate::domain::version::Version;

/// Tag naming: a configurable prefix followed by the version
/// (e.g. prefix "v" and version "1.2.3" -> "v1.2.3").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub prefix: String,
}

impl TagPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPattern {
            prefix: prefix.into(),
        }
    }

    /// Format a version according to pattern
    pub fn format(&self, version: &str) -> String {
        format!("{}{}", self.prefix, version)
    }

    /// Extract the version part of a tag carrying this prefix
    pub fn version_part<'a>(&self, tag: &'a str) -> Option<&'a str> {
        tag.strip_prefix(self.prefix.as_str())
    }

    /// Parse the version of a tag, falling back to a bare `v` prefix
    pub fn parse_version(&self, tag: &str) -> Option<Version> {
        self.version_part(tag)
            .and_then(|v| Version::parse(v).ok())
            .or_else(|| Version::parse(tag).ok())
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new("v")
    }
}
