//! Pre-release segments (`-<identifier>.<counter>`) attached to a version.
//!
//! Identifiers are normalized to lowercase and must be valid semver
//! pre-release identifiers without dots (e.g. `alpha`, `beta`, `rc`, `next`).

use crate::error::{ReleaseError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Normalize and validate a pre-release identifier.
pub fn normalize_preid(raw: &str) -> Result<String> {
    let id = raw.trim().to_lowercase();
    if id.is_empty() {
        return Err(ReleaseError::version("Empty pre-release identifier"));
    }
    if id.contains('.') {
        return Err(ReleaseError::version(format!(
            "Invalid pre-release identifier: '{}'",
            raw
        )));
    }
    semver::Prerelease::new(&id).map_err(|e| {
        ReleaseError::version(format!("Invalid pre-release identifier '{}': {}", raw, e))
    })?;
    Ok(id)
}

/// Pre-release segment with an optional counter.
///
/// - "alpha" -> PreRelease { identifier: "alpha", iteration: None }
/// - "beta.1" -> PreRelease { identifier: "beta", iteration: Some(1) }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub identifier: String,
    pub iteration: Option<u64>,
}

impl PreRelease {
    pub fn new(identifier: impl Into<String>, iteration: Option<u64>) -> Self {
        PreRelease {
            identifier: identifier.into(),
            iteration,
        }
    }

    /// Start a new pre-release line at counter 0.
    pub fn start(identifier: impl Into<String>) -> Self {
        PreRelease::new(identifier, Some(0))
    }

    /// Parse a pre-release segment such as "beta", "beta.1" or "rc.2".
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::version("Empty pre-release identifier"));
        }

        let (id, iteration) = match s.split_once('.') {
            Some((id, counter)) => {
                let n = counter.parse::<u64>().map_err(|_| {
                    ReleaseError::version(format!("Invalid iteration number: '{}'", counter))
                })?;
                (id, Some(n))
            }
            None => (s, None),
        };

        Ok(PreRelease {
            identifier: normalize_preid(id)?,
            iteration,
        })
    }

    /// Whether this segment belongs to the given (normalized) identifier.
    pub fn matches(&self, identifier: &str) -> bool {
        self.identifier == identifier
    }

    /// Increment the counter; a bare identifier continues at 0.
    pub fn increment_iteration(&self) -> Result<Self> {
        let iteration = match self.iteration {
            Some(n) => n.checked_add(1).ok_or_else(|| {
                ReleaseError::version(format!("Cannot increment pre-release counter past {}", n))
            })?,
            None => 0,
        };

        Ok(PreRelease {
            identifier: self.identifier.clone(),
            iteration: Some(iteration),
        })
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        // A bare identifier sorts before any numbered iteration of itself.
        self.identifier
            .cmp(&other.identifier)
            .then_with(|| match (self.iteration, other.iteration) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(iter) = self.iteration {
            write!(f, ".{}", iter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_preid_lowercases() {
        assert_eq!(normalize_preid("Beta").unwrap(), "beta");
        assert_eq!(normalize_preid(" RC ").unwrap(), "rc");
    }

    #[test]
    fn test_normalize_preid_invalid() {
        assert!(normalize_preid("").is_err());
        assert!(normalize_preid("in valid").is_err());
        assert!(normalize_preid("invalid!name").is_err());
        assert!(normalize_preid("beta.1").is_err());
    }

    #[test]
    fn test_prerelease_parse_with_iteration() {
        let pr = PreRelease::parse("beta.1").unwrap();
        assert_eq!(pr.identifier, "beta");
        assert_eq!(pr.iteration, Some(1));
    }

    #[test]
    fn test_prerelease_parse_no_iteration() {
        let pr = PreRelease::parse("alpha").unwrap();
        assert_eq!(pr.identifier, "alpha");
        assert_eq!(pr.iteration, None);
    }

    #[test]
    fn test_prerelease_parse_invalid_iteration() {
        assert!(PreRelease::parse("beta.abc").is_err());
        assert!(PreRelease::parse("").is_err());
    }

    #[test]
    fn test_prerelease_increment() {
        let pr = PreRelease::parse("rc.99").unwrap();
        assert_eq!(pr.increment_iteration().unwrap().iteration, Some(100));

        let bare = PreRelease::new("alpha", None);
        assert_eq!(bare.increment_iteration().unwrap().to_string(), "alpha.0");
    }

    #[test]
    fn test_prerelease_ordering() {
        let a = PreRelease::parse("beta.1").unwrap();
        let b = PreRelease::parse("beta.2").unwrap();
        let bare = PreRelease::parse("beta").unwrap();
        assert!(a < b);
        assert!(bare < a);
    }

    #[test]
    fn test_prerelease_display() {
        assert_eq!(PreRelease::start("next").to_string(), "next.0");
        assert_eq!(PreRelease::parse("staging.3").unwrap().to_string(), "staging.3");
    }
}
