use crate::domain::prerelease::{normalize_preid, PreRelease};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Four-component version (`major.minor.patch[.build][-pre.n]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub build: Option<u64>,
    pub pre: Option<PreRelease>,
}

impl Version {
    /// Create a new three-component version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            build: None,
            pre: None,
        }
    }

    /// Parse a version, tolerating a leading `v`/`V` (e.g., "v1.2.3" -> Version(1,2,3))
    pub fn parse(tag: &str) -> Result<Self> {
        let clean_tag = tag
            .trim()
            .trim_start_matches('v')
            .trim_start_matches('V');

        let (core, pre) = match clean_tag.split_once('-') {
            Some((core, pre)) => (core, Some(PreRelease::parse(pre)?)),
            None => (clean_tag, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ReleaseError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z or X.Y.Z.B",
                tag
            )));
        }

        let component = |name: &str, raw: &str| {
            raw.parse::<u64>().map_err(|_| {
                ReleaseError::version(format!("Invalid {} version: {}", name, raw))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
            build: parts.get(3).map(|b| component("build", b)).transpose()?,
            pre,
        })
    }

    /// The version without its pre-release segment
    pub fn release(&self) -> Self {
        Version {
            pre: None,
            ..self.clone()
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Bump version according to bump kind, ignoring pre-release ids.
    ///
    /// A pre-release current version graduates to its own release when the
    /// bump kind would not move past it (`1.3.0-beta.2` + minor = `1.3.0`).
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let graduates = self.pre.is_some();
        let bumped = match kind {
            BumpKind::Major => {
                if graduates && self.minor == 0 && self.patch == 0 && self.build.is_none() {
                    return Ok(self.release());
                }
                Version::new(increment("major", self.major)?, 0, 0)
            }
            BumpKind::Minor => {
                if graduates && self.patch == 0 && self.build.is_none() {
                    return Ok(self.release());
                }
                Version::new(self.major, increment("minor", self.minor)?, 0)
            }
            BumpKind::Patch => {
                if graduates && self.build.is_none() {
                    return Ok(self.release());
                }
                Version::new(self.major, self.minor, increment("patch", self.patch)?)
            }
            BumpKind::Hotfix => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch,
                build: Some(match self.build {
                    Some(build) => increment("build", build)?,
                    None => 1,
                }),
                pre: None,
            },
        };
        Ok(bumped)
    }

    /// Compute the next version for a bump kind and an optional pre-release id.
    ///
    /// Repeating the identifier of an existing pre-release keeps its base and
    /// increments the counter; otherwise `-<preid>.0` is attached to the bumped
    /// base.
    pub fn next(&self, kind: BumpKind, preid: Option<&str>) -> Result<Self> {
        let Some(raw) = preid else {
            return self.bump(kind);
        };
        let id = normalize_preid(raw)?;

        if let Some(pre) = self.pre.as_ref().filter(|p| p.matches(&id)) {
            return Ok(Version {
                pre: Some(pre.increment_iteration()?),
                ..self.clone()
            });
        }

        if self.is_prerelease() {
            // Switching identifiers keeps the base the previous line was heading to,
            // unless the new identifier sorts below the old one.
            let switched = Version {
                pre: Some(PreRelease::start(id.clone())),
                ..self.release()
            };
            if switched > *self {
                return Ok(switched);
            }
        }

        Ok(Version {
            pre: Some(PreRelease::start(id)),
            ..self.release().bump(kind)?
        })
    }
}

fn increment(component: &str, value: u64) -> Result<u64> {
    value.checked_add(1).ok_or_else(|| {
        ReleaseError::version(format!("Cannot increment {} component past {}", component, value))
    })
}

/// Compute the next version string from a current version string.
///
/// `next_version("1.2.3", BumpKind::Patch, Some("beta"))` == `"1.2.4-beta.0"`
pub fn next_version(current: &str, kind: BumpKind, preid: Option<&str>) -> Result<String> {
    Ok(Version::parse(current)?.next(kind, preid)?.to_string())
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build.unwrap_or(0))
            .cmp(&(
                other.major,
                other.minor,
                other.patch,
                other.build.unwrap_or(0),
            ))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Granularity of a version increase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
    /// Fourth "build" component; `build` is accepted as an alias.
    #[serde(alias = "build")]
    Hotfix,
}

impl BumpKind {
    pub const ALL: [BumpKind; 4] = [
        BumpKind::Major,
        BumpKind::Minor,
        BumpKind::Patch,
        BumpKind::Hotfix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
            BumpKind::Hotfix => "hotfix",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            "hotfix" | "build" => Ok(BumpKind::Hotfix),
            other => Err(ReleaseError::version(format!(
                "Unknown bump kind '{}' (expected major, minor, patch, hotfix or build)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
        assert_eq!(Version::parse("V1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_four_components_and_pre() {
        let v = Version::parse("1.2.3.4").unwrap();
        assert_eq!(v.build, Some(4));

        let v = Version::parse("1.2.4-beta.0").unwrap();
        assert_eq!(v.pre, Some(PreRelease::new("beta", Some(0))));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4.5").is_err());
        assert!(Version::parse("a.b.c").is_err());
    }

    #[test]
    fn test_component_overflow_is_an_error() {
        let max = u64::MAX;
        for (current, kind) in [
            (format!("{}.0.0", max), BumpKind::Major),
            (format!("1.{}.0", max), BumpKind::Minor),
            (format!("1.2.{}", max), BumpKind::Patch),
            (format!("1.2.3.{}", max), BumpKind::Hotfix),
        ] {
            let err = next_version(&current, kind, None).unwrap_err();
            assert!(matches!(err, ReleaseError::Version(_)), "{}: {}", current, err);
        }

        let err = next_version(&format!("1.2.3-beta.{}", max), BumpKind::Patch, Some("beta"))
            .unwrap_err();
        assert!(err.to_string().contains("pre-release counter"));

        // Other components may sit at the limit
        assert_eq!(
            next_version(&format!("1.{}.2", max), BumpKind::Major, None).unwrap(),
            "2.0.0"
        );
    }

    #[test]
    fn test_next_version_examples() {
        assert_eq!(next_version("1.2.3", BumpKind::Major, None).unwrap(), "2.0.0");
        assert_eq!(next_version("1.2.3", BumpKind::Minor, None).unwrap(), "1.3.0");
        assert_eq!(next_version("1.2.3", BumpKind::Patch, None).unwrap(), "1.2.4");
        assert_eq!(next_version("1.2.3", BumpKind::Hotfix, None).unwrap(), "1.2.3.1");
        assert_eq!(
            next_version("1.2.3", BumpKind::Patch, Some("beta")).unwrap(),
            "1.2.4-beta.0"
        );
        assert_eq!(
            next_version("1.2.4-beta.0", BumpKind::Patch, Some("beta")).unwrap(),
            "1.2.4-beta.1"
        );
    }

    #[test]
    fn test_hotfix_increments_existing_build() {
        assert_eq!(next_version("1.2.3.1", BumpKind::Hotfix, None).unwrap(), "1.2.3.2");
        assert_eq!(next_version("1.2.3.7", BumpKind::Patch, None).unwrap(), "1.2.4");
    }

    #[test]
    fn test_preid_is_normalized() {
        assert_eq!(
            next_version("1.2.4-beta.3", BumpKind::Patch, Some("BETA")).unwrap(),
            "1.2.4-beta.4"
        );
    }

    #[test]
    fn test_preid_keeps_selected_kind() {
        assert_eq!(
            next_version("1.2.3", BumpKind::Minor, Some("rc")).unwrap(),
            "1.3.0-rc.0"
        );
        assert_eq!(
            next_version("1.2.3", BumpKind::Major, Some("alpha")).unwrap(),
            "2.0.0-alpha.0"
        );
    }

    #[test]
    fn test_switching_preid_keeps_base() {
        assert_eq!(
            next_version("1.3.0-alpha.4", BumpKind::Minor, Some("beta")).unwrap(),
            "1.3.0-beta.0"
        );
        assert_eq!(
            next_version("1.2.4-beta.0", BumpKind::Patch, Some("alpha")).unwrap(),
            "1.2.5-alpha.0"
        );
    }

    #[test]
    fn test_prerelease_graduates() {
        assert_eq!(next_version("1.2.4-beta.1", BumpKind::Patch, None).unwrap(), "1.2.4");
        assert_eq!(next_version("1.3.0-rc.1", BumpKind::Minor, None).unwrap(), "1.3.0");
        assert_eq!(next_version("1.3.1-rc.1", BumpKind::Minor, None).unwrap(), "1.4.0");
    }

    #[test]
    fn test_patch_twice_increments_twice() {
        let once = next_version("0.9.9", BumpKind::Patch, None).unwrap();
        let twice = next_version(&once, BumpKind::Patch, None).unwrap();
        assert_eq!(twice, "0.9.11");
    }

    #[test]
    fn test_next_is_strictly_greater() {
        let inputs = ["0.0.0", "1.2.3", "1.2.3.4", "1.2.4-beta.0", "2.0.0-rc", "9.9.9"];
        for input in inputs {
            let current = Version::parse(input).unwrap();
            for kind in BumpKind::ALL {
                for preid in [None, Some("beta"), Some("rc")] {
                    let next = current.next(kind, preid).unwrap();
                    assert!(
                        next > current,
                        "{} -> {} ({}, {:?}) did not increase",
                        current,
                        next,
                        kind,
                        preid
                    );
                }
            }
        }
    }

    #[test]
    fn test_bump_kind_from_str() {
        assert_eq!("build".parse::<BumpKind>().unwrap(), BumpKind::Hotfix);
        assert_eq!("MINOR".parse::<BumpKind>().unwrap(), BumpKind::Minor);
        assert!("prerelease".parse::<BumpKind>().is_err());
    }

    #[test]
    fn test_version_display() {
        let v = Version::parse("1.2.3.4-rc.2").unwrap();
        assert_eq!(v.to_string(), "1.2.3.4-rc.2");
    }
}
