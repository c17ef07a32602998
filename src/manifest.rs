//! Package manifest access (`package.json`).

use crate::error::{ReleaseError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

/// The manifest fields the release pipeline reads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    /// `"private": true` packages are never published
    pub private: bool,
}

/// Reads and rewrites the project manifest
pub trait ManifestStore: Send + Sync {
    /// `Ok(None)` when the directory has no manifest
    fn read(&self, dir: &Path) -> Result<Option<ManifestInfo>>;

    fn write_version(&self, dir: &Path, version: &str) -> Result<()>;
}

/// `package.json` store; key order and unrelated fields are preserved
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageJson;

impl PackageJson {
    fn path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    fn load(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(ReleaseError::config(format!(
                "{} is not a JSON object",
                path.display()
            )));
        }
        Ok(value)
    }
}

impl ManifestStore for PackageJson {
    fn read(&self, dir: &Path) -> Result<Option<ManifestInfo>> {
        let path = Self::path(dir);
        if !path.is_file() {
            return Ok(None);
        }
        let value = Self::load(&path)?;
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Some(ManifestInfo {
            name: text("name"),
            version: text("version"),
            private: value.get("private").and_then(Value::as_bool).unwrap_or(false),
        }))
    }

    fn write_version(&self, dir: &Path, version: &str) -> Result<()> {
        let path = Self::path(dir);
        let mut value = Self::load(&path)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("version".to_string(), Value::String(version.to_string()));
        }
        let mut content = serde_json::to_string_pretty(&value)?;
        content.push('\n');
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PackageJson.read(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_write_preserves_other_fields_and_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"name":"widget","version":"1.0.0","private":true,"scripts":{"test":"jest"}}"#,
        )
        .unwrap();

        let info = PackageJson.read(dir.path()).unwrap().unwrap();
        assert_eq!(info.name.as_deref(), Some("widget"));
        assert!(info.private);

        PackageJson.write_version(dir.path(), "1.1.0").unwrap();
        let content = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(content.find("\"name\"").unwrap() < content.find("\"version\"").unwrap());
        assert!(content.contains("\"version\": \"1.1.0\""));
        assert!(content.contains("\"test\": \"jest\""));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_malformed_manifest_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(PackageJson.read(dir.path()).is_err());
    }
}
