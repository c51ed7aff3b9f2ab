use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Harvest cursor for one watched log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateRecord {
    /// Bytes of the file already consumed.
    pub position: u64,
    /// SHA-256 over the lines of the most recent batch. Informational only.
    pub checksum: String,
    /// File mtime at the last harvest, Unix seconds.
    pub mod_time: i64,
}

impl StateRecord {
    /// Cursor for a file seen for the first time: start at its current end so
    /// history already on disk is not replayed.
    pub fn starting_at(position: u64) -> Self {
        Self {
            position,
            checksum: String::new(),
            mod_time: 0,
        }
    }
}

/// Stable identifier for a log path's state record.
///
/// The full hex SHA-256 of the absolute path, so it is safe to use as a file
/// name and distinct paths never share a record in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn for_path(path: &Path) -> Self {
        let absolute = absolutize(path);
        let digest = Sha256::digest(absolute.to_string_lossy().as_bytes());
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = StateKey::for_path(Path::new("/var/log/modsecurity/audit.log"));
        let b = StateKey::for_path(Path::new("/var/log/modsecurity/audit.log"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_is_full_sha256_hex() {
        let key = StateKey::for_path(Path::new("/var/log/modsecurity/audit.log"));
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_paths_distinct_keys() {
        let a = StateKey::for_path(Path::new("/var/log/httpd/modsecurity_audit.log"));
        let b = StateKey::for_path(Path::new("/var/log/apache2/modsecurity_audit.log"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_relative_path_resolves_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let relative = StateKey::for_path(Path::new("audit.log"));
        let absolute = StateKey::for_path(&cwd.join("audit.log"));
        assert_eq!(relative, absolute);
    }

    #[test]
    fn test_record_json_shape() {
        let record = StateRecord {
            position: 1500,
            checksum: "abc".to_string(),
            mod_time: 1_700_000_000,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"position": 1500, "checksum": "abc", "mod_time": 1_700_000_000})
        );
    }
}
