use super::block::remove_rule_block;
use super::resolver::RuleDirectoryResolver;
use super::RuleError;
use crate::config::RulesConfig;
use crate::fsutil::write_atomic;
use crate::locks::KeyedLocks;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Marker line written ahead of every appended rule block.
pub const SEPARATOR_COMMENT: &str = "# Added by wafagent";

/// The agent's custom rule file inside the resolved rules directory.
///
/// The directory is resolved on every call, so installing the firewall while
/// the agent runs is picked up without a restart. Mutations of one rule file
/// are serialized, and `remove` replaces the file atomically.
pub struct RuleStore {
    resolver: RuleDirectoryResolver,
    file_name: String,
    locks: KeyedLocks<PathBuf>,
}

impl RuleStore {
    pub fn new(resolver: RuleDirectoryResolver, file_name: impl Into<String>) -> Self {
        Self {
            resolver,
            file_name: file_name.into(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        Self::new(
            RuleDirectoryResolver::new(config.candidate_dirs.clone()),
            config.file_name.clone(),
        )
    }

    /// Full path of the rule file in the currently resolved directory.
    pub fn rules_path(&self) -> Result<PathBuf, RuleError> {
        Ok(self.resolver.resolve()?.join(&self.file_name))
    }

    /// Append `content` as a new block, creating the file if needed.
    ///
    /// No validation or deduplication: appending the same text twice yields
    /// two blocks.
    pub fn append(&self, content: &str) -> Result<(), RuleError> {
        let path = self.rules_path()?;
        let block = format!("\n{}\n{}\n", SEPARATOR_COMMENT, content);

        self.locks.with_lock(&path, || {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| io_error("open", &path, source))?;
            file.write_all(block.as_bytes())
                .map_err(|source| io_error("append to", &path, source))?;
            file.sync_all()
                .map_err(|source| io_error("sync", &path, source))
        })?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Appended rule block");
        Ok(())
    }

    /// Remove the block for `id`. Removing an id that is not present is a
    /// no-op and leaves the file untouched.
    pub fn remove(&self, id: &str) -> Result<(), RuleError> {
        let path = self.rules_path()?;

        let changed = self.locks.with_lock(&path, || {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(RuleError::NoRulesFile { path: path.clone() });
                }
                Err(source) => return Err(io_error("read", &path, source)),
            };

            let updated = remove_rule_block(&content, id);
            if updated == content {
                return Ok(false);
            }

            write_atomic(&path, updated.as_bytes())
                .map_err(|source| io_error("rewrite", &path, source))?;
            Ok(true)
        })?;

        if changed {
            tracing::info!(path = %path.display(), rule_id = %id, "Removed rule block");
        } else {
            tracing::debug!(path = %path.display(), rule_id = %id, "Rule id not present, nothing removed");
        }
        Ok(())
    }

    /// Current file content, or an empty string when the file does not exist.
    pub fn list(&self) -> Result<String, RuleError> {
        let path = self.rules_path()?;

        self.locks.with_lock(&path, || match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(io_error("read", &path, source)),
        })
    }

    /// Delete the rule file. Clearing an already absent file succeeds.
    pub fn clear(&self) -> Result<(), RuleError> {
        let path = self.rules_path()?;

        self.locks.with_lock(&path, || match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Cleared custom rules");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error("remove", &path, source)),
        })
    }
}

fn io_error(action: &'static str, path: &std::path::Path, source: std::io::Error) -> RuleError {
    RuleError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const FILE_NAME: &str = "custom.conf";

    fn store_in(dir: &Path) -> RuleStore {
        RuleStore::new(
            RuleDirectoryResolver::new(vec![dir.join("absent"), dir.to_path_buf()]),
            FILE_NAME,
        )
    }

    #[test]
    fn test_list_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(dir.path()).list().unwrap(), "");
    }

    #[test]
    fn test_append_then_list() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path());
        std::fs::write(dir.path().join(FILE_NAME), "# existing\n").unwrap();

        store.append("SecRule ARGS \"x\" \"id:1,deny\"").unwrap();

        assert_eq!(
            store.list().unwrap(),
            format!(
                "# existing\n\n{}\nSecRule ARGS \"x\" \"id:1,deny\"\n",
                SEPARATOR_COMMENT
            )
        );
    }

    #[test]
    fn test_duplicate_appends_accumulate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path());

        store.append("SecRule A \"id:5\"").unwrap();
        store.append("SecRule A \"id:5\"").unwrap();

        assert_eq!(store.list().unwrap().matches("SecRule A").count(), 2);
    }

    #[test]
    fn test_append_remove_round_trip_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path());

        store
            .append("SecRule ARGS \"attack\" \"id:100,deny\"")
            .unwrap();
        let listed = store.list().unwrap();
        let non_blank: Vec<_> = listed.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(
            non_blank,
            vec![SEPARATOR_COMMENT, "SecRule ARGS \"attack\" \"id:100,deny\""]
        );

        store.remove("100").unwrap();
        assert!(store.list().unwrap().trim().is_empty());
    }

    #[test]
    fn test_remove_unknown_id_leaves_file_identical() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path());
        store.append("SecRule A \"id:1,deny\"").unwrap();
        let before = std::fs::read(dir.path().join(FILE_NAME)).unwrap();

        store.remove("2").unwrap();

        assert_eq!(std::fs::read(dir.path().join(FILE_NAME)).unwrap(), before);
    }

    #[test]
    fn test_remove_without_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = store_in(dir.path()).remove("1");
        assert!(matches!(result, Err(RuleError::NoRulesFile { .. })));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(dir.path());
        store.append("SecRule A \"id:1\"").unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.list().unwrap(), "");
        assert!(!dir.path().join(FILE_NAME).exists());
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = RuleStore::new(
            RuleDirectoryResolver::new(vec![dir.path().join("nope")]),
            FILE_NAME,
        );

        assert!(matches!(store.list(), Err(RuleError::DirectoryNotFound { .. })));
        assert!(matches!(store.append("x"), Err(RuleError::DirectoryNotFound { .. })));
        assert!(matches!(store.remove("1"), Err(RuleError::DirectoryNotFound { .. })));
        assert!(matches!(store.clear(), Err(RuleError::DirectoryNotFound { .. })));
    }
}
