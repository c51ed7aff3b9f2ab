use super::RuleError;
use std::path::{Path, PathBuf};

/// Picks the firewall rules directory from an ordered list of known layouts.
#[derive(Debug, Clone)]
pub struct RuleDirectoryResolver {
    candidates: Vec<PathBuf>,
}

impl RuleDirectoryResolver {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists and is a directory.
    pub fn resolve(&self) -> Result<PathBuf, RuleError> {
        self.candidates
            .iter()
            .find(|dir| is_directory(dir))
            .cloned()
            .ok_or_else(|| RuleError::DirectoryNotFound {
                candidates: self.candidates.clone(),
            })
    }
}

fn is_directory(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}
