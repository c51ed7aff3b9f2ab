//! Custom firewall rule file management.
//!
//! The agent owns a single configuration file inside the firewall's rules
//! directory. Rules are appended as free text blocks, each preceded by a
//! marker comment, and removed by id with a line-oriented scan. Nothing here
//! parses rule syntax.

pub mod block;
pub mod resolver;
pub mod store;

pub use block::{references_rule_id, remove_rule_block};
pub use resolver::RuleDirectoryResolver;
pub use store::{RuleStore, SEPARATOR_COMMENT};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// None of the candidate directories exist; the firewall is most likely
    /// not installed in a recognized layout.
    #[error("firewall rules directory not found (searched: {})", display_paths(.candidates))]
    DirectoryNotFound { candidates: Vec<PathBuf> },

    #[error("rules file {} does not exist", .path.display())]
    NoRulesFile { path: PathBuf },

    #[error("failed to {action} rules file {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
