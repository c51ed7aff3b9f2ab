pub mod cancel;
pub mod cli;
pub mod config;
pub mod fsutil;
pub mod harvest;
pub mod locks;
pub mod rules;
pub mod state;
pub mod web;

pub use cancel::CancelToken;
pub use harvest::{HarvestBatch, LogHarvester};
pub use rules::{RuleDirectoryResolver, RuleError, RuleStore};
pub use state::{FileStateStore, StateKey, StateRecord, StateStore};
