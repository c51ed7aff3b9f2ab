pub mod file;
pub mod record;
pub mod store;

pub use file::FileStateStore;
pub use record::{StateKey, StateRecord};
pub use store::{MemoryStateStore, StateError, StateStore};
