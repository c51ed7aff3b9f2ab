pub mod harvester;
pub mod reader;

pub use harvester::{HarvestError, LogHarvester};
pub use reader::{batch_checksum, read_lines_between};

/// Non-blank lines gathered by one harvest, in candidate-list order and file order.
pub type HarvestBatch = Vec<String>;
