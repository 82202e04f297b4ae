pub mod discover;
pub mod harvest;
pub mod stats;
pub mod worker;

// Re-export command functions for convenience
pub use discover::discover;
pub use harvest::{harvest, HarvestParams};
pub use stats::stats;
pub use worker::{worker, WorkerParams};
