//! Labeled dataset loading and partitioning

pub mod loader;
pub mod split;

pub use loader::{load_records, read_records};
pub use split::{train_test_split, Split};
