//! Seeded train/test partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Result, SpamError};

/// Disjoint training and evaluation partitions
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Shuffle with a fixed seed and hold out `ceil(n * test_size)` items
pub fn train_test_split<T>(mut items: Vec<T>, test_size: f64, seed: u64) -> Result<Split<T>> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SpamError::Configuration(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n = items.len();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(SpamError::Configuration(format!(
            "cannot split {} records with test_size {}: a partition would be empty",
            n, test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let test = items.split_off(n - n_test);
    Ok(Split { train: items, test })
}
