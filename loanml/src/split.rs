// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::encoding::EncodedTable;
use crate::errors::SplitError;

/// Disjoint train and test partitions of an encoded table.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: EncodedTable,
    pub test: EncodedTable,
    /// Positions of the training rows in the input table.
    pub train_indices: Vec<usize>,
    /// Positions of the test rows in the input table.
    pub test_indices: Vec<usize>,
}

/// Number of test rows for `n_rows` rows: the fraction is rounded up.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    (test_fraction * n_rows as f64).ceil() as usize
}

/// Splits rows into train and test sets with a seeded permutation.
///
/// The row indices are shuffled with a `StdRng` seeded from `seed`; the first
/// `ceil(test_fraction * n)` shuffled indices form the test set and the rest
/// the training set. The same seed and input always give the same partition.
pub fn train_test_split(
    table: &EncodedTable,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, SplitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }
    let n_rows = table.n_rows();
    let n_test = test_size(n_rows, test_fraction);
    if n_test == 0 || n_test >= n_rows {
        return Err(SplitError::TooFewRows { rows: n_rows });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);
    debug!(
        "Split {} rows with seed {}: train_size={}, test_size={}",
        n_rows,
        seed,
        train_indices.len(),
        test_indices.len()
    );

    Ok(Split {
        train: table.select_rows(train_indices),
        test: table.select_rows(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::collections::HashSet;

    fn table(n_rows: usize) -> EncodedTable {
        EncodedTable {
            feature_names: vec!["row".to_string()],
            features: Array2::from_shape_fn((n_rows, 1), |(i, _)| i as f64),
            labels: Array1::from_shape_fn(n_rows, |i| (i % 2) as f64),
        }
    }

    #[test]
    fn test_split_is_exhaustive_and_disjoint() {
        let split = train_test_split(&table(100), 0.3, 101).unwrap();

        assert_eq!(split.train.n_rows() + split.test.n_rows(), 100);
        assert_eq!(split.test.n_rows(), 30);

        let train: HashSet<usize> = split.train_indices.iter().copied().collect();
        let test: HashSet<usize> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 100);
    }

    #[test]
    fn test_split_rows_follow_indices() {
        let split = train_test_split(&table(20), 0.25, 7).unwrap();
        for (pos, &original) in split.test_indices.iter().enumerate() {
            assert_eq!(split.test.features[[pos, 0]], original as f64);
        }
    }

    #[test]
    fn test_split_is_deterministic_for_seed() {
        let first = train_test_split(&table(50), 0.3, 42).unwrap();
        let second = train_test_split(&table(50), 0.3, 42).unwrap();
        assert_eq!(first.train_indices, second.train_indices);
        assert_eq!(first.test_indices, second.test_indices);

        let other = train_test_split(&table(50), 0.3, 43).unwrap();
        assert_ne!(first.test_indices, other.test_indices);
    }

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(9578, 0.3), 2874);
        assert_eq!(test_size(10, 0.3), 3);
        assert_eq!(test_size(7, 0.3), 3);
    }

    #[test]
    fn test_split_invalid_fraction() {
        assert_eq!(train_test_split(&table(10), 0.0, 1).unwrap_err(), SplitError::InvalidFraction(0.0));
        assert_eq!(train_test_split(&table(10), 1.0, 1).unwrap_err(), SplitError::InvalidFraction(1.0));
        assert!(matches!(train_test_split(&table(10), f64::NAN, 1), Err(SplitError::InvalidFraction(_))));
    }

    #[test]
    fn test_split_too_few_rows() {
        assert_eq!(train_test_split(&table(1), 0.3, 1).unwrap_err(), SplitError::TooFewRows { rows: 1 });
        assert_eq!(train_test_split(&table(0), 0.3, 1).unwrap_err(), SplitError::TooFewRows { rows: 0 });
    }
}
