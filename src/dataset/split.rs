//! Seeded shuffle and train/test partition assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::records::LabeledSequence;

/// Logical dataset partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitLabel {
    Train,
    Test,
}

impl SplitLabel {
    /// Directory name of the partition.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Test => "test",
        }
    }
}

/// A labeled sequence bound to its partition and its dense, zero-based
/// index within that partition.
#[derive(Clone, Debug)]
pub struct SplitAssignment {
    pub partition: SplitLabel,
    pub index: usize,
    pub record: LabeledSequence,
}

/// Fisher–Yates shuffle of the full collection with a seeded generator,
/// then assignment of the first `n_train` permuted elements to Train and
/// the remainder to Test, each partition indexed contiguously from 0.
///
/// The same seed and input ordering produce the identical permutation on
/// every run, which is what lets a separately fitted normalizer see the
/// exact same training subset each time.
pub fn shuffle_split(
    mut records: Vec<LabeledSequence>,
    n_train: usize,
    seed: u64,
) -> Vec<SplitAssignment> {
    let n_train = n_train.min(records.len());
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);

    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            if position < n_train {
                SplitAssignment {
                    partition: SplitLabel::Train,
                    index: position,
                    record,
                }
            } else {
                SplitAssignment {
                    partition: SplitLabel::Test,
                    index: position - n_train,
                    record,
                }
            }
        })
        .collect()
}
