//! Class balancing of X/Y pairs.
//!
//! Samples are grouped by label, where a label is the exact Y row. Labels
//! are visited in first-seen order, so the output is deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Balancing {
    /// Cycle each label's samples up to the largest label count.
    #[display("oversample")]
    Oversample,
    /// Keep the first samples of each label, down to the smallest label count.
    #[display("undersample")]
    Undersample,
}

impl Balancing {
    /// Rebalances `x`/`y`; the result is grouped by label.
    pub fn apply<X: Clone>(
        self,
        x: &[X],
        y: &[Vec<f64>],
    ) -> Result<(Vec<X>, Vec<Vec<f64>>), DatasetError> {
        match self {
            Balancing::Oversample => oversample(x, y),
            Balancing::Undersample => undersample(x, y),
        }
    }
}

/// Sample indices per label, labels in first-seen order.
fn group_by_label(y: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut slots = HashMap::<Vec<u64>, usize>::new();
    let mut groups: Vec<Vec<usize>> = vec![];
    for (index, label) in y.iter().enumerate() {
        let key = label.iter().map(|v| v.to_bits()).collect();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(vec![]);
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

fn check_lengths<X>(x: &[X], y: &[Vec<f64>]) -> Result<(), DatasetError> {
    if x.len() == y.len() {
        Ok(())
    } else {
        Err(DatasetError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        })
    }
}

fn gather<X: Clone>(
    x: &[X],
    y: &[Vec<f64>],
    indices: impl Iterator<Item = usize>,
) -> (Vec<X>, Vec<Vec<f64>>) {
    indices.map(|i| (x[i].clone(), y[i].clone())).unzip()
}

/// Repeats each label's samples cyclically until every label has as many
/// samples as the most frequent one.
pub fn oversample<X: Clone>(
    x: &[X],
    y: &[Vec<f64>],
) -> Result<(Vec<X>, Vec<Vec<f64>>), DatasetError> {
    check_lengths(x, y)?;
    let groups = group_by_label(y);
    let target = groups.iter().map(Vec::len).max().unwrap_or(0);
    log::debug!("oversampling {} labels to {target} samples each", groups.len());
    let indices = groups
        .iter()
        .flat_map(|group| group.iter().copied().cycle().take(target));
    Ok(gather(x, y, indices))
}

/// Keeps the first samples of each label so that every label has as many
/// samples as the least frequent one.
pub fn undersample<X: Clone>(
    x: &[X],
    y: &[Vec<f64>],
) -> Result<(Vec<X>, Vec<Vec<f64>>), DatasetError> {
    check_lengths(x, y)?;
    let groups = group_by_label(y);
    let target = groups.iter().map(Vec::len).min().unwrap_or(0);
    log::debug!("undersampling {} labels to {target} samples each", groups.len());
    let indices = groups
        .iter()
        .flat_map(|group| group.iter().copied().take(target));
    Ok(gather(x, y, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<&'static str>, Vec<Vec<f64>>) {
        let x = vec!["a0", "b0", "a1", "a2", "c0", "b1"];
        let y = [1.0, 0.0, 1.0, 1.0, 0.5, 0.0]
            .iter()
            .map(|v| vec![*v])
            .collect();
        (x, y)
    }

    #[test]
    fn test_oversample_cycles() {
        let (x, y) = data();
        let (x, y) = oversample(&x, &y).unwrap();
        assert_eq!(x, ["a0", "a1", "a2", "b0", "b1", "b0", "c0", "c0", "c0"]);
        assert_eq!(y.len(), 9);
        assert_eq!(y[3], [0.0]);
    }

    #[test]
    fn test_undersample_takes_first() {
        let (x, y) = data();
        let (x, y) = Balancing::Undersample.apply(&x, &y).unwrap();
        assert_eq!(x, ["a0", "b0", "c0"]);
        assert_eq!(y, [[1.0], [0.0], [0.5]]);
    }

    #[test]
    fn test_empty_and_mismatched() {
        let (x, y) = oversample::<u8>(&[], &[]).unwrap();
        assert!(x.is_empty() && y.is_empty());
        assert!(matches!(
            undersample(&[1], &[]),
            Err(DatasetError::LengthMismatch { x: 1, y: 0 })
        ));
    }
}
