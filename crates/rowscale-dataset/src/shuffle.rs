//! Fisher-Yates shuffles of samples and of X/Y pairs.

use rand::{Rng, seq::SliceRandom};

use crate::error::DatasetError;

/// Shuffles `rows` in place.
pub fn shuffle<T, R>(rows: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    rows.shuffle(rng);
}

/// Applies one random permutation to both `x` and `y`, keeping pairs together.
pub fn shuffle_pairs<X, Y, R>(
    x: Vec<X>,
    y: Vec<Y>,
    rng: &mut R,
) -> Result<(Vec<X>, Vec<Y>), DatasetError>
where
    R: Rng + ?Sized,
{
    if x.len() != y.len() {
        return Err(DatasetError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let mut pairs = x.into_iter().zip(y).collect::<Vec<_>>();
    pairs.shuffle(rng);
    Ok(pairs.into_iter().unzip())
}
