use crate::error::DatasetError;

/// Splits `rows` at `floor(rows.len() * ratio)`, keeping order.
///
/// ```
/// use rowscale_dataset::split::split_at_ratio;
///
/// let (train, test) = split_at_ratio(&[1, 2, 3, 4, 5], 0.8)?;
/// assert_eq!(train, [1, 2, 3, 4]);
/// assert_eq!(test, [5]);
/// # Ok::<(), rowscale_dataset::DatasetError>(())
/// ```
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn split_at_ratio<T>(rows: &[T], ratio: f64) -> Result<(&[T], &[T]), DatasetError> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(DatasetError::InvalidSplit { ratio });
    }
    let index = ((rows.len() as f64) * ratio).floor() as usize;
    Ok(rows.split_at(index.min(rows.len())))
}
