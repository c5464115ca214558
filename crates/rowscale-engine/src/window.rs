//! Overlapping time-step windows and their inverse.

use std::num::NonZeroUsize;

use crate::error::{ScaleError, SchemaMismatch};

/// Expands `rows` into every run of `time_steps` consecutive rows.
///
/// Window `i` holds rows `i..i + time_steps`, so `rows.len() - time_steps + 1`
/// windows are produced, or none when there are fewer rows than `time_steps`.
///
/// ```
/// use std::num::NonZeroUsize;
/// use rowscale_engine::window::to_time_steps;
///
/// let windows = to_time_steps(&[1, 2, 3, 4], NonZeroUsize::new(3).unwrap());
/// assert_eq!(windows, [[1, 2, 3], [2, 3, 4]]);
/// ```
#[must_use]
pub fn to_time_steps<T: Clone>(rows: &[T], time_steps: NonZeroUsize) -> Vec<Vec<T>> {
    rows.windows(time_steps.get()).map(<[T]>::to_vec).collect()
}

/// Rebuilds the row sequence from windows made by [`to_time_steps`].
///
/// The first window contributes all of its rows; each later window
/// contributes only its last row.
///
/// # Errors
///
/// [`SchemaMismatch::WindowLength`] if a window does not hold exactly `time_steps` rows.
pub fn collapse_time_steps<T: Clone>(
    windows: &[Vec<T>],
    time_steps: NonZeroUsize,
) -> Result<Vec<T>, ScaleError> {
    let expected = time_steps.get();
    let mut rows = Vec::with_capacity(windows.len().saturating_sub(1) + expected);
    for (index, window) in windows.iter().enumerate() {
        if window.len() != expected {
            return Err(ScaleError::SchemaMismatch(SchemaMismatch::WindowLength {
                window: index,
                expected,
                found: window.len(),
            }));
        }
        if index == 0 {
            rows.extend_from_slice(window);
        } else {
            rows.extend(window.last().cloned());
        }
    }
    Ok(rows)
}
