//! Single-pass Pearson correlation between columns.
//!
//! [`CorrelationMatrix`] accumulates running sums, sums of squares and
//! cross-products for every column pair while the rows are visited once,
//! then derives the coefficients:
//!
//! ```text
//! r(i, j) = (n·Σxy − Σx·Σy) / sqrt((n·Σx² − (Σx)²) · (n·Σy² − (Σy)²))
//! ```

/// Pairwise Pearson correlation coefficients for a fixed set of columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    num_columns: usize,
    num_rows: usize,
    /// Upper triangle (`i < j`) stored row-major; `None` when a column is constant.
    coefficients: Vec<Option<f64>>,
}

/// One entry of the upper triangle of a [`CorrelationMatrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPair {
    pub first: usize,
    pub second: usize,
    pub coefficient: f64,
}

impl CorrelationMatrix {
    /// Computes correlations over `rows`, each of which must have `num_columns` values.
    ///
    /// Rows shorter than `num_columns` are treated as missing the trailing
    /// values and are skipped entirely.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_rows<'a, I>(num_columns: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let m = num_columns;
        let mut sums = vec![0.0; m];
        let mut sums_sq = vec![0.0; m];
        let mut cross = vec![0.0; m * m];
        let mut num_rows = 0;

        for row in rows {
            if row.len() < m {
                continue;
            }
            num_rows += 1;
            for i in 0..m {
                let xi = row[i];
                sums[i] += xi;
                sums_sq[i] += xi * xi;
                for j in (i + 1)..m {
                    cross[i * m + j] += xi * row[j];
                }
            }
        }

        let n = num_rows as f64;
        let denom = (0..m)
            .map(|i| n * sums_sq[i] - sums[i] * sums[i])
            .collect::<Vec<_>>();

        let mut coefficients = Vec::with_capacity(m * m.saturating_sub(1) / 2);
        for i in 0..m {
            for j in (i + 1)..m {
                let cov = n * cross[i * m + j] - sums[i] * sums[j];
                let scale = (denom[i] * denom[j]).sqrt();
                coefficients.push((scale > 0.0).then(|| cov / scale));
            }
        }

        Self {
            num_columns,
            num_rows,
            coefficients,
        }
    }

    /// Number of rows that contributed to the coefficients.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Correlation between columns `i` and `j`.
    ///
    /// Symmetric in its arguments. Returns `Some(1.0)` on the diagonal and
    /// `None` when an index is out of range or either column has zero
    /// variance.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.num_columns || j >= self.num_columns {
            return None;
        }
        if i == j {
            return Some(1.0);
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.coefficients[self.triangle_index(i, j)]
    }

    /// Iterates over every defined pair `(i, j)` with `i < j`, in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = CorrelationPair> + '_ {
        let m = self.num_columns;
        (0..m)
            .flat_map(move |i| ((i + 1)..m).map(move |j| (i, j)))
            .filter_map(|(first, second)| {
                self.get(first, second).map(|coefficient| CorrelationPair {
                    first,
                    second,
                    coefficient,
                })
            })
    }

    fn triangle_index(&self, i: usize, j: usize) -> usize {
        // offset of row i in the packed upper triangle, then column within it
        let m = self.num_columns;
        i * (2 * m - i - 1) / 2 + (j - i - 1)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn matrix(rows: &[Vec<f64>], num_columns: usize) -> CorrelationMatrix {
        CorrelationMatrix::from_rows(num_columns, rows.iter().map(Vec::as_slice))
    }

    #[test]
    fn test_perfect_positive_and_negative() {
        let rows = vec![
            vec![1.0, 10.0, 5.0],
            vec![2.0, 20.0, 4.0],
            vec![3.0, 30.0, 3.0],
            vec![4.0, 40.0, 2.0],
        ];
        let m = matrix(&rows, 3);
        assert_abs_diff_eq!(m.get(0, 1).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.get(0, 2).unwrap(), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.get(2, 1).unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(m.get(1, 1), Some(1.0));
        assert_eq!(m.num_rows(), 4);
    }

    #[test]
    fn test_known_coefficient() {
        let rows = vec![
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![3.0, 4.0],
            vec![4.0, 3.0],
        ];
        // cov = 0.8333.., var = 1.6666.. for both -> r = 0.6
        let m = matrix(&rows, 2);
        assert_abs_diff_eq!(m.get(0, 1).unwrap(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let rows = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let m = matrix(&rows, 2);
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.pairs().count(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let m = matrix(&[vec![1.0, 2.0]], 2);
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn test_pairs_order() {
        let rows = vec![
            vec![1.0, 2.0, 3.0, 1.0],
            vec![2.0, 1.0, 5.0, 0.0],
            vec![3.0, 5.0, 4.0, 2.0],
        ];
        let m = matrix(&rows, 4);
        let indices = m
            .pairs()
            .map(|p| (p.first, p.second))
            .collect::<Vec<_>>();
        assert_eq!(
            indices,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }
}
