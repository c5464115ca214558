/// Single-pass summary statistics over a stream of `f64` values.
///
/// Tracks the minimum, maximum, mean and sum of squared deviations (`M2`)
/// using Welford's online update:
///
/// ```text
/// delta = value - mean
/// mean += delta / count
/// M2   += delta * (value - mean)
/// ```
///
/// Every update is O(1) and no values are retained, so the accumulator can be
/// fed row by row while a dataset is being traversed.
///
/// Partial accumulators built over disjoint slices of the same column can be
/// combined with [`RunningStats::merge`], which makes min/max/mean/variance
/// reducible in parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Feeds one observation into the accumulator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rowscale_stats::running::RunningStats;
    /// let mut stats = RunningStats::new();
    /// stats.push(3.0);
    /// stats.push(1.0);
    /// assert_eq!(stats.count(), 2);
    /// assert_eq!(stats.min(), Some(1.0));
    /// assert_eq!(stats.mean(), 2.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Combines the statistics of another accumulator into this one.
    ///
    /// The result is the same (up to floating-point rounding) as if every
    /// value fed to `other` had been pushed into `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rowscale_stats::running::RunningStats;
    /// let mut left: RunningStats = [1.0, 2.0].into_iter().collect();
    /// let right: RunningStats = [3.0, 4.0].into_iter().collect();
    /// left.merge(&right);
    /// assert_eq!(left.count(), 4);
    /// assert_eq!(left.mean(), 2.5);
    /// assert_eq!(left.max(), Some(4.0));
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let count = self.count + other.count;
        let (na, nb, n) = (self.count as f64, other.count as f64, count as f64);
        let delta = other.mean - self.mean;
        self.mean += delta * nb / n;
        self.m2 += other.m2 + delta * delta * na * nb / n;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    /// Number of observations pushed so far.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Smallest observed value, or `None` if nothing was observed.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest observed value, or `None` if nothing was observed.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Arithmetic mean of the observations (`0.0` when empty).
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance, `M2 / (count - 1)`.
    ///
    /// Returns `0.0` for fewer than two observations.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sample_variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    /// Sample standard deviation, `sqrt(M2 / (count - 1))`.
    ///
    /// Returns `0.0` for fewer than two observations.
    #[must_use]
    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = f64>,
    {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}
