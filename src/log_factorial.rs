use crate::error::ExactTestError;
use std::ops::Index;
use std::sync::OnceLock;

/// Number of precomputed log factorials in the process-wide table.
///
/// The sample size `n` of a tested table must stay strictly below this.
pub const DEFAULT_CAPACITY: usize = 50_000;

static GLOBAL_TABLE: OnceLock<LogFactorialTable> = OnceLock::new();

/// Cumulative log factorials: entry `i` holds `ln(i!)` for `i` in `[0, capacity)`.
#[derive(Debug, Clone)]
pub struct LogFactorialTable {
    values: Box<[f64]>,
}

impl LogFactorialTable {
    /// Fill a table of `capacity` entries with `T[0] = 0`, `T[i] = T[i-1] + ln(i)`.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut values = vec![0.0f64; capacity];
        for i in 1..capacity {
            values[i] = values[i - 1] + (i as f64).ln();
        }
        tracing::debug!(capacity, "built log-factorial table");
        Self {
            values: values.into_boxed_slice(),
        }
    }

    /// Shared table of [`DEFAULT_CAPACITY`] entries, built on first use.
    ///
    /// Concurrent first callers block until the single build finishes.
    pub fn global() -> &'static LogFactorialTable {
        GLOBAL_TABLE.get_or_init(|| LogFactorialTable::with_capacity(DEFAULT_CAPACITY))
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Check that `ln(size_needed!)` is inside the table.
    pub fn check_capacity(&self, size_needed: usize) -> Result<(), ExactTestError> {
        if size_needed >= self.capacity() {
            tracing::warn!(
                needed = size_needed,
                capacity = self.capacity(),
                "log factorial needed too high for precomputed table"
            );
            return Err(ExactTestError::CapacityExceeded {
                needed: size_needed,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

impl Index<usize> for LogFactorialTable {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

/// Process-wide table able to serve factorials up to `size_needed`.
///
/// Refuses before building anything when `size_needed >= DEFAULT_CAPACITY`.
pub fn table_for(size_needed: usize) -> Result<&'static LogFactorialTable, ExactTestError> {
    if size_needed >= DEFAULT_CAPACITY {
        tracing::warn!(
            needed = size_needed,
            capacity = DEFAULT_CAPACITY,
            "log factorial needed too high for precomputed table"
        );
        return Err(ExactTestError::CapacityExceeded {
            needed: size_needed,
            capacity: DEFAULT_CAPACITY,
        });
    }
    Ok(LogFactorialTable::global())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rayon::prelude::*;
    use statrs::function::factorial::ln_factorial;

    #[test]
    fn test_recurrence() {
        let t = LogFactorialTable::with_capacity(100);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[1], 0.0);
        for i in 1..100 {
            assert_eq!(t[i], t[i - 1] + (i as f64).ln());
            assert!(t[i] >= t[i - 1]);
        }
    }

    #[test]
    fn test_matches_ln_factorial() {
        let t = LogFactorialTable::global();
        for &i in &[2usize, 10, 170, 1000, 12_345, DEFAULT_CAPACITY - 1] {
            assert_relative_eq!(t[i], ln_factorial(i as u64), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        assert!(table_for(DEFAULT_CAPACITY - 1).is_ok());
        assert_eq!(
            table_for(DEFAULT_CAPACITY).unwrap_err(),
            ExactTestError::CapacityExceeded {
                needed: DEFAULT_CAPACITY,
                capacity: DEFAULT_CAPACITY
            }
        );
        assert!(table_for(usize::MAX).is_err());
    }

    #[test]
    fn test_owned_capacity() {
        let t = LogFactorialTable::with_capacity(10);
        assert_eq!(t.capacity(), 10);
        assert!(t.check_capacity(9).is_ok());
        assert!(t.check_capacity(10).is_err());
        assert!(LogFactorialTable::with_capacity(0).check_capacity(0).is_err());
    }

    #[test]
    fn test_global_built_once() {
        let addrs: Vec<usize> = (0..64)
            .into_par_iter()
            .map(|_| LogFactorialTable::global() as *const LogFactorialTable as usize)
            .collect();
        assert!(addrs.iter().all(|&a| a == addrs[0]));
        assert_eq!(LogFactorialTable::global().capacity(), DEFAULT_CAPACITY);
    }
}
