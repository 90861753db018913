use thiserror::Error;

/// Errors raised by the exact test engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactTestError {
    /// The table's sample size needs a log factorial past the precomputed range.
    /// Deterministic for a given capacity: raise the capacity, don't retry.
    #[error("sample size {needed} exceeds log-factorial table capacity {capacity}; raise the table capacity")]
    CapacityExceeded { needed: usize, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_no_cli_flag() {
        let msg = ExactTestError::CapacityExceeded {
            needed: 50_000,
            capacity: 50_000,
        }
        .to_string();
        assert_eq!(
            msg,
            "sample size 50000 exceeds log-factorial table capacity 50000; raise the table capacity"
        );
    }
}
