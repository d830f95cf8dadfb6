use std::io;

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("working-set size must be at least 1 element, got {0}")]
    InvalidWorkingSet(usize),

    #[error("failed to allocate buffer of {elements} elements ({bytes} bytes)")]
    OutOfMemory { elements: usize, bytes: u128 },

    #[error("verification failed: expected {expected}, got {actual}")]
    VerificationFailed { expected: i64, actual: i64 },

    #[error("failed to write result: {0}")]
    Output(#[from] io::Error),
}

impl BenchError {
    /// Process exit code for this failure. Configuration errors share clap's
    /// usage-error code.
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::InvalidWorkingSet(_) => 2,
            BenchError::OutOfMemory { .. }
            | BenchError::VerificationFailed { .. }
            | BenchError::Output(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(BenchError::InvalidWorkingSet(0).exit_code(), 2);
        assert_eq!(
            BenchError::OutOfMemory {
                elements: 1,
                bytes: 4
            }
            .exit_code(),
            1
        );
        assert_eq!(
            BenchError::VerificationFailed {
                expected: 1,
                actual: 2
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_messages_name_the_problem() {
        let msg = BenchError::InvalidWorkingSet(0).to_string();
        assert!(msg.contains("at least 1"), "{}", msg);

        let msg = BenchError::OutOfMemory {
            elements: 10,
            bytes: 40,
        }
        .to_string();
        assert!(msg.contains("10 elements"), "{}", msg);
        assert!(msg.contains("40 bytes"), "{}", msg);
    }
}
