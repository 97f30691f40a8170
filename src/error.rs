use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabelerError>;

/// Contract violations detected before or while labeling a batch.
///
/// None of these are transient: they point at a malformed batch or a
/// vocabulary that does not describe the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelerError {
    #[error("shape mismatch for {tensor}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        tensor: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("split point {input_seq_len} is outside [1, {sequence_len}]")]
    SplitOutOfRange {
        input_seq_len: usize,
        sequence_len: usize,
    },

    #[error("example {example} declares sequence length {length}, batch holds {max} steps")]
    InvalidSequenceLength {
        example: usize,
        length: i64,
        max: usize,
    },

    #[error("example {example} marks step {step} valid, past its declared length {length}")]
    ValidStepPastLength {
        example: usize,
        step: usize,
        length: i64,
    },

    #[error("measurement '{0}' is missing from the vocabulary")]
    MissingMeasurement(String),

    #[error("label '{0}' is missing from the label vocabulary")]
    MissingLabel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("example {example}, step {step} carries {count} event-type fields")]
    AmbiguousEventType {
        example: usize,
        step: usize,
        count: usize,
    },
}
