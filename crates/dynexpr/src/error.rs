use thiserror::Error;

pub type ExprResult<T> = Result<T, ExprError>;

/// Errors raised by constructors and by the generic evaluator.
///
/// The scalar evaluator never returns an error on data; every numeric
/// failure is reported through its completeness flag instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("`{0}` is not a variable name of the form `xK` with K >= 1")]
    MalformedVariable(String),

    #[error("variable `{0}` does not match any supplied name")]
    UnknownVariable(String),

    #[error("variable `{0}` matches more than one supplied name")]
    AmbiguousVariable(String),

    #[error("dataset rows must share one length: row {row} has {len} samples, expected {expected}")]
    RaggedDataset {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("no unary operator {op} ({len} registered) while evaluating `{tree}`")]
    UnknownUnary { op: u16, len: usize, tree: String },

    #[error("no binary operator {op} ({len} registered) while evaluating `{tree}`")]
    UnknownBinary { op: u16, len: usize, tree: String },

    #[error("feature x{feature} out of range: input holds {len} features while evaluating `{tree}`")]
    FeatureOutOfRange { feature: u16, len: usize, tree: String },
}
