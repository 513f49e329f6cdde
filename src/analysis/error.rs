use thiserror::Error;

use crate::geodesy::TransformError;
use crate::parser::ParseError;

/// Run-level failure; distinct from a successful report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no valid data ({rejected} records rejected)")]
    NoValidData { rejected: usize },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("coordinate transform failed: {source}")]
    TransformFailure {
        /// Input line that produced the coordinate, when known.
        line: Option<usize>,
        #[source]
        source: TransformError,
    },
    #[error("data format error: {0}")]
    DataFormat(#[source] ParseError),
    #[error("invalid reference position: {0}")]
    InvalidReference(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ParseError> for AnalysisError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Transform { line, source } => AnalysisError::TransformFailure {
                line: Some(line),
                source,
            },
            other => AnalysisError::DataFormat(other),
        }
    }
}

impl From<TransformError> for AnalysisError {
    fn from(source: TransformError) -> Self {
        AnalysisError::TransformFailure { line: None, source }
    }
}
