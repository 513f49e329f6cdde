use thiserror::Error;

use crate::geodesy::TransformError;

/// Why a single sentence or line was skipped. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInput {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("expected at least {minimum} fields, found {found}")]
    TooFewFields { minimum: usize, found: usize },
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },
    #[error("no fix (quality {0})")]
    NoFix(u8),
    #[error("coordinate: {0}")]
    Coordinate(#[from] TransformError),
}

impl MalformedInput {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        MalformedInput::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}

/// Failure to read an input as a whole.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input is not valid text: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("line {line}: {source}")]
    Transform {
        line: usize,
        #[source]
        source: TransformError,
    },
    #[error("RINEX parsing failed: {0}")]
    Rinex(String),
    #[error("not a RINEX observation file: {0}")]
    NotObservation(String),
    #[error("epoch outside the representable range: {0}")]
    Epoch(String),
}
