//! Accuracy analysis: reference resolution, error metrics and reports.

mod aggregate;
mod engine;
mod error;
mod format;
mod metrics;
mod record;
mod reference;
mod report;

pub use aggregate::xyz_details;
pub use engine::Analyzer;
pub use error::AnalysisError;
pub use format::SourceFormat;
pub use metrics::{compute, AccuracyMetrics, ErrorStatistics};
pub use record::AnalysisRecord;
pub use reference::{resolve, Reference, ReferenceMode};
pub use report::{AccuracyReport, FormatDetails, SolutionQuality};
