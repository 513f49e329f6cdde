use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::Analyzer;
use super::error::AnalysisError;
use super::format::SourceFormat;
use super::report::AccuracyReport;

/// A report plus the bookkeeping a caller needs to store it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub source: String,
    pub analysis_date: DateTime<Utc>,
    pub processing_time_s: f64,
    pub report: AccuracyReport,
}

impl AnalysisRecord {
    pub fn new(
        source: impl Into<String>,
        started: DateTime<Utc>,
        elapsed: Duration,
        report: AccuracyReport,
    ) -> Self {
        Self {
            id: generate_id(started),
            source: source.into(),
            analysis_date: started,
            processing_time_s: elapsed.as_secs_f64(),
            report,
        }
    }

    pub fn processing_time(&self) -> Duration {
        Duration::from_secs_f64(self.processing_time_s)
    }
}

fn generate_id(start: DateTime<Utc>) -> String {
    let uuid = uuid::Uuid::new_v4();
    let timestamp = start.format("%Y%m%dT%H%M%SZ");
    format!("{}_{}", timestamp, uuid)
}

impl Analyzer {
    /// Analyses a file and wraps the result with its run metadata.
    pub fn record_file(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let started = Utc::now();
        let timer = Instant::now();
        let report = self.analyze_file(path, format)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(AnalysisRecord::new(source, started, timer.elapsed(), report))
    }
}
