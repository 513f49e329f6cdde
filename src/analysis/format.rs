use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use strum_macros::Display;

use super::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceFormat {
    Nmea,
    Rinex,
    Xyz,
}

impl SourceFormat {
    /// Detects the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| AnalysisError::UnsupportedFormat(path.display().to_string()))?;
        extension.parse()
    }
}

impl FromStr for SourceFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nmea" => Ok(SourceFormat::Nmea),
            "rnx" | "rinex" => Ok(SourceFormat::Rinex),
            "xyz" => Ok(SourceFormat::Xyz),
            _ => Err(AnalysisError::UnsupportedFormat(s.to_string())),
        }
    }
}
