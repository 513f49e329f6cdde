use serde::Serialize;

use super::format::SourceFormat;
use super::metrics::{AccuracyMetrics, ErrorStatistics};
use super::reference::{Reference, ReferenceMode};
use crate::geodesy::{Geodetic, UtmZone};
use crate::parser::XyzStatistics;

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub reference_mode: ReferenceMode,
    pub reference_position: Geodetic,
    pub utm_zone: UtmZone,
    pub horizontal: ErrorStatistics,
    pub vertical: ErrorStatistics,
    pub num_points: usize,
    pub rejected_records: usize,
    #[serde(flatten)]
    pub details: FormatDetails,
}

/// Per-format extras, serialised under a `format` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FormatDetails {
    Nmea,
    Rinex,
    Xyz {
        xyz_stats: XyzStatistics,
        solution_quality: SolutionQuality,
    },
}

/// Mean reported standard deviation per ECEF axis, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolutionQuality {
    pub std_dev_x: f64,
    pub std_dev_y: f64,
    pub std_dev_z: f64,
}

impl FormatDetails {
    pub fn format(&self) -> SourceFormat {
        match self {
            FormatDetails::Nmea => SourceFormat::Nmea,
            FormatDetails::Rinex => SourceFormat::Rinex,
            FormatDetails::Xyz { .. } => SourceFormat::Xyz,
        }
    }
}

impl AccuracyReport {
    pub fn new(
        reference: Reference,
        metrics: AccuracyMetrics,
        rejected_records: usize,
        details: FormatDetails,
    ) -> Self {
        Self {
            reference_mode: reference.mode,
            reference_position: reference.position,
            utm_zone: metrics.zone,
            horizontal: metrics.horizontal,
            vertical: metrics.vertical,
            num_points: metrics.num_points,
            rejected_records,
            details,
        }
    }

    pub fn format(&self) -> SourceFormat {
        self.details.format()
    }

    pub fn xyz_stats(&self) -> Option<&XyzStatistics> {
        match &self.details {
            FormatDetails::Xyz { xyz_stats, .. } => Some(xyz_stats),
            _ => None,
        }
    }

    pub fn solution_quality(&self) -> Option<&SolutionQuality> {
        match &self.details {
            FormatDetails::Xyz {
                solution_quality, ..
            } => Some(solution_quality),
            _ => None,
        }
    }
}
