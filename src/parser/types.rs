use chrono::{DateTime, Utc};

use super::error::MalformedInput;
use crate::geodesy::{Ecef, Geodetic};

/// One observed fix.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub timestamp: DateTime<Utc>,
    pub position: Geodetic,
    pub satellite_count: u32,
    pub detail: SampleDetail,
}

/// Format-specific fields carried alongside a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleDetail {
    Nmea(NmeaFix),
    Xyz(XyzSolution),
    Rinex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NmeaFix {
    pub fix_quality: u8,
    pub hdop: Option<f64>,
    /// GGA carries no date; the parser's fallback date was used.
    pub date_inferred: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XyzSolution {
    pub ecef: Ecef,
    pub solution_type: i32,
    pub std_dev_x: f64,
    pub std_dev_y: f64,
    pub std_dev_z: f64,
    /// Signed square roots of the xy, yz and zx covariances.
    pub cross_std_dev: [f64; 3],
    pub age: f64,
    pub ratio: f64,
}

impl PositionSample {
    pub fn xyz(&self) -> Option<&XyzSolution> {
        match &self.detail {
            SampleDetail::Xyz(solution) => Some(solution),
            _ => None,
        }
    }
}

/// A record that was skipped, with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub line: usize,
    pub reason: MalformedInput,
}

/// Accepted samples in input order, plus what was skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub samples: Vec<PositionSample>,
    pub rejected: Vec<Rejection>,
}

impl Parsed {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn reject(&mut self, line: usize, reason: MalformedInput) {
        self.rejected.push(Rejection { line, reason });
    }
}
