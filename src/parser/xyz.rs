use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::error::{MalformedInput, ParseError};
use super::statistics::XyzStatistics;
use super::types::{Parsed, PositionSample, SampleDetail, XyzSolution};
use crate::geodesy::{ecef_to_geodetic, Ecef, TransformError};

const XYZ_FIELDS: usize = 15;
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

/// One tokenised solution line, still in ECEF.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzLine {
    pub timestamp: DateTime<Utc>,
    pub ecef: Ecef,
    pub solution_type: i32,
    pub satellite_count: u32,
    pub std_dev: [f64; 3],
    pub cross_std_dev: [f64; 3],
    pub age: f64,
    pub ratio: f64,
}

impl XyzLine {
    pub fn into_sample(self) -> Result<PositionSample, TransformError> {
        let position = ecef_to_geodetic(&self.ecef)?;
        Ok(PositionSample {
            timestamp: self.timestamp,
            position,
            satellite_count: self.satellite_count,
            detail: SampleDetail::Xyz(XyzSolution {
                ecef: self.ecef,
                solution_type: self.solution_type,
                std_dev_x: self.std_dev[0],
                std_dev_y: self.std_dev[1],
                std_dev_z: self.std_dev[2],
                cross_std_dev: self.cross_std_dev,
                age: self.age,
                ratio: self.ratio,
            }),
        })
    }
}

/// Parsed XYZ file: samples, skipped lines and file-level statistics.
#[derive(Debug, Clone)]
pub struct XyzFile {
    pub parsed: Parsed,
    /// `None` when no line was accepted.
    pub statistics: Option<XyzStatistics>,
}

/// Reader for ECEF solution files, one fix per line:
///
/// `YYYY/MM/DD HH:MM:SS.ffffff X Y Z Q ns sdx sdy sdz sdxy sdyz sdzx age ratio`
///
/// Lines starting with `%` are header comments.
#[derive(Debug, Clone, Default)]
pub struct XyzParser;

impl XyzParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> Result<XyzFile, ParseError> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<XyzFile, ParseError> {
        let mut parsed = Parsed::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }

            let record = match self.parse_line(trimmed) {
                Ok(record) => record,
                Err(reason) => {
                    log::warn!("Skipping invalid XYZ line {}: {}", number, reason);
                    parsed.reject(number, reason);
                    continue;
                }
            };
            let sample = record
                .into_sample()
                .map_err(|source| ParseError::Transform {
                    line: number,
                    source,
                })?;
            parsed.samples.push(sample);
        }

        let statistics = XyzStatistics::from_samples(&parsed.samples);
        Ok(XyzFile { parsed, statistics })
    }

    pub fn parse_line(&self, line: &str) -> Result<XyzLine, MalformedInput> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != XYZ_FIELDS {
            return Err(MalformedInput::FieldCount {
                expected: XYZ_FIELDS,
                found: parts.len(),
            });
        }

        let stamp = format!("{} {}", parts[0], parts[1]);
        let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
            .map_err(|_| MalformedInput::invalid("timestamp", &stamp))?
            .and_utc();

        Ok(XyzLine {
            timestamp,
            ecef: Ecef::new(
                number(parts[2], "x")?,
                number(parts[3], "y")?,
                number(parts[4], "z")?,
            ),
            solution_type: parts[5]
                .parse()
                .map_err(|_| MalformedInput::invalid("solution type", parts[5]))?,
            satellite_count: parts[6]
                .parse()
                .map_err(|_| MalformedInput::invalid("satellite count", parts[6]))?,
            std_dev: [
                number(parts[7], "sdx")?,
                number(parts[8], "sdy")?,
                number(parts[9], "sdz")?,
            ],
            cross_std_dev: [
                number(parts[10], "sdxy")?,
                number(parts[11], "sdyz")?,
                number(parts[12], "sdzx")?,
            ],
            age: number(parts[13], "age")?,
            ratio: number(parts[14], "ratio")?,
        })
    }
}

fn number(s: &str, field: &'static str) -> Result<f64, MalformedInput> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedInput::invalid(field, s))
}
