use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{PositionSample, XyzSolution};

/// File-level summary of an XYZ solution file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XyzStatistics {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds between first and last fix.
    pub duration: f64,
    pub num_points: usize,
    pub mean_satellites: f64,
    pub mean_position: PositionMoments,
    /// Sample standard deviation; needs at least two fixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_position: Option<PositionMoments>,
    /// Mean of the reported per-axis standard deviations (meters).
    pub mean_accuracy: AxisMeans,
    /// Number of fixes per solution-type code.
    pub solution_types: BTreeMap<i32, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionMoments {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisMeans {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl XyzStatistics {
    pub fn from_samples(samples: &[PositionSample]) -> Option<Self> {
        let first = samples.first()?;
        let n = samples.len() as f64;

        let (mut start_time, mut end_time) = (first.timestamp, first.timestamp);
        for sample in samples {
            start_time = start_time.min(sample.timestamp);
            end_time = end_time.max(sample.timestamp);
        }
        let span = end_time - start_time;
        let duration = span
            .num_microseconds()
            .map(|us| us as f64 / 1.0e6)
            .unwrap_or_else(|| span.num_milliseconds() as f64 / 1.0e3);

        let latitudes: Vec<f64> = samples.iter().map(|s| s.position.latitude).collect();
        let longitudes: Vec<f64> = samples.iter().map(|s| s.position.longitude).collect();
        let altitudes: Vec<f64> = samples.iter().map(|s| s.position.altitude).collect();

        let mean_position = PositionMoments {
            latitude: mean(&latitudes),
            longitude: mean(&longitudes),
            altitude: mean(&altitudes),
        };
        let std_position = (samples.len() > 1).then(|| PositionMoments {
            latitude: sample_std(&latitudes, mean_position.latitude),
            longitude: sample_std(&longitudes, mean_position.longitude),
            altitude: sample_std(&altitudes, mean_position.altitude),
        });

        let solutions: Vec<_> = samples.iter().filter_map(|s| s.xyz()).collect();
        let axis_mean = |f: fn(&XyzSolution) -> f64| {
            if solutions.is_empty() {
                0.0
            } else {
                solutions.iter().map(|s| f(s)).sum::<f64>() / solutions.len() as f64
            }
        };
        let mean_accuracy = AxisMeans {
            x: axis_mean(|s| s.std_dev_x),
            y: axis_mean(|s| s.std_dev_y),
            z: axis_mean(|s| s.std_dev_z),
        };

        let mut solution_types = BTreeMap::new();
        for solution in &solutions {
            *solution_types.entry(solution.solution_type).or_insert(0) += 1;
        }

        Some(Self {
            start_time,
            end_time,
            duration,
            num_points: samples.len(),
            mean_satellites: samples.iter().map(|s| f64::from(s.satellite_count)).sum::<f64>() / n,
            mean_position,
            std_position,
            mean_accuracy,
            solution_types,
        })
    }

    pub fn time_span(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Mean shifted by the first value, so identical inputs average exactly.
pub(crate) fn mean(values: &[f64]) -> f64 {
    match values.first() {
        None => 0.0,
        Some(&origin) => {
            origin + values.iter().map(|v| v - origin).sum::<f64>() / values.len() as f64
        }
    }
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
