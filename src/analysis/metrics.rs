use serde::Serialize;

use super::error::AnalysisError;
use super::reference::Reference;
use crate::geodesy::{TransverseMercator, UtmZone};
use crate::parser::PositionSample;

/// Summary of one error series, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorStatistics {
    pub rmse: f64,
    /// Population standard deviation.
    pub std: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl ErrorStatistics {
    /// `None` for an empty series.
    pub fn from_errors(errors: &[f64]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let n = errors.len() as f64;

        let (min, max) = errors
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| {
                (lo.min(e), hi.max(e))
            });
        let mean = (errors.iter().sum::<f64>() / n).clamp(min, max);
        let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();

        Some(Self {
            rmse,
            std: variance.max(0.0).sqrt(),
            mean,
            max,
            min,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    pub horizontal: ErrorStatistics,
    pub vertical: ErrorStatistics,
    pub num_points: usize,
    pub zone: UtmZone,
}

/// Projects the samples and the reference with `projection` and summarises
/// the horizontal (planar distance) and vertical (absolute height) errors.
pub fn compute(
    samples: &[PositionSample],
    reference: &Reference,
    projection: &TransverseMercator,
) -> Result<AccuracyMetrics, AnalysisError> {
    let origin = projection.forward(&reference.position)?;

    let mut horizontal = Vec::with_capacity(samples.len());
    let mut vertical = Vec::with_capacity(samples.len());
    for sample in samples {
        let planar = projection.forward(&sample.position)?;
        horizontal.push(planar.horizontal_distance(&origin));
        vertical.push(planar.vertical_distance(&origin));
    }

    match (
        ErrorStatistics::from_errors(&horizontal),
        ErrorStatistics::from_errors(&vertical),
    ) {
        (Some(horizontal), Some(vertical)) => Ok(AccuracyMetrics {
            horizontal,
            vertical,
            num_points: samples.len(),
            zone: projection.zone(),
        }),
        _ => Err(AnalysisError::NoValidData { rejected: 0 }),
    }
}
