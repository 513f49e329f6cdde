use serde::Serialize;
use strum_macros::Display;

use super::error::AnalysisError;
use crate::geodesy::Geodetic;
use crate::parser::{mean, PositionSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceMode {
    /// Surveyed position supplied by the caller.
    Fixed,
    /// Centroid of the samples themselves.
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub mode: ReferenceMode,
    pub position: Geodetic,
}

/// Picks the error origin for a run.
///
/// A fixed position is used verbatim. Otherwise the componentwise mean of
/// the samples is taken; an empty sample set has no mean and yields
/// [`AnalysisError::NoValidData`] even when a fixed position is given.
pub fn resolve(
    samples: &[PositionSample],
    fixed: Option<Geodetic>,
) -> Result<Reference, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::NoValidData { rejected: 0 });
    }

    if let Some(position) = fixed {
        return Ok(Reference {
            mode: ReferenceMode::Fixed,
            position,
        });
    }

    let component =
        |f: fn(&PositionSample) -> f64| mean(&samples.iter().map(f).collect::<Vec<_>>());
    let position = Geodetic::new(
        component(|s| s.position.latitude),
        component(|s| s.position.longitude),
        component(|s| s.position.altitude),
    )?;

    Ok(Reference {
        mode: ReferenceMode::Floating,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SampleDetail;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    fn sample(latitude: f64, longitude: f64, altitude: f64) -> PositionSample {
        PositionSample {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            position: Geodetic::new(latitude, longitude, altitude).unwrap(),
            satellite_count: 10,
            detail: SampleDetail::Rinex,
        }
    }

    #[test]
    fn fixed_reference_is_used_verbatim() {
        let base = Geodetic::new(50.0, 8.0, 100.0).unwrap();
        let reference = resolve(&[sample(49.0, 9.0, 0.0)], Some(base)).unwrap();
        assert_eq!(reference.mode, ReferenceMode::Fixed);
        assert_eq!(reference.position, base);
    }

    #[test]
    fn floating_reference_is_the_centroid() {
        let samples = [sample(50.0, 8.0, 100.0), sample(50.2, 8.4, 110.0)];
        let reference = resolve(&samples, None).unwrap();
        assert_eq!(reference.mode, ReferenceMode::Floating);
        assert_abs_diff_eq!(reference.position.latitude, 50.1, epsilon = 1e-12);
        assert_abs_diff_eq!(reference.position.longitude, 8.2, epsilon = 1e-12);
        assert_abs_diff_eq!(reference.position.altitude, 105.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_set_has_no_reference() {
        assert!(matches!(
            resolve(&[], None),
            Err(AnalysisError::NoValidData { .. })
        ));
        let base = Geodetic::new(50.0, 8.0, 100.0).unwrap();
        assert!(matches!(
            resolve(&[], Some(base)),
            Err(AnalysisError::NoValidData { .. })
        ));
    }

    #[test]
    fn mode_names() {
        assert_eq!(ReferenceMode::Fixed.to_string(), "fixed");
        assert_eq!(
            serde_json::to_string(&ReferenceMode::Floating).unwrap(),
            "\"floating\""
        );
    }
}
