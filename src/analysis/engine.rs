use std::fs;
use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;

use super::aggregate::xyz_details;
use super::error::AnalysisError;
use super::format::SourceFormat;
use super::metrics::{compute, AccuracyMetrics};
use super::reference::{resolve, Reference};
use super::report::{AccuracyReport, FormatDetails};
use crate::geodesy::{Geodetic, TransverseMercator, UtmZone};
use crate::parser::{
    NmeaParser, PositionSample, PositionSolver, RinexLoader, RinexObservations, XyzFile,
    XyzParser,
};

/// Runs one analysis per call; holds only run configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    processing_date: NaiveDate,
    fixed_reference: Option<Geodetic>,
    zone: Option<UtmZone>,
}

impl Analyzer {
    /// `processing_date` dates NMEA fixes, which carry time of day only.
    pub fn new(processing_date: NaiveDate) -> Self {
        Self {
            processing_date,
            fixed_reference: None,
            zone: None,
        }
    }

    pub fn with_fixed_reference(mut self, reference: Geodetic) -> Self {
        self.fixed_reference = Some(reference);
        self
    }

    /// Fixed reference from a `"lat,lon,alt"` triple.
    pub fn with_reference_coordinates(self, triple: &str) -> Result<Self, AnalysisError> {
        let parts = triple.split(',').count();
        match Geodetic::from_coordinates(triple, None) {
            Some(position) if parts == 3 => Ok(self.with_fixed_reference(position)),
            _ => Err(AnalysisError::InvalidReference(format!(
                "{:?}, expected \"lat,lon,alt\"",
                triple
            ))),
        }
    }

    /// Pins the projection zone instead of deriving it from the reference.
    pub fn with_zone(mut self, zone: UtmZone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn analyze_file(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
    ) -> Result<AccuracyReport, AnalysisError> {
        let format = match format {
            Some(format) => format,
            None => SourceFormat::from_path(path)?,
        };
        log::info!("Analyzing {} as {}", path.display(), format);

        match format {
            SourceFormat::Nmea => {
                let bytes = fs::read(path).map_err(|e| AnalysisError::DataFormat(e.into()))?;
                self.analyze_nmea(&bytes)
            }
            SourceFormat::Xyz => self.analyze_xyz(XyzParser::new().parse_file(path)?),
            SourceFormat::Rinex => {
                let loader = RinexLoader::new();
                let observations = loader.load_file(path)?;
                self.analyze_rinex(&loader, &observations)
            }
        }
    }

    pub fn analyze_nmea(&self, payload: &[u8]) -> Result<AccuracyReport, AnalysisError> {
        let parsed = NmeaParser::new(self.processing_date).parse_bytes(payload)?;
        let (reference, metrics) = self.evaluate(&parsed.samples, parsed.rejected_count())?;
        Ok(AccuracyReport::new(
            reference,
            metrics,
            parsed.rejected_count(),
            FormatDetails::Nmea,
        ))
    }

    pub fn analyze_xyz_reader<R: BufRead>(
        &self,
        reader: R,
    ) -> Result<AccuracyReport, AnalysisError> {
        self.analyze_xyz(XyzParser::new().parse_reader(reader)?)
    }

    pub fn analyze_xyz(&self, file: XyzFile) -> Result<AccuracyReport, AnalysisError> {
        let rejected = file.parsed.rejected_count();
        let (reference, metrics) = self.evaluate(&file.parsed.samples, rejected)?;
        let statistics = file
            .statistics
            .ok_or(AnalysisError::NoValidData { rejected })?;
        Ok(AccuracyReport::new(
            reference,
            metrics,
            rejected,
            xyz_details(statistics),
        ))
    }

    /// Fails with [`AnalysisError::UnsupportedOperation`] when no epoch
    /// yields a position and the solver declined at least one of them.
    pub fn analyze_rinex<S: PositionSolver>(
        &self,
        loader: &RinexLoader<S>,
        observations: &RinexObservations,
    ) -> Result<AccuracyReport, AnalysisError> {
        let positions = loader.positions(observations);
        let rejected = positions.failures.len();
        let unsupported = positions.unsupported_count();
        if positions.samples.is_empty() && unsupported > 0 {
            return Err(AnalysisError::UnsupportedOperation(format!(
                "RINEX position solving produced no positions ({} epochs, {} unsupported)",
                rejected, unsupported
            )));
        }

        let (reference, metrics) = self.evaluate(&positions.samples, rejected)?;
        Ok(AccuracyReport::new(
            reference,
            metrics,
            rejected,
            FormatDetails::Rinex,
        ))
    }

    fn evaluate(
        &self,
        samples: &[PositionSample],
        rejected: usize,
    ) -> Result<(Reference, AccuracyMetrics), AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::NoValidData { rejected });
        }

        let reference = resolve(samples, self.fixed_reference)?;
        let projection = match self.zone {
            Some(zone) => TransverseMercator::new(zone),
            None => TransverseMercator::for_position(&reference.position),
        };
        let metrics = compute(samples, &reference, &projection)?;

        log::info!(
            "{} points ({} rejected), {} reference, zone {}: \
             horizontal RMSE {:.3} m, vertical RMSE {:.3} m",
            metrics.num_points,
            rejected,
            reference.mode,
            metrics.zone,
            metrics.horizontal.rmse,
            metrics.vertical.rmse
        );
        Ok((reference, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ReferenceMode;
    use std::io::Cursor;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    fn analyzer() -> Analyzer {
        Analyzer::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    #[test]
    fn nmea_report_has_no_xyz_blocks() {
        let report = analyzer()
            .analyze_nmea(format!("{}\n{}\n$GPGGA,bad\n", GGA, GGA).as_bytes())
            .unwrap();
        assert_eq!(report.format(), SourceFormat::Nmea);
        assert_eq!(report.num_points, 2);
        assert_eq!(report.rejected_records, 1);
        assert_eq!(report.horizontal.max, 0.0);
        assert!(report.xyz_stats().is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "nmea");
        assert_eq!(json["reference_mode"], "floating");
        assert_eq!(json["utm_zone"], "32N");
        assert!(json.get("xyz_stats").is_none());
        assert!(json.get("solution_quality").is_none());
    }

    #[test]
    fn all_rejected_is_no_valid_data() {
        let result = analyzer().analyze_nmea(b"$GPGGA,bad\n$GPGGA,worse\n");
        assert!(matches!(
            result,
            Err(AnalysisError::NoValidData { rejected: 2 })
        ));
    }

    #[test]
    fn pinned_zone_overrides_derived_zone() {
        let report = analyzer()
            .with_zone("33N".parse().unwrap())
            .analyze_nmea(GGA.as_bytes())
            .unwrap();
        assert_eq!(report.utm_zone.to_string(), "33N");
    }

    #[test]
    fn fixed_reference_is_reported() {
        let base = Geodetic::new(48.1173, 11.51666, 540.0).unwrap();
        let report = analyzer()
            .with_fixed_reference(base)
            .analyze_nmea(GGA.as_bytes())
            .unwrap();
        assert_eq!(report.reference_mode, ReferenceMode::Fixed);
        assert_eq!(report.reference_position, base);
        assert!((report.vertical.mean - 5.4).abs() < 1e-6);
        assert!(report.horizontal.mean > 0.0 && report.horizontal.mean < 1.0);
    }

    #[test]
    fn reference_triple_must_be_complete() {
        let report = analyzer()
            .with_reference_coordinates("48.1173, 11.51666, 540.0")
            .unwrap()
            .analyze_nmea(GGA.as_bytes())
            .unwrap();
        assert_eq!(report.reference_mode, ReferenceMode::Fixed);

        for bad in ["48.1, 11.5", "95.0,11.5,0", "a,b,c"] {
            assert!(matches!(
                analyzer().with_reference_coordinates(bad),
                Err(AnalysisError::InvalidReference(_))
            ));
        }
    }

    #[test]
    fn xyz_geocentre_is_a_transform_failure() {
        let line = "2024/03/15 12:00:00.000 0.0 0.0 0.0 1 12 \
                    0.01 0.01 0.01 0.0 0.0 0.0 0.0 1.0";
        assert!(matches!(
            analyzer().analyze_xyz_reader(Cursor::new(line)),
            Err(AnalysisError::TransformFailure { line: Some(1), .. })
        ));
    }
}
