use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use gnss_accuracy::analysis::{AnalysisError, Analyzer, ReferenceMode, SourceFormat};
use gnss_accuracy::config::Config;
use gnss_accuracy::geodesy::{ecef_to_geodetic, geodetic_to_ecef, Ecef, Geodetic};
use gnss_accuracy::parser::{ObservationEpoch, PositionSolver, RinexLoader, SolveError};

const XYZ_LINE: &str = concat!(
    "2024/03/15 12:00:00.000000   4094312.4000   617345.7000  4864789.0000   1  12",
    "   0.0100   0.0080   0.0150   0.0030   0.0050  -0.0020   0.00  999.9"
);

const RINEX_V3: &str = include_str!("data/base_v3.rnx");

fn analyzer() -> Analyzer {
    Analyzer::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gnss-accuracy-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn identical_xyz_fixes_have_zero_error() {
    let text = format!(
        "{}\n{}\n{}\n",
        XYZ_LINE,
        XYZ_LINE.replace("12:00:00", "12:00:01"),
        XYZ_LINE.replace("12:00:00", "12:00:02"),
    );
    let report = analyzer().analyze_xyz_reader(Cursor::new(text)).unwrap();

    assert_eq!(report.reference_mode, ReferenceMode::Floating);
    assert_eq!(report.num_points, 3);
    assert_eq!(report.rejected_records, 0);

    let expected = ecef_to_geodetic(&Ecef::new(4094312.4, 617345.7, 4864789.0)).unwrap();
    assert_eq!(report.reference_position, expected);

    for stats in [report.horizontal, report.vertical] {
        assert_eq!(stats.rmse, 0.0);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.min, 0.0);
    }

    let xyz = report.xyz_stats().unwrap();
    assert_eq!(xyz.num_points, 3);
    assert_abs_diff_eq!(xyz.duration, 2.0, epsilon = 1e-9);
    assert_eq!(xyz.std_position.unwrap().altitude, 0.0);
    let quality = report.solution_quality().unwrap();
    assert_abs_diff_eq!(quality.std_dev_x, 0.01, epsilon = 1e-12);
    assert_abs_diff_eq!(quality.std_dev_z, 0.015, epsilon = 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["format"], "xyz");
    assert!(json["xyz_stats"]["solution_types"].is_object());
    assert!(json["solution_quality"]["std_dev_y"].is_number());
}

#[test]
fn empty_xyz_is_no_valid_data() {
    let result = analyzer().analyze_xyz_reader(Cursor::new("% header only\n\n"));
    assert!(matches!(
        result,
        Err(AnalysisError::NoValidData { rejected: 0 })
    ));

    let short = XYZ_LINE.rsplit_once(' ').unwrap().0;
    let result = analyzer().analyze_xyz_reader(Cursor::new(short));
    assert!(matches!(
        result,
        Err(AnalysisError::NoValidData { rejected: 1 })
    ));
}

#[test]
fn ecef_round_trip_is_sub_millimetre() {
    let original = Ecef::new(4094312.4, 617345.7, 4864789.0);
    let back = geodetic_to_ecef(&ecef_to_geodetic(&original).unwrap());
    assert!(original.distance_to(&back) < 1e-3);
}

#[test]
fn rinex_without_solver_is_unsupported() {
    let path = temp_file("base.rnx", RINEX_V3);
    let result = analyzer().analyze_file(&path, None);
    assert!(matches!(result, Err(AnalysisError::UnsupportedOperation(_))));
}

struct ApproxPositionSolver(Geodetic);

impl PositionSolver for ApproxPositionSolver {
    fn solve(&self, _epoch: &ObservationEpoch) -> Result<Geodetic, SolveError> {
        Ok(self.0)
    }
}

#[test]
fn rinex_with_solver_produces_report() {
    let position = ecef_to_geodetic(&Ecef::new(4094312.4, 617345.7, 4864789.0)).unwrap();
    let loader = RinexLoader::with_solver(ApproxPositionSolver(position));
    let observations = loader.load_str(RINEX_V3).unwrap();

    let report = analyzer().analyze_rinex(&loader, &observations).unwrap();
    assert_eq!(report.format(), SourceFormat::Rinex);
    assert_eq!(report.num_points, 2);
    // The code-only epoch is rejected before solving.
    assert_eq!(report.rejected_records, 1);
    assert_eq!(report.horizontal.max, 0.0);
    assert!(report.xyz_stats().is_none());
}

struct DivergingSolver;

impl PositionSolver for DivergingSolver {
    fn solve(&self, _epoch: &ObservationEpoch) -> Result<Geodetic, SolveError> {
        Err(SolveError::Failed("least squares did not converge".into()))
    }
}

#[test]
fn rinex_with_failing_solver_is_no_valid_data() {
    let loader = RinexLoader::with_solver(DivergingSolver);
    let observations = loader.load_str(RINEX_V3).unwrap();
    assert!(matches!(
        analyzer().analyze_rinex(&loader, &observations),
        Err(AnalysisError::NoValidData { rejected: 3 })
    ));
}

#[test]
fn nmea_file_with_station_reference() {
    let config = Config::from_yaml(
        r#"
stations:
  - id: munich
    name: Munich
    coordinates: "48.1173, 11.516666666666667"
    altitude_m: 545.4
analysis:
  utm_zone: 32N
"#,
    )
    .unwrap();
    let base = config.station_position("munich").unwrap();

    let nmea = "\
$GPGSV,2,1,08,01,40,083,46*75
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47
$GPGGA,123519,4807.038,N,01131.000,E,0,08,0.9,545.4,M,46.9,M,,*46
$GPGGA,123520,4807.038,N,01131.000,E,1,08,0.9,546.4,M,46.9,M,,
";
    let path = temp_file("rover.nmea", nmea);
    let record = analyzer()
        .with_zone(config.analysis.utm_zone.unwrap())
        .with_fixed_reference(base)
        .record_file(&path, None)
        .unwrap();

    assert_eq!(record.source, "rover.nmea");
    assert!(record.id.len() > 36);
    let report = &record.report;
    assert_eq!(report.reference_mode, ReferenceMode::Fixed);
    assert_eq!(report.num_points, 2);
    assert_eq!(report.rejected_records, 1);
    assert_abs_diff_eq!(report.horizontal.max, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.vertical.max, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.vertical.min, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.vertical.mean, 0.5, epsilon = 1e-9);
}

#[test]
fn unknown_extension_is_rejected() {
    let path = temp_file("track.gpx", "<gpx/>");
    assert!(matches!(
        analyzer().analyze_file(&path, None),
        Err(AnalysisError::UnsupportedFormat(_))
    ));
}
