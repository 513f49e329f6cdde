use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("degenerate ECEF position ({x}, {y}, {z})")]
    DegenerateEcef { x: f64, y: f64, z: f64 },
    #[error("non-finite coordinate")]
    NonFinite,
    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f64),
    #[error("invalid UTM zone: {0}")]
    InvalidZone(String),
    #[error("projection did not converge at ({easting}, {northing})")]
    NoConvergence { easting: f64, northing: f64 },
}
