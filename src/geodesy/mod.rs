mod ecef;
mod error;
mod projection;
mod types;

pub use ecef::{ecef_to_geodetic, geodetic_to_ecef};
pub use error::TransformError;
pub use projection::{TransverseMercator, UtmZone};
pub use types::{Ecef, Geodetic, Planar};

// WGS-84 constants
pub const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;
pub const ECCENTRICITY_SQ: f64 = FLATTENING * (2.0 - FLATTENING);
