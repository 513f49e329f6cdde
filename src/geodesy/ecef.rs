use map_3d::{ecef2geodetic, geodetic2ecef, Ellipsoid};

use super::error::TransformError;
use super::types::{Ecef, Geodetic};
use super::{ECCENTRICITY_SQ, SEMI_MAJOR_AXIS_M};

/// Anything closer to the geocentre than this has no meaningful geodetic position.
const MIN_ECEF_RADIUS_M: f64 = 1.0;
const LATITUDE_TOLERANCE_RAD: f64 = 1.0e-14;
const MAX_REFINEMENTS: usize = 4;

/// Converts an ECEF position to WGS-84 latitude, longitude and ellipsoidal height.
pub fn ecef_to_geodetic(ecef: &Ecef) -> Result<Geodetic, TransformError> {
    let Ecef { x, y, z } = *ecef;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(TransformError::NonFinite);
    }
    if ecef.norm() < MIN_ECEF_RADIUS_M {
        return Err(TransformError::DegenerateEcef { x, y, z });
    }

    let (lat_seed, lon, _) = ecef2geodetic(x, y, z, Ellipsoid::WGS84);
    if !(lat_seed.is_finite() && lon.is_finite()) {
        return Err(TransformError::DegenerateEcef { x, y, z });
    }

    // Fixed-point passes on the closed-form seed; each pass shrinks the error by ~e².
    let p = x.hypot(y);
    let mut lat = lat_seed;
    for _ in 0..MAX_REFINEMENTS {
        let sin_lat = lat.sin();
        let n = SEMI_MAJOR_AXIS_M / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        let next = (z + ECCENTRICITY_SQ * n * sin_lat).atan2(p);
        let delta = (next - lat).abs();
        lat = next;
        if delta < LATITUDE_TOLERANCE_RAD {
            break;
        }
    }

    let sin_lat = lat.sin();
    let alt = p * lat.cos() + z * sin_lat
        - SEMI_MAJOR_AXIS_M * (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

    Geodetic::new(lat.to_degrees(), lon.to_degrees(), alt)
}

pub fn geodetic_to_ecef(position: &Geodetic) -> Ecef {
    let (x, y, z) = geodetic2ecef(
        position.lat_rad(),
        position.lon_rad(),
        position.altitude,
        Ellipsoid::WGS84,
    );
    Ecef { x, y, z }
}
