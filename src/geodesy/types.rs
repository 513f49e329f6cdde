use serde::{Deserialize, Serialize};

use super::error::TransformError;

/// WGS-84 geodetic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Result<Self, TransformError> {
        if !(latitude.is_finite() && longitude.is_finite() && altitude.is_finite()) {
            return Err(TransformError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TransformError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TransformError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
        })
    }

    /// Parses `"lat, lon"` with an optional altitude, as stored in station registries.
    pub fn from_coordinates(coordinates: &str, altitude: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        let alt = match (parts.len(), altitude) {
            (2, alt) => alt.unwrap_or(0.0),
            (3, None) => parts[2].parse().ok()?,
            _ => return None,
        };
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Self::new(lat, lon, alt).ok()
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude.to_radians()
    }
}

/// Earth-centred, earth-fixed cartesian position in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: &Ecef) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Projected position: easting/northing in meters, altitude passed through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Planar {
    pub easting: f64,
    pub northing: f64,
    pub altitude: f64,
}

impl Planar {
    pub fn horizontal_distance(&self, other: &Planar) -> f64 {
        (self.easting - other.easting).hypot(self.northing - other.northing)
    }

    pub fn vertical_distance(&self, other: &Planar) -> f64 {
        (self.altitude - other.altitude).abs()
    }
}
