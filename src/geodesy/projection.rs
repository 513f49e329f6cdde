//! Transverse Mercator projection on the WGS-84 ellipsoid.
//!
//! Uses the 6th-order Krüger series (Karney, 2011), which keeps errors well
//! below a millimetre anywhere inside a UTM zone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TransformError;
use super::types::{Geodetic, Planar};
use super::{ECCENTRICITY_SQ, FLATTENING, SEMI_MAJOR_AXIS_M};

const UTM_SCALE_FACTOR: f64 = 0.9996;
const UTM_FALSE_EASTING_M: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;
const ZONE_WIDTH_DEG: f64 = 6.0;
const MAX_INVERSE_ITERATIONS: usize = 10;

/// A UTM zone: number 1 to 60 plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtmZone {
    number: u8,
    north: bool,
}

impl UtmZone {
    pub fn new(number: u8, north: bool) -> Result<Self, TransformError> {
        if !(1..=60).contains(&number) {
            return Err(TransformError::InvalidZone(number.to_string()));
        }
        Ok(Self { number, north })
    }

    /// Zone containing the given position.
    pub fn from_geodetic(position: &Geodetic) -> Self {
        let raw = ((position.longitude + 180.0) / ZONE_WIDTH_DEG).floor() as i32 + 1;
        Self {
            number: raw.clamp(1, 60) as u8,
            north: position.latitude >= 0.0,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    pub fn central_meridian_deg(&self) -> f64 {
        f64::from(self.number) * ZONE_WIDTH_DEG - 183.0
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}

impl FromStr for UtmZone {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TransformError::InvalidZone(s.to_string());
        let hemisphere = s.chars().last().ok_or_else(invalid)?;
        let north = match hemisphere.to_ascii_uppercase() {
            'N' => true,
            'S' => false,
            _ => return Err(invalid()),
        };
        let number = s[..s.len() - 1].parse::<u8>().map_err(|_| invalid())?;
        Self::new(number, north)
    }
}

impl TryFrom<String> for UtmZone {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UtmZone> for String {
    fn from(zone: UtmZone) -> Self {
        zone.to_string()
    }
}

/// Transverse Mercator projection bound to one UTM zone.
///
/// Stateless once constructed: every run builds its own and projects the
/// reference and all samples through it.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    zone: UtmZone,
    central_meridian_rad: f64,
    false_northing: f64,
    rectifying_radius: f64,
    eccentricity: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl TransverseMercator {
    pub fn new(zone: UtmZone) -> Self {
        let n = FLATTENING / (2.0 - FLATTENING);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius =
            SEMI_MAJOR_AXIS_M / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1983433.0 * n6 / 1935360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167603.0 * n6 / 181440.0,
            49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
            34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
            212378941.0 * n6 / 319334400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1118711.0 * n6 / 3870720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
            4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
            20648693.0 * n6 / 638668800.0,
        ];

        Self {
            zone,
            central_meridian_rad: zone.central_meridian_deg().to_radians(),
            false_northing: if zone.is_north() {
                0.0
            } else {
                UTM_FALSE_NORTHING_SOUTH_M
            },
            rectifying_radius,
            eccentricity: ECCENTRICITY_SQ.sqrt(),
            alpha,
            beta,
        }
    }

    /// Projection in the zone containing `position`.
    pub fn for_position(position: &Geodetic) -> Self {
        Self::new(UtmZone::from_geodetic(position))
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    pub fn forward(&self, position: &Geodetic) -> Result<Planar, TransformError> {
        if position.latitude.abs() >= 90.0 {
            return Err(TransformError::LatitudeOutOfRange(position.latitude));
        }
        let e = self.eccentricity;
        let phi = position.lat_rad();
        let lambda = wrap_pi(position.lon_rad() - self.central_meridian_rad);

        let sin_phi = phi.sin();
        let tau = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
        let xi_prime = tau.atan2(lambda.cos());
        let eta_prime = (lambda.sin() / (1.0 + tau * tau).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let scale = UTM_SCALE_FACTOR * self.rectifying_radius;
        let planar = Planar {
            easting: UTM_FALSE_EASTING_M + scale * eta,
            northing: self.false_northing + scale * xi,
            altitude: position.altitude,
        };
        if !(planar.easting.is_finite() && planar.northing.is_finite()) {
            return Err(TransformError::NonFinite);
        }
        Ok(planar)
    }

    pub fn inverse(&self, planar: &Planar) -> Result<Geodetic, TransformError> {
        let e = self.eccentricity;
        let scale = UTM_SCALE_FACTOR * self.rectifying_radius;
        let xi = (planar.northing - self.false_northing) / scale;
        let eta = (planar.easting - UTM_FALSE_EASTING_M) / scale;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_prime.sinh();
        let cos_xi = xi_prime.cos();
        let tau_prime = xi_prime.sin() / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();
        let lambda = sinh_eta.atan2(cos_xi);

        let tau = solve_conformal_latitude(tau_prime, e).ok_or(TransformError::NoConvergence {
            easting: planar.easting,
            northing: planar.northing,
        })?;

        let longitude = wrap_pi(lambda + self.central_meridian_rad).to_degrees();
        Geodetic::new(tau.atan().to_degrees(), longitude, planar.altitude)
    }
}

/// Newton iteration for tan(φ) given the conformal tan(φ').
fn solve_conformal_latitude(tau_prime: f64, e: f64) -> Option<f64> {
    let one_minus_e2 = 1.0 - e * e;
    let mut tau = tau_prime;
    for _ in 0..MAX_INVERSE_ITERATIONS {
        let sqrt_1_tau2 = (1.0 + tau * tau).sqrt();
        let sigma = (e * (e * tau / sqrt_1_tau2).atanh()).sinh();
        let tau_i = tau * (1.0 + sigma * sigma).sqrt() - sigma * sqrt_1_tau2;
        let delta = (tau_prime - tau_i) / (1.0 + tau_i * tau_i).sqrt()
            * (1.0 + one_minus_e2 * tau * tau)
            / (one_minus_e2 * sqrt_1_tau2);
        tau += delta;
        if delta.abs() <= 1.0e-12 * tau.abs().max(1.0) {
            return Some(tau);
        }
    }
    None
}

fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU);
    wrapped - std::f64::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zone_from_longitude() {
        let zone = |lat, lon| UtmZone::from_geodetic(&Geodetic::new(lat, lon, 0.0).unwrap());
        assert_eq!(zone(48.0, 11.5).to_string(), "32N");
        assert_eq!(zone(-33.9, 18.4).to_string(), "34S");
        assert_eq!(zone(0.0, -180.0).number(), 1);
        assert_eq!(zone(0.0, 180.0).number(), 60);
        assert_eq!(zone(40.0, -74.0).central_meridian_deg(), -75.0);
    }

    #[test]
    fn zone_parsing() {
        let zone: UtmZone = "33N".parse().unwrap();
        assert_eq!(zone.number(), 33);
        assert!(zone.is_north());
        assert!(!"7s".parse::<UtmZone>().unwrap().is_north());
        assert!("61N".parse::<UtmZone>().is_err());
        assert!("33X".parse::<UtmZone>().is_err());
        assert!("".parse::<UtmZone>().is_err());
    }

    #[test]
    fn central_meridian_on_equator() {
        let tm = TransverseMercator::new(UtmZone::new(31, true).unwrap());
        let planar = tm.forward(&Geodetic::new(0.0, 3.0, 12.0).unwrap()).unwrap();
        assert_abs_diff_eq!(planar.easting, 500_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(planar.northing, 0.0, epsilon = 1e-6);
        assert_eq!(planar.altitude, 12.0);
    }

    #[test]
    fn meridian_arc_at_45_degrees() {
        // WGS-84 meridian distance to 45°N is 4 984 944.378 m.
        let tm = TransverseMercator::new(UtmZone::new(31, true).unwrap());
        let planar = tm.forward(&Geodetic::new(45.0, 3.0, 0.0).unwrap()).unwrap();
        assert_abs_diff_eq!(planar.northing, 0.9996 * 4_984_944.378, epsilon = 0.05);
    }

    #[test]
    fn southern_hemisphere_false_northing() {
        let tm = TransverseMercator::new(UtmZone::new(34, false).unwrap());
        let planar = tm.forward(&Geodetic::new(-33.9, 18.4, 0.0).unwrap()).unwrap();
        assert!(planar.northing > 6_000_000.0 && planar.northing < 6_500_000.0);
        assert!(planar.easting > 200_000.0 && planar.easting < 500_000.0);
    }

    #[test]
    fn forward_inverse_round_trip() {
        let position = Geodetic::new(49.79, 8.57, 180.0).unwrap();
        let tm = TransverseMercator::for_position(&position);
        let back = tm.inverse(&tm.forward(&position).unwrap()).unwrap();
        assert_abs_diff_eq!(back.latitude, position.latitude, epsilon = 1e-10);
        assert_abs_diff_eq!(back.longitude, position.longitude, epsilon = 1e-10);
        assert_eq!(back.altitude, position.altitude);
    }

    #[test]
    fn metric_offsets_survive_round_trip() {
        let origin = Geodetic::new(52.0, 13.0, 40.0).unwrap();
        let tm = TransverseMercator::for_position(&origin);
        let base = tm.forward(&origin).unwrap();
        let shifted = Planar {
            easting: base.easting + 3.0,
            northing: base.northing + 4.0,
            altitude: base.altitude,
        };
        let position = tm.inverse(&shifted).unwrap();
        let reprojected = tm.forward(&position).unwrap();
        assert_abs_diff_eq!(reprojected.horizontal_distance(&base), 5.0, epsilon = 1e-6);
    }
}
