use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::geodesy::{Geodetic, UtmZone};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid coordinates for station {id}: {coordinates:?}")]
    InvalidCoordinates { id: String, coordinates: String },
    #[error("Unknown or inactive station: {0}")]
    UnknownStation(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stations: Vec<StationConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Fixed projection zone such as `33N`.
    pub utm_zone: Option<UtmZone>,
}

/// Base station with a surveyed position.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub id: String,
    pub name: String,
    /// `"lat, lon"` in decimal degrees.
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StationConfig {
    pub fn position(&self) -> Result<Geodetic, ConfigError> {
        Geodetic::from_coordinates(&self.coordinates, Some(self.altitude_m)).ok_or_else(|| {
            ConfigError::InvalidCoordinates {
                id: self.id.clone(),
                coordinates: self.coordinates.clone(),
            }
        })
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        for station in &config.stations {
            station.position()?;
        }
        Ok(config)
    }

    pub fn active_stations(&self) -> impl Iterator<Item = &StationConfig> {
        self.stations.iter().filter(|s| s.is_active)
    }

    pub fn find_station(&self, id: &str) -> Option<&StationConfig> {
        self.active_stations().find(|s| s.id == id)
    }

    /// Surveyed position of an active station.
    pub fn station_position(&self, id: &str) -> Result<Geodetic, ConfigError> {
        self.find_station(id)
            .ok_or_else(|| ConfigError::UnknownStation(id.to_string()))?
            .position()
    }
}
