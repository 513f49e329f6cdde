//! RINEX observation loader.
//!
//! Parsing (RINEX 2.x, 3.x and Hatanaka-compressed CRINEX) is delegated to
//! the `rinex` crate. Turning an epoch into a position requires a
//! pseudorange solver, which is plugged in through [`PositionSolver`]; the
//! default one reports every epoch as unsupported.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ::rinex::prelude::obs::{EpochFlag, ObsKey, Observations, SignalObservation};
use ::rinex::prelude::{Observable, Rinex, SV};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::error::ParseError;
use super::types::{PositionSample, SampleDetail};
use crate::geodesy::Geodetic;

/// One sampling epoch with its signal observations.
#[derive(Debug, Clone)]
pub struct ObservationEpoch {
    /// UTC, converted from the file's GNSS time scale.
    pub timestamp: DateTime<Utc>,
    pub flag: EpochFlag,
    pub signals: Vec<SignalObservation>,
}

impl ObservationEpoch {
    fn new(key: &ObsKey, observations: &Observations) -> Result<Self, ParseError> {
        let micros = (key.epoch.to_unix_seconds() * 1.0e6).round();
        let timestamp = DateTime::from_timestamp_micros(micros as i64)
            .ok_or_else(|| ParseError::Epoch(key.epoch.to_string()))?;
        Ok(Self {
            timestamp,
            flag: key.flag,
            signals: observations.signals.clone(),
        })
    }

    /// Observed satellites, sorted and deduplicated.
    pub fn satellites(&self) -> Vec<SV> {
        let mut satellites: Vec<SV> = self.signals.iter().map(|s| s.sv).collect();
        satellites.sort();
        satellites.dedup();
        satellites
    }

    /// Satellites tracked with both a pseudorange and a carrier phase.
    pub fn ranging_satellites(&self) -> Vec<SV> {
        self.satellites()
            .into_iter()
            .filter(|sv| {
                let mut signals = self.signals.iter().filter(|s| s.sv == *sv);
                let code = signals
                    .clone()
                    .any(|s| matches!(s.observable, Observable::PseudoRange(_)));
                code && signals.any(|s| matches!(s.observable, Observable::PhaseRange(_)))
            })
            .collect()
    }

    pub fn pseudoranges(&self) -> impl Iterator<Item = (SV, f64)> + '_ {
        self.signals.iter().filter_map(|s| match s.observable {
            Observable::PseudoRange(_) => Some((s.sv, s.value)),
            _ => None,
        })
    }

    /// Power failures and cycle slips still carry usable observations.
    pub fn carries_observations(&self) -> bool {
        matches!(
            self.flag,
            EpochFlag::Ok | EpochFlag::PowerFailure | EpochFlag::CycleSlip
        )
    }
}

#[derive(Debug, Clone)]
pub struct RinexObservations {
    pub version_major: u8,
    /// In chronological order.
    pub epochs: Vec<ObservationEpoch>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("pseudorange position solving is not available")]
    Unsupported,
    #[error("no satellite with both pseudorange and phase observations")]
    MissingObservables,
    #[error("solution failed: {0}")]
    Failed(String),
}

/// Computes a receiver position from one epoch of observations.
pub trait PositionSolver {
    fn solve(&self, epoch: &ObservationEpoch) -> Result<Geodetic, SolveError>;
}

/// Solver used when no point-positioning engine is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSolver;

impl PositionSolver for UnavailableSolver {
    fn solve(&self, _epoch: &ObservationEpoch) -> Result<Geodetic, SolveError> {
        Err(SolveError::Unsupported)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochFailure {
    pub timestamp: DateTime<Utc>,
    pub error: SolveError,
}

/// Per-epoch solving outcome.
#[derive(Debug, Clone, Default)]
pub struct RinexPositions {
    pub samples: Vec<PositionSample>,
    pub failures: Vec<EpochFailure>,
}

impl RinexPositions {
    pub fn unsupported_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.error == SolveError::Unsupported)
            .count()
    }
}

pub struct RinexLoader<S = UnavailableSolver> {
    solver: S,
}

impl RinexLoader<UnavailableSolver> {
    pub fn new() -> Self {
        Self {
            solver: UnavailableSolver,
        }
    }
}

impl Default for RinexLoader<UnavailableSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PositionSolver> RinexLoader<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn load_file(&self, path: &Path) -> Result<RinexObservations, ParseError> {
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    pub fn load_str(&self, content: &str) -> Result<RinexObservations, ParseError> {
        self.load_reader(BufReader::new(content.as_bytes()))
    }

    pub fn load_reader<R: Read>(
        &self,
        mut reader: BufReader<R>,
    ) -> Result<RinexObservations, ParseError> {
        let rinex = Rinex::parse(&mut reader).map_err(|e| ParseError::Rinex(e.to_string()))?;
        if !rinex.is_observation_rinex() {
            return Err(ParseError::NotObservation(format!(
                "{:?}",
                rinex.header.rinex_type
            )));
        }

        let epochs = rinex
            .observations_iter()
            .map(|(key, observations)| ObservationEpoch::new(key, observations))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Loaded {} RINEX {} epochs",
            epochs.len(),
            rinex.header.version.major
        );

        Ok(RinexObservations {
            version_major: rinex.header.version.major,
            epochs,
        })
    }

    /// Attempts a position for every observation epoch. Epochs without a
    /// satellite carrying both pseudorange and phase never reach the solver.
    pub fn positions(&self, observations: &RinexObservations) -> RinexPositions {
        let mut result = RinexPositions::default();

        for epoch in observations
            .epochs
            .iter()
            .filter(|e| e.carries_observations())
        {
            let ranging = epoch.ranging_satellites();
            let solved = if ranging.is_empty() {
                Err(SolveError::MissingObservables)
            } else {
                self.solver.solve(epoch)
            };

            match solved {
                Ok(position) => result.samples.push(PositionSample {
                    timestamp: epoch.timestamp,
                    position,
                    satellite_count: ranging.len() as u32,
                    detail: SampleDetail::Rinex,
                }),
                Err(error) => {
                    log::debug!("RINEX epoch {}: {}", epoch.timestamp, error);
                    result.failures.push(EpochFailure {
                        timestamp: epoch.timestamp,
                        error,
                    })
                }
            }
        }

        if !result.failures.is_empty() {
            log::warn!(
                "{} of {} RINEX epochs produced no position",
                result.failures.len(),
                result.failures.len() + result.samples.len()
            );
        }
        result
    }
}
