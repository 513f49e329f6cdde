mod error;
mod nmea;
mod observation;
mod statistics;
mod types;
mod xyz;

pub use error::{MalformedInput, ParseError};
pub use nmea::NmeaParser;
pub use observation::{
    EpochFailure, ObservationEpoch, PositionSolver, RinexLoader, RinexObservations,
    RinexPositions, SolveError, UnavailableSolver,
};
pub use statistics::{AxisMeans, PositionMoments, XyzStatistics};
pub(crate) use statistics::mean;
pub use types::{NmeaFix, Parsed, PositionSample, Rejection, SampleDetail, XyzSolution};
pub use xyz::{XyzFile, XyzLine, XyzParser};
