//! Positioning accuracy analysis for GNSS receiver output.
//!
//! Parses NMEA, ECEF solution (XYZ) and RINEX observation files into
//! timestamped positions and measures their horizontal and vertical error
//! against a fixed or floating reference.

pub mod analysis;
pub mod config;
pub mod geodesy;
pub mod parser;
