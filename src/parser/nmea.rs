use chrono::{NaiveDate, NaiveTime};

use super::error::{MalformedInput, ParseError};
use super::types::{NmeaFix, Parsed, PositionSample, SampleDetail};
use crate::geodesy::Geodetic;

const GGA_TALKERS: [&str; 2] = ["$GNGGA", "$GPGGA"];
// Sentence id through altitude
const GGA_MIN_FIELDS: usize = 10;

/// Extracts fixes from GGA sentences of a newline-delimited NMEA stream.
///
/// GGA carries time of day only, so every sample is dated with
/// `fallback_date` and flagged as such.
#[derive(Debug, Clone)]
pub struct NmeaParser {
    fallback_date: NaiveDate,
}

impl NmeaParser {
    pub fn new(fallback_date: NaiveDate) -> Self {
        Self { fallback_date }
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Parsed, ParseError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.parse_str(text))
    }

    pub fn parse_str(&self, text: &str) -> Parsed {
        let mut parsed = Parsed::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if !GGA_TALKERS.iter().any(|talker| line.starts_with(talker)) {
                continue;
            }
            match self.parse_gga(line) {
                Ok(sample) => parsed.samples.push(sample),
                Err(reason) => {
                    log::debug!("Skipping NMEA line {}: {}", index + 1, reason);
                    parsed.reject(index + 1, reason);
                }
            }
        }

        parsed
    }

    pub fn parse_gga(&self, sentence: &str) -> Result<PositionSample, MalformedInput> {
        let body = verify_checksum(sentence)?;
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() < GGA_MIN_FIELDS {
            return Err(MalformedInput::TooFewFields {
                minimum: GGA_MIN_FIELDS,
                found: fields.len(),
            });
        }

        let fix_quality = required(fields[6], "fix quality")?;
        let fix_quality: u8 = fix_quality
            .parse()
            .map_err(|_| MalformedInput::invalid("fix quality", fix_quality))?;
        if fix_quality == 0 {
            return Err(MalformedInput::NoFix(fix_quality));
        }

        let time = parse_time(required(fields[1], "time")?)?;
        let latitude = parse_angle(fields[2], fields[3], 2, ('N', 'S'), "latitude")?;
        let longitude = parse_angle(fields[4], fields[5], 3, ('E', 'W'), "longitude")?;

        let satellite_count = match fields[7] {
            "" => 0,
            s => s
                .parse()
                .map_err(|_| MalformedInput::invalid("satellite count", s))?,
        };
        let hdop = match fields[8] {
            "" => None,
            s => Some(parse_finite(s, "hdop")?),
        };
        let altitude = parse_finite(required(fields[9], "altitude")?, "altitude")?;

        Ok(PositionSample {
            timestamp: self.fallback_date.and_time(time).and_utc(),
            position: Geodetic::new(latitude, longitude, altitude)?,
            satellite_count,
            detail: SampleDetail::Nmea(NmeaFix {
                fix_quality,
                hdop,
                date_inferred: true,
            }),
        })
    }
}

/// Returns the sentence without its `*hh` suffix, checking it when present.
fn verify_checksum(sentence: &str) -> Result<&str, MalformedInput> {
    let Some((body, checksum)) = sentence.split_once('*') else {
        return Ok(sentence);
    };
    let checksum = checksum.trim();
    let expected = u8::from_str_radix(checksum, 16)
        .ok()
        .filter(|_| checksum.len() == 2)
        .ok_or_else(|| MalformedInput::invalid("checksum", checksum))?;
    let computed = body
        .strip_prefix('$')
        .unwrap_or(body)
        .bytes()
        .fold(0u8, |acc, b| acc ^ b);
    if computed != expected {
        return Err(MalformedInput::Checksum { expected, computed });
    }
    Ok(body)
}

fn required<'a>(field: &'a str, name: &'static str) -> Result<&'a str, MalformedInput> {
    if field.is_empty() {
        Err(MalformedInput::MissingField(name))
    } else {
        Ok(field)
    }
}

fn parse_finite(s: &str, field: &'static str) -> Result<f64, MalformedInput> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedInput::invalid(field, s))
}

/// `hhmmss[.sss]`
fn parse_time(s: &str) -> Result<NaiveTime, MalformedInput> {
    let invalid = || MalformedInput::invalid("time", s);
    if s.len() < 6 || !s.is_char_boundary(2) || !s.is_char_boundary(4) {
        return Err(invalid());
    }
    let hour: u32 = s[0..2].parse().map_err(|_| invalid())?;
    let minute: u32 = s[2..4].parse().map_err(|_| invalid())?;
    let seconds: f64 = s[4..].parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }
    let whole = seconds.trunc();
    let micros = ((seconds - whole) * 1.0e6).round().min(999_999.0) as u32;
    NaiveTime::from_hms_micro_opt(hour, minute, whole as u32, micros).ok_or_else(invalid)
}

/// `(d)ddmm.mmmm` plus hemisphere letter to signed decimal degrees.
fn parse_angle(
    value: &str,
    hemisphere: &str,
    degree_digits: usize,
    (positive, negative): (char, char),
    field: &'static str,
) -> Result<f64, MalformedInput> {
    let value = required(value, field)?;
    let invalid = || MalformedInput::invalid(field, value);

    let point = value.find('.').unwrap_or(value.len());
    if point < degree_digits || !value.is_ascii() {
        return Err(invalid());
    }
    let degrees: f64 = value[..point - 2].parse().map_err(|_| invalid())?;
    let minutes: f64 = value[point - 2..].parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid());
    }
    let magnitude = degrees + minutes / 60.0;

    match hemisphere.chars().next() {
        Some(c) if c == positive => Ok(magnitude),
        Some(c) if c == negative => Ok(-magnitude),
        _ => Err(MalformedInput::invalid("hemisphere", hemisphere)),
    }
}
