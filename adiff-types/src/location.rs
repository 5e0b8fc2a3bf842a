//! Fixed-point coordinates and bounding boxes.
//!
//! Coordinates are held as integers in units of 1e-7 degrees, the precision
//! OSM itself uses. Equality is exact, so comparing an old and a new node
//! position never trips over float formatting noise.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Number of fixed-point units per degree.
pub const COORDINATE_SCALE: i64 = 10_000_000;

const FRACTION_DIGITS: usize = 7;

/// A latitude/longitude pair in 1e-7 degree units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    lat: i32,
    lon: i32,
}

impl Location {
    /// Creates a location from raw fixed-point components.
    #[must_use]
    pub const fn from_fixed(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Creates a location from degrees, rounding to the fixed-point grid.
    ///
    /// Fails for values that are not finite or do not fit the grid.
    pub fn from_degrees(lat: f64, lon: f64) -> crate::Result<Self> {
        Ok(Self {
            lat: degrees_to_fixed(lat)?,
            lon: degrees_to_fixed(lon)?,
        })
    }

    /// Parses a location from its textual latitude and longitude.
    pub fn parse(lat: &str, lon: &str) -> crate::Result<Self> {
        Ok(Self {
            lat: parse_fixed(lat)?,
            lon: parse_fixed(lon)?,
        })
    }

    #[must_use]
    pub const fn lat_fixed(&self) -> i32 {
        self.lat
    }

    #[must_use]
    pub const fn lon_fixed(&self) -> i32 {
        self.lon
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat as f64 / COORDINATE_SCALE as f64
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon as f64 / COORDINATE_SCALE as f64
    }

    /// Latitude formatted for output (`51.5`, `-0.1234567`, `1.0`).
    #[must_use]
    pub fn lat_string(&self) -> String {
        format_fixed(self.lat)
    }

    /// Longitude formatted for output.
    #[must_use]
    pub fn lon_string(&self) -> String {
        format_fixed(self.lon)
    }
}

/// The minimal rectangle enclosing a set of locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    min: Location,
    max: Location,
}

impl Bounds {
    /// Creates bounds covering a single location.
    #[must_use]
    pub const fn at(location: Location) -> Self {
        Self {
            min: location,
            max: location,
        }
    }

    /// Computes the bounds of a set of locations, or `None` if it is empty.
    pub fn from_locations<I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Location>,
    {
        let mut iter = locations.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::at(first), |mut bounds, loc| {
            bounds.extend(loc);
            bounds
        }))
    }

    /// Grows the rectangle to include `location`.
    pub fn extend(&mut self, location: Location) {
        self.min.lat = self.min.lat.min(location.lat);
        self.min.lon = self.min.lon.min(location.lon);
        self.max.lat = self.max.lat.max(location.lat);
        self.max.lon = self.max.lon.max(location.lon);
    }

    /// South-west corner.
    #[must_use]
    pub const fn min(&self) -> Location {
        self.min
    }

    /// North-east corner.
    #[must_use]
    pub const fn max(&self) -> Location {
        self.max
    }

    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.min.lat()
    }

    #[must_use]
    pub fn min_lon(&self) -> f64 {
        self.min.lon()
    }

    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.max.lat()
    }

    #[must_use]
    pub fn max_lon(&self) -> f64 {
        self.max.lon()
    }
}

/// Parses a decimal degree string into 1e-7 units.
///
/// Plain decimals are parsed exactly (rounding half away from zero past the
/// seventh fractional digit); anything else falls back to `f64` parsing.
fn degrees_to_fixed(degrees: f64) -> crate::Result<i32> {
    let scaled = (degrees * COORDINATE_SCALE as f64).round();
    if !scaled.is_finite() || scaled < f64::from(i32::MIN) || scaled > f64::from(i32::MAX) {
        return Err(Error::InvalidCoordinate(degrees.to_string()));
    }
    Ok(scaled as i32)
}

fn parse_fixed(s: &str) -> crate::Result<i32> {
    let invalid = || Error::InvalidCoordinate(s.to_string());
    let trimmed = s.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let plain = !int_part.is_empty() || !frac_part.is_empty();
    let all_digits = int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit());

    let magnitude: i64 = if plain && all_digits {
        let int_value: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut frac_value: i64 = 0;
        for (i, b) in frac_part.bytes().take(FRACTION_DIGITS).enumerate() {
            frac_value += i64::from(b - b'0') * 10_i64.pow((FRACTION_DIGITS - 1 - i) as u32);
        }
        let round_up = frac_part
            .as_bytes()
            .get(FRACTION_DIGITS)
            .is_some_and(|b| *b >= b'5');
        int_value
            .checked_mul(COORDINATE_SCALE)
            .and_then(|v| v.checked_add(frac_value + i64::from(round_up)))
            .ok_or_else(invalid)?
    } else {
        let value: f64 = digits.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        (value * COORDINATE_SCALE as f64).round() as i64
    };

    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).map_err(|_| invalid())
}

/// Formats 1e-7 units as a decimal, trimming trailing zeros but keeping at
/// least one fractional digit.
fn format_fixed(value: i32) -> String {
    let magnitude = i64::from(value).abs();
    let int_part = magnitude / COORDINATE_SCALE;
    let frac_part = magnitude % COORDINATE_SCALE;

    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    let _ = write!(out, "{int_part}.");
    let frac = format!("{frac_part:0width$}", width = FRACTION_DIGITS);
    let trimmed = frac.trim_end_matches('0');
    out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimals_exactly() {
        assert_eq!(parse_fixed("51.5").unwrap(), 515_000_000);
        assert_eq!(parse_fixed("-0.1234567").unwrap(), -1_234_567);
        assert_eq!(parse_fixed("180").unwrap(), 1_800_000_000);
        assert_eq!(parse_fixed(".5").unwrap(), 5_000_000);
    }

    #[test]
    fn rounds_past_seventh_digit() {
        assert_eq!(parse_fixed("0.00000005").unwrap(), 1);
        assert_eq!(parse_fixed("0.00000004").unwrap(), 0);
        assert_eq!(parse_fixed("-0.00000005").unwrap(), -1);
    }

    #[test]
    fn falls_back_to_float_for_exponents() {
        assert_eq!(parse_fixed("1e-1").unwrap(), 1_000_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_fixed("").is_err());
        assert!(parse_fixed("abc").is_err());
        assert!(parse_fixed("1.2.3").is_err());
        assert!(parse_fixed("NaN").is_err());
        assert!(parse_fixed("999").is_err());
    }

    #[test]
    fn formats_with_one_fractional_digit_minimum() {
        assert_eq!(format_fixed(10_000_000), "1.0");
        assert_eq!(format_fixed(0), "0.0");
        assert_eq!(format_fixed(-10_000_000), "-1.0");
        assert_eq!(format_fixed(515_000_000), "51.5");
        assert_eq!(format_fixed(-1_234_567), "-0.1234567");
    }
}
