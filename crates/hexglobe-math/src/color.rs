//! RGB colors, hex parsing and the value-to-color scheme used for tiles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color '{0}' is not a #rgb or #rrggbb hex string")]
    InvalidHex(String),
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#rgb`, `#rrggbb`, or the same without the leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(hex.to_string());
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::from_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_u8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Maps a scalar in `[0, 1]` to a color.
pub trait ColorScheme {
    fn sample(&self, t: f64) -> Rgb;
}

impl<F: Fn(f64) -> Rgb> ColorScheme for F {
    fn sample(&self, t: f64) -> Rgb {
        self(t)
    }
}

/// Uniform cubic B-spline through a list of color stops, evaluated per
/// channel in 8-bit space and rounded to whole channel values.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbBasis {
    stops: Vec<[f64; 3]>,
}

impl RgbBasis {
    /// Build a scheme from color stops. A single stop yields a constant scheme.
    pub fn new(stops: &[Rgb]) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|c| {
                    let [r, g, b] = c.to_u8();
                    [r as f64, g as f64, b as f64]
                })
                .collect(),
        }
    }

    /// The seven-stop brown earth scheme.
    pub fn brown_earth() -> Self {
        Self::new(&[
            Rgb::from_u8(252, 237, 177),
            Rgb::from_u8(252, 220, 88),
            Rgb::from_u8(252, 202, 3),
            Rgb::from_u8(166, 133, 2),
            Rgb::from_u8(166, 144, 58),
            Rgb::from_u8(166, 156, 116),
            Rgb::from_u8(77, 72, 54),
        ])
    }

    fn channel(&self, t: f64, c: usize) -> f64 {
        let n = self.stops.len() - 1;
        let (t, i) = if t.is_nan() || t <= 0.0 {
            (0.0, 0)
        } else if t >= 1.0 {
            (1.0, n - 1)
        } else {
            (t, (t * n as f64).floor() as usize)
        };
        let v1 = self.stops[i][c];
        let v2 = self.stops[i + 1][c];
        let v0 = if i > 0 { self.stops[i - 1][c] } else { 2.0 * v1 - v2 };
        let v3 = if i < n - 1 { self.stops[i + 2][c] } else { 2.0 * v2 - v1 };
        basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
    }
}

impl Default for RgbBasis {
    fn default() -> Self {
        Self::brown_earth()
    }
}

impl ColorScheme for RgbBasis {
    fn sample(&self, t: f64) -> Rgb {
        match self.stops.len() {
            0 => Rgb::BLACK,
            1 => {
                let [r, g, b] = self.stops[0];
                Rgb::from_u8(r as u8, g as u8, b as u8)
            }
            _ => {
                let q = |c: usize| self.channel(t, c).round().clamp(0.0, 255.0) as u8;
                Rgb::from_u8(q(0), q(1), q(2))
            }
        }
    }
}

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_long_and_short_hex() {
        assert_eq!(Rgb::from_hex("#ff0000").unwrap().to_u8(), [255, 0, 0]);
        assert_eq!(Rgb::from_hex("03153d").unwrap().to_u8(), [3, 21, 61]);
        assert_eq!(Rgb::from_hex("#fc0").unwrap().to_u8(), [255, 204, 0]);
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(Rgb::from_hex("#ff00").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_hex_round_trips_through_serde_string() {
        let c = Rgb::from_hex("#8fd8d8").unwrap();
        let s: String = c.into();
        assert_eq!(s, "#8fd8d8");
        assert_eq!(Rgb::try_from(s).unwrap(), c);
    }

    #[test]
    fn test_basis_hits_end_stops() {
        let scheme = RgbBasis::brown_earth();
        assert_eq!(scheme.sample(0.0).to_u8(), [252, 237, 177]);
        assert_eq!(scheme.sample(1.0).to_u8(), [77, 72, 54]);
        // Out of range values clamp to the ends.
        assert_eq!(scheme.sample(-3.0).to_u8(), [252, 237, 177]);
        assert_eq!(scheme.sample(7.0).to_u8(), [77, 72, 54]);
    }

    #[test]
    fn test_basis_of_constant_stops_is_constant() {
        let grey = Rgb::from_u8(100, 100, 100);
        let scheme = RgbBasis::new(&[grey, grey, grey]);
        for i in 0..=10 {
            assert_eq!(scheme.sample(i as f64 / 10.0).to_u8(), [100, 100, 100]);
        }
    }

    #[test]
    fn test_closures_are_schemes() {
        let red = |_t: f64| Rgb::new(1.0, 0.0, 0.0);
        assert_eq!(red.sample(0.3), Rgb::new(1.0, 0.0, 0.0));
    }
}
