use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{ConvertError, Stage};

/// An opaque RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance between two colors in RGB space.
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Parse an optional user-supplied color, treating blank input as black.
    pub fn parse_or_black(value: Option<&str>) -> Result<Color, ConvertError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Color::BLACK),
            Some(raw) => raw.parse(),
        }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        Color::new(px[0], px[1], px[2])
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Accepts `#rgb`, `#rrggbb` and the same forms without the leading `#`.
impl FromStr for Color {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConvertError::invalid(Stage::Validation, format!("invalid color `{s}`"));
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = channel(&hex[i..i + 1])? * 17;
                }
                Ok(out.into())
            }
            6 => Ok(Color::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}
