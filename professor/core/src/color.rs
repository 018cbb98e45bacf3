//! Colour type shared by the avatar, scenes and visualizers
//!
//! Colours travel through the system as CSS-style hex strings (`#7c3aed`)
//! because that is what gets persisted and what renderers consume. Inside the
//! core they are plain RGB triples so the animator can lerp and compare them
//! without reparsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a string could not be read as a colour
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string did not begin with `#`
    #[error("colour must start with '#': {0:?}")]
    MissingHash(String),
    /// The string had the wrong number of hex digits
    #[error("colour must have 3 or 6 hex digits: {0:?}")]
    BadLength(String),
    /// A character was not a hex digit
    #[error("colour contains a non-hex digit: {0:?}")]
    BadDigit(String),
}

/// An opaque RGB colour
///
/// Serializes as a lowercase `#rrggbb` string.
///
/// # Examples
///
/// ```
/// use professor_core::color::Color;
///
/// let violet: Color = "#7c3aed".parse().unwrap();
/// assert_eq!(violet, Color::rgb(0x7c, 0x3a, 0xed));
/// assert_eq!(violet.to_hex(), "#7c3aed");
///
/// // Short form expands each digit
/// let white: Color = "#fff".parse().unwrap();
/// assert_eq!(white, Color::WHITE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Pure white
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    /// Create a colour from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError`] when the hash is missing, the length is
    /// wrong, or a digit is not hexadecimal.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(input.to_string()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(input.to_string()));
        }

        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorParseError::BadDigit(input.to_string()))
        };

        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(ColorParseError::BadLength(input.to_string())),
        }
    }

    /// Convert to a lowercase `#rrggbb` string
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build a colour from HSL
    ///
    /// `hue` is in degrees and wraps; `saturation` and `lightness` are in
    /// `0.0..=1.0` and are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use professor_core::color::Color;
    ///
    /// assert_eq!(Color::from_hsl(0.0, 0.0, 1.0), Color::WHITE);
    /// ```
    #[must_use]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s <= f32::EPSILON {
            let v = unit_to_byte(l);
            return Self::rgb(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };

        Self::rgb(
            unit_to_byte(channel(h + 1.0 / 3.0)),
            unit_to_byte(channel(h)),
            unit_to_byte(channel(h - 1.0 / 3.0)),
        )
    }

    /// Linear interpolation between two colours (`t` clamped to `0.0..=1.0`)
    #[must_use]
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| unit_to_byte((f32::from(a) + (f32::from(b) - f32::from(a)) * t) / 255.0);
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Components as floats in `0.0..=1.0`, the form GPU materials expect
    #[must_use]
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fixed colours used across the avatar and scenes
pub mod palette {
    use super::Color;

    /// Emerald green, used by the friendly preset and orb accents
    pub const EMERALD: Color = Color::rgb(0x10, 0xb9, 0x81);
    /// Amber
    pub const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);
    /// Red
    pub const RED: Color = Color::rgb(0xef, 0x44, 0x44);
    /// Blue
    pub const BLUE: Color = Color::rgb(0x3b, 0x82, 0xf6);
    /// Slate, the professional secondary
    pub const SLATE: Color = Color::rgb(0x1f, 0x29, 0x37);
    /// Purple
    pub const PURPLE: Color = Color::rgb(0x8b, 0x5c, 0xf6);
    /// Indigo
    pub const INDIGO: Color = Color::rgb(0x63, 0x66, 0xf1);
    /// Cyan
    pub const CYAN: Color = Color::rgb(0x06, 0xb6, 0xd4);
    /// Dark cyan
    pub const DARK_CYAN: Color = Color::rgb(0x08, 0x91, 0xb2);
    /// Violet, the default primary
    pub const VIOLET: Color = Color::rgb(0x7c, 0x3a, 0xed);
    /// Sky blue, the default eye colour
    pub const SKY: Color = Color::rgb(0x60, 0xa5, 0xfa);
    /// Mouth colour while speaking, also the excited rim light
    pub const SPEAKING_RED: Color = Color::rgb(0xff, 0x6b, 0x6b);
    /// Wood for desks, shelves and tree trunks
    pub const WOOD: Color = Color::rgb(0x8b, 0x45, 0x13);
    /// Dark wood for chairs and reading tables
    pub const DARK_WOOD: Color = Color::rgb(0x65, 0x43, 0x21);
    /// Lab bench grey
    pub const BENCH: Color = Color::rgb(0x33, 0x33, 0x33);
    /// Dust motes
    pub const DUST: Color = Color::rgb(0xf0, 0xf0, 0xf0);
    /// Warm reading light
    pub const CORNSILK: Color = Color::rgb(0xff, 0xf8, 0xdc);
    /// Library lamp
    pub const LAMP: Color = Color::rgb(0xff, 0xdd, 0x88);
    /// Tree canopy
    pub const FOREST: Color = Color::rgb(0x22, 0x8b, 0x22);
    /// Grass
    pub const LIME: Color = Color::rgb(0x32, 0xcd, 0x32);
    /// Falling leaves
    pub const LEAF: Color = Color::rgb(0x90, 0xee, 0x90);
    /// Sunlight
    pub const SUNLIGHT: Color = Color::rgb(0xff, 0xff, 0x88);
    /// Asteroid rock
    pub const ROCK: Color = Color::rgb(0x69, 0x69, 0x69);
    /// Ground plane in the default scene
    pub const FLOOR: Color = Color::rgb(0x1a, 0x1a, 0x2e);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!(Color::from_hex("#06b6d4").unwrap(), palette::CYAN);
        assert_eq!(Color::from_hex("#06B6D4").unwrap(), palette::CYAN);
        assert_eq!(Color::from_hex("#abc").unwrap(), Color::rgb(0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Color::from_hex("7c3aed"),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            Color::from_hex("#7c3a"),
            Err(ColorParseError::BadLength(_))
        ));
        assert!(matches!(
            Color::from_hex("#7c3aeg"),
            Err(ColorParseError::BadDigit(_))
        ));
        assert!(matches!(Color::from_hex("#é12"), Err(ColorParseError::BadDigit(_))));
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let json = serde_json::to_string(&palette::VIOLET).unwrap();
        assert_eq!(json, "\"#7c3aed\"");

        let back: Color = serde_json::from_str("\"#60a5fa\"").unwrap();
        assert_eq!(back, palette::SKY);

        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }

    #[test]
    fn test_hsl_primary_hue() {
        // hsl(0, 60%, 50%) => rgb(204, 51, 51)
        let c = Color::from_hsl(0.0, 0.6, 0.5);
        assert_eq!(c.r, 204);
        assert_eq!(c.g, 51);
        assert_eq!(c.b, 51);
    }

    #[test]
    fn test_hsl_hue_wraps() {
        assert_eq!(Color::from_hsl(360.0, 0.6, 0.5), Color::from_hsl(0.0, 0.6, 0.5));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Color::rgb(100, 50, 25));
    }

    #[test]
    fn test_unit_rgb() {
        let [r, g, b] = Color::WHITE.to_unit_rgb();
        assert!((r - 1.0).abs() < f32::EPSILON);
        assert!((g - 1.0).abs() < f32::EPSILON);
        assert!((b - 1.0).abs() < f32::EPSILON);
    }
}
