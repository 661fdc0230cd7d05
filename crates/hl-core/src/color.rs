//! Hex color parsing and readable foreground selection.
//!
//! Only hex notations are understood here (`#RGB`, `#RGBA`, `#RRGGBB`,
//! `#RRGGBBAA`). Named colors and functional notations such as `rgba()` are
//! left to the host's own color handling, so [`parse_color`] returns `None`
//! for them and no foreground override is produced.
//!
//! # Examples
//!
//! ```
//! use hl_core::color::{parse_color, readable_foreground, LIGHT_FOREGROUND};
//!
//! let rgb = parse_color("#00c4ff55").unwrap();
//! assert_eq!((rgb.r, rgb.g, rgb.b), (0, 196, 255));
//! assert_eq!(readable_foreground("#00c4ff55"), Some(LIGHT_FOREGROUND));
//! ```

use serde::{Deserialize, Serialize};

/// Foreground used on light backgrounds.
pub const DARK_FOREGROUND: &str = "#000000";

/// Foreground used on dark backgrounds.
pub const LIGHT_FOREGROUND: &str = "#ffffff";

/// Luminance above which a background counts as light.
const LIGHT_BACKGROUND_THRESHOLD: f64 = 0.6;

/// An opaque RGB triple. Alpha is discarded during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived luminance in `0.0..=1.0`.
    #[must_use]
    pub fn luminance(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }
}

/// Parses a hex color string.
///
/// Returns `None` for anything other than the four hex notations.
#[must_use]
pub fn parse_color(text: &str) -> Option<Rgb> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 | 4 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
        }
        6 | 8 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgb::new(pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

/// Picks a text color that stays readable on top of `color`.
///
/// Returns `None` when the background cannot be parsed, in which case the
/// host's default text color applies.
#[must_use]
pub fn readable_foreground(color: &str) -> Option<&'static str> {
    let rgb = parse_color(color)?;
    if rgb.luminance() > LIGHT_BACKGROUND_THRESHOLD {
        Some(DARK_FOREGROUND)
    } else {
        Some(LIGHT_FOREGROUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_hex_forms() {
        assert_eq!(parse_color("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(parse_color("#f008"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_color("#123456"), Some(Rgb::new(0x12, 0x34, 0x56)));
        assert_eq!(parse_color("#12345678"), Some(Rgb::new(0x12, 0x34, 0x56)));
        assert_eq!(parse_color("  #ABCDEF "), Some(Rgb::new(0xab, 0xcd, 0xef)));
    }

    #[test]
    fn test_parse_rejects_other_forms() {
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("rgba(0, 0, 0, 0.5)"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("123456"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_luminance_of_translucent_cyan() {
        let rgb = parse_color("#00c4ff55").unwrap();
        assert_eq!(rgb, Rgb::new(0, 196, 255));
        assert!((rgb.luminance() - 0.565).abs() < 0.001);
        assert_eq!(readable_foreground("#00c4ff55"), Some(LIGHT_FOREGROUND));
    }

    #[test]
    fn test_readable_foreground() {
        assert_eq!(readable_foreground("#ffff00"), Some(DARK_FOREGROUND));
        assert_eq!(readable_foreground("#000080"), Some(LIGHT_FOREGROUND));
        assert_eq!(readable_foreground("yellow"), None);
    }
}
