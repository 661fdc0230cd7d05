//! Decoration styles and the handles rules own.

use std::fmt;

use hl_core::readable_foreground;
use serde::{Deserialize, Serialize};

/// How a rule's matches are painted. A pure function of the rule's color.
///
/// # Examples
///
/// ```
/// use hl_engine::DecorationStyle;
///
/// let style = DecorationStyle::from_color("#00c4ff55");
/// assert_eq!(style.background, "#00c4ff55");
/// assert_eq!(style.foreground, Some("#ffffff"));
///
/// // Non-hex colors keep the host's default text color.
/// assert_eq!(DecorationStyle::from_color("orange").foreground, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DecorationStyle {
    /// Background fill.
    pub background: String,
    /// Border around each match.
    pub border: String,
    /// Readable text color on the background, if the color could be parsed.
    pub foreground: Option<&'static str>,
    /// Marker color in the overview ruler.
    pub overview_ruler: String,
}

impl DecorationStyle {
    /// Derives the style for `color`.
    #[must_use]
    pub fn from_color(color: &str) -> Self {
        Self {
            background: color.to_owned(),
            border: format!("1px solid {color}"),
            foreground: readable_foreground(color),
            overview_ruler: color.to_owned(),
        }
    }
}

/// Host-side identifier of a created decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecorationId(pub u64);

impl fmt::Display for DecorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decoration-{}", self.0)
    }
}

/// A decoration exclusively owned by one rule.
///
/// Not `Clone`: the only way to release it is [`Decoration::into_id`],
/// which consumes the handle, so each decoration is disposed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct Decoration {
    id: DecorationId,
    style: DecorationStyle,
}

impl Decoration {
    pub(crate) const fn new(id: DecorationId, style: DecorationStyle) -> Self {
        Self { id, style }
    }

    /// The host identifier, for applying ranges.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> DecorationId {
        self.id
    }

    /// The style it was created with.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> &DecorationStyle {
        &self.style
    }

    /// Gives up ownership for disposal.
    #[inline]
    #[must_use]
    pub(crate) fn into_id(self) -> DecorationId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_is_pure() {
        assert_eq!(
            DecorationStyle::from_color("#ffcc00"),
            DecorationStyle::from_color("#ffcc00")
        );
    }

    #[test]
    fn test_light_background_gets_dark_text() {
        let style = DecorationStyle::from_color("#ffff00");
        assert_eq!(style.foreground, Some("#000000"));
        assert_eq!(style.border, "1px solid #ffff00");
        assert_eq!(style.overview_ruler, "#ffff00");
    }

    #[test]
    fn test_decoration_handle() {
        let decoration = Decoration::new(DecorationId(3), DecorationStyle::from_color("#000"));
        assert_eq!(decoration.id(), DecorationId(3));
        assert_eq!(decoration.style().background, "#000");
        assert_eq!(decoration.into_id().to_string(), "decoration-3");
    }
}
