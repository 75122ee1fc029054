//! Color vocabulary and the `source:target` color mapping parser.
//!
//! A color is either one of the twelve theme scheme tokens (`accent1`, `dk1`,
//! ...) or a six-digit hex RGB triplet. A [`ColorMapping`] is parsed from a
//! comma-separated list of `source:target` pairs and is immutable afterwards.
//!
//! ```
//! use pptx_toolkit::color::{Color, ColorMapping, SchemeColor};
//!
//! let mapping = ColorMapping::parse("accent1:accent3, ff0000:dk2")?;
//! assert_eq!(mapping.len(), 2);
//! assert_eq!(
//!     mapping.target_for_scheme(SchemeColor::Accent1),
//!     Some(&Color::Scheme(SchemeColor::Accent3))
//! );
//! # Ok::<(), pptx_toolkit::Error>(())
//! ```

use crate::error::{Error, MappingSide, Result};
use serde::Serialize;
use std::fmt;

/// One of the twelve color roles a theme binds to concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemeColor {
    Dk1,
    Lt1,
    Dk2,
    Lt2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hlink,
    FolHlink,
}

impl SchemeColor {
    /// All scheme colors in theme order.
    pub const ALL: [SchemeColor; 12] = [
        SchemeColor::Dk1,
        SchemeColor::Lt1,
        SchemeColor::Dk2,
        SchemeColor::Lt2,
        SchemeColor::Accent1,
        SchemeColor::Accent2,
        SchemeColor::Accent3,
        SchemeColor::Accent4,
        SchemeColor::Accent5,
        SchemeColor::Accent6,
        SchemeColor::Hlink,
        SchemeColor::FolHlink,
    ];

    /// The token as it appears in `val` attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeColor::Dk1 => "dk1",
            SchemeColor::Lt1 => "lt1",
            SchemeColor::Dk2 => "dk2",
            SchemeColor::Lt2 => "lt2",
            SchemeColor::Accent1 => "accent1",
            SchemeColor::Accent2 => "accent2",
            SchemeColor::Accent3 => "accent3",
            SchemeColor::Accent4 => "accent4",
            SchemeColor::Accent5 => "accent5",
            SchemeColor::Accent6 => "accent6",
            SchemeColor::Hlink => "hlink",
            SchemeColor::FolHlink => "folHlink",
        }
    }

    /// Human-readable role name.
    pub fn description(&self) -> &'static str {
        match self {
            SchemeColor::Dk1 => "Dark 1",
            SchemeColor::Lt1 => "Light 1",
            SchemeColor::Dk2 => "Dark 2",
            SchemeColor::Lt2 => "Light 2",
            SchemeColor::Accent1 => "Accent 1",
            SchemeColor::Accent2 => "Accent 2",
            SchemeColor::Accent3 => "Accent 3",
            SchemeColor::Accent4 => "Accent 4",
            SchemeColor::Accent5 => "Accent 5",
            SchemeColor::Accent6 => "Accent 6",
            SchemeColor::Hlink => "Hyperlink",
            SchemeColor::FolHlink => "Followed Hyperlink",
        }
    }

    /// Look up a token. Matching is case-sensitive (`folHlink`, not `folhlink`).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }

    /// Byte-slice variant of [`SchemeColor::from_token`] for raw XML values.
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().as_bytes() == token)
    }

    /// All tokens, alphabetically sorted, for error messages.
    pub fn sorted_tokens() -> Vec<&'static str> {
        let mut tokens: Vec<&'static str> = Self::ALL.iter().map(|c| c.as_str()).collect();
        tokens.sort_unstable();
        tokens
    }
}

impl fmt::Display for SchemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check for exactly six ASCII hex digits.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A six-digit hex RGB value, kept as the user wrote it.
///
/// Comparison ignores case; [`HexColor::canonical`] gives the uppercase form
/// that is written into documents.
#[derive(Debug, Clone)]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex triplet, returning `None` unless it is exactly six hex digits.
    pub fn parse(value: &str) -> Option<Self> {
        is_hex_color(value).then(|| HexColor(value.to_string()))
    }

    /// The value as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The uppercase form.
    pub fn canonical(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl PartialEq for HexColor {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HexColor {}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A color reference: scheme token or direct RGB value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Scheme(SchemeColor),
    Hex(HexColor),
}

impl Color {
    /// Parse a scheme token or hex triplet.
    pub fn parse(value: &str) -> Option<Self> {
        SchemeColor::from_token(value)
            .map(Color::Scheme)
            .or_else(|| HexColor::parse(value).map(Color::Hex))
    }

    fn validate(value: &str, side: MappingSide) -> Result<Self> {
        Color::parse(value).ok_or_else(|| Error::InvalidColor {
            side,
            value: value.to_string(),
            valid: SchemeColor::sorted_tokens(),
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Scheme(c) => c.fmt(f),
            Color::Hex(h) => h.fmt(f),
        }
    }
}

/// One `source → target` entry of a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub source: Color,
    pub target: Color,
}

/// A validated, conflict-free color mapping.
///
/// Entries keep the order in which they were first written. The mapping is
/// applied in a single pass by the rewriter; targets are never looked up
/// again as sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMapping {
    pairs: Vec<ColorPair>,
}

impl ColorMapping {
    /// Parse a `source:target[,source:target...]` string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::EmptyMapping);
        }

        let mut mapping = ColorMapping::default();

        for pair in input.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (source, target) = split_pair(pair)?;
            let source = Color::validate(source, MappingSide::Source)?;
            let target = Color::validate(target, MappingSide::Target)?;
            mapping.insert(source, target)?;
        }

        if mapping.is_empty() {
            return Err(Error::NoValidMappings);
        }

        Ok(mapping)
    }

    fn insert(&mut self, source: Color, target: Color) -> Result<()> {
        if let Some(existing) = self.pairs.iter().find(|p| p.source == source) {
            if existing.target != target {
                return Err(Error::ConflictingMapping {
                    color: existing.source.to_string(),
                    first: existing.target.to_string(),
                    second: target.to_string(),
                });
            }
            return Ok(());
        }
        self.pairs.push(ColorPair { source, target });
        Ok(())
    }

    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over entries in input order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorPair> {
        self.pairs.iter()
    }

    /// Target for a scheme-token source.
    pub fn target_for_scheme(&self, source: SchemeColor) -> Option<&Color> {
        self.pairs
            .iter()
            .find(|p| p.source == Color::Scheme(source))
            .map(|p| &p.target)
    }

    /// Target for a hex source. `hex` may be in any case.
    pub fn target_for_hex(&self, hex: &str) -> Option<&Color> {
        self.pairs
            .iter()
            .find(|p| matches!(&p.source, Color::Hex(h) if h.as_str().eq_ignore_ascii_case(hex)))
            .map(|p| &p.target)
    }

    /// Display strings of the form `source→target`, in input order.
    pub fn describe(&self) -> Vec<String> {
        self.pairs
            .iter()
            .map(|p| format!("{}→{}", p.source, p.target))
            .collect()
    }
}

impl fmt::Display for ColorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe().join(", "))
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    if !pair.contains(':') {
        return Err(Error::InvalidMappingFormat {
            pair: pair.to_string(),
            reason: "Expected 'source:target'",
        });
    }

    let mut parts = pair.split(':');
    let (Some(source), Some(target), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::InvalidMappingFormat {
            pair: pair.to_string(),
            reason: "Expected exactly one ':'",
        });
    };

    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        return Err(Error::InvalidMappingFormat {
            pair: pair.to_string(),
            reason: "Source and target cannot be empty",
        });
    }

    Ok((source, target))
}

/// Parse a color mapping string. See [`ColorMapping::parse`].
pub fn parse_color_mapping(input: &str) -> Result<ColorMapping> {
    ColorMapping::parse(input)
}
