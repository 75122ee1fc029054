//! Error types for the pptx-toolkit library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pptx-toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of a `source:target` pair a color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSide {
    /// The color being replaced.
    Source,
    /// The replacement color.
    Target,
}

impl std::fmt::Display for MappingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingSide::Source => write!(f, "source"),
            MappingSide::Target => write!(f, "target"),
        }
    }
}

/// Errors that can occur while inspecting or rewriting a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but is not a presentation.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error serializing output.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The color mapping string was blank.
    #[error("mapping string cannot be empty")]
    EmptyMapping,

    /// A mapping pair did not follow the `source:target` grammar.
    #[error("invalid mapping format: '{pair}'. {reason}")]
    InvalidMappingFormat {
        /// The offending pair as written.
        pair: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A color was neither a scheme token nor a 6-digit hex value.
    #[error(
        "invalid {side} color: '{value}'. Must be a valid scheme color ({}) or 6-digit hex color (e.g., AABBCC)",
        .valid.join(", ")
    )]
    InvalidColor {
        /// Side of the pair the value came from.
        side: MappingSide,
        /// The rejected value.
        value: String,
        /// Valid scheme tokens, sorted.
        valid: Vec<&'static str>,
    },

    /// The same source was mapped to two different targets.
    #[error("conflicting mappings for '{color}':\n  - {color} → {first}\n  - {color} → {second}")]
    ConflictingMapping {
        /// The source color.
        color: String,
        /// The target seen first.
        first: String,
        /// The target seen later.
        second: String,
    },

    /// The mapping string contained only separators.
    #[error("no valid mappings found")]
    NoValidMappings,

    /// The slide range string did not follow the `1,3,5-8` grammar.
    #[error("{0}")]
    InvalidSlideRange(String),

    /// The scope value is not one of the known scopes.
    #[error("invalid scope '{value}'. Valid values: {}", .valid.join(", "))]
    InvalidScope {
        /// The rejected value.
        value: String,
        /// Valid scope names, sorted.
        valid: Vec<&'static str>,
    },

    /// A slide filter was combined with a scope other than `content`.
    #[error("a slide filter can only be used with scope 'content' (got '{0}')")]
    SlidesRequireContentScope(String),

    /// One or more requested themes are not used by any slide master.
    #[error(
        "theme(s) not found: {}\nAvailable themes: {}",
        .missing.join(", "),
        .available.join(", ")
    )]
    ThemeNotFound {
        /// Requested names that did not resolve.
        missing: Vec<String>,
        /// Theme names present in the archive, sorted.
        available: Vec<String>,
    },

    /// One or more requested slide numbers exceed the slide count.
    #[error("{}", describe_out_of_range(.invalid, .total))]
    SlidesOutOfRange {
        /// Every requested number that does not exist, ascending.
        invalid: Vec<usize>,
        /// Number of slides in the presentation.
        total: usize,
    },
}

fn describe_out_of_range(invalid: &[usize], total: &usize) -> String {
    match invalid {
        [single] => format!("slide {} does not exist (presentation has {} slides)", single, total),
        _ => {
            let numbers: Vec<String> = invalid.iter().map(|n| n.to_string()).collect();
            format!(
                "slides {} do not exist (presentation has {} slides)",
                numbers.join(", "),
                total
            )
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
