//! Format detection for PresentationML packages.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Read, Seek};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Main part content types of the presentation package kinds.
const PRESENTATION_CONTENT_TYPES: [(&str, PresentationKind); 4] = [
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        PresentationKind::Presentation,
    ),
    (
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml",
        PresentationKind::MacroEnabled,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml",
        PresentationKind::Template,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml",
        PresentationKind::Slideshow,
    ),
];

/// Other Office packages, recognized only to name them in errors.
const OTHER_CONTENT_TYPES: [(&str, &str); 2] = [
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        "Word Document",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        "Excel Workbook",
    ),
];

/// Detected presentation package kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationKind {
    /// PowerPoint presentation (.pptx)
    Presentation,
    /// Macro-enabled presentation (.pptm)
    MacroEnabled,
    /// Presentation template (.potx)
    Template,
    /// Slideshow (.ppsx)
    Slideshow,
}

impl PresentationKind {
    /// Returns the file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            PresentationKind::Presentation => "pptx",
            PresentationKind::MacroEnabled => "pptm",
            PresentationKind::Template => "potx",
            PresentationKind::Slideshow => "ppsx",
        }
    }

    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            PresentationKind::Presentation => "PowerPoint Presentation",
            PresentationKind::MacroEnabled => "PowerPoint Macro-Enabled Presentation",
            PresentationKind::Template => "PowerPoint Template",
            PresentationKind::Slideshow => "PowerPoint Slideshow",
        }
    }
}

impl std::fmt::Display for PresentationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the presentation kind of archive bytes.
pub fn detect_presentation_from_bytes(data: &[u8]) -> Result<PresentationKind> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_presentation_from_reader(std::io::Cursor::new(data))
}

/// Detect the presentation kind from a reader.
pub fn detect_presentation_from_reader<R: Read + Seek>(reader: R) -> Result<PresentationKind> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if let Some((_, kind)) = PRESENTATION_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| content_types.contains(ct))
    {
        return Ok(*kind);
    }
    if let Some((_, name)) = OTHER_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| content_types.contains(ct))
    {
        return Err(Error::UnsupportedFormat(name.to_string()));
    }

    detect_by_folder_structure(&archive)
}

/// Fallback detection by checking for the presentation part.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &zip::ZipArchive<R>,
) -> Result<PresentationKind> {
    let mut names = archive.file_names();
    if names.any(|n| n == "ppt/presentation.xml") {
        return Ok(PresentationKind::Presentation);
    }

    let mut names = archive.file_names();
    if names.any(|n| n.starts_with("word/") || n.starts_with("xl/")) {
        return Err(Error::UnsupportedFormat("not a presentation".to_string()));
    }

    Err(Error::UnknownFormat)
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
