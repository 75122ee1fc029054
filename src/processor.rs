//! Color swap over a whole presentation package.
//!
//! The pipeline validates everything up front (package kind, scope, themes,
//! slide numbers), rewrites every eligible XML part with
//! [`rewrite::try_rewrite_colors`], and repackages the archive. Nothing is
//! written when any step fails.

use crate::color::ColorMapping;
use crate::container::OoxmlContainer;
use crate::detect::detect_presentation_from_bytes;
use crate::error::{Error, Result};
use crate::pptx::{read_themes, Theme};
use crate::rewrite;
use crate::scope::{PartFilter, Scope, ScopeSelection};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Outcome of a color swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// XML parts whose content changed.
    pub parts_modified: usize,
    /// XML parts that passed every filter.
    pub parts_eligible: usize,
    /// Scope in effect.
    pub scope: Scope,
    /// With both a theme and a slide filter, the number of requested slides
    /// that use one of the themes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slides_matched: Option<usize>,
}

/// Swap colors in archive bytes and return the new archive.
///
/// # Example
///
/// ```no_run
/// use pptx_toolkit::{swap_colors_bytes, ColorMapping, ScopeSelection};
///
/// let data = std::fs::read("deck.pptx")?;
/// let mapping = ColorMapping::parse("accent1:accent2,FF0000:dk1")?;
/// let (output, summary) = swap_colors_bytes(&data, &mapping, &ScopeSelection::new())?;
/// std::fs::write("recolored.pptx", output)?;
/// println!("{} parts modified", summary.parts_modified);
/// # Ok::<(), pptx_toolkit::Error>(())
/// ```
pub fn swap_colors_bytes(
    data: &[u8],
    mapping: &ColorMapping,
    selection: &ScopeSelection,
) -> Result<(Vec<u8>, ProcessSummary)> {
    selection.validate()?;
    let kind = detect_presentation_from_bytes(data)?;
    log::debug!("input is a {}", kind);

    let mut container = OoxmlContainer::from_bytes(data)?;

    let (updates, summary) = {
        let filter = PartFilter::new(&container, selection)?;
        let mut updates = Vec::new();
        let mut parts_eligible = 0;

        for entry in container.entries().iter().filter(|e| e.is_xml()) {
            if !filter.is_eligible(&entry.name) {
                continue;
            }
            parts_eligible += 1;

            match rewrite::try_rewrite_colors(&entry.data, mapping) {
                Ok(result) if result.content.as_ref() != entry.data.as_slice() => {
                    log::debug!("{}: {} color(s) rewritten", entry.name, result.replacements);
                    updates.push((entry.name.clone(), result.content.into_owned()));
                }
                Ok(_) => log::debug!("{}: unchanged", entry.name),
                Err(e) => log::warn!("{}: left unchanged, XML could not be scanned: {}", entry.name, e),
            }
        }

        let summary = ProcessSummary {
            parts_modified: updates.len(),
            parts_eligible,
            scope: filter.scope(),
            slides_matched: filter.slides_matched(),
        };
        (updates, summary)
    };

    for (name, content) in updates {
        container.replace(&name, content)?;
    }

    log::info!(
        "{} of {} eligible part(s) modified (scope: {})",
        summary.parts_modified,
        summary.parts_eligible,
        summary.scope
    );

    Ok((container.to_bytes()?, summary))
}

/// Swap colors in a presentation file and write the result to `output`.
///
/// The output file is only created once the whole swap has succeeded.
pub fn swap_colors(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mapping: &ColorMapping,
    selection: &ScopeSelection,
) -> Result<ProcessSummary> {
    selection.validate()?;
    let data = read_input(input.as_ref())?;
    let (bytes, summary) = swap_colors_bytes(&data, mapping, selection)?;
    fs::write(output.as_ref(), bytes)?;
    Ok(summary)
}

/// Read the themes of a presentation file.
pub fn list_themes(input: impl AsRef<Path>) -> Result<Vec<Theme>> {
    let data = read_input(input.as_ref())?;
    detect_presentation_from_bytes(&data)?;
    read_themes(&OoxmlContainer::from_bytes(&data)?)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}
