//! Slide → layout → master → theme resolution.
//!
//! Each link is read from the owning part's relationship descriptor. A
//! missing descriptor or link leaves the chain unresolved; it is never an
//! error. Descriptors that cannot be parsed are logged and treated the same.

use crate::container::{OoxmlContainer, Relationships};
use std::collections::{BTreeMap, BTreeSet};

pub const SLIDES_DIR: &str = "ppt/slides/";
pub const LAYOUTS_DIR: &str = "ppt/slideLayouts/";
pub const MASTERS_DIR: &str = "ppt/slideMasters/";

/// Relationship kinds used by the resolver.
pub mod kind {
    pub const THEME: &str = "theme";
    pub const SLIDE_MASTER: &str = "slideMaster";
    pub const SLIDE_LAYOUT: &str = "slideLayout";
    pub const SLIDE: &str = "slide";
    pub const CHART: &str = "chart";
    pub const NOTES_SLIDE: &str = "notesSlide";
    pub const DIAGRAM_DATA: &str = "diagramData";
    pub const DIAGRAM_LAYOUT: &str = "diagramLayout";
    pub const DIAGRAM_COLORS: &str = "diagramColors";
    pub const DIAGRAM_QUICK_STYLE: &str = "diagramQuickStyle";
    pub const DIAGRAM_DRAWING: &str = "diagramDrawing";

    /// The five parts that make up a SmartArt diagram.
    pub const DIAGRAM_PARTS: [&str; 5] = [
        DIAGRAM_DATA,
        DIAGRAM_LAYOUT,
        DIAGRAM_COLORS,
        DIAGRAM_QUICK_STYLE,
        DIAGRAM_DRAWING,
    ];
}

/// XML parts that sit directly inside `dir` (no subfolders, no `_rels`).
pub fn parts_in(container: &OoxmlContainer, dir: &str) -> Vec<String> {
    container
        .list_files_with_prefix(dir)
        .into_iter()
        .filter(|p| {
            let rest = &p[dir.len()..];
            !rest.contains('/') && rest.ends_with(".xml")
        })
        .collect()
}

/// Relationships of a part, or none if the descriptor is unreadable.
pub(crate) fn relationships_or_empty(container: &OoxmlContainer, part: &str) -> Relationships {
    container.read_relationships(part).unwrap_or_else(|e| {
        log::warn!("ignoring relationships of {}: {}", part, e);
        Relationships::new()
    })
}

/// Resolve the internal target of the first relationship of `kind`.
pub(crate) fn linked_part(container: &OoxmlContainer, part: &str, kind: &str) -> Option<String> {
    relationships_or_empty(container, part)
        .first_of_kind(kind)
        .filter(|r| !r.external)
        .map(|r| OoxmlContainer::resolve_path(part, &r.target))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Map every slide master part to the file name of its theme.
///
/// `ppt/slideMasters/slideMaster1.xml` -> `theme1.xml`
pub fn resolve_master_themes(container: &OoxmlContainer) -> BTreeMap<String, String> {
    parts_in(container, MASTERS_DIR)
        .into_iter()
        .filter_map(|master| {
            let theme = linked_part(container, &master, kind::THEME)?;
            Some((master, file_name(&theme).to_string()))
        })
        .collect()
}

/// Map every slide layout part to its slide master part.
///
/// `ppt/slideLayouts/slideLayout1.xml` -> `ppt/slideMasters/slideMaster1.xml`
pub fn resolve_layout_masters(container: &OoxmlContainer) -> BTreeMap<String, String> {
    parts_in(container, LAYOUTS_DIR)
        .into_iter()
        .filter_map(|layout| {
            let master = linked_part(container, &layout, kind::SLIDE_MASTER)?;
            Some((layout, master))
        })
        .collect()
}

/// The master → theme and layout → master edges of one presentation.
#[derive(Debug, Clone, Default)]
pub struct ThemeGraph {
    master_themes: BTreeMap<String, String>,
    layout_masters: BTreeMap<String, String>,
}

impl ThemeGraph {
    /// Build both edge maps from the package.
    pub fn build(container: &OoxmlContainer) -> Self {
        let graph = Self {
            master_themes: resolve_master_themes(container),
            layout_masters: resolve_layout_masters(container),
        };
        log::debug!(
            "resolved {} master theme(s) and {} layout master(s)",
            graph.master_themes.len(),
            graph.layout_masters.len()
        );
        graph
    }

    /// Theme file name of a slide master part.
    pub fn master_theme(&self, master: &str) -> Option<&str> {
        self.master_themes.get(master).map(String::as_str)
    }

    /// Theme file name of a slide layout part, through its master.
    pub fn layout_theme(&self, layout: &str) -> Option<&str> {
        self.layout_masters
            .get(layout)
            .and_then(|master| self.master_theme(master))
    }

    /// Theme file name of a slide part, through its layout and master.
    ///
    /// Reads the slide's own descriptor, so it needs the package.
    pub fn slide_theme(&self, container: &OoxmlContainer, slide: &str) -> Option<&str> {
        let layout = linked_part(container, slide, kind::SLIDE_LAYOUT)?;
        self.layout_theme(&layout)
    }

    /// Master → theme edges.
    pub fn master_themes(&self) -> &BTreeMap<String, String> {
        &self.master_themes
    }

    /// Layout → master edges.
    pub fn layout_masters(&self) -> &BTreeMap<String, String> {
        &self.layout_masters
    }

    /// Whether some master uses the theme file.
    pub fn has_theme(&self, theme_file: &str) -> bool {
        self.master_themes.values().any(|t| t == theme_file)
    }

    /// Themes used by at least one master, without extension, sorted.
    pub fn available_themes(&self) -> Vec<String> {
        self.master_themes
            .values()
            .map(|t| t.strip_suffix(".xml").unwrap_or(t).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    fn rels(entries: &[(&str, &str)]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (kind, target)) in entries.iter().enumerate() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/{}" Target="{}"/>"#,
                i + 1,
                REL_NS,
                kind,
                target
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn package(files: &[(&str, String)]) -> OoxmlContainer {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        let data = zip.finish().unwrap().into_inner();
        OoxmlContainer::from_bytes(&data).unwrap()
    }

    fn sample() -> OoxmlContainer {
        package(&[
            ("ppt/slideMasters/slideMaster1.xml", "<sldMaster/>".into()),
            ("ppt/slideMasters/slideMaster2.xml", "<sldMaster/>".into()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                rels(&[("slideLayout", "../slideLayouts/slideLayout1.xml"), ("theme", "../theme/theme1.xml")]),
            ),
            (
                "ppt/slideMasters/_rels/slideMaster2.xml.rels",
                rels(&[("theme", "/ppt/theme/theme3.xml")]),
            ),
            ("ppt/slideLayouts/slideLayout1.xml", "<sldLayout/>".into()),
            ("ppt/slideLayouts/slideLayout2.xml", "<sldLayout/>".into()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                rels(&[("slideMaster", "../slideMasters/slideMaster1.xml")]),
            ),
            (
                "ppt/slideLayouts/_rels/slideLayout2.xml.rels",
                rels(&[("slideMaster", "../slideMasters/slideMaster2.xml")]),
            ),
            ("ppt/slides/slide1.xml", "<sld/>".into()),
            ("ppt/slides/slide2.xml", "<sld/>".into()),
            ("ppt/slides/slide3.xml", "<sld/>".into()),
            (
                "ppt/slides/_rels/slide1.xml.rels",
                rels(&[("slideLayout", "../slideLayouts/slideLayout1.xml")]),
            ),
            (
                "ppt/slides/_rels/slide2.xml.rels",
                rels(&[("slideLayout", "../slideLayouts/slideLayout2.xml")]),
            ),
            ("ppt/slides/_rels/slide3.xml.rels", "<Relationships".into()),
        ])
    }

    #[test]
    fn test_resolve_master_themes() {
        let themes = resolve_master_themes(&sample());
        assert_eq!(themes.len(), 2);
        assert_eq!(themes["ppt/slideMasters/slideMaster1.xml"], "theme1.xml");
        assert_eq!(themes["ppt/slideMasters/slideMaster2.xml"], "theme3.xml");
    }

    #[test]
    fn test_resolve_layout_masters() {
        let masters = resolve_layout_masters(&sample());
        assert_eq!(
            masters["ppt/slideLayouts/slideLayout2.xml"],
            "ppt/slideMasters/slideMaster2.xml"
        );
    }

    #[test]
    fn test_slide_theme_chain() {
        let container = sample();
        let graph = ThemeGraph::build(&container);
        assert_eq!(graph.slide_theme(&container, "ppt/slides/slide1.xml"), Some("theme1.xml"));
        assert_eq!(graph.slide_theme(&container, "ppt/slides/slide2.xml"), Some("theme3.xml"));
        // Malformed descriptor leaves the chain unresolved.
        assert_eq!(graph.slide_theme(&container, "ppt/slides/slide3.xml"), None);
        assert_eq!(graph.slide_theme(&container, "ppt/slides/slide9.xml"), None);
        assert_eq!(graph.layout_theme("ppt/slideLayouts/slideLayout1.xml"), Some("theme1.xml"));
    }

    #[test]
    fn test_available_themes_sorted() {
        let graph = ThemeGraph::build(&sample());
        assert_eq!(graph.available_themes(), vec!["theme1", "theme3"]);
        assert!(graph.has_theme("theme3.xml"));
        assert!(!graph.has_theme("theme2.xml"));
    }

    #[test]
    fn test_empty_package_has_no_edges() {
        let container = package(&[("ppt/presentation.xml", "<presentation/>".into())]);
        let graph = ThemeGraph::build(&container);
        assert!(graph.master_themes().is_empty());
        assert!(graph.layout_masters().is_empty());
        assert!(graph.available_themes().is_empty());
    }
}
