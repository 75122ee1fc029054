//! # pptx-toolkit
//!
//! Structure-preserving color swapping for PowerPoint presentations.
//!
//! Colors in slides, layouts and masters are references to theme colors
//! (`<a:schemeClr val="accent1"/>`) or literal RGB values
//! (`<a:srgbClr val="FF0000"/>`). This library rewrites those references
//! according to a mapping, touching nothing else in the XML.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pptx_toolkit::{swap_colors, ColorMapping, Scope, ScopeSelection};
//!
//! // Swap two accents and turn a literal red into dark 1
//! let mapping = ColorMapping::parse("accent1:accent2,accent2:accent1,FF0000:dk1")?;
//!
//! // Only slides 2 to 4 that use theme1
//! let selection = ScopeSelection::new()
//!     .with_scope(Scope::Content)
//!     .with_themes(["theme1"])
//!     .with_slides(pptx_toolkit::parse_slide_range("2-4")?);
//!
//! let summary = swap_colors("deck.pptx", "recolored.pptx", &mapping, &selection)?;
//! println!("{} parts modified", summary.parts_modified);
//! # Ok::<(), pptx_toolkit::Error>(())
//! ```
//!
//! ## Rewriting single parts
//!
//! ```
//! use pptx_toolkit::{rewrite_colors, ColorMapping};
//!
//! let mapping = ColorMapping::parse("accent1:accent2,accent2:accent3").unwrap();
//! let xml = br#"<a:schemeClr val="accent1"/><a:schemeClr val="accent2"/>"#;
//! let out = rewrite_colors(xml, &mapping);
//! assert_eq!(
//!     out.as_ref(),
//!     br#"<a:schemeClr val="accent2"/><a:schemeClr val="accent3"/>"#
//! );
//! ```
//!
//! ## Themes
//!
//! ```no_run
//! let themes = pptx_toolkit::list_themes("deck.pptx")?;
//! for theme in &themes {
//!     println!("{} ({}): accent1 = {}", theme.file_name, theme.theme_name, theme.colors.accent1);
//! }
//! # Ok::<(), pptx_toolkit::Error>(())
//! ```

pub mod color;
pub mod container;
pub mod detect;
pub mod error;
pub mod pptx;
pub mod processor;
pub mod rewrite;
pub mod scope;

// Re-exports
pub use color::{parse_color_mapping, Color, ColorMapping, ColorPair, HexColor, SchemeColor};
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use detect::{detect_presentation_from_bytes, PresentationKind};
pub use error::{Error, MappingSide, Result};
pub use pptx::{read_themes, slide_content, ColorScheme, SlideOrder, Theme, ThemeGraph};
pub use processor::{list_themes, swap_colors, swap_colors_bytes, ProcessSummary};
pub use rewrite::{
    replace_scheme_colors, replace_scheme_colors_with_srgb, replace_srgb_colors, rewrite_colors,
};
pub use scope::{parse_slide_range, PartFilter, Scope, ScopeSelection};
