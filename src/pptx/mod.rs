//! PresentationML package structure.
//!
//! Themes, the slide → layout → master → theme chain, and the visual slide
//! order with the parts each slide owns.

pub mod relations;
pub mod slides;
pub mod theme;

pub use relations::{resolve_layout_masters, resolve_master_themes, ThemeGraph};
pub use slides::{slide_content, SlideOrder};
pub use theme::{parse_theme_xml, read_themes, themes_to_json, ColorScheme, Theme};
