//! Theme parts (`ppt/theme/themeN.xml`) and their color schemes.

use crate::color::SchemeColor;
use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

/// Directory holding theme parts.
pub const THEME_DIR: &str = "ppt/theme/";

const DEFAULT_COLOR: &str = "000000";

/// The 12 scheme colors of a theme, as six-digit hex values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub dk1: String,
    pub lt1: String,
    pub dk2: String,
    pub lt2: String,
    pub accent1: String,
    pub accent2: String,
    pub accent3: String,
    pub accent4: String,
    pub accent5: String,
    pub accent6: String,
    pub hlink: String,
    pub fol_hlink: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        let black = || DEFAULT_COLOR.to_string();
        Self {
            dk1: black(),
            lt1: black(),
            dk2: black(),
            lt2: black(),
            accent1: black(),
            accent2: black(),
            accent3: black(),
            accent4: black(),
            accent5: black(),
            accent6: black(),
            hlink: black(),
            fol_hlink: black(),
        }
    }
}

impl ColorScheme {
    /// Hex value bound to a scheme color.
    pub fn get(&self, color: SchemeColor) -> &str {
        match color {
            SchemeColor::Dk1 => &self.dk1,
            SchemeColor::Lt1 => &self.lt1,
            SchemeColor::Dk2 => &self.dk2,
            SchemeColor::Lt2 => &self.lt2,
            SchemeColor::Accent1 => &self.accent1,
            SchemeColor::Accent2 => &self.accent2,
            SchemeColor::Accent3 => &self.accent3,
            SchemeColor::Accent4 => &self.accent4,
            SchemeColor::Accent5 => &self.accent5,
            SchemeColor::Accent6 => &self.accent6,
            SchemeColor::Hlink => &self.hlink,
            SchemeColor::FolHlink => &self.fol_hlink,
        }
    }

    fn slot_mut(&mut self, color: SchemeColor) -> &mut String {
        match color {
            SchemeColor::Dk1 => &mut self.dk1,
            SchemeColor::Lt1 => &mut self.lt1,
            SchemeColor::Dk2 => &mut self.dk2,
            SchemeColor::Lt2 => &mut self.lt2,
            SchemeColor::Accent1 => &mut self.accent1,
            SchemeColor::Accent2 => &mut self.accent2,
            SchemeColor::Accent3 => &mut self.accent3,
            SchemeColor::Accent4 => &mut self.accent4,
            SchemeColor::Accent5 => &mut self.accent5,
            SchemeColor::Accent6 => &mut self.accent6,
            SchemeColor::Hlink => &mut self.hlink,
            SchemeColor::FolHlink => &mut self.fol_hlink,
        }
    }

    /// Iterate over `(token, hex)` in scheme order.
    pub fn iter(&self) -> impl Iterator<Item = (SchemeColor, &str)> {
        SchemeColor::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// A theme part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// File name inside `ppt/theme/`, e.g. `theme1.xml`.
    pub file_name: String,
    /// Display name from the `name` attribute of the theme element.
    pub theme_name: String,
    /// Display name of the color scheme.
    pub color_scheme_name: String,
    pub colors: ColorScheme,
}

impl Theme {
    /// File name without the `.xml` extension, as accepted by theme filters.
    pub fn id(&self) -> &str {
        self.file_name.strip_suffix(".xml").unwrap_or(&self.file_name)
    }
}

/// Parse one theme part.
///
/// Colors come from `srgbClr/@val`, or `sysClr/@lastClr` for system colors.
/// Missing colors default to `000000`.
pub fn parse_theme_xml(xml: &str, file_name: &str) -> Result<Theme> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut theme_name = None;
    let mut scheme_name = None;
    let mut colors = ColorScheme::default();
    let mut in_scheme = false;
    let mut current: Option<SchemeColor> = None;
    let mut resolved = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"theme" if theme_name.is_none() => {
                        theme_name = Some(attribute(e, b"name").unwrap_or_default());
                    }
                    b"clrScheme" if scheme_name.is_none() => {
                        scheme_name = Some(attribute(e, b"name").unwrap_or_default());
                        in_scheme = true;
                    }
                    b"srgbClr" | b"sysClr" if !resolved => {
                        if let Some(token) = current {
                            let key: &[u8] = if local.as_ref() == b"srgbClr" {
                                b"val"
                            } else {
                                b"lastClr"
                            };
                            if let Some(value) = attribute(e, key).filter(|v| !v.is_empty()) {
                                *colors.slot_mut(token) = value;
                                resolved = true;
                            }
                        }
                    }
                    name if in_scheme && current.is_none() => {
                        current = SchemeColor::from_bytes(name);
                        resolved = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local = e.local_name();
                if in_scheme {
                    if local.as_ref() == b"clrScheme" {
                        // Only the first color scheme is read.
                        break;
                    }
                    if current.map(|c| c.as_str().as_bytes()) == Some(local.as_ref()) {
                        current = None;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let theme_name = theme_name
        .ok_or_else(|| Error::XmlParse(format!("{}: no theme element found", file_name)))?;
    let scheme_name = scheme_name
        .ok_or_else(|| Error::XmlParse(format!("{}: no clrScheme element found", file_name)))?;

    Ok(Theme {
        file_name: file_name.to_string(),
        theme_name: if theme_name.is_empty() {
            file_name.to_string()
        } else {
            theme_name
        },
        color_scheme_name: if scheme_name.is_empty() {
            "Unknown".to_string()
        } else {
            scheme_name
        },
        colors,
    })
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Read every theme part of a presentation, ordered by theme number.
///
/// Theme parts that fail to parse are skipped with a warning.
pub fn read_themes(container: &OoxmlContainer) -> Result<Vec<Theme>> {
    let mut paths: Vec<String> = container
        .list_files_with_prefix(THEME_DIR)
        .into_iter()
        .filter(|p| {
            let rest = &p[THEME_DIR.len()..];
            !rest.contains('/') && rest.ends_with(".xml")
        })
        .collect();

    if paths.is_empty() {
        return Err(Error::MissingComponent("ppt/theme".to_string()));
    }

    paths.sort_by(|a, b| theme_sort_key(a).cmp(&theme_sort_key(b)));

    let mut themes = Vec::with_capacity(paths.len());
    for path in &paths {
        let file_name = &path[THEME_DIR.len()..];
        match container
            .read_xml(path)
            .and_then(|xml| parse_theme_xml(&xml, file_name))
        {
            Ok(theme) => themes.push(theme),
            Err(e) => log::warn!("skipping theme {}: {}", path, e),
        }
    }

    Ok(themes)
}

/// Sort `theme2.xml` before `theme10.xml`.
fn theme_sort_key(path: &str) -> (u32, &str) {
    let number = path
        .rsplit('/')
        .next()
        .and_then(|name| name.strip_prefix("theme"))
        .and_then(|rest| rest.strip_suffix(".xml"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX);
    (number, path)
}

/// Serialize themes as pretty-printed JSON.
pub fn themes_to_json(themes: &[Theme]) -> Result<String> {
    Ok(serde_json::to_string_pretty(themes)?)
}
