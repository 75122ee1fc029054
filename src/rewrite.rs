//! Structure-preserving color rewriting over raw XML bytes.
//!
//! Color references in DrawingML come in two element kinds, recognized by
//! local name whatever their namespace prefix:
//!
//! - `schemeClr` carrying a scheme token in `val`, possibly with modifier
//!   children (`lumMod`, `tint`, ...)
//! - `srgbClr` carrying a six-digit hex value in `val`
//!
//! Every function here scans the original bytes once with quick-xml, collects
//! the byte ranges to replace, and splices them in a single pass. Output is
//! never scanned again, so `{accent1→accent2, accent2→accent3}` turns
//! `accent1` into `accent2` and `accent2` into `accent3`. Everything outside
//! the replaced ranges is copied through byte for byte.
//!
//! Input that quick-xml cannot read through is returned unchanged.

use crate::color::{is_hex_color, Color, ColorMapping, SchemeColor};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::ops::Range;

const SCHEME_CLR: &[u8] = b"schemeClr";
const SRGB_CLR: &[u8] = b"srgbClr";
const VAL: &[u8] = b"val";

/// Which replacements a scan is allowed to make.
#[derive(Debug, Clone, Copy)]
struct Passes {
    scheme_to_scheme: bool,
    scheme_to_hex: bool,
    hex_source: bool,
}

impl Passes {
    const SCHEME_VALUES: Passes = Passes {
        scheme_to_scheme: true,
        scheme_to_hex: false,
        hex_source: false,
    };
    const SCHEME: Passes = Passes {
        scheme_to_scheme: true,
        scheme_to_hex: true,
        hex_source: false,
    };
    const RGB: Passes = Passes {
        scheme_to_scheme: false,
        scheme_to_hex: false,
        hex_source: true,
    };
    const ALL: Passes = Passes {
        scheme_to_scheme: true,
        scheme_to_hex: true,
        hex_source: true,
    };
}

/// A byte range of the original document and what replaces it.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    replacement: Vec<u8>,
}

/// Result of rewriting one document.
#[derive(Debug)]
pub struct Rewrite<'a> {
    /// The rewritten bytes, borrowed from the input when nothing changed.
    pub content: Cow<'a, [u8]>,
    /// Number of color elements rewritten.
    pub replacements: usize,
}

impl Rewrite<'_> {
    /// Returns true if any element was rewritten.
    pub fn is_modified(&self) -> bool {
        matches!(self.content, Cow::Owned(_))
    }
}

/// Rewrite scheme-to-scheme references only, by changing `val` in place.
///
/// Hex targets in the mapping are ignored.
pub fn replace_scheme_colors<'a>(xml: &'a [u8], mapping: &ColorMapping) -> Cow<'a, [u8]> {
    rewrite_lossy(xml, mapping, Passes::SCHEME_VALUES)
}

/// Rewrite `schemeClr` elements whose token is a mapping source.
///
/// Scheme targets change `val` in place and keep modifier children. Hex
/// targets replace the whole element, children included, with a self-closing
/// `srgbClr` carrying the uppercase value.
pub fn replace_scheme_colors_with_srgb<'a>(
    xml: &'a [u8],
    mapping: &ColorMapping,
) -> Cow<'a, [u8]> {
    rewrite_lossy(xml, mapping, Passes::SCHEME)
}

/// Rewrite `srgbClr` elements whose value matches a hex source, ignoring case.
///
/// Hex targets change `val` to the uppercase target. Scheme targets replace
/// the element with a self-closing `schemeClr`.
pub fn replace_srgb_colors<'a>(xml: &'a [u8], mapping: &ColorMapping) -> Cow<'a, [u8]> {
    rewrite_lossy(xml, mapping, Passes::RGB)
}

/// Apply the scheme pass and the RGB pass together.
///
/// Both passes are evaluated against the original bytes, so an element
/// produced by one pass is never picked up by the other.
pub fn rewrite_colors<'a>(xml: &'a [u8], mapping: &ColorMapping) -> Cow<'a, [u8]> {
    rewrite_lossy(xml, mapping, Passes::ALL)
}

/// Like [`rewrite_colors`], but reports scan failures and the number of
/// replacements.
pub fn try_rewrite_colors<'a>(
    xml: &'a [u8],
    mapping: &ColorMapping,
) -> Result<Rewrite<'a>, quick_xml::Error> {
    rewrite(xml, mapping, Passes::ALL)
}

fn rewrite_lossy<'a>(xml: &'a [u8], mapping: &ColorMapping, passes: Passes) -> Cow<'a, [u8]> {
    match rewrite(xml, mapping, passes) {
        Ok(result) => result.content,
        Err(e) => {
            log::debug!("leaving document unchanged: {}", e);
            Cow::Borrowed(xml)
        }
    }
}

fn rewrite<'a>(
    xml: &'a [u8],
    mapping: &ColorMapping,
    passes: Passes,
) -> Result<Rewrite<'a>, quick_xml::Error> {
    if mapping.is_empty() {
        return Ok(Rewrite {
            content: Cow::Borrowed(xml),
            replacements: 0,
        });
    }

    let edits = collect_edits(xml, mapping, passes)?;
    let replacements = edits.len();
    let content = if edits.is_empty() {
        Cow::Borrowed(xml)
    } else {
        Cow::Owned(splice(xml, &edits))
    };

    Ok(Rewrite {
        content,
        replacements,
    })
}

fn collect_edits(
    xml: &[u8],
    mapping: &ColorMapping,
    passes: Passes,
) -> Result<Vec<Edit>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    let mut edits = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let (tag, self_closing) = match reader.read_event()? {
            Event::Start(tag) => (tag, false),
            Event::Empty(tag) => (tag, true),
            Event::Eof => break,
            _ => continue,
        };

        let element = Element {
            start,
            tag_end: reader.buffer_position() as usize,
            self_closing,
        };

        let edit = match tag.local_name().as_ref() {
            SCHEME_CLR => scheme_edit(xml, &mut reader, &tag, &element, mapping, passes)?,
            SRGB_CLR if passes.hex_source => rgb_edit(xml, &mut reader, &tag, &element, mapping)?,
            _ => None,
        };

        edits.extend(edit);
    }

    Ok(edits)
}

/// Position of an opening or self-closing tag in the document.
struct Element {
    start: usize,
    tag_end: usize,
    self_closing: bool,
}

impl Element {
    /// Absolute range of the `val` attribute value.
    fn value_range(&self, xml: &[u8]) -> Option<Range<usize>> {
        let span = attribute_span(&xml[self.start..self.tag_end], VAL)?;
        Some(self.start + span.start..self.start + span.end)
    }

    /// End of the whole element, consuming its children for container form.
    fn end(&self, reader: &mut Reader<&[u8]>, tag: &BytesStart) -> Result<usize, quick_xml::Error> {
        if self.self_closing {
            return Ok(self.tag_end);
        }
        reader.read_to_end(tag.name())?;
        Ok(reader.buffer_position() as usize)
    }
}

fn scheme_edit(
    xml: &[u8],
    reader: &mut Reader<&[u8]>,
    tag: &BytesStart,
    element: &Element,
    mapping: &ColorMapping,
    passes: Passes,
) -> Result<Option<Edit>, quick_xml::Error> {
    let Some(value) = element.value_range(xml) else {
        return Ok(None);
    };
    let Some(target) = SchemeColor::from_bytes(&xml[value.clone()])
        .and_then(|source| mapping.target_for_scheme(source))
    else {
        return Ok(None);
    };

    let edit = match target {
        Color::Scheme(token) if passes.scheme_to_scheme => Edit {
            range: value,
            replacement: token.as_str().as_bytes().to_vec(),
        },
        Color::Hex(hex) if passes.scheme_to_hex => Edit {
            range: element.start..element.end(reader, tag)?,
            replacement: color_element(tag, SRGB_CLR, &hex.canonical()),
        },
        _ => return Ok(None),
    };

    Ok(Some(edit))
}

fn rgb_edit(
    xml: &[u8],
    reader: &mut Reader<&[u8]>,
    tag: &BytesStart,
    element: &Element,
    mapping: &ColorMapping,
) -> Result<Option<Edit>, quick_xml::Error> {
    let Some(value) = element.value_range(xml) else {
        return Ok(None);
    };
    let Some(target) = std::str::from_utf8(&xml[value.clone()])
        .ok()
        .filter(|v| is_hex_color(v))
        .and_then(|v| mapping.target_for_hex(v))
    else {
        return Ok(None);
    };

    let edit = match target {
        Color::Hex(hex) => Edit {
            range: value,
            replacement: hex.canonical().into_bytes(),
        },
        Color::Scheme(token) => Edit {
            range: element.start..element.end(reader, tag)?,
            replacement: color_element(tag, SCHEME_CLR, token.as_str()),
        },
    };

    Ok(Some(edit))
}

/// Build `<prefix:local val="value"/>` reusing the prefix of `tag`.
fn color_element(tag: &BytesStart, local: &[u8], value: &str) -> Vec<u8> {
    let name = tag.name();
    let mut out = Vec::with_capacity(local.len() + value.len() + 16);
    out.push(b'<');
    if let Some(prefix) = name.prefix() {
        out.extend_from_slice(prefix.as_ref());
        out.push(b':');
    }
    out.extend_from_slice(local);
    out.extend_from_slice(b" val=\"");
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(b"\"/>");
    out
}

/// Locate the value of attribute `name` inside a raw tag such as
/// `<a:schemeClr val="accent1">`. Returns the range between the quotes.
fn attribute_span(tag: &[u8], name: &[u8]) -> Option<Range<usize>> {
    let is_ws = |b: u8| b.is_ascii_whitespace();
    let is_tag_end = |b: u8| b == b'/' || b == b'>';
    let len = tag.len();

    // Skip `<` and the element name.
    let mut i = 1;
    while i < len && !is_ws(tag[i]) && !is_tag_end(tag[i]) {
        i += 1;
    }

    loop {
        while i < len && is_ws(tag[i]) {
            i += 1;
        }
        if i >= len || is_tag_end(tag[i]) {
            return None;
        }

        let name_start = i;
        while i < len && tag[i] != b'=' && !is_ws(tag[i]) && !is_tag_end(tag[i]) {
            i += 1;
        }
        let attr_name = &tag[name_start..i];

        while i < len && is_ws(tag[i]) {
            i += 1;
        }
        if tag.get(i) != Some(&b'=') {
            return None;
        }
        i += 1;
        while i < len && is_ws(tag[i]) {
            i += 1;
        }

        let quote = *tag.get(i).filter(|&&q| q == b'"' || q == b'\'')?;
        let value_start = i + 1;
        let value_end = value_start + tag[value_start..].iter().position(|&b| b == quote)?;

        if attr_name == name {
            return Some(value_start..value_end);
        }
        i = value_end + 1;
    }
}

fn splice(xml: &[u8], edits: &[Edit]) -> Vec<u8> {
    let mut out = Vec::with_capacity(xml.len());
    let mut last = 0;
    for edit in edits {
        out.extend_from_slice(&xml[last..edit.range.start]);
        out.extend_from_slice(&edit.replacement);
        last = edit.range.end;
    }
    out.extend_from_slice(&xml[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#;
    const TAIL: &str = "</p:sld>";

    fn doc(body: &str) -> String {
        format!("{}{}{}", HEAD, body, TAIL)
    }

    fn mapping(spec: &str) -> ColorMapping {
        ColorMapping::parse(spec).unwrap()
    }

    fn apply(body: &str, spec: &str) -> String {
        let xml = doc(body);
        let out = rewrite_colors(xml.as_bytes(), &mapping(spec));
        String::from_utf8(out.into_owned()).unwrap()
    }

    #[test]
    fn test_scheme_to_scheme_replacement() {
        let out = apply(
            r#"<a:sp><a:schemeClr val="accent1"/></a:sp><a:sp><a:schemeClr val="accent2"/></a:sp>"#,
            "accent1:accent6",
        );
        assert_eq!(
            out,
            doc(r#"<a:sp><a:schemeClr val="accent6"/></a:sp><a:sp><a:schemeClr val="accent2"/></a:sp>"#)
        );
    }

    #[test]
    fn test_replacement_is_atomic() {
        let out = apply(
            r#"<a:schemeClr val="accent1"/><a:schemeClr val="accent2"/>"#,
            "accent1:accent2,accent2:accent3",
        );
        assert_eq!(
            out,
            doc(r#"<a:schemeClr val="accent2"/><a:schemeClr val="accent3"/>"#)
        );
    }

    #[test]
    fn test_swap_is_atomic() {
        let out = apply(
            r#"<a:schemeClr val="accent1"/><a:schemeClr val="accent2"/>"#,
            "accent1:accent2,accent2:accent1",
        );
        assert_eq!(
            out,
            doc(r#"<a:schemeClr val="accent2"/><a:schemeClr val="accent1"/>"#)
        );
    }

    #[test]
    fn test_many_to_one() {
        let out = apply(
            r#"<a:schemeClr val="accent1"/><a:schemeClr val="accent5"/><a:schemeClr val="accent3"/>"#,
            "accent1:accent3,accent5:accent3",
        );
        assert_eq!(
            out,
            doc(r#"<a:schemeClr val="accent3"/><a:schemeClr val="accent3"/><a:schemeClr val="accent3"/>"#)
        );
    }

    #[test]
    fn test_empty_mapping_borrows_input() {
        let xml = doc(r#"<a:schemeClr val="accent1"/>"#);
        let out = rewrite_colors(xml.as_bytes(), &ColorMapping::default());
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), xml.as_bytes());
    }

    #[test]
    fn test_unmatched_document_borrows_input() {
        let xml = doc(r#"<a:schemeClr val="accent2"/><a:srgbClr val="00FF00"/>"#);
        let result = try_rewrite_colors(xml.as_bytes(), &mapping("accent1:accent3,FF0000:dk1")).unwrap();
        assert!(!result.is_modified());
        assert_eq!(result.replacements, 0);
    }

    #[test]
    fn test_scheme_to_hex_drops_modifiers() {
        let body = r#"<a:solidFill><a:schemeClr val="accent1"><a:lumMod val="75000"/><a:lumOff val="25000"/></a:schemeClr></a:solidFill>"#;
        let out = apply(body, "accent1:bbffcc");
        assert_eq!(out, doc(r#"<a:solidFill><a:srgbClr val="BBFFCC"/></a:solidFill>"#));
    }

    #[test]
    fn test_scheme_to_scheme_keeps_modifiers() {
        let body = r#"<a:solidFill><a:schemeClr val="accent1"><a:lumMod val="75000"/><a:lumOff val="25000"/></a:schemeClr></a:solidFill>"#;
        let out = apply(body, "accent1:accent4");
        assert_eq!(out, doc(&body.replace("accent1", "accent4")));
    }

    #[test]
    fn test_scheme_pass_ignores_hex_targets_without_srgb() {
        let xml = doc(r#"<a:schemeClr val="accent1"/><a:schemeClr val="accent2"/>"#);
        let out = replace_scheme_colors(xml.as_bytes(), &mapping("accent1:FF0000,accent2:dk1"));
        assert_eq!(
            out.as_ref(),
            doc(r#"<a:schemeClr val="accent1"/><a:schemeClr val="dk1"/>"#).as_bytes()
        );
    }

    #[test]
    fn test_hex_to_hex_ignores_case() {
        let out = apply(
            r#"<a:srgbClr val="ff0000"/><a:srgbClr val="FF0000"/><a:srgbClr val="Ff0000"/>"#,
            "FF0000:00ff00",
        );
        assert_eq!(
            out,
            doc(r#"<a:srgbClr val="00FF00"/><a:srgbClr val="00FF00"/><a:srgbClr val="00FF00"/>"#)
        );
    }

    #[test]
    fn test_hex_to_scheme_replaces_element() {
        let out = apply(
            r#"<a:srgbClr val="AABBCC"/><a:srgbClr val="AABBCC"><a:alpha val="50000"/></a:srgbClr>"#,
            "aabbcc:accent2",
        );
        assert_eq!(
            out,
            doc(r#"<a:schemeClr val="accent2"/><a:schemeClr val="accent2"/>"#)
        );
    }

    #[test]
    fn test_rgb_pass_leaves_scheme_elements() {
        let xml = doc(r#"<a:schemeClr val="accent1"/><a:srgbClr val="FF0000"/>"#);
        let out = replace_srgb_colors(xml.as_bytes(), &mapping("accent1:accent2,FF0000:dk2"));
        assert_eq!(
            out.as_ref(),
            doc(r#"<a:schemeClr val="accent1"/><a:schemeClr val="dk2"/>"#).as_bytes()
        );
    }

    #[test]
    fn test_passes_do_not_cascade_into_each_other() {
        let out = apply(
            r#"<a:schemeClr val="accent1"/><a:srgbClr val="FF0000"/>"#,
            "accent1:FF0000,FF0000:accent1",
        );
        assert_eq!(
            out,
            doc(r#"<a:srgbClr val="FF0000"/><a:schemeClr val="accent1"/>"#)
        );
    }

    #[test]
    fn test_prefix_agnostic_matching() {
        let xml = concat!(
            r#"<root xmlns="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:x="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<schemeClr val="accent1"/><x:schemeClr val="accent1"/><x:srgbClr val="123abc"/></root>"#
        );
        let out = rewrite_colors(xml.as_bytes(), &mapping("accent1:dk2,123ABC:lt1"));
        assert_eq!(
            String::from_utf8(out.into_owned()).unwrap(),
            concat!(
                r#"<root xmlns="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                r#"xmlns:x="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
                r#"<schemeClr val="dk2"/><x:schemeClr val="dk2"/><x:schemeClr val="lt1"/></root>"#
            )
        );
    }

    #[test]
    fn test_other_attributes_and_layout_preserved() {
        let out = apply(
            "<a:srgbClr  foo='1'\n  val='ff0000' />",
            "FF0000:0000FF",
        );
        assert_eq!(out, doc("<a:srgbClr  foo='1'\n  val='0000FF' />"));
    }

    #[test]
    fn test_similar_names_not_matched() {
        let xml = doc(r#"<a:schemeClrX val="accent1"/><a:prstClr val="accent1"/><a:sysClr val="windowText" lastClr="000000"/>"#);
        let out = rewrite_colors(xml.as_bytes(), &mapping("accent1:accent2,000000:FFFFFF"));
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_commented_elements_untouched() {
        let xml = doc(r#"<!-- <a:schemeClr val="accent1"/> --><a:schemeClr val="accent1"/>"#);
        let out = rewrite_colors(xml.as_bytes(), &mapping("accent1:accent2"));
        assert_eq!(
            out.as_ref(),
            doc(r#"<!-- <a:schemeClr val="accent1"/> --><a:schemeClr val="accent2"/>"#).as_bytes()
        );
    }

    #[test]
    fn test_malformed_xml_returned_unchanged() {
        let xml = br#"<a:sp><a:schemeClr val="accent1"/></a:wrong>"#;
        let out = rewrite_colors(xml, &mapping("accent1:accent2"));
        assert_eq!(out.as_ref(), xml);

        let garbage = b"\x00\x01not xml at all";
        assert_eq!(rewrite_colors(garbage, &mapping("accent1:accent2")).as_ref(), garbage);
        assert!(try_rewrite_colors(xml, &mapping("accent1:accent2")).is_err());
    }

    #[test]
    fn test_replacement_count() {
        let xml = doc(r#"<a:schemeClr val="accent1"/><a:srgbClr val="FF0000"/><a:schemeClr val="dk1"/>"#);
        let result = try_rewrite_colors(xml.as_bytes(), &mapping("accent1:lt1,ff0000:000000")).unwrap();
        assert_eq!(result.replacements, 2);
        assert!(result.is_modified());
    }

    #[test]
    fn test_attribute_span() {
        let tag = br#"<a:schemeClr val="accent1">"#;
        assert_eq!(&tag[attribute_span(tag, b"val").unwrap()], b"accent1");

        let tag = br#"<a:srgbClr lastVal="x" val = 'ABCDEF'/>"#;
        assert_eq!(&tag[attribute_span(tag, b"val").unwrap()], b"ABCDEF");

        assert!(attribute_span(b"<a:schemeClr/>", b"val").is_none());
    }
}
