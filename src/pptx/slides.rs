//! Visual slide order and the parts owned by each slide.

use super::relations::{kind, relationships_or_empty};
use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeSet;

/// Main presentation part.
pub const PRESENTATION: &str = "ppt/presentation.xml";

/// Slide parts in visual order, as listed in `p:sldIdLst`.
///
/// Slide numbers are 1-based. An entry whose relationship cannot be resolved
/// still counts as a slide but has no part.
#[derive(Debug, Clone, Default)]
pub struct SlideOrder {
    slides: Vec<Option<String>>,
}

impl SlideOrder {
    /// Read the slide list of a presentation.
    pub fn read(container: &OoxmlContainer) -> Result<Self> {
        if !container.exists(PRESENTATION) {
            return Err(Error::MissingComponent(PRESENTATION.to_string()));
        }

        let rels = container.read_relationships(PRESENTATION)?;
        let xml = container.read_xml(PRESENTATION)?;

        let slides = parse_slide_ids(&xml)?
            .into_iter()
            .map(|rel_id| {
                let rel = rels
                    .get(&rel_id)
                    .filter(|r| r.kind() == kind::SLIDE && !r.external);
                if rel.is_none() {
                    log::warn!("slide relationship {} does not resolve", rel_id);
                }
                rel.map(|r| OoxmlContainer::resolve_path(PRESENTATION, &r.target))
            })
            .collect();

        Ok(Self { slides })
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Returns true if the presentation has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Part path of a 1-based slide number.
    pub fn part(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.slides.get(i))
            .and_then(|p| p.as_deref())
    }

    /// Iterate over `(number, part)` for every resolved slide.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slides
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_deref().map(|p| (i + 1, p)))
    }

    /// Check that every number names an existing slide. Numbers start at 1.
    ///
    /// All offending numbers are reported together.
    pub fn validate(&self, numbers: &[usize]) -> Result<()> {
        let total = self.len();
        let invalid: Vec<usize> = numbers
            .iter()
            .copied()
            .filter(|&n| n == 0 || n > total)
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(Error::SlidesOutOfRange { invalid, total })
        }
    }

    /// Parts belonging to the given slides: each slide plus its charts,
    /// diagrams and notes.
    pub fn content(&self, container: &OoxmlContainer, numbers: &[usize]) -> BTreeSet<String> {
        numbers
            .iter()
            .filter_map(|&n| self.part(n))
            .flat_map(|slide| slide_content(container, slide))
            .collect()
    }
}

/// Relationship IDs of `sldId` entries, in document order.
fn parse_slide_ids(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"sldId" =>
            {
                // r:id, whatever the relationships prefix is called
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
                    .map(|a| String::from_utf8_lossy(&a.value).to_string());

                if let Some(rel_id) = rel_id.filter(|id| !id.is_empty()) {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// A slide part and everything it owns.
///
/// Charts bring along their own XML sub-parts (colors, style) but not
/// embedded workbooks. All five diagram parts and the notes slide are
/// included.
pub fn slide_content(container: &OoxmlContainer, slide: &str) -> BTreeSet<String> {
    let mut parts = BTreeSet::new();
    parts.insert(slide.to_string());

    for rel in relationships_or_empty(container, slide).iter() {
        if rel.external || rel.target.is_empty() {
            continue;
        }
        let target = OoxmlContainer::resolve_path(slide, &rel.target);

        match rel.kind() {
            kind::CHART => {
                for sub in relationships_or_empty(container, &target).iter() {
                    if sub.external {
                        continue;
                    }
                    let sub_path = OoxmlContainer::resolve_path(&target, &sub.target);
                    if sub_path.ends_with(".xml") {
                        parts.insert(sub_path);
                    }
                }
                parts.insert(target);
            }
            kind::NOTES_SLIDE => {
                parts.insert(target);
            }
            k if kind::DIAGRAM_PARTS.contains(&k) => {
                parts.insert(target);
            }
            _ => {}
        }
    }

    parts
}
