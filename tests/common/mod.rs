//! In-memory presentation fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

const PRESENTATION_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Body shared by every generated slide, layout and master: one scheme
/// fill and one literal line color.
pub const SHAPE: &str = r#"<p:sp><p:spPr><a:solidFill><a:schemeClr val="accent1"><a:lumMod val="75000"/></a:schemeClr></a:solidFill><a:ln><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:ln></p:spPr></p:sp>"#;

/// A PresentationML part with [`SHAPE`] inside.
pub fn part_xml(root: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:{root} xmlns:a="{NS_A}" xmlns:p="{NS_P}" xmlns:r="{NS_R}"><p:cSld><p:spTree>{SHAPE}</p:spTree></p:cSld></p:{root}>"#
    )
}

/// A chart part with one scheme fill.
pub fn chart_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}"><c:chart><c:spPr><a:solidFill><a:schemeClr val="accent1"/></a:solidFill></c:spPr></c:chart></c:chartSpace>"#
    )
}

pub fn theme_xml(name: &str, accent1: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="{NS_A}" name="{name}"><a:themeElements><a:clrScheme name="{name} Colors"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="{accent1}"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme></a:themeElements></a:theme>"#
    )
}

/// Relationship descriptor from `(id, kind, target)` triples.
pub fn rels_xml(rels: &[(String, String, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{NS_R}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// One `(id, kind, target)` relationship triple.
pub fn rel(id: usize, kind: &str, target: impl Into<String>) -> (String, String, String) {
    (format!("rId{}", id), kind.to_string(), target.into())
}

struct Slide {
    layout: usize,
    extra: Vec<(String, String)>,
}

/// Builds a small but structurally complete presentation.
///
/// Themes, masters and layouts are numbered from 1 in the order they are
/// added. Slides are listed in `sldIdLst` in the order they are added.
#[derive(Default)]
pub struct DeckBuilder {
    themes: Vec<String>,
    masters: Vec<usize>,
    layouts: Vec<usize>,
    slides: Vec<Slide>,
    files: Vec<(String, Vec<u8>, CompressionMethod)>,
    reverse_slide_files: bool,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One theme, one master, one layout and `slides` slides.
    pub fn simple(slides: usize) -> Self {
        let mut deck = Self::new().theme("Office Theme").master(1).layout(1);
        for _ in 0..slides {
            deck = deck.slide(1);
        }
        deck
    }

    pub fn theme(mut self, name: &str) -> Self {
        self.themes.push(name.to_string());
        self
    }

    pub fn master(mut self, theme: usize) -> Self {
        self.masters.push(theme);
        self
    }

    pub fn layout(mut self, master: usize) -> Self {
        self.layouts.push(master);
        self
    }

    pub fn slide(mut self, layout: usize) -> Self {
        self.slides.push(Slide {
            layout,
            extra: Vec::new(),
        });
        self
    }

    /// Add a relationship from the most recently added slide.
    pub fn link(mut self, kind: &str, target: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.extra.push((kind.to_string(), target.to_string()));
        }
        self
    }

    /// Name slide files in reverse of their visual order.
    pub fn reversed_slide_files(mut self) -> Self {
        self.reverse_slide_files = true;
        self
    }

    pub fn file(self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.file_with(name, content, CompressionMethod::Deflated)
    }

    pub fn file_with(
        mut self,
        name: &str,
        content: impl Into<Vec<u8>>,
        method: CompressionMethod,
    ) -> Self {
        self.files.push((name.to_string(), content.into(), method));
        self
    }

    /// File name of the slide shown at `number` (1-based).
    pub fn slide_file(&self, number: usize) -> String {
        let n = if self.reverse_slide_files {
            self.slides.len() + 1 - number
        } else {
            number
        };
        format!("ppt/slides/slide{}.xml", n)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts: Vec<(String, Vec<u8>, CompressionMethod)> = Vec::new();
        let mut add = |name: String, content: String| {
            parts.push((name, content.into_bytes(), CompressionMethod::Deflated));
        };

        add(
            "[Content_Types].xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="{PRESENTATION_CT}"/></Types>"#
            ),
        );
        add(
            "_rels/.rels".into(),
            rels_xml(&[rel(1, "officeDocument", "ppt/presentation.xml")]),
        );

        let mut pres_rels = Vec::new();
        let mut master_ids = String::new();
        for (i, _) in self.masters.iter().enumerate() {
            let id = pres_rels.len() + 1;
            pres_rels.push(rel(id, "slideMaster", format!("slideMasters/slideMaster{}.xml", i + 1)));
            master_ids.push_str(&format!(
                r#"<p:sldMasterId id="{}" r:id="rId{}"/>"#,
                2147483648u64 + i as u64,
                id
            ));
        }
        let mut slide_ids = String::new();
        for number in 1..=self.slides.len() {
            let id = pres_rels.len() + 1;
            let file = self.slide_file(number);
            pres_rels.push(rel(id, "slide", file.trim_start_matches("ppt/").to_string()));
            slide_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                255 + number,
                id
            ));
        }
        add(
            "ppt/presentation.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{NS_A}" xmlns:p="{NS_P}" xmlns:r="{NS_R}"><p:sldMasterIdLst>{master_ids}</p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst></p:presentation>"#
            ),
        );
        add("ppt/_rels/presentation.xml.rels".into(), rels_xml(&pres_rels));

        for (i, name) in self.themes.iter().enumerate() {
            add(
                format!("ppt/theme/theme{}.xml", i + 1),
                theme_xml(name, &format!("{:06X}", 0x156082 + i)),
            );
        }

        for (i, theme) in self.masters.iter().enumerate() {
            let n = i + 1;
            add(format!("ppt/slideMasters/slideMaster{}.xml", n), part_xml("sldMaster"));
            let mut rels = vec![rel(1, "theme", format!("../theme/theme{}.xml", theme))];
            for (l, master) in self.layouts.iter().enumerate() {
                if *master == n {
                    rels.push(rel(rels.len() + 1, "slideLayout", format!("../slideLayouts/slideLayout{}.xml", l + 1)));
                }
            }
            add(format!("ppt/slideMasters/_rels/slideMaster{}.xml.rels", n), rels_xml(&rels));
        }

        for (i, master) in self.layouts.iter().enumerate() {
            let n = i + 1;
            add(format!("ppt/slideLayouts/slideLayout{}.xml", n), part_xml("sldLayout"));
            add(
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                rels_xml(&[rel(1, "slideMaster", format!("../slideMasters/slideMaster{}.xml", master))]),
            );
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let file = self.slide_file(i + 1);
            let name = file.trim_start_matches("ppt/slides/");
            let mut rels = vec![rel(1, "slideLayout", format!("../slideLayouts/slideLayout{}.xml", slide.layout))];
            for (kind, target) in &slide.extra {
                rels.push(rel(rels.len() + 1, kind, target.clone()));
            }
            add(file.clone(), part_xml("sld"));
            add(format!("ppt/slides/_rels/{}.rels", name), rels_xml(&rels));
        }

        parts.extend(self.files.iter().cloned());
        write_zip(&parts)
    }
}

pub fn write_zip(parts: &[(String, Vec<u8>, CompressionMethod)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content, method) in parts {
        let options = SimpleFileOptions::default().compression_method(*method);
        if name.ends_with('/') {
            zip.add_directory(name.as_str(), options).unwrap();
        } else {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(content).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Content of one archive entry as a string.
pub fn read_entry(archive: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

/// Entry names with their compression method, in archive order.
pub fn entries(archive: &[u8]) -> Vec<(String, CompressionMethod)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|i| {
            let file = zip.by_index(i).unwrap();
            (file.name().to_string(), file.compression())
        })
        .collect()
}
