//! In-memory OOXML package with relationship descriptor access.
//!
//! The whole archive is read into memory so that parts can be inspected,
//! rewritten, and written back out with their original names, order, and
//! compression methods.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Package-level relationships part.
pub const PACKAGE_RELS: &str = "_rels/.rels";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

impl Relationship {
    /// Last segment of the type URI (`theme`, `slideLayout`, `chart`, ...).
    ///
    /// Transitional and Strict packages use different URI prefixes for the
    /// same relationship, so callers match on this instead of the full URI.
    pub fn kind(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or_default()
    }
}

/// Relationships parsed from one .rels file, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Relationships whose type ends in `kind`.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.items.iter().filter(move |r| r.kind() == kind)
    }

    /// The first relationship of a kind.
    pub fn first_of_kind<'a>(&'a self, kind: &'a str) -> Option<&'a Relationship> {
        self.of_kind(kind).next()
    }

    /// Iterate over all relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.items.push(rel);
    }

    /// Parse the content of a .rels part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let mut reader = quick_xml::Reader::from_str(content);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event()? {
                quick_xml::events::Event::Empty(e) | quick_xml::events::Event::Start(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                        external: false,
                    };

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if !rel.id.is_empty() {
                        rels.add(rel);
                    }
                }
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
        }

        Ok(rels)
    }
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// UTF-16 input has its declaration rewritten to `UTF-8` so the decoded
/// string can be handed straight to quick-xml.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let invalid = |e: std::string::FromUtf8Error| {
        Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    };

    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec()).map_err(invalid),
        [0xFF, 0xFE, rest @ ..] => Ok(fix_xml_encoding_declaration(&decode_utf16(rest, false)?)),
        [0xFE, 0xFF, rest @ ..] => Ok(fix_xml_encoding_declaration(&decode_utf16(rest, true)?)),
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            // ASCII markup in UTF-16 leaves every other byte zero.
            Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
                decode_utf16(bytes, false)
            }
            Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
                decode_utf16(bytes, true)
            }
            Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn fix_xml_encoding_declaration(content: &str) -> String {
    if let (true, Some(end)) = (content.starts_with("<?xml"), content.find("?>")) {
        let (decl, rest) = content.split_at(end + 2);
        let decl = ["\"UTF-16\"", "'UTF-16'", "\"utf-16\"", "'utf-16'"]
            .iter()
            .fold(decl.to_string(), |d, enc| d.replace(enc, "\"UTF-8\""));
        return format!("{}{}", decl, rest);
    }
    content.to_string()
}

/// One entry of the archive.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Entry name inside the ZIP (e.g., `ppt/slides/slide1.xml`).
    pub name: String,
    /// Uncompressed content.
    pub data: Vec<u8>,
    /// Compression method used in the source archive.
    pub compression: CompressionMethod,
    /// Whether this is a directory entry.
    pub is_dir: bool,
}

impl PackageEntry {
    /// Returns true for XML parts (relationship parts excluded).
    pub fn is_xml(&self) -> bool {
        !self.is_dir && self.name.ends_with(".xml")
    }
}

/// OOXML package held in memory.
///
/// Provides methods to read XML parts and relationships, replace part content,
/// and repackage the result.
pub struct OoxmlContainer {
    entries: Vec<PackageEntry>,
    index: HashMap<String, usize>,
}

impl OoxmlContainer {
    /// Create a package from raw archive bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Create a package from a seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        Ok(Self { entries, index })
    }

    /// All entries in archive order.
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Read an XML part as a string, decoding UTF-16 if needed.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(self.read_binary(path)?)
    }

    /// Raw bytes of a part.
    pub fn read_binary(&self, path: &str) -> Result<&[u8]> {
        self.index
            .get(path)
            .map(|&i| self.entries[i].data.as_slice())
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Replace the content of an existing part.
    pub fn replace(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
        let i = *self
            .index
            .get(path)
            .ok_or_else(|| Error::MissingComponent(path.to_string()))?;
        self.entries[i].data = data;
        Ok(())
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// List all entry names.
    pub fn list_files(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// List entry names starting with a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir && e.name.starts_with(prefix))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Path of the relationship descriptor for a part.
    ///
    /// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
    pub fn rels_path(part_path: &str) -> String {
        match part_path.rsplit_once('/') {
            _ if part_path.is_empty() || part_path == "/" => PACKAGE_RELS.to_string(),
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Read the relationships of a part.
    ///
    /// A part without a descriptor has no relationships; a descriptor that
    /// exists but cannot be parsed is an error.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = Self::rels_path(part_path);
        if !self.exists(&rels_path) {
            return Ok(Relationships::new());
        }
        Relationships::parse(&self.read_xml(&rels_path)?)
    }

    /// Resolve a relationship target against the part that owns it.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let mut segments: Vec<&str> = match base.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        };

        for segment in relative.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        segments.join("/")
    }

    /// Write the package as a ZIP archive, keeping entry order and compression.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = zip::ZipWriter::new(writer);

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?)
    }

    /// Serialize the package to archive bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.entries.len())
            .finish()
    }
}
