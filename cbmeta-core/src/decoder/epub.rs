//! EPUB package metadata reader
//!
//! Only the OPF `<metadata>` block is read: the container points at the
//! package document, and every Dublin Core element of interest is collected
//! with its qualifier attributes in document order.

use super::{decode_filename, DecodedFile, SourceKind};
use crate::error::ParseError;
use crate::normalize::{clean_isbn, normalize_metadata};
use crate::types::{MetadataField, RawEntry, RawMetadata, RawValue};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::{NsReader, Reader};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

const CONTAINER_PATH: &str = "META-INF/container.xml";
const DC_NS: &[u8] = b"http://purl.org/dc/elements/1.1/";

/// Decoder for EPUB 2/3 packages
pub struct EpubDecoder;

impl EpubDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Read the raw Dublin Core metadata of a package
    pub fn read_package<R: Read + Seek>(&self, reader: R) -> Result<RawMetadata, ParseError> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| ParseError::InvalidEpub(format!("Invalid EPUB archive: {}", e)))?;

        let container = read_entry(&mut archive, CONTAINER_PATH)?;
        let opf_path = rootfile_path(&container)?;
        let opf = read_entry(&mut archive, &opf_path)?;

        parse_opf_metadata(&opf)
    }
}

impl Default for EpubDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String, ParseError> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ParseError::InvalidEpub(format!("{}: {}", name, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ParseError::InvalidEpub(format!("{}: {}", name, e)))?;
    Ok(content)
}

/// Package document path from `META-INF/container.xml`
fn rootfile_path(container: &str) -> Result<String, ParseError> {
    let mut reader = Reader::from_str(container);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        let path = attr
                            .unescape_value()
                            .map_err(|e| ParseError::InvalidEpub(e.to_string()))?;
                        return Ok(path.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::InvalidEpub(format!("{}: {}", CONTAINER_PATH, e))),
        }
    }

    Err(ParseError::InvalidEpub(
        "container.xml has no rootfile".to_string(),
    ))
}

/// Collect Dublin Core fields from an OPF package document
pub fn parse_opf_metadata(opf: &str) -> Result<RawMetadata, ParseError> {
    let mut reader = NsReader::from_str(opf);
    let mut raw = RawMetadata::new();

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| ParseError::InvalidEpub(format!("OPF: {}", e)))?;

        let is_dc = matches!(ns, ResolveResult::Bound(ref n) if n.as_ref() == DC_NS);
        match event {
            Event::Start(e) if is_dc => {
                let Some(field) = dc_field(&e) else {
                    continue;
                };
                let attributes = qualifiers(&reader, &e)?;
                let text = element_text(&mut reader)?;
                let text = text.trim();

                let value = if text.is_empty() {
                    RawValue::NoValue
                } else {
                    RawValue::Single(text.to_string())
                };
                raw.push(field, RawEntry { value, attributes });
            }
            Event::Empty(e) if is_dc => {
                if let Some(field) = dc_field(&e) {
                    let attributes = qualifiers(&reader, &e)?;
                    raw.push(
                        field,
                        RawEntry {
                            value: RawValue::NoValue,
                            attributes,
                        },
                    );
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"metadata" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(raw)
}

/// Text content of the element just opened, up to its end tag.
///
/// CDATA sections count as text; markup nested inside is skipped but its
/// text is kept.
fn element_text(reader: &mut NsReader<&[u8]>) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::InvalidEpub(format!("OPF: {}", e)))?;
        match event {
            Event::Text(t) => {
                let t = t
                    .unescape()
                    .map_err(|e| ParseError::InvalidEpub(format!("OPF: {}", e)))?;
                text.push_str(&t);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(ParseError::InvalidEpub(
                    "OPF: document ends inside a metadata element".to_string(),
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}

fn dc_field(e: &BytesStart) -> Option<MetadataField> {
    std::str::from_utf8(e.local_name().as_ref())
        .ok()
        .and_then(MetadataField::from_key)
}

/// Attributes keyed `{namespace}name`, or plain `name` when unqualified
fn qualifiers(
    reader: &NsReader<&[u8]>,
    e: &BytesStart,
) -> Result<std::collections::BTreeMap<String, String>, ParseError> {
    let mut map = std::collections::BTreeMap::new();
    for attr in e.attributes().flatten() {
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let local = String::from_utf8_lossy(local.as_ref()).into_owned();
        let key = match ns {
            ResolveResult::Bound(n) => {
                format!("{{{}}}{}", String::from_utf8_lossy(n.as_ref()), local)
            }
            _ => local,
        };
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::InvalidEpub(e.to_string()))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

impl super::Decoder for EpubDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile, ParseError> {
        let name = super::file_name(path)?;
        let info = decode_filename(name)?;

        // A broken package degrades to empty metadata instead of failing the file
        let (raw, degraded) = match File::open(path)
            .map_err(|e| ParseError::InvalidEpub(e.to_string()))
            .and_then(|file| self.read_package(file))
        {
            Ok(raw) => (raw, None),
            Err(e) => {
                tracing::error!("Error reading EPUB file {:?}: {}", path, e);
                (RawMetadata::new(), Some(e.to_string()))
            }
        };

        let normalized = normalize_metadata(&raw);
        let package_isbn = clean_isbn(raw.get(MetadataField::Identifier)).ok();

        Ok(DecodedFile {
            path: path.to_path_buf(),
            kind: SourceKind::Epub,
            record: normalized.record.with_filename_info(&info),
            outcomes: normalized.outcomes,
            package_isbn,
            degraded,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["epub"]
    }
}
