//! Delivery feed reader
//!
//! A feed lists `<content>` entries in the CB namespace, each with an `ean`
//! (the identifier) and an `operation` (the action code).

use crate::error::ParseError;
use crate::types::{columns, DeliveryRecord, Table};
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace of delivery feed elements
pub const FEED_NS: &str = "http://www.cbonline.nl/xsd";

/// Which child of `<content>` is being read
#[derive(Clone, Copy)]
enum Child {
    Ean,
    Operation,
}

/// Parse all delivery records from one feed document
pub fn parse_feed(xml: &str) -> Result<Vec<DeliveryRecord>, ParseError> {
    let mut reader = NsReader::from_str(xml);
    let mut records = Vec::new();

    // (ean, operation) of the content element being read
    let mut current: Option<(Option<String>, Option<String>)> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| ParseError::InvalidFeed(e.to_string()))?;
        let in_feed_ns = matches!(ns, ResolveResult::Bound(ref n) if n.as_ref() == FEED_NS.as_bytes());

        match event {
            Event::Start(e) if in_feed_ns => {
                let child = match e.local_name().as_ref() {
                    b"content" => {
                        current = Some((None, None));
                        continue;
                    }
                    b"ean" => Child::Ean,
                    b"operation" => Child::Operation,
                    _ => continue,
                };
                let Some((ean, operation)) = current.as_mut() else {
                    continue;
                };
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| ParseError::InvalidFeed(e.to_string()))?;
                let text = unescape(&text)
                    .map_err(|e| ParseError::InvalidFeed(e.to_string()))?
                    .trim()
                    .to_string();
                match child {
                    Child::Ean => *ean = Some(text),
                    Child::Operation => *operation = Some(text),
                }
            }
            Event::End(e) if in_feed_ns && e.local_name().as_ref() == b"content" => {
                if let Some((ean, operation)) = current.take() {
                    if ean.is_none() || operation.is_none() {
                        tracing::warn!(
                            "Delivery content entry without {}: {:?}",
                            if ean.is_none() { "ean" } else { "operation" },
                            ean
                        );
                    }
                    records.push(DeliveryRecord::new(
                        ean.unwrap_or_default(),
                        operation.unwrap_or_default(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// XML files directly inside `dir`, sorted by name
fn feed_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".xml"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Read every feed in one directory.
///
/// A feed that cannot be read or parsed is logged and skipped.
pub fn read_feed_dir(dir: &Path) -> std::io::Result<Vec<DeliveryRecord>> {
    let mut records = Vec::new();
    for path in feed_files(dir)? {
        let parsed = fs::read_to_string(&path)
            .map_err(|e| ParseError::InvalidFeed(e.to_string()))
            .and_then(|xml| parse_feed(&xml));
        match parsed {
            Ok(found) => {
                tracing::debug!("Read {} delivery records from {:?}", found.len(), path);
                records.extend(found);
            }
            Err(e) => tracing::warn!("Skipping delivery feed {:?}: {}", path, e),
        }
    }
    Ok(records)
}

/// Read the feeds of several directories, in order
pub fn read_feed_dirs<P: AsRef<Path>>(dirs: &[P]) -> std::io::Result<Vec<DeliveryRecord>> {
    let mut records = Vec::new();
    for dir in dirs {
        records.extend(read_feed_dir(dir.as_ref())?);
    }
    Ok(records)
}

/// Delivery records as an `{ISBN, Actie}` table.
///
/// Without any records the table is empty but carries the full source schema,
/// so later joins always find their columns.
pub fn delivery_table(records: &[DeliveryRecord]) -> Table {
    if records.is_empty() {
        return Table::with_columns(columns::SOURCE_SCHEMA);
    }
    let mut table = Table::with_columns([columns::ISBN, columns::ACTION]);
    for record in records {
        table.push_row(vec![Some(record.isbn.clone()), Some(record.action.clone())]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<delivery xmlns="http://www.cbonline.nl/xsd" id="20240710223036">
  <contents>
    <content>
      <ean>9789493341227</ean>
      <operation>N</operation>
    </content>
    <content>
      <ean>9789025449926</ean>
      <operation>D</operation>
    </content>
  </contents>
</delivery>"#;

    #[test]
    fn test_parse_feed() {
        let records = parse_feed(FEED).unwrap();
        assert_eq!(
            records,
            vec![
                DeliveryRecord::new("9789493341227", "N"),
                DeliveryRecord::new("9789025449926", "D"),
            ]
        );
    }

    #[test]
    fn test_parse_feed_ignores_other_namespaces() {
        let xml = r#"<root xmlns:x="urn:other">
            <x:content><x:ean>1</x:ean><x:operation>N</x:operation></x:content>
        </root>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_prefixed_namespace() {
        let xml = r#"<cb:delivery xmlns:cb="http://www.cbonline.nl/xsd">
            <cb:content><cb:ean>1</cb:ean><cb:operation>N</cb:operation></cb:content>
        </cb:delivery>"#;
        assert_eq!(parse_feed(xml).unwrap(), vec![DeliveryRecord::new("1", "N")]);
    }

    #[test]
    fn test_parse_feed_keeps_duplicates() {
        let xml = r#"<d xmlns="http://www.cbonline.nl/xsd">
            <content><ean>1</ean><operation>N</operation></content>
            <content><ean>1</ean><operation>C</operation></content>
        </d>"#;
        assert_eq!(parse_feed(xml).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_feed_missing_operation() {
        let xml = r#"<d xmlns="http://www.cbonline.nl/xsd"><content><ean>1</ean></content></d>"#;
        assert_eq!(parse_feed(xml).unwrap(), vec![DeliveryRecord::new("1", "")]);
    }

    #[test]
    fn test_read_feed_dir_skips_broken_and_non_xml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.xml"), FEED).unwrap();
        fs::write(dir.path().join("b.xml"), "<d><unclosed></d>").unwrap();
        fs::write(dir.path().join("notes.txt"), FEED).unwrap();

        let records = read_feed_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_feed_dirs_in_directory_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("feed.xml"), FEED).unwrap();
        fs::write(
            second.path().join("feed.xml"),
            r#"<d xmlns="http://www.cbonline.nl/xsd"><content><ean>3</ean><operation>C</operation></content></d>"#,
        )
        .unwrap();

        let records = read_feed_dirs(&[second.path(), first.path()]).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], DeliveryRecord::new("3", "C"));
        assert_eq!(records[1].isbn, "9789493341227");
    }

    #[test]
    fn test_empty_delivery_table_has_full_schema() {
        let table = delivery_table(&[]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), columns::SOURCE_SCHEMA);
    }

    #[test]
    fn test_delivery_table() {
        let table = delivery_table(&[DeliveryRecord::new("1", "N")]);
        assert_eq!(table.columns(), ["ISBN", "Actie"]);
        assert_eq!(table.get(0, "Actie"), Some("N"));
    }
}
