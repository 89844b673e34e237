//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Book metadata written into a fixture EPUB
pub struct FixtureBook<'a> {
    pub title: &'a str,
    pub creators: &'a [&'a str],
    pub publisher: Option<&'a str>,
    pub date: &'a str,
    pub language: &'a str,
}

impl Default for FixtureBook<'_> {
    fn default() -> Self {
        Self {
            title: "Het wonderbaarlijke voorval met de hond in de nacht",
            creators: &["Mark Haddon"],
            publisher: Some("Atlas Contact"),
            date: "2016-01-01",
            language: "nl-NL",
        }
    }
}

fn opf(book: &FixtureBook) -> String {
    let creators: String = book
        .creators
        .iter()
        .map(|c| format!(r#"    <dc:creator opf:role="aut">{}</dc:creator>"#, c))
        .collect::<Vec<_>>()
        .join("\n");
    let publisher = match book.publisher {
        Some(p) => format!("<dc:publisher>{}</dc:publisher>", p),
        None => "<dc:publisher/>".to_string(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="pub-id" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:identifier id="pub-id">urn:uuid:0f2b7c1e-1111-2222-3333-444455556666</dc:identifier>
    <dc:title>{title}</dc:title>
{creators}
    {publisher}
    <dc:date opf:event="publication">{date}</dc:date>
    <dc:language>{language}</dc:language>
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#,
        title = book.title,
        creators = creators,
        publisher = publisher,
        date = book.date,
        language = book.language,
    )
}

/// Write a minimal EPUB 2 package to `path`
pub fn write_epub(path: &Path, book: &FixtureBook) {
    let file = File::create(path).expect("Failed to create EPUB");
    let mut zip = zip::ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", stored).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    )
    .unwrap();

    zip.start_file("OEBPS/content.opf", stored).unwrap();
    zip.write_all(opf(book).as_bytes()).unwrap();

    zip.start_file("OEBPS/ch1.xhtml", stored).unwrap();
    zip.write_all(b"<html><body><p>Hoofdstuk 1</p></body></html>")
        .unwrap();

    zip.finish().unwrap();
}

/// Write a delivery feed listing `(ean, operation)` pairs
pub fn write_feed(path: &Path, entries: &[(&str, &str)]) {
    let contents: String = entries
        .iter()
        .map(|(ean, op)| {
            format!(
                "    <content>\n      <ean>{}</ean>\n      <operation>{}</operation>\n    </content>\n",
                ean, op
            )
        })
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<delivery xmlns=\"http://www.cbonline.nl/xsd\" id=\"20240710223036\">\n  <contents>\n{}  </contents>\n</delivery>\n",
        contents
    );
    fs::write(path, xml).expect("Failed to write feed");
}

/// Create a delivery folder under `root`
pub fn delivery_folder(root: &Path, name: &str) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir_all(&folder).expect("Failed to create delivery folder");
    folder
}
