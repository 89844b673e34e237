//! Integration tests for the cbmeta CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="pub-id" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:identifier id="pub-id">9789493341227</dc:identifier>
    <dc:title>De avond is ongemak</dc:title>
    <dc:creator opf:role="aut">Marieke Lucas Rijneveld</dc:creator>
    <dc:publisher>Atlas Contact</dc:publisher>
    <dc:date>2018-08-30</dc:date>
    <dc:language>nl-NL</dc:language>
  </metadata>
  <manifest/>
  <spine/>
</package>"#;

/// Write a minimal EPUB package
fn create_test_epub(path: &Path) {
    let file = File::create(path).expect("Failed to create EPUB");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    zip.start_file("mimetype", options).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    zip.start_file("META-INF/container.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#,
    )
    .unwrap();
    zip.start_file("content.opf", options).unwrap();
    zip.write_all(OPF.as_bytes()).unwrap();
    zip.finish().unwrap();
}

/// Intake root with one delivery folder holding an EPUB and its feed
fn create_intake_root() -> TempDir {
    let root = TempDir::new().unwrap();
    let folder = root.path().join("levering_20240710");
    fs::create_dir(&folder).unwrap();
    create_test_epub(&folder.join("20240710223036_9789493341227.epub"));
    fs::write(
        folder.join("20240710223036.xml"),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<delivery xmlns="http://www.cbonline.nl/xsd">
  <content><ean>9789493341227</ean><operation>N</operation></content>
</delivery>"#,
    )
    .unwrap();
    root
}

fn cbmeta() -> Command {
    let mut cmd = Command::cargo_bin("cbmeta").unwrap();
    cmd.env_remove("CBMETA_ROOT")
        .env_remove("CBMETA_DONE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    cbmeta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version() {
    cbmeta()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cbmeta"));
}

#[test]
fn test_run_help() {
    cbmeta()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--jobs"))
        .stdout(predicate::str::contains("--allow-missing-overview"));
}

#[test]
fn test_run_requires_root() {
    cbmeta().arg("run").assert().failure();
}

#[test]
fn test_run_rejects_zero_jobs() {
    let root = TempDir::new().unwrap();
    cbmeta()
        .args(["run", "--jobs", "0"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_run_rejects_bad_date() {
    let root = TempDir::new().unwrap();
    cbmeta()
        .args(["run", "--date", "gisteren"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a date"));
}

#[test]
fn test_run_fails_without_overview() {
    let root = create_intake_root();
    cbmeta()
        .arg("run")
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("overzicht_metadata_CB_"));

    assert!(root.path().join("levering_20240710").is_dir());
}

#[test]
fn test_run_writes_workbooks_and_moves_folders() {
    let root = create_intake_root();
    cbmeta()
        .args(["run", "--allow-missing-overview", "--date", "20240711"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 folders"))
        .stdout(predicate::str::contains("overzicht_metadata_CB_20240711.xlsx"));

    assert!(root
        .path()
        .join("archief/archiefbestand_metadata_CB_20240711.xlsx")
        .is_file());
    assert!(root.path().join("overzicht_metadata_CB_20240711.xlsx").is_file());
    assert!(root.path().join("done/levering_20240710").is_dir());
}

#[test]
fn test_run_dry_run_json_report() {
    let root = create_intake_root();
    cbmeta()
        .args(["run", "--allow-missing-overview", "--dry-run", "--json"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dry_run\": true"))
        .stdout(predicate::str::contains("\"archive_rows\": 1"));

    assert!(root.path().join("levering_20240710").is_dir());
    assert!(!root.path().join("archief").exists());
}

#[test]
fn test_run_logs_progress_to_stderr_and_log_file() {
    let root = create_intake_root();
    let logs = TempDir::new().unwrap();
    let log_file = logs.path().join("cbmeta.log");

    cbmeta()
        .args(["run", "--allow-missing-overview", "--dry-run", "--log-file"])
        .arg(&log_file)
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing deliveries"));

    let logged = fs::read_to_string(&log_file).unwrap();
    assert!(logged.contains("Processing deliveries"));
    assert!(logged.contains("Moved 0 processed folders"));
}

#[test]
fn test_run_root_from_env() {
    let root = create_intake_root();
    cbmeta()
        .env("CBMETA_ROOT", root.path())
        .args(["run", "--allow-missing-overview", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
}

#[test]
fn test_inspect_epub() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20240710223036_9789493341227.epub");
    create_test_epub(&path);

    cbmeta()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("De avond is ongemak"))
        .stdout(predicate::str::contains("Leverdatum:"))
        .stdout(predicate::str::contains("20240710"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20240710223036_9789493341227.epub");
    create_test_epub(&path);

    let output = cbmeta()
        .args(["inspect", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "epub");
    assert_eq!(json["package_isbn"], "9789493341227");
}

#[test]
fn test_inspect_pdf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("20240710223036_9789493341227.pdf");
    fs::write(&path, b"%PDF-1.4").unwrap();

    cbmeta()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf"));
}

#[test]
fn test_inspect_nonexistent_file() {
    cbmeta()
        .args(["inspect", "/nonexistent/20240710223036_1.epub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_inspect_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.xml");
    fs::write(&path, "<delivery/>").unwrap();

    cbmeta()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No decoder"));
}
