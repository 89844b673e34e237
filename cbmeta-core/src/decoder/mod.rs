//! Decoders turning delivered files into metadata records

mod epub;
mod filename;
mod pdf;

pub use epub::{parse_opf_metadata, EpubDecoder};
pub use filename::decode_filename;
pub use pdf::PdfDecoder;

use crate::error::ParseError;
use crate::normalize::FieldOutcome;
use crate::types::{MetadataField, MetadataRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which accumulator a decoded file feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Epub,
    Pdf,
}

/// Result of decoding one delivered file
#[derive(Debug, Clone, Serialize)]
pub struct DecodedFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub record: MetadataRecord,

    /// Per-field normalization results (empty for PDFs)
    pub outcomes: Vec<(MetadataField, FieldOutcome)>,

    /// Identifier from the package itself, for diagnostics only
    pub package_isbn: Option<String>,

    /// Why the package could not be read, if it could not
    pub degraded: Option<String>,
}

/// Trait for decoding a delivered file into a metadata record
pub trait Decoder: Send + Sync {
    /// Decode the file at `path`
    fn decode(&self, path: &Path) -> Result<DecodedFile, ParseError>;

    /// File extensions this decoder supports
    fn supported_extensions(&self) -> &[&str];
}

/// Get the appropriate decoder for a file extension
pub fn decoder_for_extension(ext: &str) -> Option<Box<dyn Decoder>> {
    match ext.to_lowercase().as_str() {
        "epub" => Some(Box::new(EpubDecoder::new())),
        "pdf" => Some(Box::new(PdfDecoder::new())),
        _ => None,
    }
}

/// Get the decoder for a path, based on its extension
pub fn decoder_for_path(path: &Path) -> Option<Box<dyn Decoder>> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(decoder_for_extension)
}

fn file_name(path: &Path) -> Result<&str, ParseError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ParseError::Filename {
            name: path.display().to_string(),
            reason: "not a valid UTF-8 file name",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_for_extension() {
        assert!(decoder_for_extension("epub").is_some());
        assert!(decoder_for_extension("PDF").is_some());
        assert!(decoder_for_extension("xml").is_none());
        assert!(decoder_for_path(Path::new("a/20240101000000_1.epub")).is_some());
        assert!(decoder_for_path(Path::new("a/README")).is_none());
    }
}
