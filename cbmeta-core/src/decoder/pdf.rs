//! Sidecar PDF decoder
//!
//! Delivered PDFs carry no package metadata we use; everything comes from
//! the filename.

use super::{decode_filename, DecodedFile, SourceKind};
use crate::error::ParseError;
use crate::types::MetadataRecord;
use std::path::Path;

/// Decoder for bare PDF deliveries
pub struct PdfDecoder;

impl PdfDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Decoder for PdfDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile, ParseError> {
        let info = decode_filename(super::file_name(path)?)?;

        Ok(DecodedFile {
            path: path.to_path_buf(),
            kind: SourceKind::Pdf,
            record: MetadataRecord::new().with_filename_info(&info),
            outcomes: Vec::new(),
            package_isbn: None,
            degraded: None,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
