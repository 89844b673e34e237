//! Delivery filename convention: `YYYYMMDDHHMMSS_<identifier>.<ext>`

use crate::error::ParseError;
use crate::types::FilenameInfo;

/// Trailing time-of-day characters (`HHMMSS`) dropped from the timestamp
const TIME_SUFFIX_LEN: usize = 6;

/// Decode identifier, delivery date and extension from a filename.
///
/// Splits on the first `_` and the first `.`:
/// `20240710223036_9789493341227.epub` gives `9789493341227`, `20240710`
/// and `epub`. A name without `_` or `.` is rejected.
pub fn decode_filename(name: &str) -> Result<FilenameInfo, ParseError> {
    let reject = |reason| ParseError::Filename {
        name: name.to_string(),
        reason,
    };

    let mut parts = name.split('_');
    let timestamp = parts.next().unwrap_or_default();
    let identifier_part = parts.next().ok_or_else(|| reject("missing '_'"))?;

    let extension = name
        .split('.')
        .nth(1)
        .ok_or_else(|| reject("missing extension"))?;
    let isbn = identifier_part.split('.').next().unwrap_or_default();

    let keep = timestamp.chars().count().saturating_sub(TIME_SUFFIX_LEN);
    let delivery_date: String = timestamp.chars().take(keep).collect();

    Ok(FilenameInfo {
        isbn: isbn.to_string(),
        delivery_date,
        extension: extension.to_string(),
    })
}
