//! Field normalizers: raw multi-valued metadata to one clean scalar
//!
//! Every normalizer looks only at the first entry of a field. Invalid but
//! well-shaped input yields an empty string; input with an unexpected shape
//! yields a [`NormalizeError`] and the caller keeps the raw text instead.

use crate::error::NormalizeError;
use crate::types::{raw_text, MetadataField, MetadataRecord, RawEntry, RawMetadata, RawValue};
use serde::Serialize;

/// Century prefixes accepted for a publication date
const VALID_CENTURIES: [&str; 3] = ["20", "19", "18"];

/// Longest identifier still treated as an ISBN
const MAX_ISBN_LEN: usize = 13;

fn first<'a>(field: &'a [RawEntry], name: &'static str) -> Result<&'a RawEntry, NormalizeError> {
    field.first().ok_or(NormalizeError::EmptyField(name))
}

/// `[("Titel", {})]` -> `"Titel"`
pub fn clean_title(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let entry = first(field, "title")?;
    Ok(entry.value.primary().unwrap_or_default().to_string())
}

/// `[("Mark Haddon", "Bob Dylan", {role})]` -> `"Mark Haddon, Bob Dylan"`
pub fn clean_author(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let Some(entry) = field.first() else {
        return Ok(String::new());
    };
    Ok(match &entry.value {
        RawValue::NoValue => String::new(),
        RawValue::Single(name) => name.clone(),
        RawValue::Multiple(names) => names.join(", "),
    })
}

/// `[("Atlas Contact", {})]` -> `"Atlas Contact"`
pub fn clean_publisher(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let Some(entry) = field.first() else {
        return Ok(String::new());
    };
    Ok(entry.value.primary().unwrap_or_default().to_string())
}

/// `[("2016-01-01", {event}), ("2016-08-09", {event})]` -> `"2016"`
///
/// Dates that do not start with a plausible century become empty.
pub fn clean_date(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let Some(entry) = field.first() else {
        return Ok(String::new());
    };
    let date = entry.value.primary().ok_or(NormalizeError::NoValue("date"))?;

    let century_ok = date
        .get(..2)
        .map(|prefix| VALID_CENTURIES.contains(&prefix))
        .unwrap_or(false);
    if !century_ok {
        return Ok(String::new());
    }
    Ok(date.split('-').next().unwrap_or_default().to_string())
}

/// `[("nl-NL", {})]` -> `"nl"`, anything else lower-cased
pub fn clean_language(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let entry = first(field, "language")?;
    let language = entry
        .value
        .primary()
        .ok_or(NormalizeError::NoValue("language"))?;
    if language == "nl-NL" {
        return Ok("nl".to_string());
    }
    Ok(language.to_lowercase())
}

/// `[("9789025449926", {id})]` -> `"9789025449926"`; longer than 13 characters -> `""`
pub fn clean_isbn(field: &[RawEntry]) -> Result<String, NormalizeError> {
    let entry = first(field, "identifier")?;
    let isbn = entry
        .value
        .primary()
        .ok_or(NormalizeError::NoValue("identifier"))?;
    if isbn.chars().count() > MAX_ISBN_LEN {
        return Ok(String::new());
    }
    Ok(isbn.to_string())
}

/// Normalizer for a field
pub fn normalizer_for(field: MetadataField) -> fn(&[RawEntry]) -> Result<String, NormalizeError> {
    match field {
        MetadataField::Title => clean_title,
        MetadataField::Creator => clean_author,
        MetadataField::Publisher => clean_publisher,
        MetadataField::Date => clean_date,
        MetadataField::Language => clean_language,
        MetadataField::Identifier => clean_isbn,
    }
}

/// What happened to one field during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FieldOutcome {
    Normalized { value: String },

    /// The normalizer rejected the field; `value` is the raw text
    Raw { value: String, reason: String },
}

impl FieldOutcome {
    /// Normalize a field, falling back to its raw text on failure
    pub fn of(field: MetadataField, raw: &[RawEntry]) -> Self {
        match normalizer_for(field)(raw) {
            Ok(value) => FieldOutcome::Normalized { value },
            Err(err) => FieldOutcome::Raw {
                value: raw_text(raw),
                reason: err.to_string(),
            },
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldOutcome::Normalized { value } | FieldOutcome::Raw { value, .. } => value,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, FieldOutcome::Normalized { .. })
    }
}

/// A normalized record together with the per-field outcomes that built it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub record: MetadataRecord,
    pub outcomes: Vec<(MetadataField, FieldOutcome)>,
}

/// Normalize the record fields of a package in their fixed order.
///
/// A field whose normalizer fails keeps its raw text; the rest continue.
pub fn normalize_metadata(raw: &RawMetadata) -> Normalized {
    let mut record = MetadataRecord::new();
    let mut outcomes = Vec::with_capacity(MetadataField::RECORD.len());

    for field in MetadataField::RECORD {
        let outcome = FieldOutcome::of(field, raw.get(field));
        if let FieldOutcome::Raw { reason, .. } = &outcome {
            tracing::debug!("Error cleaning metadata field {}: {}", field.key(), reason);
        }
        record.insert(field.key(), outcome.value());
        outcomes.push((field, outcome));
    }

    Normalized { record, outcomes }
}
