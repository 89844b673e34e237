//! Raw (as-extracted) metadata shapes from an EPUB package

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dublin Core fields read from a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Title,
    Creator,
    Publisher,
    Date,
    Language,
    Identifier,
}

impl MetadataField {
    /// Every field the package reader collects
    pub const ALL: [MetadataField; 6] = [
        MetadataField::Title,
        MetadataField::Creator,
        MetadataField::Publisher,
        MetadataField::Date,
        MetadataField::Language,
        MetadataField::Identifier,
    ];

    /// Fields normalized into a record, in normalization order.
    /// The package identifier is not used; the filename identifier wins.
    pub const RECORD: [MetadataField; 5] = [
        MetadataField::Title,
        MetadataField::Creator,
        MetadataField::Publisher,
        MetadataField::Date,
        MetadataField::Language,
    ];

    /// Dublin Core element name, also the record key
    pub fn key(self) -> &'static str {
        match self {
            MetadataField::Title => "title",
            MetadataField::Creator => "creator",
            MetadataField::Publisher => "publisher",
            MetadataField::Date => "date",
            MetadataField::Language => "language",
            MetadataField::Identifier => "identifier",
        }
    }

    /// Look up a field by its Dublin Core element name
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Positional value(s) of one raw entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawValue {
    /// Element present but without text
    NoValue,
    Single(String),
    /// Several names sharing one qualifier map (co-authors under one role)
    Multiple(Vec<String>),
}

impl RawValue {
    /// The authoritative (first) value, if any
    pub fn primary(&self) -> Option<&str> {
        match self {
            RawValue::NoValue => None,
            RawValue::Single(s) => Some(s),
            RawValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// All values in order
    pub fn values(&self) -> Vec<&str> {
        match self {
            RawValue::NoValue => Vec::new(),
            RawValue::Single(s) => vec![s.as_str()],
            RawValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => RawValue::Single(s),
            None => RawValue::NoValue,
        }
    }
}

/// One `(value..., qualifiers)` entry of a raw field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub value: RawValue,

    /// Qualifier name to value, e.g. `{http://www.idpf.org/2007/opf}role` -> `aut`
    pub attributes: BTreeMap<String, String>,
}

impl RawEntry {
    pub fn new(value: impl Into<RawValue>) -> Self {
        Self {
            value: value.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self::new(RawValue::Single(value.into()))
    }

    pub fn no_value() -> Self {
        Self::new(RawValue::NoValue)
    }

    /// Add a qualifier
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Single(value.to_string())
    }
}

/// Ordered entries of one attribute; empty means the field is absent
pub type RawField = Vec<RawEntry>;

/// Text rendering of a raw field, used when a normalizer rejects it
pub fn raw_text(field: &[RawEntry]) -> String {
    field
        .iter()
        .flat_map(|entry| entry.value.values())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw fields pulled from one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    fields: BTreeMap<MetadataField, RawField>,
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a field, keeping document order
    pub fn push(&mut self, field: MetadataField, entry: RawEntry) {
        self.fields.entry(field).or_default().push(entry);
    }

    /// Replace a whole field
    pub fn with_field(mut self, field: MetadataField, entries: RawField) -> Self {
        self.fields.insert(field, entries);
        self
    }

    /// Entries of a field; absent fields are empty
    pub fn get(&self, field: MetadataField) -> &[RawEntry] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Vec::is_empty)
    }
}
