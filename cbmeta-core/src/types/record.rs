//! Clean per-file records and delivery feed records

use serde::{Deserialize, Serialize};

/// Column names shared by the tables
pub mod columns {
    pub const ISBN: &str = "ISBN";
    pub const TITLE: &str = "title";
    pub const CREATOR: &str = "creator";
    pub const PUBLISHER: &str = "publisher";
    pub const DATE: &str = "date";
    pub const LANGUAGE: &str = "language";
    pub const DELIVERY_DATE: &str = "Leverdatum";
    pub const EXTENSION: &str = "Extensie";
    pub const ACTION: &str = "Actie";

    /// Column set of the assembled new-data table before renaming
    pub const SOURCE_SCHEMA: [&str; 9] = [
        ISBN,
        TITLE,
        CREATOR,
        PUBLISHER,
        DATE,
        LANGUAGE,
        DELIVERY_DATE,
        EXTENSION,
        ACTION,
    ];

    /// Source column to display column, in display order
    pub const DISPLAY_SCHEMA: [(&str, &str); 9] = [
        (ISBN, "ISBN"),
        (TITLE, "Titel"),
        (CREATOR, "Auteur(s)"),
        (PUBLISHER, "Uitgever"),
        (DATE, "Publicatiejaar"),
        (LANGUAGE, "Taal"),
        (DELIVERY_DATE, "Leverdatum"),
        (EXTENSION, "Extensie"),
        (ACTION, "Actie"),
    ];
}

/// Normalized metadata for one source file: field name to scalar, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    entries: Vec<(String, String)>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add the identifier, delivery date and extension decoded from the filename
    pub fn with_filename_info(mut self, info: &FilenameInfo) -> Self {
        self.insert(columns::ISBN, info.isbn.as_str());
        self.insert(columns::DELIVERY_DATE, info.delivery_date.as_str());
        self.insert(columns::EXTENSION, info.extension.as_str());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = MetadataRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Parts of a `TIMESTAMP_IDENTIFIER.EXT` filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameInfo {
    pub isbn: String,

    /// Date prefix of the delivery timestamp (`YYYYMMDD`)
    pub delivery_date: String,

    pub extension: String,
}

/// One `<content>` entry of a delivery feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub isbn: String,

    /// Operation code, e.g. `N` for a new title
    pub action: String,
}

impl DeliveryRecord {
    pub fn new(isbn: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            action: action.into(),
        }
    }
}
