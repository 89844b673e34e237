//! Core types shared by the extraction and merge stages

mod raw;
mod record;
mod table;

pub use raw::{raw_text, MetadataField, RawEntry, RawField, RawMetadata, RawValue};
pub use record::{columns, DeliveryRecord, FilenameInfo, MetadataRecord};
pub use table::{Cell, Table};
