//! cbmeta Core Library
//!
//! Reconciles bibliographic metadata from delivered EPUB packages and sidecar
//! PDFs with the delivery feed that accompanies them, and merges the result
//! into the cumulative overview workbook.
//!
//! The flow of a run is: decode files into [`MetadataRecord`]s (normalizing
//! every Dublin Core field), fold them into an [`Accumulator`] per source,
//! right-join the delivery records onto them ([`merge::assemble_new_data`]),
//! and reconcile that table into the overview ([`merge::reconcile`]).

pub mod accumulator;
pub mod config;
pub mod decoder;
pub mod delivery;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod types;
pub mod workbook;
pub mod workspace;

pub use accumulator::Accumulator;
pub use config::PipelineConfig;
pub use error::{CbMetaError, NormalizeError, ParseError, Result, WorkbookError, WorkspaceError};
pub use pipeline::{NoProgress, Pipeline, ProgressObserver, RunOutcome, RunReport};
pub use types::{
    columns, DeliveryRecord, FilenameInfo, MetadataField, MetadataRecord, RawEntry, RawField,
    RawMetadata, RawValue, Table,
};
