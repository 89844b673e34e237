//! CLI command implementations

mod inspect;
mod run;

pub use inspect::inspect;
pub use run::{run, RunArgs};
