#![warn(missing_docs)]
//! Export pipeline turning story embeddings plus relational author metadata
//! into row-aligned Embedding Projector artifacts.

pub mod clean;
pub mod config;
pub mod export;
pub mod join;
pub mod localize;
pub mod pipeline;
pub mod records;
pub mod sources;

pub use clean::{AnomalyTables, CleanWarning, Cleaner, MISSING_YEAR, UNKNOWN};
pub use config::Cli;
pub use export::{ExportError, ExportSummary, Exporter};
pub use join::{left_join, JoinError};
pub use localize::{Locale, Localizer, OutputRow, COLUMN_COUNT};
pub use pipeline::{run, PipelineConfig, RunReport};
pub use records::{AuthorRow, CleanedRecord, JoinedRecord, StoryRow, VectorRow};
pub use sources::SourceError;

#[cfg(feature = "debug_logs")]
#[macro_export]
// This allows use of the `eprintln!` macro via `debug_log!` macro.
macro_rules! debug_log {
        ($($arg:tt)*) => {
            eprintln!($($arg)*);
        };
    }
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
// This effectively disables the `eprintln!` macro, effectively removing it from the code during
// compilation.
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}
