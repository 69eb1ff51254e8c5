//! Renders the three row-aligned artifacts and commits them atomically.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::localize::{OutputRow, COLUMN_COUNT};
use crate::records::CleanedRecord;

/// File name of the labeled metadata table.
pub const METADATA_FILE: &str = "stories_metadata.tsv";
/// File name of the raw little-endian `f64` tensor blob.
pub const TENSORS_FILE: &str = "stories_tensors.bytes";
/// File name of the headerless tensor mirror table.
pub const TENSORS_TSV_FILE: &str = "stories_tensors.tsv";

/// Errors raised while validating or writing the artifacts.
#[derive(Debug)]
pub enum ExportError {
    /// Metadata and tensor sequences disagree in length.
    RowCountMismatch {
        /// Metadata row count.
        metadata: usize,
        /// Tensor row count.
        tensors: usize,
    },
    /// A carried row index no longer matches its artifact position.
    Misaligned {
        /// Artifact position being written.
        position: usize,
        /// Row index found there.
        found: usize,
    },
    /// A vector's length differs from the run's dimensionality.
    DimensionMismatch {
        /// Offending row (0-based).
        row: usize,
        /// Dimensionality established by row 0.
        expected: usize,
        /// Length found.
        actual: usize,
    },
    /// An artifact failed to render.
    Render {
        /// Artifact file name.
        artifact: &'static str,
        /// Underlying encoder failure.
        cause: csv::Error,
    },
    /// An artifact failed to stage or persist.
    Io {
        /// Artifact file name.
        artifact: &'static str,
        /// Underlying I/O failure.
        cause: io::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountMismatch { metadata, tensors } => write!(
                f,
                "metadata rows ({metadata}) and tensor rows ({tensors}) disagree"
            ),
            Self::Misaligned { position, found } => write!(
                f,
                "row index {found} found at artifact position {position}; alignment lost"
            ),
            Self::DimensionMismatch {
                row,
                expected,
                actual,
            } => write!(
                f,
                "vector at row {row} has {actual} components, expected {expected}"
            ),
            Self::Render { artifact, .. } => write!(f, "failed to render {artifact}"),
            Self::Io { artifact, .. } => write!(f, "failed to write {artifact}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render { cause, .. } => Some(cause),
            Self::Io { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Paths and counts of a completed export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Rows written to every artifact.
    pub rows: usize,
    /// Vector dimensionality of the run.
    pub dimension: usize,
    /// Committed metadata table path.
    pub metadata: PathBuf,
    /// Committed tensor blob path.
    pub tensors: PathBuf,
    /// Committed tensor mirror path.
    pub tensors_mirror: PathBuf,
}

/// Writes the three artifacts into a fixed output directory.
///
/// Everything is rendered in memory and validated before the first byte
/// reaches disk; each file is then staged beside its final path and renamed
/// into place, so a failed run never leaves partial or torn artifacts.
#[derive(Debug, Clone)]
pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    /// Builds an exporter rooted at the given directory.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Validates alignment and dimensionality, then commits all artifacts.
    pub fn export(
        &self,
        header: [&'static str; COLUMN_COUNT],
        rows: &[OutputRow],
        records: &[CleanedRecord],
    ) -> Result<ExportSummary, ExportError> {
        let dimension = validate(rows, records)?;

        let metadata = render_metadata(&header, rows)?;
        let blob = render_blob(records);
        let mirror = render_mirror(records)?;

        Ok(ExportSummary {
            rows: rows.len(),
            dimension,
            metadata: self.commit(METADATA_FILE, &metadata)?,
            tensors: self.commit(TENSORS_FILE, &blob)?,
            tensors_mirror: self.commit(TENSORS_TSV_FILE, &mirror)?,
        })
    }

    fn commit(&self, artifact: &'static str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let io_error = |cause| ExportError::Io { artifact, cause };
        let path = self.out_dir.join(artifact);
        let mut staged = NamedTempFile::new_in(&self.out_dir).map_err(io_error)?;
        staged.write_all(bytes).map_err(io_error)?;
        staged
            .persist(&path)
            .map_err(|persist| io_error(persist.error))?;
        Ok(path)
    }
}

/// Checks the row-alignment and dimension invariants, returning the run's
/// dimensionality.
fn validate(rows: &[OutputRow], records: &[CleanedRecord]) -> Result<usize, ExportError> {
    if rows.len() != records.len() {
        return Err(ExportError::RowCountMismatch {
            metadata: rows.len(),
            tensors: records.len(),
        });
    }
    for (position, (row, record)) in rows.iter().zip(records).enumerate() {
        if row.row != position {
            return Err(ExportError::Misaligned {
                position,
                found: row.row,
            });
        }
        if record.row != position {
            return Err(ExportError::Misaligned {
                position,
                found: record.row,
            });
        }
    }

    let dimension = records.first().map_or(0, |record| record.vector.len());
    for record in records {
        if record.vector.len() != dimension {
            return Err(ExportError::DimensionMismatch {
                row: record.row,
                expected: dimension,
                actual: record.vector.len(),
            });
        }
    }
    Ok(dimension)
}

fn tsv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new())
}

fn render_metadata(
    header: &[&'static str; COLUMN_COUNT],
    rows: &[OutputRow],
) -> Result<Vec<u8>, ExportError> {
    let render_error = |cause| ExportError::Render {
        artifact: METADATA_FILE,
        cause,
    };
    let mut writer = tsv_writer();
    writer.write_record(header.iter()).map_err(render_error)?;
    for row in rows {
        writer.write_record(&row.cells).map_err(render_error)?;
    }
    finish(writer, METADATA_FILE)
}

// Row-major, no header, no delimiters: 8 bytes per component.
fn render_blob(records: &[CleanedRecord]) -> Vec<u8> {
    let per_row = records.first().map_or(0, |record| record.vector.len());
    let mut bytes = Vec::with_capacity(records.len() * per_row * 8);
    for record in records {
        for value in &record.vector {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

fn render_mirror(records: &[CleanedRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = tsv_writer();
    for record in records {
        writer
            .write_record(record.vector.iter().map(|value| value.to_string()))
            .map_err(|cause| ExportError::Render {
                artifact: TENSORS_TSV_FILE,
                cause,
            })?;
    }
    finish(writer, TENSORS_TSV_FILE)
}

fn finish(writer: csv::Writer<Vec<u8>>, artifact: &'static str) -> Result<Vec<u8>, ExportError> {
    writer.into_inner().map_err(|cause| ExportError::Io {
        artifact,
        cause: cause.into_error(),
    })
}
