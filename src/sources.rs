//! Tabular source loading: three delimited files become typed row vectors.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::records::{AuthorRow, StoryRow, VectorRow};

/// Name of the embedding-vector source, used in error messages.
pub const VECTORS: &str = "vectors";
/// Name of the story source, used in error messages.
pub const STORIES: &str = "stories";
/// Name of the author source, used in error messages.
pub const AUTHORS: &str = "authors";

/// Errors surfaced while reading a tabular source. All are fatal for the run.
#[derive(Debug)]
pub enum SourceError {
    /// The source file could not be opened or read.
    Missing {
        /// Which source failed.
        source: &'static str,
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        cause: io::Error,
    },
    /// A required column is absent from the source header row.
    SchemaMismatch {
        /// Which source is malformed.
        source: &'static str,
        /// The column that could not be found.
        column: &'static str,
    },
    /// A record could not be decoded by the reader.
    Malformed {
        /// Which source is malformed.
        source: &'static str,
        /// 1-based data row.
        row: usize,
        /// Underlying decode failure.
        cause: csv::Error,
    },
    /// A `values` cell did not parse as a float sequence.
    VectorParse {
        /// 1-based data row.
        row: usize,
        /// The `vector_id` of the offending row.
        id: String,
        /// Underlying parse failure.
        cause: serde_json::Error,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { source, path, .. } => {
                write!(f, "{source} source {} could not be read", path.display())
            }
            Self::SchemaMismatch { source, column } => {
                write!(f, "{source} source is missing required column `{column}`")
            }
            Self::Malformed { source, row, .. } => {
                write!(f, "{source} source row {row} could not be decoded")
            }
            Self::VectorParse { row, id, .. } => {
                write!(
                    f,
                    "vectors source row {row} (id `{id}`) is not a parseable float sequence"
                )
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Missing { cause, .. } => Some(cause),
            Self::SchemaMismatch { .. } => None,
            Self::Malformed { cause, .. } => Some(cause),
            Self::VectorParse { cause, .. } => Some(cause),
        }
    }
}

/// Loads the embedding-vector relation, parsing each `values` cell.
pub fn load_vectors(path: &Path) -> Result<Vec<VectorRow>, SourceError> {
    read_vectors(open(VECTORS, path)?, delimiter_for(path))
}

/// Loads the story relation.
pub fn load_stories(path: &Path) -> Result<Vec<StoryRow>, SourceError> {
    read_stories(open(STORIES, path)?, delimiter_for(path))
}

/// Loads the author relation.
pub fn load_authors(path: &Path) -> Result<Vec<AuthorRow>, SourceError> {
    read_authors(open(AUTHORS, path)?, delimiter_for(path))
}

fn open(source: &'static str, path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|cause| SourceError::Missing {
        source,
        path: path.to_path_buf(),
        cause,
    })
}

// Sources arrive as comma-delimited exports unless named *.tsv.
fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

fn table_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader)
}

/// Header-name column lookup captured once per source.
struct Columns {
    source: &'static str,
    indices: Vec<usize>,
}

impl Columns {
    fn resolve(
        source: &'static str,
        headers: &csv::StringRecord,
        names: &[&'static str],
    ) -> Result<Self, SourceError> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let index = headers
                .iter()
                .position(|header| header.trim() == *name)
                .ok_or(SourceError::SchemaMismatch {
                    source,
                    column: name,
                })?;
            indices.push(index);
        }
        Ok(Self { source, indices })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, slot: usize) -> &'r str {
        record.get(self.indices[slot]).unwrap_or_default()
    }
}

fn read_vectors<R: Read>(reader: R, delimiter: u8) -> Result<Vec<VectorRow>, SourceError> {
    let mut table = table_reader(reader, delimiter);
    let columns = Columns::resolve(
        VECTORS,
        headers(VECTORS, &mut table)?,
        &["vector_id", "values"],
    )?;

    let mut rows = Vec::new();
    for (index, record) in table.records().enumerate() {
        let record = decode(&columns, index, record)?;
        let id = columns.get(&record, 0).to_string();
        let vector = parse_vector(columns.get(&record, 1)).map_err(|cause| {
            SourceError::VectorParse {
                row: index + 1,
                id: id.clone(),
                cause,
            }
        })?;
        rows.push(VectorRow {
            row: index,
            id,
            vector,
        });
    }
    Ok(rows)
}

fn read_stories<R: Read>(reader: R, delimiter: u8) -> Result<Vec<StoryRow>, SourceError> {
    let mut table = table_reader(reader, delimiter);
    let columns = Columns::resolve(
        STORIES,
        headers(STORIES, &mut table)?,
        &["uuid_story", "author_uuid", "story_name", "reading_time_min"],
    )?;

    let mut rows = Vec::new();
    for (index, record) in table.records().enumerate() {
        let record = decode(&columns, index, record)?;
        rows.push(StoryRow {
            story_id: columns.get(&record, 0).to_string(),
            author_id: columns.get(&record, 1).to_string(),
            title: columns.get(&record, 2).to_string(),
            reading_time_min: columns.get(&record, 3).to_string(),
        });
    }
    Ok(rows)
}

fn read_authors<R: Read>(reader: R, delimiter: u8) -> Result<Vec<AuthorRow>, SourceError> {
    let mut table = table_reader(reader, delimiter);
    let columns = Columns::resolve(
        AUTHORS,
        headers(AUTHORS, &mut table)?,
        &[
            "UUID",
            "Author",
            "LastName",
            "Name",
            "country",
            "genera",
            "Wiki_URL",
            "cats",
            "linked_authors",
            "Birth Year",
            "Death Year",
        ],
    )?;

    let mut rows = Vec::new();
    for (index, record) in table.records().enumerate() {
        let record = decode(&columns, index, record)?;
        rows.push(AuthorRow {
            author_id: columns.get(&record, 0).to_string(),
            first_name: columns.get(&record, 1).to_string(),
            last_name: columns.get(&record, 2).to_string(),
            full_name: columns.get(&record, 3).to_string(),
            country: columns.get(&record, 4).to_string(),
            genre: columns.get(&record, 5).to_string(),
            wiki_url: columns.get(&record, 6).to_string(),
            categories: columns.get(&record, 7).to_string(),
            linked_authors: columns.get(&record, 8).to_string(),
            birth_year: columns.get(&record, 9).to_string(),
            death_year: columns.get(&record, 10).to_string(),
        });
    }
    Ok(rows)
}

fn headers<'t, R: Read>(
    source: &'static str,
    table: &'t mut csv::Reader<R>,
) -> Result<&'t csv::StringRecord, SourceError> {
    table.headers().map_err(|cause| SourceError::Malformed {
        source,
        row: 0,
        cause,
    })
}

fn decode(
    columns: &Columns,
    index: usize,
    record: Result<csv::StringRecord, csv::Error>,
) -> Result<csv::StringRecord, SourceError> {
    record.map_err(|cause| SourceError::Malformed {
        source: columns.source,
        row: index + 1,
        cause,
    })
}

// The `values` cell carries a bracketed float list, e.g. `[0.12, -0.5]`.
fn parse_vector(raw: &str) -> Result<Vec<f64>, serde_json::Error> {
    serde_json::from_str(raw.trim())
}
