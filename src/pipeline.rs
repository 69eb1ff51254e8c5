//! End-to-end orchestration: fan-out load, join, clean, localize, export.

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use crossbeam_channel::bounded;

use crate::clean::{AnomalyTables, CleanWarning, Cleaner};
use crate::export::{ExportSummary, Exporter};
use crate::join::left_join;
use crate::localize::{Locale, Localizer};
use crate::records::{AuthorRow, StoryRow, VectorRow};
use crate::sources::{self, SourceError};

/// Everything one run needs: source paths, output location, label locale,
/// and the anomaly tables driving the cleaner.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Embedding-vector source path.
    pub vectors: PathBuf,
    /// Story source path.
    pub stories: PathBuf,
    /// Author source path.
    pub authors: PathBuf,
    /// Directory receiving the three artifacts.
    pub out_dir: PathBuf,
    /// Label language for the metadata header.
    pub locale: Locale,
    /// Remap tables for known anomalous values.
    pub tables: AnomalyTables,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Vector rows carried through every stage.
    pub vector_rows: usize,
    /// How many rows matched a story.
    pub matched_stories: usize,
    /// How many rows matched an author.
    pub matched_authors: usize,
    /// Values treated as missing during cleaning.
    pub warnings: Vec<CleanWarning>,
    /// Committed artifact paths and counts.
    pub summary: ExportSummary,
}

/// Runs the whole pipeline once. Any fatal error aborts before an artifact
/// is committed; prior outputs stay untouched.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let (vectors, stories, authors) = load_sources(config).context("loading sources")?;
    crate::debug_log!(
        "loaded {} vectors, {} stories, {} authors",
        vectors.len(),
        stories.len(),
        authors.len()
    );

    let joined = left_join(vectors, stories, authors).context("joining relations")?;
    let vector_rows = joined.len();
    let matched_stories = joined.iter().filter(|row| row.story.is_some()).count();
    let matched_authors = joined.iter().filter(|row| row.author.is_some()).count();

    let (cleaned, warnings) = Cleaner::new(config.tables.clone()).clean(joined);
    crate::debug_log!("cleaned {} rows, {} warnings", cleaned.len(), warnings.len());

    let localizer = Localizer::new(config.locale);
    let rows = localizer.project(&cleaned);
    let summary = Exporter::new(&config.out_dir)
        .export(localizer.header(), &rows, &cleaned)
        .context("writing artifacts")?;

    Ok(RunReport {
        vector_rows,
        matched_stories,
        matched_authors,
        warnings,
        summary,
    })
}

enum LoadedTable {
    Vectors(Vec<VectorRow>),
    Stories(Vec<StoryRow>),
    Authors(Vec<AuthorRow>),
}

type LoadResult = std::result::Result<LoadedTable, SourceError>;

/// Reads the three sources on their own threads; the collect loop is the
/// barrier before the join. The first failure aborts the run.
fn load_sources(
    config: &PipelineConfig,
) -> Result<(Vec<VectorRow>, Vec<StoryRow>, Vec<AuthorRow>)> {
    let (sender, receiver) = bounded::<LoadResult>(3);
    let mut handles = Vec::with_capacity(3);

    {
        let sender = sender.clone();
        let path = config.vectors.clone();
        handles.push(thread::spawn(move || {
            let _ = sender.send(sources::load_vectors(&path).map(LoadedTable::Vectors));
        }));
    }
    {
        let sender = sender.clone();
        let path = config.stories.clone();
        handles.push(thread::spawn(move || {
            let _ = sender.send(sources::load_stories(&path).map(LoadedTable::Stories));
        }));
    }
    {
        let path = config.authors.clone();
        handles.push(thread::spawn(move || {
            let _ = sender.send(sources::load_authors(&path).map(LoadedTable::Authors));
        }));
    }

    let mut vectors = None;
    let mut stories = None;
    let mut authors = None;
    for loaded in receiver {
        match loaded? {
            LoadedTable::Vectors(rows) => vectors = Some(rows),
            LoadedTable::Stories(rows) => stories = Some(rows),
            LoadedTable::Authors(rows) => authors = Some(rows),
        }
    }
    for handle in handles {
        if handle.join().is_err() {
            bail!("source loader thread panicked");
        }
    }

    match (vectors, stories, authors) {
        (Some(vectors), Some(stories), Some(authors)) => Ok((vectors, stories, authors)),
        _ => bail!("a source loader exited without reporting a result"),
    }
}
