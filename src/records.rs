//! Shared row records passed between pipeline stages.

use serde::Serialize;

/// Embedding row parsed from the vector source.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRow {
    /// Position of the row within the vector source (0-based).
    pub row: usize,
    /// Opaque story key (`vector_id`).
    pub id: String,
    /// Parsed embedding vector.
    pub vector: Vec<f64>,
}

/// Story attributes keyed by `uuid_story`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRow {
    /// Story key joined against `VectorRow::id`.
    pub story_id: String,
    /// Author key joined against `AuthorRow::author_id`.
    pub author_id: String,
    /// Story title as it appears in the source.
    pub title: String,
    /// Reading time in minutes, carried as source text.
    pub reading_time_min: String,
}

/// Author attributes keyed by `UUID`.
///
/// Year fields stay free text here; the source contains entries like
/// `Siglo XII` or `1976 (desaparecido)` that only the cleaner knows how to
/// resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRow {
    /// Author primary key.
    pub author_id: String,
    /// Author first name.
    pub first_name: String,
    /// Author last name.
    pub last_name: String,
    /// Author full display name.
    pub full_name: String,
    /// Country of origin; may hold nationality adjectives.
    pub country: String,
    /// Literary genre.
    pub genre: String,
    /// Wikipedia URL.
    pub wiki_url: String,
    /// Category tags.
    pub categories: String,
    /// Related author names.
    pub linked_authors: String,
    /// Birth year free text.
    pub birth_year: String,
    /// Death year free text.
    pub death_year: String,
}

/// One embedding row left-joined with at most one story and one author.
///
/// Every vector row produces exactly one `JoinedRecord` regardless of match;
/// `row` preserves the original vector-source position.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    /// Original vector-source position (0-based).
    pub row: usize,
    /// Story key from the vector source.
    pub id: String,
    /// Embedding vector.
    pub vector: Vec<f64>,
    /// Matching story, if any.
    pub story: Option<StoryRow>,
    /// Matching author, if any.
    pub author: Option<AuthorRow>,
}

/// Fully cleaned row: every metadata column populated, years coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    /// Original vector-source position (0-based).
    pub row: usize,
    /// Embedding vector, untouched by cleaning.
    pub vector: Vec<f64>,
    /// Story title; empty when the story was unmatched.
    pub title: String,
    /// Reading time text; empty when the story was unmatched.
    pub reading_time: String,
    /// Author first name; empty when the author was unmatched.
    pub first_name: String,
    /// Author last name; empty when the author was unmatched.
    pub last_name: String,
    /// Author full name, sentinel-filled when absent.
    pub full_name: String,
    /// Canonical country, sentinel-filled when absent.
    pub country: String,
    /// Genre, sentinel-filled when absent.
    pub genre: String,
    /// Wikipedia URL, sentinel-filled when absent.
    pub wiki_url: String,
    /// Category tags, sentinel-filled when absent.
    pub categories: String,
    /// Related authors, sentinel-filled when absent.
    pub linked_authors: String,
    /// Birth year; `0` when absent or uncoercible.
    pub birth_year: i64,
    /// Death year; `0` when absent or uncoercible.
    pub death_year: i64,
}
