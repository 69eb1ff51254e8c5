//! Left joins of the vector relation against stories and authors.

use std::collections::HashMap;
use std::fmt;

use crate::records::{AuthorRow, JoinedRecord, StoryRow, VectorRow};

/// Errors detected while joining the three relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// A right-hand relation holds the same key more than once, which would
    /// fan a left row out into multiple output rows.
    Cardinality {
        /// Which relation holds the duplicate (`stories` or `authors`).
        relation: &'static str,
        /// The duplicated key.
        key: String,
        /// How many rows share the key.
        count: usize,
    },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cardinality {
                relation,
                key,
                count,
            } => write!(
                f,
                "{relation} relation holds key `{key}` {count} times; joins must not fan out"
            ),
        }
    }
}

impl std::error::Error for JoinError {}

/// Joins every vector row with at most one story and at most one author.
///
/// Both joins are left joins: unmatched rows survive with `None` sides, and
/// the output length always equals the vector input length. Duplicate keys on
/// either right side are rejected before any row is assembled.
pub fn left_join(
    vectors: Vec<VectorRow>,
    stories: Vec<StoryRow>,
    authors: Vec<AuthorRow>,
) -> Result<Vec<JoinedRecord>, JoinError> {
    let stories = keyed("stories", stories, |story| &story.story_id)?;
    let authors = keyed("authors", authors, |author| &author.author_id)?;

    let joined = vectors
        .into_iter()
        .map(|vector| {
            let story = stories.get(&vector.id).cloned();
            let author = story
                .as_ref()
                .and_then(|story| authors.get(&story.author_id))
                .cloned();
            JoinedRecord {
                row: vector.row,
                id: vector.id,
                vector: vector.vector,
                story,
                author,
            }
        })
        .collect();
    Ok(joined)
}

/// Builds a unique-key lookup map, rejecting duplicates.
fn keyed<T, F>(
    relation: &'static str,
    rows: Vec<T>,
    key_of: F,
) -> Result<HashMap<String, T>, JoinError>
where
    F: Fn(&T) -> &str,
{
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
    for row in &rows {
        *counts.entry(key_of(row)).or_insert(0) += 1;
    }
    if let Some((key, count)) = counts.into_iter().find(|(_, count)| *count > 1) {
        return Err(JoinError::Cardinality {
            relation,
            key: key.to_string(),
            count,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| (key_of(&row).to_string(), row))
        .collect())
}
