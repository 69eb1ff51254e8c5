//! Row cleaning: text sanitization, anomaly remapping, year coercion, fills.

use std::fmt;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::records::{CleanedRecord, JoinedRecord};

/// Sentinel written for absent categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Sentinel for absent or uncoercible year values.
///
/// Collides with a genuine year 0; kept for compatibility with the artifacts
/// already consumed downstream.
pub const MISSING_YEAR: i64 = 0;

/// Fixed lookup tables mapping known anomalous raw values to canonical ones.
///
/// Applied after sanitization and before numeric coercion. Values absent from
/// a table pass through unchanged into coercion.
#[derive(Debug, Clone)]
pub struct AnomalyTables {
    country: Vec<(String, String)>,
    birth_year: Vec<(String, i64)>,
    death_year: Vec<(String, i64)>,
}

impl AnomalyTables {
    /// Builds tables from raw/canonical pairs.
    pub fn new(
        country: &[(&str, &str)],
        birth_year: &[(&str, i64)],
        death_year: &[(&str, i64)],
    ) -> Self {
        Self {
            country: country
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
            birth_year: owned_years(birth_year),
            death_year: owned_years(death_year),
        }
    }

    /// Canonical country for a known nationality adjective or misspelling.
    pub fn country(&self, raw: &str) -> Option<&str> {
        self.country
            .iter()
            .find(|(key, _)| key == raw)
            .map(|(_, canonical)| canonical.as_str())
    }

    /// Representative year for a known malformed birth-year entry.
    pub fn birth_year(&self, raw: &str) -> Option<i64> {
        lookup_year(&self.birth_year, raw)
    }

    /// Representative year for a known malformed death-year entry.
    pub fn death_year(&self, raw: &str) -> Option<i64> {
        lookup_year(&self.death_year, raw)
    }
}

impl Default for AnomalyTables {
    /// The known anomalies observed in the production spreadsheets.
    fn default() -> Self {
        Self::new(
            &[
                ("Estadounidense", "Estados Unidos"),
                ("Inglesa", "Inglaterra"),
                ("Argentino", "Argentina"),
                ("Espana", "España"),
                ("Cubano", "Cuba"),
                ("Puertorriqueno", "Puerto Rico"),
                ("Nueva Zelandia", "Nueva Zelanda"),
            ],
            &[("Siglo VI AC", -600), ("Siglo XII", 1200)],
            &[
                ("1863 y 1786", 1863),
                ("c.1400", 1400),
                ("1976 (desaparecido)", 1976),
            ],
        )
    }
}

fn owned_years(entries: &[(&str, i64)]) -> Vec<(String, i64)> {
    entries
        .iter()
        .map(|(raw, year)| (raw.to_string(), *year))
        .collect()
}

fn lookup_year(table: &[(String, i64)], raw: &str) -> Option<i64> {
    table
        .iter()
        .find(|(key, _)| key == raw)
        .map(|(_, year)| *year)
}

/// A scalar value that could not be coerced and was treated as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanWarning {
    /// Row the value came from (0-based vector-source position).
    pub row: usize,
    /// The affected field.
    pub field: &'static str,
    /// The raw value after sanitization.
    pub raw: String,
}

impl fmt::Display for CleanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} value `{}` is not a recognizable year, treating as missing",
            self.row, self.field, self.raw
        )
    }
}

/// Stateless cleaning service configured with explicit anomaly tables.
#[derive(Debug, Clone)]
pub struct Cleaner {
    tables: AnomalyTables,
}

impl Cleaner {
    /// Builds a cleaner over the given tables.
    pub fn new(tables: AnomalyTables) -> Self {
        Self { tables }
    }

    /// Cleans every joined record, returning warnings as data.
    ///
    /// Output length and row order always match the input. Anomalous values
    /// covered by the tables are resolved silently; unrecognized year values
    /// become [`MISSING_YEAR`] plus a [`CleanWarning`].
    pub fn clean(&self, joined: Vec<JoinedRecord>) -> (Vec<CleanedRecord>, Vec<CleanWarning>) {
        let mut warnings = Vec::new();
        let records = joined
            .into_iter()
            .map(|record| self.clean_record(record, &mut warnings))
            .collect();
        (records, warnings)
    }

    fn clean_record(
        &self,
        record: JoinedRecord,
        warnings: &mut Vec<CleanWarning>,
    ) -> CleanedRecord {
        let JoinedRecord {
            row,
            id: _,
            vector,
            story,
            author,
        } = record;

        let (title, reading_time) = match &story {
            Some(story) => (sanitize(&story.title), sanitize(&story.reading_time_min)),
            None => (String::new(), String::new()),
        };
        let (first_name, last_name) = match &author {
            Some(author) => (sanitize(&author.first_name), sanitize(&author.last_name)),
            None => (String::new(), String::new()),
        };

        let country = author
            .as_ref()
            .and_then(|author| cell(&author.country))
            // Remap runs after folding, so canonical values may carry accents.
            .map(|raw| match self.tables.country(&raw) {
                Some(canonical) => canonical.to_string(),
                None => raw,
            });

        let birth_year = clean_year(
            row,
            "birth year",
            author.as_ref().and_then(|author| cell(&author.birth_year)),
            |raw| self.tables.birth_year(raw),
            warnings,
        );
        let death_year = clean_year(
            row,
            "death year",
            author.as_ref().and_then(|author| cell(&author.death_year)),
            |raw| self.tables.death_year(raw),
            warnings,
        );

        CleanedRecord {
            row,
            vector,
            title,
            reading_time,
            first_name,
            last_name,
            full_name: filled(&author, |author| &author.full_name),
            country: country.unwrap_or_else(|| UNKNOWN.to_string()),
            genre: filled(&author, |author| &author.genre),
            wiki_url: filled(&author, |author| &author.wiki_url),
            categories: filled(&author, |author| &author.categories),
            linked_authors: filled(&author, |author| &author.linked_authors),
            birth_year,
            death_year,
        }
    }
}

/// Strips literal tabs and newlines and folds accented characters to ASCII.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '\t' && *ch != '\n')
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect()
}

// Spreadsheet exports surface absent cells as empty strings or a literal
// `nan`; both normalize to missing.
fn cell(raw: &str) -> Option<String> {
    let sanitized = sanitize(raw);
    if sanitized.is_empty() || sanitized == "nan" {
        None
    } else {
        Some(sanitized)
    }
}

fn filled<T, F>(source: &Option<T>, field: F) -> String
where
    F: Fn(&T) -> &str,
{
    source
        .as_ref()
        .and_then(|value| cell(field(value)))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn clean_year<F>(
    row: usize,
    field: &'static str,
    raw: Option<String>,
    remap: F,
    warnings: &mut Vec<CleanWarning>,
) -> i64
where
    F: Fn(&str) -> Option<i64>,
{
    let Some(raw) = raw else {
        return MISSING_YEAR;
    };
    if let Some(year) = remap(&raw) {
        return year;
    }
    match coerce_year(&raw) {
        Some(year) => year,
        None => {
            warnings.push(CleanWarning { row, field, raw });
            MISSING_YEAR
        }
    }
}

// Accepts both `1863` and the dataframe-style `1863.0`; `nan`/`inf` parse as
// floats but are not years.
fn coerce_year(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then(|| value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AuthorRow, StoryRow};

    fn joined(row: usize, story: Option<StoryRow>, author: Option<AuthorRow>) -> JoinedRecord {
        JoinedRecord {
            row,
            id: format!("V{row}"),
            vector: vec![1.0, 2.0],
            story,
            author,
        }
    }

    fn story() -> StoryRow {
        StoryRow {
            story_id: "S1".to_string(),
            author_id: "AU1".to_string(),
            title: "La casa\tde Asterión\n".to_string(),
            reading_time_min: "9".to_string(),
        }
    }

    fn author() -> AuthorRow {
        AuthorRow {
            author_id: "AU1".to_string(),
            first_name: "José".to_string(),
            last_name: "Martí".to_string(),
            full_name: "José Martí".to_string(),
            country: "Cubano".to_string(),
            genre: "Modernismo".to_string(),
            wiki_url: "https://es.wikipedia.org/wiki/Jose_Marti".to_string(),
            categories: "cuento, poesía".to_string(),
            linked_authors: "Rubén Darío".to_string(),
            birth_year: "1853".to_string(),
            death_year: "1895".to_string(),
        }
    }

    #[test]
    fn sanitize_strips_tabs_newlines_and_accents() {
        assert_eq!(sanitize("a\tb\nc"), "abc");
        assert_eq!(sanitize("ñandú"), "nandu");
        assert_eq!(sanitize("José Martí"), "Jose Marti");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn empty_and_nan_cells_are_missing() {
        assert_eq!(cell(""), None);
        assert_eq!(cell("nan"), None);
        assert_eq!(cell("Nantes"), Some("Nantes".to_string()));
    }

    #[test]
    fn cleans_matched_row() {
        let cleaner = Cleaner::new(AnomalyTables::default());
        let (records, warnings) = cleaner.clean(vec![joined(0, Some(story()), Some(author()))]);

        let record = &records[0];
        assert_eq!(record.title, "La casade Asterion");
        assert_eq!(record.reading_time, "9");
        assert_eq!(record.first_name, "Jose");
        assert_eq!(record.full_name, "Jose Marti");
        assert_eq!(record.country, "Cuba");
        assert_eq!(record.birth_year, 1853);
        assert_eq!(record.death_year, 1895);
        assert!(warnings.is_empty());
    }

    #[test]
    fn unmatched_row_gets_sentinels() {
        let cleaner = Cleaner::new(AnomalyTables::default());
        let (records, warnings) = cleaner.clean(vec![joined(3, None, None)]);

        let record = &records[0];
        assert_eq!(record.row, 3);
        assert_eq!(record.title, "");
        assert_eq!(record.reading_time, "");
        assert_eq!(record.first_name, "");
        assert_eq!(record.last_name, "");
        assert_eq!(record.full_name, UNKNOWN);
        assert_eq!(record.country, UNKNOWN);
        assert_eq!(record.genre, UNKNOWN);
        assert_eq!(record.wiki_url, UNKNOWN);
        assert_eq!(record.categories, UNKNOWN);
        assert_eq!(record.linked_authors, UNKNOWN);
        assert_eq!(record.birth_year, MISSING_YEAR);
        assert_eq!(record.death_year, MISSING_YEAR);
        assert!(warnings.is_empty());
    }

    #[test]
    fn year_anomalies_remap_before_coercion() {
        let cleaner = Cleaner::new(AnomalyTables::default());
        let mut anomalous = author();
        anomalous.birth_year = "Siglo VI AC".to_string();
        anomalous.death_year = "1976 (desaparecido)".to_string();

        let (records, warnings) = cleaner.clean(vec![joined(0, Some(story()), Some(anomalous))]);

        assert_eq!(records[0].birth_year, -600);
        assert_eq!(records[0].death_year, 1976);
        assert!(warnings.is_empty());
    }

    #[test]
    fn remap_can_restore_accented_canonical_values() {
        let cleaner = Cleaner::new(AnomalyTables::default());
        let mut spaniard = author();
        // Folding turns `España` into `Espana`; the table maps it back.
        spaniard.country = "España".to_string();

        let (records, _) = cleaner.clean(vec![joined(0, Some(story()), Some(spaniard))]);
        assert_eq!(records[0].country, "España");
    }

    #[test]
    fn unrecognized_year_becomes_missing_with_warning() {
        let cleaner = Cleaner::new(AnomalyTables::default());
        let mut odd = author();
        odd.birth_year = "unknown century".to_string();

        let (records, warnings) = cleaner.clean(vec![joined(5, Some(story()), Some(odd))]);

        assert_eq!(records[0].birth_year, MISSING_YEAR);
        assert_eq!(
            warnings,
            vec![CleanWarning {
                row: 5,
                field: "birth year",
                raw: "unknown century".to_string(),
            }]
        );
    }

    #[test]
    fn dataframe_style_floats_coerce() {
        assert_eq!(coerce_year("1863.0"), Some(1863));
        assert_eq!(coerce_year(" -600 "), Some(-600));
        assert_eq!(coerce_year("nan"), None);
        assert_eq!(coerce_year("inf"), None);
        assert_eq!(coerce_year("c.1400"), None);
    }

    #[test]
    fn custom_tables_are_honored() {
        let tables = AnomalyTables::new(&[("Chileno", "Chile")], &[("medieval", 1100)], &[]);
        assert_eq!(tables.country("Chileno"), Some("Chile"));
        assert_eq!(tables.country("Cubano"), None);
        assert_eq!(tables.birth_year("medieval"), Some(1100));
        assert_eq!(tables.death_year("medieval"), None);
    }
}
