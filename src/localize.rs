//! Projection of cleaned records into the fixed, localized output columns.

use clap::ValueEnum;

use crate::records::CleanedRecord;

/// Number of exported metadata columns.
pub const COLUMN_COUNT: usize = 11;

/// Output label language. One locale per run; the label sets are never mixed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Locale {
    /// Spanish labels (production default).
    Es,
    /// English labels.
    En,
}

const HEADERS_ES: [&str; COLUMN_COUNT] = [
    "Título",
    "Tiempo de Lectura (min)",
    "Primer Nombre Autor",
    "Apellido Autor",
    "Nombre Completo Autor",
    "País",
    "Género",
    "Año de nacimiento",
    "Año de muerte",
    "Autores relacionados",
    "Categorías",
];

const HEADERS_EN: [&str; COLUMN_COUNT] = [
    "Title",
    "Reading Time (min)",
    "Author First Name",
    "Author Last Name",
    "Author Full Name",
    "Country",
    "Genre",
    "Birth Year",
    "Death Year",
    "Related Authors",
    "Categories",
];

impl Locale {
    /// Header labels in the fixed column order.
    pub fn headers(&self) -> [&'static str; COLUMN_COUNT] {
        match self {
            Self::Es => HEADERS_ES,
            Self::En => HEADERS_EN,
        }
    }
}

/// One metadata line in final column order, still tagged with its row index.
///
/// The written artifact carries no row key; the index exists so the exporter
/// can assert alignment before anything reaches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    /// Original vector-source position (0-based).
    pub row: usize,
    /// Cell values in header order.
    pub cells: [String; COLUMN_COUNT],
}

/// Projects cleaned records into the locale's labeled column set.
#[derive(Debug, Clone, Copy)]
pub struct Localizer {
    locale: Locale,
}

impl Localizer {
    /// Builds a localizer for the given locale.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Header labels for this run.
    pub fn header(&self) -> [&'static str; COLUMN_COUNT] {
        self.locale.headers()
    }

    /// Projects records in order. Column selection and order are fixed per
    /// locale and identical across runs.
    pub fn project(&self, records: &[CleanedRecord]) -> Vec<OutputRow> {
        records
            .iter()
            .map(|record| OutputRow {
                row: record.row,
                cells: [
                    record.title.clone(),
                    record.reading_time.clone(),
                    record.first_name.clone(),
                    record.last_name.clone(),
                    record.full_name.clone(),
                    record.country.clone(),
                    record.genre.clone(),
                    record.birth_year.to_string(),
                    record.death_year.to_string(),
                    record.linked_authors.clone(),
                    record.categories.clone(),
                ],
            })
            .collect()
    }
}
