//! Command-line configuration for the export binary.

use std::path::PathBuf;

use clap::Parser;

use crate::clean::AnomalyTables;
use crate::localize::Locale;
use crate::pipeline::PipelineConfig;

/// Command-line interface for the export pipeline.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "projector-export",
    about = "Exports row-aligned Embedding Projector artifacts from story data"
)]
pub struct Cli {
    /// Embedding vectors table (vector_id, values)
    #[arg(long, env = "PROJECTOR_VECTORS", default_value = "embeddings_total.csv")]
    pub vectors: PathBuf,

    /// Story table (uuid_story, author_uuid, story_name, reading_time_min)
    #[arg(
        long,
        env = "PROJECTOR_STORIES",
        default_value = "coem_cuentos_authors.csv"
    )]
    pub stories: PathBuf,

    /// Enriched author table keyed by UUID
    #[arg(
        long,
        env = "PROJECTOR_AUTHORS",
        default_value = "coem_authors_enriched.csv"
    )]
    pub authors: PathBuf,

    /// Directory receiving the three artifacts
    #[arg(long, env = "PROJECTOR_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Label language for the metadata header
    #[arg(long, env = "PROJECTOR_LOCALE", value_enum, default_value = "es")]
    pub locale: Locale,
}

impl Cli {
    /// Converts the parsed CLI into a pipeline configuration.
    pub fn build_config(&self) -> PipelineConfig {
        PipelineConfig {
            vectors: self.vectors.clone(),
            stories: self.stories.clone(),
            authors: self.authors.clone(),
            out_dir: self.out_dir.clone(),
            locale: self.locale,
            tables: AnomalyTables::default(),
        }
    }
}
