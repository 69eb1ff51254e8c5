use anyhow::Result;
use clap::Parser;

use story_projector::{pipeline, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let report = pipeline::run(&cli.build_config())?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    eprintln!(
        "joined {} vector rows ({} with stories, {} with authors)",
        report.vector_rows, report.matched_stories, report.matched_authors
    );
    eprintln!(
        "wrote {} rows of dimension {} to {}, {}, {}",
        report.summary.rows,
        report.summary.dimension,
        report.summary.metadata.display(),
        report.summary.tensors.display(),
        report.summary.tensors_mirror.display()
    );
    Ok(())
}
