use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn write_fixtures(dir: &Path) {
    fs::write(
        dir.join("vectors.csv"),
        "vector_id,values\n\
         A,\"[0.0, 0.5, 1.0, 1.5]\"\n\
         B,\"[2.0, 2.5, 3.0, 3.5]\"\n",
    )
    .expect("vectors fixture");
    fs::write(
        dir.join("stories.csv"),
        "uuid_story,author_uuid,story_name,reading_time_min\n\
         A,AU1,El Aleph,12\n",
    )
    .expect("stories fixture");
    fs::write(
        dir.join("authors.csv"),
        "UUID,Author,LastName,Name,country,genera,Wiki_URL,cats,linked_authors,Birth Year,Death Year\n\
         AU1,Jorge,Borges,Jorge Luis Borges,Argentino,Fantastico,https://w,cuento,Bioy Casares,1899,1986\n",
    )
    .expect("authors fixture");
}

fn run_export(dir: &Path, extra_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_projector_export"))
        .arg("--vectors")
        .arg(dir.join("vectors.csv"))
        .arg("--stories")
        .arg(dir.join("stories.csv"))
        .arg("--authors")
        .arg(dir.join("authors.csv"))
        .arg("--out-dir")
        .arg(dir)
        .args(extra_args)
        .output()
        .expect("run CLI")
}

#[test]
fn cli_exports_three_aligned_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());

    let output = run_export(dir.path(), &[]);
    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wrote 2 rows of dimension 4"));

    let metadata =
        fs::read_to_string(dir.path().join("stories_metadata.tsv")).expect("metadata artifact");
    let lines: Vec<&str> = metadata.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Título\tTiempo de Lectura (min)\t"));
    assert_eq!(
        lines[1],
        "El Aleph\t12\tJorge\tBorges\tJorge Luis Borges\tArgentina\tFantastico\t1899\t1986\tBioy Casares\tcuento"
    );
    // The unmatched row survives with sentinels.
    assert_eq!(
        lines[2],
        "\t\t\t\tUnknown\tUnknown\tUnknown\t0\t0\tUnknown\tUnknown"
    );

    let blob = fs::read(dir.path().join("stories_tensors.bytes")).expect("tensor blob");
    assert_eq!(blob.len(), 2 * 4 * 8);
    assert_eq!(blob[..8], 0.0f64.to_le_bytes());
    assert_eq!(blob[32..40], 2.0f64.to_le_bytes());

    let mirror =
        fs::read_to_string(dir.path().join("stories_tensors.tsv")).expect("tensor mirror");
    assert_eq!(mirror, "0\t0.5\t1\t1.5\n2\t2.5\t3\t3.5\n");
}

#[test]
fn cli_repeats_byte_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());

    assert!(run_export(dir.path(), &[]).status.success());
    let first = fs::read(dir.path().join("stories_metadata.tsv")).expect("first run");
    assert!(run_export(dir.path(), &[]).status.success());
    let second = fs::read(dir.path().join("stories_metadata.tsv")).expect("second run");

    assert_eq!(first, second);
}

#[test]
fn cli_honors_english_locale() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());

    let output = run_export(dir.path(), &["--locale", "en"]);
    assert!(output.status.success());

    let metadata =
        fs::read_to_string(dir.path().join("stories_metadata.tsv")).expect("metadata artifact");
    let header = metadata.lines().next().expect("header row");
    assert_eq!(
        header,
        "Title\tReading Time (min)\tAuthor First Name\tAuthor Last Name\tAuthor Full Name\t\
         Country\tGenre\tBirth Year\tDeath Year\tRelated Authors\tCategories"
    );
}

#[test]
fn cli_rejects_short_vector_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());
    fs::write(
        dir.path().join("vectors.csv"),
        "vector_id,values\n\
         A,\"[0.0, 0.5, 1.0, 1.5]\"\n\
         B,\"[2.0, 2.5]\"\n",
    )
    .expect("vectors fixture");

    let output = run_export(dir.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected 4"), "stderr was: {stderr}");
    assert!(!dir.path().join("stories_metadata.tsv").exists());
    assert!(!dir.path().join("stories_tensors.bytes").exists());
    assert!(!dir.path().join("stories_tensors.tsv").exists());
}

#[test]
fn cli_rejects_duplicate_story_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());
    fs::write(
        dir.path().join("stories.csv"),
        "uuid_story,author_uuid,story_name,reading_time_min\n\
         A,AU1,El Aleph,12\n\
         A,AU1,El Aleph otra vez,9\n",
    )
    .expect("stories fixture");

    let output = run_export(dir.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not fan out"), "stderr was: {stderr}");
}
