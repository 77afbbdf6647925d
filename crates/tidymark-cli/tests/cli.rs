//! End-to-end tests driving the compiled binary against temp notebooks.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn tidymark(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tidymark").expect("binary builds");
    cmd.arg("--notebook").arg(root);
    cmd
}

#[test]
fn missing_notebook_is_a_polite_no_op() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notebook found"));
}

#[test]
fn init_scaffolds_once() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created a blank notebook"));
    assert!(dir.path().join("config.json").is_file());
    assert!(dir.path().join("templates").join("note.md").is_file());
    assert!(dir.path().join("notes").is_dir());

    tidymark(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn note_generation_skips_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path()).arg("init").assert().success();

    tidymark(dir.path())
        .args(["note", "2025-03-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote note for 2025-03-14"));

    let note = dir
        .path()
        .join("notes")
        .join("2025")
        .join("03")
        .join("2025_03_14.md");
    let content = fs::read_to_string(&note).unwrap();
    assert!(content.contains("# Friday 14 March 2025"));

    tidymark(dir.path())
        .args(["note", "2025-03-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists - skipping"));
}

#[test]
fn series_reports_created_count() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path()).arg("init").assert().success();

    tidymark(dir.path())
        .args(["series", "3", "--start", "2025-03-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 3 of 3 notes"));
    assert!(dir
        .path()
        .join("notes")
        .join("2025")
        .join("03")
        .join("2025_03_16.md")
        .is_file());
}

#[test]
fn clean_then_render_produces_html() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path()).arg("init").assert().success();
    tidymark(dir.path())
        .args(["note", "2025-03-14"])
        .assert()
        .success();

    // Fill in the day's entry the way a user would.
    let note = dir
        .path()
        .join("notes")
        .join("2025")
        .join("03")
        .join("2025_03_14.md");
    let mut content = fs::read_to_string(&note).unwrap();
    content.push_str("\nDaily entry.\n\n## Proj Alpha\n\nWrok on the parser.\n");
    fs::write(&note, content).unwrap();
    fs::write(
        dir.path().join("working").join("corrections.json"),
        r#"{"Wrok": "Work"}"#,
    )
    .unwrap();

    tidymark(dir.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rewritten"));
    let cleaned = fs::read_to_string(&note).unwrap();
    assert!(cleaned.contains("Work on the parser."));

    tidymark(dir.path())
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered notebook to"));
    let html =
        fs::read_to_string(dir.path().join("rendered").join("Notebook.html")).unwrap();
    assert!(html.contains("<h2>Friday 14 March 2025</h2>"));
    assert!(html.contains("<h3>Proj Alpha</h3>"));
    assert!(html.contains("Work on the parser."));
    assert!(dir.path().join("working").join("hash_log.csv").is_file());
}

#[test]
fn extract_renders_one_project_or_reports_none() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path()).arg("init").assert().success();
    let note_dir = dir.path().join("notes");
    fs::write(
        note_dir.join("a.md"),
        "# Friday 14 March 2025\n\nEntry.\n\n## Proj Alpha\n\nProgress.\n",
    )
    .unwrap();

    tidymark(dir.path())
        .args(["extract", "Proj Alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered project to"));
    let html =
        fs::read_to_string(dir.path().join("rendered").join("Proj Alpha.html")).unwrap();
    assert!(html.contains("<h2>Friday 14 March 2025</h2>"));
    assert!(html.contains("Progress."));

    tidymark(dir.path())
        .args(["extract", "Nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found"));
}

#[test]
fn extract_all_walks_the_project_map() {
    let dir = tempfile::tempdir().unwrap();
    tidymark(dir.path()).arg("init").assert().success();
    fs::write(
        dir.path().join("notes").join("a.md"),
        "# Friday 14 March 2025\n\nEntry.\n\n## Proj Alpha\n\nProgress.\n",
    )
    .unwrap();

    // Clean first so the project map knows about the heading.
    tidymark(dir.path()).arg("clean").assert().success();
    tidymark(dir.path())
        .arg("extract-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 1 projects"));
    assert!(dir.path().join("rendered").join("Proj Alpha.html").is_file());
}
