use std::path::PathBuf;

use cachefs::{FileSystem, LocalFileSystem};
use chrono::{DateTime, Utc};

fn populated() -> (tempfile::TempDir, LocalFileSystem) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("eod").join("archive")).unwrap();
    std::fs::write(root.join("eod").join("2025-01-02.csv"), "a\n1\n").unwrap();
    std::fs::write(root.join("eod").join("2025-01-03.csv"), "a\n2\n").unwrap();
    std::fs::write(root.join("eod").join("notes.txt"), "x").unwrap();
    std::fs::write(root.join("eod").join("archive").join("2024-12-31.csv"), "a\n0\n").unwrap();
    let fs = LocalFileSystem::new(root);
    (dir, fs)
}

#[test]
fn test_get_file_maps_key_under_base() {
    let (dir, fs) = populated();
    let expected: PathBuf = dir.path().join("eod").join("2025-01-02.csv");

    assert_eq!(fs.get_file("eod/2025-01-02.csv", &[]).unwrap(), expected);
    assert_eq!(fs.get_file("eod", &["2025-01-02.csv"]).unwrap(), expected);

    // Existence is the caller's concern.
    let missing = fs.get_file("eod", &["1999-01-01.csv"]).unwrap();
    assert!(!missing.exists());
}

#[test]
fn test_modified_matches_disk() {
    let (dir, fs) = populated();
    let on_disk = std::fs::metadata(dir.path().join("eod").join("2025-01-03.csv"))
        .unwrap()
        .modified()
        .unwrap();

    let modified = fs.modified("eod", &["2025-01-03.csv"]).unwrap();
    assert_eq!(modified, DateTime::<Utc>::from(on_disk));

    // Birth time, or mtime where the platform has none; never in the future.
    assert!(fs.created("eod/2025-01-03.csv", &[]).unwrap() <= Utc::now());
}

#[test]
fn test_missing_paths_are_not_found() {
    let (_dir, fs) = populated();
    assert!(fs.modified("eod/1999-01-01.csv", &[]).unwrap_err().is_not_found());
    assert!(fs.created("eod", &["1999-01-01.csv"]).unwrap_err().is_not_found());
    assert!(fs.ls("nowhere").unwrap_err().is_not_found());
}

#[test]
fn test_ls_sorted_names() {
    let (_dir, fs) = populated();
    assert_eq!(
        fs.ls("eod").unwrap(),
        vec!["2025-01-02.csv", "2025-01-03.csv", "archive", "notes.txt"]
    );
}

#[test]
fn test_glob_relative_to_base() {
    let (dir, fs) = populated();
    let eod = dir.path().join("eod");
    let show = |p: PathBuf| p.display().to_string();

    assert_eq!(
        fs.glob("eod/*.csv").unwrap(),
        vec![show(eod.join("2025-01-02.csv")), show(eod.join("2025-01-03.csv"))]
    );
    assert_eq!(
        fs.glob("eod/**/*.csv").unwrap(),
        vec![
            show(eod.join("2025-01-02.csv")),
            show(eod.join("2025-01-03.csv")),
            show(eod.join("archive").join("2024-12-31.csv")),
        ]
    );
    assert_eq!(fs.glob("eod/notes.txt").unwrap(), vec![show(eod.join("notes.txt"))]);
    assert!(fs.glob("eod/*.parquet").unwrap().is_empty());
    assert!(fs.glob("nowhere/*.csv").unwrap().is_empty());
    assert!(fs.glob("").unwrap().is_empty());
    assert!(fs.glob("/").unwrap().is_empty());
}
