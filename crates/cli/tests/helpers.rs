use std::fs;
use std::path::Path;

use generate_symbols::{canonicalize_or_current, find_in_path};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result = canonicalize_or_current(subdir.to_str().unwrap()).expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_keeps_missing_absolute_path() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("symbols-not-yet-created");
    let result = canonicalize_or_current(missing.to_str().unwrap()).expect("canonicalize missing");
    assert_eq!(result, missing);
}

#[test]
fn canonicalize_or_current_anchors_missing_relative_path() {
    let result = canonicalize_or_current("definitely/not/here").expect("canonicalize relative");
    assert!(result.is_absolute());
    assert!(result.ends_with(Path::new("definitely/not/here")));
}

#[test]
fn find_in_path_misses_unknown_tools() {
    assert!(find_in_path("no-such-tool-generate-symbols-test").is_none());
}
