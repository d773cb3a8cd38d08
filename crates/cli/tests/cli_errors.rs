use assert_cmd::cargo::cargo_bin_cmd;
use generate_symbols::commands::{build_config, GenerateOptions};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn missing_binary_exits_with_failure() {
    let temp = tempdir().unwrap();
    cargo_bin_cmd!("generate-symbols")
        .arg(temp.path().join("no-such-binary"))
        .arg(temp.path().join("symbols"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Cannot find"));
}

#[test]
fn missing_dump_syms_path_is_fatal() {
    let temp = tempdir().unwrap();
    let app = temp.path().join("app");
    std::fs::write(&app, b"bin").unwrap();
    cargo_bin_cmd!("generate-symbols")
        .arg("--dump_syms_path")
        .arg(temp.path().join("dump_syms"))
        .arg(&app)
        .arg(temp.path().join("symbols"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Cannot find"));
}

#[test]
fn dump_syms_absent_from_path_is_fatal() {
    let temp = tempdir().unwrap();
    let app = temp.path().join("app");
    std::fs::write(&app, b"bin").unwrap();
    let empty_path = temp.path().join("empty-path");
    std::fs::create_dir(&empty_path).unwrap();
    cargo_bin_cmd!("generate-symbols")
        .env("PATH", &empty_path)
        .arg("--platform=linux")
        .arg(&app)
        .arg(temp.path().join("symbols"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Cannot find dump_syms"));
    assert!(!temp.path().join("symbols").exists());
}

#[test]
fn unsupported_platform_is_fatal() {
    let temp = tempdir().unwrap();
    let app = temp.path().join("app");
    std::fs::write(&app, b"bin").unwrap();
    cargo_bin_cmd!("generate-symbols")
        .arg("--platform=android")
        .arg(&app)
        .arg(temp.path().join("symbols"))
        .assert()
        .failure()
        .stderr(contains("Platform not supported: android"));
}

#[test]
fn usage_error_without_positional_arguments() {
    cargo_bin_cmd!("generate-symbols").assert().failure();
}

#[test]
fn build_config_rejects_zero_jobs() {
    let temp = tempdir().unwrap();
    let app = temp.path().join("app");
    std::fs::write(&app, b"bin").unwrap();
    let mut options =
        GenerateOptions::new(app.to_string_lossy(), temp.path().join("symbols").to_string_lossy());
    let dump_syms = temp.path().join("dump_syms");
    std::fs::write(&dump_syms, b"#!/bin/sh\n").unwrap();
    options.dump_syms_path = Some(dump_syms.to_string_lossy().to_string());
    options.jobs = Some(0);
    let err = build_config(&options).unwrap_err();
    assert!(err.to_string().contains("--jobs must be at least 1"), "unexpected error: {err}");
}

#[test]
fn build_config_applies_overrides() {
    let temp = tempdir().unwrap();
    let app = temp.path().join("app");
    std::fs::write(&app, b"bin").unwrap();
    let dump_syms = temp.path().join("dump_syms");
    std::fs::write(&dump_syms, b"#!/bin/sh\n").unwrap();
    let mut options =
        GenerateOptions::new(app.to_string_lossy(), temp.path().join("symbols").to_string_lossy());
    options.jobs = Some(3);
    options.platform = Some("darwin".into());
    options.dump_syms_path = Some(dump_syms.to_string_lossy().to_string());
    options.clear = true;

    let (binary, config) = build_config(&options).unwrap();
    assert_eq!(binary, app.canonicalize().unwrap());
    assert_eq!(config.jobs, 3);
    assert_eq!(config.platform, symgen_core::Platform::Darwin);
    assert_eq!(config.dump_syms_path.as_deref(), Some(dump_syms.as_path()));
    assert!(config.clear);
}
