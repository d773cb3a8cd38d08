mod support;

use std::fs;
use std::path::PathBuf;

use symgen_core::store::{read_identity, sidecar_candidates, SymlinkOutcome, ZERO_HASH_DIR};
use symgen_core::{SymbolIdentity, SymbolStore};
use support::canonical_root;

fn identity(name: &str, hash: &str) -> SymbolIdentity {
    SymbolIdentity::parse(&format!("MODULE Linux x86_64 {hash} {name}")).unwrap()
}

#[test]
fn symbol_path_is_name_hash_name_sym() {
    let store = SymbolStore::new("/symbols");
    let id = identity("libfoo.so", "ABC123");
    assert_eq!(store.symbol_path(&id), PathBuf::from("/symbols/libfoo.so/ABC123/libfoo.so.sym"));
}

#[test]
fn pdb_names_swap_extension() {
    let store = SymbolStore::new("/symbols");
    let id = identity("xul.PDB", "F1E853FD1");
    assert_eq!(store.symbol_path(&id), PathBuf::from("/symbols/xul.PDB/F1E853FD1/xul.sym"));
}

#[test]
fn zero_hash_dir_is_32_zeros() {
    assert_eq!(ZERO_HASH_DIR.len(), 32);
    assert!(ZERO_HASH_DIR.chars().all(|c| c == '0'));
}

#[cfg(unix)]
#[test]
fn create_symbol_dir_links_zero_hash_and_tolerates_repeats() {
    let temp = tempfile::tempdir().unwrap();
    let store = SymbolStore::new(temp.path().join("symbols"));
    let id = identity("libfoo.so", "ABC123");

    let (dir, outcome) = store.create_symbol_dir(&id).unwrap();
    assert!(dir.is_dir());
    assert!(matches!(outcome, SymlinkOutcome::Created));
    let link = temp.path().join("symbols/libfoo.so").join(ZERO_HASH_DIR);
    assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("ABC123"));

    let (_, again) = store.create_symbol_dir(&id).unwrap();
    assert!(matches!(again, SymlinkOutcome::AlreadyPresent));
}

#[test]
fn import_copies_sidecar_into_slot() {
    let temp = tempfile::tempdir().unwrap();
    let sidecar = temp.path().join("libfoo.so.breakpad0");
    fs::write(&sidecar, "MODULE Linux x86_64 ABC123 libfoo.so\nFUNC 0 1 0 f\n").unwrap();
    let store = SymbolStore::new(temp.path().join("symbols"));
    let id = identity("libfoo.so", "ABC123");

    assert!(!store.contains(&id));
    let dest = store.import(&id, &sidecar).unwrap();
    assert!(store.contains(&id));
    assert_eq!(fs::read(dest).unwrap(), fs::read(&sidecar).unwrap());
}

#[test]
fn sidecars_match_binary_name_prefix_sorted() {
    let temp = tempfile::tempdir().unwrap();
    let root = canonical_root(&temp);
    let names = [
        "libfoo.so",
        "libfoo.so.breakpad1",
        "libfoo.so.breakpad0",
        "libfoo.sym",
        "libbar.so.breakpad0",
    ];
    for name in names {
        fs::write(root.join(name), "x").unwrap();
    }
    let found = sidecar_candidates(&root.join("libfoo.so")).unwrap();
    assert_eq!(found, vec![root.join("libfoo.so.breakpad0"), root.join("libfoo.so.breakpad1")]);
}

#[test]
fn read_identity_separates_io_from_bad_headers() {
    let temp = tempfile::tempdir().unwrap();
    let good = temp.path().join("good.sym");
    let bad = temp.path().join("bad.sym");
    fs::write(&good, "MODULE Linux x86_64 ABC123 libfoo.so\nFILE 0 a.c\n").unwrap();
    fs::write(&bad, "garbage\n").unwrap();

    assert_eq!(read_identity(&good).unwrap().unwrap(), identity("libfoo.so", "ABC123"));
    assert!(read_identity(&bad).unwrap().is_err());
    assert!(read_identity(&temp.path().join("missing.sym")).is_err());
}

#[test]
fn clear_is_best_effort() {
    let temp = tempfile::tempdir().unwrap();
    let store = SymbolStore::new(temp.path().join("symbols"));
    assert!(!store.clear());
    fs::create_dir_all(temp.path().join("symbols/a/b")).unwrap();
    assert!(store.clear());
    assert!(!temp.path().join("symbols").exists());
}
