use super::{charm_dir, find_bundle_dirs, find_bundles, find_bundles_in_dirs};
use crate::error::Error;
use std::fs;
use tempfile::TempDir;

const SUFFIXES: [&str; 2] = [".yaml", ".yaml.j2"];

#[test]
fn test_charm_dir_lowercases_name() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("keystone")).unwrap();

    let dir = charm_dir(root.path(), "Keystone").unwrap();
    assert_eq!(dir, root.path().join("keystone"));
}

#[test]
fn test_missing_charm_dir() {
    let root = TempDir::new().unwrap();

    match charm_dir(root.path(), "nova") {
        Err(Error::MissingCharmDir(dir)) => assert_eq!(dir, root.path().join("nova")),
        other => panic!("expected MissingCharmDir, got {other:?}"),
    }
}

#[test]
fn test_only_existing_bundle_dirs_returned() {
    let charm = TempDir::new().unwrap();
    fs::create_dir_all(charm.path().join("src/tests/bundles/overlays")).unwrap();

    let dirs = find_bundle_dirs(
        charm.path(),
        &[
            "tests/bundles",
            "tests/bundles/overlays",
            "src/tests/bundles",
            "src/tests/bundles/overlays",
        ],
    );

    assert_eq!(
        dirs,
        vec![
            charm.path().join("src/tests/bundles"),
            charm.path().join("src/tests/bundles/overlays"),
        ]
    );
}

#[test]
fn test_bundles_filtered_by_suffix() {
    let dir = TempDir::new().unwrap();
    for name in ["jammy-yoga.yaml", "local-charm-overlay.yaml.j2", "README.md", "noble.yml"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("overlays.yaml")).unwrap();

    let bundles = find_bundles(dir.path(), &SUFFIXES).unwrap();

    assert_eq!(
        bundles,
        vec![
            dir.path().join("jammy-yoga.yaml"),
            dir.path().join("local-charm-overlay.yaml.j2"),
        ]
    );
}

#[test]
fn test_bundles_across_dirs_deduplicated() {
    let charm = TempDir::new().unwrap();
    let bundles_dir = charm.path().join("tests/bundles");
    let overlays_dir = bundles_dir.join("overlays");
    fs::create_dir_all(&overlays_dir).unwrap();
    fs::write(bundles_dir.join("focal.yaml"), "").unwrap();
    fs::write(overlays_dir.join("focal.yaml.j2"), "").unwrap();

    let dirs = vec![bundles_dir.clone(), overlays_dir.clone(), bundles_dir.clone()];
    let bundles = find_bundles_in_dirs(&dirs, &SUFFIXES).unwrap();

    assert_eq!(bundles.len(), 2);
    assert!(bundles.contains(&bundles_dir.join("focal.yaml")));
    assert!(bundles.contains(&overlays_dir.join("focal.yaml.j2")));
}

#[test]
fn test_unlistable_dir_is_an_error() {
    let root = TempDir::new().unwrap();
    assert!(find_bundles(&root.path().join("missing"), &SUFFIXES).is_err());
}
