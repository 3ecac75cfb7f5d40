// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use forge_core::{ProjectCatalog, ProjectDescriptor};

use super::*;

#[test]
fn missing_catalog_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_catalog(&dir.path().join("catalog.json")).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn catalog_roundtrips_through_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let mut catalog = ProjectCatalog::new();
    catalog
        .add(ProjectDescriptor {
            url: "https://example.com/repo".to_string(),
            rev: "abc".to_string(),
            options: "-DCMAKE_BUILD_TYPE=RELEASE".to_string(),
            files: vec!["a.cc".to_string()],
        })
        .unwrap();

    save_catalog(&path, &catalog).unwrap();
    let loaded = load_catalog(&path).unwrap();

    assert_eq!(loaded.projects(), catalog.projects());
}

#[test]
fn corrupt_catalog_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = load_catalog(&path).unwrap_err();
    assert!(matches!(err, LifecycleError::CatalogFile(_)));
}

#[test]
fn save_catalog_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/state/catalog.json");

    save_catalog(&path, &ProjectCatalog::new()).unwrap();
    assert!(path.exists());
}
