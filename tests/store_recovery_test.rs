// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Recovery of damaged, unfinished, and stale table files.

mod common;

use common::{all_points, rng, scenario};
use credit_cover::error::BuildError;
use credit_cover::table::StoreStatus;
use credit_cover::{build_or_load, BuildOptions, Error, Problem, TableOrigin, TableStore};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;

fn problem() -> Problem {
    Problem::new(
        vec![2, 1, 2],
        vec![
            vec![1, 0, 1],
            vec![1, 1, 0],
            vec![0, 0, 1],
            vec![1, 0, 0],
            vec![0, 1, 1],
        ],
    )
    .unwrap()
}

#[test]
fn test_truncated_file_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    let problem = problem();
    let fresh = build_or_load(&problem, &path, BuildOptions::default()).unwrap();
    let expected: Vec<_> = all_points(&problem)
        .iter()
        .map(|p| fresh.entry(p).unwrap())
        .collect();
    drop(fresh);

    let len = fs::metadata(&path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(len - 1)
        .unwrap();

    let store = TableStore::open(&path).unwrap();
    assert_eq!(store.status(), StoreStatus::Uninitialized);
    drop(store);

    let rebuilt = build_or_load(&problem, &path, BuildOptions::default()).unwrap();
    assert_eq!(rebuilt.origin(), TableOrigin::Built);
    assert_eq!(fs::metadata(&path).unwrap().len(), len);
    let actual: Vec<_> = all_points(&problem)
        .iter()
        .map(|p| rebuilt.entry(p).unwrap())
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_unfinished_flag_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    let problem = problem();
    drop(build_or_load(&problem, &path, BuildOptions::default()).unwrap());

    let mut file = OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.write_all(&[0x01]).unwrap();
    drop(file);

    let table = build_or_load(&problem, &path, BuildOptions::default()).unwrap();
    assert_eq!(table.origin(), TableOrigin::Built);
}

#[test]
fn test_garbage_file_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    fs::write(&path, b"\x00\x01\x00\x02 not a table at all").unwrap();

    let table = build_or_load(&scenario(), &path, BuildOptions::default()).unwrap();
    assert_eq!(table.origin(), TableOrigin::Built);
    assert_eq!(table.min_items(&[1, 1]).unwrap(), 1);
}

#[test]
fn test_corrupt_catalog_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    drop(build_or_load(&scenario(), &path, BuildOptions::default()).unwrap());

    // First catalog entry id (offset 4 + M) set beyond N.
    let mut file = OpenOptions::new().write(true).open(&path).unwrap();
    file.seek(SeekFrom::Start(6)).unwrap();
    file.write_all(&[0x00, 0x09]).unwrap();
    drop(file);

    assert_eq!(
        TableStore::open(&path).unwrap().status(),
        StoreStatus::Uninitialized
    );
}

#[test]
fn test_persistence_idempotence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    let problem = problem();
    let (_fresh_dir, fresh) = common::build(&problem);

    drop(build_or_load(&problem, &path, BuildOptions::default()).unwrap());
    let loaded = build_or_load(&problem, &path, BuildOptions::default()).unwrap();
    assert_eq!(loaded.origin(), TableOrigin::Loaded);

    let mut rng = rng(9);
    for point in all_points(&problem) {
        assert_eq!(loaded.entry(&point).unwrap(), fresh.entry(&point).unwrap());
        let witness = loaded.solve(&point, &mut rng).unwrap();
        assert_eq!(
            witness.len() as u32,
            fresh.min_items(&problem.shape().complement(&point)).unwrap()
        );
    }
}

#[test]
fn test_stale_table_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    drop(build_or_load(&problem(), &path, BuildOptions::default()).unwrap());

    let smaller = scenario();
    let table = build_or_load(&smaller, &path, BuildOptions::default()).unwrap();
    assert_eq!(table.origin(), TableOrigin::Built);
    assert_eq!(table.store().shape().unwrap(), smaller.shape());
}

#[test]
fn test_cancelled_build_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.bin");
    let problem = problem();

    let options = BuildOptions {
        cancel: Some(Arc::new(AtomicBool::new(true))),
        ..BuildOptions::default()
    };
    let result = build_or_load(&problem, &path, options);
    assert!(matches!(result, Err(Error::Build(BuildError::Cancelled))));
    assert_eq!(
        TableStore::open(&path).unwrap().status(),
        StoreStatus::Uninitialized
    );

    let table = build_or_load(&problem, &path, BuildOptions::default()).unwrap();
    assert_eq!(table.origin(), TableOrigin::Built);
}
