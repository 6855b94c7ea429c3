//! Test utilities and module declarations for service tests.

use std::path::PathBuf;

use statlines_storage::Storage;
use tempfile::TempDir;

pub struct TestDb {
    pub storage: Storage,
    pub path: PathBuf,
    _dir: TempDir,
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_db() -> TestDb {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    let storage = Storage::new(&path).unwrap();
    TestDb { storage, path, _dir: dir }
}

mod registry_tests;
