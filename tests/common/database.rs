//! Test database utilities using the real DatabaseManager

use anyhow::Result;
use illumine::database::DatabaseManager;
use std::path::PathBuf;
use tempfile::TempDir;

/// A file-backed database that is deleted with its temp directory
pub struct TestDatabase {
    pub db: DatabaseManager,
    pub path: PathBuf,
    _dir: TempDir,
}

/// Initialize a completely fresh test database (new file each time)
pub fn init_fresh_test_database() -> Result<TestDatabase> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empresas_test.db");
    let db = DatabaseManager::new(&path.to_string_lossy())?;

    Ok(TestDatabase { db, path, _dir: dir })
}

impl TestDatabase {
    /// Open a second manager on the same file, as a new process would
    pub fn reopen(&self) -> Result<DatabaseManager> {
        DatabaseManager::new(&self.path.to_string_lossy())
    }
}
