use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::models::{Company, CompanySummary, StoreStats, StoredFileInfo, UploadedFile};

/// Record store for companies and their uploaded files
#[derive(Clone)]
pub struct DatabaseManager {
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseManager {
    /// Create a new DatabaseManager with the given database path
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .with_context(|| format!("Failed to open database at {}", database_path))?;
        let db = Self::from_connection(conn)?;
        info!("Database initialized at {}", database_path);
        Ok(db)
    }

    /// Create a throwaway in-memory store
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = DatabaseManager {
            connection: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                tax_id TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at DATETIME
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS uploaded_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                file_blob BLOB NOT NULL,
                uploaded_at DATETIME,
                FOREIGN KEY (company_id) REFERENCES companies(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_uploaded_files_company ON uploaded_files(company_id)",
            [],
        )?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Insert a new company and return its freshly assigned id.
    /// Tax ids are not checked for uniqueness.
    pub fn register_company(&self, name: &str, tax_id: &str, email: &str) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO companies (name, tax_id, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, tax_id, email, Utc::now()],
        )
        .with_context(|| format!("Failed to register company '{}'", name))?;

        let id = conn.last_insert_rowid();
        info!("Registered company {} with id {}", name, id);
        Ok(id)
    }

    /// All companies in insertion order
    pub fn list_companies(&self) -> Result<Vec<CompanySummary>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT id, name FROM companies ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(CompanySummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut companies = Vec::new();
        for row in rows {
            companies.push(row?);
        }

        Ok(companies)
    }

    /// Get a company by id
    pub fn get_company(&self, company_id: i64) -> Result<Option<Company>> {
        let conn = self.conn()?;

        let company = conn
            .query_row(
                "SELECT id, name, tax_id, email, created_at FROM companies WHERE id = ?1",
                params![company_id],
                |row| {
                    Ok(Company {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        tax_id: row.get(2)?,
                        email: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(company)
    }

    /// Persist an uploaded file for a company and return the file id.
    /// Fails when the company does not exist.
    pub fn store_file(&self, company_id: i64, file_name: &str, bytes: &[u8]) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO uploaded_files (company_id, file_name, file_blob, uploaded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![company_id, file_name, bytes, Utc::now()],
        )
        .with_context(|| {
            format!("Failed to store file '{}' for company {}", file_name, company_id)
        })?;

        let id = conn.last_insert_rowid();
        info!(
            "Stored file {} ({} bytes) for company {} as file {}",
            file_name,
            bytes.len(),
            company_id,
            id
        );
        Ok(id)
    }

    /// Get an uploaded file, including its contents
    pub fn get_file(&self, file_id: i64) -> Result<Option<UploadedFile>> {
        let conn = self.conn()?;

        let file = conn
            .query_row(
                "SELECT id, company_id, file_name, file_blob, uploaded_at
                 FROM uploaded_files WHERE id = ?1",
                params![file_id],
                |row| {
                    Ok(UploadedFile {
                        id: row.get(0)?,
                        company_id: row.get(1)?,
                        file_name: row.get(2)?,
                        bytes: row.get(3)?,
                        uploaded_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        debug!("Loaded file {}: found={}", file_id, file.is_some());
        Ok(file)
    }

    /// Most recent upload for a company
    pub fn latest_file(&self, company_id: i64) -> Result<Option<UploadedFile>> {
        let conn = self.conn()?;

        let file = conn
            .query_row(
                "SELECT id, company_id, file_name, file_blob, uploaded_at
                 FROM uploaded_files
                 WHERE company_id = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![company_id],
                |row| {
                    Ok(UploadedFile {
                        id: row.get(0)?,
                        company_id: row.get(1)?,
                        file_name: row.get(2)?,
                        bytes: row.get(3)?,
                        uploaded_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(file)
    }

    /// Uploads for a company, oldest first, without contents
    pub fn list_files(&self, company_id: i64) -> Result<Vec<StoredFileInfo>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, company_id, file_name, length(file_blob), uploaded_at
             FROM uploaded_files
             WHERE company_id = ?1
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![company_id], |row| {
            Ok(StoredFileInfo {
                id: row.get(0)?,
                company_id: row.get(1)?,
                file_name: row.get(2)?,
                size_bytes: row.get(3)?,
                uploaded_at: row.get(4)?,
            })
        })?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }

        Ok(files)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;

        let companies: i64 =
            conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;

        let (files, total_bytes): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(length(file_blob)), 0) FROM uploaded_files",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            companies: companies as usize,
            files: files as usize,
            total_bytes,
        })
    }
}
