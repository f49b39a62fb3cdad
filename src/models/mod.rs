use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered company
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub tax_id: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Company listing entry (id and name only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySummary {
    pub id: i64,
    pub name: String,
}

/// Uploaded file with its raw contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    pub company_id: i64,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Uploaded file metadata, without the blob
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFileInfo {
    pub id: i64,
    pub company_id: i64,
    pub file_name: String,
    pub size_bytes: i64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Record store statistics
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StoreStats {
    pub companies: usize,
    pub files: usize,
    pub total_bytes: i64,
}

pub const DEFAULT_DATABASE_PATH: &str = "empresas.db";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "Descrição";
pub const DEFAULT_RATIO_PRECISION: usize = 4;

/// Year columns of the canonical balance-sheet layout
pub fn default_report_years() -> Vec<String> {
    (2019..=2024).map(|year| year.to_string()).collect()
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub report_years: Vec<String>,
    pub description_column: String,
    pub ratio_precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            report_years: default_report_years(),
            description_column: DEFAULT_DESCRIPTION_COLUMN.to_string(),
            ratio_precision: DEFAULT_RATIO_PRECISION,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build a configuration from any key lookup; missing or unparseable values use defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let report_years = lookup("REPORT_YEARS")
            .map(|raw| parse_year_list(&raw))
            .filter(|years| !years.is_empty())
            .unwrap_or(defaults.report_years);

        Config {
            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.database_path),
            report_years,
            description_column: lookup("DESCRIPTION_COLUMN")
                .filter(|column| !column.trim().is_empty())
                .unwrap_or(defaults.description_column),
            ratio_precision: lookup("RATIO_PRECISION")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.ratio_precision),
        }
    }
}

/// Split a comma-separated year list, dropping empty entries
pub fn parse_year_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|year| year.trim())
        .filter(|year| !year.is_empty())
        .map(str::to_string)
        .collect()
}
