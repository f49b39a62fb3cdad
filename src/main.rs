use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::error;

use illumine::database::DatabaseManager;
use illumine::extractor::{ExtractError, SheetLayout};
use illumine::intake::{self, Analysis};
use illumine::models::{Config, UploadedFile};
use illumine::report::{self, OutputFormat};

const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "illumine", version, about = "Company balance-sheet intake and ratio reports")]
struct Cli {
    /// Path to the SQLite database (defaults to DATABASE_PATH or empresas.db)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,
    /// Register a company
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: String,
        #[arg(long)]
        email: String,
    },
    /// List registered companies
    Companies,
    /// Store a spreadsheet or PDF for a company and show its analysis
    Upload {
        #[arg(long)]
        company: i64,
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the files uploaded for a company
    Files {
        #[arg(long)]
        company: i64,
    },
    /// Compute ratios from a stored file, or from a company's latest upload
    Report {
        #[arg(long, conflicts_with = "company", required_unless_present = "company")]
        file: Option<i64>,
        #[arg(long)]
        company: Option<i64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show record store statistics
    Stats,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
    /// Decimal places for ratio display (defaults to RATIO_PRECISION or 4)
    #[arg(long)]
    precision: Option<usize>,
    /// Print the extracted table before the ratios
    #[arg(long)]
    preview: bool,
}

fn main() {
    if let Err(e) = illumine::init_tracing("illumine=warn") {
        eprintln!("{}", e);
    }

    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let database = DatabaseManager::new(&config.database_path)?;

    match cli.command {
        Commands::Init => {
            let stats = database.get_stats()?;
            println!("✅ Database ready at {}", config.database_path);
            println!("   {} companies, {} files", stats.companies, stats.files);
        }
        Commands::Register { name, tax_id, email } => {
            let id = database.register_company(&name, &tax_id, &email)?;
            println!("✅ Registered {} with id {}", name, id);
        }
        Commands::Companies => {
            let companies = database.list_companies()?;
            if companies.is_empty() {
                println!("No companies registered yet.");
            }
            for company in companies {
                println!("{:>5}  {}", company.id, company.name);
            }
        }
        Commands::Upload { company, path, output } => {
            require_company(&database, company)?;
            let file_name = file_name_of(&path)?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            let file_id = intake::upload_file(&database, company, &file_name, &bytes)?;
            println!("✅ Stored {} as file {}", file_name, file_id);

            let file = database
                .get_file(file_id)?
                .with_context(|| format!("File {} vanished after upload", file_id))?;
            show_analysis(&file, &config, &output)?;
        }
        Commands::Files { company } => {
            require_company(&database, company)?;
            let files = database.list_files(company)?;
            if files.is_empty() {
                println!("No files uploaded for company {}.", company);
            }
            for file in files {
                let uploaded = file
                    .uploaded_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:>5}  {:<40} {:>10} bytes  {}", file.id, file.file_name, file.size_bytes, uploaded);
            }
        }
        Commands::Report { file, company, output } => {
            let stored = match (file, company) {
                (Some(file_id), _) => database
                    .get_file(file_id)?
                    .with_context(|| format!("No file with id {}", file_id))?,
                (None, Some(company_id)) => {
                    require_company(&database, company_id)?;
                    database
                        .latest_file(company_id)?
                        .with_context(|| format!("Company {} has no uploaded files", company_id))?
                }
                (None, None) => bail!("either --file or --company is required"),
            };
            show_analysis(&stored, &config, &output)?;
        }
        Commands::Stats => {
            let stats = database.get_stats()?;
            println!("📊 Companies: {}", stats.companies);
            println!("📁 Files: {}", stats.files);
            println!("💾 Stored bytes: {}", stats.total_bytes);
        }
    }

    Ok(())
}

fn require_company(database: &DatabaseManager, company_id: i64) -> Result<()> {
    if database.get_company(company_id)?.is_none() {
        bail!("No company with id {}", company_id);
    }
    Ok(())
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Invalid file path: {}", path.display()))
}

fn show_analysis(file: &UploadedFile, config: &Config, output: &OutputArgs) -> Result<()> {
    let layout = SheetLayout::from_config(config);
    let precision = output.precision.unwrap_or(config.ratio_precision);

    match intake::analyze_stored(file, &layout) {
        Ok(Analysis::Ratios { table, report: ratios }) => {
            if output.preview {
                println!("{}", report::render_table_preview(&table, PREVIEW_ROWS));
            }
            print!("{}", report::render(&ratios, output.format, precision)?);
        }
        Ok(Analysis::PdfText(text)) => {
            println!("{}", text);
        }
        Err(e @ ExtractError::UnsupportedType { .. }) => bail!("Unsupported file type: {}", e),
        Err(e @ ExtractError::ShapeMismatch(_)) => {
            bail!("Could not read spreadsheet {}: {}", file.file_name, e)
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
