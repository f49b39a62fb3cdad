use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::Path;
use std::time::Instant;

use illumine::extractor::SheetLayout;
use illumine::intake::{analyze, Analysis};
use illumine::models::{parse_year_list, Config};
use illumine::report::{self, OutputFormat};

fn main() -> Result<()> {
    illumine::init_tracing("illumine=warn")?;

    let matches = Command::new("Balance Sheet Ratio Calculator")
        .version("1.0")
        .about("Calculate current liquidity, ROE and EBITDA margin straight from a spreadsheet")
        .arg(Arg::new("file")
            .value_name("FILE")
            .help("Spreadsheet (.xlsx) or PDF to read")
            .required(true))
        .arg(Arg::new("format")
            .long("format")
            .value_parser(clap::builder::EnumValueParser::<OutputFormat>::new())
            .default_value("table"))
        .arg(Arg::new("precision")
            .long("precision")
            .help("Decimal places for display")
            .value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("years")
            .long("years")
            .value_name("LIST")
            .help("Comma-separated year columns, e.g. 2019,2020,2021"))
        .arg(Arg::new("preview")
            .long("preview")
            .help("Print the extracted table before the ratios")
            .action(clap::ArgAction::SetTrue))
        .get_matches();

    let config = Config::from_env()?;
    let path = matches.get_one::<String>("file").context("FILE is required")?;
    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Table);
    let precision = matches
        .get_one::<usize>("precision")
        .copied()
        .unwrap_or(config.ratio_precision);

    let mut layout = SheetLayout::from_config(&config);
    if let Some(years) = matches.get_one::<String>("years") {
        layout.years = parse_year_list(years);
    }

    let file_name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid file path: {}", path))?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    let start_time = Instant::now();
    match analyze(file_name, &bytes, &layout)? {
        Analysis::Ratios { table, report: ratios } => {
            if matches.get_flag("preview") {
                println!("{}", report::render_table_preview(&table, 10));
            }
            print!("{}", report::render(&ratios, format, precision)?);

            if format == OutputFormat::Table {
                println!(
                    "\n⏱️  {} defined, {} undefined ratio values in {:?}",
                    ratios.defined_count(),
                    ratios.undefined_count(),
                    start_time.elapsed()
                );
            }
        }
        Analysis::PdfText(text) => println!("{}", text),
    }

    Ok(())
}
