//! sheetbind CLI
//!
//! Command-line tool for resolving columns and moving JSON records to and from CSV sheets.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use sheetbind_core::{
    parse_csv, AttributeColumnResolver, ColumnResolver, DataShape, DynamicRecord, ExportSettings,
    GridSink, JalaliLocalizer, ManualColumnResolver, SheetBuilder, SheetImporter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbind")]
#[command(about = "Map records to sheet columns and back", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns resolved for a JSON array of records
    Columns {
        /// JSON file holding an array of objects
        #[arg(short, long)]
        input: PathBuf,

        /// Column annotations (JSON array) to use instead of the record keys
        #[arg(short, long)]
        columns: Option<PathBuf>,
    },

    /// Export a JSON array of records to a CSV sheet
    Export {
        /// JSON file holding an array of objects
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet name
        #[arg(short, long, default_value = "Sheet1")]
        sheet: String,

        /// Export settings (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Column annotations (JSON array)
        #[arg(short, long)]
        columns: Option<PathBuf>,
    },

    /// Import a CSV sheet into a JSON array of records
    Import {
        /// Input CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON path
        #[arg(short, long)]
        output: PathBuf,

        /// Column annotations (JSON array)
        #[arg(short, long)]
        columns: Option<PathBuf>,
    },

    /// Create an export settings file with default values
    CreateSettings {
        /// Output path for the settings file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> sheetbind_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Columns { input, columns } => cmd_columns(&input, columns.as_deref()),
        Commands::Export {
            input,
            output,
            sheet,
            settings,
            columns,
        } => cmd_export(&input, &output, &sheet, settings.as_deref(), columns.as_deref()),
        Commands::Import {
            input,
            output,
            columns,
        } => cmd_import(&input, &output, columns.as_deref()),
        Commands::CreateSettings { output } => cmd_create_settings(&output),
    }
}

fn cmd_columns(input: &Path, columns: Option<&Path>) -> sheetbind_core::Result<()> {
    let records = load_records(input)?;
    let resolver = load_resolver(columns)?;
    let resolved = resolver.resolve(DataShape::Dynamic, records.first())?;

    println!("Columns ({}):", resolved.len());
    println!();
    println!("{:<24}{:<24}{:>10}  Value", "Name", "Source", "Priority");
    println!("{}", "-".repeat(64));
    for column in &resolved {
        println!(
            "{:<24}{:<24}{:>10}  {}",
            column.name,
            column.source_name,
            column.priority,
            if column.has_value { "yes" } else { "header only" }
        );
    }

    Ok(())
}

fn cmd_export(
    input: &Path,
    output: &Path,
    sheet: &str,
    settings: Option<&Path>,
    columns: Option<&Path>,
) -> sheetbind_core::Result<()> {
    let records = load_records(input)?;
    let settings = match settings {
        Some(path) => ExportSettings::load(path)?,
        None => ExportSettings::default(),
    };

    let mut builder = SheetBuilder::new(GridSink::new())
        .with_settings(settings)
        .with_localizer(JalaliLocalizer);
    builder = match columns {
        Some(path) => builder.with_resolver(ManualColumnResolver::load(path)?),
        None => builder,
    };
    builder.add_dynamic_sheet(sheet, &records)?;

    let sink = builder.into_sink();
    let text = sink.sheet(sheet)?.to_text();
    text.write_csv(output)?;

    println!("Exported {} rows to {}", text.row_count(), output.display());
    Ok(())
}

fn cmd_import(input: &Path, output: &Path, columns: Option<&Path>) -> sheetbind_core::Result<()> {
    let sheet = parse_csv(input)?;

    let importer = match columns {
        Some(path) => SheetImporter::new().with_resolver(ManualColumnResolver::load(path)?),
        None => SheetImporter::new(),
    };
    let records = importer.import_dynamic(&sheet)?;

    let array: Vec<Value> = records.iter().map(|r| Value::Object(r.to_json())).collect();
    fs::write(output, serde_json::to_string_pretty(&array)?)?;

    println!("Imported {} rows to {}", records.len(), output.display());
    Ok(())
}

fn cmd_create_settings(output: &Path) -> sheetbind_core::Result<()> {
    ExportSettings::default().save(output)?;

    println!("Created settings file: {}", output.display());
    println!();
    println!("Edit the file to adjust the layout, then run:");
    println!(
        "  sheetbind export --input <json> --output <csv> --settings {}",
        output.display()
    );

    Ok(())
}

fn load_records(path: &Path) -> sheetbind_core::Result<Vec<DynamicRecord>> {
    let content = fs::read_to_string(path).map_err(|e| sheetbind_core::Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let objects: Vec<Map<String, Value>> = serde_json::from_str(&content)?;

    debug!(path = %path.display(), records = objects.len(), "loaded records");
    Ok(objects.iter().map(DynamicRecord::from_json).collect())
}

fn load_resolver(columns: Option<&Path>) -> sheetbind_core::Result<Box<dyn ColumnResolver>> {
    Ok(match columns {
        Some(path) => Box::new(ManualColumnResolver::load(path)?),
        None => Box::new(AttributeColumnResolver::new(false)),
    })
}
