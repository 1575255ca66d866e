use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use polabels::layout::LabelsPerRow;
use polabels::schema::LabelSchema;
use polabels::{normalize::FilteredRowSet, pipeline};

#[derive(Parser)]
#[command(name = "labelcli")]
#[command(about = "A CLI tool to turn purchase-order spreadsheets into printable labels")]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// A4 HTML sheet, 2 x 7 labels per page
    Html,
    /// PDF label table
    Pdf,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate an A4 HTML label sheet (labels.html)")]
    Html {
        #[arg(help = "Input spreadsheet (.xlsx or .xls)")]
        input: String,
        #[arg(short, long, help = "Output file or directory", default_value = ".")]
        output: String,
        #[arg(long, help = "Label schema JSON file overriding the built-in columns")]
        schema: Option<String>,
        #[arg(long, help = "Also print a base64 download link")]
        link: bool,
    },
    #[command(about = "Generate a PDF label table (material_labels.pdf)")]
    Pdf {
        #[arg(help = "Input spreadsheet (.xlsx or .xls)")]
        input: String,
        #[arg(short, long, help = "Output file or directory", default_value = ".")]
        output: String,
        #[arg(long, help = "Labels per row (1-3)", default_value = "2")]
        labels_per_row: u8,
        #[arg(long, help = "Label schema JSON file overriding the built-in columns")]
        schema: Option<String>,
        #[arg(long, help = "Reformat the delivery date as YYYY-MM-DD")]
        normalize_dates: bool,
    },
    #[command(about = "Show how many rows pass validation and preview them")]
    Preview {
        #[arg(help = "Input spreadsheet (.xlsx or .xls)")]
        input: String,
        #[arg(long, value_enum, help = "Which label schema to validate against", default_value = "html")]
        variant: Variant,
        #[arg(long, help = "Number of rows to show", default_value = "5")]
        rows: usize,
        #[arg(long, help = "Label schema JSON file overriding the built-in columns")]
        schema: Option<String>,
    },
    #[command(about = "Print a built-in label schema as JSON")]
    Schema {
        #[arg(value_enum, help = "Which built-in schema to print")]
        variant: Variant,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn load_schema(path: Option<&str>, variant: Variant) -> Result<LabelSchema> {
    match path {
        Some(path) => LabelSchema::load_from_file(path)
            .with_context(|| format!("Failed to load label schema from {}", path)),
        None => Ok(match variant {
            Variant::Html => LabelSchema::html_labels(),
            Variant::Pdf => LabelSchema::pdf_labels(),
        }),
    }
}

fn prepare(input: &str, schema: &LabelSchema) -> Result<FilteredRowSet> {
    let upload = std::fs::read(input).with_context(|| format!("Failed to read {}", input))?;
    let rows = pipeline::prepare(&upload, schema)
        .with_context(|| format!("Failed to process {}", input))?;
    println!("{}", rows.summary());
    Ok(rows)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Html {
            input,
            output,
            schema,
            link,
        } => {
            let schema = load_schema(schema.as_deref(), Variant::Html)?;
            let rows = prepare(&input, &schema)?;
            let sheet = pipeline::render_html(&rows, &schema)?;
            let path = sheet
                .artifact
                .write_to(&output)
                .with_context(|| format!("Failed to write {}", output))?;
            println!(
                "Successfully wrote {} labels on {} pages to {}",
                rows.len(),
                sheet.pages,
                path.display()
            );
            if link {
                println!("{}", sheet.artifact.download_link("点击下载标签文件"));
            }
        }
        Commands::Pdf {
            input,
            output,
            labels_per_row,
            schema,
            normalize_dates,
        } => {
            let per_row = LabelsPerRow::new(labels_per_row)?;
            let mut schema = load_schema(schema.as_deref(), Variant::Pdf)?;
            if normalize_dates {
                schema.normalize_dates = true;
            }
            let rows = prepare(&input, &schema)?;
            let artifact = pipeline::render_pdf(&rows, &schema, per_row)?;
            let path = artifact
                .write_to(&output)
                .with_context(|| format!("Failed to write {}", output))?;
            println!("Successfully wrote {} labels to {}", rows.len(), path.display());
        }
        Commands::Preview {
            input,
            variant,
            rows,
            schema,
        } => {
            let schema = load_schema(schema.as_deref(), variant)?;
            let filtered = prepare(&input, &schema)?;
            print!("{}", filtered.preview(rows));
        }
        Commands::Schema { variant } => {
            let schema = load_schema(None, variant)?;
            println!("{}", schema.to_json_pretty()?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
