//! Fundamental Figures CLI - build per-region fact sheets
//!
//! # Main Commands
//!
//! ```bash
//! figures run figure.json Auckland                 # All datasets → ./output/Auckland.json
//! figures run figure.json Auckland --format csv    # Flat CSV instead
//! figures run figure.json Auckland --format xlsx   # Workbook, one sheet per parent
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! figures dataset figure.json 0 local.csv Auckland # One dataset against a local file
//! figures parse input.csv                          # Headers, encoding and row count
//! figures terms Auckland --mapping terms.json      # Selectors a term matches
//! ```

use clap::{Parser, Subcommand};
use figures::{
    figure_to_records, parse_csv_file_auto, render, render_to_file, transform_csv_file,
    ConsoleReporter, Figure, Format, RunOptions, TermSet,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "figures")]
#[command(about = "Filter, deduplicate and order statistical datasets for one region", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the figure for a term from every configured dataset
    Run {
        /// Figure configuration file
        config: PathBuf,

        /// Query term, e.g. a territorial authority
        term: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (default: <outputPath>/<term>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report failing datasets and keep going
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Run one configured dataset against a local CSV and print JSON
    Dataset {
        /// Figure configuration file
        config: PathBuf,

        /// Zero-based dataset index in the configuration
        index: usize,

        /// Local CSV file to read instead of the dataset source
        csv: PathBuf,

        /// Query term
        term: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV file and print what was detected
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the selectors a term resolves to
    Terms {
        /// Query term
        term: String,

        /// Term-mapping JSON file
        #[arg(short, long)]
        mapping: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            term,
            format,
            output,
            continue_on_error,
        } => cmd_run(&config, &term, format, output.as_deref(), continue_on_error).await,

        Commands::Dataset {
            config,
            index,
            csv,
            term,
            output,
        } => cmd_dataset(&config, index, &csv, &term, output.as_deref()),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Terms { term, mapping } => cmd_terms(&term, mapping.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_run(
    config: &Path,
    term: &str,
    format: Format,
    output: Option<&Path>,
    continue_on_error: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading figure: {}", config.display());
    let figure = Figure::load(config)?;

    let options = RunOptions { continue_on_error };
    let records = figure_to_records(&figure, term, options, &ConsoleReporter).await?;
    eprintln!("\n⚙️  {} records for '{}'", records.len(), term);

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| format.default_path(&figure.output_path, term));
    render_to_file(&records, format, &path, &ConsoleReporter)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_dataset(
    config: &Path,
    index: usize,
    csv: &Path,
    term: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let figure = Figure::load(config)?;
    let dataset = figure.dataset(index)?;

    eprintln!("📄 Dataset #{}: {}", index, dataset.source);
    let outcome = transform_csv_file(dataset, csv, term, &ConsoleReporter)?;

    let mut buf = Vec::new();
    render(&outcome.records, Format::Json, csv, &mut buf)?;
    write_output(&String::from_utf8(buf)?, output)?;

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let table = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", table.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(table.delimiter));
    eprintln!("   Columns: {}", table.headers.join(", "));
    if table.skipped > 0 {
        eprintln!("   ⚠️  {} malformed rows skipped", table.skipped);
    }
    eprintln!("✅ Parsed {} rows", table.len());

    let summary = json!({
        "encoding": table.encoding,
        "delimiter": table.delimiter.to_string(),
        "headers": table.headers,
        "rows": table.len(),
        "skipped": table.skipped,
    });
    write_output(&serde_json::to_string_pretty(&summary)?, output)?;

    Ok(())
}

fn cmd_terms(term: &str, mapping: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let terms = TermSet::resolve(term, mapping)?;

    eprintln!("🔎 '{}' matches {} selector(s):", terms.term(), terms.len());
    for selector in terms.selectors() {
        println!("{}", selector);
    }

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
