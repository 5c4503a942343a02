//! Command line interface for the historical event extractor. Supports
//! parsing documents into candidate events, accepting events into the
//! persistent location store, URL/PDF text extraction, and serving the
//! HTTP API.

mod config;
mod context;
mod dates;
mod fetch;
mod heuristic;
mod patterns;
mod pdf;
mod processor;
mod server;
mod storage;
mod store;
mod structured;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use event_types::{HistoricalEvent, ParsedEvent, ParserStrategy};

use config::Settings;
use processor::{EventProcessor, LocalProcessor};
use storage::FileStorage;
use store::EventStore;

#[derive(Parser)]
#[command(
    name = "event_extract",
    about = "Historical document event extractor"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document (or a directory of .txt/.md files) into events
    Parse {
        /// File or directory to parse
        path: PathBuf,
        /// Parser strategy: "regex" or "structured"
        #[arg(long, default_value = "regex")]
        strategy: ParserStrategy,
        /// Write the event JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List available parser strategies
    Strategies,
    /// Accept parsed events (output of `parse`) into a stored location
    Accept {
        /// Path to a ParsedEvent JSON array
        events: PathBuf,
        /// Merge into the existing location with this id
        #[arg(long, conflicts_with = "location")]
        id: Option<String>,
        /// Create a new location with this name
        #[arg(long)]
        location: Option<String>,
        /// Longitude of the new location
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lon: f64,
        /// Latitude of the new location
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lat: f64,
    },
    /// List stored locations with their events grouped by year
    Locations,
    /// Print the stored document as JSON
    Export,
    /// Replace the stored document from a JSON file
    Import {
        file: PathBuf,
    },
    /// Delete the stored document
    Clear,
    /// Fetch a URL and print its extracted text
    Fetch {
        url: String,
    },
    /// Extract text from a PDF file
    Pdf {
        file: PathBuf,
    },
    /// Run the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Parse {
            path,
            strategy,
            output,
        } => run_parse(&path, strategy, output),
        Command::Strategies => {
            run_strategies();
            Ok(())
        }
        Command::Accept {
            events,
            id,
            location,
            lon,
            lat,
        } => run_accept(&settings, &events, id, location, (lon, lat)),
        Command::Locations => {
            run_locations(&settings);
            Ok(())
        }
        Command::Export => run_export(&settings),
        Command::Import { file } => run_import(&settings, &file),
        Command::Clear => run_clear(&settings),
        Command::Fetch { url } => run_fetch(&settings, &url).await,
        Command::Pdf { file } => run_pdf(&file),
        Command::Serve => server::serve(settings).await,
    }
}

fn open_store(settings: &Settings) -> EventStore<FileStorage> {
    EventStore::new(FileStorage::new(&settings.store_path))
}

// ── parse ──────────────────────────────────────────────────────────────

fn run_parse(path: &Path, strategy: ParserStrategy, output: Option<PathBuf>) -> Result<()> {
    let processor = LocalProcessor::new();
    let files = collect_documents(path)?;
    if files.is_empty() {
        bail!("no .txt or .md documents under {}", path.display());
    }

    eprintln!(
        "Parsing {} document(s) with the {} strategy",
        files.len(),
        strategy
    );

    let mut events: Vec<ParsedEvent> = Vec::new();
    for file in &files {
        let text =
            fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
        let found = processor.parse_sync(&text, strategy);
        eprintln!("  {}: {} event(s)", file.display(), found.len());
        events.extend(found);
    }

    let json = serde_json::to_string_pretty(&events)?;
    match output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("  {} ({} bytes)", path.display(), json.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// A single file, or every .txt/.md file under a directory.
fn collect_documents(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            )
        })
        .collect();
    files.sort();
    Ok(files)
}

fn run_strategies() {
    let processor = LocalProcessor::new();
    for (name, description) in processor.strategies() {
        println!("{name}: {description}");
    }
}

// ── store commands ─────────────────────────────────────────────────────

fn run_accept(
    settings: &Settings,
    events_path: &Path,
    id: Option<String>,
    location: Option<String>,
    coordinates: (f64, f64),
) -> Result<()> {
    let json = fs::read_to_string(events_path)
        .with_context(|| format!("cannot read {}", events_path.display()))?;
    let parsed: Vec<ParsedEvent> = serde_json::from_str(&json)
        .with_context(|| format!("cannot parse {}", events_path.display()))?;
    let accepted: Vec<HistoricalEvent> = parsed.into_iter().map(HistoricalEvent::from).collect();
    let count = accepted.len();

    let mut store = open_store(settings);
    match id {
        Some(id) => {
            if store.location(&id).is_none() {
                bail!("no location with id {id}");
            }
            store.add_events_to_location(&id, accepted)?;
            let total = store.location(&id).map(|l| l.events.len()).unwrap_or(0);
            eprintln!("Merged {count} event(s) into {id} ({total} total)");
        }
        None => {
            let name = location.ok_or_else(|| anyhow::anyhow!("--location or --id is required"))?;
            let loc = store.create_location(&name, coordinates, accepted)?;
            eprintln!("Created location {} ({}) with {count} event(s)", loc.name, loc.id);
        }
    }
    Ok(())
}

fn run_locations(settings: &Settings) {
    let store = open_store(settings);
    let data = store.get_all();
    if data.locations.is_empty() {
        eprintln!("No locations stored.");
        return;
    }

    for location in &data.locations {
        let mut sorted: Vec<&event_types::HistoricalEvent> = location.events.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
        let span = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => format!(
                " [{} to {}]",
                dates::format_date_short(&first.date),
                dates::format_date_short(&last.date)
            ),
            _ => String::new(),
        };
        println!(
            "{} ({}) @ {:.4},{:.4}: {} event(s){span}",
            location.name,
            location.id,
            location.coordinates.0,
            location.coordinates.1,
            location.events.len()
        );
        for (year, events) in dates::group_by_year(&location.events) {
            println!("  {year}:");
            let mut events = events;
            events.sort_by(|a, b| a.date.cmp(&b.date));
            for event in events {
                println!("    {}  {}", dates::format_date(&event.date), event.title);
            }
        }
    }
}

fn run_export(settings: &Settings) -> Result<()> {
    let store = open_store(settings);
    println!("{}", store.export_json()?);
    Ok(())
}

fn run_import(settings: &Settings, file: &Path) -> Result<()> {
    let json =
        fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let mut store = open_store(settings);
    store.import_json(&json)?;
    eprintln!("Imported {} location(s)", store.locations().len());
    Ok(())
}

fn run_clear(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings);
    store.clear()?;
    eprintln!("Cleared stored data.");
    Ok(())
}

// ── extraction helpers ─────────────────────────────────────────────────

async fn run_fetch(settings: &Settings, raw_url: &str) -> Result<()> {
    let url = url::Url::parse(raw_url).context("invalid URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("URL must use http or https");
    }
    let text = fetch::fetch_text(&url, settings.fetch_timeout).await?;
    if text.len() > settings.max_document_bytes {
        eprintln!(
            "Warning: content is {}KB; large documents may affect parsing performance.",
            text.len() / 1024
        );
    }
    println!("{text}");
    Ok(())
}

fn run_pdf(file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;
    let text = pdf::extract_pdf_text(&bytes)?;
    println!("{text}");
    Ok(())
}
