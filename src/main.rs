use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use show_critiques::config::Settings;
use show_critiques::source::{sqlite, DirectorySource, DocumentSource, SqliteSource};
use show_critiques::{CritiqueStore, Ingestor};

#[derive(Parser)]
#[command(name = "show_critiques", about = "Collect judge critiques per dog from show reports")]
struct Cli {
    /// Settings file (default: ./critiques.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store JSON file (overrides settings)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest new reports into the store
    Run {
        /// Directory of .txt reports (overrides settings)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Read reports from the SQLite database instead of a directory
        #[arg(long)]
        from_db: bool,
    },
    /// Copy a directory of .txt reports into the SQLite database
    Import {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Show store statistics
    Stats,
    /// Print the critiques collected for one dog
    Show {
        /// Exact dog name as stored
        dog: String,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Print critiques in full instead of truncating
        #[arg(long)]
        full: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }

    let result = match cli.command {
        Commands::Run { input, from_db } => {
            if let Some(dir) = input {
                settings.input_dir = dir;
            }
            let source: Box<dyn DocumentSource> = if from_db {
                Box::new(
                    SqliteSource::open(&settings.db_path)
                        .with_context(|| format!("Failed to open {:?}", settings.db_path))?,
                )
            } else {
                Box::new(DirectorySource::new(&settings.input_dir))
            };
            run(&settings, source.as_ref())
        }
        Commands::Import { input } => {
            if let Some(dir) = input {
                settings.input_dir = dir;
            }
            import(&settings)
        }
        Commands::Stats => {
            let store = load_store(&settings.store_path)?;
            let s = store.stats();
            println!("Dogs:      {}", s.dogs);
            println!("Critiques: {}", s.entries);
            println!("Sources:   {}", s.sources);
            match (s.earliest_year, s.latest_year) {
                (Some(a), Some(b)) => println!("Years:     {}-{}", a, b),
                _ => println!("Years:     -"),
            }
            println!("No year:   {}", s.unknown_year);
            println!("Owners:    {}", s.owners);
            if !s.per_place.is_empty() {
                println!("\n--- Places ---");
                for (place, n) in &s.per_place {
                    println!("  {:<6} {}", place, n);
                }
            }
            if !s.per_class.is_empty() {
                println!("\n--- Classes ---");
                for (class, n) in &s.per_class {
                    println!("  {:<6} {}", class, n);
                }
            }
            Ok(())
        }
        Commands::Show { dog, limit, full } => {
            let store = load_store(&settings.store_path)?;
            let entries = store.entries(&dog);
            if entries.is_empty() {
                println!("No critiques for {:?}.", dog);
                return Ok(());
            }

            println!("{:>4} | {:<16} | {:<5} | {:>5} | Critique", "Year", "Show", "Class", "Place");
            println!("{}", "-".repeat(100));
            for e in entries.iter().take(limit) {
                let year = e.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
                let place = e.place.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
                let critique = if full { e.critique.clone() } else { truncate(&e.critique, 64) };
                println!(
                    "{:>4} | {:<16} | {:<5} | {:>5} | {}",
                    year,
                    truncate(&e.show, 16),
                    e.class,
                    place,
                    critique
                );
            }
            println!("\n{} of {} critiques for {}", entries.len().min(limit), entries.len(), dog);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_store(path: &Path) -> anyhow::Result<CritiqueStore> {
    CritiqueStore::load(path).with_context(|| format!("Failed to load store {:?}", path))
}

fn run(settings: &Settings, source: &dyn DocumentSource) -> anyhow::Result<()> {
    let store = load_store(&settings.store_path)?;
    let ingestor = Ingestor::new(settings.markers());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let (store, report) = ingestor
        .run_with_progress(store, source, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .with_context(|| format!("Failed to ingest from {}", source.name()))?;
    pb.finish_and_clear();

    store
        .save(&settings.store_path)
        .with_context(|| format!("Failed to save store {:?}", settings.store_path))?;
    report.print();
    println!("Extracted critiques saved to {}", settings.store_path.display());
    Ok(())
}

fn import(settings: &Settings) -> anyhow::Result<()> {
    let dir = DirectorySource::new(&settings.input_dir);
    let ids = dir
        .identifiers()
        .with_context(|| format!("Failed to list {:?}", settings.input_dir))?;
    if ids.is_empty() {
        println!("No .txt reports in {}.", settings.input_dir.display());
        return Ok(());
    }

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        let body = dir.load(&id).with_context(|| format!("Failed to read {}", id))?;
        reports.push((id, body));
    }

    let db = SqliteSource::open(&settings.db_path)
        .with_context(|| format!("Failed to open {:?}", settings.db_path))?;
    let inserted = sqlite::insert_reports(db.connection(), &reports)?;
    println!(
        "Inserted {} new reports ({} found) into {}",
        inserted,
        reports.len(),
        settings.db_path.display()
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
