use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wikiperson::config::PROGRESS_INTERVAL;
use wikiperson::dataset::ExtractionDataset;
use wikiperson::filters::{FilterChain, ModernPersonFilter};
use wikiperson::store::{JsonlStore, PersonStore, SearchQuery};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wikiperson")]
#[command(about = "Extract biographical records from MediaWiki dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract people from a dump into the person store
    Extract(ExtractArgs),
    /// Search the person store by name, surname or patronymic
    Search(SearchArgs),
    /// Remove the person store
    Clear(StoreArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the dump file (.xml or .xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Directory holding the person store
    #[arg(short, long)]
    output: String,

    /// Stop after this many people have been stored
    #[arg(long)]
    limit: Option<usize>,

    /// Keep only people with a birth date and no death date
    #[arg(long)]
    modern_only: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Directory holding the person store
    #[arg(short, long)]
    output: String,

    /// Substring matched against name, surname and patronymic
    pattern: String,
}

#[derive(Args)]
struct StoreArgs {
    /// Directory holding the person store
    #[arg(short, long)]
    output: String,
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let mut filters = FilterChain::new();
    if args.modern_only {
        filters.push(ModernPersonFilter);
    }

    let dataset = ExtractionDataset::open(&args.input, filters, args.limit)
        .with_context(|| format!("Failed to open dump at: {}", args.input))?;
    let stats = dataset.stats();

    let pb = ProgressBar::new_spinner();
    let spinner = pb.clone();
    let ticker = stats.clone();
    let persons = dataset.inspect(move |_| {
        if ticker.accepted() % PROGRESS_INTERVAL == 0 {
            spinner.set_message(format!("{} people, {} pages", ticker.accepted(), ticker.pages()));
            spinner.tick();
        }
    });

    let start = Instant::now();
    let mut store = JsonlStore::new(&args.output);
    let stored = store.insert(persons)?;
    pb.finish_and_clear();
    let duration = start.elapsed();
    info!(duration_secs = duration.as_secs_f64(), "Extraction complete");

    println!();
    println!("=== Summary ===");
    println!("Extraction time:    {:.2}s", duration.as_secs_f64());
    println!("Pages read:         {}", stats.pages());
    println!("Redirects skipped:  {}", stats.redirects_skipped());
    println!("Not a person:       {}", stats.not_persons());
    println!("Failed to parse:    {}", stats.failures());
    println!("Filtered out:       {}", stats.filtered());
    println!("People stored:      {}", stored);
    println!("Store:              {}", store.path().display());

    Ok(())
}

fn run_search(args: SearchArgs) -> Result<()> {
    let store = JsonlStore::new(&args.output);
    let found = store.search(&SearchQuery::any_part(&args.pattern))?;
    for person in &found {
        println!("{}", serde_json::to_string_pretty(person)?);
    }
    info!(matches = found.len(), "Search complete");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Search(args) => run_search(args),
        Commands::Clear(args) => JsonlStore::new(&args.output).clear(),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
