//! Podium - Paris 2024 Olympic Games dashboard
//!
//! Opens the desktop dashboard by default; the subcommands print summaries
//! or export a static chart report from the terminal.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing data, bad arguments, render failure, etc.)

use anyhow::{Context, Result};
use podium::analysis::{athletes, daily, head_to_head};
use podium::cli::{Args, Command, OutputFormat};
use podium::commands::{self, Summary};
use podium::config::Config;
use podium::data::DataStore;
use podium::{gui, report};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let args = Args::parse_args();

    // Handle init-config early (no logging needed)
    if args.command() == Command::InitConfig {
        match Config::init(Path::new(".")) {
            Ok(path) => {
                println!("✅ Created {} with default settings.", path.display());
                println!("   Edit it to set the data folder, report size and default filters.");
                return;
            }
            Err(e) => {
                eprintln!("⚠️  {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args, verbose: bool) {
    let level = if args.quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("podium={}", level.to_string().to_lowercase())));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn load_store(config: &Config) -> Result<DataStore> {
    DataStore::load(&config.data.dir)
        .with_context(|| format!("Failed to load data from {}", config.data.dir.display()))
}

fn run(args: Args) -> Result<()> {
    let config = Config::resolve(&args)?;
    init_logging(&args, config.general.verbose);

    info!("Podium v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Filters: {}", config.filters.summary());

    match args.command() {
        Command::Gui => {
            gui::run(config).map_err(|e| anyhow::anyhow!("Dashboard failed: {}", e))?;
        }
        Command::Summary { format } => {
            let store = load_store(&config)?;
            let summary = Summary::collect(&store, &config.filters, config.report.top_n)?;
            match format {
                OutputFormat::Text => print!("{}", summary.to_text()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }
        Command::Report {
            output,
            archive,
            open,
            width,
            height,
        } => {
            let store = load_store(&config)?;
            let mut settings = config.report.settings();
            settings.archive |= archive;
            if let Some(width) = width {
                settings.width = width;
            }
            if let Some(height) = height {
                settings.height = height;
            }
            let dir: PathBuf = output.unwrap_or_else(|| config.report.output_dir.clone());

            println!("📊 Rendering report into {}", dir.display());
            let result = report::write_report(&store, &config.filters, &settings, &dir)?;
            println!("✅ {} charts written", result.summary.charts.len());
            if !result.summary.skipped.is_empty() {
                println!("⚠️  Skipped: {}", result.summary.skipped.join(", "));
            }
            println!("   Index: {}", result.index.display());
            if let Some(archive) = &result.archive {
                println!("   Archive: {}", archive.display());
            }
            if open {
                report::open_index(&result.index)?;
            }
        }
        Command::HeadToHead { a, b } => {
            let store = load_store(&config)?;
            let cmp = head_to_head::compare(&store, &a.to_uppercase(), &b.to_uppercase())?;
            print!("{}", commands::head_to_head_text(&cmp));
        }
        Command::Daily { date, medal_events } => {
            let store = load_store(&config)?;
            let day = daily::parse_day(&date)?;
            let highlights = daily::highlights(&store, day, medal_events)?;
            print!("{}", commands::daily_text(&highlights));
        }
        Command::Athlete { name } => {
            let store = load_store(&config)?;
            let profile = athletes::profile(&store, &name)?;
            print!("{}", commands::athlete_text(&profile));
        }
        Command::Tables => {
            let store = load_store(&config)?;
            print!("{}", commands::tables_text(&store.summary()));
        }
        // handled before logging starts
        Command::InitConfig => {}
    }
    Ok(())
}
