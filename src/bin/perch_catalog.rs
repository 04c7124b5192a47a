//! Catalog pipeline entry point.
//!
//! Usage:
//!   perch-catalog validate            # rules, duplicate ids, index consistency
//!   perch-catalog index               # regenerate catalog/index.yaml
//!   perch-catalog logos               # download missing logos
//!   perch-catalog copy                # copy catalog/ into dist/catalog/
//!
//! The project root comes from `--root`, `PERCH_ROOT`, or the nearest
//! ancestor containing `catalog/categories.yaml`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perch_catalog::logos::{DEFAULT_MIN_IMAGE_BYTES, HttpFetcher, LogoOptions, sync_logos};
use perch_catalog::{CatalogLayout, generate_index, resolve_layout, site, validate_catalog};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "PERCH_LOG";

#[derive(Parser, Debug)]
#[command(name = "perch-catalog", version)]
#[command(about = "Validate, index, and publish the perch gallery catalog")]
struct Cli {
    /// Project root; defaults to PERCH_ROOT or an upward search.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Catalog directory; defaults to <root>/catalog.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Emit debug logs on stderr (overridden by PERCH_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every descriptor and the index; exits 1 on any error.
    Validate,
    /// Regenerate index.yaml from the descriptors.
    Index,
    /// Download logos for apps and fonts that do not have one yet.
    Logos {
        /// Images smaller than this many bytes are treated as placeholders.
        #[arg(long, env = "PERCH_LOGO_MIN_BYTES", default_value_t = DEFAULT_MIN_IMAGE_BYTES)]
        min_bytes: usize,
        /// Pause after each successful download, in milliseconds.
        #[arg(long, env = "PERCH_LOGO_DELAY_MS", default_value_t = 50)]
        delay_ms: u64,
    },
    /// Copy the catalog into the site output directory.
    Copy {
        /// Destination; defaults to <root>/dist/catalog.
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let layout = resolve_layout(cli.root.as_deref(), cli.catalog.as_deref())?;

    match cli.command {
        Command::Validate => run_validate(&layout),
        Command::Index => {
            let index = generate_index(&layout.catalog_dir, &layout.index_file())?;
            println!("{}", index.summary_line());
            Ok(0)
        }
        Command::Logos {
            min_bytes,
            delay_ms,
        } => {
            let options = LogoOptions {
                min_image_bytes: min_bytes,
                delay: Duration::from_millis(delay_ms),
            };
            let fetcher = HttpFetcher::new()?;
            let mut stdout = io::stdout().lock();
            sync_logos(
                &layout.catalog_dir,
                &layout.logos_dir(),
                &fetcher,
                &options,
                &mut stdout,
            )?;
            Ok(0)
        }
        Command::Copy { dest } => {
            let dest = dest.unwrap_or_else(|| layout.dist_catalog_dir());
            site::copy_catalog(&layout.catalog_dir, &dest)?;
            println!(
                "Copied {} to {}",
                layout.catalog_dir.display(),
                dest.display()
            );
            Ok(0)
        }
    }
}

fn run_validate(layout: &CatalogLayout) -> Result<i32> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Validating catalog...\n")?;
    stdout.flush()?;

    let outcome = validate_catalog(layout)?;

    let mut stderr = io::stderr().lock();
    outcome
        .report
        .write_diagnostics(&mut stderr)
        .context("writing diagnostics")?;
    stderr.flush()?;

    writeln!(stdout, "\n{}", outcome.summary_line())?;
    outcome.report.write_summary(&mut stdout)?;
    Ok(outcome.report.exit_code())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
