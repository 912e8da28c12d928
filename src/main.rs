//! eventmap - Discover local events from your terminal or browser.
//!
//! Filters a catalog of events by state/city, category, date range and
//! search text, and serves an interactive list + map UI over the same
//! filtering pipeline.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use tracing::error;

use eventmap::catalog::Catalog;
use eventmap::cli::{self, Cli, Command};
use eventmap::geo::Coordinates;
use eventmap::session::Session;
use eventmap::{output, server};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let catalog = Catalog::load_or_bundled(cli.catalog.as_deref())
        .context("failed to load event catalog")?;

    match cli.command {
        Command::List(args) => cmd_list(&catalog, &args),
        Command::Stats(args) => cmd_stats(&catalog, &args),
        Command::Nearby(args) => cmd_nearby(&catalog, &args),
        Command::Locations => cmd_locations(),
        Command::Ui(args) => cmd_ui(catalog, &args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Execute the `list` command - filtered, sorted events.
fn cmd_list(catalog: &Catalog, args: &cli::ListArgs) -> Result<()> {
    let session =
        Session::from_criteria(args.filter.criteria()).context("invalid location filter")?;

    let now = local_now();
    let mut events = session.view(catalog, now).events;
    let total = events.len();

    // Limit results
    events.truncate(args.limit);
    if events.len() < total {
        tracing::info!("showing {} of {} matching events", events.len(), total);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format, now)?;

    Ok(())
}

/// Execute the `stats` command - overview counts for the filtered view.
fn cmd_stats(catalog: &Catalog, args: &cli::StatsArgs) -> Result<()> {
    let session =
        Session::from_criteria(args.filter.criteria()).context("invalid location filter")?;
    let view = session.view(catalog, local_now());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_stats(&mut handle, &view.stats, args.format)?;

    Ok(())
}

/// Execute the `nearby` command - proximity lookup around a coordinate.
fn cmd_nearby(catalog: &Catalog, args: &cli::NearbyArgs) -> Result<()> {
    if !args.lat.is_finite() || !args.lng.is_finite() {
        anyhow::bail!("latitude and longitude must be valid numbers");
    }

    let events = catalog.nearby(Coordinates::new(args.lat, args.lng));
    tracing::debug!("found {} nearby events", events.len());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format, local_now())?;

    Ok(())
}

/// Execute the `locations` command - list states, cities and categories.
fn cmd_locations() -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_locations(&mut handle)?;
    Ok(())
}

/// Execute the `ui` command - start web server.
fn cmd_ui(catalog: Catalog, args: &cli::UiArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m📍 eventmap Web UI\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Events:  {}", catalog.len());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config, catalog))
}
