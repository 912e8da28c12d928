//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::filters::{CategoryFilter, Criteria, DateBucket, SortKey};
use crate::output::Format;

/// Discover local events by city, category and date.
#[derive(Parser, Debug)]
#[command(name = "eventmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Event catalog JSON file (defaults to the bundled dataset)
    #[arg(long, global = true, env = "EVENTMAP_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List events matching the filters
    List(ListArgs),

    /// Show overview statistics for events matching the filters
    Stats(StatsArgs),

    /// Find events close to a coordinate
    Nearby(NearbyArgs),

    /// Show selectable states, cities and categories
    Locations,

    /// Start the web UI server
    Ui(UiArgs),
}

/// Filter flags shared by `list` and `stats`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// State code (e.g. CA)
    #[arg(long)]
    pub state: Option<String>,

    /// City code (e.g. SF); keeps events within 100 km, nearest first
    #[arg(long)]
    pub city: Option<String>,

    /// Category: all, music, tech, sports, food, arts
    #[arg(long, default_value = "all", value_parser = parse_category)]
    pub category: CategoryFilter,

    /// Search text; every word must match
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Date range: all, today, tomorrow, week, month
    #[arg(long, default_value = "all", value_parser = parse_date_bucket)]
    pub date: DateBucket,

    /// Sort order when no city is selected: date, name, price
    #[arg(long, default_value = "date", value_parser = parse_sort_key)]
    pub sort: SortKey,
}

impl FilterArgs {
    /// Convert the flags into filter criteria.
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        Criteria {
            state: self.state.clone(),
            city: self.city.clone(),
            category: self.category,
            search: self.search.clone(),
            date_bucket: self.date,
            sort_by: self.sort,
        }
    }
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `stats` command.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `nearby` command.
#[derive(Parser, Debug)]
pub struct NearbyArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `ui` command.
#[derive(Parser, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080", env = "EVENTMAP_PORT")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", env = "EVENTMAP_HOST")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a category selector from string.
fn parse_category(s: &str) -> Result<CategoryFilter, String> {
    s.parse()
}

/// Parse a date bucket from string.
fn parse_date_bucket(s: &str) -> Result<DateBucket, String> {
    s.parse()
}

/// Parse a sort key from string.
fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["eventmap", "list"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.limit, 50);
        assert_eq!(args.format, Format::Human);
        assert_eq!(args.filter.criteria(), Criteria::default());
    }

    #[test]
    fn test_list_filters() {
        let cli = Cli::try_parse_from([
            "eventmap", "list", "--city", "SF", "--category", "music", "--date", "month",
            "--sort", "price", "-s", "jazz festival", "-f", "json",
        ])
        .unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        let criteria = args.filter.criteria();
        assert_eq!(criteria.city.as_deref(), Some("SF"));
        assert_eq!(criteria.category, CategoryFilter::Only(Category::Music));
        assert_eq!(criteria.date_bucket, DateBucket::Month);
        assert_eq!(criteria.sort_by, SortKey::Price);
        assert_eq!(criteria.search, "jazz festival");
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn test_invalid_category_rejected() {
        assert!(Cli::try_parse_from(["eventmap", "stats", "--category", "opera"]).is_err());
        assert!(Cli::try_parse_from(["eventmap", "list", "--date", "someday"]).is_err());
    }

    #[test]
    fn test_nearby_negative_longitude() {
        let cli =
            Cli::try_parse_from(["eventmap", "nearby", "--lat", "37.7749", "--lng", "-122.4194"])
                .unwrap();
        let Command::Nearby(args) = cli.command else {
            panic!("expected nearby command");
        };
        assert!((args.lng - (-122.4194)).abs() < 1e-9);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["eventmap", "locations", "--verbose", "--catalog", "x.json"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.catalog, Some(PathBuf::from("x.json")));
    }
}
