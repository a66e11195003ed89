use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/datasets/covid-19/main/data/countries-aggregated.csv";

/// A cached download younger than this is used without touching the network.
pub const DEFAULT_CACHE_MAX_AGE_HOURS: u64 = 12;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const HISTOGRAM_BINS: usize = 50;
pub const TOP_N: usize = 10;
pub const MOVING_AVERAGE_WINDOW: usize = 7;
pub const PREVIEW_ROWS: usize = 5;

pub const EXPORT_FILE_NAME: &str = "covid_filtered_data.csv";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Interactive explorer for the COVID-19 countries-aggregated time series.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// CSV to download.
    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub url: String,

    /// Read a local CSV instead of downloading.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Always download, never read or write the on-disk cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Maximum age of the on-disk cache before it is refreshed.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE_HOURS, value_name = "HOURS")]
    pub cache_max_age_hours: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runtime settings handed to the application.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub url: String,
    pub file: Option<PathBuf>,
    /// `None` disables the disk cache.
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age: Duration,
}

impl DashboardConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let cache_dir = if cli.no_cache {
            None
        } else {
            directories::ProjectDirs::from("org", "covid-explorer", "covid-explorer")
                .map(|dirs| dirs.cache_dir().to_path_buf())
        };

        Self {
            url: cli.url.clone(),
            file: cli.file.clone(),
            cache_dir,
            cache_max_age: Duration::from_secs(cli.cache_max_age_hours.saturating_mul(3600)),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATA_URL.to_string(),
            file: None,
            cache_dir: None,
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_HOURS * 3600),
        }
    }
}
