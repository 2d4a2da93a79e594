use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::feed::FEED_HOST;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect new reviews for an app and merge them into its local store
    Collect {
        /// App Store link containing id<digits>
        #[arg(value_name = "APP_URL")]
        app_url: String,
        /// Storefront country codes, e.g. "ru,us,de"
        #[arg(long, value_name = "CODES", value_delimiter = ',', required = true)]
        countries: Vec<String>,
        /// Cap on reviews collected per country
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Directory holding the CSV store
        #[arg(long, value_name = "PATH", default_value = ".")]
        dir: PathBuf,
        #[arg(long, value_name = "URL", hide = true, default_value = FEED_HOST)]
        feed_host: String,
    },
    /// Print the newest rows of an app's existing store, no network
    Show {
        /// App Store link containing id<digits>
        #[arg(value_name = "APP_URL")]
        app_url: String,
        /// How many of the newest rows to print
        #[arg(long, value_name = "N", default_value_t = 20)]
        tail: usize,
        /// Directory holding the CSV store
        #[arg(long, value_name = "PATH", default_value = ".")]
        dir: PathBuf,
    },
}

/// Country codes are free-form user input; trim, lower-case, and drop
/// empties (a trailing comma should not become a storefront).
pub fn normalize_countries(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}
