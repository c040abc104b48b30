pub mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::scheduler::parse_interval;

#[derive(Parser, Debug)]
#[command(name = "sitefeed")]
#[command(about = "Turn HTML pages into RSS feeds", long_about = None)]
pub struct Cli {
    /// Path to the sites file (default: ~/.config/sitefeed/sites.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache TTL and refresh interval (e.g. "30s", "10m", "1h"); overrides the config file
    #[arg(long, global = true, value_parser = parse_interval)]
    pub ttl: Option<Duration>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured sites
    Sites,
    /// Fetch one site through the cache and print its RSS feed
    Get {
        /// Site identifier from the config file
        site: String,
    },
    /// Keep every site's feed refreshed until interrupted
    Run,
}
