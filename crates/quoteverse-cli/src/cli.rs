use clap::{Parser, Subcommand};
use quoteverse_core::config::CliConfigOverrides;
use quoteverse_core::models::SearchMode;
use std::path::PathBuf;

/// Quoteverse - Explore quotes on a semantic map
#[derive(Parser, Debug)]
#[command(name = "quoteverse")]
#[command(about = "Explore quotes laid out on a 2-D semantic map", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML config file (defaults to ./quoteverse.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Quote service endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Serve quotes from a local JSON corpus instead of the quote service
    #[arg(long, global = true, value_name = "FILE")]
    pub offline: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show effective configuration and where each value came from
    Config,

    /// Fetch the initial quote set and plot it into a virtual viewport
    Load(LoadArgs),

    /// Run a single search
    Search(SearchArgs),

    /// Interactive exploration session
    Explore(ExploreArgs),
}

/// Virtual container size shared by commands that plot points
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct ViewportArgs {
    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "800")]
    pub height: f64,
}

#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Number of quotes to fetch
    #[arg(long)]
    pub count: Option<usize>,

    /// Fetch a fixed prefix instead of a random sample
    #[arg(long)]
    pub no_randomize: bool,

    /// Number of plotted points to list
    #[arg(long, default_value = "10")]
    pub limit: usize,

    #[command(flatten)]
    pub viewport: ViewportArgs,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// What to match the query against
    #[arg(long, short = 'm', default_value = "quote")]
    pub mode: SearchMode,

    /// Number of neighbors to request
    #[arg(long, short = 'k')]
    pub k: Option<usize>,

    /// Similarity distance cutoff (quote mode only)
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Load the initial map first so new points can be counted
    #[arg(long)]
    pub with_map: bool,

    #[command(flatten)]
    pub viewport: ViewportArgs,
}

#[derive(Parser, Debug)]
pub struct ExploreArgs {
    /// Starting search mode
    #[arg(long, short = 'm', default_value = "quote")]
    pub mode: SearchMode,

    /// Number of results to print after each query
    #[arg(long, default_value = "10")]
    pub limit: usize,

    #[command(flatten)]
    pub viewport: ViewportArgs,
}

impl Cli {
    /// Global and per-command flags that override file and env config
    pub fn config_overrides(&self) -> CliConfigOverrides {
        let mut overrides = CliConfigOverrides {
            base_url: self.base_url.clone(),
            ..CliConfigOverrides::default()
        };

        match &self.command {
            Commands::Load(args) => {
                overrides.fetch_count = args.count;
                if args.no_randomize {
                    overrides.randomize = Some(false);
                }
            }
            Commands::Search(args) => {
                overrides.neighbor_count = args.k;
                overrides.max_distance = args.max_distance;
            }
            Commands::Explore(_) => {
                // Lines are submitted whole; periodic re-sends add nothing
                overrides.auto_send = Some(false);
            }
            Commands::Config => {}
        }

        overrides
    }
}
