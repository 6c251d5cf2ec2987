use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::Context;
use commands::{browse, clear, config, history, next, watchlist, Session};
use media_catalog_config::{Config, PathManager};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "tuneline")]
#[command(about = "Tuneline - one catalog across all your TV, radio and media sources")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the merged listing of every provider
    Listing,
    /// Search every provider
    #[command(long_about = "Search all providers concurrently. A query of one to three digits lists live channels whose number starts with it first.")]
    Search {
        query: String,
    },
    /// List the children of a container (brand, season, folder)
    Children {
        id: String,
    },
    /// Show one item with its history and watchlist state
    Item {
        id: String,
    },
    /// Manage watch history
    History {
        #[command(subcommand)]
        cmd: HistoryCommands,
    },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Show what continuous playback plays after an episode ends
    #[command(long_about = "Play EPISODE from CONTAINER, let it end, and print the item continuous playback moves to: the next episode, the first episode of the next season (for 'show|N' containers), or 'exit'.")]
    Next {
        /// Container the episode is played from, e.g. 'show|1'
        #[arg(long)]
        container: String,

        /// Episode that just finished
        #[arg(long)]
        episode: String,
    },
    /// Clear cached data and user state
    Clear {
        /// Clear the item cache, history and watchlist
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the persisted item cache
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Clear watch history
        #[arg(long, action = ArgAction::SetTrue)]
        history: bool,

        /// Clear the watchlist
        #[arg(long, action = ArgAction::SetTrue)]
        watchlist: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recorded progress, most recent first
    List,
    /// Items with recorded progress, resolved through the providers
    Continue,
    /// Record playback progress for an item
    Record {
        id: String,

        /// Position in seconds
        #[arg(long)]
        position: f64,

        /// Duration in seconds
        #[arg(long)]
        duration: f64,
    },
    /// Forget all progress
    Clear,
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// List watchlist items
    List,
    /// Add an item by id
    Add { id: String },
    /// Remove an item by id
    Remove { id: String },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Check the configuration for errors
    Validate,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_file = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = Config::load_or_default(&config_file)
        .wrap_err_with(|| format!("Failed to load config from {}", config_file.display()))?;

    let log_file = logging::log_file_path(&config.logging, &paths);
    logging::init_logging(cli.verbose, cli.quiet, &config.logging, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let command = match cli.command {
        Commands::Config { cmd } => {
            return config::run_config(cmd.unwrap_or(ConfigCommands::Show), &config_file, &paths, &output);
        }
        command => command,
    };

    let session = Session::open(&config, &paths)?;
    let catalog = &session.catalog;

    let result = match command {
        Commands::Listing => browse::run_listing(catalog, &output).await,
        Commands::Search { query } => browse::run_search(catalog, &query, &output).await,
        Commands::Children { id } => browse::run_children(catalog, &id, &output).await,
        Commands::Item { id } => browse::run_item(catalog, &id, &output).await,
        Commands::History { cmd } => history::run_history(cmd, catalog, &output).await,
        Commands::Watchlist { cmd } => watchlist::run_watchlist(cmd, catalog, &output).await,
        Commands::Next { container, episode } => next::run_next(catalog.clone(), &container, &episode, &output).await,
        Commands::Clear { all, cache, history, watchlist } => {
            clear::run_clear(all, cache, history, watchlist, catalog, &output).await
        }
        Commands::Config { .. } => Ok(()),
    };

    session.close().await;
    result
}
