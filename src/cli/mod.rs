pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "emberfeed")]
#[command(about = "Trending-news aggregation and article extraction", long_about = None)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported sources and their ids
    Sources,
    /// Fetch trending lists for the given source ids (all sources if omitted)
    Hot {
        /// Source ids, in the order results should appear
        ids: Vec<u32>,

        /// Overall deadline in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Extract one article as a sanitized rich-text fragment
    Article {
        /// Article page URL
        url: String,
    },
    /// Fetch one article page rewritten for an embedded webview
    Page {
        /// Article page URL
        url: String,
    },
    /// Keep refreshing every source, printing one JSON line per round
    Watch {
        /// Seconds between refresh rounds
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
}
