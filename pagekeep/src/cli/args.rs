// pagekeep/src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Save web pages as self-contained offline HTML files
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the default configuration as TOML
    #[arg(long = "generate-config")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a page with stylesheets, inline scripts and images embedded
    Save {
        /// URL or local file of the page
        url: String,

        #[arg(long = "title", help = "title to record instead of the page title")]
        title: Option<String>,

        #[arg(long = "raw", help = "keep only style blocks, linked stylesheets and body markup")]
        raw: bool,
    },
    /// Open the raw markup of a page in a new tab
    Clone {
        /// URL or local file of the page
        url: String,
    },
    /// List saved pages
    List {
        #[arg(long = "json", help = "output as json")]
        is_json: bool,
    },
    /// Open the downloaded file of a saved page
    Open {
        /// position in the listing, starting at 1
        index: usize,
    },
    /// Delete all saved files and empty the catalog
    Clear {
        #[arg(short = 'y', long = "yes", help = "do not ask for confirmation")]
        yes: bool,
    },
    /// Answer JSON requests, one per line, on stdin/stdout
    Serve,
    /// Generate shell completion script
    Completion {
        /// Shell to generate completion for (bash, zsh, fish)
        shell: String,
    },
}
