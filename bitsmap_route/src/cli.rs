// Command-line interface definition for the `route` binary.
//
// Every subcommand compiles the venue description given as the first
// positional argument (optionally with a JSON `NavConfig`), then runs one
// query against it. See `main.rs` for the handlers.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "route")]
#[command(author, version, about)]
#[command(long_about = "Directions inside a building described by a route description file.\n\n\
    Examples:\n  \
    route venue.txt directions --from \"Entrance\" --to \"201\"\n  \
    route venue.txt directions --from \"Entrance\" --to \"201\" --wheelchair\n  \
    route venue.txt search washroom\n  \
    route venue.txt summary")]
pub struct Cli {
    /// Route description file to compile
    pub venue: PathBuf,

    /// JSON navigation config (origin, turn threshold, landmark ranking)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print turn-by-turn directions between two points of interest
    Directions {
        /// Start POI: exact name, or the first search match
        #[arg(long)]
        from: String,

        /// Destination POI: exact name, or the first search match
        #[arg(long)]
        to: String,

        /// Only use step-free floor changes
        #[arg(long)]
        wheelchair: bool,

        /// Print the route and instructions as JSON
        #[arg(long)]
        json: bool,
    },

    /// List points of interest whose "<name>, Floor: <n>" label matches
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Print node, edge, POI and floor counts
    Summary,
}
