use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use waypoint_core::{DistanceUnit, SortColumn};

#[derive(Debug, Parser)]
#[command(
    name = "waypoint",
    about = "Terminal client for a route-tracking web service",
    version
)]
pub struct Cli {
    /// Base URL of the route-tracking server.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Mirror the log to the terminal in addition to ./waypoint.log.
    #[arg(long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a file of destination addresses and stream batch progress.
    Upload {
        /// File with one destination address per line.
        file: PathBuf,

        /// Starting point shared by every route in the batch.
        #[arg(long)]
        start: String,
    },
    /// Inspect or edit the stored routes.
    Routes {
        #[command(subcommand)]
        action: RouteCommand,
    },
    /// Show aggregate route statistics.
    Stats,
    /// Fetch the server-rendered map fragment and save it locally.
    Map {
        /// Where to write the HTML fragment.
        #[arg(long, default_value = "map.html")]
        output: PathBuf,
    },
    /// Download a CSV export of all routes.
    Export {
        /// Directory the export is written to.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Ask the server to back up its database.
    Backup,
    /// Delete every stored route.
    Clear {
        /// Skip the confirmation requirement.
        #[arg(long)]
        yes: bool,
    },
    /// Set the preferred distance unit.
    Unit {
        #[arg(value_enum)]
        unit: UnitArg,
    },
    /// Sort the route table by a column; repeating flips the direction.
    Sort {
        #[arg(value_enum)]
        column: SortArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum RouteCommand {
    /// Print the route table.
    List,
    /// Add a route between two addresses.
    Add {
        start: String,
        end: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Re-route an existing entry.
    Edit {
        id: u64,
        start: String,
        end: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Delete a route.
    Rm {
        id: u64,
        /// Skip the confirmation requirement.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Miles,
    Km,
}

impl From<UnitArg> for DistanceUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Miles => DistanceUnit::Miles,
            UnitArg::Km => DistanceUnit::Kilometres,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Start,
    End,
    Distance,
    Date,
}

impl From<SortArg> for SortColumn {
    fn from(column: SortArg) -> Self {
        match column {
            SortArg::Start => SortColumn::Start,
            SortArg::End => SortColumn::End,
            SortArg::Distance => SortColumn::Distance,
            SortArg::Date => SortColumn::Date,
        }
    }
}
