use crate::controller::{DEFAULT_SLOT_KEY, DEFAULT_ZOOM};
use crate::sort::SortKey;
use crate::types::{Coords, RawInputs};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "mapty.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map coordinates"
)]
pub struct Cli {
    /// SQLite file holding the persisted workout slot.
    #[arg(long, env = "MAPTY_DB", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Name of the slot the collection is stored under.
    #[arg(long, default_value = DEFAULT_SLOT_KEY, global = true)]
    pub slot: String,

    /// Map zoom level used when centering on a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

    /// Answer yes to delete/reset confirmations.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a point on the map.
    Add {
        #[command(subcommand)]
        workout: AddCmd,
    },
    /// Show every workout in stored order.
    List,
    /// Change distance, duration and cadence/elevation of a workout.
    /// Omitted fields keep their current value.
    Edit {
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        distance: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        duration: Option<String>,
        /// Cadence (running) or elevation gain (cycling).
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,
    },
    /// Delete one workout.
    Delete { id: String },
    /// Delete all workout history.
    Reset,
    /// Reorder the stored list: recent-first, recent-last, distance, duration.
    Sort {
        #[arg(value_name = "ORDER")]
        key: SortKey,
    },
    /// Center the map on a workout.
    Show { id: String },
    /// Import the `workouts` localStorage value exported from the browser app.
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum AddCmd {
    Running {
        #[command(flatten)]
        at: Location,
        #[command(flatten)]
        common: Common,
        /// Steps per minute.
        #[arg(long, allow_hyphen_values = true)]
        cadence: String,
    },
    Cycling {
        #[command(flatten)]
        at: Location,
        #[command(flatten)]
        common: Common,
        /// Elevation gain in meters (may be negative).
        #[arg(long, allow_hyphen_values = true)]
        elevation: String,
    },
}

#[derive(Args, Debug)]
pub struct Location {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
}

impl Location {
    pub const fn coords(&self) -> Coords {
        Coords::new(self.lat, self.lng)
    }
}

#[derive(Args, Debug)]
pub struct Common {
    /// Kilometers.
    #[arg(long, allow_hyphen_values = true)]
    pub distance: String,
    /// Minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,
}

impl Common {
    pub fn with_variable(&self, variable: &str) -> RawInputs {
        RawInputs::new(self.distance.as_str(), self.duration.as_str(), variable)
    }
}
