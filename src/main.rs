#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::cli::{self, AddCmd, Cmd};
use mapty::controller::{
    Config, Confirm, DeleteOutcome, EditOutcome, ResetOutcome, SystemClock, WorkoutController,
};
use mapty::render::{AutoConfirm, StdinConfirm, TerminalView};
use mapty::store::{SqliteSlotStore, WorkoutStore};
use mapty::types::{RawInputs, WorkoutId, WorkoutKind};
use mapty::utils;
use std::fs;
use std::io::Stdout;

#[macro_use]
extern crate mapty;

type App = WorkoutController<TerminalView<Stdout>, TerminalView<Stdout>, SystemClock>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = Config {
        slot_key: cli.slot.clone(),
        zoom: cli.zoom,
    };
    dlog!("db={} slot={} zoom={}", cli.db.display(), config.slot_key, config.zoom);

    let store = match SqliteSlotStore::open(&cli.db) {
        Ok(slot) => WorkoutStore::new(Box::new(slot), &config.slot_key),
        Err(e) => WorkoutStore::unavailable(&config.slot_key, &e),
    };

    let mut app: App = WorkoutController::new(
        &config,
        store,
        TerminalView::stdout(),
        TerminalView::stdout(),
        SystemClock,
    );
    app.start()
        .with_context(|| format!("loading workouts from {}", cli.db.display()))?;

    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(StdinConfirm::stdin())
    };

    match cli.cmd {
        Cmd::Add { workout } => {
            let (kind, at, raw) = match &workout {
                AddCmd::Running {
                    at,
                    common,
                    cadence,
                } => (WorkoutKind::Running, at, common.with_variable(cadence)),
                AddCmd::Cycling {
                    at,
                    common,
                    elevation,
                } => (WorkoutKind::Cycling, at, common.with_variable(elevation)),
            };
            app.on_map_click(at.coords());
            app.submit_form(kind, &raw)?;
        }
        Cmd::List => app.render_all(),
        Cmd::Edit {
            id,
            distance,
            duration,
            value,
        } => {
            let id = WorkoutId::from(id);
            let current = app.open_edit(&id)?;
            let raw = RawInputs {
                distance: distance.unwrap_or(current.distance),
                duration: duration.unwrap_or(current.duration),
                variable: value.unwrap_or(current.variable),
            };
            if app.submit_edit(&raw)? == EditOutcome::Updated {
                println!("Updated workout {id}");
            }
        }
        Cmd::Delete { id } => {
            if app.delete_workout(&WorkoutId::from(id), confirm.as_mut())?
                == DeleteOutcome::Cancelled
            {
                println!("Nothing deleted.");
            }
        }
        Cmd::Reset => {
            if app.has_workouts() {
                if app.reset_all(confirm.as_mut())? == ResetOutcome::Cancelled {
                    println!("Nothing deleted.");
                }
            } else {
                println!("No workouts to delete.");
            }
        }
        Cmd::Sort { key } => {
            if app.has_workouts() {
                app.sort(key)?;
            } else {
                println!("No workouts to sort.");
            }
        }
        Cmd::Show { id } => {
            app.focus(&WorkoutId::from(id))?;
        }
        Cmd::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let added = app
                .import_legacy(&json)
                .with_context(|| format!("importing {}", file.display()))?;
            println!("Imported {added} workout(s).");
        }
    }

    if app.is_degraded() {
        tracing::warn!(db = %cli.db.display(), "changes were not saved to disk");
    }

    Ok(())
}
