mod cli;
mod logging;
mod persistence;
mod render;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

use cli::{Cli, Command, RouteCommand};
use logging::LogDestination;
use runner::Dispatcher;
use waypoint_core::{
    AppViewModel, DistanceUnit, Msg, Preferences, SessionState, SortColumn, SortDirection,
};
use waypoint_engine::{AtomicFileWriter, ClientSettings, EngineHandle};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    let prefs_dir = PathBuf::from(".");
    let prefs = persistence::load_preferences(&prefs_dir);

    let mut settings = ClientSettings {
        base_url: cli.server.clone(),
        ..ClientSettings::default()
    };
    if let Command::Export { dir } = &cli.command {
        settings.export_dir = dir.clone();
    }

    let seeds = seed_messages(&cli.command, prefs)?;
    let engine = EngineHandle::new(settings);
    let dispatcher = Dispatcher::new(engine, prefs_dir);

    let state = match &cli.command {
        Command::Upload { .. } => {
            let mut printed_log = 0usize;
            let mut render = move |view: &AppViewModel| {
                // Per-address results arrive most-recent-first; print the
                // newly arrived tail oldest-first so the terminal reads
                // chronologically.
                let log = &view.upload.log;
                if log.len() > printed_log {
                    for row in log[..log.len() - printed_log].iter().rev() {
                        println!("{}", render::log_line(row));
                    }
                    printed_log = log.len();
                }
                if view.upload.state == SessionState::Running {
                    println!("{}", render::progress_line(view));
                }
            };
            dispatcher.run_until_settled(seeds, &mut render)
        }
        _ => dispatcher.run_until_settled(seeds, &mut |_| {}),
    };

    let view = state.view();
    match &cli.command {
        Command::Routes { .. } => print!("{}", render::routes_table(&view)),
        Command::Stats => print!("{}", render::stats_panel(&view)),
        Command::Map { output } => {
            if let Some(html) = &view.map_html {
                let path = write_map(output, html)?;
                println!("Map written to {}", path.display());
            }
        }
        Command::Unit { .. } => println!("Distance unit set to {}", unit_label(view.unit)),
        Command::Sort { .. } => println!(
            "Sorting by {} ({})",
            column_label(view.sort.column),
            direction_label(view.sort.direction)
        ),
        _ => {}
    }

    if render::print_notices(&view) {
        std::process::exit(1);
    }
    Ok(())
}

/// Boundary validation happens here; the core never sees an invalid
/// submission.
fn seed_messages(command: &Command, prefs: Preferences) -> Result<Vec<Msg>> {
    let mut seeds = vec![Msg::RestorePreferences(prefs)];
    match command {
        Command::Upload { file, start } => {
            if !file.is_file() {
                bail!("address file {:?} not found", file);
            }
            let start = start.trim();
            if start.is_empty() {
                bail!("start address is required");
            }
            seeds.push(Msg::UploadSubmitted {
                file: file.clone(),
                start_address: start.to_string(),
            });
        }
        Command::Routes { action } => match action {
            RouteCommand::List => seeds.push(Msg::RoutesRequested),
            RouteCommand::Add { start, end, notes } => {
                if start.trim().is_empty() || end.trim().is_empty() {
                    bail!("start and end addresses are required");
                }
                seeds.push(Msg::RouteFormSubmitted {
                    start_address: start.clone(),
                    end_address: end.clone(),
                    notes: notes.clone(),
                });
            }
            RouteCommand::Edit {
                id,
                start,
                end,
                notes,
            } => {
                if start.trim().is_empty() || end.trim().is_empty() {
                    bail!("start and end addresses are required");
                }
                seeds.push(Msg::RouteEditSubmitted {
                    id: *id,
                    start_address: start.clone(),
                    end_address: end.clone(),
                    notes: notes.clone(),
                });
            }
            RouteCommand::Rm { id, yes } => {
                if !yes {
                    bail!("pass --yes to confirm deleting route {id}");
                }
                seeds.push(Msg::RouteDeleteRequested { id: *id });
            }
        },
        Command::Stats => seeds.push(Msg::StatisticsRequested),
        Command::Map { .. } => seeds.push(Msg::MapRequested),
        Command::Export { .. } => seeds.push(Msg::ExportRequested),
        Command::Backup => seeds.push(Msg::BackupRequested),
        Command::Clear { yes } => {
            if !yes {
                bail!("pass --yes to confirm clearing all routes");
            }
            seeds.push(Msg::ClearRequested);
        }
        Command::Unit { unit } => seeds.push(Msg::UnitSelected((*unit).into())),
        Command::Sort { column } => seeds.push(Msg::SortColumnClicked((*column).into())),
    }
    Ok(seeds)
}

fn write_map(output: &Path, html: &str) -> Result<PathBuf> {
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let filename = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map.html".to_string());
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    Ok(writer.write(&filename, html.as_bytes())?)
}

fn unit_label(unit: DistanceUnit) -> &'static str {
    match unit {
        DistanceUnit::Miles => "miles",
        DistanceUnit::Kilometres => "kilometres",
    }
}

fn column_label(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Start => "start",
        SortColumn::End => "end",
        SortColumn::Distance => "distance",
        SortColumn::Date => "date",
    }
}

fn direction_label(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    }
}
