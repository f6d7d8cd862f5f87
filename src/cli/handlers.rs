use std::time::Duration;

use tracing::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::DirStore;
use crate::io::config_io::AppConfig;
use crate::ops::Action;
use crate::sync::{FileCache, SyncEngine};

type Engine = SyncEngine<DirStore, FileCache>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    match cli.command {
        Commands::List => cmd_list(config, json),
        Commands::Show(args) => cmd_show(config, args, json),
        Commands::Dispatch(args) => cmd_dispatch(config, args, json),
        Commands::Watch => cmd_watch(config),
        Commands::Profiles(args) => cmd_profiles(config, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the store and cache, subscribe, and wait for the first snapshot.
fn open_engine(config: &AppConfig) -> Result<Engine, Box<dyn std::error::Error>> {
    let store = DirStore::open(&config.store.path)?;
    let cache = FileCache::open(&config.cache.path)?;
    let mut engine = SyncEngine::new(store, cache, config.sync.options());
    engine.start()?;

    let timeout = Duration::from_millis(config.sync.snapshot_timeout_ms);
    if !engine.wait_for_snapshot(timeout) {
        return Err(format!(
            "no data from {} within {}ms",
            config.store.path.display(),
            config.sync.snapshot_timeout_ms
        )
        .into());
    }
    Ok(engine)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(config: &AppConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&trip_list_json(engine.state()))?
        );
    } else {
        print_lines(&format_trip_list(engine.state()));
    }
    Ok(())
}

fn cmd_show(config: &AppConfig, args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config)?;
    let trip = engine
        .state()
        .trips
        .get(&args.id)
        .ok_or_else(|| format!("trip not found: {}", args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&**trip)?);
    } else {
        print_lines(&format_trip_detail(trip, engine.profiles()));
    }
    Ok(())
}

fn cmd_watch(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config)?;
    print_lines(&format_trip_list(engine.state()));
    info!(path = %config.store.path.display(), "watching for changes");
    loop {
        if engine.wait_for_snapshot(Duration::from_secs(60)) {
            println!();
            print_lines(&format_trip_list(engine.state()));
        }
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_dispatch(
    config: &AppConfig,
    args: DispatchArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let action: Action =
        serde_json::from_str(&args.action).map_err(|e| format!("invalid action: {}", e))?;
    if matches!(action, Action::SetTripsFromRemote(_)) {
        return Err("SET_TRIPS_FROM_REMOTE is applied by the sync engine only".into());
    }

    let mut engine = open_engine(config)?;
    if let Some(id) = args.trip {
        if !engine.state().trips.contains_key(&id) {
            return Err(format!("trip not found: {}", id).into());
        }
        engine.dispatch(Action::SetActiveTrip(id));
    }

    let kind = action.kind();
    engine.dispatch(action);
    info!(action = kind, "dispatched");

    match engine.state().active_trip() {
        Some(trip) if json => println!("{}", serde_json::to_string_pretty(&**trip)?),
        Some(trip) => println!("{}", format_trip_line(trip, true)),
        None if json => println!("null"),
        None => println!("No active trip"),
    }
    Ok(())
}

fn cmd_profiles(
    config: &AppConfig,
    args: ProfilesCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config)?;
    match args.action {
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.profiles())?);
            } else if engine.profiles().is_empty() {
                println!("No profiles");
            } else {
                for profile in engine.profiles() {
                    println!("{}", format_profile_line(profile));
                }
            }
        }
        Some(ProfilesAction::Add { name }) => {
            let id = engine.add_profile(&name, None)?;
            println!("{}", id);
        }
        Some(ProfilesAction::Rm { id }) => {
            engine.delete_profile(&id)?;
            let still_listed = engine
                .state()
                .trips
                .values()
                .filter(|t| t.traveler_ids.contains(&id))
                .count();
            if still_listed > 0 {
                println!("removed {} (still listed on {} trip(s))", id, still_listed);
            } else {
                println!("removed {}", id);
            }
        }
    }
    Ok(())
}
