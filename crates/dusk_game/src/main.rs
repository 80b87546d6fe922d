//! Duskfall headless runner.
//!
//! Loads a world (file or built-in), checks its sprite assets, then drives the
//! simulation through the fixed-timestep frame loop in `runner`. Frames come
//! from a replay file or, without one, from idle input. The player is driven
//! **Lua-first, Rust-fallback**: each step asks the controller script for an
//! intent and falls back to the built-in keymap if the script is missing or
//! errors.

mod assets;
mod cli;
mod lua_bridge;
mod replay;
mod runner;

use std::path::Path;

use dusk_core::input::Key;
use dusk_core::time::DEFAULT_FIXED_DT;
use dusk_sim::{load_world_config_from_path, WorldConfig, WorldEvent};

use assets::VisualRegistry;
use lua_bridge::LuaBridge;
use replay::load_replay_from_path;
use runner::Session;

const IDLE_FRAMES: usize = 600;

fn load_world(path: Option<&Path>) -> Result<WorldConfig, String> {
    match path {
        Some(path) => {
            let config = load_world_config_from_path(path)?;
            log::info!("Loaded world: {}", path.display());
            Ok(config)
        }
        None => {
            log::info!("No world file given, using the built-in level");
            Ok(WorldConfig::builtin())
        }
    }
}

fn log_event(event: &WorldEvent, tick: u64, as_json: bool) {
    if !as_json {
        log::debug!("[tick {tick}] {event:?}");
        return;
    }
    match serde_json::to_string(event) {
        Ok(line) => log::info!("[tick {tick}] {line}"),
        Err(err) => log::warn!("Failed to serialize event {event:?}: {err}"),
    }
}

fn run(args: cli::Args) -> Result<(), String> {
    let mut config = load_world(args.world.as_deref())?;
    let visuals = VisualRegistry::load_world_visuals(&mut config, &args.assets);
    if let Some(visual) = visuals.get("player") {
        log::debug!("player visual: {visual:?}");
    }
    if visuals.placeholder_count() > 0 {
        log::info!(
            "{} of {} character(s) drawn as placeholders",
            visuals.placeholder_count(),
            visuals.len()
        );
    }

    let replay = args
        .replay
        .as_deref()
        .map(load_replay_from_path)
        .transpose()?;
    let mut frames: Vec<Vec<Key>> = replay
        .as_ref()
        .map(|r| r.expanded_frames())
        .unwrap_or_default();
    let frame_count = args.frames.unwrap_or(if replay.is_some() {
        frames.len()
    } else {
        IDLE_FRAMES
    });
    frames.resize(frame_count, Vec::new());
    let frame_dt = args
        .frame_dt
        .or(replay.as_ref().map(|r| r.frame_dt))
        .unwrap_or(DEFAULT_FIXED_DT);
    if !frame_dt.is_finite() || frame_dt <= 0.0 {
        return Err(format!("--frame-dt must be > 0, got {frame_dt}"));
    }

    let lua = (!args.no_script).then(|| LuaBridge::new(args.script.clone()));
    if let Some(lua) = &lua {
        log::info!("{}", lua.status());
    }
    let mut session = Session::new(config, lua);

    log::info!("Running {} frame(s) at {:.4}s", frames.len(), frame_dt);
    for keys in &frames {
        let events = session.run_frame(frame_dt, keys);
        let tick = session.world().tick_count();
        for event in &events {
            log_event(event, tick, args.log_events);
        }
    }

    let snapshot = session.world().snapshot();
    log::info!(
        "Finished after {} tick(s): round {:?}, player health {}/{}, {} li(ves) left",
        snapshot.tick,
        snapshot.round,
        snapshot.player.health.current,
        snapshot.player.health.max,
        snapshot.lives_remaining
    );
    log::debug!(
        "{} frame(s), {} fixed step(s), {:.3}s simulated",
        session.time().frame_count,
        session.time().fixed_step_count,
        session.time().total_time
    );
    if let Some(lua) = session.lua() {
        match lua.last_error() {
            Some(err) => log::warn!("{} ({err})", lua.status()),
            None => log::info!("{}", lua.status()),
        }
    }

    if let Some(path) = &args.snapshot_out {
        let json = snapshot.to_json_pretty()?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write snapshot {}: {e}", path.display()))?;
        log::info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Duskfall starting...");

    if let Err(err) = run(cli::parse_args()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
