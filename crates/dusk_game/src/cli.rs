use clap::Parser;
use std::path::PathBuf;

/// Headless runner for the Duskfall simulation
#[derive(Parser, Debug)]
#[command(name = "dusk_game")]
#[command(about = "Run a Duskfall world headlessly from a replay or idle input")]
#[command(version)]
pub struct Args {
    /// World JSON file; the built-in level is used when omitted
    #[arg(long, value_name = "WORLD_FILE")]
    pub world: Option<PathBuf>,

    /// Replay JSON file with held keys per frame
    #[arg(long, value_name = "REPLAY_FILE")]
    pub replay: Option<PathBuf>,

    /// Lua controller script
    #[arg(long, value_name = "SCRIPT", default_value = "assets/scripts/controller.lua")]
    pub script: PathBuf,

    /// Drive the player with the built-in keymap only
    #[arg(long)]
    pub no_script: bool,

    /// Directory sprite paths are resolved against
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Number of frames to run; defaults to the replay length, or 600 without one
    #[arg(long)]
    pub frames: Option<usize>,

    /// Wall-clock seconds per frame; overrides the replay's frame_dt
    #[arg(long)]
    pub frame_dt: Option<f64>,

    /// Write the final world snapshot as JSON to this path
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub snapshot_out: Option<PathBuf>,

    /// Print every world event as a JSON line at info level
    #[arg(long)]
    pub log_events: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
