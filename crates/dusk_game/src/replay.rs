use serde::Deserialize;
use std::fs;
use std::path::Path;

use dusk_core::input::Key;

/// Recorded key state, one entry per rendered frame.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    /// Wall-clock time between frames, fed into the accumulator.
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during this frame. Presses and releases are derived from
    /// the difference to the previous frame.
    #[serde(default)]
    pub keys: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_frames(&self) -> Vec<Vec<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.keys.clone());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !replay.frame_dt.is_finite() || replay.frame_dt <= 0.0 {
        return Err("Replay validation failed: frame_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_frame_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Session;
    use dusk_sim::config::WorldConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dusk_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frame_dt": 0.016666667,
              "frames": [
                { "keys": ["d"], "repeat": 3 },
                { "keys": ["d", "space"] },
                { }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_frames();
        assert_eq!(expanded.len(), 5);
        assert_eq!(expanded[3], vec![Key::D, Key::Space]);
        assert!(expanded[4].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_key_name_is_rejected() {
        let path = temp_file_path("unknown_key");
        fs::write(&path, r#"{ "frames": [ { "keys": ["escape"] } ] }"#)
            .expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("escape is not mapped");
        assert!(err.contains("Failed to parse replay JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_or_zero_dt_replay_is_rejected() {
        let path = temp_file_path("invalid");
        fs::write(&path, r#"{ "frame_dt": 0.0, "frames": [ {} ] }"#).expect("write");
        assert!(load_replay_from_path(&path).is_err());
        fs::write(&path, r#"{ "frames": [] }"#).expect("write");
        assert!(load_replay_from_path(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frame_dt": 0.016666667,
              "frames": [
                { "keys": ["d"], "repeat": 60 },
                { "keys": ["d", "space"] },
                { "keys": ["d"], "repeat": 90 },
                { "keys": ["d", "j"] },
                { "keys": ["a"], "repeat": 45 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let run = || {
            let mut session = Session::new(WorldConfig::builtin(), None);
            let mut events = Vec::new();
            for keys in replay.expanded_frames() {
                events.extend(session.run_frame(replay.frame_dt, &keys));
            }
            (session.world().snapshot(), events)
        };

        let (snapshot_a, events_a) = run();
        let (snapshot_b, events_b) = run();
        assert_eq!(snapshot_a, snapshot_b);
        assert_eq!(events_a, events_b);
        assert!(snapshot_a.tick > 0);

        let _ = fs::remove_file(path);
    }
}
