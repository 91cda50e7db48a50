use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use racer_core::input::{encode_input_byte, INPUT_ACCELERATE, INPUT_JUMP, INPUT_LEFT, INPUT_RIGHT};
use racer_core::{verify_ride, RideLog, Session, SessionEvent};
use serde::Serialize;

use crate::autopilot::{create_bot, AutopilotBot};

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub max_frames: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_hit_count: u32,
    pub final_rng_state: u32,
    pub game_over: bool,
    pub input_runs: u32,
    pub accelerate_frames: u32,
    pub jump_frames: u32,
    pub steer_frames: u32,
    pub jumps_scored: u32,
    pub collisions: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
    pub ride: RideLog,
}

/// Plays `bot_id` offline until game over or `max_frames`, then checks the
/// recorded ride log replays to the same milestones and result.
pub fn run_bot(bot_id: &str, seed: u32, max_frames: u32) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, max_frames)
}

pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    seed: u32,
    max_frames: u32,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    bot.reset(seed);
    let mut session = Session::new(seed);
    session
        .validate()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let mut inputs = Vec::with_capacity(max_frames as usize);
    let mut jumps_scored = 0u32;
    let mut collisions = 0u32;
    let mut snapshot = session.snapshot();

    while snapshot.frame_count < max_frames && !snapshot.is_game_over {
        let byte = encode_input_byte(bot.next_input(&snapshot));
        let events = session.step_checked(byte).map_err(|rule| {
            anyhow!(
                "bot '{}' broke {rule} at frame {}",
                bot.id(),
                snapshot.frame_count + 1
            )
        })?;
        for event in events {
            match event {
                SessionEvent::JumpScored { .. } => jumps_scored += 1,
                SessionEvent::Collision { .. } => collisions += 1,
                _ => {}
            }
        }
        inputs.push(byte);
        snapshot = session.snapshot();
    }

    let result = session.result();
    let ride = RideLog::record(seed, &inputs)
        .map_err(|err| anyhow!("recording ride log failed: {err}"))?;
    let summary = verify_ride(&ride, max_frames)
        .map_err(|err| anyhow!("recorded ride log failed verification: {err}"))?;

    let count = |mask: u8| inputs.iter().filter(|byte| *byte & mask != 0).count() as u32;

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            max_frames,
            frame_count: result.frame_count,
            final_score: result.final_score,
            final_hit_count: result.final_hit_count,
            final_rng_state: result.final_rng_state,
            game_over: result.game_over,
            input_runs: summary.input_runs,
            accelerate_frames: count(INPUT_ACCELERATE),
            jump_frames: count(INPUT_JUMP),
            steer_frames: count(INPUT_LEFT | INPUT_RIGHT),
            jumps_scored,
            collisions,
        },
        inputs,
        ride,
    })
}

pub fn write_ride(path: &Path, ride: &RideLog) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let json = ride.to_json()?;
    fs::write(path, json).with_context(|| format!("failed writing {}", path.display()))
}

pub fn read_ride(path: &Path) -> Result<RideLog> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    RideLog::from_json(&text).with_context(|| format!("failed parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frame_budget_is_rejected() {
        assert!(run_bot("cruiser", 1, 0).is_err());
    }

    #[test]
    fn unknown_bot_is_rejected() {
        let err = run_bot("nobody", 1, 10).unwrap_err().to_string();
        assert!(err.contains("unknown bot"), "{err}");
    }

    #[test]
    fn cruiser_run_respects_the_frame_budget() {
        let artifact = run_bot("cruiser", 0xC0FFEE, 600).unwrap();
        assert_eq!(artifact.metrics.frame_count, 600);
        assert_eq!(artifact.inputs.len(), 600);
        assert_eq!(artifact.metrics.accelerate_frames, 600);
        assert_eq!(artifact.metrics.jump_frames, 0);
        assert_eq!(artifact.metrics.input_runs, 1, "one held accelerate run");
    }

    #[test]
    fn ride_log_round_trips_through_nested_directories() {
        let artifact = run_bot("cruiser", 9, 300).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run.ride.json");
        write_ride(&path, &artifact.ride).unwrap();
        assert_eq!(read_ride(&path).unwrap(), artifact.ride);
    }

    #[test]
    fn unreadable_ride_log_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        let err = format!("{:#}", read_ride(&path).unwrap_err());
        assert!(err.contains("broken.json"), "{err}");
    }
}
