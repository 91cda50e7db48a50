//! Ride logs: a session stored as held-input runs plus the milestones it
//! reached along the way.
//!
//! Inputs are run-length encoded since a driver holds the same keys for long
//! stretches. Every scored jump, counted hit and the game-over tick are kept
//! with the frame they happened on, so a replay that drifts is caught at the
//! first milestone where it diverges instead of only at the final result.

use serde::{Deserialize, Serialize};

use crate::constants::RIDE_LOG_FORMAT;
use crate::error::RideError;
use crate::input::INPUT_RESERVED_MASK;
use crate::sim::{ReplayResult, Session, SessionEvent};

/// `input` held for `frames` consecutive ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRun {
    pub input: u8,
    pub frames: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    JumpScored { frame: u32, score: u32 },
    HitCounted { frame: u32, hit_count: u32 },
    GameOver { frame: u32, score: u32, hit_count: u32 },
}

impl Milestone {
    fn from_event(frame: u32, event: &SessionEvent) -> Option<Self> {
        match *event {
            SessionEvent::JumpScored { score } => Some(Self::JumpScored { frame, score }),
            SessionEvent::HitCounted { hit_count } => Some(Self::HitCounted { frame, hit_count }),
            SessionEvent::GameOver { score, hit_count } => Some(Self::GameOver {
                frame,
                score,
                hit_count,
            }),
            _ => None,
        }
    }

    pub fn frame(&self) -> u32 {
        match *self {
            Self::JumpScored { frame, .. }
            | Self::HitCounted { frame, .. }
            | Self::GameOver { frame, .. } => frame,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideLog {
    pub format: u32,
    pub seed: u32,
    pub inputs: Vec<InputRun>,
    pub milestones: Vec<Milestone>,
    pub result: ReplayResult,
}

impl RideLog {
    /// Replays `inputs` under the session rules and captures what they reach.
    pub fn record(seed: u32, inputs: &[u8]) -> Result<Self, RideError> {
        if let Some(frame) = inputs
            .iter()
            .position(|byte| byte & INPUT_RESERVED_MASK != 0)
        {
            return Err(RideError::ReservedInputBits {
                frame: frame as u32,
                byte: inputs[frame],
            });
        }

        let (milestones, result) = ride_through(seed, inputs.iter().copied())?;
        Ok(Self {
            format: RIDE_LOG_FORMAT,
            seed,
            inputs: run_length_encode(inputs),
            milestones,
            result,
        })
    }

    pub fn frame_count(&self) -> u64 {
        self.inputs.iter().map(|run| u64::from(run.frames)).sum()
    }

    /// One input byte per tick.
    pub fn expand_inputs(&self) -> Vec<u8> {
        let mut inputs = Vec::new();
        for run in &self.inputs {
            inputs.resize(inputs.len() + run.frames as usize, run.input);
        }
        inputs
    }

    pub fn to_json(&self) -> Result<String, RideError> {
        serde_json::to_string_pretty(self).map_err(|err| RideError::Malformed(err.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, RideError> {
        serde_json::from_str(text).map_err(|err| RideError::Malformed(err.to_string()))
    }
}

/// What a verified ride log establishes about its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideSummary {
    pub seed: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_hit_count: u32,
    pub game_over: bool,
    pub input_runs: u32,
    pub jumps_scored: u32,
    pub hits_counted: u32,
}

pub fn verify_ride(log: &RideLog, max_frames: u32) -> Result<RideSummary, RideError> {
    if log.format != RIDE_LOG_FORMAT {
        return Err(RideError::UnsupportedFormat { found: log.format });
    }

    let mut start = 0u64;
    for (index, run) in log.inputs.iter().enumerate() {
        if run.frames == 0 {
            return Err(RideError::EmptyInputRun { index });
        }
        if run.input & INPUT_RESERVED_MASK != 0 {
            return Err(RideError::ReservedInputBits {
                frame: start.min(u64::from(u32::MAX)) as u32,
                byte: run.input,
            });
        }
        start += u64::from(run.frames);
    }

    let frame_count = log.frame_count();
    if frame_count == 0 || frame_count > u64::from(max_frames) {
        return Err(RideError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let ticks = log
        .inputs
        .iter()
        .flat_map(|run| std::iter::repeat(run.input).take(run.frames as usize));
    let (milestones, result) = ride_through(log.seed, ticks)?;

    let mut claimed = log.milestones.iter();
    let mut computed = milestones.iter();
    for index in 0.. {
        match (claimed.next(), computed.next()) {
            (None, None) => break,
            (logged, replayed) if logged == replayed => {}
            (logged, replayed) => {
                return Err(RideError::MilestoneMismatch {
                    index,
                    claimed: logged.copied(),
                    computed: replayed.copied(),
                })
            }
        }
    }

    if result != log.result {
        return Err(RideError::ResultMismatch {
            claimed: log.result,
            computed: result,
        });
    }

    let count = |pick: fn(&Milestone) -> bool| milestones.iter().filter(|m| pick(m)).count() as u32;
    Ok(RideSummary {
        seed: log.seed,
        frame_count: result.frame_count,
        final_score: result.final_score,
        final_hit_count: result.final_hit_count,
        game_over: result.game_over,
        input_runs: log.inputs.len() as u32,
        jumps_scored: count(|m| matches!(m, Milestone::JumpScored { .. })),
        hits_counted: count(|m| matches!(m, Milestone::HitCounted { .. })),
    })
}

fn ride_through(
    seed: u32,
    inputs: impl Iterator<Item = u8>,
) -> Result<(Vec<Milestone>, ReplayResult), RideError> {
    let mut session = Session::new(seed);
    session.validate().map_err(|rule| RideError::RuleViolation { frame: 0, rule })?;

    let mut milestones = Vec::new();
    for (index, input) in inputs.enumerate() {
        let frame = index as u32 + 1;
        let events = session
            .step_checked(input)
            .map_err(|rule| RideError::RuleViolation { frame, rule })?;
        milestones.extend(
            events
                .iter()
                .filter_map(|event| Milestone::from_event(frame, event)),
        );
    }

    Ok((milestones, session.result()))
}

fn run_length_encode(inputs: &[u8]) -> Vec<InputRun> {
    let mut runs: Vec<InputRun> = Vec::new();
    for &input in inputs {
        match runs.last_mut() {
            Some(run) if run.input == input => run.frames += 1,
            _ => runs.push(InputRun { input, frames: 1 }),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{JUMP_OVER_SCORE, MAX_HITS};
    use crate::error::RuleCode;
    use crate::input::{INPUT_ACCELERATE, INPUT_JUMP, INPUT_LEFT};

    fn weaving(frames: usize) -> Vec<u8> {
        (0..frames)
            .map(|frame| match frame % 90 {
                0..=1 => INPUT_ACCELERATE | INPUT_LEFT,
                45 => INPUT_ACCELERATE | INPUT_JUMP,
                _ => INPUT_ACCELERATE,
            })
            .collect()
    }

    #[test]
    fn held_inputs_collapse_into_runs() {
        let inputs = [0x04, 0x04, 0x04, 0x0C, 0x00, 0x00];
        let log = RideLog::record(3, &inputs).unwrap();
        assert_eq!(
            log.inputs,
            vec![
                InputRun { input: 0x04, frames: 3 },
                InputRun { input: 0x0C, frames: 1 },
                InputRun { input: 0x00, frames: 2 },
            ]
        );
        assert_eq!(log.frame_count(), 6);
        assert_eq!(log.expand_inputs(), inputs);
    }

    #[test]
    fn recorded_log_verifies_and_survives_json() {
        let log = RideLog::record(0x1234_5678, &weaving(2_000)).unwrap();
        let reread = RideLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(reread, log);

        let summary = verify_ride(&reread, 10_000).unwrap();
        assert_eq!(summary.frame_count, 2_000);
        assert_eq!(summary.final_score, log.result.final_score);
        assert_eq!(summary.final_score, summary.jumps_scored * JUMP_OVER_SCORE);
        assert!(summary.final_hit_count <= MAX_HITS);
    }

    #[test]
    fn milestones_carry_the_frame_they_happened_on() {
        let log = RideLog::record(0xDEAD_BEEF, &weaving(3_000)).unwrap();
        assert!(log
            .milestones
            .windows(2)
            .all(|pair| pair[0].frame() <= pair[1].frame()));
        assert!(log.milestones.iter().all(|m| m.frame() >= 1 && m.frame() <= 3_000));
    }

    #[test]
    fn rejects_reserved_bits_when_recording() {
        assert_eq!(
            RideLog::record(1, &[0x00, 0x80]),
            Err(RideError::ReservedInputBits { frame: 1, byte: 0x80 })
        );
    }

    #[test]
    fn rejects_unknown_format() {
        let mut log = RideLog::record(1, &[0x04; 10]).unwrap();
        log.format += 1;
        assert_eq!(
            verify_ride(&log, 100),
            Err(RideError::UnsupportedFormat { found: RIDE_LOG_FORMAT + 1 })
        );
    }

    #[test]
    fn rejects_empty_runs_and_out_of_range_lengths() {
        let mut log = RideLog::record(1, &[0x04; 10]).unwrap();
        assert_eq!(
            verify_ride(&log, 9),
            Err(RideError::FrameCountOutOfRange {
                frame_count: 10,
                max_frames: 9
            })
        );

        log.inputs.push(InputRun { input: 0x00, frames: 0 });
        assert_eq!(verify_ride(&log, 100), Err(RideError::EmptyInputRun { index: 1 }));

        log.inputs.clear();
        assert!(matches!(
            verify_ride(&log, 100),
            Err(RideError::FrameCountOutOfRange { frame_count: 0, .. })
        ));
    }

    #[test]
    fn rejects_reserved_bits_in_a_run() {
        let mut log = RideLog::record(1, &[0x04; 10]).unwrap();
        log.inputs.push(InputRun { input: 0x10, frames: 2 });
        assert_eq!(
            verify_ride(&log, 100),
            Err(RideError::ReservedInputBits { frame: 10, byte: 0x10 })
        );
    }

    #[test]
    fn invented_milestone_is_caught_where_it_diverges() {
        let mut log = RideLog::record(7, &[0x04; 120]).unwrap();
        let index = log.milestones.len();
        let forged = Milestone::JumpScored { frame: 60, score: 50 };
        log.milestones.push(forged);
        log.result.final_score += JUMP_OVER_SCORE;

        assert_eq!(
            verify_ride(&log, 1_000),
            Err(RideError::MilestoneMismatch {
                index,
                claimed: Some(forged),
                computed: None,
            })
        );
    }

    #[test]
    fn edited_result_is_rejected() {
        let mut log = RideLog::record(7, &[0x00; 30]).unwrap();
        let honest = log.result;
        log.result.final_hit_count = 3;

        assert_eq!(
            verify_ride(&log, 1_000),
            Err(RideError::ResultMismatch {
                claimed: log.result,
                computed: honest,
            })
        );
    }

    #[test]
    fn lengthened_ride_is_rejected() {
        let mut log = RideLog::record(0xFEED_BEEF, &weaving(600)).unwrap();
        assert!(verify_ride(&log, 10_000).is_ok());

        log.inputs.push(InputRun { input: 0x00, frames: 5 });
        assert!(verify_ride(&log, 10_000).is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            RideLog::from_json("{\"format\": 1"),
            Err(RideError::Malformed(_))
        ));
    }

    #[test]
    fn rule_violations_name_their_frame() {
        let err = RideError::RuleViolation {
            frame: 12,
            rule: RuleCode::ScoreDelta,
        };
        assert_eq!(err.to_string(), "rule violation at frame 12: SCORE_DELTA");
    }
}
