use std::time::Duration;

use racer_core::constants::MAX_HITS;
use racer_core::input::{INPUT_ACCELERATE, INPUT_JUMP, INPUT_LEFT, INPUT_RIGHT};
use racer_core::sim::{replay, replay_strict, replay_with_checkpoints, ReplayCheckpoint, Session};
use racer_core::{verify_ride, FixedStep, FrameInput, RideLog};

fn mix_u64(hash: u64, value: u64) -> u64 {
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

fn checkpoint_fingerprint(checkpoints: &[ReplayCheckpoint]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for checkpoint in checkpoints {
        hash = mix_u64(hash, checkpoint.frame_count as u64);
        hash = mix_u64(hash, checkpoint.rng_state as u64);
        hash = mix_u64(hash, checkpoint.score as u64);
        hash = mix_u64(hash, checkpoint.hit_count as u64);
        hash = mix_u64(hash, checkpoint.game_over as u64);
        hash = mix_u64(hash, checkpoint.effect_timer as u64);
        hash = mix_u64(hash, checkpoint.vehicle_lane.index() as u64);
        hash = mix_u64(hash, checkpoint.vehicle_x.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.vehicle_y.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.vehicle_jumping as u64);
        for y in checkpoint.obstacle_y {
            hash = mix_u64(hash, y.to_bits() as u64);
        }
    }

    hash
}

/// Weaves between lanes, accelerating, with periodic jumps.
fn scripted_inputs(frames: u32) -> Vec<u8> {
    (0..frames)
        .map(|frame| match frame % 120 {
            0..=2 => INPUT_ACCELERATE | INPUT_LEFT,
            40..=42 => INPUT_ACCELERATE | INPUT_RIGHT,
            60 | 90 => INPUT_ACCELERATE | INPUT_JUMP,
            80..=82 => INPUT_ACCELERATE | INPUT_RIGHT,
            100..=102 => INPUT_ACCELERATE | INPUT_LEFT,
            _ => INPUT_ACCELERATE,
        })
        .collect()
}

#[test]
fn checkpoint_fingerprint_is_stable_across_runs() {
    let inputs = scripted_inputs(5_000);
    let first = replay_with_checkpoints(0x5EED_0001, &inputs, 50);
    let second = replay_with_checkpoints(0x5EED_0001, &inputs, 50);

    assert_eq!(first.first().expect("checkpoint").frame_count, 0);
    assert_eq!(first.last().expect("checkpoint").frame_count, 5_000);
    assert_eq!(checkpoint_fingerprint(&first), checkpoint_fingerprint(&second));
}

#[test]
fn seed_changes_the_obstacle_stream() {
    let inputs = scripted_inputs(2_000);
    let fingerprints: Vec<u64> = (1..=4u32)
        .map(|seed| checkpoint_fingerprint(&replay_with_checkpoints(seed, &inputs, 25)))
        .collect();
    assert!(fingerprints.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn strict_replay_agrees_with_plain_replay() {
    for seed in [1u32, 0xDEAD_BEEF, 0x1234_5678] {
        let inputs = scripted_inputs(8_000);
        let strict = replay_strict(seed, &inputs).expect("scripted run is rule-abiding");
        assert_eq!(strict, replay(seed, &inputs));
        assert!(strict.final_hit_count <= MAX_HITS);
        assert_eq!(strict.final_score % 50, 0);
    }
}

#[test]
fn recorded_session_verifies_from_its_ride_log() {
    let inputs = scripted_inputs(3_000);
    let mut session = Session::new(42);
    for input in &inputs {
        session.step(*input);
    }
    let result = session.result();

    let log = RideLog::record(42, &inputs).expect("scripted run records");
    assert_eq!(log.result, result);
    assert_eq!(log.expand_inputs(), inputs);
    assert!(log.inputs.len() < inputs.len() / 5, "held inputs collapse");

    let reread = RideLog::from_json(&log.to_json().expect("log encodes")).expect("log decodes");
    let summary = verify_ride(&reread, 10_000).expect("log verifies");
    assert_eq!(summary.final_score, result.final_score);
    assert_eq!(summary.final_hit_count, result.final_hit_count);
    assert_eq!(summary.game_over, result.game_over);
    assert_eq!(summary.jumps_scored * 50, result.final_score);
}

#[test]
fn wall_clock_advance_matches_per_tick_replay() {
    let clock = FixedStep::new(60);
    let step = clock.step();
    let mut session = Session::with_clock(99, clock);
    let held = FrameInput {
        accelerate: true,
        ..FrameInput::IDLE
    };

    let mut ticks = 0;
    for _ in 0..200 {
        ticks += session.advance(step + step / 2, held).ticks;
    }
    // A single long stall is capped.
    ticks += session.advance(Duration::from_secs(3), held).ticks;

    let expected = replay(99, &vec![INPUT_ACCELERATE; ticks as usize]);
    assert_eq!(session.result(), expected);
    assert_eq!(ticks, 300 + 5);
}
