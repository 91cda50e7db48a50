use anyhow::Result;
use racer::autopilot::bot_ids;
use racer::runner::run_bot;
use racer_core::constants::MAX_HITS;
use racer_core::verify_ride;

#[test]
fn every_bot_records_a_verifiable_ride_log() -> Result<()> {
    for seed in [1, 0xDEAD_BEEF, 0x1234_5678] {
        for bot in bot_ids() {
            let artifact = run_bot(bot, seed, 1_200)?;
            assert_eq!(artifact.metrics.bot_id, bot);
            assert_eq!(
                artifact.ride.expand_inputs(),
                artifact.inputs,
                "bot={bot} seed={seed:#x}"
            );

            let summary = verify_ride(&artifact.ride, 1_200)?;
            assert_eq!(summary.final_score, artifact.metrics.final_score);
            assert_eq!(summary.frame_count, artifact.metrics.frame_count);
        }
    }
    Ok(())
}

#[test]
fn tapper_runs_into_game_over() -> Result<()> {
    for seed in [1, 7, 42] {
        let artifact = run_bot("tapper", seed, 5_000)?;
        assert!(artifact.metrics.game_over, "seed={seed}");
        assert_eq!(artifact.metrics.final_hit_count, MAX_HITS, "seed={seed}");
        assert!(artifact.metrics.frame_count < 5_000);
        assert_eq!(
            artifact.ride.milestones.last().map(|milestone| milestone.frame()),
            Some(artifact.metrics.frame_count),
            "game over is the final milestone"
        );
    }
    Ok(())
}

#[test]
fn hopper_scores_by_jumping() -> Result<()> {
    let artifact = run_bot("hopper", 1, 6_000)?;
    assert!(artifact.metrics.jumps_scored > 0);
    assert_eq!(
        artifact.metrics.final_score,
        artifact.metrics.jumps_scored * 50
    );
    assert_eq!(verify_ride(&artifact.ride, 6_000)?.jumps_scored, artifact.metrics.jumps_scored);
    assert!(artifact.metrics.jump_frames > 0);
    Ok(())
}
