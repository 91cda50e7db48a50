use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::anyhow;
use racer_core::constants::MAX_FRAMES_DEFAULT;
use racer_core::ride::Milestone;
use racer_core::{verify_ride, Scene};
use tempfile::TempDir;

use super::*;
use crate::autopilot::create_bot;
use crate::surface::ScriptedPrompt;

const SEED: u32 = 7;
const GRACE: Duration = Duration::from_secs(2);

#[derive(Default)]
struct FakeState {
    players: HashMap<String, i64>,
    offline: bool,
    submissions: Vec<(String, u32)>,
}

/// In-memory score service with the same outcomes as the HTTP one.
#[derive(Clone, Default)]
struct FakeScores {
    state: Rc<RefCell<FakeState>>,
}

impl FakeScores {
    fn with_player(name: &str, high_score: i64) -> Self {
        let fake = Self::default();
        fake.state
            .borrow_mut()
            .players
            .insert(name.to_string(), high_score);
        fake
    }

    fn offline() -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().offline = true;
        fake
    }

    fn high_score(&self, name: &str) -> Option<i64> {
        self.state.borrow().players.get(name).copied()
    }

    fn submissions(&self) -> Vec<(String, u32)> {
        self.state.borrow().submissions.clone()
    }
}

impl ScoreService for FakeScores {
    async fn register_player(&self, name: &str) -> Result<Registration> {
        let mut state = self.state.borrow_mut();
        if state.offline {
            return Err(anyhow!("connection refused"));
        }
        if state.players.contains_key(name) {
            return Ok(Registration::NameTaken);
        }
        state.players.insert(name.to_string(), 0);
        Ok(Registration::Registered)
    }

    async fn fetch_high_score(&self, name: &str) -> Result<Option<i64>> {
        let state = self.state.borrow();
        if state.offline {
            return Err(anyhow!("connection refused"));
        }
        Ok(state.players.get(name).copied())
    }

    async fn submit_score(&self, name: &str, score: u32) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.offline {
            return Err(anyhow!("connection refused"));
        }
        let Some(high_score) = state.players.get_mut(name) else {
            return Err(anyhow!("score service returned 404 Not Found"));
        };
        *high_score = (*high_score).max(i64::from(score));
        state.submissions.push((name.to_string(), score));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSurface {
    frames: usize,
    last: Option<Scene>,
    alerts: Vec<String>,
}

impl RecordingSurface {
    fn last_texts(&self) -> Vec<String> {
        self.last
            .as_ref()
            .map(|scene| scene.texts().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl Surface for RecordingSurface {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.frames += 1;
        self.last = Some(scene.clone());
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

type TestDriver = Driver<FakeScores, RecordingSurface>;

fn driver_with(service: FakeScores, answers: &[&str], cached: Option<&str>) -> (TestDriver, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut profile = ProfileCache::open(dir.path()).unwrap();
    if let Some(name) = cached {
        profile.store(name).unwrap();
    }
    let driver = Driver::new(
        SEED,
        FixedStep::default(),
        service,
        RecordingSurface::default(),
        Box::new(ScriptedPrompt::new(answers.iter().copied())),
        profile,
    );
    (driver, dir)
}

fn tick(driver: &mut TestDriver) -> FrameReport {
    let step = driver.session().clock().step();
    driver.frame(step, FrameInput::IDLE).unwrap()
}

fn play_until_game_over(driver: &mut TestDriver) -> FrameReport {
    let mut bot = create_bot("tapper").unwrap();
    bot.reset(SEED);
    let step = driver.session().clock().step();
    for _ in 0..5_000 {
        let input = bot.next_input(&driver.session().snapshot());
        let report = driver.frame(step, input).unwrap();
        if report.game_over {
            return report;
        }
    }
    panic!("session never ended");
}

#[actix_rt::test]
async fn prompted_name_is_registered_cached_and_shown() {
    let service = FakeScores::default();
    let (mut driver, dir) = driver_with(service.clone(), &["Alice"], None);

    let report = tick(&mut driver);
    assert_eq!(report.ticks, 1);
    assert_eq!(driver.in_flight(), 1);
    assert_eq!(driver.hud().player_name, None);

    driver.settle(GRACE).await;
    assert_eq!(driver.profile().player_name(), Some("Alice"));
    assert_eq!(
        ProfileCache::open(dir.path()).unwrap().player_name(),
        Some("Alice")
    );

    tick(&mut driver);
    driver.settle(GRACE).await;
    assert_eq!(driver.hud().high_score, Some(0));

    tick(&mut driver);
    let texts = driver.surface().last_texts();
    assert!(texts.iter().any(|text| text == "Player: Alice"), "{texts:?}");
    assert!(texts.iter().any(|text| text == "High Score:0"), "{texts:?}");
    assert!(driver.surface().alerts.is_empty());
}

#[actix_rt::test]
async fn taken_name_alerts_and_prompts_again() {
    let service = FakeScores::with_player("Alice", 300);
    let (mut driver, _dir) = driver_with(service, &["Alice", "Bob"], None);

    tick(&mut driver);
    driver.settle(GRACE).await;
    assert_eq!(driver.surface().alerts, vec![NAME_TAKEN_ALERT.to_string()]);
    assert_eq!(driver.profile().player_name(), None);

    tick(&mut driver);
    driver.settle(GRACE).await;
    assert_eq!(driver.profile().player_name(), Some("Bob"));
}

#[actix_rt::test]
async fn network_failure_clears_the_name_but_not_the_game() {
    let (mut driver, _dir) = driver_with(FakeScores::offline(), &["Alice"], Some("Ghost"));

    // The cached name is used as-is; only the high score fetch goes out.
    tick(&mut driver);
    driver.settle(GRACE).await;
    assert_eq!(driver.hud().high_score, None);
    assert!(driver.surface().alerts.is_empty());

    let (mut driver, _dir) = driver_with(FakeScores::offline(), &["Alice"], None);
    tick(&mut driver);
    driver.settle(GRACE).await;
    assert_eq!(driver.profile().player_name(), None);
    assert_eq!(driver.surface().alerts.len(), 1);
    assert!(driver.surface().alerts[0].starts_with("Registration failed"));

    let report = tick(&mut driver);
    assert_eq!(report.ticks, 1);
    assert_eq!(driver.session().snapshot().frame_count, 2);
}

#[actix_rt::test]
async fn blank_name_is_rejected_without_a_request() {
    let (mut driver, _dir) = driver_with(FakeScores::default(), &["   "], None);
    tick(&mut driver);
    assert_eq!(driver.in_flight(), 0);
    assert_eq!(driver.surface().alerts, vec![NAME_REQUIRED_ALERT.to_string()]);
}

#[actix_rt::test]
async fn unknown_player_shows_placeholder_high_score() {
    let (mut driver, _dir) = driver_with(FakeScores::default(), &[], Some("Alice"));
    tick(&mut driver);
    driver.settle(GRACE).await;
    tick(&mut driver);

    assert_eq!(driver.hud().high_score, None);
    let texts = driver.surface().last_texts();
    assert!(texts.iter().any(|text| text == "High Score:--"), "{texts:?}");
}

#[actix_rt::test]
async fn high_score_for_a_forgotten_player_is_dropped() {
    let service = FakeScores::with_player("Alice", 300);
    let (mut driver, _dir) = driver_with(service, &[], Some("Alice"));

    tick(&mut driver);
    driver.profile.clear().unwrap();
    driver.settle(GRACE).await;
    assert_eq!(driver.hud().high_score, None);
}

#[actix_rt::test]
async fn high_score_is_fetched_once_per_name() {
    let service = FakeScores::with_player("Alice", 300);
    let (mut driver, _dir) = driver_with(service, &[], Some("Alice"));

    tick(&mut driver);
    assert_eq!(driver.in_flight(), 1);
    driver.settle(GRACE).await;
    for _ in 0..10 {
        tick(&mut driver);
    }
    assert_eq!(driver.in_flight(), 0);
    assert_eq!(driver.hud().high_score, Some(300));
}

#[actix_rt::test]
async fn score_is_submitted_once_when_the_overlay_first_shows() {
    let service = FakeScores::with_player("Alice", 0);
    let (mut driver, _dir) = driver_with(service.clone(), &[], Some("Alice"));

    let report = play_until_game_over(&mut driver);
    assert!(report.game_over);
    assert!(driver.score_submitted());
    for _ in 0..30 {
        assert!(tick(&mut driver).game_over);
    }
    driver.settle(GRACE).await;

    let score = driver.result().final_score;
    assert_eq!(service.submissions(), vec![("Alice".to_string(), score)]);
    assert_eq!(service.high_score("Alice"), Some(i64::from(score)));
    assert!(driver
        .surface()
        .last
        .as_ref()
        .is_some_and(|scene| scene.game_over_overlay));
}

#[actix_rt::test]
async fn anonymous_game_over_submits_nothing() {
    let service = FakeScores::default();
    let (mut driver, _dir) = driver_with(service.clone(), &[], None);

    play_until_game_over(&mut driver);
    driver.settle(GRACE).await;

    assert!(driver.score_submitted());
    assert!(service.submissions().is_empty());
}

#[actix_rt::test]
async fn played_frames_replay_from_the_ride_log() {
    let (mut driver, _dir) = driver_with(FakeScores::default(), &[], None);
    play_until_game_over(&mut driver);

    let ride = driver.ride().unwrap();
    assert_eq!(ride.result, driver.result());
    let summary = verify_ride(&ride, MAX_FRAMES_DEFAULT).unwrap();
    let result = driver.result();
    assert_eq!(summary.frame_count, result.frame_count);
    assert_eq!(summary.final_score, result.final_score);
    assert_eq!(summary.final_hit_count, result.final_hit_count);
    assert_eq!(summary.hits_counted, result.final_hit_count);
    assert!(summary.game_over);
    assert!(ride
        .milestones
        .last()
        .is_some_and(|milestone| matches!(milestone, Milestone::GameOver { .. })));
}
