use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    COLLISION_INSET_BOTTOM, COLLISION_INSET_LEFT, COLLISION_INSET_RIGHT, COLLISION_INSET_TOP,
    COLLISION_JUMP_CLEARANCE, EFFECT_TIMER_ARM, EFFECT_TIMER_HIT_TICK, GRAVITY_PER_FRAME,
    JUMP_INITIAL_SPEED, JUMP_MAX_HEIGHT, JUMP_OVER_APPROACH_MARGIN, JUMP_OVER_PUSH_DOWN,
    JUMP_OVER_PUSH_LEFT, JUMP_OVER_PUSH_RIGHT, JUMP_OVER_SCORE, JUMP_OVER_VERTICAL_BAND,
    LANE_COUNT, LANE_MARKING_STEP, LANE_WIDTH, MAX_HITS, OBSTACLE_ACCEL_DRIFT,
    OBSTACLE_BASE_DRIFT, OBSTACLE_BASE_SIZE, OBSTACLE_COAST_PULL_LEFT, OBSTACLE_COAST_PULL_RIGHT,
    OBSTACLE_COAST_RISE, OBSTACLE_ENTRY_ANCHOR_X, OBSTACLE_ENTRY_OFFSETS, OBSTACLE_FIRST_Y,
    OBSTACLE_HOMING_LEFT_STEP, OBSTACLE_HOMING_RIGHT_STEP, OBSTACLE_HOMING_TARGET_X,
    OBSTACLE_POOL_SIZE, OBSTACLE_RECOIL_ACCEL_RISE, OBSTACLE_RECOIL_COAST_RISE,
    OBSTACLE_RECOIL_LANE_EXIT_DROP, OBSTACLE_RECYCLE_Y, OBSTACLE_SCALE_BIAS,
    OBSTACLE_SPAWN_SIZE, OBSTACLE_VERTICAL_GAP, ROAD_LEFT_X, ROAD_RIGHT_X, SCREEN_CENTER_X,
    SCREEN_HEIGHT, SCREEN_WIDTH, VEHICLE_CREEP_FLOOR_Y, VEHICLE_CREEP_STEP,
    VEHICLE_LANE_EDGE_MARGIN, VEHICLE_MIN_SIZE, VEHICLE_REST_OFFSET, VEHICLE_SHRINK_STEP,
    VEHICLE_START_SIZE,
};
use crate::error::RuleCode;
use crate::input::{decode_input_byte, encode_input_byte, FrameInput};
use crate::rng::SeededRng;
use crate::schedule::FixedStep;

mod game;

use game::Game;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Left,
    Middle,
    Right,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Middle, Lane::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Middle => 1,
            Lane::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Neighbouring lane toward the left edge; `None` at the edge (no wraparound).
    pub fn to_left(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn to_right(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum JumpState {
    Grounded,
    Rising { speed: f32 },
}

#[derive(Clone, Copy, Debug)]
struct Vehicle {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    lane: Lane,
    jump: JumpState,
    last_lane_change: Option<Direction>,
    jump_scored: bool,
}

impl Vehicle {
    fn new() -> Self {
        Self {
            x: (SCREEN_WIDTH - VEHICLE_START_SIZE) / 2.0,
            y: SCREEN_HEIGHT - VEHICLE_START_SIZE + VEHICLE_REST_OFFSET,
            width: VEHICLE_START_SIZE,
            height: VEHICLE_START_SIZE,
            lane: Lane::Middle,
            jump: JumpState::Grounded,
            last_lane_change: None,
            jump_scored: false,
        }
    }

    #[inline]
    fn is_jumping(&self) -> bool {
        matches!(self.jump, JumpState::Rising { .. })
    }

    #[inline]
    fn rest_y(&self) -> f32 {
        SCREEN_HEIGHT - self.height + VEHICLE_REST_OFFSET
    }

    #[inline]
    fn peak_y(&self) -> f32 {
        SCREEN_HEIGHT - self.height - JUMP_MAX_HEIGHT
    }

    #[inline]
    fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Horizontal placement of a vehicle of `width` in `lane`.
#[inline]
fn lane_x(lane: Lane, width: f32) -> f32 {
    match lane {
        Lane::Left => ROAD_LEFT_X + VEHICLE_LANE_EDGE_MARGIN,
        Lane::Middle => (SCREEN_WIDTH - width) / 2.0,
        Lane::Right => ROAD_RIGHT_X - width - VEHICLE_LANE_EDGE_MARGIN,
    }
}

/// One-shot homing gate, re-armed on every recycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Entering,
    Homing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contact {
    Clear,
    Recoiling,
}

#[derive(Clone, Copy, Debug)]
struct Obstacle {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    lane: Lane,
    approach: Approach,
    contact: Contact,
}

impl Obstacle {
    /// Initial placement: centred on the lane at the bottom of the road.
    fn spawn(lane: Lane, y: f32) -> Self {
        let x = ROAD_LEFT_X + lane.index() as f32 * LANE_WIDTH + LANE_WIDTH / 2.0
            - OBSTACLE_SPAWN_SIZE / 2.0;
        Self {
            x,
            y,
            width: OBSTACLE_SPAWN_SIZE,
            height: OBSTACLE_SPAWN_SIZE,
            lane,
            approach: Approach::Entering,
            contact: Contact::Clear,
        }
    }

    /// Re-enter from the top of the road in `lane`, keeping the pool slot.
    fn recycle(&mut self, lane: Lane) {
        self.y = OBSTACLE_RECYCLE_Y;
        self.lane = lane;
        self.x = OBSTACLE_ENTRY_ANCHOR_X - OBSTACLE_ENTRY_OFFSETS[lane.index()];
        self.approach = Approach::Entering;
    }

    #[inline]
    fn is_off_screen(&self) -> bool {
        self.y > SCREEN_HEIGHT || self.y < OBSTACLE_RECYCLE_Y
    }

    fn rescale(&mut self) {
        let scale = (SCREEN_HEIGHT + self.y) / SCREEN_HEIGHT + OBSTACLE_SCALE_BIAS;
        self.width = OBSTACLE_BASE_SIZE * scale;
        self.height = OBSTACLE_BASE_SIZE * scale;
    }

    /// Index of the bottom-road lane column under `x`, unclamped.
    #[inline]
    fn column(&self) -> i32 {
        ((self.x - ROAD_LEFT_X) / LANE_WIDTH).floor() as i32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    LaneChanged { lane: Lane },
    JumpStarted,
    JumpEnded,
    JumpScored { score: u32 },
    Collision { obstacle: usize },
    HitCounted { hit_count: u32 },
    GameOver { score: u32, hit_count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub final_score: u32,
    pub final_hit_count: u32,
    pub final_rng_state: u32,
    pub frame_count: u32,
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayCheckpoint {
    pub frame_count: u32,
    pub rng_state: u32,
    pub score: u32,
    pub hit_count: u32,
    pub game_over: bool,
    pub effect_timer: u32,
    pub vehicle_lane: Lane,
    pub vehicle_x: f32,
    pub vehicle_y: f32,
    pub vehicle_jumping: bool,
    pub obstacle_y: [f32; OBSTACLE_POOL_SIZE],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub frame_count: u32,
    pub rule: RuleCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lane: Lane,
    pub jumping: bool,
    pub jump_speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lane: Lane,
    pub approach: Approach,
    pub contact: Contact,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame_count: u32,
    pub score: u32,
    pub hit_count: u32,
    pub is_game_over: bool,
    pub stream_started: bool,
    pub lane_marking_offset: f32,
    pub effect_visible: bool,
    pub effect_timer: u32,
    pub rng_state: u32,
    pub vehicle: VehicleSnapshot,
    pub obstacles: [ObstacleSnapshot; OBSTACLE_POOL_SIZE],
}

/// Outcome of [`Session::advance`]: how many ticks ran and what they emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Advance {
    pub ticks: u32,
    pub events: Vec<SessionEvent>,
}

/// A live play session: the simulation plus its fixed-step clock.
pub struct Session {
    game: Game,
    clock: FixedStep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TransitionState {
    score: u32,
    hit_count: u32,
    game_over: bool,
}

pub fn replay(seed: u32, inputs: &[u8]) -> ReplayResult {
    let mut game = Game::new(seed);

    for input in inputs {
        game.step(*input);
    }

    game.result()
}

pub fn replay_strict(seed: u32, inputs: &[u8]) -> Result<ReplayResult, ReplayViolation> {
    let mut game = Game::new(seed);
    game.validate_invariants().map_err(|rule| ReplayViolation {
        frame_count: game.frame_count(),
        rule,
    })?;

    for input in inputs {
        let before_step = game.transition_state();
        game.step_decoded(decode_input_byte(*input));
        let after_step = game.transition_state();

        validate_transition(&before_step, &after_step).map_err(|rule| ReplayViolation {
            frame_count: game.frame_count(),
            rule,
        })?;

        game.validate_invariants().map_err(|rule| ReplayViolation {
            frame_count: game.frame_count(),
            rule,
        })?;
    }

    Ok(game.result())
}

pub fn replay_with_checkpoints(
    seed: u32,
    inputs: &[u8],
    sample_every: u32,
) -> Vec<ReplayCheckpoint> {
    let mut game = Game::new(seed);
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = inputs.len() as u32;
    let mut checkpoints = Vec::new();
    checkpoints.push(game.checkpoint());

    for (index, input) in inputs.iter().enumerate() {
        game.step(*input);
        let frame = (index + 1) as u32;
        if frame % stride == 0 || frame == total_frames {
            checkpoints.push(game.checkpoint());
        }
    }

    checkpoints
}

fn validate_transition(prev: &TransitionState, next: &TransitionState) -> Result<(), RuleCode> {
    if next.score < prev.score {
        return Err(RuleCode::ScoreDelta);
    }
    let score_delta = next.score - prev.score;
    if score_delta != 0 && score_delta != JUMP_OVER_SCORE {
        return Err(RuleCode::ScoreDelta);
    }

    if next.hit_count < prev.hit_count || next.hit_count > prev.hit_count + 1 {
        return Err(RuleCode::HitCountDelta);
    }

    if prev.game_over && !next.game_over {
        return Err(RuleCode::GameOverReverted);
    }

    Ok(())
}

impl Session {
    pub fn new(seed: u32) -> Self {
        Self::with_clock(seed, FixedStep::default())
    }

    pub fn with_clock(seed: u32, clock: FixedStep) -> Self {
        Self {
            game: Game::new(seed),
            clock,
        }
    }

    /// Run exactly one simulation tick.
    #[inline]
    pub fn step(&mut self, input_byte: u8) -> &[SessionEvent] {
        self.game.step(input_byte);
        self.game.events()
    }

    #[inline]
    pub fn step_input(&mut self, input: FrameInput) -> &[SessionEvent] {
        self.step(encode_input_byte(input))
    }

    /// Like [`Session::step`], but refuses a tick that would break an invariant.
    pub fn step_checked(&mut self, input_byte: u8) -> Result<&[SessionEvent], RuleCode> {
        let before_step = self.game.transition_state();
        let mut next = self.game.clone();
        next.step(input_byte);
        validate_transition(&before_step, &next.transition_state())?;
        next.validate_invariants()?;

        self.game = next;
        Ok(self.game.events())
    }

    /// Feed wall-clock time; runs as many fixed ticks as the clock releases,
    /// all with the same held input.
    pub fn advance(&mut self, delta: Duration, input: FrameInput) -> Advance {
        let ticks = self.clock.advance(delta);
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend_from_slice(self.step_input(input));
        }
        Advance { ticks, events }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    #[inline]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        self.game.result()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }

    #[inline]
    pub fn clock(&self) -> &FixedStep {
        &self.clock
    }
}
