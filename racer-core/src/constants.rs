//! Tuned gameplay constants.
//!
//! Pixel units on a fixed 1200x800 screen, one simulation tick per frame.

// Screen
pub const SCREEN_WIDTH: f32 = 1200.0;
pub const SCREEN_HEIGHT: f32 = 800.0;
pub const SCREEN_CENTER_X: f32 = SCREEN_WIDTH / 2.0;

// Road
pub const ROAD_BOTTOM_WIDTH: f32 = 1000.0;
pub const ROAD_TOP_WIDTH: f32 = 200.0;
pub const LANE_WIDTH: f32 = ROAD_BOTTOM_WIDTH / 3.0;
pub const ROAD_LEFT_X: f32 = (SCREEN_WIDTH - ROAD_BOTTOM_WIDTH) / 2.0;
pub const ROAD_RIGHT_X: f32 = (SCREEN_WIDTH + ROAD_BOTTOM_WIDTH) / 2.0;
pub const LANE_COUNT: usize = 3;
pub const LANE_MARKING_STEP: f32 = 5.0;

// Vehicle
pub const VEHICLE_START_SIZE: f32 = 280.0;
pub const VEHICLE_MIN_SIZE: f32 = 250.0;
pub const VEHICLE_SHRINK_STEP: f32 = 5.0;
pub const VEHICLE_REST_OFFSET: f32 = 40.0;
pub const VEHICLE_LANE_EDGE_MARGIN: f32 = 50.0;
pub const VEHICLE_CREEP_STEP: f32 = 5.0;
pub const VEHICLE_CREEP_FLOOR_Y: f32 = SCREEN_HEIGHT - 150.0;

// Jump
pub const JUMP_INITIAL_SPEED: f32 = 10.0;
pub const JUMP_MAX_HEIGHT: f32 = 120.0;
pub const GRAVITY_PER_FRAME: f32 = 10.0;

// Obstacles
pub const OBSTACLE_POOL_SIZE: usize = 3;
pub const OBSTACLE_SPAWN_SIZE: f32 = 30.0;
pub const OBSTACLE_FIRST_Y: f32 = -200.0;
pub const OBSTACLE_VERTICAL_GAP: f32 = 150.0;
pub const OBSTACLE_RECYCLE_Y: f32 = -150.0;
pub const OBSTACLE_BASE_DRIFT: f32 = 1.5;
pub const OBSTACLE_ACCEL_DRIFT: f32 = 1.5;
pub const OBSTACLE_COAST_RISE: f32 = 3.0;
pub const OBSTACLE_COAST_PULL_RIGHT: f32 = 2.0;
pub const OBSTACLE_COAST_PULL_LEFT: f32 = 1.3;
pub const OBSTACLE_HOMING_LEFT_STEP: f32 = 1.2;
pub const OBSTACLE_HOMING_RIGHT_STEP: f32 = 0.8;
pub const OBSTACLE_RECOIL_COAST_RISE: f32 = 1.0;
pub const OBSTACLE_RECOIL_ACCEL_RISE: f32 = 1.5;
pub const OBSTACLE_RECOIL_LANE_EXIT_DROP: f32 = 1.0;
pub const OBSTACLE_BASE_SIZE: f32 = 130.0;
pub const OBSTACLE_SCALE_BIAS: f32 = 0.3;
pub const OBSTACLE_ENTRY_ANCHOR_X: f32 = (SCREEN_WIDTH + ROAD_TOP_WIDTH) / 2.0;
pub const OBSTACLE_ENTRY_OFFSETS: [f32; LANE_COUNT] = [250.0, 180.0, 90.0];
pub const OBSTACLE_HOMING_TARGET_X: f32 = OBSTACLE_ENTRY_ANCHOR_X - 180.0;

// Collision
pub const COLLISION_JUMP_CLEARANCE: f32 = 20.0;
pub const COLLISION_INSET_LEFT: f32 = 100.0;
pub const COLLISION_INSET_RIGHT: f32 = 100.0;
pub const COLLISION_INSET_BOTTOM: f32 = 180.0;
pub const COLLISION_INSET_TOP: f32 = 100.0;
pub const EFFECT_TIMER_ARM: u32 = 100;
pub const EFFECT_TIMER_HIT_TICK: u32 = 99;
pub const MAX_HITS: u32 = 3;

// Jump-over scoring
pub const JUMP_OVER_SCORE: u32 = 50;
pub const JUMP_OVER_VERTICAL_BAND: f32 = 200.0;
pub const JUMP_OVER_APPROACH_MARGIN: f32 = 100.0;
pub const JUMP_OVER_PUSH_DOWN: f32 = 40.0;
pub const JUMP_OVER_PUSH_LEFT: f32 = 30.0;
pub const JUMP_OVER_PUSH_RIGHT: f32 = 20.0;

// Scheduling
pub const FRAMES_PER_SECOND: u32 = 60;
pub const MAX_STEPS_PER_ADVANCE: u32 = 5;

// Ride logs
pub const RIDE_LOG_FORMAT: u32 = 1;
pub const MAX_FRAMES_DEFAULT: u32 = 108_000; // 30 minutes at 60fps
