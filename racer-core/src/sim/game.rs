use super::*;

#[derive(Clone)]
pub(super) struct Game {
    vehicle: Vehicle,
    obstacles: [Obstacle; OBSTACLE_POOL_SIZE],
    stream_started: bool,
    lane_marking_offset: f32,
    score: u32,
    hit_count: u32,
    effect_timer: u32,
    effect_visible: bool,
    game_over: bool,
    frame_count: u32,
    rng: SeededRng,
    events: Vec<SessionEvent>,
}

fn random_lane(rng: &mut SeededRng) -> Lane {
    let index = rng.next_int(LANE_COUNT as u32) as usize;
    Lane::from_index(index).unwrap_or(Lane::Middle)
}

impl Game {
    pub(super) fn new(seed: u32) -> Self {
        let mut rng = SeededRng::new(seed);
        let obstacles = core::array::from_fn(|slot| {
            let lane = random_lane(&mut rng);
            Obstacle::spawn(lane, OBSTACLE_FIRST_Y - slot as f32 * OBSTACLE_VERTICAL_GAP)
        });

        Self {
            vehicle: Vehicle::new(),
            obstacles,
            stream_started: false,
            lane_marking_offset: 0.0,
            score: 0,
            hit_count: 0,
            effect_timer: 0,
            effect_visible: false,
            game_over: false,
            frame_count: 0,
            rng,
            events: Vec::new(),
        }
    }

    pub(super) fn checkpoint(&self) -> ReplayCheckpoint {
        ReplayCheckpoint {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            score: self.score,
            hit_count: self.hit_count,
            game_over: self.game_over,
            effect_timer: self.effect_timer,
            vehicle_lane: self.vehicle.lane,
            vehicle_x: self.vehicle.x,
            vehicle_y: self.vehicle.y,
            vehicle_jumping: self.vehicle.is_jumping(),
            obstacle_y: self.obstacles.map(|obstacle| obstacle.y),
        }
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frame_count: self.frame_count,
            score: self.score,
            hit_count: self.hit_count,
            is_game_over: self.game_over,
            stream_started: self.stream_started,
            lane_marking_offset: self.lane_marking_offset,
            effect_visible: self.effect_visible,
            effect_timer: self.effect_timer,
            rng_state: self.rng.state(),
            vehicle: Self::vehicle_snapshot(self.vehicle),
            obstacles: self.obstacles.map(Self::obstacle_snapshot),
        }
    }

    fn vehicle_snapshot(vehicle: Vehicle) -> VehicleSnapshot {
        let jump_speed = match vehicle.jump {
            JumpState::Grounded => 0.0,
            JumpState::Rising { speed } => speed,
        };
        VehicleSnapshot {
            x: vehicle.x,
            y: vehicle.y,
            width: vehicle.width,
            height: vehicle.height,
            lane: vehicle.lane,
            jumping: vehicle.is_jumping(),
            jump_speed,
        }
    }

    fn obstacle_snapshot(obstacle: Obstacle) -> ObstacleSnapshot {
        ObstacleSnapshot {
            x: obstacle.x,
            y: obstacle.y,
            width: obstacle.width,
            height: obstacle.height,
            lane: obstacle.lane,
            approach: obstacle.approach,
            contact: obstacle.contact,
        }
    }

    pub(super) fn transition_state(&self) -> TransitionState {
        TransitionState {
            score: self.score,
            hit_count: self.hit_count,
            game_over: self.game_over,
        }
    }

    #[inline]
    pub(super) fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub(super) fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Events emitted by the most recent tick.
    #[inline]
    pub(super) fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub(super) fn result(&self) -> ReplayResult {
        ReplayResult {
            final_score: self.score,
            final_hit_count: self.hit_count,
            final_rng_state: self.rng.state(),
            frame_count: self.frame_count,
            game_over: self.game_over,
        }
    }

    pub(super) fn step(&mut self, input_byte: u8) {
        self.step_decoded(decode_input_byte(input_byte));
    }

    pub(super) fn step_decoded(&mut self, input: FrameInput) {
        self.events.clear();
        self.frame_count += 1;

        if self.game_over {
            return;
        }

        self.update_vehicle(input);
        self.update_jump();
        if self.stream_started {
            self.update_obstacles(input.accelerate);
        }

        self.handle_collisions();
        if self.game_over {
            return;
        }

        self.tick_effect_timer();
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        if self.hit_count > MAX_HITS {
            return Err(RuleCode::HitCountCap);
        }

        if self.score % JUMP_OVER_SCORE != 0 {
            return Err(RuleCode::ScoreGranularity);
        }

        let size_in_range = |size: f32| (VEHICLE_MIN_SIZE..=VEHICLE_START_SIZE).contains(&size);
        if !size_in_range(self.vehicle.width) || !size_in_range(self.vehicle.height) {
            return Err(RuleCode::VehicleSizeFloor);
        }

        if !(0.0..SCREEN_HEIGHT).contains(&self.lane_marking_offset) {
            return Err(RuleCode::LaneMarkingRange);
        }

        Ok(())
    }

    fn update_vehicle(&mut self, input: FrameInput) {
        let vehicle = &mut self.vehicle;
        let guard = vehicle.last_lane_change;

        let shifted = if input.left && guard != Some(Direction::Left) {
            vehicle.lane.to_left().map(|lane| (lane, Direction::Left))
        } else {
            None
        };
        let shifted = shifted.or_else(|| {
            if input.right && guard != Some(Direction::Right) {
                vehicle.lane.to_right().map(|lane| (lane, Direction::Right))
            } else {
                None
            }
        });

        if let Some((lane, direction)) = shifted {
            vehicle.lane = lane;
            vehicle.last_lane_change = Some(direction);
            self.events.push(SessionEvent::LaneChanged { lane });
        }

        vehicle.x = lane_x(vehicle.lane, vehicle.width);

        if !input.left && !input.right {
            vehicle.last_lane_change = None;
        }

        if input.accelerate {
            self.forward_advance();
            self.stream_started = true;
        }

        if input.jump && !self.vehicle.is_jumping() {
            self.vehicle.jump = JumpState::Rising {
                speed: JUMP_INITIAL_SPEED,
            };
            self.events.push(SessionEvent::JumpStarted);
        }
    }

    /// Accelerating creeps the vehicle up the screen, shrinks it toward the
    /// horizon and scrolls the lane markings.
    fn forward_advance(&mut self) {
        let vehicle = &mut self.vehicle;
        if vehicle.y > VEHICLE_CREEP_FLOOR_Y {
            vehicle.y -= VEHICLE_CREEP_STEP;
        }
        if vehicle.height > VEHICLE_MIN_SIZE {
            vehicle.height -= VEHICLE_SHRINK_STEP;
            vehicle.y += VEHICLE_SHRINK_STEP / 2.0;
        }
        if vehicle.width > VEHICLE_MIN_SIZE {
            vehicle.width -= VEHICLE_SHRINK_STEP;
            vehicle.x += VEHICLE_SHRINK_STEP / 2.0;
        }

        self.lane_marking_offset += LANE_MARKING_STEP;
        if self.lane_marking_offset >= SCREEN_HEIGHT {
            self.lane_marking_offset = 0.0;
        }
    }

    fn update_jump(&mut self) {
        match self.vehicle.jump {
            JumpState::Rising { speed } => {
                self.vehicle.y -= speed;
                if self.vehicle.y <= self.vehicle.peak_y() {
                    self.vehicle.jump = JumpState::Grounded;
                    self.events.push(SessionEvent::JumpEnded);
                }
            }
            JumpState::Grounded => {
                let rest_y = self.vehicle.rest_y();
                if self.vehicle.y < rest_y {
                    self.vehicle.y = (self.vehicle.y + GRAVITY_PER_FRAME).min(rest_y);
                }
            }
        }

        self.score_jump_over();
    }

    fn score_jump_over(&mut self) {
        let vehicle = &self.vehicle;
        let mut scored = false;
        if vehicle.is_jumping() {
            let approach_y = SCREEN_HEIGHT - vehicle.height - JUMP_OVER_APPROACH_MARGIN;
            for obstacle in self.obstacles.iter_mut() {
                let in_band = (vehicle.y - obstacle.y).abs() < JUMP_OVER_VERTICAL_BAND;
                let same_column = (vehicle.x - obstacle.x).abs() < LANE_WIDTH / 2.0;
                if !(in_band && obstacle.y > approach_y && same_column) {
                    continue;
                }

                obstacle.y += JUMP_OVER_PUSH_DOWN;
                if obstacle.x < SCREEN_CENTER_X {
                    obstacle.x -= JUMP_OVER_PUSH_LEFT;
                } else if obstacle.x > SCREEN_CENTER_X {
                    obstacle.x += JUMP_OVER_PUSH_RIGHT;
                }
                scored = true;
            }
        }

        if scored && !self.vehicle.jump_scored {
            self.score += JUMP_OVER_SCORE;
            self.vehicle.jump_scored = true;
            self.events
                .push(SessionEvent::JumpScored { score: self.score });
        }
        if !self.vehicle.is_jumping() {
            self.vehicle.jump_scored = false;
        }
    }

    fn update_obstacles(&mut self, accelerate: bool) {
        let rng = &mut self.rng;
        for obstacle in self.obstacles.iter_mut() {
            obstacle.y += OBSTACLE_BASE_DRIFT;
            if obstacle.is_off_screen() {
                obstacle.recycle(random_lane(rng));
            }

            if obstacle.approach == Approach::Entering && obstacle.x != SCREEN_CENTER_X {
                obstacle.approach = Approach::Homing;
            }
            if obstacle.approach == Approach::Homing {
                if obstacle.x < OBSTACLE_HOMING_TARGET_X {
                    obstacle.x -= OBSTACLE_HOMING_LEFT_STEP;
                } else if obstacle.x > OBSTACLE_HOMING_TARGET_X {
                    obstacle.x += OBSTACLE_HOMING_RIGHT_STEP;
                }
            }

            match obstacle.contact {
                Contact::Clear => {
                    if accelerate {
                        obstacle.y += OBSTACLE_ACCEL_DRIFT;
                    } else {
                        obstacle.y -= OBSTACLE_COAST_RISE;
                        if obstacle.x < OBSTACLE_HOMING_TARGET_X {
                            obstacle.x += OBSTACLE_COAST_PULL_RIGHT;
                        } else if obstacle.x > OBSTACLE_HOMING_TARGET_X {
                            obstacle.x -= OBSTACLE_COAST_PULL_LEFT;
                        }
                    }
                    obstacle.rescale();
                }
                Contact::Recoiling => {
                    if accelerate {
                        obstacle.y -= OBSTACLE_RECOIL_ACCEL_RISE;
                    } else {
                        obstacle.y -= OBSTACLE_RECOIL_COAST_RISE;
                        obstacle.contact = Contact::Clear;
                    }

                    if obstacle.column() != obstacle.lane.index() as i32 {
                        obstacle.contact = Contact::Clear;
                        if accelerate {
                            obstacle.y += OBSTACLE_RECOIL_LANE_EXIT_DROP;
                        }
                    }
                }
            }
        }
    }

    fn handle_collisions(&mut self) {
        let vehicle = self.vehicle;
        let vehicle_bottom = vehicle.bottom();
        let jumping = vehicle.is_jumping();

        // First overlapping obstacle wins; the rest are ignored this tick.
        let hit = self.obstacles.iter().position(|obstacle| {
            if jumping && (vehicle_bottom - obstacle.y).abs() > COLLISION_JUMP_CLEARANCE {
                return false;
            }
            vehicle.x + vehicle.width > obstacle.x + COLLISION_INSET_LEFT
                && vehicle.x < obstacle.x + obstacle.width - COLLISION_INSET_RIGHT
                && vehicle.y < obstacle.y + obstacle.height - COLLISION_INSET_BOTTOM
                && vehicle_bottom > obstacle.y + COLLISION_INSET_TOP
        });

        let Some(slot) = hit else {
            return;
        };

        if self.hit_count >= MAX_HITS {
            self.game_over = true;
            self.events.push(SessionEvent::GameOver {
                score: self.score,
                hit_count: self.hit_count,
            });
            return;
        }

        self.effect_visible = true;
        self.effect_timer = EFFECT_TIMER_ARM;
        self.obstacles[slot].contact = Contact::Recoiling;
        self.events.push(SessionEvent::Collision { obstacle: slot });
    }

    /// The hit is counted one tick after the collision arms the effect.
    fn tick_effect_timer(&mut self) {
        if self.effect_timer == 0 {
            return;
        }

        if self.effect_timer == EFFECT_TIMER_HIT_TICK {
            self.hit_count += 1;
            self.events.push(SessionEvent::HitCounted {
                hit_count: self.hit_count,
            });
        }

        self.effect_timer -= 1;
        if self.effect_timer == 0 {
            self.effect_visible = false;
        }
    }
}
