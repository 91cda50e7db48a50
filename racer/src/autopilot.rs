//! Scripted players for headless sessions.

use racer_core::constants::{
    JUMP_OVER_APPROACH_MARGIN, JUMP_OVER_VERTICAL_BAND, LANE_WIDTH, SCREEN_HEIGHT,
};
use racer_core::sim::{Contact, WorldSnapshot};
use racer_core::FrameInput;

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput;
}

const ACCELERATE: FrameInput = FrameInput {
    accelerate: true,
    ..FrameInput::IDLE
};

/// Holds the accelerator and never steers or jumps.
struct Cruiser;

impl AutopilotBot for Cruiser {
    fn id(&self) -> &'static str {
        "cruiser"
    }

    fn description(&self) -> &'static str {
        "accelerates down the middle lane and never steers"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _world: &WorldSnapshot) -> FrameInput {
        ACCELERATE
    }
}

/// Accelerates and jumps as soon as an obstacle in its column is close enough
/// to be jumped over.
struct Hopper;

impl Hopper {
    fn obstacle_in_jump_band(world: &WorldSnapshot) -> bool {
        let vehicle = &world.vehicle;
        let approach_y = SCREEN_HEIGHT - vehicle.height - JUMP_OVER_APPROACH_MARGIN;
        world.obstacles.iter().any(|obstacle| {
            obstacle.contact == Contact::Clear
                && (vehicle.x - obstacle.x).abs() < LANE_WIDTH / 2.0
                && obstacle.y > approach_y
                && (vehicle.y - obstacle.y).abs() < JUMP_OVER_VERTICAL_BAND
        })
    }
}

impl AutopilotBot for Hopper {
    fn id(&self) -> &'static str {
        "hopper"
    }

    fn description(&self) -> &'static str {
        "accelerates and jumps obstacles entering its column"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        FrameInput {
            jump: world.stream_started
                && !world.vehicle.jumping
                && Self::obstacle_in_jump_band(world),
            ..ACCELERATE
        }
    }
}

/// Lifts off the accelerator while the crash effect runs, which lets each
/// collision register as a hit. Ends sessions quickly.
struct Tapper;

impl AutopilotBot for Tapper {
    fn id(&self) -> &'static str {
        "tapper"
    }

    fn description(&self) -> &'static str {
        "coasts after every crash until the hit registers"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        if world.effect_timer > 0 {
            FrameInput::IDLE
        } else {
            ACCELERATE
        }
    }
}

fn cruiser() -> Box<dyn AutopilotBot> {
    Box::new(Cruiser)
}

fn hopper() -> Box<dyn AutopilotBot> {
    Box::new(Hopper)
}

fn tapper() -> Box<dyn AutopilotBot> {
    Box::new(Tapper)
}

const ROSTER: [fn() -> Box<dyn AutopilotBot>; 3] = [cruiser, hopper, tapper];

pub fn bot_ids() -> Vec<&'static str> {
    ROSTER.iter().map(|make| make().id()).collect()
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    ROSTER
        .iter()
        .map(|make| {
            let bot = make();
            (bot.id(), bot.description())
        })
        .collect()
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot>> {
    ROSTER.iter().map(|make| make()).find(|bot| bot.id() == id)
}
