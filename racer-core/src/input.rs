//! Held-key sampling.
//!
//! Raw key-down/key-up events flip four held flags; the simulation reads a
//! [`FrameInput`] snapshot once per tick. Lane-change edge detection is not
//! done here, it belongs to the vehicle (see `sim`), so a held direction key
//! stays `true` in every sample.

use serde::{Deserialize, Serialize};

pub const INPUT_LEFT: u8 = 0x01;
pub const INPUT_RIGHT: u8 = 0x02;
pub const INPUT_ACCELERATE: u8 = 0x04;
pub const INPUT_JUMP: u8 = 0x08;
pub const INPUT_RESERVED_MASK: u8 = 0xF0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    LaneLeft,
    LaneRight,
    Accelerate,
    Jump,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub jump: bool,
}

impl FrameInput {
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        accelerate: false,
        jump: false,
    };
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InputSampler {
    held: FrameInput,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn key_up(&mut self, key: Key) {
        self.set(key, false);
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::LaneLeft => self.held.left,
            Key::LaneRight => self.held.right,
            Key::Accelerate => self.held.accelerate,
            Key::Jump => self.held.jump,
        }
    }

    #[inline]
    pub fn sample(&self) -> FrameInput {
        self.held
    }

    pub fn release_all(&mut self) {
        self.held = FrameInput::IDLE;
    }

    fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::LaneLeft => self.held.left = down,
            Key::LaneRight => self.held.right = down,
            Key::Accelerate => self.held.accelerate = down,
            Key::Jump => self.held.jump = down,
        }
    }
}

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    (if input.left { INPUT_LEFT } else { 0 })
        | (if input.right { INPUT_RIGHT } else { 0 })
        | (if input.accelerate { INPUT_ACCELERATE } else { 0 })
        | (if input.jump { INPUT_JUMP } else { 0 })
}

#[inline]
pub fn decode_input_byte(byte: u8) -> FrameInput {
    FrameInput {
        left: (byte & INPUT_LEFT) != 0,
        right: (byte & INPUT_RIGHT) != 0,
        accelerate: (byte & INPUT_ACCELERATE) != 0,
        jump: (byte & INPUT_JUMP) != 0,
    }
}
