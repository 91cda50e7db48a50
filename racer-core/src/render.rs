//! Scene construction.
//!
//! [`render`] turns a world snapshot plus HUD data into an ordered list of
//! draw commands. It never mutates game state and performs no I/O; whatever
//! presents the scene (a window, a log, a test) does the drawing.

use serde::{Deserialize, Serialize};

use crate::constants::{
    LANE_WIDTH, ROAD_BOTTOM_WIDTH, ROAD_LEFT_X, ROAD_RIGHT_X, ROAD_TOP_WIDTH, SCREEN_CENTER_X,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::sim::{ObstacleSnapshot, VehicleSnapshot, WorldSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

pub const BACKGROUND: Color = Color::rgb(0xE0, 0xD0, 0x92);
pub const ROAD: Color = Color::rgb(0x50, 0x4E, 0x4E);
pub const LANE_LINE: Color = Color::rgb(0xD3, 0xD3, 0xD3);
pub const SHADOW: Color = Color::rgba(0, 0, 0, 0.4);
pub const TEXT: Color = Color::rgb(0, 0, 0);
pub const OVERLAY: Color = Color::rgb(0, 0, 0);
pub const OVERLAY_TEXT: Color = Color::rgb(0xFF, 0xFF, 0xFF);

pub const HUD_FONT_SIZE: f32 = 30.0;
pub const GAME_OVER_FONT_SIZE: f32 = 40.0;
pub const GAME_OVER_RADIUS: f32 = 200.0;
pub const BOOM_SIZE: f32 = 150.0;
const CENTER_DASH: (f32, f32) = (30.0, 15.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sprite {
    Vehicle,
    Obstacle,
    Boom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    FillPolygon {
        points: Vec<(f32, f32)>,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        dash: Option<(f32, f32)>,
        color: Color,
    },
    FillEllipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        color: Color,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Sprite {
        sprite: Sprite,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        align: TextAlign,
        color: Color,
    },
}

/// Player-facing text that does not come from the simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub player_name: Option<String>,
    pub high_score: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub game_over_overlay: bool,
}

impl Scene {
    pub fn texts(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn sprites(&self, wanted: Sprite) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Sprite { sprite, .. } if *sprite == wanted))
            .count()
    }
}

pub fn render(world: &WorldSnapshot, hud: &Hud) -> Scene {
    let mut commands = Vec::with_capacity(24);

    commands.push(DrawCommand::FillRect {
        x: 0.0,
        y: 0.0,
        width: SCREEN_WIDTH,
        height: SCREEN_HEIGHT,
        color: BACKGROUND,
    });
    push_road(&mut commands, world.lane_marking_offset);

    commands.push(hud_text(format!("Score: {}", world.score), 20.0, TextAlign::Right));
    commands.push(hud_text(format!("Hits: {}", world.hit_count), 60.0, TextAlign::Right));

    if world.stream_started {
        commands.extend(world.obstacles.iter().map(|obstacle| DrawCommand::Sprite {
            sprite: Sprite::Obstacle,
            x: obstacle.x,
            y: obstacle.y,
            width: obstacle.width,
            height: obstacle.height,
        }));
    }

    if world.effect_visible {
        for obstacle in &world.obstacles {
            commands.push(boom(&world.vehicle, obstacle));
        }
    }

    push_vehicle(&mut commands, &world.vehicle);

    if let Some(name) = &hud.player_name {
        commands.push(hud_text(format!("Player: {name}"), 20.0, TextAlign::Left));
    }
    let high_score = hud
        .high_score
        .map_or_else(|| "--".to_string(), |score| score.to_string());
    commands.push(hud_text(format!("High Score:{high_score}"), 60.0, TextAlign::Left));

    if world.is_game_over {
        push_game_over(&mut commands, world.score);
    }

    Scene {
        commands,
        game_over_overlay: world.is_game_over,
    }
}

fn push_road(commands: &mut Vec<DrawCommand>, marking_offset: f32) {
    commands.push(DrawCommand::FillPolygon {
        points: vec![
            (ROAD_LEFT_X, SCREEN_HEIGHT),
            (ROAD_RIGHT_X, SCREEN_HEIGHT),
            ((SCREEN_WIDTH + ROAD_TOP_WIDTH) / 2.0, 0.0),
            ((SCREEN_WIDTH - ROAD_TOP_WIDTH) / 2.0, 0.0),
        ],
        color: ROAD,
    });

    commands.push(DrawCommand::Line {
        from: (SCREEN_CENTER_X, SCREEN_HEIGHT + marking_offset),
        to: (SCREEN_CENTER_X, marking_offset - SCREEN_HEIGHT),
        width: 10.0,
        dash: Some(CENTER_DASH),
        color: LANE_LINE,
    });

    // Hand-tuned to sit between the lanes on the trapezoid.
    commands.push(DrawCommand::Line {
        from: (SCREEN_WIDTH / 4.0 + 50.0, SCREEN_HEIGHT),
        to: (SCREEN_CENTER_X - 27.0, 0.0),
        width: 5.0,
        dash: None,
        color: LANE_LINE,
    });
    commands.push(DrawCommand::Line {
        from: (
            (SCREEN_WIDTH + ROAD_BOTTOM_WIDTH) / 1.8 - LANE_WIDTH - 45.0,
            SCREEN_HEIGHT,
        ),
        to: ((SCREEN_WIDTH + ROAD_TOP_WIDTH) / 1.5 + 60.0 - LANE_WIDTH, 0.0),
        width: 5.0,
        dash: None,
        color: LANE_LINE,
    });
}

fn push_vehicle(commands: &mut Vec<DrawCommand>, vehicle: &VehicleSnapshot) {
    commands.push(DrawCommand::FillEllipse {
        cx: vehicle.x + vehicle.width / 2.0,
        cy: vehicle.y + vehicle.height - 80.0,
        rx: vehicle.width / 2.8,
        ry: vehicle.height / 8.0,
        color: SHADOW,
    });
    commands.push(DrawCommand::Sprite {
        sprite: Sprite::Vehicle,
        x: vehicle.x,
        y: vehicle.y,
        width: vehicle.width,
        height: vehicle.height,
    });
}

/// Boom sprite biased toward the side of the vehicle nearest `obstacle`.
fn boom(vehicle: &VehicleSnapshot, obstacle: &ObstacleSnapshot) -> DrawCommand {
    let offset = (vehicle.x + vehicle.width / 2.0) - (obstacle.x + obstacle.width / 2.0);
    let shift = if offset > -10.0 && offset < 10.0 {
        60.0
    } else if offset > 20.0 {
        0.0
    } else {
        120.0
    };

    DrawCommand::Sprite {
        sprite: Sprite::Boom,
        x: vehicle.x + shift,
        y: vehicle.y - 2.0,
        width: BOOM_SIZE,
        height: BOOM_SIZE,
    }
}

fn push_game_over(commands: &mut Vec<DrawCommand>, score: u32) {
    let cy = SCREEN_HEIGHT / 2.0;
    commands.push(DrawCommand::FillCircle {
        cx: SCREEN_CENTER_X,
        cy,
        radius: GAME_OVER_RADIUS,
        color: OVERLAY,
    });
    commands.push(DrawCommand::Text {
        text: "Game Over".to_string(),
        x: SCREEN_CENTER_X,
        y: cy - 50.0,
        size: GAME_OVER_FONT_SIZE,
        align: TextAlign::Center,
        color: OVERLAY_TEXT,
    });
    commands.push(DrawCommand::Text {
        text: format!("Score: {score}"),
        x: SCREEN_CENTER_X,
        y: cy + 20.0,
        size: HUD_FONT_SIZE,
        align: TextAlign::Center,
        color: OVERLAY_TEXT,
    });
}

fn hud_text(text: String, y: f32, align: TextAlign) -> DrawCommand {
    let x = match align {
        TextAlign::Right => SCREEN_WIDTH - 20.0,
        TextAlign::Left | TextAlign::Center => 20.0,
    };
    DrawCommand::Text {
        text,
        x,
        y,
        size: HUD_FONT_SIZE,
        align,
        color: TEXT,
    }
}
