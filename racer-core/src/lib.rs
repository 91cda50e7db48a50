pub mod constants;
pub mod error;
pub mod input;
pub mod render;
pub mod ride;
pub mod rng;
pub mod schedule;
pub mod sim;

pub use error::{RideError, RuleCode};
pub use input::{FrameInput, InputSampler, Key};
pub use render::{render, Hud, Scene};
pub use ride::{verify_ride, RideLog, RideSummary};
pub use schedule::FixedStep;
pub use sim::{Session, SessionEvent, WorldSnapshot};
