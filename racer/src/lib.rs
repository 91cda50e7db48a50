pub mod autopilot;
pub mod client;
pub mod driver;
pub mod profile;
pub mod runner;
pub mod surface;

pub use client::{HttpScoreClient, Registration, ScoreService};
pub use driver::{Driver, FrameReport};
pub use profile::ProfileCache;
