use core::fmt;

use crate::ride::Milestone;
use crate::sim::ReplayResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    HitCountCap,
    ScoreGranularity,
    ScoreDelta,
    HitCountDelta,
    GameOverReverted,
    VehicleSizeFloor,
    LaneMarkingRange,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HitCountCap => write!(f, "HIT_COUNT_CAP"),
            Self::ScoreGranularity => write!(f, "SCORE_GRANULARITY"),
            Self::ScoreDelta => write!(f, "SCORE_DELTA"),
            Self::HitCountDelta => write!(f, "HIT_COUNT_DELTA"),
            Self::GameOverReverted => write!(f, "GAME_OVER_REVERTED"),
            Self::VehicleSizeFloor => write!(f, "VEHICLE_SIZE_FLOOR"),
            Self::LaneMarkingRange => write!(f, "LANE_MARKING_RANGE"),
        }
    }
}

impl std::error::Error for RuleCode {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RideError {
    Malformed(String),
    UnsupportedFormat { found: u32 },
    EmptyInputRun { index: usize },
    ReservedInputBits { frame: u32, byte: u8 },
    FrameCountOutOfRange { frame_count: u64, max_frames: u32 },
    RuleViolation { frame: u32, rule: RuleCode },
    MilestoneMismatch {
        index: usize,
        claimed: Option<Milestone>,
        computed: Option<Milestone>,
    },
    ResultMismatch {
        claimed: ReplayResult,
        computed: ReplayResult,
    },
}

impl fmt::Display for RideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed ride log: {reason}"),
            Self::UnsupportedFormat { found } => write!(f, "unsupported ride log format: {found}"),
            Self::EmptyInputRun { index } => write!(f, "input run {index} holds no frames"),
            Self::ReservedInputBits { frame, byte } => write!(
                f,
                "input byte reserved bits set at frame {frame}: 0x{byte:02x}"
            ),
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::RuleViolation { frame, rule } => {
                write!(f, "rule violation at frame {frame}: {rule}")
            }
            Self::MilestoneMismatch {
                index,
                claimed,
                computed,
            } => write!(
                f,
                "milestone {index} differs: logged {claimed:?}, replayed {computed:?}"
            ),
            Self::ResultMismatch { claimed, computed } => write!(
                f,
                "final result differs: logged score={} hits={} frames={}, replayed score={} hits={} frames={}",
                claimed.final_score,
                claimed.final_hit_count,
                claimed.frame_count,
                computed.final_score,
                computed.final_hit_count,
                computed.frame_count
            ),
        }
    }
}

impl std::error::Error for RideError {}
