mod ball;
mod candidate;

pub use ball::{
    BALL_CLASS_ID, BallDetector, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_NMS_THRESHOLD,
    DEFAULT_OBJECTNESS_THRESHOLD,
};
pub use candidate::{CandidateModel, RawCandidate};
