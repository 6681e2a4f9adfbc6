mod base;
mod bbox;
mod correlation;
mod factory;
mod kalman;

pub use base::Tracker;
pub use bbox::BoundingBox;
pub use correlation::{CorrelationProfile, CorrelationTracker};
pub use factory::{TrackerKind, UnsupportedTracker, create_tracker};
pub use kalman::KalmanTracker;
