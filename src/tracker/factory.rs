//! Tracker selection: configuration tags to concrete variants.

use std::fmt;

use log::{info, warn};

use crate::tracker::base::Tracker;
use crate::tracker::bbox::BoundingBox;
use crate::tracker::correlation::CorrelationTracker;
use crate::tracker::kalman::KalmanTracker;
use crate::video::Frame;

/// The tracker variants this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerKind {
    /// Correlation search, fast profile
    NccFast,
    /// Correlation search, precise profile
    NccPrecise,
    /// Predictive constant-velocity motion model
    Kalman,
}

impl TrackerKind {
    /// Every selectable kind, in evaluation order.
    pub const ALL: [TrackerKind; 3] = [
        TrackerKind::NccFast,
        TrackerKind::NccPrecise,
        TrackerKind::Kalman,
    ];

    /// Stable configuration tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            TrackerKind::NccFast => "ncc-fast",
            TrackerKind::NccPrecise => "ncc-precise",
            TrackerKind::Kalman => "kalman",
        }
    }

    /// Parse a configuration tag.
    pub fn from_tag(tag: &str) -> Option<TrackerKind> {
        TrackerKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Construct the tracker selected by `tag`.
///
/// Unrecognized tags log a warning and fall back to [`UnsupportedTracker`],
/// whose updates never succeed: a misconfigured run stays visibly broken
/// instead of silently tracking with some default kind.
pub fn create_tracker(tag: &str) -> Box<dyn Tracker> {
    match TrackerKind::from_tag(tag) {
        Some(TrackerKind::NccFast) => {
            info!("using ncc-fast tracker");
            Box::new(CorrelationTracker::fast())
        }
        Some(TrackerKind::NccPrecise) => {
            info!("using ncc-precise tracker");
            Box::new(CorrelationTracker::precise())
        }
        Some(TrackerKind::Kalman) => {
            info!("using kalman tracker");
            Box::new(KalmanTracker::new())
        }
        None => {
            warn!("unknown tracker kind {tag:?}, selecting the unsupported stub");
            Box::new(UnsupportedTracker)
        }
    }
}

/// Stub selected for unrecognized tracker kinds.
///
/// Satisfies the contract while refusing to work: `init` (and therefore the
/// default `correct`) only logs the refusal, `update` always misses.
#[derive(Debug, Default)]
pub struct UnsupportedTracker;

impl Tracker for UnsupportedTracker {
    fn init(&mut self, _frame: &Frame, _bbox: BoundingBox, _frame_rate: f64) {
        warn!("unsupported tracker kind cannot be initialised");
    }

    fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
        None
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}
