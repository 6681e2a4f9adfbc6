//! Pipeline module combining ball detection with frame-to-frame tracking.
//!
//! This module provides the controller that schedules detect vs. track per
//! frame, the detector seam it drives, and the aggregated run results.

mod controller;
mod detector;
mod report;

pub use controller::{PipelineConfig, PipelineError, ReacquirePolicy, TrackingPipeline};
pub use detector::{Detection, Detector};
pub use report::{FrameOutcome, OutcomeSource, ProcessResult};
