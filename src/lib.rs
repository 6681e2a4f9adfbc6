//! Detect-and-track pipeline for single-ball localisation in video.
//!
//! A [`TrackingPipeline`] alternates between an expensive, accurate detector
//! and a cheap frame-to-frame tracker, re-detecting on a fixed schedule or
//! as soon as the tracker loses the ball; [`evaluate`] scores the shipped
//! tracker variants against the detector over the same footage.
//!
//! # Example
//!
//! ```ignore
//! use balltrack_rs::{PipelineConfig, TrackingPipeline};
//!
//! let mut pipeline = TrackingPipeline::new(my_detector, PipelineConfig::default());
//! let result = pipeline.run(&mut source)?;
//! println!(
//!     "tracked {} of {} frames",
//!     result.tracked_frame_count, result.frame_count
//! );
//! ```

pub mod detect;
pub mod evaluate;
pub mod pipeline;
pub mod tracker;
pub mod video;

pub use detect::{BallDetector, CandidateModel, RawCandidate};
pub use evaluate::{EvaluationReport, evaluate_all, evaluate_tracker};
pub use pipeline::{
    Detection, Detector, FrameOutcome, OutcomeSource, PipelineConfig, PipelineError,
    ProcessResult, ReacquirePolicy, TrackingPipeline,
};
pub use tracker::{BoundingBox, Tracker, TrackerKind, create_tracker};
pub use video::{BufferSink, BufferSource, Frame, FrameSink, FrameSource, VideoError};
