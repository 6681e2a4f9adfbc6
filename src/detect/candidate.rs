//! Raw model outputs and the inference seam.

use crate::video::Frame;

/// One raw model output row, before any filtering.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// Box as `[cx, cy, w, h]`, normalized to `[0, 1]` over the frame.
    pub bbox: [f32; 4],
    /// Objectness score in `[0, 1]`.
    pub objectness: f32,
    /// Per-class scores, indexed by class id.
    pub class_scores: Vec<f32>,
}

/// Trait for candidate-producing inference backends.
///
/// Implement this for your model runtime; [`BallDetector`] applies the
/// filtering contract on top of whatever it emits.
///
/// [`BallDetector`]: crate::detect::BallDetector
pub trait CandidateModel: Send + Sync {
    /// Error type for inference failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one forward pass and return every raw candidate.
    fn forward(&self, frame: &Frame) -> Result<Vec<RawCandidate>, Self::Error>;
}
