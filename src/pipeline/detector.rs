//! Trait for ball detection inference backends.

use crate::tracker::BoundingBox;
use crate::video::Frame;

/// A single ball candidate produced by a [`Detector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Location of the ball in pixel coordinates.
    pub bbox: BoundingBox,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32) -> Self {
        Detection { bbox, score }
    }
}

/// Trait for ball detection inference backends.
///
/// Implement this trait to connect any detection model to the pipeline. The
/// pipeline treats `Ok(None)` as "no ball visible in this frame" and keeps
/// going; `Err` aborts the run.
///
/// # Example
///
/// ```ignore
/// use balltrack_rs::{Detection, Detector, Frame};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Self::Error> {
///         // Run inference and return the best ball candidate
///         Ok(None)
///     }
/// }
/// ```
pub trait Detector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on one frame and return the best ball candidate.
    ///
    /// # Arguments
    /// * `frame` - Decoded RGB frame
    ///
    /// # Returns
    /// The highest-confidence ball, `None` when the frame has no ball, or an
    /// error when inference itself failed.
    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Self::Error>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    type Error = D::Error;

    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Self::Error> {
        (**self).detect(frame)
    }
}
