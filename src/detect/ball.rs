//! Ball detector resolving raw model candidates to a single box.
//!
//! # Example
//!
//! ```ignore
//! use balltrack_rs::{BallDetector, CandidateModel, RawCandidate};
//!
//! struct MyYoloModel { /* ... */ }
//!
//! impl CandidateModel for MyYoloModel {
//!     type Error = std::io::Error;
//!
//!     fn forward(&self, frame: &Frame) -> Result<Vec<RawCandidate>, Self::Error> {
//!         // Run inference and return every output row
//!     }
//! }
//!
//! let detector = BallDetector::new(MyYoloModel::load("model.bin")?)
//!     .with_confidence_threshold(0.6);
//! ```

use log::debug;

use crate::detect::candidate::{CandidateModel, RawCandidate};
use crate::pipeline::{Detection, Detector};
use crate::tracker::BoundingBox;
use crate::video::Frame;

/// Raw candidates below this objectness score are dropped outright.
pub const DEFAULT_OBJECTNESS_THRESHOLD: f32 = 0.5;
/// Class-score floor applied on the multi-candidate path.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
/// Overlap above this IoU suppresses the lower-scored box.
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.4;
/// "sports ball" in COCO class ordering.
pub const BALL_CLASS_ID: usize = 32;

/// Resolves raw candidates from a [`CandidateModel`] into at most one ball.
///
/// Candidates pass the objectness filter and the class-of-interest check
/// first. If exactly one candidate survives those, it is returned directly,
/// skipping the confidence floor and non-max suppression; otherwise the
/// survivors are filtered by confidence and collapsed by greedy NMS, and the
/// top-scored box wins.
pub struct BallDetector<M: CandidateModel> {
    model: M,
    objectness_threshold: f32,
    confidence_threshold: f32,
    nms_threshold: f32,
    class_id: usize,
}

impl<M: CandidateModel> BallDetector<M> {
    /// Create a detector over `model` with the default thresholds.
    pub fn new(model: M) -> Self {
        Self {
            model,
            objectness_threshold: DEFAULT_OBJECTNESS_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            class_id: BALL_CLASS_ID,
        }
    }

    /// Set the objectness threshold for the raw-candidate filter.
    pub fn with_objectness_threshold(mut self, threshold: f32) -> Self {
        self.objectness_threshold = threshold;
        self
    }

    /// Set the confidence threshold for the multi-candidate path.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the IoU threshold for non-max suppression.
    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_threshold = threshold;
        self
    }

    /// Track a different class of interest than the sports ball.
    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Apply the resolution contract to one batch of raw candidates.
    fn resolve(&self, frame: &Frame, candidates: Vec<RawCandidate>) -> Option<Detection> {
        let mut scored = Vec::new();
        for candidate in &candidates {
            if candidate.objectness <= self.objectness_threshold {
                continue;
            }
            let Some((class_id, score)) = argmax(&candidate.class_scores) else {
                continue;
            };
            if class_id != self.class_id {
                continue;
            }
            let bbox = to_pixels(candidate.bbox, frame.width, frame.height);
            scored.push(Detection::new(bbox, score));
        }

        if scored.is_empty() {
            return None;
        }
        if scored.len() == 1 {
            // A lone candidate skips the confidence floor and suppression.
            debug!(
                "single candidate at {:?} (score {:.2}) returned unfiltered",
                scored[0].bbox, scored[0].score
            );
            return Some(scored[0]);
        }

        let survivors = nms(&scored, self.confidence_threshold, self.nms_threshold);
        survivors.first().copied()
    }
}

impl<M: CandidateModel> Detector for BallDetector<M> {
    type Error = M::Error;

    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>, Self::Error> {
        let candidates = self.model.forward(frame)?;
        Ok(self.resolve(frame, candidates))
    }
}

/// Index and value of the highest class score, first occurrence on ties.
fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        let better = match best {
            Some((_, top)) => score > top,
            None => true,
        };
        if better {
            best = Some((index, score));
        }
    }
    best
}

/// Scale a normalized `[cx, cy, w, h]` box to integer pixel coordinates.
fn to_pixels(bbox: [f32; 4], width: u32, height: u32) -> BoundingBox {
    let center_x = (bbox[0] * width as f32) as i32;
    let center_y = (bbox[1] * height as f32) as i32;
    let box_width = (bbox[2] * width as f32) as i32;
    let box_height = (bbox[3] * height as f32) as i32;
    BoundingBox::from_center(
        f64::from(center_x),
        f64::from(center_y),
        box_width,
        box_height,
    )
}

/// Greedy non-max suppression, highest score first.
fn nms(detections: &[Detection], score_threshold: f32, nms_threshold: f32) -> Vec<Detection> {
    let mut ordered: Vec<Detection> = detections
        .iter()
        .filter(|d| d.score > score_threshold)
        .copied()
        .collect();
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::new();
    for detection in ordered {
        let suppressed = kept
            .iter()
            .any(|k| k.bbox.iou(&detection.bbox) > f64::from(nms_threshold));
        if !suppressed {
            kept.push(detection);
        }
    }
    kept
}
