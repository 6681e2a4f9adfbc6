//! Serializable evaluation reports.

use serde::Serialize;

/// Agreement metrics for one tracker kind over one input.
///
/// This is the system's structured external payload; `None` means serialize
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Factory tag of the evaluated tracker.
    pub tracker_kind: String,
    /// Descriptor of the input stream.
    pub input_path: String,
    /// Declared frame rate of the input.
    pub input_fps: f64,
    /// Processing throughput of the evaluation run.
    pub output_fps: f64,
    /// Mean IoU over qualifying frame pairs; `None` when no frame carried
    /// both a detection and a tracking estimate.
    pub mean_iou: Option<f64>,
    /// Mean centroid distance over qualifying pairs; `None` when undefined.
    pub mean_distance: Option<f64>,
}
