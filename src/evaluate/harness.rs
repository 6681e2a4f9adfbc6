//! Evaluation harness scoring trackers against the detector.

use log::info;

use crate::evaluate::report::EvaluationReport;
use crate::pipeline::{Detector, PipelineConfig, PipelineError, ProcessResult, TrackingPipeline};
use crate::tracker::TrackerKind;
use crate::video::{FrameSource, VideoError};

/// Run the pipeline over `source` with the tracker pinned by `config` and
/// score its agreement with the detector.
pub fn evaluate_tracker<D, S>(
    detector: &mut D,
    source: &mut S,
    config: PipelineConfig,
) -> Result<EvaluationReport, PipelineError>
where
    D: Detector,
    S: FrameSource,
{
    let mut pipeline = TrackingPipeline::new(detector, config);
    let result = pipeline.run(source)?;
    Ok(report_from(&result))
}

/// Evaluate each of `kinds` independently against the identical input.
///
/// `open_source` is called once per kind so every run reads the stream from
/// the start; runs share nothing but the detector. Reports come back in the
/// order of `kinds`.
pub fn evaluate_all<D, S, F>(
    detector: &mut D,
    kinds: &[TrackerKind],
    mut open_source: F,
    config: &PipelineConfig,
) -> Result<Vec<EvaluationReport>, PipelineError>
where
    D: Detector,
    S: FrameSource,
    F: FnMut() -> Result<S, VideoError>,
{
    info!("evaluating {} tracker kinds", kinds.len());
    let mut reports = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let mut source = open_source()?;
        let run_config = PipelineConfig {
            tracker_kind: kind.tag().to_string(),
            ..config.clone()
        };
        reports.push(evaluate_tracker(detector, &mut source, run_config)?);
    }
    Ok(reports)
}

/// Score a finished run by pairing its detection and tracking histories.
///
/// Only frames where both histories carry a box qualify; with no qualifying
/// pair the means are `None`.
pub fn report_from(result: &ProcessResult) -> EvaluationReport {
    let mut ious = Vec::new();
    let mut distances = Vec::new();
    for (detected, tracked) in result
        .detected_bbox_history
        .iter()
        .zip(&result.tracked_bbox_history)
    {
        let (Some(detected), Some(tracked)) = (detected, tracked) else {
            continue;
        };
        ious.push(detected.iou(tracked));
        distances.push(detected.center_distance(tracked));
    }

    EvaluationReport {
        tracker_kind: result.tracker_kind.clone(),
        input_path: result.input.clone(),
        input_fps: result.input_fps,
        output_fps: result.output_fps(),
        mean_iou: mean(&ious),
        mean_distance: mean(&distances),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
