//! Per-frame outcomes and the aggregated result of a pipeline run.

use std::time::{Duration, Instant};

use crate::tracker::BoundingBox;

/// Which stage resolved a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// The detector located the ball on this frame.
    Detection,
    /// The active tracker carried the ball forward.
    Tracking,
    /// Neither stage produced a location.
    Miss,
}

/// The resolved outcome of one frame, as seen by run observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Zero-based index of the frame in the stream.
    pub frame_index: u64,
    /// Stage that resolved the frame.
    pub source: OutcomeSource,
    /// Resolved ball location, `None` on a miss.
    pub bbox: Option<BoundingBox>,
}

/// Aggregated result of processing one stream with one tracker kind.
///
/// The two histories are frame-aligned: entry `i` belongs to frame `i`, and
/// both always have [`frame_count`](Self::frame_count) entries. A frame can
/// appear in both when the detector overrode a successful tracker update;
/// those entries are what [`crate::evaluate`] compares.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Descriptor of the input stream.
    pub input: String,
    /// Descriptor of the annotated output, when one was written.
    pub output: Option<String>,
    /// Configuration tag of the tracker that ran.
    pub tracker_kind: String,
    /// Declared frame rate of the input stream.
    pub input_fps: f64,
    /// Number of frames processed.
    pub frame_count: u64,
    /// Wall-clock time spent processing.
    pub processing_time: Duration,
    /// Frames resolved by the detector.
    pub detected_frame_count: u64,
    /// Frames resolved by the tracker.
    pub tracked_frame_count: u64,
    /// Tracker updates that failed to locate the ball.
    pub tracking_missed_count: u64,
    /// Detector output per frame, `None` where the detector did not run or
    /// found nothing.
    pub detected_bbox_history: Vec<Option<BoundingBox>>,
    /// Tracker output per frame, `None` where the tracker did not run or
    /// missed.
    pub tracked_bbox_history: Vec<Option<BoundingBox>>,
}

impl ProcessResult {
    /// Effective processing throughput in frames per second.
    ///
    /// Returns `0.0` when the measured wall time is zero.
    pub fn output_fps(&self) -> f64 {
        let secs = self.processing_time.as_secs_f64();
        if secs > 0.0 {
            self.frame_count as f64 / secs
        } else {
            0.0
        }
    }
}

/// Accumulates outcomes while a run is in flight.
pub(crate) struct OutcomeRecorder {
    started: Instant,
    detected: Vec<Option<BoundingBox>>,
    tracked: Vec<Option<BoundingBox>>,
    detected_frames: u64,
    tracked_frames: u64,
    missed_updates: u64,
}

impl OutcomeRecorder {
    pub(crate) fn new(frame_count_hint: Option<u64>) -> Self {
        let capacity = frame_count_hint.unwrap_or(0) as usize;
        OutcomeRecorder {
            started: Instant::now(),
            detected: Vec::with_capacity(capacity),
            tracked: Vec::with_capacity(capacity),
            detected_frames: 0,
            tracked_frames: 0,
            missed_updates: 0,
        }
    }

    /// Append one frame to both histories and bump the resolved-source
    /// counter. Must be called exactly once per frame, in frame order.
    pub(crate) fn record(
        &mut self,
        outcome: &FrameOutcome,
        detected: Option<BoundingBox>,
        tracked: Option<BoundingBox>,
    ) {
        debug_assert_eq!(self.detected.len() as u64, outcome.frame_index);
        self.detected.push(detected);
        self.tracked.push(tracked);
        match outcome.source {
            OutcomeSource::Detection => self.detected_frames += 1,
            OutcomeSource::Tracking => self.tracked_frames += 1,
            OutcomeSource::Miss => {}
        }
    }

    /// Fold a batch of consecutive tracker-update failures into the missed
    /// counter.
    pub(crate) fn fold_misses(&mut self, count: u32) {
        self.missed_updates += u64::from(count);
    }

    pub(crate) fn finish(
        self,
        input: String,
        output: Option<String>,
        tracker_kind: String,
        input_fps: f64,
    ) -> ProcessResult {
        debug_assert_eq!(self.detected.len(), self.tracked.len());
        ProcessResult {
            input,
            output,
            tracker_kind,
            input_fps,
            frame_count: self.detected.len() as u64,
            processing_time: self.started.elapsed(),
            detected_frame_count: self.detected_frames,
            tracked_frame_count: self.tracked_frames,
            tracking_missed_count: self.missed_updates,
            detected_bbox_history: self.detected,
            tracked_bbox_history: self.tracked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(frame_index: u64, source: OutcomeSource, bbox: Option<BoundingBox>) -> FrameOutcome {
        FrameOutcome {
            frame_index,
            source,
            bbox,
        }
    }

    #[test]
    fn test_recorder_aligns_histories_and_counters() {
        let bbox = BoundingBox::new(10, 10, 20, 20);
        let mut recorder = OutcomeRecorder::new(Some(4));

        recorder.record(
            &outcome(0, OutcomeSource::Detection, Some(bbox)),
            Some(bbox),
            None,
        );
        recorder.record(
            &outcome(1, OutcomeSource::Tracking, Some(bbox)),
            None,
            Some(bbox),
        );
        recorder.record(&outcome(2, OutcomeSource::Miss, None), None, None);
        // Detector override of a successful update lands in both histories.
        recorder.record(
            &outcome(3, OutcomeSource::Detection, Some(bbox)),
            Some(bbox),
            Some(bbox),
        );
        recorder.fold_misses(1);

        let result = recorder.finish("mem:test".to_string(), None, "kalman".to_string(), 30.0);

        assert_eq!(result.frame_count, 4);
        assert_eq!(result.detected_frame_count, 2);
        assert_eq!(result.tracked_frame_count, 1);
        assert_eq!(result.tracking_missed_count, 1);
        assert_eq!(result.detected_bbox_history.len(), 4);
        assert_eq!(result.tracked_bbox_history.len(), 4);
        assert_eq!(result.detected_bbox_history[1], None);
        assert_eq!(result.tracked_bbox_history[3], Some(bbox));
    }

    #[test]
    fn test_output_fps() {
        let mut result = OutcomeRecorder::new(None).finish(
            "mem:test".to_string(),
            None,
            "ncc-fast".to_string(),
            30.0,
        );
        result.frame_count = 30;
        result.processing_time = Duration::from_millis(500);
        assert!((result.output_fps() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_fps_zero_duration() {
        let mut result = OutcomeRecorder::new(None).finish(
            "mem:test".to_string(),
            None,
            "ncc-fast".to_string(),
            30.0,
        );
        result.processing_time = Duration::ZERO;
        assert_eq!(result.output_fps(), 0.0);
    }
}
