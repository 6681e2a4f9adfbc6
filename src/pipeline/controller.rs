//! Frame-by-frame controller deciding detect vs. track.

use log::{debug, info};
use thiserror::Error;

use crate::pipeline::detector::Detector;
use crate::pipeline::report::{FrameOutcome, OutcomeRecorder, OutcomeSource, ProcessResult};
use crate::tracker::{BoundingBox, Tracker, create_tracker};
use crate::video::{Frame, FrameSink, FrameSource, VideoError, with_banner};

/// Configuration for a [`TrackingPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Every `detection_interval`-th frame forces a detector pass.
    pub detection_interval: u64,
    /// Consecutive tracker misses that force a recovery detection.
    pub miss_threshold: u32,
    /// Factory tag of the tracker variant to run.
    pub tracker_kind: String,
    /// Time base handed to trackers when no stream rate is known.
    pub frame_rate: f64,
    /// What a successful detection does to an active tracker.
    pub reacquire: ReacquirePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection_interval: 10,
            miss_threshold: 5,
            tracker_kind: "ncc-fast".to_string(),
            frame_rate: 30.0,
            reacquire: ReacquirePolicy::default(),
        }
    }
}

/// How the controller hands a successful detection to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReacquirePolicy {
    /// Replace the active tracker with a freshly initialized one.
    #[default]
    Replace,
    /// Feed the detection to the active tracker's `correct` capability,
    /// keeping whatever state it has built up. Variants without a true
    /// correction reinitialize in place.
    Correct,
}

/// Error type for pipeline run failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input stream yielded no frames at all.
    #[error("input {0} yielded no frames")]
    EmptyInput(String),
    /// Reading from the source or writing to the sink failed.
    #[error(transparent)]
    Source(#[from] VideoError),
    /// A detector invocation could not be completed.
    #[error("detection failed: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),
}

enum TrackState {
    NoTracker,
    Tracking(Box<dyn Tracker>),
}

struct StepRecord {
    outcome: FrameOutcome,
    detected: Option<BoundingBox>,
    tracked: Option<BoundingBox>,
    folded_misses: u32,
}

/// The detect-vs-track state machine.
///
/// Owns the active tracker instance and the miss counter; the detector is any
/// [`Detector`] implementation. Frames are processed strictly in order, one
/// at a time.
pub struct TrackingPipeline<D: Detector> {
    detector: D,
    config: PipelineConfig,
    state: TrackState,
    frame_index: u64,
    miss_count: u32,
    frame_rate: f64,
}

impl<D: Detector> TrackingPipeline<D> {
    /// Create a pipeline with the given detector and configuration.
    pub fn new(detector: D, config: PipelineConfig) -> Self {
        debug_assert!(config.detection_interval > 0);
        debug_assert!(config.miss_threshold > 0);
        debug_assert!(config.frame_rate > 0.0);
        Self {
            detector,
            frame_rate: config.frame_rate,
            config,
            state: TrackState::NoTracker,
            frame_index: 0,
            miss_count: 0,
        }
    }

    /// Create a pipeline with the default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, PipelineConfig::default())
    }

    /// Drop the active tracker and rewind the frame counter.
    pub fn reset(&mut self) {
        self.state = TrackState::NoTracker;
        self.frame_index = 0;
        self.miss_count = 0;
        self.frame_rate = self.config.frame_rate;
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether a tracker instance is currently active.
    pub fn has_active_tracker(&self) -> bool {
        matches!(self.state, TrackState::Tracking(_))
    }

    /// Process a single frame and return its resolved outcome.
    ///
    /// Drives the state machine one step; use the `run*` methods to process a
    /// whole stream and collect the aggregate [`ProcessResult`].
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, PipelineError> {
        Ok(self.step(frame)?.outcome)
    }

    /// Process every frame of `source` and aggregate the outcomes.
    ///
    /// Starts from a clean state. A source that yields zero frames is fatal.
    pub fn run<S: FrameSource>(&mut self, source: &mut S) -> Result<ProcessResult, PipelineError> {
        self.run_inner(source, None, &mut |_, _| true)
    }

    /// Like [`run`](Self::run), invoking `observer` after each frame.
    ///
    /// The observer sees the frame and its resolved outcome; returning `false`
    /// stops the run early, still yielding the partial result for the frames
    /// processed so far.
    pub fn run_with<S, F>(
        &mut self,
        source: &mut S,
        mut observer: F,
    ) -> Result<ProcessResult, PipelineError>
    where
        S: FrameSource,
        F: FnMut(&Frame, &FrameOutcome) -> bool,
    {
        self.run_inner(source, None, &mut observer)
    }

    /// Like [`run`](Self::run), also writing each frame to `sink` with the
    /// annotation banner composed on top.
    pub fn run_to_sink<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<ProcessResult, PipelineError>
    where
        S: FrameSource,
        K: FrameSink,
    {
        self.run_inner(source, Some(sink as &mut dyn FrameSink), &mut |_, _| true)
    }

    fn run_inner<S: FrameSource>(
        &mut self,
        source: &mut S,
        mut sink: Option<&mut dyn FrameSink>,
        observer: &mut dyn FnMut(&Frame, &FrameOutcome) -> bool,
    ) -> Result<ProcessResult, PipelineError> {
        self.reset();
        if source.frame_rate() > 0.0 {
            self.frame_rate = source.frame_rate();
        }
        info!(
            "processing {} with {} tracker",
            source.descriptor(),
            self.config.tracker_kind
        );

        let output = sink.as_ref().map(|s| s.descriptor().to_string());
        let mut recorder = OutcomeRecorder::new(source.frame_count_hint());
        let mut frames = 0u64;

        while let Some(frame) = source.next_frame()? {
            let record = self.step(&frame)?;
            recorder.record(&record.outcome, record.detected, record.tracked);
            recorder.fold_misses(record.folded_misses);
            if let Some(sink) = sink.as_mut() {
                sink.write_frame(&with_banner(&frame))?;
            }
            frames += 1;
            if !observer(&frame, &record.outcome) {
                info!("run stopped early after frame {}", record.outcome.frame_index);
                break;
            }
        }

        if frames == 0 {
            return Err(PipelineError::EmptyInput(source.descriptor().to_string()));
        }

        // Misses with no later detection to fold them count at stream end.
        recorder.fold_misses(self.miss_count);
        self.miss_count = 0;

        let result = recorder.finish(
            source.descriptor().to_string(),
            output,
            self.config.tracker_kind.clone(),
            source.frame_rate(),
        );
        info!(
            "{}: {} frames ({} detected, {} tracked, {} missed updates) in {:?}",
            result.input,
            result.frame_count,
            result.detected_frame_count,
            result.tracked_frame_count,
            result.tracking_missed_count,
            result.processing_time
        );
        Ok(result)
    }

    fn step(&mut self, frame: &Frame) -> Result<StepRecord, PipelineError> {
        let index = self.frame_index;
        self.frame_index += 1;

        // Step 1: decide whether this frame forces a detection pass. The miss
        // count carried in from previous frames is what triggers recovery.
        let forced = index % self.config.detection_interval == 0
            || self.miss_count >= self.config.miss_threshold
            || matches!(self.state, TrackState::NoTracker);

        // Step 2: the active tracker sees every frame, so its history stays
        // comparable with the detector's on forced frames.
        let mut tracked = None;
        if let TrackState::Tracking(tracker) = &mut self.state {
            match tracker.update(frame) {
                Some(bbox) => {
                    self.miss_count = 0;
                    tracked = Some(bbox);
                }
                None => self.miss_count += 1,
            }
        }

        let mut detected = None;
        let mut folded_misses = 0;
        let (source, bbox) = if forced {
            // Step 3: the detector's verdict overrides any tracking estimate
            // computed above.
            let detection = self
                .detector
                .detect(frame)
                .map_err(|e| PipelineError::Detector(Box::new(e)))?;
            match detection {
                Some(detection) => {
                    debug!(
                        "frame {index}: ball detected at {:?} (score {:.2})",
                        detection.bbox, detection.score
                    );
                    folded_misses = self.miss_count;
                    self.miss_count = 0;
                    detected = Some(detection.bbox);
                    self.reacquire(frame, detection.bbox);
                    (OutcomeSource::Detection, Some(detection.bbox))
                }
                None => {
                    self.state = TrackState::NoTracker;
                    (OutcomeSource::Miss, None)
                }
            }
        } else {
            match tracked {
                Some(bbox) => (OutcomeSource::Tracking, Some(bbox)),
                None => (OutcomeSource::Miss, None),
            }
        };

        Ok(StepRecord {
            outcome: FrameOutcome {
                frame_index: index,
                source,
                bbox,
            },
            detected,
            tracked,
            folded_misses,
        })
    }

    fn reacquire(&mut self, frame: &Frame, bbox: BoundingBox) {
        if self.config.reacquire == ReacquirePolicy::Correct {
            if let TrackState::Tracking(tracker) = &mut self.state {
                tracker.correct(frame, bbox, self.frame_rate);
                return;
            }
        }
        let mut tracker = create_tracker(&self.config.tracker_kind);
        tracker.init(frame, bbox, self.frame_rate);
        self.state = TrackState::Tracking(tracker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::detector::Detection;
    use crate::video::{BufferSink, BufferSource, banner_height};

    struct MockDetector {
        detection: Option<Detection>,
        calls: u64,
    }

    impl MockDetector {
        fn always(bbox: BoundingBox) -> Self {
            MockDetector {
                detection: Some(Detection::new(bbox, 0.9)),
                calls: 0,
            }
        }

        fn never() -> Self {
            MockDetector {
                detection: None,
                calls: 0,
            }
        }
    }

    impl Detector for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: &Frame) -> Result<Option<Detection>, Self::Error> {
            self.calls += 1;
            Ok(self.detection)
        }
    }

    struct ScriptedDetector {
        script: Vec<Option<Detection>>,
        calls: usize,
    }

    impl Detector for ScriptedDetector {
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: &Frame) -> Result<Option<Detection>, Self::Error> {
            let response = self.script.get(self.calls).copied().flatten();
            self.calls += 1;
            Ok(response)
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        type Error = std::io::Error;

        fn detect(&mut self, _frame: &Frame) -> Result<Option<Detection>, Self::Error> {
            Err(std::io::Error::other("inference backend unavailable"))
        }
    }

    fn black_source(frames: usize) -> BufferSource {
        let frames = (0..frames).map(|_| Frame::black(64, 64)).collect();
        BufferSource::new("mem:clip", 30.0, frames)
    }

    fn config(kind: &str) -> PipelineConfig {
        PipelineConfig {
            tracker_kind: kind.to_string(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.detection_interval, 10);
        assert_eq!(config.miss_threshold, 5);
        assert_eq!(config.tracker_kind, "ncc-fast");
        assert_eq!(config.reacquire, ReacquirePolicy::Replace);
    }

    #[test]
    fn test_interval_schedule_and_counters() {
        // Predictive tracker never misses once seeded, so the detector runs
        // exactly on the periodic frames.
        let detector = MockDetector::always(BoundingBox::new(20, 20, 10, 10));
        let mut pipeline = TrackingPipeline::new(detector, config("kalman"));

        let mut sources = Vec::new();
        let result = pipeline
            .run_with(&mut black_source(30), |_, outcome| {
                sources.push((outcome.frame_index, outcome.source));
                true
            })
            .unwrap();

        assert_eq!(result.frame_count, 30);
        assert_eq!(result.detected_frame_count, 3);
        assert_eq!(result.tracked_frame_count, 27);
        assert_eq!(result.tracking_missed_count, 0);
        assert_eq!(pipeline.detector().calls, 3);

        let indices: Vec<u64> = sources.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (0..30).collect::<Vec<u64>>());
        for (index, source) in sources {
            if index % 10 == 0 {
                assert_eq!(source, OutcomeSource::Detection, "frame {index}");
            } else {
                assert_eq!(source, OutcomeSource::Tracking, "frame {index}");
            }
        }

        // Forced frames carry both a detector box and the tracker's estimate.
        assert!(result.detected_bbox_history[10].is_some());
        assert!(result.tracked_bbox_history[10].is_some());
        assert!(result.tracked_bbox_history[0].is_none());
        assert!(result.detected_bbox_history[5].is_none());
    }

    #[test]
    fn test_miss_threshold_forces_early_detection() {
        // Unknown kind selects the stub, which misses every frame, so the
        // schedule collapses to the miss threshold alone.
        let detector = MockDetector::always(BoundingBox::new(20, 20, 10, 10));
        let config = PipelineConfig {
            detection_interval: 100,
            tracker_kind: "definitely-not-a-tracker".to_string(),
            ..PipelineConfig::default()
        };
        let mut pipeline = TrackingPipeline::new(detector, config);

        let mut detection_frames = Vec::new();
        let result = pipeline
            .run_with(&mut black_source(30), |_, outcome| {
                if outcome.source == OutcomeSource::Detection {
                    detection_frames.push(outcome.frame_index);
                }
                true
            })
            .unwrap();

        // Five misses pending after each detection, so every sixth frame
        // re-detects; the update on the forced frame itself makes six.
        assert_eq!(detection_frames, vec![0, 6, 12, 18, 24]);
        assert_eq!(pipeline.detector().calls, 5);
        assert_eq!(result.detected_frame_count, 5);
        assert_eq!(result.tracked_frame_count, 0);
        assert_eq!(result.tracking_missed_count, 4 * 6 + 5);
    }

    #[test]
    fn test_detection_failure_drops_tracker() {
        let bbox = BoundingBox::new(20, 20, 10, 10);
        let detector = ScriptedDetector {
            script: vec![
                Some(Detection::new(bbox, 0.9)), // frame 0
                None,                            // frame 10
                Some(Detection::new(bbox, 0.9)), // frame 11 recovery
            ],
            calls: 0,
        };
        let mut pipeline = TrackingPipeline::new(detector, config("kalman"));

        let mut sources = Vec::new();
        let result = pipeline
            .run_with(&mut black_source(15), |_, outcome| {
                sources.push(outcome.source);
                true
            })
            .unwrap();

        assert_eq!(sources[10], OutcomeSource::Miss);
        assert_eq!(sources[11], OutcomeSource::Detection);
        assert_eq!(pipeline.detector().calls, 3);
        assert_eq!(result.detected_frame_count, 2);
        assert_eq!(result.tracked_frame_count, 12);
        // The tracker estimate from frame 10 survives in the history even
        // though the detector's verdict resolved the frame.
        assert!(result.tracked_bbox_history[10].is_some());
        assert!(pipeline.has_active_tracker());
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let mut pipeline =
            TrackingPipeline::new(MockDetector::never(), PipelineConfig::default());
        let mut source = BufferSource::new("mem:empty", 30.0, vec![]);

        match pipeline.run(&mut source) {
            Err(PipelineError::EmptyInput(descriptor)) => {
                assert_eq!(descriptor, "mem:empty");
            }
            other => panic!("expected EmptyInput, got {other:?}"),
        }
    }

    #[test]
    fn test_detector_failure_aborts_run() {
        let mut pipeline =
            TrackingPipeline::new(FailingDetector, PipelineConfig::default());
        let result = pipeline.run(&mut black_source(3));
        assert!(matches!(result, Err(PipelineError::Detector(_))));
    }

    #[test]
    fn test_observer_stops_run_early() {
        let detector = MockDetector::always(BoundingBox::new(20, 20, 10, 10));
        let mut pipeline = TrackingPipeline::new(detector, config("kalman"));

        let result = pipeline
            .run_with(&mut black_source(30), |_, outcome| outcome.frame_index < 9)
            .unwrap();

        assert_eq!(result.frame_count, 10);
        assert_eq!(result.detected_frame_count, 1);
        assert_eq!(result.tracked_frame_count, 9);
        assert_eq!(result.detected_bbox_history.len(), 10);
    }

    #[test]
    fn test_run_to_sink_adds_banner() {
        let detector = MockDetector::always(BoundingBox::new(20, 20, 10, 10));
        let mut pipeline = TrackingPipeline::new(detector, config("kalman"));
        let frames = (0..12).map(|_| Frame::black(64, 48)).collect();
        let mut source = BufferSource::new("mem:clip", 30.0, frames);
        let mut sink = BufferSink::new("mem:out");

        let result = pipeline.run_to_sink(&mut source, &mut sink).unwrap();

        assert_eq!(result.output.as_deref(), Some("mem:out"));
        assert_eq!(sink.frames().len(), 12);
        let banner = banner_height(48);
        for frame in sink.frames() {
            assert_eq!(frame.width, 64);
            assert_eq!(frame.height, 48 + banner);
        }
    }

    #[test]
    fn test_correct_policy_keeps_tracker_state() {
        let seed = BoundingBox::new(20, 20, 10, 10);
        let moved = BoundingBox::new(60, 20, 10, 10);
        let script = || ScriptedDetector {
            script: vec![Some(Detection::new(seed, 0.9)), Some(Detection::new(moved, 0.9))],
            calls: 0,
        };

        let mut replace = TrackingPipeline::new(script(), config("kalman"));
        let replaced = replace.run(&mut black_source(12)).unwrap();

        let correct_config = PipelineConfig {
            reacquire: ReacquirePolicy::Correct,
            ..config("kalman")
        };
        let mut correct = TrackingPipeline::new(script(), correct_config);
        let corrected = correct.run(&mut black_source(12)).unwrap();

        // A replaced tracker restarts from the detection box with zero
        // velocity; a corrected one blends the measurement into its state, so
        // the next prediction sits between the old and new positions.
        let after_replace = replaced.tracked_bbox_history[11].unwrap();
        let after_correct = corrected.tracked_bbox_history[11].unwrap();
        assert_eq!(after_replace, moved);
        assert_ne!(after_correct, moved);
        assert!(after_correct.left > seed.left && after_correct.left < moved.left);
    }

    #[test]
    fn test_process_frame_advances_index() {
        let detector = MockDetector::always(BoundingBox::new(20, 20, 10, 10));
        let mut pipeline = TrackingPipeline::new(detector, config("kalman"));
        let frame = Frame::black(64, 64);

        let first = pipeline.process_frame(&frame).unwrap();
        let second = pipeline.process_frame(&frame).unwrap();
        assert_eq!(first.frame_index, 0);
        assert_eq!(first.source, OutcomeSource::Detection);
        assert_eq!(second.frame_index, 1);

        pipeline.reset();
        assert!(!pipeline.has_active_tracker());
        let again = pipeline.process_frame(&frame).unwrap();
        assert_eq!(again.frame_index, 0);
    }
}
