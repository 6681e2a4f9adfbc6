//! Frame source and sink seams plus in-memory implementations.

use std::collections::VecDeque;

use thiserror::Error;

use super::frame::Frame;

/// Error type for frame stream failures.
#[derive(Debug, Error)]
pub enum VideoError {
    /// The source could not be opened at all.
    #[error("cannot open {path}: {reason}")]
    Open { path: String, reason: String },
    /// A frame read failed mid-stream.
    #[error("frame read failed: {0}")]
    Read(String),
    /// A frame write failed.
    #[error("frame write failed: {0}")]
    Write(String),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A frame-by-frame video input.
///
/// Implementations wrap whatever actually decodes the stream (a container
/// demuxer, a camera, a buffer of synthetic frames). Construction is where
/// "cannot open" failures belong; a successfully constructed source that
/// turns out to hold zero frames is rejected by the pipeline at run start.
pub trait FrameSource {
    /// Human-readable identifier of the input (path, URL, label).
    fn descriptor(&self) -> &str;

    /// Frame width in pixels.
    fn width(&self) -> u32;

    /// Frame height in pixels.
    fn height(&self) -> u32;

    /// Source frame rate in frames per second.
    fn frame_rate(&self) -> f64;

    /// Total frame count, when the container knows it up front.
    fn frame_count_hint(&self) -> Option<u64> {
        None
    }

    /// Read the next frame. `Ok(None)` signals normal stream exhaustion.
    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError>;
}

/// A frame-by-frame video output.
pub trait FrameSink {
    /// Human-readable identifier of the output (path, label).
    fn descriptor(&self) -> &str;

    /// Write one frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError>;
}

/// In-memory [`FrameSource`] over a prepared frame sequence.
///
/// Used by the test suite and by embedders that decode elsewhere.
#[derive(Debug)]
pub struct BufferSource {
    descriptor: String,
    frame_rate: f64,
    width: u32,
    height: u32,
    total: u64,
    frames: VecDeque<Frame>,
}

impl BufferSource {
    /// Create a source over `frames` played back at `frame_rate`.
    ///
    /// Dimensions are taken from the first frame; an empty sequence yields a
    /// 0x0 source the pipeline will refuse to run.
    pub fn new(descriptor: impl Into<String>, frame_rate: f64, frames: Vec<Frame>) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));
        Self {
            descriptor: descriptor.into(),
            frame_rate,
            width,
            height,
            total: frames.len() as u64,
            frames: frames.into(),
        }
    }
}

impl FrameSource for BufferSource {
    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.total)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        Ok(self.frames.pop_front())
    }
}

/// In-memory [`FrameSink`] retaining every written frame.
#[derive(Debug, Default)]
pub struct BufferSink {
    descriptor: String,
    frames: Vec<Frame>,
}

impl BufferSink {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            frames: Vec::new(),
        }
    }

    /// Frames written so far, in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSink for BufferSink {
    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
