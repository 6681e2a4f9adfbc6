//! Frame streams and the annotation banner.
//!
//! Video decode/encode stays outside this crate; the [`FrameSource`] and
//! [`FrameSink`] traits are the seams a container backend plugs into, and
//! [`BufferSource`]/[`BufferSink`] are the in-memory implementations used for
//! tests and embedding.

mod frame;
mod stream;

pub use frame::{BANNER_HEIGHT_RATIO, Frame, banner_height, with_banner};
pub use stream::{BufferSink, BufferSource, FrameSink, FrameSource, VideoError};
