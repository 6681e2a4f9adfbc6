//! The contract every tracker variant satisfies.

use crate::tracker::bbox::BoundingBox;
use crate::video::Frame;

/// A single-object tracker driven one frame at a time.
///
/// The pipeline seeds a tracker from a detector-confirmed box, then asks it
/// for a cheap position estimate on the frames between detections. Losing the
/// target is ordinary control flow (`update` returns `None`), never an error.
///
/// # Example
///
/// ```ignore
/// use balltrack_rs::{BoundingBox, Frame, Tracker};
///
/// struct StickyTracker {
///     last: Option<BoundingBox>,
/// }
///
/// impl Tracker for StickyTracker {
///     fn init(&mut self, _frame: &Frame, bbox: BoundingBox, _frame_rate: f64) {
///         self.last = Some(bbox);
///     }
///
///     fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
///         self.last
///     }
///
///     fn name(&self) -> &'static str {
///         "sticky"
///     }
/// }
/// ```
pub trait Tracker: Send {
    /// Seed the tracker from a confirmed box.
    ///
    /// `frame_rate` is the stream's frame rate; motion-model variants derive
    /// their time step from it, appearance variants ignore it.
    fn init(&mut self, frame: &Frame, bbox: BoundingBox, frame_rate: f64);

    /// Advance one frame and return the new position estimate.
    ///
    /// `None` is a miss: the target could not be located this frame. The
    /// returned box may differ in size from the seeded one.
    fn update(&mut self, frame: &Frame) -> Option<BoundingBox>;

    /// Fold a fresh detection into the tracker's state.
    ///
    /// Variants without a meaningful correction inherit this default, which
    /// discards the current state and re-seeds from the given box.
    fn correct(&mut self, frame: &Frame, bbox: BoundingBox, frame_rate: f64) {
        self.init(frame, bbox, frame_rate);
    }

    /// Short stable name for logs and reports.
    fn name(&self) -> &'static str;
}
