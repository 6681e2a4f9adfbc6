//! Correlation trackers: template search by normalized cross-correlation.
//!
//! The appearance model is a zero-mean luma template seeded from one exemplar
//! patch. Each update scans a window around the last position (optionally
//! across a few scales), scores candidates by normalized cross-correlation,
//! and accepts the best candidate above the profile's score floor.

use crate::tracker::base::Tracker;
use crate::tracker::bbox::BoundingBox;
use crate::video::Frame;

/// Largest template grid dimension; bigger boxes are subsampled onto it.
const GRID_LIMIT: usize = 24;

const SCORE_EPS: f32 = 1e-6;

/// Search parameters for a [`CorrelationTracker`].
#[derive(Debug, Clone)]
pub struct CorrelationProfile {
    /// Search window radius around the last center, in pixels
    pub search_radius: i32,
    /// Scan stride inside the window, in pixels
    pub stride: i32,
    /// Relative box scales tried per frame
    pub scales: Vec<f64>,
    /// Minimum correlation score counted as a hit
    pub min_score: f32,
    /// Per-hit template blend factor (0 keeps the seeded template)
    pub learning_rate: f32,
}

impl CorrelationProfile {
    /// Coarse single-scale scan with a static template. Cheap, drifts sooner.
    pub fn fast() -> Self {
        Self {
            search_radius: 24,
            stride: 2,
            scales: vec![1.0],
            min_score: 0.55,
            learning_rate: 0.0,
        }
    }

    /// Dense multi-scale scan with template adaptation.
    pub fn precise() -> Self {
        Self {
            search_radius: 32,
            stride: 1,
            scales: vec![0.9, 1.0, 1.1],
            min_score: 0.5,
            learning_rate: 0.15,
        }
    }
}

#[derive(Debug, Clone)]
struct Template {
    grid_w: usize,
    grid_h: usize,
    /// Zero-mean luma samples, row-major on the grid
    values: Vec<f32>,
}

impl Template {
    fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Single-object appearance tracker with a selectable search profile.
#[derive(Debug)]
pub struct CorrelationTracker {
    profile: CorrelationProfile,
    name: &'static str,
    template: Option<Template>,
    center: (f64, f64),
    size: (i32, i32),
}

impl CorrelationTracker {
    /// Tracker with a custom profile and report name.
    pub fn new(profile: CorrelationProfile, name: &'static str) -> Self {
        Self {
            profile,
            name,
            template: None,
            center: (0.0, 0.0),
            size: (0, 0),
        }
    }

    /// Tracker with the [fast profile](CorrelationProfile::fast).
    pub fn fast() -> Self {
        Self::new(CorrelationProfile::fast(), "ncc-fast")
    }

    /// Tracker with the [precise profile](CorrelationProfile::precise).
    pub fn precise() -> Self {
        Self::new(CorrelationProfile::precise(), "ncc-precise")
    }

    fn grid_dims(width: i32, height: i32) -> (usize, usize) {
        (
            (width as usize).min(GRID_LIMIT).max(1),
            (height as usize).min(GRID_LIMIT).max(1),
        )
    }
}

impl Tracker for CorrelationTracker {
    fn init(&mut self, frame: &Frame, bbox: BoundingBox, _frame_rate: f64) {
        self.center = bbox.center();
        self.size = (bbox.width, bbox.height);

        if bbox.width <= 0 || bbox.height <= 0 {
            // A degenerate exemplar cannot seed an appearance model; every
            // subsequent update will miss until the pipeline re-seeds.
            self.template = None;
            return;
        }

        let (grid_w, grid_h) = Self::grid_dims(bbox.width, bbox.height);
        let values = sample_patch(
            frame,
            bbox.left as f64,
            bbox.top as f64,
            bbox.width as f64,
            bbox.height as f64,
            grid_w,
            grid_h,
        );
        self.template = Some(Template {
            grid_w,
            grid_h,
            values,
        });
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        let template = self.template.as_ref()?;
        let template_norm = template.norm();
        if template_norm < SCORE_EPS {
            return None;
        }

        let (cx, cy) = self.center;
        let (w, h) = self.size;

        let mut best_score = f32::MIN;
        let mut best = None;
        for &scale in &self.profile.scales {
            let cand_w = w as f64 * scale;
            let cand_h = h as f64 * scale;
            let mut dy = -self.profile.search_radius;
            while dy <= self.profile.search_radius {
                let mut dx = -self.profile.search_radius;
                while dx <= self.profile.search_radius {
                    let left = cx + dx as f64 - cand_w / 2.0;
                    let top = cy + dy as f64 - cand_h / 2.0;
                    let patch = sample_patch(
                        frame,
                        left,
                        top,
                        cand_w,
                        cand_h,
                        template.grid_w,
                        template.grid_h,
                    );
                    let score = ncc(&template.values, template_norm, &patch);
                    if score > best_score {
                        best_score = score;
                        best = Some((dx, dy, scale, patch));
                    }
                    dx += self.profile.stride;
                }
                dy += self.profile.stride;
            }
        }

        let (dx, dy, scale, patch) = best?;
        if best_score < self.profile.min_score {
            return None;
        }

        self.center = (cx + dx as f64, cy + dy as f64);
        self.size = (
            ((w as f64 * scale).round() as i32).max(1),
            ((h as f64 * scale).round() as i32).max(1),
        );

        if self.profile.learning_rate > 0.0 {
            let lr = self.profile.learning_rate;
            if let Some(template) = self.template.as_mut() {
                for (t, p) in template.values.iter_mut().zip(&patch) {
                    *t = (1.0 - lr) * *t + lr * p;
                }
            }
        }

        Some(BoundingBox::from_center(
            self.center.0,
            self.center.1,
            self.size.0,
            self.size.1,
        ))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Sample a `grid_w` x `grid_h` zero-mean luma patch over the given region.
fn sample_patch(
    frame: &Frame,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    grid_w: usize,
    grid_h: usize,
) -> Vec<f32> {
    let mut values = Vec::with_capacity(grid_w * grid_h);
    for gy in 0..grid_h {
        for gx in 0..grid_w {
            let x = left + (gx as f64 + 0.5) * width / grid_w as f64;
            let y = top + (gy as f64 + 0.5) * height / grid_h as f64;
            values.push(frame.luma(x as i32, y as i32));
        }
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    for v in &mut values {
        *v -= mean;
    }
    values
}

/// Normalized cross-correlation of a zero-mean template against a zero-mean
/// patch. Flat patches score 0 rather than dividing by a vanishing norm.
fn ncc(template: &[f32], template_norm: f32, patch: &[f32]) -> f32 {
    let patch_norm = patch.iter().map(|v| v * v).sum::<f32>().sqrt();
    if patch_norm < SCORE_EPS {
        return 0.0;
    }
    let dot: f32 = template.iter().zip(patch).map(|(t, p)| t * p).sum();
    dot / (template_norm * patch_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a textured 20x20 target: bright body with a dark quadrant, so
    /// the template has structure that survives small shifts and scaling.
    fn paint_target(frame: &mut Frame, left: i32, top: i32) {
        frame.fill_rect(left, top, 20, 20, [230, 230, 230]);
        frame.fill_rect(left, top, 10, 10, [40, 40, 40]);
    }

    fn target_frame(left: i32, top: i32) -> Frame {
        let mut frame = Frame::black(160, 120);
        paint_target(&mut frame, left, top);
        frame
    }

    #[test]
    fn test_follows_small_shift() {
        let mut tracker = CorrelationTracker::fast();
        tracker.init(&target_frame(30, 40), BoundingBox::new(30, 40, 20, 20), 30.0);

        let moved = target_frame(33, 42);
        let bbox = tracker.update(&moved).expect("target visible");
        assert!((bbox.left - 33).abs() <= 1, "left={}", bbox.left);
        assert!((bbox.top - 42).abs() <= 1, "top={}", bbox.top);
        assert_eq!((bbox.width, bbox.height), (20, 20));
    }

    #[test]
    fn test_misses_on_blank_frame() {
        let mut tracker = CorrelationTracker::fast();
        tracker.init(&target_frame(30, 40), BoundingBox::new(30, 40, 20, 20), 30.0);

        assert_eq!(tracker.update(&Frame::black(160, 120)), None);
    }

    #[test]
    fn test_misses_when_target_leaves_window() {
        let mut tracker = CorrelationTracker::fast();
        tracker.init(&target_frame(30, 40), BoundingBox::new(30, 40, 20, 20), 30.0);

        // Far beyond the 24 px search radius.
        assert_eq!(tracker.update(&target_frame(120, 90)), None);
    }

    #[test]
    fn test_precise_adapts_scale() {
        let mut tracker = CorrelationTracker::precise();
        // Seed with a ring of background context so the template can tell
        // scales apart; a pattern similar to itself under scaling cannot.
        tracker.init(&target_frame(60, 50), BoundingBox::new(58, 48, 24, 24), 30.0);

        // Target grown ~10%: 22x22 body, 11x11 dark quadrant, same center.
        let mut grown = Frame::black(160, 120);
        grown.fill_rect(59, 49, 22, 22, [230, 230, 230]);
        grown.fill_rect(59, 49, 11, 11, [40, 40, 40]);

        let bbox = tracker.update(&grown).expect("target visible");
        assert_eq!((bbox.width, bbox.height), (26, 26));
    }

    #[test]
    fn test_update_before_init_misses() {
        let mut tracker = CorrelationTracker::precise();
        assert_eq!(tracker.update(&Frame::black(32, 32)), None);
    }

    #[test]
    fn test_degenerate_seed_misses() {
        let mut tracker = CorrelationTracker::fast();
        tracker.init(&target_frame(30, 40), BoundingBox::new(30, 40, 0, 0), 30.0);
        assert_eq!(tracker.update(&target_frame(30, 40)), None);
    }
}
