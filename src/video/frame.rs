//! Decoded video frame representation.

/// Height of the annotation banner relative to the frame height.
pub const BANNER_HEIGHT_RATIO: f64 = 0.08;

/// A single decoded frame in packed RGB24 layout (`width * height * 3` bytes,
/// row-major, no padding).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed RGB pixel data
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame from packed RGB24 data.
    ///
    /// `data.len()` must equal `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Create an all-black frame of the given dimensions.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 3) as usize],
        }
    }

    /// Luma value at `(x, y)` using Rec. 601 weights, in `[0, 255]`.
    ///
    /// Coordinates outside the frame are clamped to the nearest edge pixel,
    /// so local searches near the border stay well-defined.
    pub fn luma(&self, x: i32, y: i32) -> f32 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        let idx = (y * self.width as usize + x) * 3;
        let r = self.data[idx] as f32;
        let g = self.data[idx + 1] as f32;
        let b = self.data[idx + 2] as f32;
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// Fill an axis-aligned region with a solid RGB color, clipped to the
    /// frame bounds. Intended for synthetic test content.
    pub fn fill_rect(&mut self, left: i32, top: i32, width: i32, height: i32, rgb: [u8; 3]) {
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = (left + width).min(self.width as i32);
        let y1 = (top + height).min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = (y as usize * self.width as usize + x as usize) * 3;
                self.data[idx..idx + 3].copy_from_slice(&rgb);
            }
        }
    }
}

/// Banner height in pixels for a frame of the given height.
#[inline]
pub fn banner_height(frame_height: u32) -> u32 {
    (BANNER_HEIGHT_RATIO * frame_height as f64) as u32
}

/// Return a copy of `frame` with a black banner strip of [`banner_height`]
/// rows prepended at the top. Width is unchanged; drawing annotation text
/// onto the strip is left to the caller.
pub fn with_banner(frame: &Frame) -> Frame {
    let banner = banner_height(frame.height);
    let row_bytes = frame.width as usize * 3;
    let mut data = vec![0u8; (banner as usize) * row_bytes];
    data.extend_from_slice(&frame.data);
    Frame {
        width: frame.width,
        height: frame.height + banner,
        data,
    }
}
