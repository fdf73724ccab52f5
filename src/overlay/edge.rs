use image::imageops;

use crate::video::types::{EdgeMap, Frame};

/// Gradient magnitudes at or above this value are edge candidates.
pub const LOW_THRESHOLD: u16 = 1;

/// Gradient magnitudes at or above this value are definite edges.
///
/// Sits one past the 8-bit magnitude ceiling, so the candidate tier is
/// never suppressed: every non-zero gradient in the mask is flagged.
pub const HIGH_THRESHOLD: u16 = 256;

/// Converts a mask image into a binary edge map
///
/// Applies a two-threshold gradient-magnitude detector with fixed,
/// compile-time thresholds. There is nothing to configure: this version
/// always runs at maximal sensitivity.
pub struct EdgeExtractor;

impl EdgeExtractor {
    /// Extract the boundary of a mask as a binary edge map.
    ///
    /// Pure function of the input grid: identical masks always produce
    /// identical maps, and the output has the mask's exact dimensions.
    pub fn extract(mask: &Frame) -> EdgeMap {
        let gray = imageops::grayscale(mask.as_image());
        let width = mask.width();
        let height = mask.height();

        EdgeMap::from_fn(width, height, |x, y| {
            let magnitude = sobel_magnitude(&gray, x, y);
            is_edge(magnitude)
        })
    }
}

/// Double-threshold classification of one gradient magnitude.
fn is_edge(magnitude: u16) -> bool {
    if magnitude >= HIGH_THRESHOLD {
        return true;
    }
    // Candidates between the thresholds would normally need hysteresis,
    // but with the high cutoff unreachable they all survive.
    magnitude >= LOW_THRESHOLD
}

/// L1 gradient magnitude at (x, y) from the 3x3 Sobel kernels,
/// clamped into the 8-bit range. Border pixels replicate their
/// nearest neighbor.
fn sobel_magnitude(gray: &image::GrayImage, x: u32, y: u32) -> u16 {
    let sample = |dx: i64, dy: i64| -> i32 {
        let sx = (i64::from(x) + dx).clamp(0, i64::from(gray.width()) - 1) as u32;
        let sy = (i64::from(y) + dy).clamp(0, i64::from(gray.height()) - 1) as u32;
        i32::from(gray.get_pixel(sx, sy)[0])
    };

    let gx = -sample(-1, -1) + sample(1, -1) - 2 * sample(-1, 0) + 2 * sample(1, 0)
        - sample(-1, 1)
        + sample(1, 1);
    let gy = -sample(-1, -1) - 2 * sample(0, -1) - sample(1, -1)
        + sample(-1, 1)
        + 2 * sample(0, 1)
        + sample(1, 1);

    (gx.unsigned_abs() + gy.unsigned_abs()).min(u32::from(u8::MAX)) as u16
}
