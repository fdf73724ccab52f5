use image::{GrayImage, ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DecodeError;

/// Prefix prepended to the output video file name.
pub const OUTPUT_PREFIX: &str = "Contoured_";

/// Container extension used for every output video.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// A single decoded 3-channel image
///
/// This is a simple wrapper around an RGB image buffer that provides
/// convenient methods for the pixel access the overlay stages need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Decode a still image from disk into a 3-channel frame.
    ///
    /// The file is resolved lazily at decode time; any read or parse
    /// failure maps to a [`DecodeError`] carrying the offending path.
    pub fn decode<P: AsRef<Path>>(path: P) -> std::result::Result<Self, DecodeError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(_) => DecodeError::Unreadable {
                path: path.display().to_string(),
            },
            _ => DecodeError::Malformed {
                path: path.display().to_string(),
            },
        })?;

        let rgb_image = match image {
            image::DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };

        Ok(Self::new(rgb_image))
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let pixel = self.buffer.get_pixel(x, y);
        [pixel[0], pixel[1], pixel[2]]
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw RGB24 bytes in row-major order, as the encoder consumes them.
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }
}

/// Single-channel binary map marking gradient discontinuities in a mask.
///
/// Derived and ephemeral: produced per pair by the edge extractor, consumed
/// by the compositor, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    map: GrayImage,
}

impl EdgeMap {
    const EDGE: u8 = 255;

    /// Wrap an existing grayscale buffer; any non-zero cell counts as edge.
    pub fn new(map: GrayImage) -> Self {
        Self { map }
    }

    /// Build an edge map from a per-position predicate.
    pub fn from_fn<F>(width: u32, height: u32, mut is_edge: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let map = ImageBuffer::from_fn(width, height, |x, y| {
            image::Luma([if is_edge(x, y) { Self::EDGE } else { 0 }])
        });
        Self { map }
    }

    /// Get the width of the map
    pub fn width(&self) -> u32 {
        self.map.width()
    }

    /// Get the height of the map
    pub fn height(&self) -> u32 {
        self.map.height()
    }

    /// Whether the given position is marked as an edge
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.map.get_pixel(x, y)[0] != 0
    }

    /// Total number of marked positions
    pub fn edge_count(&self) -> usize {
        self.map.pixels().filter(|p| p[0] != 0).count()
    }
}

/// One aligned (frame, mask) tuple at a given sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMaskPair {
    /// Position in the run; defines output ordering
    pub index: usize,

    /// Location of the frame image
    pub frame: PathBuf,

    /// Location of the corresponding mask image
    pub mask: PathBuf,
}

/// Output video parameters, fixed for the lifetime of a run
///
/// Width and height are derived from the first successfully decoded frame
/// when the sink is opened; no later frame may disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Destination file for the encoded video
    pub destination: PathBuf,

    /// Frames per second of the output (positive)
    pub fps: u32,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

impl OutputSpec {
    /// Destination path for a contoured video: `<dir>/Contoured_<base>.mp4`
    pub fn contoured_destination<P: AsRef<Path>>(output_dir: P, base_name: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{OUTPUT_PREFIX}{base_name}.{OUTPUT_EXTENSION}"))
    }
}

/// Final counts reported by a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames encoded into the output video
    pub written: usize,

    /// Pairs skipped because the frame or mask could not be decoded
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use tempfile::tempdir;

    #[test]
    fn test_contoured_destination_naming() {
        let path = OutputSpec::contoured_destination("/videos/out", "holiday");
        assert_eq!(path, PathBuf::from("/videos/out/Contoured_holiday.mp4"));
    }

    #[test]
    fn test_decode_missing_file() {
        let err = Frame::decode("does/not/exist.png").unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable { .. }));
    }

    #[test]
    fn test_decode_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not an image").unwrap();

        let err = Frame::decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_decode_roundtrips_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let mut original = Frame::new_filled(4, 3, [10, 20, 30]);
        original.set_pixel(2, 1, [200, 100, 50]);
        original.as_image().save(&path).unwrap();

        let decoded = Frame::decode(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        assert_eq!(decoded.get_pixel(2, 1), [200, 100, 50]);
        assert_eq!(decoded.get_pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_edge_map_from_fn() {
        let edges = EdgeMap::from_fn(3, 3, |x, y| x == y);
        assert!(edges.is_edge(0, 0));
        assert!(edges.is_edge(2, 2));
        assert!(!edges.is_edge(1, 0));
        assert_eq!(edges.edge_count(), 3);
    }
}
