use crate::error::{PipelineError, Result};
use crate::video::types::{EdgeMap, Frame};

/// Color burned into the output wherever the edge map marks a boundary.
pub const CONTOUR_COLOR: [u8; 3] = [255, 255, 255];

/// Merges one original frame and its edge map into one output frame
pub struct Compositor;

impl Compositor {
    /// Overlay the edge map onto the original frame.
    ///
    /// Per pixel position: pure white where the map marks an edge, the
    /// original pixel otherwise. Deterministic, no hidden state.
    ///
    /// The two inputs must agree in width and height; a disagreement is a
    /// caller bug and fails fast with a dimension-mismatch error rather
    /// than producing a misaligned overlay.
    pub fn composite(original: &Frame, edges: &EdgeMap) -> Result<Frame> {
        if original.width() != edges.width() || original.height() != edges.height() {
            return Err(PipelineError::DimensionMismatch {
                expected_width: original.width(),
                expected_height: original.height(),
                actual_width: edges.width(),
                actual_height: edges.height(),
            }
            .into());
        }

        let mut output = original.clone();
        for y in 0..original.height() {
            for x in 0..original.width() {
                if edges.is_edge(x, y) {
                    output.set_pixel(x, y, CONTOUR_COLOR);
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContourError;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_filled(width, height, [0, 0, 0]);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x * 16) as u8, (y * 16) as u8, 77]);
            }
        }
        frame
    }

    #[test]
    fn test_white_exactly_where_edges_are() {
        let original = gradient_frame(8, 6);
        let edges = EdgeMap::from_fn(8, 6, |x, y| (x + y) % 3 == 0);

        let output = Compositor::composite(&original, &edges).unwrap();

        assert_eq!(output.width(), original.width());
        assert_eq!(output.height(), original.height());
        for y in 0..6 {
            for x in 0..8 {
                if edges.is_edge(x, y) {
                    assert_eq!(output.get_pixel(x, y), CONTOUR_COLOR);
                } else {
                    assert_eq!(output.get_pixel(x, y), original.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_empty_edge_map_preserves_frame() {
        let original = gradient_frame(5, 5);
        let edges = EdgeMap::from_fn(5, 5, |_, _| false);

        let output = Compositor::composite(&original, &edges).unwrap();
        assert_eq!(output, original);
    }

    #[test]
    fn test_compositing_is_deterministic() {
        let original = gradient_frame(7, 4);
        let edges = EdgeMap::from_fn(7, 4, |x, _| x % 2 == 0);

        let first = Compositor::composite(&original, &edges).unwrap();
        let second = Compositor::composite(&original, &edges).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_dimension_mismatch_fails_fast() {
        let original = gradient_frame(8, 6);
        let edges = EdgeMap::from_fn(8, 5, |_, _| true);

        let err = Compositor::composite(&original, &edges).unwrap_err();
        assert!(matches!(
            err,
            ContourError::Pipeline(PipelineError::DimensionMismatch { .. })
        ));
    }
}
