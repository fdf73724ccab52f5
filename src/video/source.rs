use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::video::types::FrameMaskPair;

/// Supplies the aligned, ordered frame and mask location lists for one run.
///
/// Owns the discovery and sorting policy: files are matched by extension
/// and ordered lexically by path, the convention under which frame and mask
/// folders are written out by segmentation tools. The pipeline treats the
/// lists as read-only and resolves each location lazily.
#[derive(Debug, Clone)]
pub struct PairSource {
    frames: Vec<PathBuf>,
    masks: Vec<PathBuf>,
}

impl PairSource {
    /// Build a source from caller-assembled lists, preserving their order.
    pub fn from_lists(frames: Vec<PathBuf>, masks: Vec<PathBuf>) -> Self {
        Self { frames, masks }
    }

    /// Discover frame and mask images from two parallel directories.
    ///
    /// Each directory is scanned non-recursively for files with the given
    /// extension (case-insensitive); hidden files are skipped and the
    /// result is sorted lexically. The two lists are assumed to be
    /// temporally aligned by position; a count mismatch is only logged
    /// here, since the pipeline enforces alignment pair by pair.
    pub fn discover<P: AsRef<Path>>(
        frames_dir: P,
        masks_dir: P,
        frame_extension: &str,
        mask_extension: &str,
    ) -> Result<Self> {
        let frames = list_images(frames_dir.as_ref(), frame_extension)?;
        let masks = list_images(masks_dir.as_ref(), mask_extension)?;

        info!(
            "Discovered {} frames and {} masks",
            frames.len(),
            masks.len()
        );
        if frames.len() != masks.len() {
            warn!(
                "Frame/mask counts differ ({} vs {}); the run will abort if masks run out",
                frames.len(),
                masks.len()
            );
        }

        Ok(Self { frames, masks })
    }

    /// Frame locations in output order
    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    /// Mask locations in output order
    pub fn masks(&self) -> &[PathBuf] {
        &self.masks
    }

    /// Number of pairs the run will visit (the frame list's length)
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there is nothing to process
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The pair at `index`, or `None` when the mask list is exhausted.
    pub fn pair(&self, index: usize) -> Option<FrameMaskPair> {
        let frame = self.frames.get(index)?.clone();
        let mask = self.masks.get(index)?.clone();
        Some(FrameMaskPair { index, frame, mask })
    }
}

/// Lexically sorted list of images with the given extension in `dir`.
fn list_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && !is_hidden_file(&path) && has_extension(&path, extension) {
            paths.push(path);
        }
    }

    paths.sort();
    debug!(
        "Found {} *.{} files in {}",
        paths.len(),
        extension,
        dir.display()
    );
    Ok(paths)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
