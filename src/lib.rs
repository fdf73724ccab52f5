//! # Contour-Compositor
//!
//! Burn mask boundaries into frame sequences and encode them into contoured videos.
//!
//! This library takes two time-aligned image sequences — rendered frames and
//! per-frame binary masks — extracts the boundary of each mask, overlays it
//! onto the matching frame as a white contour, and streams the results into
//! a single video file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contour_compositor::{
//!     config::Config,
//!     pipeline::PipelineDriver,
//!     video::{OutputSpec, PairSource},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let source = PairSource::discover(
//!     "workspace/frames",
//!     "workspace/masks",
//!     &config.discovery.frame_extension,
//!     &config.discovery.mask_extension,
//! )?;
//!
//! let destination = OutputSpec::contoured_destination("videos", "clip");
//! let driver = PipelineDriver::new(config.output);
//! let summary = driver.run(&source, &destination, &mut |n: usize| {
//!     println!("processed {n} pairs");
//! })?;
//! println!("written: {}, skipped: {}", summary.written, summary.skipped);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`overlay`] - Mask edge extraction and contour compositing
//! - [`pipeline`] - The driver orchestrating one run
//! - [`video`] - Image decoding, pair discovery, and video encoding
//! - [`config`] - Configuration management
//!
//! ## Failure policy
//!
//! A pair whose frame or mask cannot be decoded is skipped and counted; the
//! run continues. Structural failures — empty input, an undecodable first
//! frame, a mask list shorter than the frame list, geometry drift, encoder
//! errors — abort the run. The sink is finalized on every exit path, so an
//! aborted run never leaves a dangling encoder process.

pub mod config;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{ContourError, Result},
    overlay::{Compositor, EdgeExtractor},
    pipeline::{PipelineDriver, ProgressSink},
    video::{FfmpegSink, Frame, OutputSpec, PairSource, RunSummary, VideoSink},
};
