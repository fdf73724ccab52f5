//! # Video Module
//!
//! Image decoding, frame/mask discovery, and video output encoding.

pub mod sink;
pub mod source;
pub mod types;

pub use sink::{FfmpegSink, VideoSink};
pub use source::PairSource;
pub use types::{EdgeMap, Frame, FrameMaskPair, OutputSpec, RunSummary};
