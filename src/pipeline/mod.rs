//! # Pipeline Module
//!
//! The driver orchestrating one frame/mask sequence into one output video.

pub mod driver;

pub use driver::{CancelFlag, PipelineDriver, ProgressSink};
