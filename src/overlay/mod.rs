//! # Overlay Module
//!
//! Per-frame image processing: mask edge extraction and contour compositing.
//! Both stages are pure functions of their inputs and run once per pair.

pub mod composite;
pub mod edge;

pub use composite::{Compositor, CONTOUR_COLOR};
pub use edge::{EdgeExtractor, HIGH_THRESHOLD, LOW_THRESHOLD};
