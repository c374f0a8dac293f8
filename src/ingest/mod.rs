//! Frame ingestion sources.
//!
//! This module provides the camera-facing side of the pipeline:
//! - Local V4L2 devices (feature: ingest-v4l2)
//! - Synthetic stub source (`stub://` devices, used by tests)
//!
//! Sources produce [`crate::frame::Frame`] instances on demand. A failed read
//! is an error the controller absorbs by skipping the cycle; sources never
//! retry on their own.

pub mod camera;

pub use camera::{CameraSource, CameraStats};
