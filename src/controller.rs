//! Pipeline controller.
//!
//! Owns the camera source, the motion gate, and the shape classifier, and
//! drives one capture-and-process cycle per tick. The controller has two
//! states, `Idle` and `Detecting`, toggled only by `start`/`stop`; ticks in
//! the idle state capture nothing. Stopping never cancels a cycle in flight,
//! it only makes the next tick a no-op.

use anyhow::Result;
use image::RgbImage;

use crate::config::DetectorConfig;
use crate::detect::result::Detection;
use crate::detect::sampler::{ConfidenceSampler, UniformSampler};
use crate::detect::{MotionGate, ShapeClassifier};
use crate::frame;
use crate::ingest::{CameraSource, CameraStats};
use crate::recommend::{self, Product};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Detecting,
}

/// Result summary for a gated cycle with at least one detection.
#[derive(Clone, Debug)]
pub struct CycleSummary {
    /// Highest-confidence detection of the cycle.
    pub best: Detection,
    /// Total detections reported this cycle (at most 3).
    pub total: usize,
    /// Product recommendations for the best detection's category.
    pub recommendations: &'static [Product; 4],
}

/// Output of one successful capture cycle.
pub struct CycleOutput {
    /// The mirrored frame with detection overlays drawn in.
    pub frame: RgbImage,
    /// Present only when the gate fired and the classifier found something.
    pub summary: Option<CycleSummary>,
}

pub struct PipelineController {
    config: DetectorConfig,
    source: CameraSource,
    gate: MotionGate,
    classifier: ShapeClassifier,
    state: DetectorState,
    frame_count: u64,
}

impl PipelineController {
    /// Build the controller and open the camera source.
    ///
    /// Uses the production confidence sampler; tests inject their own via
    /// [`PipelineController::with_sampler`].
    pub fn new(config: DetectorConfig) -> Result<Self> {
        Self::with_sampler(config, Box::new(UniformSampler::new()))
    }

    pub fn with_sampler(
        config: DetectorConfig,
        sampler: Box<dyn ConfidenceSampler>,
    ) -> Result<Self> {
        let source = CameraSource::new(config.camera.clone())?;
        let gate = MotionGate::new(config.gate.clone());
        let classifier = ShapeClassifier::new(config.shape.clone(), sampler);
        Ok(Self {
            config,
            source,
            gate,
            classifier,
            state: DetectorState::Idle,
            frame_count: 0,
        })
    }

    /// Connect the camera and enter the `Detecting` state.
    ///
    /// A camera that cannot be opened is a blocking error; detection does not
    /// start.
    pub fn start(&mut self) -> Result<()> {
        self.source.connect()?;
        self.state = DetectorState::Detecting;
        log::info!("detection started on {}", self.config.camera.device);
        Ok(())
    }

    /// Leave the `Detecting` state. Subsequent ticks do nothing.
    pub fn stop(&mut self) {
        self.state = DetectorState::Idle;
        log::info!("detection stopped after {} frames", self.frame_count);
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Frames processed since construction.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn source_stats(&self) -> CameraStats {
        self.source.stats()
    }

    pub fn source_healthy(&self) -> bool {
        self.source.is_healthy()
    }

    /// Run one capture-and-process cycle.
    ///
    /// Returns `None` when idle or when the camera read failed (the cycle is
    /// skipped silently, per the error contract). Otherwise returns the
    /// mirrored, annotated frame plus a summary when a gated cycle produced
    /// detections.
    pub fn tick(&mut self) -> Option<CycleOutput> {
        if self.state != DetectorState::Detecting {
            return None;
        }

        let captured = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("camera read failed, skipping cycle: {err:#}");
                return None;
            }
        };

        self.frame_count += 1;

        // Mirror for display; all downstream coordinates are in mirrored space.
        let mut display = frame::mirror(&captured.pixels);
        let gray = frame::to_gray(&display);

        let mut summary = None;
        if self.gate.observe(&gray, self.frame_count) {
            let detections = self.classifier.classify(&gray);
            for detection in &detections {
                crate::annotate::draw_detection(&mut display, detection);
            }
            if let Some(best) = detections.first() {
                log::info!(
                    "detected {} ({:.0}%), {} object(s) in frame {}",
                    best.category.label(),
                    best.confidence * 100.0,
                    detections.len(),
                    self.frame_count
                );
                summary = Some(CycleSummary {
                    best: best.clone(),
                    total: detections.len(),
                    recommendations: recommend::for_category(best.category),
                });
            }
        }

        Some(CycleOutput {
            frame: display,
            summary,
        })
    }
}
