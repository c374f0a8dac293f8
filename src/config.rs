use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_DEVICE: &str = "/dev/video0";
const DEFAULT_TARGET_FPS: u32 = 30;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

const DEFAULT_DIFF_THRESHOLD: u8 = 30;
const DEFAULT_MOTION_AREA: usize = 6000;
const DEFAULT_COOLDOWN_FRAMES: u64 = 45;

const DEFAULT_MIN_CONTOUR_AREA: u32 = 1500;
const DEFAULT_MIN_WIDTH: u32 = 70;
const DEFAULT_MIN_HEIGHT: u32 = 60;
const DEFAULT_MIN_ASPECT_RATIO: f64 = 0.4;
const DEFAULT_MAX_ASPECT_RATIO: f64 = 2.8;
const DEFAULT_WALLET_ASPECT_RATIO: f64 = 1.8;
const DEFAULT_BACKPACK_ASPECT_RATIO: f64 = 0.7;
const DEFAULT_PADDING: u32 = 10;

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    camera: Option<CameraConfigFile>,
    gate: Option<GateConfigFile>,
    shape: Option<ShapeConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct GateConfigFile {
    diff_threshold: Option<u8>,
    motion_area: Option<usize>,
    cooldown_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ShapeConfigFile {
    min_contour_area: Option<u32>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    min_aspect_ratio: Option<f64>,
    max_aspect_ratio: Option<f64>,
    wallet_aspect_ratio: Option<f64>,
    backpack_aspect_ratio: Option<f64>,
    padding: Option<u32>,
}

/// Full pipeline configuration: camera, motion gate, shape filters.
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    pub camera: CameraSettings,
    pub gate: GateSettings,
    pub shape: ShapeSettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Device node (e.g. "/dev/video0") or "stub://" for the synthetic source.
    pub device: String,
    /// Capture rate. The run loop period is derived from this.
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl CameraSettings {
    /// Period between capture cycles (~33ms at the default 30 fps).
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(1000 / self.target_fps.max(1) as u64)
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            target_fps: DEFAULT_TARGET_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Per-pixel intensity delta (0-255) that counts as "changed".
    pub diff_threshold: u8,
    /// Changed-pixel count above which the gate may fire.
    pub motion_area: usize,
    /// Frames that must elapse after a fire before the next one.
    pub cooldown_frames: u64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            motion_area: DEFAULT_MOTION_AREA,
            cooldown_frames: DEFAULT_COOLDOWN_FRAMES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShapeSettings {
    /// Contours at or below this pixel area are rejected.
    pub min_contour_area: u32,
    /// Bounding widths at or below this are rejected.
    pub min_width: u32,
    /// Bounding heights at or below this are rejected.
    pub min_height: u32,
    /// Accepted aspect-ratio band (exclusive on both ends).
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Above this aspect ratio a shape reads as a wallet.
    pub wallet_aspect_ratio: f64,
    /// Below this aspect ratio (and taller than wide) a shape reads as a backpack.
    pub backpack_aspect_ratio: f64,
    /// Pixels added to each side of an accepted bounding box.
    pub padding: u32,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            min_contour_area: DEFAULT_MIN_CONTOUR_AREA,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            min_aspect_ratio: DEFAULT_MIN_ASPECT_RATIO,
            max_aspect_ratio: DEFAULT_MAX_ASPECT_RATIO,
            wallet_aspect_ratio: DEFAULT_WALLET_ASPECT_RATIO,
            backpack_aspect_ratio: DEFAULT_BACKPACK_ASPECT_RATIO,
            padding: DEFAULT_PADDING,
        }
    }
}

impl DetectorConfig {
    /// Load configuration: compiled defaults, then the JSON file named by
    /// `BAGSCAN_CONFIG` (if set), then env-var overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("BAGSCAN_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Like [`DetectorConfig::load`], but with an explicit config file path
    /// (e.g. from a `--config` flag) instead of the `BAGSCAN_CONFIG` lookup.
    /// Env-var overrides and validation still apply.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => read_config_file(path)?,
            None => DetectorConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: DetectorConfigFile) -> Self {
        let mut cfg = Self::default();
        if let Some(camera) = file.camera {
            if let Some(device) = camera.device {
                cfg.camera.device = device;
            }
            if let Some(fps) = camera.target_fps {
                cfg.camera.target_fps = fps;
            }
            if let Some(width) = camera.width {
                cfg.camera.width = width;
            }
            if let Some(height) = camera.height {
                cfg.camera.height = height;
            }
        }
        if let Some(gate) = file.gate {
            if let Some(threshold) = gate.diff_threshold {
                cfg.gate.diff_threshold = threshold;
            }
            if let Some(area) = gate.motion_area {
                cfg.gate.motion_area = area;
            }
            if let Some(cooldown) = gate.cooldown_frames {
                cfg.gate.cooldown_frames = cooldown;
            }
        }
        if let Some(shape) = file.shape {
            if let Some(area) = shape.min_contour_area {
                cfg.shape.min_contour_area = area;
            }
            if let Some(width) = shape.min_width {
                cfg.shape.min_width = width;
            }
            if let Some(height) = shape.min_height {
                cfg.shape.min_height = height;
            }
            if let Some(aspect) = shape.min_aspect_ratio {
                cfg.shape.min_aspect_ratio = aspect;
            }
            if let Some(aspect) = shape.max_aspect_ratio {
                cfg.shape.max_aspect_ratio = aspect;
            }
            if let Some(aspect) = shape.wallet_aspect_ratio {
                cfg.shape.wallet_aspect_ratio = aspect;
            }
            if let Some(aspect) = shape.backpack_aspect_ratio {
                cfg.shape.backpack_aspect_ratio = aspect;
            }
            if let Some(padding) = shape.padding {
                cfg.shape.padding = padding;
            }
        }
        cfg
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("BAGSCAN_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(fps) = std::env::var("BAGSCAN_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("BAGSCAN_TARGET_FPS must be an integer"))?;
            self.camera.target_fps = fps;
        }
        if let Ok(area) = std::env::var("BAGSCAN_MOTION_AREA") {
            let area: usize = area
                .parse()
                .map_err(|_| anyhow!("BAGSCAN_MOTION_AREA must be an integer pixel count"))?;
            self.gate.motion_area = area;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be non-zero"));
        }
        if self.shape.min_aspect_ratio >= self.shape.max_aspect_ratio {
            return Err(anyhow!(
                "shape aspect-ratio band is empty ({} >= {})",
                self.shape.min_aspect_ratio,
                self.shape.max_aspect_ratio
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<DetectorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_constants() {
        let cfg = DetectorConfig::default();
        assert_eq!(cfg.gate.diff_threshold, 30);
        assert_eq!(cfg.gate.motion_area, 6000);
        assert_eq!(cfg.gate.cooldown_frames, 45);
        assert_eq!(cfg.shape.min_contour_area, 1500);
        assert_eq!(cfg.shape.padding, 10);
        assert_eq!(cfg.camera.frame_period(), Duration::from_millis(33));
    }

    #[test]
    fn validate_rejects_zero_fps() {
        let mut cfg = DetectorConfig::default();
        cfg.camera.target_fps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_aspect_band() {
        let mut cfg = DetectorConfig::default();
        cfg.shape.min_aspect_ratio = 3.0;
        assert!(cfg.validate().is_err());
    }
}
