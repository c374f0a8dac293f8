//! Frame-difference motion gate.
//!
//! The gate decides whether a captured frame is worth classifying. It compares
//! the current grayscale frame against the previous one, counts pixels whose
//! intensity changed by more than a fixed threshold, and fires only when the
//! changed area is large enough and a cooldown of frames has elapsed since the
//! last fire.
//!
//! The stored previous frame is replaced on every observation regardless of
//! the gating outcome. On the very first observation there is no previous
//! frame and the gate never fires.

use image::GrayImage;

use crate::config::GateSettings;

/// Motion gate state: previous frame plus the index of the last positive gate.
pub struct MotionGate {
    settings: GateSettings,
    prev: Option<GrayImage>,
    last_fire: u64,
}

impl MotionGate {
    pub fn new(settings: GateSettings) -> Self {
        Self {
            settings,
            prev: None,
            last_fire: 0,
        }
    }

    /// Observe the grayscale frame for cycle `frame_index` (1-based, monotonic).
    ///
    /// Returns true when the classifier should run on this frame. Consistent
    /// frame dimensions are a contract of the frame source, not a runtime
    /// error.
    pub fn observe(&mut self, gray: &GrayImage, frame_index: u64) -> bool {
        let fired = match self.prev.as_ref() {
            Some(prev) => {
                debug_assert_eq!(
                    prev.dimensions(),
                    gray.dimensions(),
                    "frame source must produce consistent dimensions"
                );
                let changed = changed_pixels(gray, prev, self.settings.diff_threshold);
                changed > self.settings.motion_area
                    && frame_index.saturating_sub(self.last_fire) > self.settings.cooldown_frames
            }
            None => false,
        };

        if fired {
            self.last_fire = frame_index;
        }
        self.prev = Some(gray.clone());
        fired
    }

    /// Frame index of the most recent positive gate (0 before the first).
    pub fn last_fire(&self) -> u64 {
        self.last_fire
    }
}

/// Count pixels whose absolute intensity difference exceeds `threshold`.
pub fn changed_pixels(current: &GrayImage, previous: &GrayImage, threshold: u8) -> usize {
    current
        .as_raw()
        .iter()
        .zip(previous.as_raw().iter())
        .filter(|(a, b)| a.abs_diff(**b) > threshold)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, image::Luma([value]))
    }

    fn settings() -> GateSettings {
        GateSettings {
            diff_threshold: 30,
            motion_area: 6000,
            cooldown_frames: 45,
        }
    }

    #[test]
    fn changed_pixel_count_is_exact() {
        let prev = flat(100, 100, 10);
        let mut current = flat(100, 100, 10);
        // 37 pixels pushed past the threshold, one exactly at it.
        for i in 0..37u32 {
            current.put_pixel(i, 0, image::Luma([100]));
        }
        current.put_pixel(50, 50, image::Luma([40])); // diff == 30, not counted

        assert_eq!(changed_pixels(&current, &prev, 30), 37);
    }

    #[test]
    fn gate_never_fires_on_first_frame() {
        let mut gate = MotionGate::new(settings());
        let bright = flat(200, 200, 255);

        assert!(!gate.observe(&bright, 1));
    }

    #[test]
    fn gate_fires_on_large_motion_after_cooldown() {
        let mut gate = MotionGate::new(settings());
        let dark = flat(120, 120, 0);
        let bright = flat(120, 120, 255);

        assert!(!gate.observe(&dark, 1));
        // 14400 changed pixels, but 2 - 0 <= 45: cooldown from startup holds.
        assert!(!gate.observe(&bright, 2));
        assert!(!gate.observe(&bright, 45));
        // First eligible cycle after the startup cooldown.
        assert!(gate.observe(&dark, 46));
        assert_eq!(gate.last_fire(), 46);
    }

    #[test]
    fn gate_enforces_cooldown_between_events() {
        let mut gate = MotionGate::new(settings());
        let a = flat(120, 120, 0);
        let b = flat(120, 120, 255);

        gate.observe(&a, 1);
        assert!(gate.observe(&b, 50));
        // 90 - 50 <= 45: suppressed despite full-frame motion.
        assert!(!gate.observe(&a, 90));
        assert_eq!(gate.last_fire(), 50);
        // 96 - 50 > 45: eligible again.
        assert!(gate.observe(&b, 96));
    }

    #[test]
    fn gate_ignores_small_motion() {
        let mut gate = MotionGate::new(settings());
        let prev = flat(200, 200, 0);
        let mut current = flat(200, 200, 0);
        // Change fewer pixels than the motion area threshold.
        for y in 0..50 {
            for x in 0..50 {
                current.put_pixel(x, y, image::Luma([255]));
            }
        }

        gate.observe(&prev, 1);
        assert!(!gate.observe(&current, 100));
    }
}
