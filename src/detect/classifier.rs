//! Heuristic shape classifier.
//!
//! This is not a model. It approximates "bag detection" with a fixed-parameter
//! pipeline: gradient-magnitude edge map over the grayscale frame, edge pixels
//! accumulated into coarse chunks, region growing over active chunks, then
//! size/aspect filters that map each surviving region to a category. The
//! confidence attached to a detection is sampled from the category's range by
//! a pluggable [`ConfidenceSampler`].

use image::GrayImage;

use crate::config::ShapeSettings;
use crate::detect::result::{BoundingBox, Category, Contour, Detection};
use crate::detect::sampler::ConfidenceSampler;

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: f32 = 60.0;

/// Chunk side length in pixels for region accumulation.
const CHUNK: u32 = 8;

/// Minimum edge pixels for a chunk to join a region.
const MIN_EDGE_PIXELS_PER_CHUNK: u32 = 4;

/// Maximum detections reported per gated frame.
const MAX_DETECTIONS: usize = 3;

pub struct ShapeClassifier {
    settings: ShapeSettings,
    sampler: Box<dyn ConfidenceSampler>,
}

impl ShapeClassifier {
    pub fn new(settings: ShapeSettings, sampler: Box<dyn ConfidenceSampler>) -> Self {
        Self { settings, sampler }
    }

    /// Run the full classification pass over a gated grayscale frame.
    pub fn classify(&mut self, gray: &GrayImage) -> Vec<Detection> {
        let contours = extract_contours(gray);
        self.classify_contours(&contours, gray.width(), gray.height())
    }

    /// Filter and classify extracted contours.
    ///
    /// The result is sorted descending by confidence and truncated to the top
    /// three. Bounding boxes are padded and clamped to the frame.
    pub fn classify_contours(
        &mut self,
        contours: &[Contour],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection> {
        let mut detections: Vec<Detection> = contours
            .iter()
            .filter_map(|contour| {
                let category = self.categorize(contour)?;
                let confidence = self.sampler.sample(category.confidence_range());
                let bbox =
                    contour
                        .bounds
                        .padded(self.settings.padding, frame_width, frame_height);
                Some(Detection {
                    category,
                    confidence,
                    bbox,
                    area: contour.area,
                })
            })
            .collect();

        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        detections.truncate(MAX_DETECTIONS);
        detections
    }

    /// Apply the size/aspect filters and pick a category, or reject.
    fn categorize(&self, contour: &Contour) -> Option<Category> {
        let bounds = contour.bounds;
        if contour.area <= self.settings.min_contour_area
            || bounds.width <= self.settings.min_width
            || bounds.height <= self.settings.min_height
        {
            return None;
        }

        let aspect = bounds.aspect_ratio();
        if aspect <= self.settings.min_aspect_ratio || aspect >= self.settings.max_aspect_ratio {
            return None;
        }

        Some(self.category_for(bounds))
    }

    /// Map a bounding rect to a category by aspect ratio alone.
    ///
    /// Wide shapes read as wallets, tall-and-narrow ones as backpacks,
    /// everything in between as handbags.
    pub fn category_for(&self, bounds: BoundingBox) -> Category {
        let aspect = bounds.aspect_ratio();
        if aspect > self.settings.wallet_aspect_ratio {
            Category::Wallet
        } else if aspect < self.settings.backpack_aspect_ratio && bounds.height > bounds.width {
            Category::Backpack
        } else {
            Category::Handbag
        }
    }
}

/// Extract connected edge regions from a grayscale frame.
///
/// Edge pixels (central-difference gradient magnitude above a fixed threshold)
/// are accumulated into `CHUNK`-sized cells; cells with enough edge pixels are
/// grown into 8-connected regions. Each region becomes a [`Contour`] covering
/// the pixel extent of its cells.
pub fn extract_contours(gray: &GrayImage) -> Vec<Contour> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return Vec::new();
    }

    let grid_w = width.div_ceil(CHUNK) as usize;
    let grid_h = height.div_ceil(CHUNK) as usize;
    let mut edge_counts = vec![0u32; grid_w * grid_h];

    let threshold_sq = EDGE_THRESHOLD * EDGE_THRESHOLD;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = gray.get_pixel(x + 1, y)[0] as f32 - gray.get_pixel(x - 1, y)[0] as f32;
            let gy = gray.get_pixel(x, y + 1)[0] as f32 - gray.get_pixel(x, y - 1)[0] as f32;
            if gx * gx + gy * gy > threshold_sq {
                let cell = (y / CHUNK) as usize * grid_w + (x / CHUNK) as usize;
                edge_counts[cell] += 1;
            }
        }
    }

    let active: Vec<bool> = edge_counts
        .iter()
        .map(|count| *count >= MIN_EDGE_PIXELS_PER_CHUNK)
        .collect();

    // Region growing over active cells, 8-connected.
    let mut visited = vec![false; active.len()];
    let mut contours = Vec::new();
    for seed in 0..active.len() {
        if !active[seed] || visited[seed] {
            continue;
        }

        let mut queue = vec![seed];
        visited[seed] = true;
        let (mut min_cx, mut min_cy) = (grid_w, grid_h);
        let (mut max_cx, mut max_cy) = (0usize, 0usize);
        let mut cells = 0u32;

        while let Some(cell) = queue.pop() {
            let cx = cell % grid_w;
            let cy = cell / grid_w;
            min_cx = min_cx.min(cx);
            min_cy = min_cy.min(cy);
            max_cx = max_cx.max(cx);
            max_cy = max_cy.max(cy);
            cells += 1;

            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= grid_w as i32 || ny >= grid_h as i32 {
                        continue;
                    }
                    let neighbor = ny as usize * grid_w + nx as usize;
                    if active[neighbor] && !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push(neighbor);
                    }
                }
            }
        }

        let x = min_cx as u32 * CHUNK;
        let y = min_cy as u32 * CHUNK;
        let bounds = BoundingBox::new(
            x,
            y,
            ((max_cx as u32 + 1) * CHUNK).min(width) - x,
            ((max_cy as u32 + 1) * CHUNK).min(height) - y,
        );
        contours.push(Contour {
            bounds,
            area: cells * CHUNK * CHUNK,
        });
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::sampler::FixedSampler;
    use image::Luma;

    fn classifier() -> ShapeClassifier {
        ShapeClassifier::new(ShapeSettings::default(), Box::new(FixedSampler))
    }

    fn contour(x: u32, y: u32, width: u32, height: u32, area: u32) -> Contour {
        Contour {
            bounds: BoundingBox::new(x, y, width, height),
            area,
        }
    }

    #[test]
    fn rejects_small_area() {
        let mut c = classifier();
        let out = c.classify_contours(&[contour(10, 10, 100, 80, 1500)], 640, 480);
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_narrow_and_short_boxes() {
        let mut c = classifier();
        assert!(c
            .classify_contours(&[contour(10, 10, 70, 100, 5000)], 640, 480)
            .is_empty());
        assert!(c
            .classify_contours(&[contour(10, 10, 100, 60, 5000)], 640, 480)
            .is_empty());
    }

    #[test]
    fn rejects_extreme_aspect_ratios() {
        let mut c = classifier();
        // 300/100 = 3.0, above the 2.8 ceiling.
        assert!(c
            .classify_contours(&[contour(10, 10, 300, 100, 9000)], 640, 480)
            .is_empty());
        // 80/220 ~ 0.36, below the 0.4 floor.
        assert!(c
            .classify_contours(&[contour(10, 10, 80, 220, 9000)], 640, 480)
            .is_empty());
    }

    #[test]
    fn wide_shape_maps_to_wallet() {
        let c = classifier();
        // Aspect 2.0, above the 1.8 wallet threshold.
        assert_eq!(
            c.category_for(BoundingBox::new(0, 0, 100, 50)),
            Category::Wallet
        );

        let mut c = classifier();
        let out = c.classify_contours(&[contour(50, 50, 140, 70, 9800)], 640, 480);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Wallet);
        assert!((0.75..0.90).contains(&out[0].confidence));
    }

    #[test]
    fn tall_contour_is_a_backpack() {
        let c = classifier();
        // Aspect 0.5 with height > width.
        assert_eq!(
            c.category_for(BoundingBox::new(0, 0, 100, 200)),
            Category::Backpack
        );

        let mut c = classifier();
        let out = c.classify_contours(&[contour(50, 50, 100, 200, 20000)], 640, 480);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Backpack);
        assert!((0.80..0.95).contains(&out[0].confidence));
    }

    #[test]
    fn middling_contour_is_a_handbag() {
        let mut c = classifier();
        let out = c.classify_contours(&[contour(50, 50, 120, 100, 12000)], 640, 480);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Handbag);
        assert!((0.72..0.88).contains(&out[0].confidence));
    }

    #[test]
    fn results_are_sorted_and_truncated_to_three() {
        let mut c = classifier();
        let contours = [
            contour(0, 0, 120, 100, 12000),    // handbag, midpoint 0.80
            contour(100, 0, 100, 200, 20000),  // backpack, midpoint 0.875
            contour(200, 0, 140, 70, 9800),    // wallet, midpoint 0.825
            contour(300, 0, 100, 200, 20000),  // backpack, midpoint 0.875
            contour(400, 0, 120, 100, 12000),  // handbag, midpoint 0.80
        ];
        let out = c.classify_contours(&contours, 640, 480);

        assert_eq!(out.len(), 3);
        assert!(out.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        assert_eq!(out[0].category, Category::Backpack);
        assert_eq!(out[1].category, Category::Backpack);
        assert_eq!(out[2].category, Category::Wallet);
    }

    #[test]
    fn detection_boxes_are_padded_and_clamped() {
        let mut c = classifier();
        let out = c.classify_contours(&[contour(5, 5, 120, 100, 12000)], 200, 200);

        assert_eq!(out.len(), 1);
        let bbox = out[0].bbox;
        assert_eq!(bbox.x, 0);
        assert_eq!(bbox.y, 0);
        assert!(bbox.fits_within(200, 200));
    }

    #[test]
    fn extracts_a_bright_rectangle_as_one_region() {
        let mut gray = GrayImage::from_pixel(320, 240, Luma([80]));
        for y in 40..130 {
            for x in 60..180 {
                gray.put_pixel(x, y, Luma([220]));
            }
        }

        let contours = extract_contours(&gray);
        assert_eq!(contours.len(), 1);

        let c = contours[0];
        assert!(c.area > 1500);
        assert!((110..=140).contains(&c.bounds.width));
        assert!((80..=110).contains(&c.bounds.height));
        assert!(c.bounds.x <= 60 && c.bounds.x + c.bounds.width >= 180);
    }

    #[test]
    fn flat_frame_has_no_regions() {
        let gray = GrayImage::from_pixel(320, 240, Luma([128]));
        assert!(extract_contours(&gray).is_empty());
    }
}
