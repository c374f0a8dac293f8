//! Frame annotation.
//!
//! Draws detection overlays directly onto the RGB frame: a rectangle outline
//! colored by confidence tier, a filled label background, and the category
//! plus confidence rendered from a small embedded 5x7 glyph set. Drawing is
//! clipped pixel-by-pixel, so boxes near the frame edge simply lose the
//! off-frame portion of their label instead of crashing or shifting.

use image::{Rgb, RgbImage};

use crate::detect::result::Detection;

/// High-confidence tier (> 0.85).
const COLOR_HIGH: Rgb<u8> = Rgb([0, 255, 0]);
/// Mid tier (> 0.70).
const COLOR_MID: Rgb<u8> = Rgb([255, 255, 0]);
/// Everything else.
const COLOR_LOW: Rgb<u8> = Rgb([255, 165, 0]);

const COLOR_TEXT: Rgb<u8> = Rgb([0, 0, 0]);

const OUTLINE_THICKNESS: u32 = 2;
const TEXT_SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance between glyphs, in font units.
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
const LABEL_PAD: u32 = 4;

/// Rectangle color for a confidence value.
pub fn tier_color(confidence: f64) -> Rgb<u8> {
    if confidence > 0.85 {
        COLOR_HIGH
    } else if confidence > 0.70 {
        COLOR_MID
    } else {
        COLOR_LOW
    }
}

/// Draw one detection onto the frame: outline, label background, label text.
///
/// The label sits above the box and is not repositioned when the box touches
/// the top edge; off-frame label rows are clipped away.
pub fn draw_detection(frame: &mut RgbImage, detection: &Detection) {
    let color = tier_color(detection.confidence);
    let bbox = detection.bbox;

    draw_rect_outline(
        frame,
        bbox.x as i64,
        bbox.y as i64,
        bbox.width,
        bbox.height,
        OUTLINE_THICKNESS,
        color,
    );

    let label = format!(
        "{} {:.2}",
        detection.category.label().to_uppercase(),
        detection.confidence
    );
    let text_width = label.chars().count() as u32 * GLYPH_ADVANCE * TEXT_SCALE;
    let label_height = GLYPH_HEIGHT * TEXT_SCALE + 2 * LABEL_PAD;

    let bg_x = bbox.x as i64;
    let bg_y = bbox.y as i64 - label_height as i64;
    fill_rect(
        frame,
        bg_x,
        bg_y,
        text_width + 2 * LABEL_PAD,
        label_height,
        color,
    );
    draw_text(
        frame,
        &label,
        bg_x + LABEL_PAD as i64,
        bg_y + LABEL_PAD as i64,
        TEXT_SCALE,
        COLOR_TEXT,
    );
}

fn put_pixel_clipped(frame: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < frame.width() && (y as u32) < frame.height() {
        frame.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(frame: &mut RgbImage, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
    for dy in 0..height as i64 {
        for dx in 0..width as i64 {
            put_pixel_clipped(frame, x + dx, y + dy, color);
        }
    }
}

fn draw_rect_outline(
    frame: &mut RgbImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = thickness.min(width).min(height);
    // Top and bottom bands.
    fill_rect(frame, x, y, width, t, color);
    fill_rect(frame, x, y + height as i64 - t as i64, width, t, color);
    // Left and right bands.
    fill_rect(frame, x, y, t, height, color);
    fill_rect(frame, x + width as i64 - t as i64, y, t, height, color);
}

fn draw_text(frame: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let mut cursor = x;
    let advance = (GLYPH_ADVANCE * scale) as i64;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    for sy in 0..scale as i64 {
                        for sx in 0..scale as i64 {
                            put_pixel_clipped(
                                frame,
                                cursor + col as i64 * scale as i64 + sx,
                                y + row as i64 * scale as i64 + sy,
                                color,
                            );
                        }
                    }
                }
            }
        }
        cursor += advance;
    }
}

/// 5x7 bitmap rows (bit 4 is the leftmost column) for the label alphabet.
/// Unknown characters render as blank space.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x1F, 0x01, 0x02, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        _ => return None,
    };
    Some(rows)
}
