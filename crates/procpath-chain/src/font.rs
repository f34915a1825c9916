//! Built-in 5x7 bitmap font for node labels
//!
//! Covers digits, both letter cases and the punctuation common in process
//! names. A character without a glyph is drawn as its `\u{..}` escape, so
//! labels that differ in text never draw the same.

use image::{Rgba, RgbaImage};

/// Glyph cell width in font pixels
pub(crate) const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in font pixels
pub(crate) const GLYPH_HEIGHT: u32 = 7;
/// Horizontal gap between glyphs in font pixels
const GLYPH_SPACING: u32 = 1;

/// Rows of a glyph, bit 4 is the leftmost column
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'b' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'g' => [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'j' => [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C],
        'k' => [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        'q' => [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        'v' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'z' => [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '\\' => [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '[' => [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E],
        ']' => [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E],
        '{' => [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02],
        '}' => [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '$' => [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '@' => [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '~' => [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

/// Glyph cells drawn for `text`, escapes expanded
fn cells(text: &str) -> Vec<[u8; 7]> {
    let mut cells = Vec::with_capacity(text.len());
    for c in text.chars() {
        match glyph(c) {
            Some(rows) => cells.push(rows),
            None => cells.extend(c.escape_unicode().filter_map(glyph)),
        }
    }
    cells
}

fn extent(cells: usize, scale: u32) -> (u32, u32) {
    if cells == 0 {
        return (0, 0);
    }
    let scale = u64::from(scale);
    let advance = u64::from(GLYPH_WIDTH + GLYPH_SPACING) * scale;
    let width = (cells as u64)
        .saturating_mul(advance)
        .saturating_sub(u64::from(GLYPH_SPACING) * scale);
    let height = u64::from(GLYPH_HEIGHT) * scale;
    (clamp(width), clamp(height))
}

fn clamp(pixels: u64) -> u32 {
    u32::try_from(pixels).unwrap_or(u32::MAX)
}

/// Pixel size of `text` at `scale`, saturating at `u32::MAX`
pub(crate) fn measure(text: &str, scale: u32) -> (u32, u32) {
    extent(cells(text).len(), scale)
}

/// Draw `text` centred on `centre`, clipped to the canvas
pub(crate) fn draw_centred(
    canvas: &mut RgbaImage,
    text: &str,
    centre: [f64; 2],
    scale: u32,
    color: Rgba<u8>,
) {
    let scale = scale.max(1);
    let cells = cells(text);
    let (w, h) = extent(cells.len(), scale);
    let origin_x = centre[0].round() as i64 - i64::from(w / 2);
    let origin_y = centre[1].round() as i64 - i64::from(h / 2);
    let step = i64::from(scale);
    let advance = i64::from(GLYPH_WIDTH + GLYPH_SPACING) * step;

    for (i, rows) in cells.iter().enumerate() {
        let gx = origin_x.saturating_add((i as i64).saturating_mul(advance));
        if gx >= i64::from(canvas.width()) {
            break;
        }
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let px = gx + i64::from(col) * step;
                let py = origin_y + row as i64 * step;
                fill_block(canvas, px, py, scale, color);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbaImage, x: i64, y: i64, size: u32, color: Rgba<u8>) {
    let size = i64::from(size);
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for py in y.max(0)..(y + size).min(height) {
        for px in x.max(0)..(x + size).min(width) {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn measure_scales_with_length() {
        assert_eq!(measure("", 2), (0, 0));
        assert_eq!(measure("A", 1), (5, 7));
        assert_eq!(measure("AB", 2), (22, 14));
    }

    #[test]
    fn measure_saturates() {
        assert_eq!(measure("WWWW", u32::MAX), (u32::MAX, u32::MAX));
        assert_eq!(measure("W", 1 << 28), (5 << 28, 7 << 28));
    }

    #[test]
    fn lowercase_has_its_own_glyphs() {
        for (lower, upper) in ('a'..='z').zip('A'..='Z') {
            assert!(glyph(lower).is_some(), "{lower}");
            assert_ne!(glyph(lower), glyph(upper), "{lower} vs {upper}");
        }
    }

    #[test]
    fn ascii_glyphs_are_distinct() {
        let drawn: Vec<[u8; 7]> = (' '..='~').filter_map(glyph).collect();
        let unique: HashSet<[u8; 7]> = drawn.iter().copied().collect();
        assert_eq!(drawn.len(), unique.len());
    }

    #[test]
    fn unknown_char_draws_its_escape() {
        let escaped: Vec<[u8; 7]> = "\\u{2192}".chars().filter_map(glyph).collect();
        assert_eq!(escaped.len(), 8);
        assert_eq!(cells("→"), escaped);
        assert_ne!(cells("п"), cells("з"));
        assert_eq!(measure("→", 1).0, 8 * 6 - 1);
    }

    #[test]
    fn draws_inside_canvas_only() {
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        draw_centred(&mut canvas, "WWWW", [4.0, 4.0], 3, Rgba([0, 0, 0, 255]));
        assert!(canvas.pixels().any(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn huge_scale_is_clipped() {
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        draw_centred(&mut canvas, "M", [4.0, 4.0], u32::MAX, Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.dimensions(), (8, 8));
    }
}
