//! RGBA pixel buffer with the few primitives the arena needs

/// CPU pixel buffer (4 bytes per pixel)
pub struct PixelFrame {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<u8>,
}

/// 3x5 digit glyphs for damage popups, row-major bitmasks
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

impl PixelFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; width * height * 4],
        }
    }

    /// Fill the whole frame with one color
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        // Alpha-weighted blend onto the existing pixel
        let a = color[3] as u32;
        if a == 255 {
            self.buffer[idx..idx + 4].copy_from_slice(&color);
        } else {
            for ch in 0..3 {
                let dst = self.buffer[idx + ch] as u32;
                let src = color[ch] as u32;
                self.buffer[idx + ch] = ((src * a + dst * (255 - a)) / 255) as u8;
            }
            self.buffer[idx + 3] = 255;
        }
    }

    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, radius: i32, color: [u8; 4]) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn draw_circle_outline(&mut self, cx: i32, cy: i32, radius: i32, width: i32, color: [u8; 4]) {
        let inner = (radius - width).max(0);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 <= radius * radius && d2 >= inner * inner {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Stroke an arc of `radius` around (cx, cy) between two angles, with a
    /// round brush of `thickness` pixels
    pub fn draw_arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        thickness: f32,
        color: [u8; 4],
    ) {
        let arc_len = (end_angle - start_angle).abs() * radius;
        let steps = (arc_len.ceil() as usize).max(2);
        let brush = (thickness / 2.0).max(1.0) as i32;
        for i in 0..=steps {
            let t = start_angle + (end_angle - start_angle) * (i as f32 / steps as f32);
            let x = cx + radius * t.cos();
            let y = cy + radius * t.sin();
            self.draw_filled_circle(x as i32, y as i32, brush, color);
        }
    }

    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: [u8; 4]) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len = (dx * dx + dy * dy).sqrt();
        let steps = (len.ceil() as usize).max(1);
        let brush = (width / 2.0).max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.draw_filled_circle(
                (x0 + dx * t) as i32,
                (y0 + dy * t) as i32,
                brush,
                color,
            );
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        for py in y..y + h {
            for px in x..x + w {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Fill a convex polygon given in screen coordinates
    pub fn fill_convex_poly(&mut self, points: &[(f32, f32)], color: [u8; 4]) {
        if points.len() < 3 {
            return;
        }
        let min_x = points.iter().map(|p| p.0).fold(f32::INFINITY, f32::min) as i32;
        let max_x = points.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max) as i32;
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min) as i32;
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max) as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if point_in_convex_poly(x as f32 + 0.5, y as f32 + 0.5, points) {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Draw an integer with the 3x5 glyph font, scaled up by `scale`
    pub fn draw_number(&mut self, x: i32, y: i32, value: u32, scale: i32, color: [u8; 4]) {
        let digits: Vec<usize> = value
            .to_string()
            .bytes()
            .map(|b| (b - b'0') as usize)
            .collect();
        let advance = 4 * scale;
        for (i, &d) in digits.iter().enumerate() {
            let glyph = &DIGIT_GLYPHS[d];
            let gx = x + i as i32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.fill_rect(
                            gx + col * scale,
                            y + row as i32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Drop the alpha channel, yielding a packed RGB copy (GIF encoding)
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for pixel in self.buffer.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
        }
        rgb
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.buffer[idx],
            self.buffer[idx + 1],
            self.buffer[idx + 2],
            self.buffer[idx + 3],
        ]
    }
}

fn point_in_convex_poly(px: f32, py: f32, points: &[(f32, f32)]) -> bool {
    let mut sign = 0i8;
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        let cross = (x1 - x0) * (py - y0) - (y1 - y0) * (px - x0);
        if cross.abs() < f32::EPSILON {
            continue;
        }
        let s = if cross > 0.0 { 1 } else { -1 };
        if sign == 0 {
            sign = s;
        } else if sign != s {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_pixel() {
        let mut frame = PixelFrame::new(8, 8);
        frame.clear([10, 20, 30, 255]);
        assert_eq!(frame.pixel(3, 3), [10, 20, 30, 255]);
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut frame = PixelFrame::new(4, 4);
        frame.set_pixel(-1, 0, [255; 4]);
        frame.set_pixel(0, 99, [255; 4]);
        assert!(frame.buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_filled_circle_covers_center() {
        let mut frame = PixelFrame::new(16, 16);
        frame.draw_filled_circle(8, 8, 3, [255, 0, 0, 255]);
        assert_eq!(frame.pixel(8, 8), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_convex_poly_fill() {
        let mut frame = PixelFrame::new(16, 16);
        let square = [(2.0, 2.0), (10.0, 2.0), (10.0, 10.0), (2.0, 10.0)];
        frame.fill_convex_poly(&square, [0, 255, 0, 255]);
        assert_eq!(frame.pixel(5, 5), [0, 255, 0, 255]);
        assert_eq!(frame.pixel(12, 12), [0, 0, 0, 0]);
    }

    #[test]
    fn test_to_rgb_length() {
        let frame = PixelFrame::new(5, 4);
        assert_eq!(frame.to_rgb().len(), 5 * 4 * 3);
    }
}
