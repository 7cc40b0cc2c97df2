//! Freehand drawing surface.
//!
//! Strokes come from a JSON document:
//!
//! ```json
//! { "brush": 14, "ink": [0, 0, 0], "strokes": [[[40, 40], [200, 220]]] }
//! ```

use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use serde::Deserialize;

use super::ClientError;

pub const CANVAS_SIZE: u32 = 280;

fn default_brush() -> f32 {
    12.0
}

fn default_ink() -> [u8; 3] {
    [0, 0, 0]
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

#[derive(Debug, Clone, Deserialize)]
pub struct Drawing {
    /// Brush diameter in pixels.
    #[serde(default = "default_brush")]
    pub brush: f32,
    #[serde(default = "default_ink")]
    pub ink: [u8; 3],
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Polylines in canvas coordinates.
    pub strokes: Vec<Vec<[f32; 2]>>,
}

impl Drawing {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        let drawing: Drawing = serde_json::from_str(text).map_err(|e| ClientError::Drawing(e.to_string()))?;
        if !(drawing.brush.is_finite() && drawing.brush > 0.0) {
            return Err(ClientError::Drawing(format!(
                "brush must be a positive width, got {}",
                drawing.brush
            )));
        }
        Ok(drawing)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn render(&self) -> Canvas {
        let mut canvas = Canvas::new(self.background);
        for stroke in &self.strokes {
            canvas.stroke(stroke, self.brush, self.ink);
        }
        canvas
    }
}

/// Fixed-size RGBA raster. Untouched pixels are transparent.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(background: [u8; 3]) -> Self {
        let [r, g, b] = background;
        Self {
            image: RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([r, g, b, 0])),
        }
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Drops the alpha channel.
    pub fn to_rgb(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.image.clone()).to_rgb8())
    }

    pub fn stroke(&mut self, points: &[[f32; 2]], width: f32, ink: [u8; 3]) {
        let radius = (width / 2.0).max(0.5);
        let [r, g, b] = ink;
        let color = Rgba([r, g, b, 255]);

        match points {
            [] => {}
            [[x, y]] => self.stamp(*x, *y, radius, color),
            _ => {
                for pair in points.windows(2) {
                    let ([x0, y0], [x1, y1]) = (pair[0], pair[1]);
                    let steps = (x1 - x0).hypot(y1 - y0).ceil().max(1.0) as u32;
                    for i in 0..=steps {
                        let t = i as f32 / steps as f32;
                        self.stamp(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, radius, color);
                    }
                }
            }
        }
    }

    fn stamp(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        let max = (CANVAS_SIZE - 1) as f32;
        let (x_lo, x_hi) = ((cx - radius).floor().max(0.0), (cx + radius).ceil().min(max));
        let (y_lo, y_hi) = ((cy - radius).floor().max(0.0), (cy + radius).ceil().min(max));
        if x_lo > x_hi || y_lo > y_hi {
            return;
        }

        for y in y_lo as u32..=y_hi as u32 {
            for x in x_lo as u32..=x_hi as u32 {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if dx * dx + dy * dy <= radius * radius {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn empty_drawing_is_background_after_alpha_drop() {
        let drawing = Drawing::from_json(r#"{"strokes": []}"#).unwrap();
        let canvas = drawing.render();
        assert_eq!(canvas.rgba().dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        assert_eq!(canvas.rgba().get_pixel(10, 10)[3], 0);

        let rgb = canvas.to_rgb();
        assert!(!rgb.color().has_alpha());
        assert_eq!(rgb.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn stroke_paints_along_the_segment() {
        let drawing = Drawing::from_json(
            r#"{"brush": 6, "ink": [200, 0, 0], "strokes": [[[20, 140], [260, 140]]]}"#,
        )
        .unwrap();
        let canvas = drawing.render();
        let img = canvas.rgba();

        for x in [20, 100, 180, 260] {
            assert_eq!(img.get_pixel(x, 140).0, [200, 0, 0, 255]);
        }
        assert_eq!(img.get_pixel(140, 120)[3], 0);
    }

    #[test]
    fn single_point_and_offscreen_strokes() {
        let mut canvas = Canvas::new([0, 0, 0]);
        canvas.stroke(&[[5.0, 5.0]], 4.0, [255, 255, 255]);
        canvas.stroke(&[[-50.0, -50.0], [-10.0, -10.0]], 4.0, [255, 255, 255]);
        canvas.stroke(&[[900.0, 900.0]], 4.0, [255, 255, 255]);

        let img = canvas.rgba();
        assert_eq!(img.get_pixel(5, 5)[3], 255);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(279, 279)[3], 0);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(Drawing::from_json("{"), Err(ClientError::Drawing(_))));
        assert!(matches!(
            Drawing::from_json(r#"{"brush": 0, "strokes": []}"#),
            Err(ClientError::Drawing(_))
        ));
    }
}
