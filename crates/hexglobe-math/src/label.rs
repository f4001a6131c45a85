//! Label canvas sizing.
//!
//! Label textures are uploaded at power-of-two dimensions. The text itself is
//! rasterized elsewhere; this module only decides how big the canvas is and
//! where the text sits inside it.

/// Smallest power of two that is at least `size`. Values below 1 yield 1;
/// sizes past the largest `u32` power of two saturate at `u32::MAX`.
pub fn nearest_pow2(size: f64) -> u32 {
    if size.is_nan() || size <= 1.0 {
        return 1;
    }
    (size.ceil() as u32)
        .checked_next_power_of_two()
        .unwrap_or(u32::MAX)
}

/// Measures rendered text width in canvas pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_family: &str, size_pt: f64) -> f64;
}

/// Width estimate from an average glyph advance, for headless use.
#[derive(Debug, Clone, Copy)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the point size.
    pub advance: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self { advance: 0.8 }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, _font_family: &str, size_pt: f64) -> f64 {
        text.chars().count() as f64 * size_pt * self.advance
    }
}

/// Inputs that decide a label's canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub font_size: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    /// Extra height reserved below the text for an underline.
    pub underline_width: Option<f64>,
}

impl LabelLayout {
    pub fn canvas_for_width(&self, text_width: f64) -> LabelCanvas {
        let width = (text_width + self.padding_x).max(2.0);
        let height = self.font_size + 2.0 * self.padding_y + self.underline_width.unwrap_or(0.0);
        let pow2_width = nearest_pow2(width);
        let pow2_height = nearest_pow2(height);
        LabelCanvas {
            width,
            height,
            pow2_width,
            pow2_height,
            offset: (pow2_width as f64 - width) / 2.0,
        }
    }

    pub fn canvas_for(&self, text: &str, font_family: &str, measure: &dyn TextMeasure) -> LabelCanvas {
        self.canvas_for_width(measure.measure(text, font_family, self.font_size))
    }
}

/// Resolved label canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelCanvas {
    /// Content width: text plus horizontal padding, at least 2.
    pub width: f64,
    /// Content height: font size, vertical padding, optional underline.
    pub height: f64,
    pub pow2_width: u32,
    pub pow2_height: u32,
    /// Horizontal inset of the content inside the power-of-two canvas.
    pub offset: f64,
}

impl LabelCanvas {
    /// Sprite scale in scene units. Independent of the device pixel ratio.
    pub fn sprite_scale(&self) -> (f64, f64) {
        (self.pow2_width as f64, self.pow2_height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LabelLayout {
        LabelLayout {
            font_size: 22.0,
            padding_x: 10.0,
            padding_y: 10.0,
            underline_width: None,
        }
    }

    #[test]
    fn test_pow2_rounds_up() {
        assert_eq!(nearest_pow2(0.0), 1);
        assert_eq!(nearest_pow2(1.0), 1);
        assert_eq!(nearest_pow2(2.0), 2);
        assert_eq!(nearest_pow2(33.0), 64);
        assert_eq!(nearest_pow2(64.0), 64);
        assert_eq!(nearest_pow2(64.5), 128);
        assert_eq!(nearest_pow2(f64::NAN), 1);
    }

    #[test]
    fn test_pow2_saturates_for_huge_sizes() {
        assert_eq!(nearest_pow2(2_147_483_648.0), 1 << 31);
        assert_eq!(nearest_pow2(3.0e9), u32::MAX);
        assert_eq!(nearest_pow2(f64::INFINITY), u32::MAX);
    }

    #[test]
    fn test_pow2_is_never_smaller_than_input() {
        for i in 1..2000 {
            let size = i as f64 * 0.73;
            assert!(nearest_pow2(size) as f64 >= size, "size {size}");
        }
    }

    #[test]
    fn test_empty_text_keeps_minimum_width() {
        let l = LabelLayout { padding_x: 0.0, ..layout() };
        let c = l.canvas_for_width(0.0);
        assert_eq!(c.width, 2.0);
        assert_eq!(c.pow2_width, 2);
    }

    #[test]
    fn test_canvas_centres_content() {
        let c = layout().canvas_for_width(90.0);
        assert_eq!(c.width, 100.0);
        assert_eq!(c.height, 42.0);
        assert_eq!(c.pow2_width, 128);
        assert_eq!(c.pow2_height, 64);
        assert_eq!(c.offset, 14.0);
    }

    #[test]
    fn test_underline_adds_height() {
        let l = LabelLayout { underline_width: Some(4.0), ..layout() };
        let c = l.canvas_for_width(10.0);
        assert_eq!(c.height, 46.0);
    }

    #[test]
    fn test_approx_measure_scales_with_length() {
        let m = ApproxTextMeasure::default();
        let short = layout().canvas_for("AB", "Verdana", &m);
        let long = layout().canvas_for("ABCDEFGHIJ", "Verdana", &m);
        assert!(long.width > short.width);
    }
}
