//! Rough text metrics for layout decisions made before anything is drawn.
//!
//! Plotters can only measure text through a backend, and the label/legend areas
//! have to be sized before the chart exists, so widths are estimated from an
//! average glyph advance.

/// Average sans-serif glyph advance, as a fraction of the font size.
const ADVANCE_EM: f32 = 0.60;
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    font_px: u32,
}

impl TextMetrics {
    pub fn new(font_px: u32) -> Self {
        Self { font_px }
    }

    fn advance(&self) -> f32 {
        self.font_px as f32 * ADVANCE_EM
    }

    pub fn width_px(&self, text: &str) -> u32 {
        (text.chars().count() as f32 * self.advance()).ceil() as u32
    }

    /// `text` cut down to fit `max_px`, ending in an ellipsis when anything was dropped.
    pub fn fit(&self, text: &str, max_px: u32) -> String {
        if self.width_px(text) <= max_px {
            return text.to_string();
        }
        let max_chars = if self.advance() > 0.0 {
            (max_px as f32 / self.advance()).floor() as usize
        } else {
            usize::MAX
        };
        match max_chars {
            0 => String::new(),
            1 => text.chars().take(1).collect(),
            n => text.chars().take(n - 1).chain(std::iter::once(ELLIPSIS)).collect(),
        }
    }
}
