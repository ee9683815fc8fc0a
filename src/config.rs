//! Figure configuration: size, legend placement, locale, fonts, and series palette.
//!
//! Builders never read process-wide defaults. Everything that a charting library would
//! normally keep as a global theme lives in [`FigureConfig`] and is passed explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChartError, Result};
use crate::viz::types::{DEFAULT_LEGEND_MODE, LegendMode};

/// 8-bit RGB color, serialized as `"#RRGGBB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ChartError::invalid(format!("expected #RRGGBB color, got {s:?}")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ChartError::invalid(format!("bad hex digits in color {s:?}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self> {
        Rgb8::from_hex(&s)
    }
}

impl From<Rgb8> for String {
    fn from(c: Rgb8) -> Self {
        c.to_hex()
    }
}

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
pub const OFFICE10: [Rgb8; 10] = [
    Rgb8::new(68, 114, 196),  // blue      (#4472C4)
    Rgb8::new(237, 125, 49),  // orange    (#ED7D31)
    Rgb8::new(165, 165, 165), // gray      (#A5A5A5)
    Rgb8::new(255, 192, 0),   // gold      (#FFC000)
    Rgb8::new(91, 155, 213),  // light blue(#5B9BD5)
    Rgb8::new(112, 173, 71),  // green     (#70AD47)
    Rgb8::new(38, 68, 120),   // dark blue (#264478)
    Rgb8::new(158, 72, 14),   // dark org. (#9E480E)
    Rgb8::new(99, 99, 99),    // dark gray (#636363)
    Rgb8::new(153, 115, 0),   // brownish  (#997300)
];

/// Explicit theme and layout settings shared by every builder call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
    pub legend: LegendMode,
    /// Locale tag for tick labels (`en`, `de`, `fr`, ...).
    pub locale: String,
    /// Gap between stacked panels as a fraction of the figure height.
    pub vertical_spacing: f64,
    pub palette: Vec<Rgb8>,
    pub title_font_px: u32,
    pub label_font_px: u32,
    pub axis_desc_font_px: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            legend: DEFAULT_LEGEND_MODE,
            locale: "en".to_string(),
            vertical_spacing: 0.05,
            palette: OFFICE10.to_vec(),
            title_font_px: 24,
            label_font_px: 12,
            axis_desc_font_px: 16,
        }
    }
}

impl FigureConfig {
    /// Parse a config from JSON text; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let cfg: FigureConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ChartError::invalid("figure width and height must be non-zero"));
        }
        if !(0.0..1.0).contains(&self.vertical_spacing) {
            return Err(ChartError::invalid(format!(
                "vertical_spacing must be in [0, 1), got {}",
                self.vertical_spacing
            )));
        }
        if self.palette.is_empty() {
            return Err(ChartError::invalid("palette must contain at least one color"));
        }
        Ok(())
    }

    /// Palette color for the `idx`-th series of a figure (wraps around).
    pub fn series_color(&self, idx: usize) -> Rgb8 {
        if self.palette.is_empty() {
            return OFFICE10[idx % OFFICE10.len()];
        }
        self.palette[idx % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_and_print() {
        let c = Rgb8::from_hex("#4472c4").unwrap();
        assert_eq!(c, OFFICE10[0]);
        assert_eq!(c.to_hex(), "#4472C4");
        assert!(Rgb8::from_hex("#12345").is_err());
        assert!(Rgb8::from_hex("#GG0000").is_err());
    }

    #[test]
    fn json_config_keeps_defaults_for_missing_fields() {
        let cfg = FigureConfig::from_json_str(
            r##"{"width": 640, "legend": "right", "palette": ["#000000", "#FF0000"]}"##,
        )
        .unwrap();
        assert_eq!(cfg.width, 640);
        assert_eq!(cfg.height, 600);
        assert_eq!(cfg.legend, LegendMode::Right);
        assert_eq!(cfg.series_color(3), Rgb8::new(255, 0, 0));
    }

    #[test]
    fn json_config_rejects_bad_spacing() {
        assert!(FigureConfig::from_json_str(r#"{"vertical_spacing": 1.5}"#).is_err());
        assert!(FigureConfig::from_json_str(r#"{"palette": []}"#).is_err());
    }
}
