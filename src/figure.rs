//! Figure description: panels, axes, and series, plus the subplot-grid primitives
//! the chart builders are composed from.
//!
//! A [`Figure`] is plain data. It can be inspected, compared, serialized by the caller,
//! or drawn with [`crate::viz::draw_figure`].

use serde::{Deserialize, Serialize};

use crate::config::{FigureConfig, Rgb8};
use crate::error::{ChartError, Result};
use crate::models::{RenderMode, XValue};
use crate::viz::types::LegendMode;

/// Which y scale of a panel a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxisSide {
    Primary,
    Secondary,
}

/// Axis scale, inferred from the values placed on the axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Date,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// `None` renders as an absent label.
    pub title: Option<String>,
    pub scale: AxisScale,
}

impl Axis {
    fn set_title(&mut self, title: Option<&str>) {
        self.title = normalize_title(title);
    }
}

/// Blank titles are treated the same as missing ones.
fn normalize_title(title: Option<&str>) -> Option<String> {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// One named, styled collection of points drawn on a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<XValue>,
    /// NaN and infinite values are kept; JSON writes them as strings.
    #[serde(with = "crate::models::float_serde::vec")]
    pub y: Vec<f64>,
    pub mode: RenderMode,
    pub y_axis: YAxisSide,
    pub color: Rgb8,
}

impl Series {
    pub fn new(
        name: impl Into<String>,
        x: Vec<XValue>,
        y: Vec<f64>,
        mode: RenderMode,
        y_axis: YAxisSide,
        color: Rgb8,
    ) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            mode,
            y_axis,
            color,
        }
    }

    /// Number of (x, y) points.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> impl Iterator<Item = (XValue, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Scale of the x values, or `None` for an empty series.
    /// Errors when numbers and timestamps are mixed.
    pub fn x_scale(&self) -> Result<Option<AxisScale>> {
        let Some(first) = self.x.first() else {
            return Ok(None);
        };
        let date = first.is_timestamp();
        if self.x.iter().any(|x| x.is_timestamp() != date) {
            return Err(ChartError::invalid(format!(
                "series {:?} mixes numeric and timestamp x values",
                self.name
            )));
        }
        Ok(Some(if date { AxisScale::Date } else { AxisScale::Linear }))
    }
}

/// One plotting region with its own axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Present only when the panel was created with a secondary y scale.
    pub secondary_y_axis: Option<Axis>,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn has_secondary(&self) -> bool {
        self.secondary_y_axis.is_some()
    }

    pub fn series_on(&self, side: YAxisSide) -> impl Iterator<Item = &Series> + '_ {
        self.series.iter().filter(move |s| s.y_axis == side)
    }

    pub fn y_axis(&self, side: YAxisSide) -> Option<&Axis> {
        match side {
            YAxisSide::Primary => Some(&self.y_axis),
            YAxisSide::Secondary => self.secondary_y_axis.as_ref(),
        }
    }
}

/// Layout settings captured from the [`FigureConfig`] at build time,
/// so a figure carries everything needed to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub legend: LegendMode,
    pub locale: String,
    pub vertical_spacing: f64,
    pub title_font_px: u32,
    pub label_font_px: u32,
    pub axis_desc_font_px: u32,
}

impl From<&FigureConfig> for Layout {
    fn from(cfg: &FigureConfig) -> Self {
        Self {
            width: cfg.width,
            height: cfg.height,
            legend: cfg.legend,
            locale: cfg.locale.clone(),
            vertical_spacing: cfg.vertical_spacing,
            title_font_px: cfg.title_font_px,
            label_font_px: cfg.label_font_px,
            axis_desc_font_px: cfg.axis_desc_font_px,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::from(&FigureConfig::default())
    }
}

/// A complete figure: one or more panels stacked top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    /// All panels use one x range; only meaningful with more than one panel.
    pub shared_x: bool,
    pub layout: Layout,
    pub panels: Vec<Panel>,
}

impl Figure {
    /// Create an empty grid of `rows` vertically stacked panels.
    ///
    /// `secondary[i]` enables a secondary y scale on panel `i`; rows past the end
    /// of the slice get none. The gaps between panels, `(rows - 1) * vertical_spacing`,
    /// must leave room for the panels themselves.
    pub fn subplots(
        config: &FigureConfig,
        rows: usize,
        shared_x: bool,
        secondary: &[bool],
    ) -> Result<Self> {
        if rows == 0 {
            return Err(ChartError::invalid("a figure needs at least one panel"));
        }
        let gaps = (rows - 1) as f64 * config.vertical_spacing;
        if gaps >= 1.0 {
            return Err(ChartError::invalid(format!(
                "vertical_spacing {} leaves no height for {rows} panels (must be below {:.4})",
                config.vertical_spacing,
                1.0 / (rows - 1) as f64
            )));
        }
        if secondary.len() > rows {
            return Err(ChartError::invalid(format!(
                "secondary-axis flags given for {} panels but the grid has {rows}",
                secondary.len()
            )));
        }
        let panels = (0..rows)
            .map(|i| Panel {
                secondary_y_axis: secondary
                    .get(i)
                    .copied()
                    .unwrap_or(false)
                    .then(Axis::default),
                ..Panel::default()
            })
            .collect();
        Ok(Self {
            title: None,
            shared_x,
            layout: Layout::from(config),
            panels,
        })
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = normalize_title(title);
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, row: usize) -> Option<&Panel> {
        self.panels.get(row)
    }

    pub fn series_count(&self) -> usize {
        self.panels.iter().map(|p| p.series.len()).sum()
    }

    /// All series in drawing order (panel by panel).
    pub fn all_series(&self) -> impl Iterator<Item = &Series> + '_ {
        self.panels.iter().flat_map(|p| p.series.iter())
    }

    /// Index of the bottom-most panel (where a shared x-axis is labeled).
    pub fn bottom_row(&self) -> usize {
        self.panels.len().saturating_sub(1)
    }

    fn panel_mut(&mut self, row: usize) -> Result<&mut Panel> {
        let n = self.panels.len();
        self.panels
            .get_mut(row)
            .ok_or_else(|| ChartError::invalid(format!("panel {row} out of range (figure has {n})")))
    }

    /// Append a series to panel `row`, inferring the x-axis scale from its values.
    ///
    /// Fails when the series targets a secondary axis the panel does not have, or when
    /// its x values are of a different kind than those already on the (shared) x-axis.
    pub fn add_series(&mut self, row: usize, series: Series) -> Result<()> {
        let scale = series.x_scale()?;
        {
            let panel = self.panel_mut(row)?;
            if series.y_axis == YAxisSide::Secondary && !panel.has_secondary() {
                return Err(ChartError::invalid(format!(
                    "panel {row} has no secondary y-axis for series {:?}",
                    series.name
                )));
            }
        }

        if let Some(scale) = scale {
            let rows: Vec<usize> = if self.shared_x {
                (0..self.panels.len()).collect()
            } else {
                vec![row]
            };
            let conflict = rows.iter().any(|&r| {
                let p = &self.panels[r];
                !p.series.is_empty() && p.x_axis.scale != scale
            });
            if conflict {
                return Err(ChartError::invalid(format!(
                    "series {:?} puts {scale:?} x values on an axis that already holds other kinds",
                    series.name
                )));
            }
            for r in rows {
                self.panels[r].x_axis.scale = scale;
            }
        }

        self.panel_mut(row)?.series.push(series);
        Ok(())
    }

    pub fn set_x_title(&mut self, row: usize, title: Option<&str>) -> Result<()> {
        self.panel_mut(row)?.x_axis.set_title(title);
        Ok(())
    }

    pub fn set_y_title(&mut self, row: usize, side: YAxisSide, title: Option<&str>) -> Result<()> {
        let panel = self.panel_mut(row)?;
        match side {
            YAxisSide::Primary => panel.y_axis.set_title(title),
            YAxisSide::Secondary => panel
                .secondary_y_axis
                .as_mut()
                .ok_or_else(|| ChartError::invalid(format!("panel {row} has no secondary y-axis")))?
                .set_title(title),
        }
        Ok(())
    }
}
