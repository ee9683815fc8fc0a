//! Visualization: draw a [`Figure`] onto any plotters drawing area.
//!
//! The caller picks the backend (SVG string, bitmap buffer, ...) and owns the output;
//! nothing here opens files.
//!
//! - Panels stacked top to bottom, one x range when the figure shares its x-axis
//! - Secondary y-axis on the right-hand side of a panel
//! - Render modes: lines, markers, or both
//! - Locale-aware value ticks (`30,000` vs `30.000`), date ticks for timestamp axes
//! - Legend placement: `Inside`, `Right`, `Top`, `Bottom` (non-overlapping for external legends)

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

// Re-export types for public API
pub use types::{DEFAULT_LEGEND_MODE, LegendMode};

use anyhow::{Result, anyhow};
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::chart::{DualCoordChartContext, SeriesAnno};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::FontFamily;

use std::sync::Once;

use crate::error::ChartError;
use crate::figure::{Axis, AxisScale, Figure, Layout, Panel, Series, YAxisSide};
use legend::{draw_legend_panel, estimate_top_bottom_legend_height_px};
use util::{
    compute_y_label_area_px, format_value_tick, format_x_tick, map_locale, padded_range, rgba,
};

type Coord2d = Cartesian2d<RangedCoordf64, RangedCoordf64>;

const MARGIN: i32 = 12;
const X_LABEL_AREA_PX: u32 = 36;
const X_LABELS: usize = 8;
const Y_LABELS: usize = 6;
const STROKE_PX: u32 = 2;
const MARKER_PX: i32 = 3;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Tick formatting shared by every panel of one figure.
struct TickFormat<'a> {
    layout: &'a Layout,
    locale: &'static Locale,
    dec_sep: char,
}

impl TickFormat<'_> {
    fn desc_px(&self, axis: &Axis) -> u32 {
        if axis.title.is_some() {
            self.layout.axis_desc_font_px
        } else {
            0
        }
    }

    fn y_label_area(&self, (lo, hi): (f64, f64), axis: &Axis) -> u32 {
        compute_y_label_area_px(
            lo,
            hi,
            Y_LABELS,
            self.layout.label_font_px,
            self.desc_px(axis),
            self.locale,
            self.dec_sep,
        )
    }
}

/// Draw `figure` onto `root`, filling it completely.
///
/// Panels split the area evenly (minus `vertical_spacing`); the figure title, when present,
/// takes a caption band at the top; external legends take a band or column per
/// `figure.layout.legend`.
pub fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
{
    if figure.panels.is_empty() {
        return Err(ChartError::InvalidInput("figure has no panels to draw".into()).into());
    }
    ensure_fonts_registered();

    let layout = &figure.layout;
    let (locale, dec_sep) = map_locale(&layout.locale);
    let ticks = TickFormat {
        layout,
        locale,
        dec_sep,
    };

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let body = match figure.title.as_deref() {
        Some(t) => root
            .titled(t, (FontFamily::SansSerif, layout.title_font_px))
            .map_err(|e| anyhow!("{:?}", e))?,
        None => root.clone(),
    };

    // ----------------------------
    // 1) Legend items & area split
    // ----------------------------
    let legend_items: Vec<(String, RGBAColor)> = figure
        .all_series()
        .map(|s| (s.name.clone(), rgba(s.color)))
        .collect();
    let legend_texts: Vec<String> = legend_items.iter().map(|(l, _)| l.clone()).collect();
    let legend_font_px = layout.label_font_px + 2;

    let (body_w, body_h) = body.dim_in_pixel();
    // Align a top/bottom legend roughly with the first panel's y-axis.
    let first = &figure.panels[0];
    let legend_start_x = MARGIN
        + ticks.y_label_area(y_range(first, YAxisSide::Primary), &first.y_axis) as i32;
    let legend_needed_h = if matches!(layout.legend, LegendMode::Top | LegendMode::Bottom) {
        estimate_top_bottom_legend_height_px(
            &legend_texts,
            legend_start_x,
            body_w as i32,
            legend_font_px,
        )
    } else {
        0
    };

    let (plot_area, legend_area_opt): (DrawingArea<DB, Shift>, Option<DrawingArea<DB, Shift>>) =
        match layout.legend {
            LegendMode::Right => {
                let (plot, legend) = body.split_horizontally((85).percent_width());
                (plot, Some(legend))
            }
            LegendMode::Top => {
                let h = legend_needed_h.max(40);
                let (legend, plot) = body.split_vertically(h);
                (plot, Some(legend))
            }
            LegendMode::Bottom => {
                let h = legend_needed_h.max(40);
                // keep at least 40px for plot area
                let (plot, legend) = body.split_vertically((body_h as i32 - h).max(40));
                (plot, Some(legend))
            }
            LegendMode::Inside => (body, None),
        };

    // ----------------------------
    // 2) Panels
    // ----------------------------
    let n = figure.panels.len();
    let (_, plot_h) = plot_area.dim_in_pixel();
    let half_gap = panel_half_gap(plot_h, n, layout.vertical_spacing);
    let shared_range = figure.shared_x.then(|| {
        x_range(
            figure.all_series(),
            figure.panels[0].x_axis.scale,
        )
    });
    let inside_legend = matches!(layout.legend, LegendMode::Inside);

    for (idx, (cell, panel)) in plot_area
        .split_evenly((n, 1))
        .iter()
        .zip(&figure.panels)
        .enumerate()
    {
        let top = if idx == 0 { 0 } else { half_gap };
        let bottom = if idx + 1 == n { 0 } else { half_gap };
        let area = cell.margin(top, bottom, 0, 0);
        let range = shared_range.unwrap_or_else(|| x_range(panel.series.iter(), panel.x_axis.scale));
        // A shared x-axis only carries tick labels on the bottom panel.
        let show_x_ticks = !figure.shared_x || idx + 1 == n || panel.x_axis.title.is_some();
        draw_panel(&area, panel, range, show_x_ticks, inside_legend, &ticks)?;
    }

    // ----------------------------
    // 3) External legend
    // ----------------------------
    if let Some(ref legend_area) = legend_area_opt {
        legend_area
            .fill(&WHITE)
            .map_err(|e| anyhow!("{:?}", e))?;
        draw_legend_panel(
            legend_area,
            &legend_items,
            layout.legend,
            legend_start_x,
            legend_font_px,
        )?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Margin taken from each side of a panel cell that borders another panel.
///
/// Capped at a quarter of the cell so interior panels keep at least half their height,
/// whatever spacing a hand-edited figure carries.
fn panel_half_gap(plot_h: u32, panels: usize, spacing: f64) -> i32 {
    if panels < 2 || !spacing.is_finite() || spacing <= 0.0 {
        return 0;
    }
    let cell_h = plot_h as f64 / panels as f64;
    let wanted = plot_h as f64 * spacing / 2.0;
    wanted.min(cell_h / 4.0).floor() as i32
}

fn x_range<'s, I>(series: I, scale: AxisScale) -> (f64, f64)
where
    I: Iterator<Item = &'s Series>,
{
    padded_range(series.flat_map(|s| s.x.iter().map(|x| x.as_f64())), scale)
}

fn y_range(panel: &Panel, side: YAxisSide) -> (f64, f64) {
    padded_range(
        panel.series_on(side).flat_map(|s| s.y.iter().copied()),
        AxisScale::Linear,
    )
}

/// Finite points only; NaN gaps would otherwise map to off-canvas pixels.
fn plot_points(s: &Series) -> Vec<(f64, f64)> {
    s.points()
        .map(|(x, y)| (x.as_f64(), y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    (x0, x1): (f64, f64),
    show_x_ticks: bool,
    inside_legend: bool,
    ticks: &TickFormat<'_>,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let layout = ticks.layout;
    let scale = panel.x_axis.scale;
    let span = x1 - x0;
    let (y0, y1) = y_range(panel, YAxisSide::Primary);

    let x_fmt = |v: &f64| {
        if show_x_ticks {
            format_x_tick(*v, scale, span, ticks.locale, ticks.dec_sep)
        } else {
            String::new()
        }
    };
    let y_fmt = |v: &f64| format_value_tick(*v, ticks.locale, ticks.dec_sep);

    let bottom_px = if show_x_ticks {
        X_LABEL_AREA_PX + ticks.desc_px(&panel.x_axis)
    } else {
        8
    };

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(MARGIN)
        .set_label_area_size(
            LabelAreaPosition::Left,
            ticks.y_label_area((y0, y1), &panel.y_axis),
        )
        .set_label_area_size(LabelAreaPosition::Bottom, bottom_px);

    match panel.secondary_y_axis.as_ref() {
        None => {
            let mut chart = builder
                .build_cartesian_2d(x0..x1, y0..y1)
                .map_err(|e| anyhow!("{:?}", e))?;
            configure_primary_mesh(&mut chart, panel, &x_fmt, &y_fmt, layout)?;
            for s in panel.series_on(YAxisSide::Primary) {
                draw_primary(&mut chart, s, inside_legend)?;
            }
            if inside_legend && !panel.series.is_empty() {
                draw_inside_labels(&mut chart, layout)?;
            }
        }
        Some(axis2) => {
            let (sy0, sy1) = y_range(panel, YAxisSide::Secondary);
            builder.set_label_area_size(
                LabelAreaPosition::Right,
                ticks.y_label_area((sy0, sy1), axis2),
            );
            let mut chart = builder
                .build_cartesian_2d(x0..x1, y0..y1)
                .map_err(|e| anyhow!("{:?}", e))?
                .set_secondary_coord(x0..x1, sy0..sy1);
            configure_primary_mesh(&mut *chart, panel, &x_fmt, &y_fmt, layout)?;

            let mut secondary = chart.configure_secondary_axes();
            secondary
                .y_labels(Y_LABELS)
                .y_label_formatter(&y_fmt)
                .label_style((FontFamily::SansSerif, layout.label_font_px))
                .axis_desc_style((FontFamily::SansSerif, layout.axis_desc_font_px));
            if let Some(t) = axis2.title.as_deref() {
                secondary.y_desc(t);
            }
            secondary.draw().map_err(|e| anyhow!("{:?}", e))?;

            for s in panel.series_on(YAxisSide::Primary) {
                draw_primary(&mut *chart, s, inside_legend)?;
            }
            for s in panel.series_on(YAxisSide::Secondary) {
                draw_secondary(&mut chart, s, inside_legend)?;
            }
            if inside_legend && !panel.series.is_empty() {
                draw_inside_labels(&mut *chart, layout)?;
            }
        }
    }
    Ok(())
}

fn configure_primary_mesh<'a, DB>(
    chart: &mut ChartContext<'a, DB, Coord2d>,
    panel: &Panel,
    x_fmt: &dyn Fn(&f64) -> String,
    y_fmt: &dyn Fn(&f64) -> String,
    layout: &Layout,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
{
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(X_LABELS)
        .y_labels(Y_LABELS)
        .x_label_formatter(x_fmt)
        .y_label_formatter(y_fmt)
        .label_style((FontFamily::SansSerif, layout.label_font_px))
        .axis_desc_style((FontFamily::SansSerif, layout.axis_desc_font_px));
    if let Some(t) = panel.x_axis.title.as_deref() {
        mesh.x_desc(t);
    }
    if let Some(t) = panel.y_axis.title.as_deref() {
        mesh.y_desc(t);
    }
    mesh.draw().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn attach_label<'a, DB>(anno: &mut SeriesAnno<'a, DB>, name: &str, color: RGBAColor)
where
    DB: DrawingBackend + 'a,
{
    anno.label(name).legend(move |(x, y)| {
        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(STROKE_PX))
    });
}

fn draw_primary<'a, DB>(
    chart: &mut ChartContext<'a, DB, Coord2d>,
    s: &Series,
    labeled: bool,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
{
    let color = rgba(s.color);
    let pts = plot_points(s);
    if s.mode.draws_line() {
        let anno = chart
            .draw_series(LineSeries::new(pts.clone(), color.stroke_width(STROKE_PX)))
            .map_err(|e| anyhow!("{:?}", e))?;
        if labeled && !s.mode.draws_markers() {
            attach_label(anno, &s.name, color);
        }
    }
    if s.mode.draws_markers() {
        let anno = chart
            .draw_series(
                pts.iter()
                    .map(|&(x, y)| Circle::new((x, y), MARKER_PX, color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
        if labeled {
            attach_label(anno, &s.name, color);
        }
    }
    Ok(())
}

fn draw_secondary<'a, DB>(
    chart: &mut DualCoordChartContext<'a, DB, Coord2d, Coord2d>,
    s: &Series,
    labeled: bool,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
{
    let color = rgba(s.color);
    let pts = plot_points(s);
    if s.mode.draws_line() {
        let anno = chart
            .draw_secondary_series(LineSeries::new(pts.clone(), color.stroke_width(STROKE_PX)))
            .map_err(|e| anyhow!("{:?}", e))?;
        if labeled && !s.mode.draws_markers() {
            attach_label(anno, &s.name, color);
        }
    }
    if s.mode.draws_markers() {
        let anno = chart
            .draw_secondary_series(
                pts.iter()
                    .map(|&(x, y)| Circle::new((x, y), MARKER_PX, color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
        if labeled {
            attach_label(anno, &s.name, color);
        }
    }
    Ok(())
}

fn draw_inside_labels<'a, DB>(chart: &mut ChartContext<'a, DB, Coord2d>, layout: &Layout) -> Result<()>
where
    DB: DrawingBackend + 'a,
{
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, layout.label_font_px + 2))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_gap_follows_spacing_when_it_fits() {
        assert_eq!(panel_half_gap(600, 3, 0.05), 15);
        assert_eq!(panel_half_gap(600, 1, 0.5), 0);
        assert_eq!(panel_half_gap(600, 3, 0.0), 0);
    }

    #[test]
    fn half_gap_never_swallows_a_panel() {
        // 6 panels at 0.9 would want 252px a side against a 93px cell.
        let gap = panel_half_gap(560, 6, 0.9);
        let cell = 560 / 6;
        assert!(gap * 2 <= cell / 2, "gap {gap} too large for cell {cell}");
        assert!(gap > 0);
        assert_eq!(panel_half_gap(560, 6, f64::NAN), 0);
    }
}
