//! Legend layout and drawing functions for external legend placement.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::TextMetrics;
use super::types::LegendMode;

// Must match between the estimator and draw_legend_panel().
const PAD_BAND: i32 = 8;
const MARKER_RADIUS: i32 = 4;
const MARKER_TO_TEXT_GAP: i32 = 12;
const TRAILING_GAP: i32 = 16;
const ROW_GAP: i32 = 4;

fn line_height(font_px: u32) -> i32 {
    font_px as i32 + 2
}

/// Widest label we allow in a top/bottom band before truncating.
fn label_cap_px(start_x: i32, total_w: i32) -> u32 {
    (((total_w - start_x) as f32) * 0.35).max(140.0) as u32
}

fn item_width(label: &str, font_px: u32, cap_px: u32) -> i32 {
    let metrics = TextMetrics::new(font_px);
    let text = metrics.fit(label, cap_px);
    MARKER_RADIUS * 2 + MARKER_TO_TEXT_GAP + metrics.width_px(&text) as i32 + TRAILING_GAP
}

/// Greedy flow of legend items into rows starting at `start_x`. Returns the row of each item.
fn flow_rows(labels: &[String], start_x: i32, total_w: i32, font_px: u32) -> Vec<usize> {
    let cap = label_cap_px(start_x, total_w);
    let mut rows = Vec::with_capacity(labels.len());
    let mut row = 0usize;
    let mut x = start_x;
    for label in labels {
        let w = item_width(label, font_px, cap);
        if x > start_x && x + w > total_w {
            row += 1;
            x = start_x;
        }
        rows.push(row);
        x += w;
    }
    rows
}

/// Estimate how tall the TOP/BOTTOM legend band must be to fit all items. Returns pixels.
pub fn estimate_top_bottom_legend_height_px(
    labels: &[String],
    start_x: i32, // where first item should start (aligns to plot's Y-axis)
    total_w: i32, // full canvas width in pixels
    font_px: u32,
) -> i32 {
    let n_rows = flow_rows(labels, start_x, total_w, font_px)
        .last()
        .map(|r| r + 1)
        .unwrap_or(0) as i32;
    PAD_BAND * 2 + n_rows * line_height(font_px) + (n_rows - 1).max(0) * ROW_GAP
}

/// Draw legend entries (colored dot + label) into a dedicated area.
///
/// `Right` lists entries top to bottom; `Top`/`Bottom` flow them in rows starting at `start_x`.
/// `Inside` is handled by plotters' series labels and draws nothing here.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    mode: LegendMode,
    start_x: i32,
    font_px: u32,
) -> Result<()> {
    let (w, _h) = area.dim_in_pixel();
    let w = w as i32;
    let style = TextStyle::from((FontFamily::SansSerif, font_px)).pos(Pos::new(HPos::Left, VPos::Center));
    let line_h = line_height(font_px);
    let metrics = TextMetrics::new(font_px);

    let placements: Vec<(i32, i32, String)> = match mode {
        LegendMode::Inside => return Ok(()),
        LegendMode::Right => {
            let cap = (w - PAD_BAND * 2 - MARKER_RADIUS * 2 - MARKER_TO_TEXT_GAP).max(12) as u32;
            items
                .iter()
                .enumerate()
                .map(|(i, (label, _))| {
                    let y = PAD_BAND * 3 + i as i32 * (line_h + ROW_GAP);
                    (PAD_BAND, y, metrics.fit(label, cap))
                })
                .collect()
        }
        LegendMode::Top | LegendMode::Bottom => {
            let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
            let rows = flow_rows(&labels, start_x, w, font_px);
            let cap = label_cap_px(start_x, w);
            let mut out = Vec::with_capacity(labels.len());
            let mut x = start_x;
            let mut cur_row = 0usize;
            for (label, row) in labels.iter().zip(rows) {
                if row != cur_row {
                    cur_row = row;
                    x = start_x;
                }
                let y = PAD_BAND + line_h / 2 + row as i32 * (line_h + ROW_GAP);
                out.push((x, y, metrics.fit(label, cap)));
                x += item_width(label, font_px, cap);
            }
            out
        }
    };

    for ((x, y, text), (_, color)) in placements.into_iter().zip(items) {
        area.draw(&Circle::new((x + MARKER_RADIUS, y), MARKER_RADIUS, color.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&Text::new(
            text,
            (x + MARKER_RADIUS * 2 + MARKER_TO_TEXT_GAP, y),
            &style,
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_when_labels_fit() {
        let labels = vec!["A".to_string(), "B".to_string()];
        let h = estimate_top_bottom_legend_height_px(&labels, 60, 1000, 14);
        assert_eq!(h, PAD_BAND * 2 + line_height(14));
    }

    #[test]
    fn flows_into_more_rows_when_narrow() {
        let labels: Vec<String> = (0..12).map(|i| format!("Series number {i}")).collect();
        let rows = flow_rows(&labels, 40, 400, 14);
        assert!(*rows.last().unwrap() > 0);
        let h = estimate_top_bottom_legend_height_px(&labels, 40, 400, 14);
        assert!(h > PAD_BAND * 2 + line_height(14));
    }
}
