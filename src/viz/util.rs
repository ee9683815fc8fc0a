//! Utility functions for visualization: colors, axis ranges, tick formatting, locale mapping.

use chrono::DateTime;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::TextMetrics;
use crate::config::Rgb8;
use crate::figure::AxisScale;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a palette color to a plotters color.
#[inline]
pub fn rgba(c: Rgb8) -> RGBAColor {
    RGBColor(c.r, c.g, c.b).to_rgba()
}

/// Min/max of the finite values, widened when the range collapses to a single value.
/// Falls back to `0..1` when nothing finite is left.
pub fn padded_range<I>(values: I, scale: AxisScale) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let (mut min, mut max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        let pad = match scale {
            AxisScale::Date => SECONDS_PER_DAY,
            AxisScale::Linear => 1.0,
        };
        min -= pad;
        max += pad;
    }
    (min, max)
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Y tick label: locale thousands separators for large magnitudes, otherwise
/// 0-2 decimals depending on size, with the locale's decimal separator.
pub fn format_value_tick(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        let n = v.round() as i64;
        return n.to_formatted_string(locale);
    }
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' {
        s
    } else {
        s.replace('.', &dec_sep.to_string())
    }
}

/// X tick label. Date axes hold seconds since the epoch; the format narrows to
/// hours and minutes when the visible span is shorter than two days.
pub fn format_x_tick(
    v: f64,
    scale: AxisScale,
    span: f64,
    locale: &Locale,
    dec_sep: char,
) -> String {
    match scale {
        AxisScale::Linear => format_value_tick(v, locale, dec_sep),
        AxisScale::Date => {
            let secs = v.floor() as i64;
            let Some(dt) = DateTime::from_timestamp(secs, 0) else {
                return String::new();
            };
            if span < 2.0 * SECONDS_PER_DAY {
                dt.format("%m-%d %H:%M").to_string()
            } else {
                dt.format("%Y-%m-%d").to_string()
            }
        }
    }
}

/// Compute a tight label area width for a Y axis (in pixels),
/// based on the formatted tick labels that will appear.
/// - `ymin..ymax`: the Y range you pass to Plotters
/// - `ticks`: how many Y labels you plan to show (e.g., 10)
/// - `font_px`: font size used for axis labels (e.g., 12)
/// - `desc_px`: font size of the axis title, or 0 when the axis is untitled
///
/// Returns a width clamped to a sensible range to avoid extremes.
pub fn compute_y_label_area_px(
    ymin: f64,
    ymax: f64,
    ticks: usize,
    font_px: u32,
    desc_px: u32,
    locale: &Locale,
    dec_sep: char,
) -> u32 {
    let metrics = TextMetrics::new(font_px);
    let mut max_px = 0u32;
    // Sample the same number of tick positions as you request from Plotters.
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        let s = format_value_tick(v, locale, dec_sep);
        max_px = max_px.max(metrics.width_px(&s));
    }

    // Add padding for tick marks & a little breathing room.
    let with_padding = max_px.saturating_add(18).clamp(48, 140);
    if desc_px > 0 {
        with_padding + desc_px + 6
    } else {
        with_padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_widens_single_values_and_skips_nan() {
        assert_eq!(padded_range([5.0, f64::NAN], AxisScale::Linear), (4.0, 6.0));
        assert_eq!(
            padded_range([100.0], AxisScale::Date),
            (100.0 - 86_400.0, 100.0 + 86_400.0)
        );
        assert_eq!(padded_range(Vec::<f64>::new(), AxisScale::Linear), (0.0, 1.0));
        assert_eq!(padded_range([3.0, -1.0, 2.0], AxisScale::Linear), (-1.0, 3.0));
    }

    #[test]
    fn value_ticks_follow_locale() {
        let (en_loc, en_sep) = map_locale("en");
        let (de_loc, de_sep) = map_locale("de_DE");
        assert_eq!(format_value_tick(30_000.0, en_loc, en_sep), "30,000");
        assert_eq!(format_value_tick(30_000.0, de_loc, de_sep), "30.000");
        assert_eq!(format_value_tick(1.5, de_loc, de_sep), "1,50");
        assert_eq!(format_value_tick(12.34, en_loc, en_sep), "12.3");
    }

    #[test]
    fn date_ticks_narrow_for_short_spans() {
        let (en_loc, sep) = map_locale("en");
        let v = 86_400.0 * 365.0; // 1971-01-01
        assert_eq!(
            format_x_tick(v, AxisScale::Date, 30.0 * 86_400.0, en_loc, sep),
            "1971-01-01"
        );
        assert_eq!(
            format_x_tick(v + 3600.0, AxisScale::Date, 3600.0, en_loc, sep),
            "01-01 01:00"
        );
    }

    #[test]
    fn y_label_area_grows_with_title() {
        let (en_loc, sep) = map_locale("en");
        let bare = compute_y_label_area_px(0.0, 10.0, 10, 12, 0, en_loc, sep);
        let titled = compute_y_label_area_px(0.0, 10.0, 10, 12, 16, en_loc, sep);
        assert!(bare >= 48);
        assert_eq!(titled, bare + 22);
    }
}
