//! Time-series figure builders.
//!
//! - [`single_series`]: one series in one panel
//! - [`dual_axis`]: two series in one panel, second on a secondary y-axis
//! - [`stacked_panels`]: one panel per table, stacked on a shared x-axis
//! - [`stacked_with_overlay`]: like `stacked_panels`, but the last table overlays the top panel
//! - [`overlay_all`]: every table in one panel, all but the first on the secondary y-axis
//!
//! The free functions use [`FigureConfig::default`] and draw connected lines without a title.
//! [`Charts`] exposes the same builders with an explicit config, render mode, and title.
//! All input checks run before the figure is assembled and fail with
//! [`ChartError::InvalidInput`].

use crate::config::FigureConfig;
use crate::error::{ChartError, Result};
use crate::figure::{Figure, Series, YAxisSide};
use crate::models::{LabeledTable, RenderMode, SeriesInput, XValue};

/// Convenience: single connected-line series with default config and no title.
pub fn single_series<X, XS, Y, YS>(
    x: XS,
    y: YS,
    name: &str,
    x_title: &str,
    y_title: &str,
) -> Result<Figure>
where
    X: Into<XValue>,
    XS: IntoIterator<Item = X>,
    Y: Into<f64>,
    YS: IntoIterator<Item = Y>,
{
    Charts::new(&FigureConfig::default()).single_series(
        x,
        y,
        name,
        x_title,
        y_title,
        RenderMode::Lines,
        None,
    )
}

/// Convenience: dual-axis overlay with default config, connected lines, no title.
pub fn dual_axis(
    first: &SeriesInput,
    second: &SeriesInput,
    x_title: &str,
    y_title_primary: &str,
    y_title_secondary: &str,
) -> Result<Figure> {
    Charts::new(&FigureConfig::default()).dual_axis(
        first,
        second,
        x_title,
        y_title_primary,
        y_title_secondary,
        RenderMode::Lines,
        None,
    )
}

/// Convenience: stacked panels with default config, connected lines, no title.
pub fn stacked_panels<S: AsRef<str>>(
    tables: &[LabeledTable],
    x_title: &str,
    names: &[S],
) -> Result<Figure> {
    Charts::new(&FigureConfig::default()).stacked_panels(
        tables,
        x_title,
        names,
        RenderMode::Lines,
        None,
    )
}

/// Convenience: stacked panels with the last table overlaid on the top panel.
pub fn stacked_with_overlay<S: AsRef<str>>(
    tables: &[LabeledTable],
    x_title: &str,
    names: &[S],
) -> Result<Figure> {
    Charts::new(&FigureConfig::default()).stacked_with_overlay(
        tables,
        x_title,
        names,
        RenderMode::Lines,
        None,
    )
}

/// Convenience: all tables in one panel with default config, connected lines, no title.
pub fn overlay_all<S: AsRef<str>>(
    tables: &[LabeledTable],
    names: &[S],
    x_title: &str,
) -> Result<Figure> {
    Charts::new(&FigureConfig::default()).overlay_all(tables, names, x_title, RenderMode::Lines, None)
}

/// Figure builders bound to an explicit [`FigureConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Charts<'a> {
    config: &'a FigureConfig,
}

impl<'a> Charts<'a> {
    pub fn new(config: &'a FigureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FigureConfig {
        self.config
    }

    /// One panel, one series on the primary y-axis.
    #[allow(clippy::too_many_arguments)]
    pub fn single_series<X, XS, Y, YS>(
        &self,
        x: XS,
        y: YS,
        name: &str,
        x_title: &str,
        y_title: &str,
        mode: RenderMode,
        title: Option<&str>,
    ) -> Result<Figure>
    where
        X: Into<XValue>,
        XS: IntoIterator<Item = X>,
        Y: Into<f64>,
        YS: IntoIterator<Item = Y>,
    {
        self.config.validate()?;
        let x: Vec<XValue> = x.into_iter().map(Into::into).collect();
        let y: Vec<f64> = y.into_iter().map(Into::into).collect();
        check_xy(name, x.len(), y.len())?;

        let mut fig = Figure::subplots(self.config, 1, false, &[])?;
        fig.add_series(0, self.series(0, name, x, y, mode, YAxisSide::Primary))?;
        fig.set_x_title(0, Some(x_title))?;
        fig.set_y_title(0, YAxisSide::Primary, Some(y_title))?;
        fig.set_title(title);
        Ok(finish("single-series", fig))
    }

    /// One panel; `first` is always on the primary y-axis and `second` on the secondary.
    #[allow(clippy::too_many_arguments)]
    pub fn dual_axis(
        &self,
        first: &SeriesInput,
        second: &SeriesInput,
        x_title: &str,
        y_title_primary: &str,
        y_title_secondary: &str,
        mode: RenderMode,
        title: Option<&str>,
    ) -> Result<Figure> {
        self.config.validate()?;
        check_xy(&first.name, first.x.len(), first.y.len())?;
        check_xy(&second.name, second.x.len(), second.y.len())?;

        let mut fig = Figure::subplots(self.config, 1, true, &[true])?;
        for (idx, (input, side)) in [(first, YAxisSide::Primary), (second, YAxisSide::Secondary)]
            .into_iter()
            .enumerate()
        {
            let series = self.series(idx, &input.name, input.x.clone(), input.y.clone(), mode, side);
            fig.add_series(0, series)?;
        }
        fig.set_x_title(0, Some(x_title))?;
        fig.set_y_title(0, YAxisSide::Primary, Some(y_title_primary))?;
        fig.set_y_title(0, YAxisSide::Secondary, Some(y_title_secondary))?;
        fig.set_title(title);
        Ok(finish("dual-axis", fig))
    }

    /// One panel per table, stacked in input order on a shared x-axis.
    ///
    /// The x-axis title goes on the bottom-most panel.
    pub fn stacked_panels<S: AsRef<str>>(
        &self,
        tables: &[LabeledTable],
        x_title: &str,
        names: &[S],
        mode: RenderMode,
        title: Option<&str>,
    ) -> Result<Figure> {
        self.config.validate()?;
        check_tables(tables, names, 1)?;

        let mut fig = Figure::subplots(self.config, tables.len(), true, &[])?;
        for (idx, (table, name)) in tables.iter().zip(names).enumerate() {
            fig.add_series(idx, self.table_series(idx, table, name.as_ref(), mode, YAxisSide::Primary))?;
        }
        fig.set_x_title(fig.bottom_row(), Some(x_title))?;
        fig.set_title(title);
        Ok(finish("stacked", fig))
    }

    /// Like [`Charts::stacked_panels`], but the last table is drawn on the top panel's
    /// secondary y-axis instead of getting a panel of its own.
    ///
    /// Needs at least two tables.
    pub fn stacked_with_overlay<S: AsRef<str>>(
        &self,
        tables: &[LabeledTable],
        x_title: &str,
        names: &[S],
        mode: RenderMode,
        title: Option<&str>,
    ) -> Result<Figure> {
        self.config.validate()?;
        check_tables(tables, names, 2)?;

        let (overlay, stacked) = tables
            .split_last()
            .ok_or_else(|| ChartError::invalid("no tables given"))?;
        let mut fig = Figure::subplots(self.config, stacked.len(), true, &[true])?;
        for (idx, table) in stacked.iter().enumerate() {
            let name = names[idx].as_ref();
            fig.add_series(idx, self.table_series(idx, table, name, mode, YAxisSide::Primary))?;
        }
        let last = tables.len() - 1;
        let overlay_name = names[last].as_ref();
        fig.add_series(0, self.table_series(last, overlay, overlay_name, mode, YAxisSide::Secondary))?;

        fig.set_x_title(fig.bottom_row(), Some(x_title))?;
        fig.set_title(title);
        Ok(finish("stacked+overlay", fig))
    }

    /// A single panel: the first table on the primary y-axis, every other table on
    /// one shared secondary y-axis.
    pub fn overlay_all<S: AsRef<str>>(
        &self,
        tables: &[LabeledTable],
        names: &[S],
        x_title: &str,
        mode: RenderMode,
        title: Option<&str>,
    ) -> Result<Figure> {
        self.config.validate()?;
        check_tables(tables, names, 1)?;

        let mut fig = Figure::subplots(self.config, 1, true, &[true])?;
        for (idx, (table, name)) in tables.iter().zip(names).enumerate() {
            let side = if idx == 0 {
                YAxisSide::Primary
            } else {
                YAxisSide::Secondary
            };
            fig.add_series(0, self.table_series(idx, table, name.as_ref(), mode, side))?;
        }
        fig.set_x_title(0, Some(x_title))?;
        fig.set_title(title);
        Ok(finish("overlay", fig))
    }

    fn series(
        &self,
        idx: usize,
        name: &str,
        x: Vec<XValue>,
        y: Vec<f64>,
        mode: RenderMode,
        side: YAxisSide,
    ) -> Series {
        Series::new(name, x, y, mode, side, self.config.series_color(idx))
    }

    fn table_series(
        &self,
        idx: usize,
        table: &LabeledTable,
        name: &str,
        mode: RenderMode,
        side: YAxisSide,
    ) -> Series {
        self.series(idx, name, table.index(), table.values(), mode, side)
    }
}

fn check_xy(name: &str, x_len: usize, y_len: usize) -> Result<()> {
    if x_len != y_len {
        return Err(ChartError::invalid(format!(
            "series {name:?}: x has {x_len} values but y has {y_len}"
        )));
    }
    if x_len == 0 {
        return Err(ChartError::invalid(format!("series {name:?} has no data")));
    }
    Ok(())
}

fn check_tables<S: AsRef<str>>(tables: &[LabeledTable], names: &[S], min: usize) -> Result<()> {
    if tables.len() < min {
        return Err(ChartError::invalid(format!(
            "need at least {min} table(s), got {}",
            tables.len()
        )));
    }
    if names.len() < tables.len() {
        return Err(ChartError::invalid(format!(
            "series name index {} out of range: {} names for {} tables",
            names.len(),
            names.len(),
            tables.len()
        )));
    }
    if names.len() > tables.len() {
        return Err(ChartError::invalid(format!(
            "{} names given for {} tables",
            names.len(),
            tables.len()
        )));
    }
    if let Some((i, _)) = tables.iter().enumerate().find(|(_, t)| t.is_empty()) {
        return Err(ChartError::invalid(format!(
            "table {i} ({:?}) has no rows",
            names[i].as_ref()
        )));
    }
    Ok(())
}

fn finish(kind: &str, fig: Figure) -> Figure {
    log::debug!(
        "built {kind} figure: {} panel(s), {} series",
        fig.panel_count(),
        fig.series_count()
    );
    fig
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn table(n: u32, scale: f64) -> LabeledTable {
        LabeledTable::from_rows("Value", (1..=n).map(|d| (day(d), d as f64 * scale)))
    }

    #[test]
    fn check_xy_messages() {
        let e = check_xy("A", 3, 2).unwrap_err();
        assert!(e.to_string().contains("x has 3 values but y has 2"));
        let e = check_xy("A", 0, 0).unwrap_err();
        assert!(e.to_string().contains("no data"));
        assert!(check_xy("A", 1, 1).is_ok());
    }

    #[test]
    fn check_tables_rejects_empty_table() {
        let tables = vec![table(2, 1.0), LabeledTable::default()];
        let e = check_tables(&tables, &["a", "b"], 1).unwrap_err();
        assert!(e.to_string().contains("table 1"));
    }

    #[test]
    fn series_colors_follow_table_order() {
        let cfg = FigureConfig::default();
        let tables = vec![table(2, 1.0), table(2, 2.0), table(2, 3.0)];
        let fig = Charts::new(&cfg)
            .stacked_with_overlay(&tables, "t", &["a", "b", "c"], RenderMode::Lines, None)
            .unwrap();
        let overlay = fig.panels[0].series_on(YAxisSide::Secondary).next().unwrap();
        assert_eq!(overlay.color, cfg.series_color(2));
        assert_eq!(fig.panels[1].series[0].color, cfg.series_color(1));
    }

    #[test]
    fn charts_build_with_their_own_config() {
        let cfg = FigureConfig {
            width: 640,
            ..FigureConfig::default()
        };
        let charts = Charts::new(&cfg);
        assert_eq!(charts.config().width, 640);
        let fig = charts
            .overlay_all(&[table(3, 1.0)], &["only"], "t", RenderMode::Markers, None)
            .unwrap();
        assert_eq!(fig.layout.width, 640);
    }

    #[test]
    fn too_many_stacked_panels_for_spacing_is_rejected() {
        let cfg = FigureConfig {
            vertical_spacing: 0.5,
            ..FigureConfig::default()
        };
        let tables = vec![table(2, 1.0), table(2, 2.0), table(2, 3.0)];
        let e = Charts::new(&cfg)
            .stacked_panels(&tables, "t", &["a", "b", "c"], RenderMode::Lines, None)
            .unwrap_err();
        assert!(e.is_invalid_input());
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let cfg = FigureConfig {
            width: 0,
            ..FigureConfig::default()
        };
        let e = Charts::new(&cfg)
            .single_series([1, 2], [1, 2], "a", "x", "y", RenderMode::Lines, None)
            .unwrap_err();
        assert!(e.is_invalid_input());
    }
}
