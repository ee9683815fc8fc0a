//! tsfig
//!
//! A small Rust library that assembles figure descriptions for time-series display
//! and draws them with plotters.
//!
//! ### Features
//! - Single-series charts and dual-axis two-series overlays
//! - Stacked multi-panel charts on a shared x-axis, optionally with the last series
//!   overlaid on the top panel
//! - Single-panel overlays with one primary and one shared secondary y-axis
//! - Plain-data [`Figure`] output (comparable, serde-serializable) and a plotters
//!   adapter that draws it onto any drawing area
//!
//! ### Example
//! ```no_run
//! use plotters::prelude::*;
//! use tsfig::charts;
//!
//! let fig = charts::single_series([1, 2, 3], [10, 20, 30], "A", "t", "v")?;
//! assert_eq!(fig.panels[0].series[0].len(), 3);
//!
//! let mut svg = String::new();
//! {
//!     let root = SVGBackend::with_string(&mut svg, (fig.layout.width, fig.layout.height))
//!         .into_drawing_area();
//!     tsfig::viz::draw_figure(&root, &fig)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod charts;
pub mod config;
pub mod error;
pub mod figure;
pub mod models;
pub mod viz;

pub use charts::Charts;
pub use config::{FigureConfig, Rgb8};
pub use error::{ChartError, Result};
pub use figure::{Axis, AxisScale, Figure, Panel, Series, YAxisSide};
pub use models::{LabeledTable, Observation, RenderMode, SeriesInput, XValue};
