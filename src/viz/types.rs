//! Legend placement shared by figure layout and the renderer.

use serde::{Deserialize, Serialize};

/// Legend placement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendMode {
    /// Overlay legend inside each panel (may overlap data).
    Inside,
    /// Separate, non-overlapping legend panel on the right side.
    Right,
    /// Separate, non-overlapping legend band at the top.
    Top,
    /// Separate, non-overlapping legend band at the bottom.
    Bottom,
}

/// Default legend placement: one band under the bottom panel, so stacked panels keep
/// their full width. Override per figure via `FigureConfig::legend`.
pub const DEFAULT_LEGEND_MODE: LegendMode = LegendMode::Bottom;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_mode_json_is_lowercase() {
        assert_eq!(serde_json::to_string(&LegendMode::Right).unwrap(), "\"right\"");
        let m: LegendMode = serde_json::from_str("\"inside\"").unwrap();
        assert_eq!(m, LegendMode::Inside);
    }
}
