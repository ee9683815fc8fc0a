use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChartError, Result};

/// Column name used when a table is built without an explicit one.
pub const DEFAULT_VALUE_COLUMN: &str = "Value";

/// One x coordinate. Numbers and timestamps never share an axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XValue {
    Number(f64),
    Timestamp(NaiveDateTime),
}

impl XValue {
    pub fn is_timestamp(&self) -> bool {
        matches!(self, XValue::Timestamp(_))
    }

    /// Position on a continuous axis. Timestamps map to seconds since the Unix epoch.
    pub fn as_f64(&self) -> f64 {
        match *self {
            XValue::Number(v) => v,
            XValue::Timestamp(ts) => ts.and_utc().timestamp_millis() as f64 / 1000.0,
        }
    }
}

impl From<f64> for XValue {
    fn from(v: f64) -> Self {
        XValue::Number(v)
    }
}

impl From<i32> for XValue {
    fn from(v: i32) -> Self {
        XValue::Number(v as f64)
    }
}

impl From<i64> for XValue {
    fn from(v: i64) -> Self {
        XValue::Number(v as f64)
    }
}

impl From<NaiveDateTime> for XValue {
    fn from(ts: NaiveDateTime) -> Self {
        XValue::Timestamp(ts)
    }
}

impl From<NaiveDate> for XValue {
    fn from(d: NaiveDate) -> Self {
        XValue::Timestamp(d.and_time(chrono::NaiveTime::MIN))
    }
}

/// How a series' points are drawn. Names follow the plotly `mode` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// Connected line (default).
    #[default]
    #[serde(rename = "lines")]
    Lines,
    /// Discrete markers only.
    #[serde(rename = "markers")]
    Markers,
    /// Line + markers overlay.
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Lines => "lines",
            RenderMode::Markers => "markers",
            RenderMode::LinesMarkers => "lines+markers",
        }
    }

    pub fn draws_line(&self) -> bool {
        matches!(self, RenderMode::Lines | RenderMode::LinesMarkers)
    }

    pub fn draws_markers(&self) -> bool {
        matches!(self, RenderMode::Markers | RenderMode::LinesMarkers)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = ChartError;

    /// Accepts `lines`, `markers`, `lines+markers` (also `markers+lines`), case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(RenderMode::Lines),
            "markers" | "marker" => Ok(RenderMode::Markers),
            "lines+markers" | "markers+lines" => Ok(RenderMode::LinesMarkers),
            other => Err(ChartError::invalid(format!("unknown render mode {other:?}"))),
        }
    }
}

/// One complete series handed to the dual-axis builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInput {
    pub name: String,
    pub x: Vec<XValue>,
    #[serde(with = "float_serde::vec")]
    pub y: Vec<f64>,
}

impl SeriesInput {
    pub fn new<X, XS, YS>(name: impl Into<String>, x: XS, y: YS) -> Self
    where
        X: Into<XValue>,
        XS: IntoIterator<Item = X>,
        YS: IntoIterator<Item = f64>,
    {
        Self {
            name: name.into(),
            x: x.into_iter().map(Into::into).collect(),
            y: y.into_iter().collect(),
        }
    }
}

/// One row of a [`LabeledTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    /// Some exports encode values as strings, others as numbers.
    /// Accept both and normalize to `f64`.
    #[serde(with = "float_serde")]
    pub value: f64,
}

/// Serde helpers for `f64` values that may be NaN or infinite.
///
/// JSON has no literal for non-finite numbers, so they are written as the strings
/// `"NaN"`, `"inf"` and `"-inf"`. Reading accepts numbers, numeric strings, and
/// `null` (as NaN).
pub(crate) mod float_serde {
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    struct F64Visitor;

    impl<'de> Visitor<'de> for F64Visitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a string or number representing a numeric value")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<f64>().map_err(E::custom)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(f64::NAN)
        }
    }

    struct Wire(f64);

    impl Serialize for Wire {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            let v = self.0;
            if v.is_nan() {
                s.serialize_str("NaN")
            } else if v.is_infinite() {
                s.serialize_str(if v > 0.0 { "inf" } else { "-inf" })
            } else {
                s.serialize_f64(v)
            }
        }
    }

    impl<'de> Deserialize<'de> for Wire {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_any(F64Visitor).map(Wire)
        }
    }

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        Wire(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(F64Visitor)
    }

    /// Same encoding, for a whole column of values.
    pub mod vec {
        use super::Wire;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &[f64], s: S) -> Result<S::Ok, S::Error> {
            s.collect_seq(v.iter().map(|&x| Wire(x)))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
            let wire = Vec::<Wire>::deserialize(d)?;
            Ok(wire.into_iter().map(|w| w.0).collect())
        }
    }
}

fn default_column() -> String {
    DEFAULT_VALUE_COLUMN.to_string()
}

/// Time-indexed data with a single named value column.
///
/// The timestamp index becomes the x values of a series and the value column its y values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTable {
    #[serde(default = "default_column")]
    pub column: String,
    #[serde(default)]
    pub rows: Vec<Observation>,
}

impl Default for LabeledTable {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_COLUMN)
    }
}

impl LabeledTable {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows<I>(column: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        Self {
            column: column.into(),
            rows: rows
                .into_iter()
                .map(|(timestamp, value)| Observation { timestamp, value })
                .collect(),
        }
    }

    /// Build a table from an index column and a value column of equal length.
    pub fn from_columns(
        column: impl Into<String>,
        index: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if index.len() != values.len() {
            return Err(ChartError::invalid(format!(
                "index has {} entries but value column has {}",
                index.len(),
                values.len()
            )));
        }
        Ok(Self::from_rows(column, index.into_iter().zip(values)))
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, value: f64) {
        self.rows.push(Observation { timestamp, value });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> Vec<XValue> {
        self.rows.iter().map(|r| XValue::Timestamp(r.timestamp)).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn render_mode_parses_plotly_names() {
        assert_eq!("lines".parse::<RenderMode>().unwrap(), RenderMode::Lines);
        assert_eq!("Markers".parse::<RenderMode>().unwrap(), RenderMode::Markers);
        assert_eq!(
            "markers+lines".parse::<RenderMode>().unwrap(),
            RenderMode::LinesMarkers
        );
        assert!("bars".parse::<RenderMode>().unwrap_err().is_invalid_input());
        assert_eq!(RenderMode::LinesMarkers.to_string(), "lines+markers");
        assert_eq!(RenderMode::default(), RenderMode::Lines);
    }

    #[test]
    fn from_columns_rejects_length_mismatch() {
        let err = LabeledTable::from_columns("Value", vec![ts(1), ts(2)], vec![1.0]).unwrap_err();
        assert!(err.is_invalid_input());
        let ok = LabeledTable::from_columns("Value", vec![ts(1), ts(2)], vec![1.0, 2.0]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.values(), vec![1.0, 2.0]);
        assert_eq!(ok.index()[1], XValue::Timestamp(ts(2)));
    }

    #[test]
    fn observation_value_accepts_string_or_number() {
        let t: LabeledTable = serde_json::from_str(
            r#"{"rows":[
                {"timestamp":"2024-01-01T00:00:00","value":"1.5"},
                {"timestamp":"2024-01-02T00:00:00","value":2}
            ]}"#,
        )
        .unwrap();
        assert_eq!(t.column, DEFAULT_VALUE_COLUMN);
        assert_eq!(t.values(), vec![1.5, 2.0]);
    }

    #[test]
    fn observation_value_keeps_non_finite_through_json() {
        let mut t = LabeledTable::new("Value");
        t.push(ts(1), f64::NAN);
        t.push(ts(2), f64::NEG_INFINITY);
        let text = serde_json::to_string(&t).unwrap();
        assert!(text.contains("\"NaN\"") && text.contains("\"-inf\""));
        let back: LabeledTable = serde_json::from_str(&text).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back.values()[0].is_nan());
        assert_eq!(back.values()[1], f64::NEG_INFINITY);

        let nulls: LabeledTable = serde_json::from_str(
            r#"{"rows":[{"timestamp":"2024-01-01T00:00:00","value":null}]}"#,
        )
        .unwrap();
        assert!(nulls.values()[0].is_nan());
    }

    #[test]
    fn date_converts_to_midnight_timestamp() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        let x = XValue::from(d);
        assert!(x.is_timestamp());
        assert_eq!(x.as_f64(), 86_400.0);
        assert_eq!(XValue::from(3).as_f64(), 3.0);
    }
}
