use chrono::NaiveDate;
use serde_json::Value;
use tsfig::charts::Charts;
use tsfig::{Figure, FigureConfig, LabeledTable, RenderMode};

#[test]
fn figure_serializes_to_plain_json() {
    let cfg = FigureConfig::default();
    let day = |d| {
        NaiveDate::from_ymd_opt(2023, 3, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    };
    let a = LabeledTable::from_rows("Value", [(day(1), 1.0), (day(2), 2.0)]);
    let b = LabeledTable::from_rows("Value", [(day(1), 5.0), (day(2), 4.0)]);
    let fig = Charts::new(&cfg)
        .overlay_all(&[a, b], &["a", "b"], "when", RenderMode::LinesMarkers, Some("Both"))
        .unwrap();

    let v: Value = serde_json::to_value(&fig).unwrap();
    assert_eq!(v["title"], "Both");
    assert_eq!(v["layout"]["legend"], "bottom");
    let series = v["panels"][0]["series"].as_array().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0]["mode"], "lines+markers");
    assert_eq!(series[0]["y_axis"], "primary");
    assert_eq!(series[1]["y_axis"], "secondary");
    assert_eq!(series[0]["color"], "#4472C4");
    assert_eq!(series[0]["x"][0], "2023-03-01T12:00:00");
    assert_eq!(v["panels"][0]["x_axis"]["scale"], "date");

    let back: Figure = serde_json::from_value(v).unwrap();
    assert_eq!(back, fig);
}

#[test]
fn config_from_json_overrides_defaults() {
    let cfg = FigureConfig::from_json_str(
        r##"{ "width": 640, "legend": "right", "palette": ["#000000", "#FF0000"] }"##,
    )
    .unwrap();
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.height, FigureConfig::default().height);
    assert_eq!(cfg.series_color(3).to_hex(), "#FF0000");

    let fig = Charts::new(&cfg)
        .single_series([1, 2], [3, 4], "s", "x", "y", RenderMode::Markers, None)
        .unwrap();
    assert_eq!(fig.layout.width, 640);
    assert_eq!(fig.panels[0].series[0].color.to_hex(), "#000000");

    assert!(FigureConfig::from_json_str(r#"{ "width": 0 }"#).is_err());
    assert!(FigureConfig::from_json_str(r#"{ "palette": ["red"] }"#).is_err());
}

#[test]
fn non_finite_values_survive_json() {
    let fig = tsfig::charts::single_series(
        [1, 2, 3, 4],
        [1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY],
        "gappy",
        "x",
        "y",
    )
    .unwrap();
    let text = serde_json::to_string(&fig).unwrap();
    let back: Figure = serde_json::from_str(&text).unwrap();

    let y = &back.panels[0].series[0].y;
    assert_eq!(y.len(), 4);
    assert_eq!(y[0], 1.0);
    assert!(y[1].is_nan());
    assert_eq!(y[2], f64::INFINITY);
    assert_eq!(y[3], f64::NEG_INFINITY);

    // Figures written by other tools may use null for missing values.
    let mut v: Value = serde_json::from_str(&text).unwrap();
    v["panels"][0]["series"][0]["y"][1] = Value::Null;
    let back: Figure = serde_json::from_value(v).unwrap();
    assert!(back.panels[0].series[0].y[1].is_nan());
}
