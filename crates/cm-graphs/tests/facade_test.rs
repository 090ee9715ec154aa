use cm_graphs::{ChartKind, ChartLayout, ChartRequest, Charts, Error, layout_chart, normalized_config};
use serde_json::json;

fn request(config: serde_json::Value, data: serde_json::Value) -> ChartRequest {
    ChartRequest {
        config,
        data,
        width: 640.0,
        height: 480.0,
    }
}

#[test]
fn requests_parse_from_json() {
    let request = ChartRequest::from_json(
        r#"{"config": {"type": "line"}, "data": [{"label": "a", "values": [1, 2]}], "width": 300, "height": 200}"#,
    )
    .expect("request");
    assert_eq!(request.width, 300.0);
    assert_eq!(request.config["type"], "line");

    let no_data = ChartRequest::from_json(r#"{"config": {"type": "pie"}, "width": 1, "height": 1}"#)
        .expect("request");
    assert!(no_data.data.is_null());

    assert!(matches!(
        ChartRequest::from_json(r#"{"config": {}}"#),
        Err(Error::Request(_))
    ));
}

#[test]
fn layout_matches_the_chart_type() {
    let layout = layout_chart(&request(
        json!({"type": "histogram"}),
        json!([{"label": "a", "values": [1, 2]}, {"label": "b", "values": [3, 4]}]),
    ))
    .expect("layout");
    assert_eq!(layout.kind(), ChartKind::Histogram);
    let ChartLayout::Histogram(axis) = &layout else {
        panic!("expected a histogram layout");
    };
    assert_eq!(axis.bars.len(), 4);

    let value = layout.to_value().expect("json");
    assert_eq!(value["type"], "histogram");
    assert_eq!(value["generation"], 1);
}

#[test]
fn normalized_config_fills_in_defaults() {
    let config = normalized_config(&request(
        json!({"type": "histogram"}),
        json!([{"label": "a", "values": [1, 2, 3]}]),
    ))
    .expect("config");
    let value = config.to_value().expect("json");
    assert_eq!(value["type"], "histogram");
    assert_eq!(value["groupedType"], "inline");
    assert_eq!(value["groups"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["groups"][2]["label"], "Group-3");
}

#[test]
fn invalid_requests_are_reported() {
    let mut bad = request(json!({"type": "pie"}), json!([]));
    bad.width = 0.0;
    assert!(matches!(
        layout_chart(&bad),
        Err(Error::InvalidSize { .. })
    ));

    let err = layout_chart(&request(json!({"type": "gauge"}), json!([]))).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(cm_graphs::core::Error::UnsupportedChart { .. })
    ));

    let err = layout_chart(&request(json!({"type": "pie"}), json!([{"label": "a"}]))).unwrap_err();
    assert!(err.to_string().contains("data[0]"), "{err}");
}

#[test]
fn generated_ids_survive_a_second_layout() {
    let req = request(
        json!({"type": "pie"}),
        json!([{"label": "a", "value": 1}, {"label": "b", "value": 2}]),
    );
    let ids = |layout: &ChartLayout| -> Vec<String> {
        let ChartLayout::Pie(pie) = layout else {
            panic!("expected a pie layout");
        };
        let mut ids: Vec<String> = pie.pie.slices.iter().map(|s| s.data.id.clone()).collect();
        ids.sort();
        ids
    };

    let mut charts = Charts::new();
    let first = ids(&charts.layout(&req).expect("layout"));
    let second = ids(&charts.layout(&req).expect("layout"));
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
