use cm_graphs_core::config::{ChartKind, GraphConfig};
use cm_graphs_core::data::ChartData;
use cm_graphs_core::{Size, normalize_config, normalize_data};
use cm_graphs_layout::model::ChartLayout;
use cm_graphs_layout::{
    Chart, ChartController, ChartEvent, Error, LayoutOptions, LegendBearing, Scalable,
    SliderChart,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

fn build(config: Value, data: Value) -> cm_graphs_layout::Result<ChartController> {
    let cfg = normalize_config(&config, Some(&data))?;
    let records = normalize_data(&cfg, &data)?;
    ChartController::new(cfg, records, Size::new(600.0, 400.0), LayoutOptions::default())
}

fn record_events(chart: &mut ChartController) -> Rc<RefCell<Vec<ChartEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    seen
}

fn slider(events: bool) -> SliderChart {
    let config = json!({
        "type": "range-slider",
        "margin": {"top": 10, "right": 10, "bottom": 10, "left": 10},
        "events": {"rangeChanged": events, "rangeChanging": events}
    });
    let data = json!([
        {"label": "d", "value": 30},
        {"label": "a", "value": 0},
        {"label": "b", "value": 10},
        {"label": "e", "value": 40},
        {"label": "c", "value": 20}
    ]);
    let cfg = normalize_config(&config, None).expect("config");
    let ChartData::Slider(records) = normalize_data(&cfg, &data).expect("data") else {
        panic!("expected slider data");
    };
    let GraphConfig::RangeSlider(cfg) = cfg else {
        panic!("expected slider config");
    };
    SliderChart::new(cfg, records, Size::new(420.0, 100.0), LayoutOptions::default())
        .expect("slider")
}

fn values(chart: &SliderChart) -> Vec<f64> {
    chart.range().iter().map(|h| h.value).collect()
}

#[test]
fn mismatched_data_is_rejected() {
    let pie = normalize_config(&json!({"type": "pie"}), None).expect("config");
    let slices = normalize_data(&pie, &json!([{"label": "a", "value": 1}])).expect("data");
    let histogram = normalize_config(&json!({"type": "histogram"}), None).expect("config");

    let err = ChartController::new(histogram, slices, Size::new(100.0, 100.0), LayoutOptions::default())
        .unwrap_err();
    assert!(matches!(
        &err,
        Error::DataMismatch { chart, found } if chart == "histogram" && found == "slices"
    ));
}

#[test]
fn every_chart_accepts_empty_data() {
    let cases = [
        ("histogram", json!([])),
        ("line", json!([])),
        ("pie", json!([])),
        ("donut", json!([])),
        ("tree", json!([])),
        ("bubble-chart", json!([])),
        ("flow-chart", json!({})),
        ("range-slider", json!([])),
    ];
    for (kind, data) in cases {
        let chart = build(json!({"type": kind}), data).expect(kind);
        let snapshot = chart.snapshot();
        assert_eq!(snapshot.kind().as_str(), kind);
        assert_eq!(snapshot.to_value().expect("json")["type"], kind);
    }

    let ChartController::Pie(pie) = build(json!({"type": "pie"}), json!([])).expect("pie") else {
        panic!("expected a pie chart");
    };
    assert!(pie.layout().pie.bounds.is_none());
    assert!(pie.layout().viewport.fit.is_none());

    let ChartController::Slider(slider) =
        build(json!({"type": "range-slider"}), json!(null)).expect("slider")
    else {
        panic!("expected a slider");
    };
    assert!(slider.layout().slider.is_none());
    assert!(slider.range().is_empty());
}

#[test]
fn donut_snapshot_keeps_its_kind_and_legend() {
    let data = json!([
        {"label": "a", "value": 1},
        {"label": "b", "value": 2},
        {"label": "c", "value": 3}
    ]);
    let chart = build(
        json!({"type": "donut", "legend": {"enabled": true, "position": "right"}}),
        data,
    )
    .expect("donut");
    assert_eq!(chart.as_chart().kind(), ChartKind::Donut);
    let ChartLayout::Donut(layout) = chart.snapshot() else {
        panic!("expected a donut snapshot");
    };
    assert_eq!(layout.pie.slices.len(), 3);
    assert!(layout.pie.slices.iter().all(|s| s.inner_radius > 0.0));

    let ChartController::Pie(pie) = &chart else {
        panic!("expected a pie controller");
    };
    let legend = pie.legend().expect("legend");
    assert_eq!(legend.entries.len(), 3);
}

#[test]
fn pie_clicks_report_the_slice() {
    let mut chart = build(
        json!({"type": "pie", "events": {"clickOnElement": true}}),
        json!([{"id": "x", "label": "x", "value": 4}, {"id": "y", "label": "y", "value": 6}]),
    )
    .expect("pie");
    let seen = record_events(&mut chart);
    let ChartController::Pie(pie) = &mut chart else {
        panic!("expected a pie controller");
    };
    pie.click("y").expect("click");
    assert!(matches!(pie.click("z"), Err(Error::UnknownElement { .. })));

    let events = seen.borrow();
    let [ChartEvent::ClickOnElement { chart, record }] = events.as_slice() else {
        panic!("expected one click event, got {events:?}");
    };
    assert_eq!(*chart, ChartKind::Pie);
    assert_eq!(record["value"], 6.0);
}

#[test]
fn slider_orders_records_and_spans_the_track() {
    let chart = slider(false);
    assert_eq!(values(&chart), [0.0, 40.0]);
    let layout = chart.layout().slider.as_ref().expect("slider layout");
    assert_eq!(layout.track[0].x, 0.0);
    assert_eq!(layout.track[1].x, 400.0);
    let ticks: Vec<f64> = layout.ticks.iter().map(|t| t.0).collect();
    assert_eq!(ticks, [0.0, 100.0, 200.0, 300.0, 400.0]);
    assert_eq!(layout.handles[1].position.x, 400.0);
}

#[test]
fn dragging_a_handle_snaps_to_the_nearest_value() {
    let mut chart = slider(false);
    let before = chart.layout().clone();
    chart.drag_start(0).expect("handle");
    assert!(chart.drag(190.0));
    assert_eq!(values(&chart), [20.0, 40.0]);
    assert_eq!(chart.range()[0].label.as_deref(), Some("c"));
    assert!(chart.layout().generation > before.generation);
    assert_eq!(chart.layout().viewport.fit, before.viewport.fit);

    assert!(!chart.drag(400.0));
    assert_eq!(values(&chart), [20.0, 40.0]);
    chart.drag_end();

    assert!(matches!(
        chart.drag_start(5),
        Err(Error::InvalidHandle { index: 5 })
    ));
}

#[test]
fn track_clicks_move_the_nearest_handle() {
    let mut chart = slider(false);
    assert_eq!(chart.click(310.0), Some(1));
    assert_eq!(values(&chart), [0.0, 30.0]);
    assert_eq!(chart.click(90.0), Some(0));
    assert_eq!(values(&chart), [10.0, 30.0]);
}

#[test]
fn range_events_follow_the_configuration() {
    let mut quiet = slider(false);
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    quiet.events_mut().subscribe(move |_| *sink.borrow_mut() += 1);
    quiet.drag_start(1).expect("handle");
    quiet.drag(300.0);
    quiet.drag_end();
    assert_eq!(*count.borrow(), 0);

    let mut loud = slider(true);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    loud.events_mut().subscribe(move |e| sink.borrow_mut().push(e.clone()));
    loud.drag_start(1).expect("handle");
    assert!(loud.drag(300.0));
    loud.drag_end();
    loud.click(0.0);

    let events = seen.borrow();
    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], ChartEvent::RangeChanging { range } if range[1].value == 30.0));
    assert!(matches!(&events[1], ChartEvent::RangeChanged { .. }));
    assert!(matches!(&events[2], ChartEvent::RangeChanging { .. }));
    assert!(matches!(&events[3], ChartEvent::RangeChanged { .. }));
}

#[test]
fn resizing_lays_the_slider_out_again() {
    let mut chart = slider(false);
    chart.resize(Size::new(220.0, 100.0)).expect("resize");
    let layout = chart.layout().slider.as_ref().expect("slider layout");
    assert_eq!(layout.track[1].x, 200.0);
}

#[test]
fn flow_clicks_report_the_node() {
    let mut chart = build(
        json!({"type": "flow-chart", "events": {"clickOnElement": true}}),
        json!({
            "nodes": [{"id": "a", "label": "start"}, {"id": "b", "label": "end"}],
            "edges": [{"source": "a", "target": "b"}]
        }),
    )
    .expect("flow");
    let seen = record_events(&mut chart);
    let ChartController::Flow(flow) = &mut chart else {
        panic!("expected a flow controller");
    };
    assert!(flow.layout().viewport.fit.is_some());
    flow.click("b").expect("click");
    assert!(matches!(flow.click("c"), Err(Error::UnknownElement { .. })));

    let events = seen.borrow();
    let [ChartEvent::ClickOnElement { record, .. }] = events.as_slice() else {
        panic!("expected one click event, got {events:?}");
    };
    assert_eq!(record["label"], "end");
}
