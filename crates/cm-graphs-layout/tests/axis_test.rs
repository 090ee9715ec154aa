use cm_graphs_core::config::{GroupedType, Orientation};
use cm_graphs_core::data::SeriesDatum;
use cm_graphs_core::{Size, normalize_config, normalize_data};
use cm_graphs_layout::axis::{AxisSpec, BAND_PADDING, ChartAxes, MarkKind, value_extent};
use cm_graphs_layout::{
    ChartController, ChartEvent, Error, LayoutOptions, LegendBearing, ScrollPaginated,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

const EPS: f64 = 1e-9;

fn series(rows: &[&[f64]]) -> Vec<SeriesDatum> {
    rows.iter()
        .enumerate()
        .map(|(i, values)| SeriesDatum {
            id: format!("r{i}"),
            label: format!("L{i}"),
            values: values.to_vec(),
            extra_data: json!({}),
        })
        .collect()
}

fn spec(grouped_type: GroupedType) -> AxisSpec {
    AxisSpec {
        marks: MarkKind::Bars,
        orientation: Orientation::Vertical,
        invert_x: false,
        invert_y: false,
        grouped_type,
        band_padding: BAND_PADDING,
    }
}

fn build(config: Value, data: Value) -> ChartController {
    let cfg = normalize_config(&config, Some(&data)).expect("config");
    let records = normalize_data(&cfg, &data).expect("data");
    ChartController::new(cfg, records, Size::new(600.0, 400.0), LayoutOptions::default())
        .expect("chart")
}

fn paged_histogram(len: usize, window: usize) -> ChartController {
    let data: Vec<Value> = (0..len)
        .map(|i| json!({"id": format!("r{i}"), "label": format!("L{i}"), "values": [i as f64 + 1.0]}))
        .collect();
    build(
        json!({"type": "histogram", "maxDisplayedNumber": window}),
        Value::Array(data),
    )
}

#[test]
fn stacked_extent_spans_running_sums_per_sign() {
    let data = series(&[&[-12.0, 34.0, -56.0], &[23.0, -5.0, 67.0]]);
    assert_eq!(value_extent(&data, GroupedType::Stacked), (-68.0, 90.0));
}

#[test]
fn inline_extent_spans_raw_values_with_zero() {
    let data = series(&[&[-12.0, 34.0, -56.0], &[23.0, -5.0, 67.0]]);
    assert_eq!(value_extent(&data, GroupedType::Inline), (-56.0, 67.0));

    let positive = series(&[&[3.0, 4.0]]);
    assert_eq!(value_extent(&positive, GroupedType::Inline), (0.0, 4.0));
}

#[test]
fn grouped_scale_spans_exactly_one_band() {
    let data = series(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]);
    let mut axes = ChartAxes::build(spec(GroupedType::Inline), &data, 600.0, 300.0);
    let grouped = axes.grouped.clone().expect("grouped scale");
    let band = axes.categories().bandwidth();
    assert_eq!(grouped.range(), [0.0, band]);
    let ratio = grouped.bandwidth() / band;

    axes.x.set_range([40.0, 300.0]);
    axes.sync_grouped();
    let grouped = axes.grouped.clone().expect("grouped scale");
    let band = axes.categories().bandwidth();
    assert_eq!(grouped.range(), [0.0, band]);
    assert!((grouped.bandwidth() / band - ratio).abs() < EPS);
}

#[test]
fn stacked_bars_share_one_slot() {
    let data = series(&[&[2.0, 3.0]]);
    let axes = ChartAxes::build(spec(GroupedType::Stacked), &data, 400.0, 200.0);
    let grouped = axes.grouped.as_ref().expect("grouped scale");
    assert_eq!(grouped.domain(), &[0]);
}

#[test]
fn paged_histogram_shows_the_first_window() {
    let chart = paged_histogram(20, 5);
    let ChartController::Axis(chart) = chart else {
        panic!("expected an axis chart");
    };
    let layout = chart.layout();
    assert_eq!(layout.window_start, 0);
    let labels: Vec<&str> = layout.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["L0", "L1", "L2", "L3", "L4"]);

    let state = chart.scroll().expect("scroll state");
    assert_eq!(state.len, 20);
    assert_eq!(state.window, 5);
    assert!((state.handle_length - state.track_length * 5.0 / 20.0).abs() < EPS);
    assert_eq!(state.handle_offset, 0.0);

    let preview = layout.scroll.as_ref().expect("scroll preview");
    assert_eq!(preview.bars.len(), 20);
}

#[test]
fn dragging_redraws_the_window_without_refitting() {
    let ChartController::Axis(mut chart) = paged_histogram(20, 5) else {
        panic!("expected an axis chart");
    };
    let before = chart.layout().clone();
    let track = chart.scroll().expect("scroll state").track_length;

    let index = chart
        .drag_scroll(track / 2.0)
        .expect("drag")
        .expect("window moved");
    assert!(index > 0 && index <= 15);
    let after = chart.layout();
    assert_eq!(after.window_start, index);
    assert!(after.generation > before.generation);
    assert_eq!(after.viewport.fit, before.viewport.fit);
    assert_eq!(after.bars[0].label, format!("L{index}"));
    assert_eq!(after.scroll.as_ref().expect("preview").state.index, index);

    let generation = chart.layout().generation;
    assert_eq!(chart.drag_scroll(track).expect("drag"), None);
    assert_eq!(chart.layout().generation, generation);

    chart.end_scroll().expect("end");
    assert_eq!(chart.layout().window_start, index);
    assert!(chart.layout().generation > generation);
}

#[test]
fn unpaged_chart_has_no_scroll() {
    let ChartController::Axis(mut chart) = paged_histogram(4, 5) else {
        panic!("expected an axis chart");
    };
    assert!(chart.scroll().is_none());
    assert!(chart.layout().scroll.is_none());
    assert_eq!(chart.drag_scroll(10.0).expect("drag"), None);
}

#[test]
fn legend_is_laid_out_when_enabled() {
    let chart = build(
        json!({"type": "line", "legend": {"enabled": true, "position": "bottom"}}),
        json!([{"label": "a", "values": [1, 2]}, {"label": "b", "values": [3, 4]}]),
    );
    let ChartController::Axis(chart) = chart else {
        panic!("expected an axis chart");
    };
    let legend = chart.legend().expect("legend");
    assert_eq!(legend.entries.len(), 2);
    assert_eq!(chart.layout().lines.len(), 2);
}

#[test]
fn click_reports_the_clicked_value() {
    let mut chart = build(
        json!({"type": "histogram", "events": {"clickOnElement": true}}),
        json!([{"id": "a", "label": "A", "values": [4, 7]}]),
    );
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    let ChartController::Axis(axis) = &mut chart else {
        panic!("expected an axis chart");
    };
    axis.click("a", 1).expect("click");
    let events = seen.borrow();
    let [ChartEvent::ClickOnElement { record, .. }] = events.as_slice() else {
        panic!("expected one click event, got {events:?}");
    };
    assert_eq!(record["value"], 7.0);
    assert_eq!(record["series"], 1);
    drop(events);

    assert!(matches!(
        axis.click("missing", 0),
        Err(Error::UnknownElement { .. })
    ));
}

#[test]
fn click_is_silent_when_disabled() {
    let mut chart = build(
        json!({"type": "histogram"}),
        json!([{"id": "a", "label": "A", "values": [4]}]),
    );
    let seen = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&seen);
    chart.subscribe(move |_| *sink.borrow_mut() += 1);
    let ChartController::Axis(axis) = &mut chart else {
        panic!("expected an axis chart");
    };
    axis.click("a", 0).expect("click");
    assert_eq!(*seen.borrow(), 0);
}
