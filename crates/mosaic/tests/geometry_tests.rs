// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use mosaic::geometry::round_percent;
use mosaic::palette::RANDOM_COLOR_ALPHABET;
use mosaic::{MosaicChart, MosaicConfig, RecordSet, Rgb};
use rand::rngs::StdRng;
use rand::SeedableRng;

const EPS: f64 = 1e-9;

fn sample() -> RecordSet {
    RecordSet::from_str_rows(
        &["r", "c"],
        &[
            &[Some("A"), Some("X")],
            &[Some("A"), Some("X")],
            &[Some("B"), Some("X")],
            &[Some("A"), Some("Y")],
        ],
    )
    .unwrap()
}

fn plan_for(records: &RecordSet, config: MosaicConfig) -> mosaic::RenderPlan {
    let mut rng = StdRng::seed_from_u64(7);
    MosaicChart::new(config)
        .unwrap()
        .plan_with_rng(records, &mut rng)
        .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn bar_layout_reserves_total_and_spacer() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    let widths = plan.widths();
    assert_eq!(widths.len(), 4);
    assert!(close(widths[0], 15.0));
    assert!(close(widths[1], 5.0));
    assert!(close(widths[2], 75.0));
    assert!(close(widths[3], 25.0));

    let starts: Vec<f64> = plan.columns.iter().map(|c| c.x_start).collect();
    for (got, want) in starts.iter().zip([0.0, 15.0, 20.0, 95.0]) {
        assert!(close(*got, want), "start {got} != {want}");
    }
    for (got, want) in plan.x_ticks().iter().zip([7.5, 17.5, 57.5, 107.5]) {
        assert!(close(*got, want), "tick {got} != {want}");
    }
}

#[test]
fn x_labels_carry_rounded_shares() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    let labels: Vec<&str> = plan.columns.iter().map(|c| c.x_label.as_str()).collect();
    assert_eq!(labels, vec!["Total\n", "\n", "X\n75", "Y\n25"]);
}

#[test]
fn rows_stack_from_smallest_total_upwards() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    let order: Vec<&str> = plan.rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(order, vec!["B", "A"]);

    let b = plan.row("B").unwrap();
    let a = plan.row("A").unwrap();

    let b_total = b.segments[0].unwrap();
    assert!(close(b_total.bottom, 0.0));
    assert!(close(b_total.height, 25.0));
    assert!(close(b_total.ytick, 12.5));

    let a_total = a.segments[0].unwrap();
    assert!(close(a_total.bottom, 25.0));
    assert!(close(a_total.height, 75.0));
    assert!(close(a_total.ytick, 62.5));
    assert!(close(a.y_tick, 62.5));

    let a_x = a.segments[2].unwrap();
    assert!(close(a_x.bottom, 100.0 / 3.0));
    assert!(close(a_x.top(), 100.0));

    assert!(a.segments[1].is_none());
    assert!(b.segments[1].is_none());
}

#[test]
fn top_segment_reaches_full_height() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    let top = plan.rows.last().unwrap();
    for (i, segment) in top.segments.iter().enumerate() {
        match segment {
            Some(s) => assert!(close(s.top(), 100.0), "column {i} tops at {}", s.top()),
            None => assert_eq!(i, 1),
        }
    }
}

#[test]
fn value_labels_hide_small_and_missing_values() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    assert_eq!(plan.row("B").unwrap().value_labels, vec!["25", "", "33", ""]);
    assert_eq!(plan.row("A").unwrap().value_labels, vec!["75", "", "67", "100"]);
}

fn threshold_records(small: usize) -> RecordSet {
    let rows = (0..1000)
        .map(|i| {
            let r = if i < small { "small" } else { "large" };
            vec![Some(r.to_string()), Some("X".to_string())]
        })
        .collect();
    RecordSet::with_rows(["r", "c"], rows).unwrap()
}

#[test]
fn y_label_suppressed_at_or_below_threshold() {
    let config = MosaicConfig::new("r", "c").with_min_display_value(3.0);
    let plan = plan_for(&threshold_records(29), config.clone());
    assert_eq!(plan.row("small").unwrap().y_label, "");
    assert_eq!(plan.row("large").unwrap().y_label, "large");

    let plan = plan_for(&threshold_records(31), config);
    assert_eq!(plan.row("small").unwrap().y_label, "small");
}

#[test]
fn y_label_threshold_is_strict() {
    let config = MosaicConfig::new("r", "c").with_min_display_value(25.0);
    let plan = plan_for(&sample(), config);
    assert_eq!(plan.row("B").unwrap().y_label, "");
    assert_eq!(plan.row("B").unwrap().value_labels[0], "");
    assert_eq!(plan.y_labels(), vec!["", "A"]);
}

#[test]
fn fixed_colours_follow_table_row_order() {
    let config = MosaicConfig::new("r", "c").with_fixed_colors(["#112233", "#445566"]);
    let plan = plan_for(&sample(), config);
    assert_eq!(plan.row("A").unwrap().color, Rgb::new(0x11, 0x22, 0x33));
    assert_eq!(plan.row("B").unwrap().color, Rgb::new(0x44, 0x55, 0x66));
}

#[test]
fn mismatched_fixed_colours_fall_back_to_random() {
    let config = MosaicConfig::new("r", "c").with_fixed_colors(["#112233"]);
    let plan = plan_for(&sample(), config);
    for row in &plan.rows {
        assert_ne!(row.color, Rgb::new(0x11, 0x22, 0x33));
        let hex = row.color.to_hex();
        assert_eq!(hex.len(), 7);
        assert!(hex[1..].bytes().all(|b| RANDOM_COLOR_ALPHABET.contains(&b)), "{hex}");
    }
}

#[test]
fn same_seed_gives_same_colours() {
    let config = MosaicConfig::new("r", "c");
    let first = plan_for(&sample(), config.clone());
    let second = plan_for(&sample(), config);
    let colours = |p: &mosaic::RenderPlan| p.rows.iter().map(|r| r.color).collect::<Vec<_>>();
    assert_eq!(colours(&first), colours(&second));
}

#[test]
fn summary_table_rounds_and_blanks_zeros() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    assert_eq!(plan.summary.columns, vec!["Total", "X", "Y"]);
    assert_eq!(plan.summary.rows[0].category, "A");
    assert_eq!(plan.summary.rows[0].cells, vec!["75", "67", "100"]);
    assert_eq!(plan.summary.rows[1].cells, vec!["25", "33", ""]);
}

#[test]
fn summary_table_keeps_first_twenty_rows() {
    let rows = (0..30)
        .map(|i| vec![Some(format!("r{i:02}")), Some("X".to_string())])
        .collect();
    let records = RecordSet::with_rows(["r", "c"], rows).unwrap();
    let plan = plan_for(&records, MosaicConfig::new("r", "c"));
    assert_eq!(plan.rows.len(), 30);
    assert_eq!(plan.summary.rows.len(), 20);
    assert_eq!(plan.summary.rows[0].category, "r00");
}

#[test]
fn custom_title_overrides_derived_one() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c").with_title("Share"));
    assert_eq!(plan.title, "Share");
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    assert_eq!(plan.title, "r by c");
}

#[test]
fn font_sizes_scale_with_figure_height() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c").with_figure_size(12.0, 6.0));
    assert!(close(plan.fonts.value_label, 12.0));
    assert!(close(plan.fonts.tick_label, 12.6));
    assert!(close(plan.fonts.title, 13.2));
    assert!(close(plan.x_range.0, -2.4));
    assert!(close(plan.x_range.1, 122.4));
}

#[test]
fn rounding_is_half_to_even() {
    assert_eq!(round_percent(2.5), 2);
    assert_eq!(round_percent(3.5), 4);
    assert_eq!(round_percent(66.666), 67);
}

#[test]
fn plan_serialises_to_json() {
    let plan = plan_for(&sample(), MosaicConfig::new("r", "c"));
    let json = plan.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "r by c");
    assert_eq!(value["rows"].as_array().unwrap().len(), 2);
    assert!(value["rows"][0]["color"].as_str().unwrap().starts_with('#'));
}
