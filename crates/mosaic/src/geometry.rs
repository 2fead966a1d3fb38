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

use crate::config::ChartStyle;
use crate::error::{DataError, DataResult, Result};
use crate::palette::{assign_colors, Rgb};
use crate::tabulate::{ChartTitle, ColumnKey, ColumnShareSeries, CrossTabTable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TOTAL_BAR_WIDTH: f64 = 15.0;
pub const SPACER_BAR_WIDTH: f64 = 5.0;
/// Width shared by the real column categories.
pub const CATEGORY_WIDTH_BUDGET: f64 = 100.0;
/// Right edge of the last bar: `TOTAL + SPACER + CATEGORY_WIDTH_BUDGET`.
pub const X_AXIS_END: f64 = 120.0;
pub const X_MARGIN_FRACTION: f64 = 0.02;
pub const Y_AXIS_TOP: f64 = 105.0;
pub const SUMMARY_ROW_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub bottom: f64,
    pub height: f64,
    pub ytick: f64,
}

impl Segment {
    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarColumn {
    pub key: ColumnKey,
    pub x_start: f64,
    pub width: f64,
    pub x_tick: f64,
    /// `"<name>\n<percent>"`; the percent line is blank for `Total` and the
    /// spacer.
    pub x_label: String,
}

/// One row category's slice through every bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedRow {
    pub category: String,
    pub color: Rgb,
    /// Category name, or blank when its `Total` percent is too small.
    pub y_label: String,
    /// Midpoint of the `Total` segment, where the y label sits.
    pub y_tick: f64,
    /// Aligned with [`RenderPlan::columns`]; `None` in the spacer.
    pub segments: Vec<Option<Segment>>,
    pub value_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub category: String,
    pub cells: Vec<String>,
}

/// Integer percentages per row category, zeros left blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Font sizes in points, scaled from the figure height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub value_label: f64,
    pub tick_label: f64,
    pub title: f64,
    pub annotation: f64,
    pub summary: f64,
    pub tick_pad: f64,
}

impl FontSizes {
    pub fn for_height(height: f64) -> Self {
        Self {
            value_label: height * 2.0,
            tick_label: height * 2.1,
            title: height * 2.2,
            annotation: height * 2.0,
            summary: height * 1.8,
            tick_pad: height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub title: String,
    pub style: ChartStyle,
    pub fonts: FontSizes,
    pub min_display_value: f64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub columns: Vec<BarColumn>,
    /// Stacking order: the first row sits on the baseline, the row with
    /// the largest `Total` share ends up on top.
    pub rows: Vec<StackedRow>,
    pub summary: SummaryTable,
}

impl RenderPlan {
    pub fn widths(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.width).collect()
    }

    pub fn x_ticks(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.x_tick).collect()
    }

    pub fn y_ticks(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.y_tick).collect()
    }

    pub fn y_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.y_label.as_str()).collect()
    }

    pub fn row(&self, category: &str) -> Option<&StackedRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rounds half to even, the way the percentage labels are printed.
pub fn round_percent(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub fn build_geometry<R: Rng + ?Sized>(
    table: &CrossTabTable,
    shares: &ColumnShareSeries,
    style: &ChartStyle,
    min_display_value: f64,
    title: &ChartTitle,
    fixed_colors: &[Rgb],
    rng: &mut R,
) -> DataResult<RenderPlan> {
    if table.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    if shares.len() != table.columns().len() {
        return Err(DataError::ShapeMismatch {
            columns: table.columns().len(),
            shares: shares.len(),
        });
    }

    let percent: Vec<Vec<Option<f64>>> = table
        .rows()
        .iter()
        .map(|r| r.values.iter().map(|v| v.map(|x| x * 100.0)).collect())
        .collect();

    let columns = layout_columns(table, shares)?;
    let colors = assign_colors(fixed_colors, table.len(), rng);

    let n_cols = columns.len();
    let mut running = vec![0.0_f64; n_cols];
    let mut rows = Vec::with_capacity(table.len());
    for (ri, row) in table.rows().iter().enumerate().rev() {
        let values = &percent[ri];
        let mut segments = Vec::with_capacity(n_cols);
        let mut value_labels = Vec::with_capacity(n_cols);
        for (ci, &value) in values.iter().enumerate() {
            let segment = value.map(|height| {
                let bottom = running[ci];
                running[ci] += height;
                Segment {
                    bottom,
                    height,
                    ytick: (bottom + running[ci]) / 2.0,
                }
            });
            segments.push(segment);
            value_labels.push(value_label(value, min_display_value));
        }
        let total = values.first().copied().flatten().unwrap_or(0.0);
        let y_tick = segments
            .first()
            .copied()
            .flatten()
            .map_or(0.0, |s| s.ytick);
        rows.push(StackedRow {
            category: row.category.clone(),
            color: colors[ri],
            y_label: if total > min_display_value {
                row.category.clone()
            } else {
                String::new()
            },
            y_tick,
            segments,
            value_labels,
        });
    }

    let summary = summary_table(table, &percent);
    let margin = X_AXIS_END * X_MARGIN_FRACTION;
    debug!(rows = rows.len(), columns = n_cols, "built mosaic geometry");

    Ok(RenderPlan {
        title: title.to_string(),
        style: *style,
        fonts: FontSizes::for_height(style.figure_size.height),
        min_display_value,
        x_range: (-margin, X_AXIS_END + margin),
        y_range: (0.0, Y_AXIS_TOP),
        columns,
        rows,
        summary,
    })
}

fn layout_columns(
    table: &CrossTabTable,
    shares: &ColumnShareSeries,
) -> DataResult<Vec<BarColumn>> {
    let share_percent: Vec<f64> = shares
        .entries()
        .iter()
        .map(|(_, v)| v.unwrap_or(0.0) * 100.0)
        .collect();
    let category_sum: f64 = share_percent.iter().skip(2).sum();
    if category_sum.is_nan() || category_sum <= 0.0 {
        return Err(DataError::EmptyDataset);
    }

    let mut widths = Vec::with_capacity(share_percent.len());
    widths.push(TOTAL_BAR_WIDTH);
    widths.push(SPACER_BAR_WIDTH);
    widths.extend(
        share_percent
            .iter()
            .skip(2)
            .map(|p| CATEGORY_WIDTH_BUDGET * p / category_sum),
    );

    let mut starts = Vec::with_capacity(widths.len());
    let mut edge = 0.0;
    for w in &widths {
        starts.push(edge);
        edge += w;
    }
    let boundaries: Vec<f64> = starts
        .iter()
        .copied()
        .chain(std::iter::once(X_AXIS_END))
        .collect();

    Ok(table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let percent_line = if key.is_category() {
                round_percent(share_percent[i]).to_string()
            } else {
                String::new()
            };
            BarColumn {
                key: key.clone(),
                x_start: starts[i],
                width: widths[i],
                x_tick: (boundaries[i] + boundaries[i + 1]) / 2.0,
                x_label: format!("{}\n{}", key.label(), percent_line),
            }
        })
        .collect())
}

fn value_label(value: Option<f64>, min_display_value: f64) -> String {
    match value {
        Some(v) if v > min_display_value => round_percent(v).to_string(),
        _ => String::new(),
    }
}

fn summary_table(table: &CrossTabTable, percent: &[Vec<Option<f64>>]) -> SummaryTable {
    let keep: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, k)| **k != ColumnKey::Spacer)
        .map(|(i, _)| i)
        .collect();
    let columns = keep
        .iter()
        .map(|&i| table.columns()[i].label().to_string())
        .collect();
    let rows = table
        .rows()
        .iter()
        .zip(percent)
        .take(SUMMARY_ROW_LIMIT)
        .map(|(row, values)| SummaryRow {
            category: row.category.clone(),
            cells: keep
                .iter()
                .map(|&i| match round_percent(values[i].unwrap_or(0.0)) {
                    0 => String::new(),
                    n => n.to_string(),
                })
                .collect(),
        })
        .collect();
    SummaryTable { columns, rows }
}
