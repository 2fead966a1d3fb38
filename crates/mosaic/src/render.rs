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

//! Drawing primitives and the driver that feeds a [`RenderPlan`] to a
//! [`ChartBackend`].

use crate::error::Result;
use crate::geometry::RenderPlan;
use crate::palette::Rgb;

/// Plot area as fractions of the figure, measured from the bottom-left.
pub const PLOT_LEFT: f64 = 0.125;
pub const PLOT_RIGHT: f64 = 0.9;
pub const PLOT_BOTTOM: f64 = 0.11;
pub const PLOT_TOP: f64 = 0.88;
pub const ANNOTATION_POSITION: (f64, f64) = (0.88, 0.88);
pub const BAR_EDGE_WIDTH: f64 = 1.0;
pub const BASELINE_WIDTH: f64 = 2.0;
pub const Y_TICK_PAD: f64 = 3.5;
pub const TITLE_PAD: f64 = 6.0;
/// Area reserved for the summary table, in axes fractions.
const SUMMARY_BOX: (f64, f64, f64, f64) = (0.015, -0.92, 0.97, 0.8);

/// Drawing surface. `height_px` covers the figure plus `table_px` of
/// canvas below it when the summary table is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width_px: f64,
    pub height_px: f64,
    pub table_px: f64,
    pub dpi: f64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Frame {
    pub fn for_plan(plan: &RenderPlan) -> Self {
        let size = plan.style.figure_size;
        let dpi = plan.style.dpi;
        let figure_px = size.height * dpi;
        let table_px = if plan.style.show_summary_table {
            summary_overhang(figure_px) + plan.fonts.summary * dpi / 72.0
        } else {
            0.0
        };
        Self {
            width_px: size.width * dpi,
            height_px: figure_px + table_px,
            table_px,
            dpi,
            x_range: plan.x_range,
            y_range: plan.y_range,
        }
    }

    /// Same frame stretched over a `width_px` x `height_px` surface.
    pub fn scaled_to(&self, width_px: f64, height_px: f64) -> Self {
        let scale = (width_px / self.width_px).min(height_px / self.height_px);
        Self {
            width_px,
            height_px,
            table_px: self.table_px * height_px / self.height_px,
            dpi: self.dpi * scale,
            ..*self
        }
    }

    pub fn figure_height_px(&self) -> f64 {
        self.height_px - self.table_px
    }

    pub fn points_to_px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }

    /// Plot area in pixels: `(left, top, right, bottom)`, origin top-left.
    pub fn plot_area(&self) -> (f64, f64, f64, f64) {
        let figure = self.figure_height_px();
        (
            PLOT_LEFT * self.width_px,
            (1.0 - PLOT_TOP) * figure,
            PLOT_RIGHT * self.width_px,
            (1.0 - PLOT_BOTTOM) * figure,
        )
    }

    pub fn data_to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let (left, top, right, bottom) = self.plot_area();
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        (
            left + (x - x0) / (x1 - x0) * (right - left),
            bottom - (y - y0) / (y1 - y0) * (bottom - top),
        )
    }

    pub fn resolve(&self, anchor: Anchor) -> (f64, f64) {
        let (left, top, right, bottom) = self.plot_area();
        match anchor {
            Anchor::Data { x, y } => self.data_to_px(x, y),
            Anchor::XAxis { x, pad } => {
                (self.data_to_px(x, 0.0).0, bottom + self.points_to_px(pad))
            }
            Anchor::YAxis { y, pad } => (left - self.points_to_px(pad), self.data_to_px(0.0, y).1),
            Anchor::Title { pad } => ((left + right) / 2.0, top - self.points_to_px(pad)),
            Anchor::Axes { x, y } => (
                left + x * (right - left),
                bottom - y * (bottom - top),
            ),
            Anchor::Figure { x, y } => (x * self.width_px, (1.0 - y) * self.figure_height_px()),
        }
    }
}

/// Where a piece of text is attached. Pads are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Data { x: f64, y: f64 },
    XAxis { x: f64, pad: f64 },
    YAxis { y: f64, pad: f64 },
    Title { pad: f64 },
    /// Fractions of the plot area; may fall outside `0..1`.
    Axes { x: f64, y: f64 },
    /// Fractions of the figure (not the table canvas), from the bottom-left.
    Figure { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPrimitive {
    pub x: f64,
    pub width: f64,
    pub bottom: f64,
    pub height: f64,
    pub fill: Rgb,
    pub edge: Rgb,
    pub edge_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    /// May span several lines separated by `\n`.
    pub text: String,
    pub anchor: Anchor,
    /// Points.
    pub size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub y: f64,
    pub color: Rgb,
    /// Points.
    pub width: f64,
}

pub trait ChartBackend {
    type Output;

    fn begin(&mut self, frame: &Frame) -> Result<()>;
    fn bar(&mut self, bar: &BarPrimitive) -> Result<()>;
    fn text(&mut self, text: &TextPrimitive) -> Result<()>;
    fn baseline(&mut self, line: &LinePrimitive) -> Result<()>;
    fn finish(&mut self) -> Result<Self::Output>;
}

/// Emits the plan: bars, value labels, tick labels, baseline, title, the
/// `(%)` note and, when enabled, the summary table.
pub fn render<B: ChartBackend + ?Sized>(plan: &RenderPlan, backend: &mut B) -> Result<B::Output> {
    backend.begin(&Frame::for_plan(plan))?;
    for row in &plan.rows {
        for (column, segment) in plan.columns.iter().zip(&row.segments) {
            let Some(segment) = segment else { continue };
            backend.bar(&BarPrimitive {
                x: column.x_start,
                width: column.width,
                bottom: segment.bottom,
                height: segment.height,
                fill: row.color,
                edge: Rgb::GRAY,
                edge_width: BAR_EDGE_WIDTH,
            })?;
        }
    }
    for row in &plan.rows {
        for ((column, segment), label) in plan
            .columns
            .iter()
            .zip(&row.segments)
            .zip(&row.value_labels)
        {
            let Some(segment) = segment else { continue };
            if label.is_empty() {
                continue;
            }
            backend.text(&TextPrimitive {
                text: label.clone(),
                anchor: Anchor::Data {
                    x: column.x_tick,
                    y: segment.ytick,
                },
                size: plan.fonts.value_label,
                h_align: HAlign::Center,
                v_align: VAlign::Center,
                color: Rgb::BLACK,
            })?;
        }
    }
    for column in &plan.columns {
        backend.text(&TextPrimitive {
            text: column.x_label.clone(),
            anchor: Anchor::XAxis {
                x: column.x_tick,
                pad: plan.fonts.tick_pad,
            },
            size: plan.fonts.tick_label,
            h_align: HAlign::Center,
            v_align: VAlign::Top,
            color: Rgb::BLACK,
        })?;
    }
    for row in plan.rows.iter().filter(|r| !r.y_label.is_empty()) {
        backend.text(&TextPrimitive {
            text: row.y_label.clone(),
            anchor: Anchor::YAxis {
                y: row.y_tick,
                pad: Y_TICK_PAD,
            },
            size: plan.fonts.tick_label,
            h_align: HAlign::Right,
            v_align: VAlign::Center,
            color: Rgb::BLACK,
        })?;
    }
    backend.baseline(&LinePrimitive {
        y: 0.0,
        color: Rgb::GRAY,
        width: BASELINE_WIDTH,
    })?;
    backend.text(&TextPrimitive {
        text: plan.title.clone(),
        anchor: Anchor::Title { pad: TITLE_PAD },
        size: plan.fonts.title,
        h_align: HAlign::Center,
        v_align: VAlign::Bottom,
        color: Rgb::BLACK,
    })?;
    backend.text(&TextPrimitive {
        text: "(%)".to_string(),
        anchor: Anchor::Figure {
            x: ANNOTATION_POSITION.0,
            y: ANNOTATION_POSITION.1,
        },
        size: plan.fonts.annotation,
        h_align: HAlign::Right,
        v_align: VAlign::Top,
        color: Rgb::BLACK,
    })?;
    if plan.style.show_summary_table {
        summary_cells(plan)
            .iter()
            .try_for_each(|cell| backend.text(cell))?;
    }
    backend.finish()
}

/// Pixels by which the summary box reaches below a figure `figure_px` tall.
fn summary_overhang(figure_px: f64) -> f64 {
    let (_, y0, _, _) = SUMMARY_BOX;
    let axes_px = (PLOT_TOP - PLOT_BOTTOM) * figure_px;
    (-y0 * axes_px - PLOT_BOTTOM * figure_px).max(0.0)
}

fn summary_cells(plan: &RenderPlan) -> Vec<TextPrimitive> {
    let (x0, y0, width, height) = SUMMARY_BOX;
    let table = &plan.summary;
    let n_rows = table.rows.len() + 1;
    let n_cols = table.columns.len().max(1);
    let cell_w = width / n_cols as f64;
    let cell_h = height / n_rows as f64;
    let top = y0 + height;
    let cell = |text: &str, x: f64, y: f64, h_align: HAlign| TextPrimitive {
        text: text.to_string(),
        anchor: Anchor::Axes { x, y },
        size: plan.fonts.summary,
        h_align,
        v_align: VAlign::Center,
        color: Rgb::BLACK,
    };

    let mut cells = Vec::with_capacity(n_rows * (n_cols + 1));
    for (ci, name) in table.columns.iter().enumerate() {
        let x = x0 + cell_w * (ci as f64 + 0.5);
        cells.push(cell(name, x, top - cell_h / 2.0, HAlign::Center));
    }
    for (ri, row) in table.rows.iter().enumerate() {
        let y = top - cell_h * (ri as f64 + 1.5);
        cells.push(cell(&row.category, x0, y, HAlign::Right));
        for (ci, value) in row.cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let x = x0 + cell_w * (ci as f64 + 0.5);
            cells.push(cell(value, x, y, HAlign::Center));
        }
    }
    cells
}
