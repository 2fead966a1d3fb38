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

//! In-memory SVG backend. Returns the document as a `String`; writing it
//! anywhere is up to the caller.

use crate::error::{RenderError, Result};
use crate::render::{
    BarPrimitive, ChartBackend, Frame, HAlign, LinePrimitive, TextPrimitive, VAlign,
};
use std::fmt::Write;

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";
const LINE_HEIGHT: f64 = 1.2;

#[derive(Debug, Default)]
pub struct SvgBackend {
    frame: Option<Frame>,
    out: String,
}

impl SvgBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self) -> Result<Frame> {
        self.frame.ok_or_else(|| {
            RenderError::Backend("SVG backend used before begin()".to_string()).into()
        })
    }
}

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn write_err(e: std::fmt::Error) -> crate::error::MosaicError {
    RenderError::Format(e).into()
}

impl ChartBackend for SvgBackend {
    type Output = String;

    fn begin(&mut self, frame: &Frame) -> Result<()> {
        self.frame = Some(*frame);
        self.out.clear();
        let (w, h) = (frame.width_px, frame.height_px);
        writeln!(self.out, r#"<?xml version="1.0" encoding="UTF-8"?>"#).map_err(write_err)?;
        writeln!(
            self.out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.2} {h:.2}">"#
        )
        .map_err(write_err)?;
        writeln!(
            self.out,
            r#"<rect x="0" y="0" width="{w:.2}" height="{h:.2}" fill="white"/>"#
        )
        .map_err(write_err)?;
        Ok(())
    }

    fn bar(&mut self, bar: &BarPrimitive) -> Result<()> {
        let frame = self.frame()?;
        let (x0, y_top) = frame.data_to_px(bar.x, bar.bottom + bar.height);
        let (x1, y_bottom) = frame.data_to_px(bar.x + bar.width, bar.bottom);
        writeln!(
            self.out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}"/>"#,
            x0,
            y_top,
            (x1 - x0).max(0.0),
            (y_bottom - y_top).max(0.0),
            bar.fill,
            bar.edge,
            frame.points_to_px(bar.edge_width),
        )
        .map_err(write_err)
    }

    fn text(&mut self, text: &TextPrimitive) -> Result<()> {
        let frame = self.frame()?;
        let (x, y) = frame.resolve(text.anchor);
        let size = frame.points_to_px(text.size);
        let line_height = size * LINE_HEIGHT;
        let lines: Vec<&str> = text.text.split('\n').collect();
        let span = (lines.len() - 1) as f64 * line_height;
        let (first_y, baseline) = match text.v_align {
            VAlign::Top => (y, "hanging"),
            VAlign::Center => (y - span / 2.0, "central"),
            VAlign::Bottom => (y - span, "alphabetic"),
        };
        let anchor = match text.h_align {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        write!(
            self.out,
            r#"<text x="{x:.2}" y="{first_y:.2}" font-family="{FONT_FAMILY}" font-size="{size:.2}" fill="{}" text-anchor="{anchor}" dominant-baseline="{baseline}">"#,
            text.color
        )
        .map_err(write_err)?;
        for (i, line) in lines.iter().enumerate() {
            let dy = if i == 0 { 0.0 } else { line_height };
            write!(
                self.out,
                r#"<tspan x="{x:.2}" dy="{dy:.2}">{}</tspan>"#,
                xml_escape(line)
            )
            .map_err(write_err)?;
        }
        writeln!(self.out, "</text>").map_err(write_err)
    }

    fn baseline(&mut self, line: &LinePrimitive) -> Result<()> {
        let frame = self.frame()?;
        let (left, _, right, _) = frame.plot_area();
        let (_, y) = frame.data_to_px(0.0, line.y);
        writeln!(
            self.out,
            r#"<line x1="{left:.2}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
            line.color,
            frame.points_to_px(line.width),
        )
        .map_err(write_err)
    }

    fn finish(&mut self) -> Result<String> {
        self.frame()?;
        writeln!(self.out, "</svg>").map_err(write_err)?;
        Ok(std::mem::take(&mut self.out))
    }
}
