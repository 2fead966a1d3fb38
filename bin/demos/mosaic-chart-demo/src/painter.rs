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

//! Draws a mosaic chart straight onto an egui [`egui::Painter`].

use eframe::egui::{self, Align, Align2, Color32, FontId, Pos2, Rect, Stroke, StrokeKind};
use mosaic::render::{
    BarPrimitive, ChartBackend, Frame, HAlign, LinePrimitive, TextPrimitive, VAlign,
};
use mosaic::{RenderError, Result, Rgb};

pub struct EguiBackend<'a> {
    painter: &'a egui::Painter,
    area: Rect,
    frame: Option<Frame>,
}

impl<'a> EguiBackend<'a> {
    pub fn new(painter: &'a egui::Painter, area: Rect) -> Self {
        Self {
            painter,
            area,
            frame: None,
        }
    }

    fn frame(&self) -> Result<Frame> {
        self.frame.ok_or_else(|| {
            RenderError::Backend("egui backend used before begin()".to_string()).into()
        })
    }

    fn pos(&self, (x, y): (f64, f64)) -> Pos2 {
        self.area.min + egui::vec2(x as f32, y as f32)
    }
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

fn align(h: HAlign, v: VAlign) -> Align2 {
    let h = match h {
        HAlign::Left => Align::Min,
        HAlign::Center => Align::Center,
        HAlign::Right => Align::Max,
    };
    let v = match v {
        VAlign::Top => Align::Min,
        VAlign::Center => Align::Center,
        VAlign::Bottom => Align::Max,
    };
    Align2([h, v])
}

impl ChartBackend for EguiBackend<'_> {
    type Output = ();

    fn begin(&mut self, frame: &Frame) -> Result<()> {
        let scaled = frame.scaled_to(self.area.width() as f64, self.area.height() as f64);
        self.frame = Some(scaled);
        self.painter.rect_filled(self.area, 0.0, Color32::WHITE);
        Ok(())
    }

    fn bar(&mut self, bar: &BarPrimitive) -> Result<()> {
        let frame = self.frame()?;
        let rect = Rect::from_two_pos(
            self.pos(frame.data_to_px(bar.x, bar.bottom)),
            self.pos(frame.data_to_px(bar.x + bar.width, bar.bottom + bar.height)),
        );
        self.painter.rect_filled(rect, 0.0, color(bar.fill));
        self.painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(frame.points_to_px(bar.edge_width) as f32, color(bar.edge)),
            StrokeKind::Inside,
        );
        Ok(())
    }

    fn text(&mut self, text: &TextPrimitive) -> Result<()> {
        let frame = self.frame()?;
        self.painter.text(
            self.pos(frame.resolve(text.anchor)),
            align(text.h_align, text.v_align),
            &text.text,
            FontId::proportional(frame.points_to_px(text.size) as f32),
            color(text.color),
        );
        Ok(())
    }

    fn baseline(&mut self, line: &LinePrimitive) -> Result<()> {
        let frame = self.frame()?;
        let (x0, x1) = frame.x_range;
        self.painter.line_segment(
            [
                self.pos(frame.data_to_px(x0, line.y)),
                self.pos(frame.data_to_px(x1, line.y)),
            ],
            Stroke::new(frame.points_to_px(line.width) as f32, color(line.color)),
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
