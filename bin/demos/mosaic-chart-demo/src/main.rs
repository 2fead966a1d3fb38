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

mod painter;

use anyhow::Context;
use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn, Level};

use mosaic::render::render;
use mosaic::{
    CategoryOrder, FilterSpec, MosaicChart, MosaicConfig, MosaicError, RecordSet, RenderPlan,
    SvgBackend,
};
use painter::EguiBackend;

fn main() -> std::result::Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter("info")
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Mosaic Chart"),
        ..Default::default()
    };
    eframe::run_native(
        "Mosaic Chart",
        options,
        Box::new(|_cc| Ok(Box::new(MosaicApp::new(MosaicConfig::load_or_default())))),
    )
}

struct MosaicApp {
    config: MosaicConfig,
    selected_file: Option<PathBuf>,
    records: Option<RecordSet>,
    filter_enabled: bool,
    filter_column: String,
    filter_value: String,
    filter_values: Vec<String>,
    title_input: String,
    plan: Option<RenderPlan>,
    error_message: Option<String>,
    status: String,
    rng: StdRng,
}

impl MosaicApp {
    fn new(config: MosaicConfig) -> Self {
        let (filter_enabled, filter_column, filter_value) = match &config.filter {
            Some(f) => (true, f.column.clone(), f.value.clone()),
            None => (false, String::new(), String::new()),
        };
        let title_input = config.chart_title.clone().unwrap_or_default();
        Self {
            config,
            selected_file: None,
            records: None,
            filter_enabled,
            filter_column,
            filter_value,
            filter_values: Vec::new(),
            title_input,
            plan: None,
            error_message: None,
            status: String::new(),
            rng: StdRng::from_entropy(),
        }
    }

    fn load_file(&mut self, path: PathBuf) {
        self.plan = None;
        self.error_message = None;
        match RecordSet::from_csv(&path) {
            Ok(records) => {
                info!("Loaded {} rows from {}", records.len(), path.display());
                let names = records.column_names().to_vec();
                let known = |c: &str| names.iter().any(|n| n == c);
                if !known(self.config.row_column.as_str()) {
                    self.config.row_column = names.first().cloned().unwrap_or_default();
                }
                if !known(self.config.column_column.as_str()) {
                    self.config.column_column =
                        names.get(1).or(names.first()).cloned().unwrap_or_default();
                }
                if !known(self.filter_column.as_str()) {
                    self.filter_enabled = false;
                    self.filter_column = names.first().cloned().unwrap_or_default();
                }
                self.status = format!("{} rows, {} columns", records.len(), names.len());
                self.records = Some(records);
                self.selected_file = Some(path);
                self.refresh_filter_values();
                self.rebuild();
            }
            Err(e) => {
                warn!("Failed to load {}: {e}", path.display());
                self.records = None;
                self.error_message = Some(MosaicError::from(e).user_message());
            }
        }
    }

    fn refresh_filter_values(&mut self) {
        let Some(records) = &self.records else { return };
        self.filter_values = records
            .distinct_values(&self.filter_column)
            .unwrap_or_default();
        if !self.filter_values.contains(&self.filter_value) {
            self.filter_value = self.filter_values.first().cloned().unwrap_or_default();
        }
    }

    fn sync_config(&mut self) {
        self.config.filter = self
            .filter_enabled
            .then(|| FilterSpec::new(&self.filter_column, &self.filter_value));
        let title = self.title_input.trim();
        self.config.chart_title = (!title.is_empty()).then(|| title.to_string());
    }

    fn rebuild(&mut self) {
        self.sync_config();
        let Some(records) = &self.records else { return };
        let result = MosaicChart::new(self.config.clone())
            .and_then(|chart| chart.plan_with_rng(records, &mut self.rng));
        match result {
            Ok(plan) => {
                info!("Planned '{}' with {} row categories", plan.title, plan.rows.len());
                self.plan = Some(plan);
                self.error_message = None;
            }
            Err(e) => {
                warn!("Chart failed ({}): {e}", e.category());
                self.plan = None;
                self.error_message = Some(e.user_message());
            }
        }
    }

    fn export_svg(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(plan) = &self.plan else {
            return Ok(None);
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG files", &["svg"])
            .set_file_name("mosaic.svg")
            .save_file()
        else {
            return Ok(None);
        };
        let svg = render(plan, &mut SvgBackend::new())?;
        std::fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
        Ok(Some(path))
    }

    fn export_plan(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(plan) = &self.plan else {
            return Ok(None);
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .set_file_name("mosaic.json")
            .save_file()
        else {
            return Ok(None);
        };
        std::fs::write(&path, plan.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(Some(path))
    }

    fn report_export(&mut self, result: anyhow::Result<Option<PathBuf>>) {
        match result {
            Ok(Some(path)) => {
                info!("Exported {}", path.display());
                self.status = format!("Saved {}", path.display());
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Export failed: {e:#}");
                self.error_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) -> bool {
        let Some(records) = &self.records else {
            ui.label("No data loaded");
            return false;
        };
        let names = records.column_names().to_vec();
        let mut changed = false;

        ui.collapsing("Columns", |ui| {
            changed |= column_combo(ui, "Rows", &mut self.config.row_column, &names);
            changed |= column_combo(ui, "Bars", &mut self.config.column_column, &names);
        });

        ui.collapsing("Filter", |ui| {
            changed |= ui
                .checkbox(&mut self.filter_enabled, "Keep only matching records")
                .changed();
            ui.add_enabled_ui(self.filter_enabled, |ui| {
                if column_combo(ui, "Column", &mut self.filter_column, &names) {
                    self.filter_value.clear();
                    changed = true;
                }
                changed |= column_combo(ui, "Value", &mut self.filter_value, &self.filter_values);
            });
        });

        ui.collapsing("Appearance", |ui| {
            ui.label("Title (blank for automatic):");
            changed |= ui.text_edit_singleline(&mut self.title_input).lost_focus();
            ui.label("Minimum labelled share (%):");
            changed |= ui
                .add(egui::Slider::new(&mut self.config.min_display_value, 0.0..=20.0))
                .changed();
            ui.label("Figure size (inches):");
            let size = &mut self.config.figure_size;
            changed |= ui
                .add(egui::Slider::new(&mut size.width, 4.0..=20.0).text("width"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut size.height, 3.0..=12.0).text("height"))
                .changed();
            let order = &mut self.config.category_order;
            ui.horizontal(|ui| {
                changed |= ui
                    .selectable_value(order, CategoryOrder::Encounter, "As found")
                    .changed();
                changed |= ui
                    .selectable_value(order, CategoryOrder::Lexical, "Sorted")
                    .changed();
            });
            changed |= ui
                .checkbox(&mut self.config.show_summary_table, "Summary table")
                .changed();
        });

        if ui.button("New colours").clicked() {
            changed = true;
        }
        changed
    }
}

fn column_combo(ui: &mut egui::Ui, label: &str, selected: &mut String, options: &[String]) -> bool {
    let mut changed = false;
    egui::ComboBox::from_label(label)
        .selected_text(selected.as_str())
        .show_ui(ui, |ui| {
            for option in options {
                changed |= ui
                    .selectable_value(selected, option.clone(), option.as_str())
                    .changed();
            }
        });
    changed
}

impl eframe::App for MosaicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Mosaic Chart");
                ui.separator();

                if ui.button(" Select CSV File").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("CSV files", &["csv"])
                        .pick_file()
                    {
                        self.load_file(path);
                    }
                }

                if let Some(ref path) = self.selected_file {
                    ui.label(format!("File: {}", path.display()));
                }

                ui.separator();

                ui.add_enabled_ui(self.plan.is_some(), |ui| {
                    if ui.button("Export SVG").clicked() {
                        let result = self.export_svg();
                        self.report_export(result);
                    }
                    if ui.button("Export plan").clicked() {
                        let result = self.export_plan();
                        self.report_export(result);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::SidePanel::left("config_panel").show(ctx, |ui| {
            ui.heading("Configuration");
            let previous_filter_column = self.filter_column.clone();
            if self.controls(ui) {
                if self.filter_column != previous_filter_column {
                    self.refresh_filter_values();
                }
                self.rebuild();
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref error) = self.error_message {
                ui.colored_label(egui::Color32::RED, "Error:");
                ui.separator();
                ui.monospace(error);
                ui.separator();
            }

            let Some(plan) = &self.plan else {
                if self.records.is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.label("Select a CSV file to get started");
                    });
                }
                return;
            };

            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::hover());
            let mut backend = EguiBackend::new(&painter, response.rect);
            if let Err(e) = render(plan, &mut backend) {
                ui.colored_label(egui::Color32::RED, format!("Render error: {e}"));
            }
        });
    }
}
