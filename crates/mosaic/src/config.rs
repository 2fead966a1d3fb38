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

use crate::error::{ConfigError, ConfigResult};
use crate::palette::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Restricts tabulation to records whose `column` field equals `value`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub value: String,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Order in which categories are tabulated before the `Total` sort.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryOrder {
    /// First appearance in the (filtered) records.
    #[default]
    Encounter,
    /// Ascending string order.
    Lexical,
}

/// Figure size in inches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 5.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub figure_size: FigureSize,
    pub dpi: f64,
    pub show_summary_table: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            figure_size: FigureSize::default(),
            dpi: 100.0,
            show_summary_table: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MosaicConfig {
    pub row_column: String,
    pub column_column: String,
    pub filter: Option<FilterSpec>,
    pub figure_size: FigureSize,
    pub min_display_value: f64,
    pub chart_title: Option<String>,
    pub fixed_colors: Vec<String>,
    pub category_order: CategoryOrder,
    pub show_summary_table: bool,
    pub dpi: f64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            row_column: String::new(),
            column_column: String::new(),
            filter: None,
            figure_size: FigureSize::default(),
            min_display_value: 3.0,
            chart_title: None,
            fixed_colors: Vec::new(),
            category_order: CategoryOrder::default(),
            show_summary_table: false,
            dpi: 100.0,
        }
    }
}

impl MosaicConfig {
    pub fn new(row_column: impl Into<String>, column_column: impl Into<String>) -> Self {
        Self {
            row_column: row_column.into(),
            column_column: column_column.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(FilterSpec::new(column, value));
        self
    }

    pub fn with_figure_size(mut self, width: f64, height: f64) -> Self {
        self.figure_size = FigureSize { width, height };
        self
    }

    pub fn with_min_display_value(mut self, value: f64) -> Self {
        self.min_display_value = value;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.chart_title = Some(title.into());
        self
    }

    pub fn with_fixed_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category_order(mut self, order: CategoryOrder) -> Self {
        self.category_order = order;
        self
    }

    pub fn load_from_file(config_path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.display().to_string(),
            source,
        })?;
        let config: MosaicConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config/mosaic.toml")
    }

    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::default_config_path())
    }

    /// Loads `config_path`, falling back to defaults. A missing file is
    /// silent; any other failure is logged.
    pub fn load_or_default_from(config_path: &Path) -> Self {
        match Self::load_from_file(config_path) {
            Ok(config) => config,
            Err(ConfigError::FileRead { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(e) => {
                warn!(path = %config_path.display(), "ignoring configuration file: {e}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.row_column.is_empty() {
            return Err(ConfigError::MissingColumn {
                field: "row_column".to_string(),
            });
        }
        if self.column_column.is_empty() {
            return Err(ConfigError::MissingColumn {
                field: "column_column".to_string(),
            });
        }
        let FigureSize { width, height } = self.figure_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidFigureSize { width, height });
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ConfigError::InvalidDpi { value: self.dpi });
        }
        if !self.min_display_value.is_finite() || self.min_display_value < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                value: self.min_display_value,
            });
        }
        for colour in &self.fixed_colors {
            Rgb::parse(colour)?;
        }
        Ok(())
    }

    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            figure_size: self.figure_size,
            dpi: self.dpi,
            show_summary_table: self.show_summary_table,
        }
    }
}
