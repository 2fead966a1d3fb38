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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },
    #[error("Empty dataset provided for tabulation")]
    EmptyDataset,
    #[error("No records match filter '{column}' = '{value}'")]
    EmptySelection { column: String, value: String },
    #[error("Row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Share series has {shares} entries but the table has {columns} columns")]
    ShapeMismatch { columns: usize, shares: usize },
    #[error("Failed to read data file '{path}': {source}")]
    DataFile {
        path: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid figure size: {width} x {height}")]
    InvalidFigureSize { width: f64, height: f64 },
    #[error("Invalid dpi: {value}")]
    InvalidDpi { value: f64 },
    #[error("Invalid minimum display value: {value}")]
    InvalidThreshold { value: f64 },
    #[error("Invalid colour '{value}': expected #RRGGBB")]
    InvalidColor { value: String },
    #[error("Missing required configuration: {field}")]
    MissingColumn { field: String },
    #[error("Failed to read configuration file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write output: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("Backend failure: {0}")]
    Backend(String),
}
pub type Result<T> = std::result::Result<T, MosaicError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl MosaicError {
    pub fn category(&self) -> &'static str {
        match self {
            MosaicError::Data(_) => "Data",
            MosaicError::Config(_) => "Configuration",
            MosaicError::Render(_) => "Render",
            MosaicError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            MosaicError::Data(DataError::EmptyDataset) => {
                "The dataset appears to be empty. Please provide data with at least one row."
                    .to_string()
            }
            MosaicError::Data(DataError::EmptySelection { column, value }) => {
                format!("No rows have '{value}' in column '{column}'. Try a different filter.")
            }
            MosaicError::Data(DataError::ColumnNotFound { column }) => {
                format!("The dataset has no column named '{column}'.")
            }
            _ => self.to_string(),
        }
    }
}
