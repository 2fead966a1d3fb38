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

use crate::config::FilterSpec;
use crate::error::{DataError, DataResult};
use indexmap::IndexSet;
use polars::prelude::{CsvReader, DataFrame, DataType, SerReader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Category assigned to missing row/column values before tabulation.
pub const MISSING_CATEGORY: &str = "UNID";

/// Row-oriented categorical records. Every value is kept as text; `None`
/// marks a missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RecordSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<Option<String>>>) -> DataResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(columns);
        set.rows.reserve(rows.len());
        for row in rows {
            set.push_row(row)?;
        }
        Ok(set)
    }

    /// Builds records from string slices; `None` is a missing value.
    pub fn from_str_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> DataResult<Self> {
        let owned = rows
            .iter()
            .map(|row| row.iter().map(|v| v.map(str::to_string)).collect())
            .collect();
        Self::with_rows(columns.iter().copied(), owned)
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) -> DataResult<()> {
        if row.len() != self.columns.len() {
            return Err(DataError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Converts every column of `df` to text. Nulls become missing values.
    pub fn from_dataframe(df: &DataFrame) -> DataResult<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
        for name in &columns {
            let series = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::String)?;
            let values = series.str()?;
            for (row, value) in rows.iter_mut().zip(values.into_iter()) {
                row.push(value.map(str::to_string));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let data_file_error = |source: polars::error::PolarsError| DataError::DataFile {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(|e| data_file_error(e.into()))?;
        let df = CsvReader::new(file).finish().map_err(data_file_error)?;
        Self::from_dataframe(&df)
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> DataResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|v| v.as_deref())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Distinct non-missing values of a column in first-appearance order.
    pub fn distinct_values(&self, column: &str) -> DataResult<Vec<String>> {
        let idx = self.column_index(column)?;
        let set: IndexSet<&str> = self
            .rows
            .iter()
            .filter_map(|row| row[idx].as_deref())
            .collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }

    /// Copy of the records, restricted to `filter` when one is given.
    ///
    /// The copy is always taken so later in-place edits never reach the
    /// caller's records.
    pub fn select(&self, filter: Option<&FilterSpec>) -> DataResult<RecordSet> {
        let Some(filter) = filter else {
            return Ok(self.clone());
        };
        let idx = self.column_index(&filter.column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row[idx].as_deref() == Some(filter.value.as_str()))
            .cloned()
            .collect();
        Ok(RecordSet {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Replaces missing values in `columns` with `sentinel`, in place.
    pub fn fill_missing(&mut self, columns: &[&str], sentinel: &str) -> DataResult<usize> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<DataResult<Vec<_>>>()?;
        let mut filled = 0;
        for row in &mut self.rows {
            for &idx in &indices {
                if row[idx].is_none() {
                    row[idx] = Some(sentinel.to_string());
                    filled += 1;
                }
            }
        }
        Ok(filled)
    }
}
