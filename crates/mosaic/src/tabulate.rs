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

//! Cross-tabulation of two categorical columns into the shares a mosaic
//! chart is drawn from.
//!
//! [`tabulate`] produces three things:
//!
//! * a [`CrossTabTable`] whose real columns are normalised per column, led
//!   by a `Total` column (each row category's share of every record) and a
//!   blank spacer column, with rows sorted by `Total` descending;
//! * a [`ColumnShareSeries`] giving each column category's share of every
//!   record, positionally aligned with the table's columns;
//! * the derived [`ChartTitle`].

use crate::config::{CategoryOrder, FilterSpec};
use crate::error::{DataError, DataResult};
use crate::records::{RecordSet, MISSING_CATEGORY};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Total,
    Spacer,
    Category(String),
}

impl ColumnKey {
    pub fn label(&self) -> &str {
        match self {
            ColumnKey::Total => "Total",
            ColumnKey::Spacer => "",
            ColumnKey::Category(name) => name,
        }
    }

    pub fn is_category(&self) -> bool {
        matches!(self, ColumnKey::Category(_))
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub category: String,
    /// One value per table column; `None` in the spacer column.
    pub values: Vec<Option<f64>>,
}

impl CrossTabRow {
    /// Share of all records falling in this row category.
    pub fn total(&self) -> f64 {
        self.values.first().copied().flatten().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabTable {
    columns: Vec<ColumnKey>,
    rows: Vec<CrossTabRow>,
}

impl CrossTabTable {
    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[CrossTabRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_categories(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.category.as_str())
    }

    pub fn column_position(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    pub fn value(&self, row_category: &str, key: &ColumnKey) -> Option<f64> {
        let col = self.column_position(key)?;
        self.rows
            .iter()
            .find(|r| r.category == row_category)
            .and_then(|r| r.values[col])
    }

    /// Sum of a column over all row categories, skipping missing cells.
    pub fn column_sum(&self, key: &ColumnKey) -> Option<f64> {
        let col = self.column_position(key)?;
        Some(self.rows.iter().filter_map(|r| r.values[col]).sum())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnShareSeries {
    entries: Vec<(ColumnKey, Option<f64>)>,
}

impl ColumnShareSeries {
    pub fn entries(&self) -> &[(ColumnKey, Option<f64>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn share(&self, key: &ColumnKey) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| *v)
    }

    pub fn category_shares(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().filter_map(|(k, v)| match k {
            ColumnKey::Category(name) => Some((name.as_str(), v.unwrap_or(0.0))),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTitle(String);

impl ChartTitle {
    pub fn derive(row_column: &str, column_column: &str, filter: Option<&FilterSpec>) -> Self {
        match filter {
            None => Self(format!("{row_column} by {column_column}")),
            Some(f) => Self(format!(
                "{row_column} by {column_column} ({}: {})",
                f.column, f.value
            )),
        }
    }

    pub fn custom(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartTitle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tabulation {
    pub table: CrossTabTable,
    pub shares: ColumnShareSeries,
    pub title: ChartTitle,
}

pub fn tabulate(
    records: &RecordSet,
    row_column: &str,
    column_column: &str,
    filter: Option<&FilterSpec>,
    order: CategoryOrder,
) -> DataResult<Tabulation> {
    let row_idx = records.column_index(row_column)?;
    let col_idx = records.column_index(column_column)?;
    if records.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    let mut working = records.select(filter)?;
    if working.is_empty() {
        if let Some(f) = filter {
            return Err(DataError::EmptySelection {
                column: f.column.clone(),
                value: f.value.clone(),
            });
        }
        return Err(DataError::EmptyDataset);
    }
    let filled = working.fill_missing(&[row_column, column_column], MISSING_CATEGORY)?;

    let pairs: Vec<(&str, &str)> = working
        .rows()
        .map(|row| {
            (
                row[row_idx].as_deref().unwrap_or(MISSING_CATEGORY),
                row[col_idx].as_deref().unwrap_or(MISSING_CATEGORY),
            )
        })
        .collect();
    let row_categories = ordered_categories(pairs.iter().map(|p| p.0), order);
    let col_categories = ordered_categories(pairs.iter().map(|p| p.1), order);

    let mut counts = vec![vec![0u64; col_categories.len()]; row_categories.len()];
    for (r, c) in &pairs {
        let ri = row_categories.get_index_of(r);
        let ci = col_categories.get_index_of(c);
        if let (Some(ri), Some(ci)) = (ri, ci) {
            counts[ri][ci] += 1;
        }
    }
    let grand_total = pairs.len() as f64;
    let row_totals: Vec<u64> = counts.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<u64> = (0..col_categories.len())
        .map(|ci| counts.iter().map(|row| row[ci]).sum())
        .collect();

    let mut columns = Vec::with_capacity(col_categories.len() + 2);
    columns.push(ColumnKey::Total);
    columns.push(ColumnKey::Spacer);
    columns.extend(
        col_categories
            .iter()
            .map(|c| ColumnKey::Category((*c).to_string())),
    );

    let mut rows: Vec<CrossTabRow> = row_categories
        .iter()
        .enumerate()
        .map(|(ri, category)| {
            let mut values = Vec::with_capacity(columns.len());
            values.push(Some(row_totals[ri] as f64 / grand_total));
            values.push(None);
            values.extend(
                counts[ri]
                    .iter()
                    .zip(&col_totals)
                    .map(|(&n, &col_total)| Some(n as f64 / col_total as f64)),
            );
            CrossTabRow {
                category: (*category).to_string(),
                values,
            }
        })
        .collect();
    // stable: ties keep tabulation order
    rows.sort_by(|a, b| b.total().total_cmp(&a.total()));

    let mut entries = Vec::with_capacity(columns.len());
    entries.push((ColumnKey::Total, None));
    entries.push((ColumnKey::Spacer, None));
    entries.extend(
        col_categories
            .iter()
            .zip(&col_totals)
            .map(|(c, &n)| (ColumnKey::Category((*c).to_string()), Some(n as f64 / grand_total))),
    );

    debug!(
        records = pairs.len(),
        filled,
        row_categories = rows.len(),
        column_categories = col_categories.len(),
        "tabulated cross-tab"
    );

    Ok(Tabulation {
        table: CrossTabTable { columns, rows },
        shares: ColumnShareSeries { entries },
        title: ChartTitle::derive(row_column, column_column, filter),
    })
}

fn ordered_categories<'a, I>(values: I, order: CategoryOrder) -> IndexSet<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let mut set: IndexSet<&str> = values.collect();
    if order == CategoryOrder::Lexical {
        set.sort();
    }
    set
}
