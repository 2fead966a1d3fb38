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

use mosaic::{
    CategoryOrder, ConfigError, DataError, FilterSpec, MosaicChart, MosaicConfig, MosaicError,
    RecordSet, Rgb,
};
use polars::prelude::*;
use std::io::Write;

#[test]
fn dataframe_nulls_become_missing_values() {
    let df = df!(
        "r" => &["A", "B", "C"],
        "c" => &[Some("X"), None, Some("Y")],
        "n" => &[1i64, 2, 3],
    )
    .unwrap();
    let records = RecordSet::from_dataframe(&df).unwrap();
    assert_eq!(records.column_names(), &["r", "c", "n"]);
    assert_eq!(records.len(), 3);
    assert_eq!(records.value(0, 1), Some("X"));
    assert_eq!(records.value(1, 1), None);
    assert_eq!(records.value(2, 2), Some("3"));
}

#[test]
fn csv_files_load_through_polars() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "region,segment,year").unwrap();
    writeln!(file, "north,retail,2023").unwrap();
    writeln!(file, "north,retail,2024").unwrap();
    writeln!(file, "south,retail,2024").unwrap();
    writeln!(file, "north,online,2024").unwrap();
    file.flush().unwrap();

    let records = RecordSet::from_csv(file.path()).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(
        records.distinct_values("year").unwrap(),
        vec!["2023".to_string(), "2024".to_string()]
    );

    let config = MosaicConfig::new("region", "segment").with_filter("year", "2024");
    let plan = MosaicChart::new(config).unwrap().plan(&records).unwrap();
    assert_eq!(plan.title, "region by segment (year: 2024)");
    assert_eq!(plan.rows.len(), 2);
}

#[test]
fn missing_csv_is_a_data_file_error() {
    let err = RecordSet::from_csv("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, DataError::DataFile { .. }));
}

#[test]
fn ragged_rows_are_rejected() {
    let mut records = RecordSet::new(["a", "b"]);
    let err = records.push_row(vec![Some("x".to_string())]).unwrap_err();
    assert!(matches!(err, DataError::RaggedRow { expected: 2, found: 1, .. }));
}

#[test]
fn select_filters_a_copy() {
    let records = RecordSet::from_str_rows(
        &["r", "f"],
        &[&[Some("A"), Some("1")], &[Some("B"), None], &[Some("C"), Some("1")]],
    )
    .unwrap();
    let filter = FilterSpec::new("f", "1");
    let mut selected = records.select(Some(&filter)).unwrap();
    assert_eq!(selected.len(), 2);
    selected.fill_missing(&["r"], "UNID").unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records.value(1, 1), None);
}

#[test]
fn config_loads_from_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r##"
row_column = "region"
column_column = "segment"
min_display_value = 5.0
fixed_colors = ["#AABBCC", "ddeeff"]
category_order = "lexical"

[figure_size]
width = 12.0
height = 6.0

[filter]
column = "year"
value = "2024"
"##
    )
    .unwrap();
    file.flush().unwrap();

    let config = MosaicConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.row_column, "region");
    assert_eq!(config.min_display_value, 5.0);
    assert_eq!(config.category_order, CategoryOrder::Lexical);
    assert_eq!(config.figure_size.height, 6.0);
    assert_eq!(config.filter, Some(FilterSpec::new("year", "2024")));
    assert_eq!(config.dpi, 100.0);
    assert!(config.validate().is_ok());
}

#[test]
fn defaults_match_documented_values() {
    let config = MosaicConfig::default();
    assert_eq!(config.figure_size.width, 10.0);
    assert_eq!(config.figure_size.height, 5.0);
    assert_eq!(config.min_display_value, 3.0);
    assert!(config.fixed_colors.is_empty());
    assert!(config.chart_title.is_none());
    assert_eq!(config.category_order, CategoryOrder::Encounter);
}

#[test]
fn validation_rejects_bad_settings() {
    assert!(matches!(
        MosaicConfig::default().validate(),
        Err(ConfigError::MissingColumn { .. })
    ));
    assert!(matches!(
        MosaicConfig::new("r", "c").with_figure_size(0.0, 5.0).validate(),
        Err(ConfigError::InvalidFigureSize { .. })
    ));
    assert!(matches!(
        MosaicConfig::new("r", "c").with_min_display_value(-1.0).validate(),
        Err(ConfigError::InvalidThreshold { .. })
    ));
    assert!(matches!(
        MosaicConfig::new("r", "c").with_fixed_colors(["red"]).validate(),
        Err(ConfigError::InvalidColor { .. })
    ));

    let err = MosaicChart::new(MosaicConfig::new("r", "c").with_fixed_colors(["#12345G"]))
        .err()
        .unwrap();
    assert_eq!(err.category(), "Configuration");
}

#[test]
fn colours_parse_with_or_without_hash() {
    assert_eq!(Rgb::parse("#0a0B0c").unwrap(), Rgb::new(10, 11, 12));
    assert_eq!(Rgb::parse("FFFFFF").unwrap(), Rgb::WHITE);
    assert_eq!(Rgb::GRAY.to_hex(), "#808080");
    assert!(Rgb::parse("#FFF").is_err());
}

#[test]
fn user_messages_name_the_problem() {
    let err = MosaicError::from(DataError::EmptySelection {
        column: "year".to_string(),
        value: "1999".to_string(),
    });
    assert_eq!(err.category(), "Data");
    assert!(err.user_message().contains("1999"));
}

#[test]
fn bad_dpi_names_the_dpi() {
    let config = MosaicConfig {
        dpi: 0.0,
        ..MosaicConfig::new("r", "c")
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDpi { value } if value == 0.0));
    assert_eq!(err.to_string(), "Invalid dpi: 0");
}

#[test]
fn malformed_config_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "row_column = \"region\"\nmin_display_value = \"three\"\n").unwrap();
    file.flush().unwrap();

    assert!(matches!(
        MosaicConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));
    assert_eq!(
        MosaicConfig::load_or_default_from(file.path()),
        MosaicConfig::default()
    );
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mosaic.toml");
    assert!(matches!(
        MosaicConfig::load_from_file(&path),
        Err(ConfigError::FileRead { .. })
    ));
    assert_eq!(MosaicConfig::load_or_default_from(&path), MosaicConfig::default());
}
