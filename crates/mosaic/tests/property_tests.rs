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

use mosaic::palette::{random_color, RANDOM_COLOR_ALPHABET};
use mosaic::{tabulate, CategoryOrder, ColumnKey, MosaicChart, MosaicConfig, RecordSet};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOL: f64 = 1e-9;

fn records_strategy() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec((0usize..6, 0usize..5, any::<bool>()), 1..200).prop_map(|pairs| {
        let rows = pairs
            .into_iter()
            .map(|(r, c, missing)| {
                let row = if missing { None } else { Some(format!("row{r}")) };
                vec![row, Some(format!("col{c}"))]
            })
            .collect();
        RecordSet::with_rows(["r", "c"], rows).unwrap()
    })
}

proptest! {
    #[test]
    fn real_columns_and_total_sum_to_one(records in records_strategy()) {
        let tab = tabulate(&records, "r", "c", None, CategoryOrder::Encounter).unwrap();
        for key in tab.table.columns() {
            if *key == ColumnKey::Spacer {
                continue;
            }
            let sum = tab.table.column_sum(key).unwrap();
            prop_assert!((sum - 1.0).abs() < TOL, "column {key} sums to {sum}");
        }
        let share_sum: f64 = tab.shares.category_shares().map(|(_, s)| s).sum();
        prop_assert!((share_sum - 1.0).abs() < TOL);
    }

    #[test]
    fn rows_sorted_by_total_descending(records in records_strategy()) {
        let tab = tabulate(&records, "r", "c", None, CategoryOrder::Lexical).unwrap();
        let totals: Vec<f64> = tab.table.rows().iter().map(|r| r.total()).collect();
        prop_assert!(totals.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn widths_and_stacks_are_consistent(records in records_strategy(), seed in any::<u64>()) {
        let chart = MosaicChart::new(MosaicConfig::new("r", "c")).unwrap();
        let plan = chart.plan_with_rng(&records, &mut StdRng::seed_from_u64(seed)).unwrap();

        let real: f64 = plan.widths().iter().skip(2).sum();
        prop_assert!((real - 100.0).abs() < 1e-6);

        let top = plan.rows.last().unwrap();
        for (i, segment) in top.segments.iter().enumerate() {
            if let Some(s) = segment {
                prop_assert!((s.top() - 100.0).abs() < 1e-6, "column {} tops at {}", i, s.top());
            }
        }

        for row in &plan.rows {
            let total = row.segments[0].unwrap().height;
            prop_assert_eq!(row.y_label.is_empty(), total <= plan.min_display_value);
        }
    }

    #[test]
    fn random_colours_use_reduced_alphabet(seed in any::<u64>()) {
        let hex = random_color(&mut StdRng::seed_from_u64(seed)).to_hex();
        prop_assert!(hex[1..].bytes().all(|b| RANDOM_COLOR_ALPHABET.contains(&b)));
    }
}
