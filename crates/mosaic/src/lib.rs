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

pub mod config;
pub mod error;
pub mod geometry;
pub mod palette;
pub mod records;
pub mod render;
pub mod tabulate;

#[cfg(feature = "svg")]
pub mod svg;

pub use config::{CategoryOrder, ChartStyle, FigureSize, FilterSpec, MosaicConfig};
pub use error::{ConfigError, DataError, MosaicError, RenderError, Result};
pub use geometry::{build_geometry, RenderPlan, Segment, StackedRow};
pub use palette::Rgb;
pub use records::{RecordSet, MISSING_CATEGORY};
pub use render::{render, ChartBackend};
pub use tabulate::{tabulate, ChartTitle, ColumnKey, ColumnShareSeries, CrossTabTable, Tabulation};

#[cfg(feature = "svg")]
pub use svg::SvgBackend;

use rand::Rng;

/// Tabulates records and turns them into a drawable mosaic chart.
pub struct MosaicChart {
    config: MosaicConfig,
    fixed_colors: Vec<Rgb>,
}

impl MosaicChart {
    pub fn new(config: MosaicConfig) -> Result<Self> {
        config.validate()?;
        let fixed_colors = config
            .fixed_colors
            .iter()
            .map(|c| Rgb::parse(c))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            config,
            fixed_colors,
        })
    }

    pub fn tabulate(&self, records: &RecordSet) -> Result<Tabulation> {
        Ok(tabulate::tabulate(
            records,
            &self.config.row_column,
            &self.config.column_column,
            self.config.filter.as_ref(),
            self.config.category_order,
        )?)
    }

    pub fn plan(&self, records: &RecordSet) -> Result<RenderPlan> {
        self.plan_with_rng(records, &mut rand::thread_rng())
    }

    /// Same as [`MosaicChart::plan`] with an explicit source for the
    /// fallback colours.
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        records: &RecordSet,
        rng: &mut R,
    ) -> Result<RenderPlan> {
        let Tabulation {
            table,
            shares,
            title,
        } = self.tabulate(records)?;
        let title = self
            .config
            .chart_title
            .as_deref()
            .map_or(title, ChartTitle::custom);
        Ok(build_geometry(
            &table,
            &shares,
            &self.config.style(),
            self.config.min_display_value,
            &title,
            &self.fixed_colors,
            rng,
        )?)
    }

    pub fn render<B: ChartBackend + ?Sized>(
        &self,
        records: &RecordSet,
        backend: &mut B,
    ) -> Result<B::Output> {
        let plan = self.plan(records)?;
        render(&plan, backend)
    }

    #[cfg(feature = "svg")]
    pub fn to_svg(&self, records: &RecordSet) -> Result<String> {
        self.render(records, &mut SvgBackend::new())
    }
}

/// One-shot: records and config in, SVG document out.
#[cfg(feature = "svg")]
pub fn chart_svg(records: &RecordSet, config: MosaicConfig) -> Result<String> {
    MosaicChart::new(config)?.to_svg(records)
}
