use crate::constants::*;
use crate::error::RenderError;
use crate::types::{
    DisplayGrid, FuelMatrix, FuelMixDisplayRow, KpiSummary, RefineryDisplayRow, ScenarioResult,
    SummaryDisplayRow, Year,
};
use crate::util::{format_musd, format_number, format_percent, format_volume};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_cost: f64,
    pub fleet_gfi: f64,
    pub levy_cost: f64,
}

impl Kpis {
    pub fn total_cost_label(&self) -> String {
        format_musd(self.total_cost)
    }

    pub fn fleet_gfi_label(&self) -> String {
        format!("{:.2} g/MJ", self.fleet_gfi)
    }

    pub fn levy_cost_label(&self) -> String {
        format_musd(self.levy_cost)
    }
}

/// A labelled value for pie and single-series bar charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Stacked bars: one bar per category, one colour per series.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBars {
    pub axis_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone)]
pub struct Procurement {
    pub bars: Vec<Slice>,
    pub table: DisplayGrid,
}

/// Everything shown for one year, already filtered and formatted.
#[derive(Debug, Clone)]
pub struct Panel {
    pub year: Year,
    pub source_file: String,
    pub kpis: Kpis,
    pub summary: Vec<SummaryDisplayRow>,
    pub mix: Vec<Slice>,
    pub mix_table: Vec<FuelMixDisplayRow>,
    pub production: StackedBars,
    pub production_table: DisplayGrid,
    pub procurement: Option<Procurement>,
    pub refinery: Vec<Slice>,
    pub refinery_table: Vec<RefineryDisplayRow>,
}

fn metric(r: &ScenarioResult, name: &str) -> Result<f64, RenderError> {
    r.summary.get(name).ok_or_else(|| RenderError::MissingMetric {
        year: r.year,
        metric: name.to_string(),
    })
}

pub fn kpis(r: &ScenarioResult) -> Result<Kpis, RenderError> {
    Ok(Kpis {
        total_cost: metric(r, METRIC_TOTAL_COST)?,
        fleet_gfi: metric(r, METRIC_FLEET_GFI)?,
        levy_cost: metric(r, METRIC_LEVY_COST)?,
    })
}

pub fn kpi_summary(r: &ScenarioResult) -> Result<KpiSummary, RenderError> {
    let k = kpis(r)?;
    Ok(KpiSummary {
        year: r.year,
        source_file: r.source_file.clone(),
        total_annual_cost_musd: k.total_cost,
        fleet_gfi: k.fleet_gfi,
        levy_cost_musd: k.levy_cost,
    })
}

/// Fleet GFI per year, for the compliance chart. Years without the metric
/// are left out.
pub fn gfi_points(results: &BTreeMap<Year, ScenarioResult>) -> BTreeMap<Year, f64> {
    results
        .iter()
        .filter_map(|(y, r)| r.summary.get(METRIC_FLEET_GFI).map(|v| (*y, v)))
        .collect()
}

pub fn fuel_mix_slices(r: &ScenarioResult) -> Vec<Slice> {
    r.fuel_mix
        .iter()
        .filter(|m| m.percentage_mix > MIX_MIN_PERCENT)
        .map(|m| Slice { label: m.fuel_type.clone(), value: m.percentage_mix })
        .collect()
}

pub fn production_bars(m: &FuelMatrix) -> StackedBars {
    let plotted = |v: f64| v > MIN_PLOTTED_GJ;
    let rows: Vec<_> = m.rows.iter().filter(|r| r.values.iter().any(|v| plotted(*v))).collect();
    let series = m
        .fuels
        .iter()
        .enumerate()
        .filter(|(c, _)| rows.iter().any(|r| plotted(r.values[*c])))
        .map(|(c, fuel)| Series {
            name: fuel.clone(),
            values: rows
                .iter()
                .map(|r| if plotted(r.values[c]) { r.values[c] } else { 0.0 })
                .collect(),
        })
        .collect();
    StackedBars {
        axis_label: m.index_name.clone(),
        categories: rows.iter().map(|r| r.id.clone()).collect(),
        series,
    }
}

/// Bars for the first procurement row, or `None` when nothing above the
/// plotting threshold is bought in.
pub fn procurement_bars(m: &FuelMatrix) -> Option<Vec<Slice>> {
    let row = m.rows.first()?;
    let bars: Vec<Slice> = m
        .fuels
        .iter()
        .zip(&row.values)
        .filter(|(_, v)| **v > MIN_PLOTTED_GJ)
        .map(|(f, v)| Slice { label: f.clone(), value: *v })
        .collect();
    (!bars.is_empty()).then_some(bars)
}

pub fn refinery_bars(r: &ScenarioResult) -> Vec<Slice> {
    r.refinery
        .iter()
        .map(|u| Slice { label: u.refinery.clone(), value: u.usage_gj })
        .collect()
}

pub fn summary_table(r: &ScenarioResult) -> Vec<SummaryDisplayRow> {
    r.summary
        .rows
        .iter()
        .map(|s| SummaryDisplayRow { metric: s.metric.clone(), value: format_number(s.value, 2) })
        .collect()
}

pub fn fuel_mix_table(r: &ScenarioResult) -> Vec<FuelMixDisplayRow> {
    r.fuel_mix
        .iter()
        .map(|m| FuelMixDisplayRow {
            fuel_type: m.fuel_type.clone(),
            total_gj: format_volume(m.total_gj),
            percentage_mix: format_percent(m.percentage_mix, 2),
        })
        .collect()
}

/// Plan table restricted to fuels with a positive column total.
pub fn matrix_table(m: &FuelMatrix) -> DisplayGrid {
    let cols = m.nonzero_columns();
    let mut header = vec![m.index_name.clone()];
    header.extend(cols.iter().map(|(_, f)| f.to_string()));
    let rows = m
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.id.clone()];
            cells.extend(cols.iter().map(|(c, _)| format_volume(r.values[*c])));
            cells
        })
        .collect();
    DisplayGrid { header, rows }
}

pub fn refinery_table(r: &ScenarioResult) -> Vec<RefineryDisplayRow> {
    r.refinery
        .iter()
        .map(|u| RefineryDisplayRow {
            refinery: u.refinery.clone(),
            usage_gj: format_volume(u.usage_gj),
            utilization_percent: format_percent(u.utilization_percent, 1),
        })
        .collect()
}

pub fn build_panel(r: &ScenarioResult) -> Result<Panel, RenderError> {
    let kpis = kpis(r)?;
    let procurement = procurement_bars(&r.procurement).map(|bars| Procurement {
        bars,
        table: matrix_table(&r.procurement),
    });
    Ok(Panel {
        year: r.year,
        source_file: r.source_file.clone(),
        kpis,
        summary: summary_table(r),
        mix: fuel_mix_slices(r),
        mix_table: fuel_mix_table(r),
        production: production_bars(&r.production),
        production_table: matrix_table(&r.production),
        procurement,
        refinery: refinery_bars(r),
        refinery_table: refinery_table(r),
    })
}

/// Panels for every parsed year, ascending. A year whose summary lacks a
/// headline metric yields its error in place of a panel.
pub fn build_panels(results: &BTreeMap<Year, ScenarioResult>) -> Vec<(Year, Result<Panel, RenderError>)> {
    results.iter().map(|(y, r)| (*y, build_panel(r))).collect()
}

#[cfg(test)]
pub mod fixtures {
    use crate::constants::*;
    use crate::taxonomy::MASTER_FUELS;
    use crate::types::*;

    /// A normalized result with a little of everything.
    pub fn scenario(year: Year, total_cost: f64, gfi: f64) -> ScenarioResult {
        let fuels = MASTER_FUELS.fuels().to_vec();
        let at = |name: &str| MASTER_FUELS.position(name).unwrap();
        let mut prod1 = vec![0.0; fuels.len()];
        prod1[at("HVO")] = 1500.0;
        prod1[at("B24")] = 0.5;
        let mut prod2 = vec![0.0; fuels.len()];
        prod2[at("Biodiesel")] = 2_000_000.0;
        let mut proc = vec![0.0; fuels.len()];
        proc[at("VLSFO")] = 40_000.0;
        let fuel_mix = fuels
            .iter()
            .map(|f| FuelMixRow {
                fuel_type: f.clone(),
                total_gj: match f.as_str() {
                    "VLSFO" => 40_000.0,
                    "HVO" => 1_500.0,
                    "B24" => 0.5,
                    _ => 0.0,
                },
                percentage_mix: match f.as_str() {
                    "VLSFO" => 95.0,
                    "HVO" => 4.995,
                    "B24" => 0.005,
                    _ => 0.0,
                },
            })
            .collect();
        ScenarioResult {
            year,
            source_file: format!("results_{}.xlsx", year),
            summary: SummaryTable {
                rows: vec![
                    SummaryRow { metric: METRIC_TOTAL_COST.into(), value: total_cost },
                    SummaryRow { metric: METRIC_FLEET_GFI.into(), value: gfi },
                    SummaryRow { metric: METRIC_LEVY_COST.into(), value: 12.5 },
                ],
            },
            fuel_mix,
            production: FuelMatrix {
                index_name: COL_PATHWAY.into(),
                fuels: fuels.clone(),
                rows: vec![
                    MatrixRow { id: "x1_".into(), values: prod1 },
                    MatrixRow { id: "x2_".into(), values: prod2 },
                    MatrixRow { id: "x3_".into(), values: vec![0.0; fuels.len()] },
                ],
            },
            procurement: FuelMatrix {
                index_name: COL_SOURCE.into(),
                fuels: fuels.clone(),
                rows: vec![MatrixRow { id: TEMPLATE_PROCUREMENT_SOURCE.into(), values: proc }],
            },
            refinery: vec![
                RefineryRow { refinery: "REPLAN".into(), usage_gj: 1_234_567.0, utilization_percent: 81.26 },
                RefineryRow { refinery: "REFAP".into(), usage_gj: 0.0, utilization_percent: 0.0 },
            ],
            dropped: Vec::new(),
        }
    }
}
