use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Planning horizon a result workbook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u16")]
pub enum Year {
    Y2030,
    Y2040,
    Y2050,
}

impl Year {
    pub const ALL: [Year; 3] = [Year::Y2030, Year::Y2040, Year::Y2050];

    pub fn as_u16(self) -> u16 {
        match self {
            Year::Y2030 => 2030,
            Year::Y2040 => 2040,
            Year::Y2050 => 2050,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl From<Year> for u16 {
    fn from(y: Year) -> u16 {
        y.as_u16()
    }
}

impl TryFrom<u16> for Year {
    type Error = String;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        match v {
            2030 => Ok(Year::Y2030),
            2040 => Ok(Year::Y2040),
            2050 => Ok(Year::Y2050),
            other => Err(format!("unsupported year {} (expected 2030, 2040 or 2050)", other)),
        }
    }
}

impl FromStr for Year {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u16 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a year", s.trim()))?;
        Year::try_from(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// `Overall_Summary` as read, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// First value recorded under `metric` (exact match).
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.metric == metric).map(|r| r.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelMixRow {
    #[serde(rename = "FuelType")]
    pub fuel_type: String,
    #[serde(rename = "Total_GJ")]
    pub total_gj: f64,
    #[serde(rename = "Percentage_Mix")]
    pub percentage_mix: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub id: String,
    pub values: Vec<f64>,
}

/// A plan table: one row per identifier (pathway, source), one column per fuel.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelMatrix {
    pub index_name: String,
    pub fuels: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl FuelMatrix {
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.fuels.len()];
        for row in &self.rows {
            for (s, v) in sums.iter_mut().zip(&row.values) {
                *s += v;
            }
        }
        sums
    }

    /// Fuels whose column total is positive, with their column index.
    pub fn nonzero_columns(&self) -> Vec<(usize, &str)> {
        self.column_sums()
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .map(|(i, _)| (i, self.fuels[i].as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineryRow {
    #[serde(rename = "Refinery")]
    pub refinery: String,
    #[serde(rename = "Usage_GJ")]
    pub usage_gj: f64,
    #[serde(rename = "Utilization_Percent")]
    pub utilization_percent: f64,
}

/// Source columns (or fuel-mix rows) that are not taxonomy fuels and were
/// discarded during normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedColumns {
    pub sheet: String,
    pub columns: Vec<String>,
    pub has_data: bool,
}

/// Everything read from one result workbook, conformed to the taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    pub year: Year,
    pub source_file: String,
    pub summary: SummaryTable,
    pub fuel_mix: Vec<FuelMixRow>,
    pub production: FuelMatrix,
    pub procurement: FuelMatrix,
    pub refinery: Vec<RefineryRow>,
    pub dropped: Vec<DroppedColumns>,
}

// Formatted rows for console previews and the dashboard's data tables.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryDisplayRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FuelMixDisplayRow {
    #[serde(rename = "FuelType")]
    #[tabled(rename = "FuelType")]
    pub fuel_type: String,
    #[serde(rename = "Total_GJ")]
    #[tabled(rename = "Total_GJ")]
    pub total_gj: String,
    #[serde(rename = "Percentage_Mix")]
    #[tabled(rename = "Percentage_Mix")]
    pub percentage_mix: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RefineryDisplayRow {
    #[serde(rename = "Refinery")]
    #[tabled(rename = "Refinery")]
    pub refinery: String,
    #[serde(rename = "Usage_GJ")]
    #[tabled(rename = "Usage_GJ")]
    pub usage_gj: String,
    #[serde(rename = "Utilization_Percent")]
    #[tabled(rename = "Utilization_Percent")]
    pub utilization_percent: String,
}

/// Header plus string cells, for tables whose columns depend on the data.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayGrid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Headline figures for one year; written to `kpi_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub year: Year,
    pub source_file: String,
    pub total_annual_cost_musd: f64,
    pub fleet_gfi: f64,
    pub levy_cost_musd: f64,
}
