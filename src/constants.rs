// Sheet names every result workbook must carry, in the order they are checked.
pub const SHEET_SUMMARY: &str = "Overall_Summary";
pub const SHEET_FUEL_MIX: &str = "Fuel_Mix_Summary";
pub const SHEET_PRODUCTION: &str = "Production_Plan_GJ";
pub const SHEET_PROCUREMENT: &str = "Procurement_Plan_GJ";
pub const SHEET_REFINERY: &str = "Refinery_Utilization";

pub const REQUIRED_SHEETS: [&str; 5] = [
    SHEET_SUMMARY,
    SHEET_FUEL_MIX,
    SHEET_PRODUCTION,
    SHEET_PROCUREMENT,
    SHEET_REFINERY,
];

// Column headers
pub const COL_METRIC: &str = "Metric";
pub const COL_VALUE: &str = "Value";
pub const COL_FUEL_TYPE: &str = "FuelType";
pub const COL_TOTAL_GJ: &str = "Total_GJ";
pub const COL_PERCENTAGE_MIX: &str = "Percentage_Mix";
pub const COL_PATHWAY: &str = "Pathway";
pub const COL_SOURCE: &str = "Source";
pub const COL_REFINERY: &str = "Refinery";
pub const COL_USAGE_GJ: &str = "Usage_GJ";
pub const COL_UTILIZATION_PERCENT: &str = "Utilization_Percent";

// Summary metric names
pub const METRIC_SOURCING_COST: &str = "Total Sourcing Cost (Million USD)";
pub const METRIC_LEVY_COST: &str = "Carbon Levy/Credit Cost (Million USD)";
pub const METRIC_TOTAL_COST: &str = "TOTAL ANNUAL COST (Million USD)";
pub const METRIC_FLEET_GFI: &str = "Resulting Fleet WtW GFI (gCO2eq/MJ)";
pub const METRIC_GFI_THRESHOLD: &str = "Applicable GFI Threshold (gCO2eq/MJ)";
pub const METRIC_LEVY_RATE: &str = "Carbon Levy/Credit Rate ($/tonne)";

pub const SUMMARY_METRICS: [&str; 6] = [
    METRIC_SOURCING_COST,
    METRIC_LEVY_COST,
    METRIC_TOTAL_COST,
    METRIC_FLEET_GFI,
    METRIC_GFI_THRESHOLD,
    METRIC_LEVY_RATE,
];

// Template row labels
pub const TEMPLATE_PATHWAY_COUNT: usize = 7;
pub const TEMPLATE_PROCUREMENT_SOURCE: &str = "External Procurement";
pub const TEMPLATE_REFINERIES: [&str; 5] = ["REPLAN", "REFAP", "RNEST", "REDUC", "RPBC"];

// Plot filters
pub const MIX_MIN_PERCENT: f64 = 0.01;      // fuels at or below this share are left off the donut
pub const MIN_PLOTTED_GJ: f64 = 1.0;        // production/procurement entries at or below this are hidden

// Compliance chart axis
pub const GFI_AXIS_MAX: f64 = 95.0;

pub const NO_PROCUREMENT_NOTICE: &str = "No external procurement required for this scenario.";
