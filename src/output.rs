use crate::constants::NO_PROCUREMENT_NOTICE;
use crate::reports::Panel;
use crate::types::{DisplayGrid, FuelMatrix, ScenarioResult};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::debug;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Plan tables have one column per fuel, so the header is written by hand.
pub fn write_matrix_csv(path: &Path, m: &FuelMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let mut header = vec![m.index_name.as_str()];
    header.extend(m.fuels.iter().map(String::as_str));
    wtr.write_record(&header)?;
    for row in &m.rows {
        let mut record = vec![row.id.clone()];
        record.extend(row.values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Normalized tables for one year, one CSV each. Returns the files written.
pub fn export_scenario(dir: &Path, r: &ScenarioResult) -> Result<Vec<PathBuf>> {
    let file = |stem: &str| dir.join(format!("{}_{}.csv", r.year, stem));

    let summary = file("summary");
    write_csv(&summary, &r.summary.rows)?;
    let mix = file("fuel_mix");
    write_csv(&mix, &r.fuel_mix)?;
    let production = file("production");
    write_matrix_csv(&production, &r.production)?;
    let procurement = file("procurement");
    write_matrix_csv(&procurement, &r.procurement)?;
    let refinery = file("refinery");
    write_csv(&refinery, &r.refinery)?;

    let written = vec![summary, mix, production, procurement, refinery];
    debug!(year = %r.year, files = written.len(), "exported normalized tables");
    Ok(written)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn grid_to_markdown(grid: &DisplayGrid, max_rows: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(grid.header.clone());
    for row in grid.rows.iter().take(max_rows) {
        builder.push_record(row.clone());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_grid(grid: &DisplayGrid, max_rows: usize) {
    if grid.rows.is_empty() || grid.header.len() < 2 {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", grid_to_markdown(grid, max_rows));
}

/// Console rendition of one year's panel.
pub fn print_panel(panel: &Panel, max_rows: usize) {
    println!("Results for {} ({})\n", panel.year, panel.source_file);
    println!("TOTAL ANNUAL COST:        {}", panel.kpis.total_cost_label());
    println!("Resulting Fleet WtW GFI:  {}", panel.kpis.fleet_gfi_label());
    println!("Carbon Levy Cost:         {}\n", panel.kpis.levy_cost_label());
    preview_table_rows(&panel.summary, max_rows);

    println!("Fuel Mix (%)");
    let shown: Vec<_> = panel
        .mix_table
        .iter()
        .filter(|r| panel.mix.iter().any(|s| s.label == r.fuel_type))
        .cloned()
        .collect();
    preview_table_rows(&shown, max_rows);

    println!("Production Plan (GJ)");
    preview_grid(&panel.production_table, max_rows);

    match &panel.procurement {
        Some(p) => {
            println!("Procurement Plan (GJ)");
            preview_grid(&p.table, max_rows);
        }
        None => println!("{}\n", NO_PROCUREMENT_NOTICE),
    }

    println!("Refinery Utilization");
    preview_table_rows(&panel.refinery_table, max_rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{fixtures::scenario, matrix_table};
    use crate::types::Year;
    use tempfile::tempdir;

    #[test]
    fn export_writes_one_csv_per_table() {
        let dir = tempdir().unwrap();
        let r = scenario(Year::Y2030, 10.0, 50.0);
        let files = export_scenario(dir.path(), &r).unwrap();
        assert_eq!(files.len(), 5);
        for f in &files {
            assert!(f.exists(), "{} missing", f.display());
        }

        let production = std::fs::read_to_string(dir.path().join("2030_production.csv")).unwrap();
        let header = production.lines().next().unwrap();
        assert!(header.starts_with("Pathway,B24,B30,B50,"));
        assert_eq!(header.split(',').count(), 17);

        let mix = std::fs::read_to_string(dir.path().join("2030_fuel_mix.csv")).unwrap();
        assert_eq!(mix.lines().next().unwrap(), "FuelType,Total_GJ,Percentage_Mix");
        assert_eq!(mix.lines().count(), 17);
    }

    #[test]
    fn json_summary_round_trips_through_serde() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kpi_summary.json");
        let k = crate::reports::kpi_summary(&scenario(Year::Y2040, 10.0, 50.0)).unwrap();
        write_json(&path, &vec![k]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["year"], 2040);
        assert_eq!(v[0]["fleet_gfi"], 50.0);
    }

    #[test]
    fn markdown_grid_has_header_and_rows() {
        let grid = matrix_table(&scenario(Year::Y2030, 0.0, 0.0).production);
        let md = grid_to_markdown(&grid, 2);
        assert!(md.contains("Pathway"));
        assert!(md.contains("2,000,000"));
        assert!(!md.contains("x3_"));
    }
}
