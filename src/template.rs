// Blank result workbooks for the optimisation model to fill in.
use crate::constants::*;
use crate::error::TemplateError;
use crate::taxonomy::fuels_for_year;
use crate::types::Year;
use once_cell::sync::Lazy;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

static TEMPLATE_CACHE: Lazy<Mutex<HashMap<Year, Arc<Vec<u8>>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

pub fn template_file_name(year: Year) -> String {
    format!("matlab_results_template_{}.xlsx", year)
}

/// Workbook bytes for `year`, built once per process.
pub fn template_bytes(year: Year) -> Result<Arc<Vec<u8>>, TemplateError> {
    let mut cache = TEMPLATE_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(bytes) = cache.get(&year) {
        return Ok(Arc::clone(bytes));
    }
    let bytes = Arc::new(build_template(year, &REQUIRED_SHEETS)?);
    cache.insert(year, Arc::clone(&bytes));
    Ok(bytes)
}

fn build_template(year: Year, sheets: &[&str]) -> Result<Vec<u8>, TemplateError> {
    let fuels = fuels_for_year(year);
    let mut workbook = Workbook::new();
    for name in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(*name)?;
        match *name {
            SHEET_SUMMARY => write_summary(ws)?,
            SHEET_FUEL_MIX => write_fuel_mix(ws, fuels)?,
            SHEET_PRODUCTION => {
                let ids: Vec<String> = (1..=TEMPLATE_PATHWAY_COUNT).map(|i| format!("x{}_", i)).collect();
                write_plan(ws, COL_PATHWAY, &ids, fuels)?
            }
            SHEET_PROCUREMENT => write_plan(ws, COL_SOURCE, &[TEMPLATE_PROCUREMENT_SOURCE.to_string()], fuels)?,
            SHEET_REFINERY => write_refinery(ws)?,
            _ => {}
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_header(ws: &mut Worksheet, header: &[&str]) -> Result<(), XlsxError> {
    for (c, h) in header.iter().enumerate() {
        ws.write_string(0, c as u16, *h)?;
    }
    Ok(())
}

fn write_summary(ws: &mut Worksheet) -> Result<(), XlsxError> {
    write_header(ws, &[COL_METRIC, COL_VALUE])?;
    for (r, metric) in SUMMARY_METRICS.iter().enumerate() {
        let row = r as u32 + 1;
        ws.write_string(row, 0, *metric)?;
        ws.write_number(row, 1, 0.0)?;
    }
    Ok(())
}

fn write_fuel_mix(ws: &mut Worksheet, fuels: &[&str]) -> Result<(), XlsxError> {
    write_header(ws, &[COL_FUEL_TYPE, COL_TOTAL_GJ, COL_PERCENTAGE_MIX])?;
    for (r, fuel) in fuels.iter().enumerate() {
        let row = r as u32 + 1;
        ws.write_string(row, 0, *fuel)?;
        ws.write_number(row, 1, 0.0)?;
        ws.write_number(row, 2, 0.0)?;
    }
    Ok(())
}

fn write_plan(ws: &mut Worksheet, index: &str, ids: &[String], fuels: &[&str]) -> Result<(), XlsxError> {
    let mut header = vec![index];
    header.extend_from_slice(fuels);
    write_header(ws, &header)?;
    for (r, id) in ids.iter().enumerate() {
        let row = r as u32 + 1;
        ws.write_string(row, 0, id)?;
        for c in 0..fuels.len() {
            ws.write_number(row, c as u16 + 1, 0.0)?;
        }
    }
    Ok(())
}

fn write_refinery(ws: &mut Worksheet) -> Result<(), XlsxError> {
    write_header(ws, &[COL_REFINERY, COL_USAGE_GJ, COL_UTILIZATION_PERCENT])?;
    for (r, name) in TEMPLATE_REFINERIES.iter().enumerate() {
        let row = r as u32 + 1;
        ws.write_string(row, 0, *name)?;
        ws.write_number(row, 1, 0.0)?;
        ws.write_number(row, 2, 0.0)?;
    }
    Ok(())
}
