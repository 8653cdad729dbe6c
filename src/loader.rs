use crate::constants::*;
use crate::error::IngestError;
use crate::taxonomy::Taxonomy;
use crate::types::{
    DroppedColumns, FuelMatrix, FuelMixRow, MatrixRow, RefineryRow, ScenarioResult, SummaryRow,
    SummaryTable, Year,
};
use crate::util::parse_f64_safe;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::collections::HashSet;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Problems inside a sheet that was found. Reported to the user as
/// `IngestError::UnexpectedFormat`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    #[error("sheet '{sheet}' has no header row")]
    Empty { sheet: String },
    #[error("sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },
    #[error("sheet '{sheet}' row {row}, column '{column}': expected a number, found '{value}'")]
    NotANumber { sheet: String, row: usize, column: String, value: String },
    #[error("sheet '{sheet}' lists fuel '{fuel}' more than once")]
    DuplicateFuel { sheet: String, fuel: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn from_data(d: &Data) -> Cell {
        match d {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

/// A sheet as found in the workbook: first row is the header, blank rows removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    fn column(&self, name: &str) -> Result<usize, SheetError> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SheetError::MissingColumn {
                sheet: self.name.clone(),
                column: name.to_string(),
            })
    }

    fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows[row].get(col).unwrap_or(&Cell::Empty)
    }

    fn number(&self, row: usize, col: usize) -> Result<f64, SheetError> {
        match self.cell(row, col) {
            Cell::Empty => Ok(0.0),
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) if s.trim().is_empty() => Ok(0.0),
            Cell::Text(s) => parse_f64_safe(Some(s)).ok_or_else(|| SheetError::NotANumber {
                sheet: self.name.clone(),
                // 1-based spreadsheet row, header is row 1
                row: row + 2,
                column: self.header.get(col).cloned().unwrap_or_default(),
                value: s.clone(),
            }),
        }
    }

    fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).as_text()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub blank_rows: usize,
}

/// Open `bytes` as an xlsx workbook and pull out the five result sheets.
pub fn read_workbook(file_name: &str, bytes: &[u8]) -> Result<(Vec<RawSheet>, LoadReport), IngestError> {
    let unexpected = |message: String| IngestError::UnexpectedFormat {
        file: file_name.to_string(),
        message,
    };
    let mut wb = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes)).map_err(|e| unexpected(e.to_string()))?;

    let names = wb.sheet_names();
    if let Some(missing) = REQUIRED_SHEETS.iter().find(|s| !names.iter().any(|n| n == *s)) {
        return Err(IngestError::MissingSheet {
            file: file_name.to_string(),
            sheet: missing.to_string(),
        });
    }

    let mut report = LoadReport::default();
    let mut sheets = Vec::with_capacity(REQUIRED_SHEETS.len());
    for name in REQUIRED_SHEETS {
        let range = wb.worksheet_range(name).map_err(|e| unexpected(e.to_string()))?;
        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(cells) => cells
                .iter()
                .enumerate()
                .map(|(i, d)| match Cell::from_data(d).as_text() {
                    h if h.is_empty() => format!("Unnamed: {}", i),
                    h => h,
                })
                .collect(),
            None => Vec::new(),
        };
        let mut body = Vec::new();
        for cells in rows {
            report.total_rows += 1;
            let row: Vec<Cell> = cells.iter().map(Cell::from_data).collect();
            if row.iter().all(Cell::is_empty) {
                report.blank_rows += 1;
                continue;
            }
            body.push(row);
        }
        sheets.push(RawSheet { name: name.to_string(), header, rows: body });
    }
    Ok((sheets, report))
}

/// Full per-file pipeline: read, type, and conform to the taxonomy.
#[instrument(skip(bytes, taxonomy), fields(size = bytes.len()))]
pub fn parse_workbook(
    file_name: &str,
    bytes: &[u8],
    year: Year,
    taxonomy: &Taxonomy,
) -> Result<ScenarioResult, IngestError> {
    let (sheets, report) = read_workbook(file_name, bytes)?;
    let result = build_scenario(year, file_name, &sheets, taxonomy).map_err(|e| {
        IngestError::UnexpectedFormat {
            file: file_name.to_string(),
            message: e.to_string(),
        }
    })?;
    debug!(
        file = file_name,
        %year,
        rows = report.total_rows,
        blank = report.blank_rows,
        "parsed workbook"
    );
    Ok(result)
}

pub fn build_scenario(
    year: Year,
    file_name: &str,
    sheets: &[RawSheet],
    taxonomy: &Taxonomy,
) -> Result<ScenarioResult, SheetError> {
    let sheet = |name: &str| find_sheet(sheets, name);

    let summary = read_summary(sheet(SHEET_SUMMARY)?)?;
    let (fuel_mix, mix_dropped) = normalize_fuel_mix(SHEET_FUEL_MIX, &read_fuel_mix(sheet(SHEET_FUEL_MIX)?)?, taxonomy)?;
    let (production, prod_dropped) = normalize_matrix(SHEET_PRODUCTION, &read_matrix(sheet(SHEET_PRODUCTION)?)?, taxonomy)?;
    let (procurement, proc_dropped) = normalize_matrix(SHEET_PROCUREMENT, &read_matrix(sheet(SHEET_PROCUREMENT)?)?, taxonomy)?;
    let refinery = read_refinery(sheet(SHEET_REFINERY)?)?;

    let dropped: Vec<DroppedColumns> = [mix_dropped, prod_dropped, proc_dropped].into_iter().flatten().collect();
    for d in &dropped {
        if d.has_data {
            warn!(file = file_name, sheet = %d.sheet, columns = ?d.columns, "non-taxonomy fuels with data were dropped");
        } else {
            debug!(file = file_name, sheet = %d.sheet, columns = ?d.columns, "dropped empty non-taxonomy fuels");
        }
    }

    Ok(ScenarioResult {
        year,
        source_file: file_name.to_string(),
        summary,
        fuel_mix,
        production,
        procurement,
        refinery,
        dropped,
    })
}

fn find_sheet<'a>(sheets: &'a [RawSheet], name: &str) -> Result<&'a RawSheet, SheetError> {
    sheets
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| SheetError::Empty { sheet: name.to_string() })
}

fn require_header(sheet: &RawSheet) -> Result<(), SheetError> {
    if sheet.header.is_empty() {
        return Err(SheetError::Empty { sheet: sheet.name.clone() });
    }
    Ok(())
}

pub fn read_summary(sheet: &RawSheet) -> Result<SummaryTable, SheetError> {
    require_header(sheet)?;
    let m = sheet.column(COL_METRIC)?;
    let v = sheet.column(COL_VALUE)?;
    let rows = (0..sheet.rows.len())
        .map(|r| {
            Ok(SummaryRow {
                metric: sheet.text(r, m),
                value: sheet.number(r, v)?,
            })
        })
        .collect::<Result<Vec<_>, SheetError>>()?;
    Ok(SummaryTable { rows })
}

pub fn read_fuel_mix(sheet: &RawSheet) -> Result<Vec<FuelMixRow>, SheetError> {
    require_header(sheet)?;
    let f = sheet.column(COL_FUEL_TYPE)?;
    let t = sheet.column(COL_TOTAL_GJ)?;
    let p = sheet.column(COL_PERCENTAGE_MIX)?;
    (0..sheet.rows.len())
        .map(|r| {
            Ok(FuelMixRow {
                fuel_type: sheet.text(r, f),
                total_gj: sheet.number(r, t)?,
                percentage_mix: sheet.number(r, p)?,
            })
        })
        .collect()
}

/// First column names the rows; every other column is taken as a fuel.
pub fn read_matrix(sheet: &RawSheet) -> Result<FuelMatrix, SheetError> {
    require_header(sheet)?;
    let fuels = sheet.header[1..].to_vec();
    let mut rows = Vec::with_capacity(sheet.rows.len());
    for r in 0..sheet.rows.len() {
        let values = (1..sheet.header.len())
            .map(|c| sheet.number(r, c))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(MatrixRow { id: sheet.text(r, 0), values });
    }
    Ok(FuelMatrix {
        index_name: sheet.header[0].clone(),
        fuels,
        rows,
    })
}

pub fn read_refinery(sheet: &RawSheet) -> Result<Vec<RefineryRow>, SheetError> {
    require_header(sheet)?;
    let n = sheet.column(COL_REFINERY)?;
    let u = sheet.column(COL_USAGE_GJ)?;
    let p = sheet.column(COL_UTILIZATION_PERCENT)?;
    (0..sheet.rows.len())
        .map(|r| {
            Ok(RefineryRow {
                refinery: sheet.text(r, n),
                usage_gj: sheet.number(r, u)?,
                utilization_percent: sheet.number(r, p)?,
            })
        })
        .collect()
}

fn check_unique<'a>(sheet: &str, names: impl Iterator<Item = &'a str>) -> Result<(), SheetError> {
    let mut seen = HashSet::new();
    for n in names {
        if !seen.insert(n) {
            return Err(SheetError::DuplicateFuel {
                sheet: sheet.to_string(),
                fuel: n.to_string(),
            });
        }
    }
    Ok(())
}

/// Conform a plan table's columns to `taxonomy`: one column per taxonomy
/// fuel in canonical order, zero where the source had none, unknown columns
/// removed and reported.
pub fn normalize_matrix(
    sheet: &str,
    source: &FuelMatrix,
    taxonomy: &Taxonomy,
) -> Result<(FuelMatrix, Option<DroppedColumns>), SheetError> {
    check_unique(sheet, source.fuels.iter().map(String::as_str))?;

    // source column -> taxonomy slot
    let slots: Vec<Option<usize>> = source.fuels.iter().map(|f| taxonomy.position(f)).collect();

    let mut dropped_cols = Vec::new();
    let mut has_data = false;
    for (c, slot) in slots.iter().enumerate() {
        if slot.is_none() {
            dropped_cols.push(source.fuels[c].clone());
            has_data |= source.rows.iter().any(|r| r.values.get(c).is_some_and(|v| *v != 0.0));
        }
    }

    let rows = source
        .rows
        .iter()
        .map(|row| {
            let mut values = vec![0.0; taxonomy.len()];
            for (c, slot) in slots.iter().enumerate() {
                if let (Some(s), Some(v)) = (slot, row.values.get(c)) {
                    values[*s] = *v;
                }
            }
            MatrixRow { id: row.id.clone(), values }
        })
        .collect();

    let dropped = (!dropped_cols.is_empty()).then(|| DroppedColumns {
        sheet: sheet.to_string(),
        columns: dropped_cols,
        has_data,
    });
    Ok((
        FuelMatrix {
            index_name: source.index_name.clone(),
            fuels: taxonomy.fuels().to_vec(),
            rows,
        },
        dropped,
    ))
}

/// Conform fuel-mix rows to `taxonomy`: exactly one row per taxonomy fuel,
/// zero-filled, canonical order.
pub fn normalize_fuel_mix(
    sheet: &str,
    source: &[FuelMixRow],
    taxonomy: &Taxonomy,
) -> Result<(Vec<FuelMixRow>, Option<DroppedColumns>), SheetError> {
    check_unique(sheet, source.iter().map(|r| r.fuel_type.as_str()))?;

    let mut rows: Vec<FuelMixRow> = taxonomy
        .fuels()
        .iter()
        .map(|f| FuelMixRow {
            fuel_type: f.clone(),
            total_gj: 0.0,
            percentage_mix: 0.0,
        })
        .collect();

    let mut dropped_cols = Vec::new();
    let mut has_data = false;
    for src in source {
        match taxonomy.position(&src.fuel_type) {
            Some(i) => {
                rows[i].total_gj = src.total_gj;
                rows[i].percentage_mix = src.percentage_mix;
            }
            None => {
                dropped_cols.push(src.fuel_type.clone());
                has_data |= src.total_gj != 0.0 || src.percentage_mix != 0.0;
            }
        }
    }

    let dropped = (!dropped_cols.is_empty()).then(|| DroppedColumns {
        sheet: sheet.to_string(),
        columns: dropped_cols,
        has_data,
    });
    Ok((rows, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::MASTER_FUELS;
    use crate::template;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn sheet(name: &str, header: &[&str], rows: Vec<Vec<Cell>>) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn sample_sheets() -> Vec<RawSheet> {
        vec![
            sheet(
                SHEET_SUMMARY,
                &["Metric", "Value"],
                vec![
                    vec![text(METRIC_TOTAL_COST), num(812.5)],
                    vec![text(METRIC_FLEET_GFI), num(71.2)],
                    vec![text(METRIC_LEVY_COST), num(-4.0)],
                ],
            ),
            sheet(
                SHEET_FUEL_MIX,
                &["FuelType", "Total_GJ", "Percentage_Mix"],
                vec![
                    vec![text("VLSFO"), num(900.0), num(90.0)],
                    vec![text("HVO"), num(100.0), num(10.0)],
                ],
            ),
            sheet(
                SHEET_PRODUCTION,
                &["Pathway", "HVO", "Biodiesel"],
                vec![
                    vec![text("x1_"), num(100.0), num(0.0)],
                    vec![text("x2_"), Cell::Empty, text("2,500")],
                ],
            ),
            sheet(
                SHEET_PROCUREMENT,
                &["Source", "VLSFO"],
                vec![vec![text("External Procurement"), num(900.0)]],
            ),
            sheet(
                SHEET_REFINERY,
                &["Refinery", "Usage_GJ", "Utilization_Percent"],
                vec![vec![text("REPLAN"), num(100.0), num(40.0)]],
            ),
        ]
    }

    #[test]
    fn build_scenario_conforms_every_fuel_table() {
        let r = build_scenario(Year::Y2030, "results_2030.xlsx", &sample_sheets(), &MASTER_FUELS).unwrap();
        let fuels = MASTER_FUELS.fuels();

        assert_eq!(r.fuel_mix.len(), fuels.len());
        let names: Vec<&str> = r.fuel_mix.iter().map(|m| m.fuel_type.as_str()).collect();
        assert_eq!(names, fuels.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(r.production.fuels, fuels);
        assert_eq!(r.procurement.fuels, fuels);

        let hvo = MASTER_FUELS.position("HVO").unwrap();
        let bio = MASTER_FUELS.position("Biodiesel").unwrap();
        let b24 = MASTER_FUELS.position("B24").unwrap();
        assert_eq!(r.production.rows[0].values[hvo], 100.0);
        assert_eq!(r.production.rows[1].values[bio], 2500.0);
        assert_eq!(r.production.rows[1].values[hvo], 0.0);
        assert_eq!(r.production.rows[0].values[b24], 0.0);
        assert_eq!(r.production.index_name, "Pathway");
        assert_eq!(r.fuel_mix[hvo].percentage_mix, 10.0);
        assert_eq!(r.fuel_mix[b24].total_gj, 0.0);
        assert!(r.dropped.is_empty());
        assert_eq!(r.summary.get(METRIC_FLEET_GFI), Some(71.2));
    }

    #[test]
    fn unknown_columns_are_dropped_and_reported() {
        let src = FuelMatrix {
            index_name: "Pathway".into(),
            fuels: vec!["HVO".into(), "Hvo-typo".into(), "Empty-one".into()],
            rows: vec![MatrixRow { id: "x1_".into(), values: vec![1.0, 5.0, 0.0] }],
        };
        let (m, dropped) = normalize_matrix(SHEET_PRODUCTION, &src, &MASTER_FUELS).unwrap();
        assert_eq!(m.fuels.len(), MASTER_FUELS.len());
        assert!(!m.fuels.iter().any(|f| f == "Hvo-typo"));
        let d = dropped.unwrap();
        assert_eq!(d.columns, vec!["Hvo-typo".to_string(), "Empty-one".to_string()]);
        assert!(d.has_data);
    }

    #[test]
    fn zero_only_drops_are_flagged_as_empty() {
        let src = vec![FuelMixRow { fuel_type: "Ethanol??".into(), total_gj: 0.0, percentage_mix: 0.0 }];
        let (_, dropped) = normalize_fuel_mix(SHEET_FUEL_MIX, &src, &MASTER_FUELS).unwrap();
        assert!(!dropped.unwrap().has_data);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let r = build_scenario(Year::Y2040, "r_2040.xlsx", &sample_sheets(), &MASTER_FUELS).unwrap();
        let (again, dropped) = normalize_matrix(SHEET_PRODUCTION, &r.production, &MASTER_FUELS).unwrap();
        assert_eq!(again, r.production);
        assert!(dropped.is_none());
        let (mix, dropped) = normalize_fuel_mix(SHEET_FUEL_MIX, &r.fuel_mix, &MASTER_FUELS).unwrap();
        assert_eq!(mix, r.fuel_mix);
        assert!(dropped.is_none());
    }

    #[test]
    fn duplicate_fuels_are_rejected() {
        let src = vec![
            FuelMixRow { fuel_type: "HVO".into(), total_gj: 1.0, percentage_mix: 1.0 },
            FuelMixRow { fuel_type: "HVO".into(), total_gj: 2.0, percentage_mix: 2.0 },
        ];
        let err = normalize_fuel_mix(SHEET_FUEL_MIX, &src, &MASTER_FUELS).unwrap_err();
        assert_eq!(
            err,
            SheetError::DuplicateFuel { sheet: SHEET_FUEL_MIX.into(), fuel: "HVO".into() }
        );
    }

    #[test]
    fn text_in_numeric_column_is_a_format_error() {
        let mut sheets = sample_sheets();
        sheets[4].rows[0][1] = text("lots");
        let err = build_scenario(Year::Y2030, "f.xlsx", &sheets, &MASTER_FUELS).unwrap_err();
        assert_eq!(
            err,
            SheetError::NotANumber {
                sheet: SHEET_REFINERY.into(),
                row: 2,
                column: "Usage_GJ".into(),
                value: "lots".into(),
            }
        );
    }

    #[test]
    fn missing_column_is_a_format_error() {
        let mut sheets = sample_sheets();
        sheets[0].header[1] = "Amount".into();
        let err = build_scenario(Year::Y2030, "f.xlsx", &sheets, &MASTER_FUELS).unwrap_err();
        assert!(matches!(err, SheetError::MissingColumn { ref column, .. } if column == "Value"));
    }

    #[test]
    fn template_round_trips_to_all_zero_result() {
        for year in Year::ALL {
            let bytes = template::template_bytes(year).unwrap();
            let r = parse_workbook("template.xlsx", &bytes, year, &MASTER_FUELS).unwrap();
            assert_eq!(r.production.fuels, MASTER_FUELS.fuels());
            assert_eq!(r.procurement.fuels, MASTER_FUELS.fuels());
            assert_eq!(r.fuel_mix.len(), MASTER_FUELS.len());
            assert_eq!(r.production.rows.len(), TEMPLATE_PATHWAY_COUNT);
            assert_eq!(r.procurement.rows.len(), 1);
            assert_eq!(r.refinery.len(), TEMPLATE_REFINERIES.len());
            assert!(r.summary.rows.iter().all(|m| m.value == 0.0));
            assert!(r.production.rows.iter().all(|row| row.values.iter().all(|v| *v == 0.0)));
            assert!(r.fuel_mix.iter().all(|m| m.total_gj == 0.0 && m.percentage_mix == 0.0));
            assert!(r.dropped.is_empty());
        }
    }

    #[test]
    fn parsing_same_bytes_is_idempotent() {
        let bytes = template::template_bytes(Year::Y2050).unwrap();
        let a = parse_workbook("a_2050.xlsx", &bytes, Year::Y2050, &MASTER_FUELS).unwrap();
        let b = parse_workbook("a_2050.xlsx", &bytes, Year::Y2050, &MASTER_FUELS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_sheet_is_reported_by_name() {
        let bytes = template::testing::workbook_without(Year::Y2030, SHEET_REFINERY);
        let err = parse_workbook("results_2030.xlsx", &bytes, Year::Y2030, &MASTER_FUELS).unwrap_err();
        assert_eq!(
            err,
            IngestError::MissingSheet {
                file: "results_2030.xlsx".into(),
                sheet: SHEET_REFINERY.into(),
            }
        );
    }

    #[test]
    fn garbage_bytes_are_unexpected_format() {
        let err = parse_workbook("results_2030.xlsx", b"not a workbook", Year::Y2030, &MASTER_FUELS).unwrap_err();
        assert!(matches!(err, IngestError::UnexpectedFormat { ref file, .. } if file == "results_2030.xlsx"));
    }

    /// A hand-edited result file: fuel columns out of order, a misspelt
    /// fuel carrying data, numeric text, and a blank row.
    fn edited_workbook() -> Vec<u8> {
        use rust_xlsxwriter::Workbook;

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name(SHEET_SUMMARY).unwrap();
        ws.write_string(0, 0, COL_METRIC).unwrap();
        ws.write_string(0, 1, COL_VALUE).unwrap();
        for (r, (metric, value)) in [(METRIC_TOTAL_COST, 640.0), (METRIC_FLEET_GFI, 77.5), (METRIC_LEVY_COST, 12.0)]
            .into_iter()
            .enumerate()
        {
            ws.write_string(r as u32 + 1, 0, metric).unwrap();
            ws.write_number(r as u32 + 1, 1, value).unwrap();
        }

        let ws = wb.add_worksheet();
        ws.set_name(SHEET_FUEL_MIX).unwrap();
        for (c, h) in [COL_FUEL_TYPE, COL_TOTAL_GJ, COL_PERCENTAGE_MIX].into_iter().enumerate() {
            ws.write_string(0, c as u16, h).unwrap();
        }
        ws.write_string(1, 0, "VLSFO").unwrap();
        ws.write_number(1, 1, 3.0).unwrap();
        ws.write_number(1, 2, 42.0).unwrap();
        ws.write_string(2, 0, "B24").unwrap();
        ws.write_number(2, 1, 4.0).unwrap();
        ws.write_number(2, 2, 58.0).unwrap();

        let ws = wb.add_worksheet();
        ws.set_name(SHEET_PRODUCTION).unwrap();
        for (c, h) in [COL_PATHWAY, "VLSFO", "Typo", "B24"].into_iter().enumerate() {
            ws.write_string(0, c as u16, h).unwrap();
        }
        ws.write_string(1, 0, "x1_").unwrap();
        ws.write_number(1, 1, 3.0).unwrap();
        ws.write_number(1, 2, 9.0).unwrap();
        ws.write_string(1, 3, "4").unwrap();
        // row 3 left blank
        ws.write_string(3, 0, "x2_").unwrap();
        ws.write_number(3, 1, 1.0).unwrap();

        let ws = wb.add_worksheet();
        ws.set_name(SHEET_PROCUREMENT).unwrap();
        ws.write_string(0, 0, COL_SOURCE).unwrap();
        ws.write_string(0, 1, "B24").unwrap();
        ws.write_string(1, 0, TEMPLATE_PROCUREMENT_SOURCE).unwrap();
        ws.write_number(1, 1, 250.0).unwrap();

        let ws = wb.add_worksheet();
        ws.set_name(SHEET_REFINERY).unwrap();
        for (c, h) in [COL_REFINERY, COL_USAGE_GJ, COL_UTILIZATION_PERCENT].into_iter().enumerate() {
            ws.write_string(0, c as u16, h).unwrap();
        }
        ws.write_string(1, 0, "REPLAN").unwrap();
        ws.write_number(1, 1, 1000.0).unwrap();
        ws.write_number(1, 2, 55.5).unwrap();

        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn edited_workbook_is_conformed_end_to_end() {
        let bytes = edited_workbook();
        let r = parse_workbook("results_2040.xlsx", &bytes, Year::Y2040, &MASTER_FUELS).unwrap();

        assert_eq!(r.production.fuels, MASTER_FUELS.fuels());
        assert_eq!(r.production.rows.len(), 2);
        let vlsfo = MASTER_FUELS.position("VLSFO").unwrap();
        let b24 = MASTER_FUELS.position("B24").unwrap();
        assert_eq!(r.production.rows[0].id, "x1_");
        assert_eq!(r.production.rows[0].values[vlsfo], 3.0);
        assert_eq!(r.production.rows[0].values[b24], 4.0);
        assert_eq!(r.production.rows[1].values[b24], 0.0);
        assert_eq!(r.production.column_sums().iter().sum::<f64>(), 8.0);

        assert_eq!(
            r.dropped,
            vec![DroppedColumns {
                sheet: SHEET_PRODUCTION.into(),
                columns: vec!["Typo".into()],
                has_data: true,
            }]
        );
        assert_eq!(r.procurement.rows[0].values[b24], 250.0);
        assert_eq!(r.fuel_mix[b24].percentage_mix, 58.0);
        assert_eq!(r.summary.get(METRIC_FLEET_GFI), Some(77.5));
        assert_eq!(r.refinery[0].utilization_percent, 55.5);
    }
}
