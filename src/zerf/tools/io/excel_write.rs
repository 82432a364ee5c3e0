use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook, Worksheet};

use crate::zerf::tools::error::Result;
use crate::zerf::tools::model::{CellValue, Dataset};

/// Writes `dataset` as a single worksheet: one header row followed by the
/// records, wrapped in an Excel table with autofilter.
pub fn write_dataset(path: &Path, sheet_name: &str, dataset: &Dataset) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col_idx, header) in dataset.columns().iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in dataset.to_rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, (row_idx + 1) as u32, col_idx as u16, cell)?;
        }
    }

    // Excel tables need a header, at least one data row, and column names
    // that are unique ignoring case. Other sheets get a plain autofilter.
    if !dataset.columns().is_empty() && !dataset.is_empty() {
        let col_end = (dataset.columns().len() as u16).saturating_sub(1);
        let row_end = dataset.len() as u32;

        if headers_fit_table(dataset.columns()) {
            let table_columns: Vec<TableColumn> = dataset
                .columns()
                .iter()
                .map(|header| TableColumn::new().set_header(header))
                .collect();
            let mut excel_table = Table::new();
            excel_table
                .set_columns(&table_columns)
                .set_autofilter(true);
            worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
        } else {
            worksheet.autofilter(0, 0, row_end, col_end)?;
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    workbook_writer.save(path)?;
    Ok(())
}

fn headers_fit_table(columns: &[String]) -> bool {
    let mut seen = HashSet::new();
    columns
        .iter()
        .all(|column| !column.trim().is_empty() && seen.insert(column.to_lowercase()))
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<()> {
    match cell {
        CellValue::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        CellValue::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        CellValue::Boolean(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}
