use std::collections::HashSet;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, info};

use crate::zerf::tools::error::{Result, ToolError};
use crate::zerf::tools::model::{CellValue, Dataset, Record};

/// A worksheet loaded as a dataset, with the name it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub sheet_name: String,
    pub dataset: Dataset,
    /// Fully blank rows below the header that were not turned into records.
    pub skipped_rows: usize,
}

/// Reads one worksheet of an exported report. The first row holds the field
/// names; every following non-blank row becomes a record. When `sheet` is
/// `None` the first worksheet in the workbook is used.
pub fn read_dataset(path: &Path, sheet: Option<&str>) -> Result<SheetData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?,
    };

    let range = read_required_sheet(&mut workbook, &sheet_name)?;
    let (dataset, skipped_rows) = range_to_dataset(&range);
    if skipped_rows > 0 {
        info!(sheet = %sheet_name, skipped_rows, "blank rows ignored");
    }
    debug!(
        sheet = %sheet_name,
        columns = dataset.columns().len(),
        rows = dataset.len(),
        "worksheet loaded"
    );

    Ok(SheetData {
        sheet_name,
        dataset,
        skipped_rows,
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_dataset(range: &calamine::Range<DataType>) -> (Dataset, usize) {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => return (Dataset::default(), 0),
    };
    let columns = header_names(headers);

    let mut dataset = Dataset::new(columns.clone());
    let mut skipped = 0usize;
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(cell_to_value).collect();
        if cells.iter().all(CellValue::is_blank) {
            skipped += 1;
            continue;
        }
        let record: Record = columns
            .iter()
            .cloned()
            .zip(cells.into_iter().chain(std::iter::repeat(CellValue::Empty)))
            .collect();
        dataset.push(record);
    }

    (dataset, skipped)
}

/// Trims header cells, names blank ones after their position and suffixes
/// repeated names so every column stays addressable. Excel table headers
/// must be unique ignoring case, so repeats are detected case-insensitively.
fn header_names(headers: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());

    for (index, header) in headers.into_iter().enumerate() {
        let base = match header.trim() {
            "" => format!("Unnamed: {index}"),
            trimmed => trimmed.to_string(),
        };

        let mut candidate = base.clone();
        let mut counter = 1;
        while used.contains(&candidate.to_lowercase()) {
            candidate = format!("{base}.{counter}");
            counter += 1;
        }
        used.insert(candidate.to_lowercase());
        names.push(candidate);
    }

    names
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::Empty => CellValue::Empty,
        DataType::DateTime(_) => match cell.as_datetime() {
            Some(datetime) => CellValue::Text(datetime.to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
