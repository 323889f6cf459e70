/// CSV parsing into the column-oriented feature table
///
/// The header row defines column names; every later row is parsed with
/// automatic type inference. Blank lines are skipped and ragged rows are
/// tolerated: missing cells become `Null` rather than errors.
use crate::state::dataset::{CellValue, FeatureTable};

/// Infer a cell's type from its raw text
fn infer_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Text(trimmed.to_string()),
    }
}

/// Parse CSV bytes into a feature table
pub fn parse_csv(bytes: &[u8]) -> Result<FeatureTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        // the reader already skips empty lines; this guards rows of
        // nothing but separators
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        for (index, column) in columns.iter_mut().enumerate() {
            let cell = record.get(index).map(infer_cell).unwrap_or(CellValue::Null);
            column.push(cell);
        }
    }

    let mut table = FeatureTable::new();
    for (header, values) in headers.into_iter().zip(columns) {
        table.push_column(header, values);
    }

    Ok(table)
}
