/// Column-oriented feature table and the per-upload dataset container
///
/// These structs hold one uploaded dataset: the parsed CSV columns in
/// header order and the index of image files found next to the CSV. They
/// are built once per upload and passed read-only to the rendering side.
use std::path::PathBuf;

use crate::state::image_index::ImageIndex;

/// Column names with special meaning, never offered as plot features
pub const RESERVED_COLUMNS: [&str; 3] = ["id", "image_file", "thumbnail"];

/// A single parsed CSV cell
///
/// Type inference happens at parse time: numeric strings become `Number`,
/// empty cells become `Null`, everything else stays `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Numeric view of the cell: numbers directly, numeric text coerced
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Null => None,
        }
    }

    /// The text payload, if this cell is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric-coerced equality, used to match point identifiers against
    /// the `id` column regardless of how the CSV typed them
    pub fn coerced_eq(&self, other: &CellValue) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a == b;
        }
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Null => Ok(()),
        }
    }
}

/// One named column, values in row order
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Column-oriented table; column order follows the CSV header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<Column>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn cell(&self, name: &str, row: usize) -> Option<&CellValue> {
        self.column(name).and_then(|values| values.get(row))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Longest column length; shorter columns are a data-quality issue,
    /// not an error
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// A column is numeric when it has at least one non-null value and
    /// every non-null value coerces to a number
    pub fn is_numeric_column(&self, name: &str) -> bool {
        let Some(values) = self.column(name) else {
            return false;
        };
        let non_null: Vec<_> = values.iter().filter(|v| !v.is_null()).collect();
        !non_null.is_empty() && non_null.iter().all(|v| v.as_number().is_some())
    }

    /// Candidate plot features: numeric, named, non-reserved columns
    ///
    /// The unnamed index column pandas-style CSVs carry is excluded by the
    /// empty-name check.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.name.is_empty())
            .filter(|c| !RESERVED_COLUMNS.contains(&c.name.as_str()))
            .filter(|c| self.is_numeric_column(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Everything one upload produced
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub table: FeatureTable,
    pub images: ImageIndex,
    /// The uploaded folder root, for display and relative resolution
    pub root: PathBuf,
}

impl Dataset {
    /// Folder name for status messages
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> FeatureTable {
        let mut table = FeatureTable::new();
        table.push_column(
            "",
            vec![CellValue::Number(0.0), CellValue::Number(1.0)],
        );
        table.push_column(
            "id",
            vec![CellValue::Number(1.0), CellValue::Number(2.0)],
        );
        table.push_column(
            "f1",
            vec![CellValue::Number(0.2), CellValue::Number(0.6)],
        );
        table.push_column(
            "f2",
            vec![CellValue::Number(0.8), CellValue::Null],
        );
        table.push_column(
            "image_file",
            vec![
                CellValue::Text("a.png".into()),
                CellValue::Text("b.png".into()),
            ],
        );
        table.push_column(
            "note",
            vec![
                CellValue::Text("round".into()),
                CellValue::Text("elongated".into()),
            ],
        );
        table
    }

    #[test]
    fn test_feature_names_excludes_reserved_and_non_numeric() {
        let table = sample_table();
        assert_eq!(table.feature_names(), vec!["f1".to_string(), "f2".to_string()]);
    }

    #[test]
    fn test_numeric_column_with_nulls_is_numeric() {
        let table = sample_table();
        assert!(table.is_numeric_column("f2"));
        assert!(!table.is_numeric_column("note"));
        assert!(!table.is_numeric_column("missing"));
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        let mut table = FeatureTable::new();
        table.push_column("empty", vec![CellValue::Null, CellValue::Null]);
        assert!(!table.is_numeric_column("empty"));
    }

    #[test]
    fn test_cell_access() {
        let table = sample_table();
        assert_eq!(table.cell("f1", 1), Some(&CellValue::Number(0.6)));
        assert_eq!(table.cell("f1", 5), None);
        assert_eq!(table.cell("missing", 0), None);
    }

    #[test]
    fn test_coerced_eq_matches_numbers_and_numeric_text() {
        assert!(CellValue::Number(1.0).coerced_eq(&CellValue::Number(1.0)));
        assert!(CellValue::Number(1.0).coerced_eq(&CellValue::Text("1".into())));
        assert!(CellValue::Text("2".into()).coerced_eq(&CellValue::Number(2.0)));
        assert!(CellValue::Text("a".into()).coerced_eq(&CellValue::Text("a".into())));
        assert!(!CellValue::Text("a".into()).coerced_eq(&CellValue::Text("b".into())));
        assert!(!CellValue::Null.coerced_eq(&CellValue::Null));
    }

    #[test]
    fn test_row_count_is_longest_column() {
        let mut table = FeatureTable::new();
        table.push_column("a", vec![CellValue::Number(1.0); 5]);
        table.push_column("b", vec![CellValue::Number(1.0); 3]);
        assert_eq!(table.row_count(), 5);
    }
}
