//! Bill importer implementation - bill workbook (.xlsx/.xlsm) → Grid

use crate::error::{BillError, BillResult};
use crate::types::{CellValue, Grid};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Bill importer for decoding an uploaded utility bill into a raw cell grid.
///
/// Bills carry their monthly table at an unknown position, so the whole
/// first worksheet is decoded with no header assumption; locating the table
/// is the resolver's job, not the decoder's.
pub struct BillImporter {
    path: std::path::PathBuf,
}

impl BillImporter {
    /// Create a new bill importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Decode the first worksheet of the bill into a [`Grid`]
    pub fn import(&self) -> BillResult<Grid> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            BillError::Import(format!(
                "failed to open bill '{}': {e}",
                self.path.display()
            ))
        })?;
        grid_from_workbook(&mut workbook, &self.path.display().to_string())
    }
}

/// Decode a bill delivered as in-memory bytes (upload path).
pub fn grid_from_bytes(bytes: Vec<u8>) -> BillResult<Grid> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| BillError::Import(format!("failed to read uploaded bill: {e}")))?;
    grid_from_workbook(&mut workbook, "uploaded bill")
}

fn grid_from_workbook<RS: Read + Seek>(workbook: &mut Xlsx<RS>, source: &str) -> BillResult<Grid> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| BillError::Import(format!("{source}: workbook has no sheets")))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        BillError::Import(format!("{source}: failed to read sheet '{sheet_name}': {e}"))
    })?;

    Ok(grid_from_range(&range))
}

fn grid_from_range(range: &Range<Data>) -> Grid {
    let (height, width) = range.get_size();

    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            cells.push(convert_cell(range.get((row, col))));
        }
        rows.push(cells);
    }

    Grid::new(rows)
}

/// Map a calamine cell onto the weakly-typed domain cell.
fn convert_cell(data: Option<&Data>) -> CellValue {
    match data {
        Some(Data::Float(f)) => CellValue::Number(*f),
        Some(Data::Int(i)) => CellValue::Number(*i as f64),
        Some(Data::String(s)) => CellValue::Text(s.clone()),
        // Booleans keep their display text; nothing downstream types them
        Some(Data::Bool(b)) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Some(Data::DateTime(dt)) => CellValue::Number(dt.as_f64()),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => CellValue::Text(s.clone()),
        Some(Data::Error(_)) | Some(Data::Empty) | None => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_numbers() {
        assert_eq!(
            convert_cell(Some(&Data::Float(1234.5))),
            CellValue::Number(1234.5)
        );
        assert_eq!(convert_cell(Some(&Data::Int(42))), CellValue::Number(42.0));
    }

    #[test]
    fn test_convert_cell_text() {
        assert_eq!(
            convert_cell(Some(&Data::String("Month".to_string()))),
            CellValue::Text("Month".to_string())
        );
        assert_eq!(
            convert_cell(Some(&Data::Bool(true))),
            CellValue::Text("TRUE".to_string())
        );
    }

    #[test]
    fn test_convert_cell_missing() {
        assert_eq!(convert_cell(Some(&Data::Empty)), CellValue::Empty);
        assert_eq!(convert_cell(None), CellValue::Empty);
        assert_eq!(
            convert_cell(Some(&Data::Error(calamine::CellErrorType::Div0))),
            CellValue::Empty
        );
    }

    #[test]
    fn test_grid_from_range_preserves_shape() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("Month".to_string()));
        range.set_value((0, 1), Data::String("kWh".to_string()));
        range.set_value((1, 1), Data::Float(900.0));

        let grid = grid_from_range(&range);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(0, 0), Some(&CellValue::Text("Month".to_string())));
        assert_eq!(grid.cell(1, 1), Some(&CellValue::Number(900.0)));
        // Never-set cell inside the range reads as empty
        assert_eq!(grid.cell(1, 0), Some(&CellValue::Empty));
    }

    #[test]
    fn test_grid_from_bytes_rejects_non_workbook() {
        let result = grid_from_bytes(b"not a workbook".to_vec());
        assert!(matches!(result, Err(BillError::Import(_))));
    }
}
