use crate::error::{BillError, BillResult};
use crate::types::Grid;

/// Substring that marks the monthly table's header row.
const HEADER_MARKER: &str = "month";

/// Find the row that introduces the monthly data table.
///
/// A row qualifies if at least one of its cells, after trimming and case
/// folding, contains `"month"`. The first qualifying row wins even when
/// later rows would also qualify. Returns [`BillError::HeaderNotFound`]
/// when no row qualifies; that is terminal for the current bill.
pub fn locate_header(grid: &Grid) -> BillResult<usize> {
    grid.rows()
        .position(|row| {
            row.iter()
                .any(|cell| matches!(cell.normalized(), Some(text) if text.contains(HEADER_MARKER)))
        })
        .ok_or(BillError::HeaderNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn grid_of(rows: Vec<Vec<CellValue>>) -> Grid {
        Grid::from(rows)
    }

    #[test]
    fn finds_header_by_substring_case_insensitively() {
        let grid = grid_of(vec![
            vec![CellValue::from("Account 1234")],
            vec![CellValue::from("  Billing MONTH  "), CellValue::from("kWh")],
        ]);
        assert_eq!(locate_header(&grid).unwrap(), 1);
    }

    #[test]
    fn first_qualifying_row_wins() {
        let grid = grid_of(vec![
            vec![CellValue::from("Month")],
            vec![CellValue::from("Month"), CellValue::from("kWh")],
        ]);
        assert_eq!(locate_header(&grid).unwrap(), 0);
    }

    #[test]
    fn fails_when_no_cell_contains_marker() {
        let grid = grid_of(vec![
            vec![CellValue::from("kWh"), CellValue::from("Cost")],
            vec![CellValue::Number(42.0), CellValue::Empty],
        ]);
        assert!(matches!(
            locate_header(&grid),
            Err(BillError::HeaderNotFound)
        ));
    }

    #[test]
    fn numeric_cells_never_qualify() {
        // A number cell carries no label text, whatever it displays as.
        let grid = grid_of(vec![vec![CellValue::Number(12.0)]]);
        assert!(matches!(
            locate_header(&grid),
            Err(BillError::HeaderNotFound)
        ));
    }

    #[test]
    fn empty_grid_has_no_header() {
        assert!(matches!(
            locate_header(&Grid::default()),
            Err(BillError::HeaderNotFound)
        ));
    }
}
