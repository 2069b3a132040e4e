//! Bill-table locator and column-role resolver
//!
//! The inference core of the crate: find the header row of the monthly table
//! inside an unstructured grid, map its ambiguous column labels to semantic
//! roles, and slice the fixed 12-row data window beneath it into electrical
//! and gas record tables.
//!
//! Both stages are pure functions over an in-memory [`Grid`](crate::types::Grid);
//! file decoding and template writes live in [`crate::excel`].

mod locator;
mod resolver;

pub use locator::locate_header;
pub use resolver::resolve;

use crate::error::BillResult;
use crate::types::{BillExtraction, Grid};

/// Run the full pipeline over one bill grid: locate the header, resolve
/// column roles, and slice the monthly window.
///
/// Errors abort extraction for this bill only; callers processing a batch
/// report the failure and move on.
pub fn extract_bill(grid: &Grid) -> BillResult<BillExtraction> {
    let header_row = locate_header(grid)?;
    let (roles, records) = resolve(grid, header_row)?;
    Ok(BillExtraction {
        header_row,
        roles,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use pretty_assertions::assert_eq;

    fn text_row(labels: &[&str]) -> Vec<CellValue> {
        labels.iter().map(|l| CellValue::from(*l)).collect()
    }

    #[test]
    fn extract_bill_chains_locator_and_resolver() {
        let mut rows = vec![
            text_row(&["Utility Bill Summary"]),
            text_row(&["Month", "kWh", "kW", "Cost", "MCF", "Cost"]),
        ];
        for month in 1..=12 {
            rows.push(vec![
                CellValue::from(format!("M{month}")),
                CellValue::from(month as f64 * 100.0),
                CellValue::from(month as f64 * 10.0),
                CellValue::from(month as f64 * 50.0),
                CellValue::from(month as f64 * 2.0),
                CellValue::from(month as f64 * 5.0),
            ]);
        }
        let grid = Grid::from(rows);

        let extraction = extract_bill(&grid).unwrap();
        assert_eq!(extraction.header_row, 1);
        assert_eq!(extraction.roles.kwh, Some(1));
        assert_eq!(extraction.records.electrical.len(), 12);
        assert_eq!(extraction.records.gas.len(), 12);
        assert_eq!(
            extraction.records.electrical[0].kwh,
            CellValue::Number(100.0)
        );
        assert_eq!(extraction.records.gas[11].cost, CellValue::Number(60.0));
    }
}
