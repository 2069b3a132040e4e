use crate::error::{BillError, BillResult};
use crate::types::{
    CellValue, ElectricalRecord, ExtractionResult, GasRecord, Grid, Role, RoleMap,
};

/// Assign semantic roles to the header row's columns and slice the 12-row
/// window beneath it.
///
/// Each header label is trimmed and case-folded, then classified by the
/// first matching rule:
///
/// 1. contains `"kw/h"` or `"kwh"` → `kwh`
/// 2. equals `"kw"` → `kw`
/// 3. equals `"cost"` and contains `"electric"` → `electric_cost`
/// 4. equals `"cost"` → first such column takes `electric_cost`, any later
///    one takes `gas_cost`
/// 5. contains `"mcf"` → `gas_volume`
/// 6. otherwise the column carries no role
///
/// When two columns match the same non-cost rule the later column wins; only
/// the duplicate-`"cost"` case carries the left-to-right electric/gas split.
/// Extraction requires `kwh`, `kw`, `electric_cost` and `gas_volume`;
/// anything else missing fails with [`BillError::MissingRoles`] naming the
/// absent roles. Window rows past the grid's extent produce records whose
/// every field is [`CellValue::Empty`] rather than an error.
pub fn resolve(grid: &Grid, header_row: usize) -> BillResult<(RoleMap, ExtractionResult)> {
    let roles = classify_header(grid.row(header_row).unwrap_or(&[]));

    let missing = roles.missing_required();
    if !missing.is_empty() {
        return Err(BillError::MissingRoles(missing));
    }

    let records = extract_window(grid, header_row, &roles);
    Ok((roles, records))
}

fn classify_header(header: &[CellValue]) -> RoleMap {
    let mut roles = RoleMap::default();

    for (idx, cell) in header.iter().enumerate() {
        let Some(label) = cell.normalized() else {
            continue;
        };

        if label.contains("kw/h") || label.contains("kwh") {
            roles.set(Role::Kwh, idx);
        } else if label == "kw" {
            roles.set(Role::Kw, idx);
        } else if label == "cost" && label.contains("electric") {
            // An exact "cost" label cannot also contain "electric", so this
            // arm never matches; it stays ahead of the duplicate-cost arm to
            // keep the classification order explicit.
            roles.set(Role::ElectricCost, idx);
        } else if label == "cost" {
            if roles.electric_cost.is_none() {
                roles.set(Role::ElectricCost, idx);
            } else {
                roles.set(Role::GasCost, idx);
            }
        } else if label.contains("mcf") {
            roles.set(Role::GasVolume, idx);
        }
    }

    roles
}

fn extract_window(grid: &Grid, header_row: usize, roles: &RoleMap) -> ExtractionResult {
    let mut electrical = Vec::with_capacity(ExtractionResult::MONTHS);
    let mut gas = Vec::with_capacity(ExtractionResult::MONTHS);

    for offset in 1..=ExtractionResult::MONTHS {
        let row = header_row + offset;
        let read = |column: Option<usize>| -> CellValue {
            column
                .and_then(|col| grid.cell(row, col))
                .cloned()
                .unwrap_or(CellValue::Empty)
        };

        let kw = read(roles.kw);
        electrical.push(ElectricalRecord {
            kwh: read(roles.kwh),
            kw_primary: kw.clone(),
            kw_secondary: kw,
            electric_cost: read(roles.electric_cost),
        });
        gas.push(GasRecord {
            volume: read(roles.gas_volume),
            cost: read(roles.gas_cost),
        });
    }

    ExtractionResult { electrical, gas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(labels: &[&str]) -> Vec<CellValue> {
        labels.iter().map(|l| CellValue::from(*l)).collect()
    }

    /// Grid with the given header at row 0 and `data_rows` numeric rows
    /// beneath it, cell (r, c) holding `r * 100 + c`.
    fn grid_with_data(labels: &[&str], data_rows: usize) -> Grid {
        let mut rows = vec![header(labels)];
        for r in 1..=data_rows {
            rows.push(
                (0..labels.len())
                    .map(|c| CellValue::Number((r * 100 + c) as f64))
                    .collect(),
            );
        }
        Grid::from(rows)
    }

    #[test]
    fn duplicate_cost_columns_split_electric_then_gas() {
        let grid = grid_with_data(&["Month", "kWh", "kW", "Cost", "MCF", "Cost"], 12);
        let (roles, _) = resolve(&grid, 0).unwrap();
        assert_eq!(roles.electric_cost, Some(3));
        assert_eq!(roles.gas_cost, Some(5));
    }

    #[test]
    fn missing_roles_are_named_exactly() {
        let grid = grid_with_data(&["Month", "kWh", "Cost"], 12);
        match resolve(&grid, 0) {
            Err(BillError::MissingRoles(missing)) => {
                assert_eq!(missing, vec![Role::Kw, Role::GasVolume]);
            }
            other => panic!("expected MissingRoles, got {other:?}"),
        }
    }

    #[test]
    fn single_cost_column_means_no_gas_cost() {
        let grid = grid_with_data(&["Month", "kWh", "kW", "Cost", "MCF"], 12);
        let (roles, records) = resolve(&grid, 0).unwrap();
        assert_eq!(roles.gas_cost, None);
        assert!(records.gas.iter().all(|r| r.cost == CellValue::Empty));
    }

    #[test]
    fn electric_cost_exact_rule_is_inert() {
        // "Electric Cost" is not exactly "cost", so it matches no rule and
        // the column is ignored; the bare "Cost" column still resolves via
        // the duplicate-cost arm.
        let grid = grid_with_data(&["Month", "kWh", "kW", "Electric Cost", "Cost", "MCF"], 12);
        let (roles, _) = resolve(&grid, 0).unwrap();
        assert_eq!(roles.electric_cost, Some(4));
        assert_eq!(roles.gas_cost, None);
    }

    #[test]
    fn compound_cost_label_alone_fails_resolution() {
        let grid = grid_with_data(&["Month", "kWh", "kW", "Electric Cost", "MCF"], 12);
        match resolve(&grid, 0) {
            Err(BillError::MissingRoles(missing)) => {
                assert_eq!(missing, vec![Role::ElectricCost]);
            }
            other => panic!("expected MissingRoles, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_kwh_last_wins() {
        let grid = grid_with_data(&["Month", "kWh", "kW", "Cost", "MCF", "kW/h"], 12);
        let (roles, _) = resolve(&grid, 0).unwrap();
        assert_eq!(roles.kwh, Some(5));
    }

    #[test]
    fn kw_match_is_exact_not_substring() {
        // "kW Demand" must not take the kw role; "kWh" already covers the
        // substring family.
        let grid = grid_with_data(&["Month", "kWh", "kW Demand", "Cost", "MCF"], 12);
        match resolve(&grid, 0) {
            Err(BillError::MissingRoles(missing)) => {
                assert_eq!(missing, vec![Role::Kw]);
            }
            other => panic!("expected MissingRoles, got {other:?}"),
        }
    }

    #[test]
    fn both_kw_fields_read_the_same_column() {
        let grid = grid_with_data(&["Month", "kWh", "kW", "Cost", "MCF"], 12);
        let (_, records) = resolve(&grid, 0).unwrap();
        for record in &records.electrical {
            assert_eq!(record.kw_primary, record.kw_secondary);
        }
        assert_eq!(records.electrical[0].kw_primary, CellValue::Number(102.0));
    }

    #[test]
    fn window_is_fixed_at_twelve_with_empty_tail() {
        // Header at row 0, only 8 data rows beneath it.
        let grid = grid_with_data(&["Month", "kWh", "kW", "Cost", "MCF", "Cost"], 8);
        let (_, records) = resolve(&grid, 0).unwrap();

        assert_eq!(records.electrical.len(), ExtractionResult::MONTHS);
        assert_eq!(records.gas.len(), ExtractionResult::MONTHS);

        for record in &records.electrical[..8] {
            assert!(!record.kwh.is_empty());
        }
        for record in &records.electrical[8..] {
            assert_eq!(record.kwh, CellValue::Empty);
            assert_eq!(record.kw_primary, CellValue::Empty);
            assert_eq!(record.electric_cost, CellValue::Empty);
        }
        for record in &records.gas[8..] {
            assert_eq!(record.volume, CellValue::Empty);
            assert_eq!(record.cost, CellValue::Empty);
        }
    }

    #[test]
    fn round_trip_reproduces_known_values_in_month_order() {
        let labels = ["Month", "kWh", "kW", "Cost", "MCF", "Cost"];
        let mut rows = vec![header(&labels)];
        for month in 1..=12 {
            let m = month as f64;
            rows.push(vec![
                CellValue::from(format!("2024-{month:02}")),
                CellValue::from(m * 1000.0),
                CellValue::from(m * 7.0),
                CellValue::from(m * 120.5),
                CellValue::from(m * 3.0),
                CellValue::from(m * 42.0),
            ]);
        }
        let grid = Grid::from(rows);

        let (_, records) = resolve(&grid, 0).unwrap();
        for (i, record) in records.electrical.iter().enumerate() {
            let m = (i + 1) as f64;
            assert_eq!(record.kwh, CellValue::Number(m * 1000.0));
            assert_eq!(record.kw_primary, CellValue::Number(m * 7.0));
            assert_eq!(record.kw_secondary, CellValue::Number(m * 7.0));
            assert_eq!(record.electric_cost, CellValue::Number(m * 120.5));
        }
        for (i, record) in records.gas.iter().enumerate() {
            let m = (i + 1) as f64;
            assert_eq!(record.volume, CellValue::Number(m * 3.0));
            assert_eq!(record.cost, CellValue::Number(m * 42.0));
        }
    }

    #[test]
    fn text_cells_in_the_window_pass_through_verbatim() {
        let mut rows = vec![header(&["Month", "kWh", "kW", "Cost", "MCF"])];
        rows.push(vec![
            CellValue::from("January"),
            CellValue::from("n/a"),
            CellValue::from(12.0),
            CellValue::from(99.0),
            CellValue::from(1.5),
        ]);
        let grid = Grid::from(rows);

        let (_, records) = resolve(&grid, 0).unwrap();
        assert_eq!(records.electrical[0].kwh, CellValue::Text("n/a".to_string()));
    }
}
