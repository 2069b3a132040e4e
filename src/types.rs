use serde::{Deserialize, Serialize};

//==============================================================================
// Grid Cells
//==============================================================================

/// A raw bill cell as decoded from the source workbook.
///
/// Bills arrive with no declared schema, so cells stay weakly typed until the
/// resolver assigns their column a role. `Empty` covers blank cells and cells
/// past the grid's extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric cell (integers are widened to f64 on import)
    Number(f64),
    /// Text cell, stored verbatim
    Text(String),
    /// Blank or missing cell
    Empty,
}

impl CellValue {
    /// Trimmed, case-folded text of a `Text` cell, used for header
    /// classification. Non-text cells carry no label.
    pub fn normalized(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.trim().to_lowercase()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric value of a `Number` cell. Text is never coerced.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One parsed bill as an immutable 2-D array of raw cells.
///
/// Indices are zero-based `(row, col)`. Reads past either extent return
/// `None`; rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Vec<CellValue>>> for Grid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(rows)
    }
}

//==============================================================================
// Column Roles
//==============================================================================

/// Semantic meaning a bill column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Kwh,
    Kw,
    ElectricCost,
    GasVolume,
    GasCost,
}

impl Role {
    /// Roles that must resolve for extraction to proceed; `GasCost` is the
    /// one optional role.
    pub const REQUIRED: [Role; 4] = [Role::Kwh, Role::Kw, Role::ElectricCost, Role::GasVolume];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Kwh => "kwh",
            Role::Kw => "kw",
            Role::ElectricCost => "electric_cost",
            Role::GasVolume => "gas_volume",
            Role::GasCost => "gas_cost",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved column index for each role. A role is present only if some
/// header column matched it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMap {
    pub kwh: Option<usize>,
    pub kw: Option<usize>,
    pub electric_cost: Option<usize>,
    pub gas_volume: Option<usize>,
    pub gas_cost: Option<usize>,
}

impl RoleMap {
    pub fn column(&self, role: Role) -> Option<usize> {
        match role {
            Role::Kwh => self.kwh,
            Role::Kw => self.kw,
            Role::ElectricCost => self.electric_cost,
            Role::GasVolume => self.gas_volume,
            Role::GasCost => self.gas_cost,
        }
    }

    pub fn set(&mut self, role: Role, column: usize) {
        match role {
            Role::Kwh => self.kwh = Some(column),
            Role::Kw => self.kw = Some(column),
            Role::ElectricCost => self.electric_cost = Some(column),
            Role::GasVolume => self.gas_volume = Some(column),
            Role::GasCost => self.gas_cost = Some(column),
        }
    }

    /// Required roles that did not resolve, in declaration order.
    pub fn missing_required(&self) -> Vec<Role> {
        Role::REQUIRED
            .iter()
            .copied()
            .filter(|role| self.column(*role).is_none())
            .collect()
    }
}

//==============================================================================
// Extracted Records
//==============================================================================

/// One month of electrical figures.
///
/// `kw_primary` and `kw_secondary` are both read from the single resolved
/// `kw` column: the destination template carries two demand cells per month
/// and source bills carry one demand column, so the value is projected twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalRecord {
    pub kwh: CellValue,
    pub kw_primary: CellValue,
    pub kw_secondary: CellValue,
    pub electric_cost: CellValue,
}

/// One month of gas figures. `cost` is `Empty` for every month when the bill
/// has no second cost column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasRecord {
    pub volume: CellValue,
    pub cost: CellValue,
}

/// Twelve months of electrical and gas records, row-aligned by month
/// position: record `i` in both tables comes from window row `i`. The
/// ordering determines which month's figures land in which template row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub electrical: Vec<ElectricalRecord>,
    pub gas: Vec<GasRecord>,
}

impl ExtractionResult {
    /// Fixed height of the data window below the header row.
    pub const MONTHS: usize = 12;
}

/// Full extraction of one bill: where the header was found, which columns
/// fed which role, and the monthly record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillExtraction {
    pub header_row: usize,
    pub roles: RoleMap,
    #[serde(flatten)]
    pub records: ExtractionResult,
}

//==============================================================================
// Facility Profile
//==============================================================================

/// Building types recognized by the report template's benchmark lookups.
/// Kept for reference output; profile values are written as given.
pub const BUILDING_TYPES: &[&str] = &[
    "Convenience Store",
    "Data center",
    "Data center estimates",
    "Hospital (general medical and surgical)",
    "Hotel",
    "K-12 school",
    "Medical office",
    "Multifamily housing",
    "bank branch, financial",
    "Parking",
    "dormitory",
    "and wholesale",
    "Senior living community",
    "Single-family homes",
    "Supermarket/grocery store",
    "Swimming pool",
    "Vehicle dealerships",
    "distribution center, non-",
    "Wastewater treatment plant",
    "Worship facility",
];

/// Facility intake fields copied to fixed cells of the report template's
/// form sheet. All fields are optional in profile documents; absent strings
/// stay blank and absent numbers are simply not written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityProfile {
    pub entity: String,
    pub facility: String,
    pub address: String,
    pub state_province: String,
    pub zip_code: String,
    pub gross_floor_area: Option<f64>,
    pub building_type: String,
    pub state_code: String,
    /// Percent of the building cooled, 0-100; written to the template as a
    /// fraction.
    pub percent_cooled: Option<f64>,
    pub heating_degree_days: Option<f64>,
    pub cooling_degree_days: Option<f64>,
    pub high_school: String,
    pub number_of_workers: Option<f64>,
    pub open_weekends: String,
    pub presence_of_cooking: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_folds_case() {
        let cell = CellValue::Text("  kWh  ".to_string());
        assert_eq!(cell.normalized().as_deref(), Some("kwh"));
    }

    #[test]
    fn normalized_is_none_for_non_text() {
        assert_eq!(CellValue::Number(12.0).normalized(), None);
        assert_eq!(CellValue::Empty.normalized(), None);
    }

    #[test]
    fn as_number_never_parses_text() {
        assert_eq!(CellValue::Text("42".to_string()).as_number(), None);
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
    }

    #[test]
    fn grid_reads_past_extent_as_none() {
        let grid = Grid::from(vec![vec![CellValue::from(1.0)]]);
        assert!(grid.cell(0, 0).is_some());
        assert!(grid.cell(0, 1).is_none());
        assert!(grid.cell(5, 0).is_none());
    }

    #[test]
    fn missing_required_lists_roles_in_declaration_order() {
        let mut map = RoleMap::default();
        map.set(Role::Kw, 2);
        assert_eq!(
            map.missing_required(),
            vec![Role::Kwh, Role::ElectricCost, Role::GasVolume]
        );
    }

    #[test]
    fn gas_cost_is_not_required() {
        let mut map = RoleMap::default();
        map.set(Role::Kwh, 1);
        map.set(Role::Kw, 2);
        map.set(Role::ElectricCost, 3);
        map.set(Role::GasVolume, 4);
        assert!(map.missing_required().is_empty());
        assert_eq!(map.column(Role::GasCost), None);
    }

    #[test]
    fn cell_value_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&CellValue::Number(3.5)).unwrap(),
            "3.5"
        );
        assert_eq!(
            serde_json::to_string(&CellValue::Text("Jan".to_string())).unwrap(),
            "\"Jan\""
        );
        assert_eq!(serde_json::to_string(&CellValue::Empty).unwrap(), "null");
    }
}
