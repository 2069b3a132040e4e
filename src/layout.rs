//! Report template geometry
//!
//! The destination workbook is formula-bearing: derived figures reference
//! fixed cells, so extracted values must land at exact coordinates. This
//! module owns those coordinates. The compiled-in default mirrors the
//! standard energy report template; a YAML layout file can override any of
//! it for a revised template without a rebuild.

use crate::error::{BillError, BillResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

//==============================================================================
// Cell References
//==============================================================================

/// A single worksheet coordinate in A1 notation, stored zero-based.
///
/// Layout documents spell references the way the template does (`"D41"`);
/// parsing happens at load time so a bad reference is a layout error, never
/// a write-time surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    /// Parse an A1-style reference like `"D41"` or `"AA7"`.
    pub fn parse(text: &str) -> BillResult<Self> {
        let text = text.trim();
        let letters: String = text.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let digits = &text[letters.len()..];

        if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(BillError::Layout(format!(
                "invalid cell reference '{text}': expected column letters followed by a row number"
            )));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        if col == 0 || col > u16::MAX as u32 {
            return Err(BillError::Layout(format!(
                "invalid cell reference '{text}': column out of range"
            )));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| BillError::Layout(format!("invalid cell reference '{text}': bad row")))?;
        if row == 0 {
            return Err(BillError::Layout(format!(
                "invalid cell reference '{text}': rows start at 1"
            )));
        }

        Ok(Self {
            row: row - 1,
            col: (col - 1) as u16,
        })
    }

    /// The reference `rows` below this one, for walking a monthly block.
    pub fn down(&self, rows: u32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col,
        }
    }

    /// Convert a zero-based column index to Excel letters (0→A, 25→Z, 26→AA).
    pub fn column_letters(col: u16) -> String {
        let mut result = String::new();
        let mut num = col as usize;

        loop {
            let remainder = num % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if num < 26 {
                break;
            }
            num = num / 26 - 1;
        }

        result
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.col), self.row + 1)
    }
}

impl TryFrom<String> for CellRef {
    type Error = BillError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_string()
    }
}

fn a1(text: &str) -> CellRef {
    CellRef::parse(text).expect("static cell reference")
}

//==============================================================================
// Template Layout
//==============================================================================

/// Cells on the form sheet that receive facility profile fields. Gross floor
/// area is written twice; the template's report and benchmark sections each
/// read their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCells {
    pub entity: CellRef,
    pub facility: CellRef,
    pub address: CellRef,
    pub state_province: CellRef,
    pub zip_code: CellRef,
    pub gross_floor_area: Vec<CellRef>,
    pub building_type: CellRef,
    pub state_code: CellRef,
    pub percent_cooled: CellRef,
    pub heating_degree_days: CellRef,
    pub cooling_degree_days: CellRef,
    pub high_school: CellRef,
    pub number_of_workers: CellRef,
    pub open_weekends: CellRef,
    pub presence_of_cooking: CellRef,
}

impl Default for ProfileCells {
    fn default() -> Self {
        Self {
            entity: a1("D3"),
            facility: a1("D4"),
            address: a1("D6"),
            state_province: a1("D9"),
            zip_code: a1("D11"),
            gross_floor_area: vec![a1("E13"), a1("L12")],
            building_type: a1("L4"),
            state_code: a1("L9"),
            percent_cooled: a1("L13"),
            heating_degree_days: a1("L14"),
            cooling_degree_days: a1("L15"),
            high_school: a1("L16"),
            number_of_workers: a1("L17"),
            open_weekends: a1("L18"),
            presence_of_cooking: a1("L19"),
        }
    }
}

/// Top cells of the six monthly columns on the form sheet. Each anchor heads
/// a block of twelve cells running downward, one per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyAnchors {
    pub kwh: CellRef,
    pub kw_primary: CellRef,
    pub kw_secondary: CellRef,
    pub electric_cost: CellRef,
    pub gas_volume: CellRef,
    pub gas_cost: CellRef,
}

impl Default for MonthlyAnchors {
    fn default() -> Self {
        Self {
            kwh: a1("D41"),
            kw_primary: a1("E41"),
            kw_secondary: a1("F41"),
            electric_cost: a1("H41"),
            gas_volume: a1("K41"),
            gas_cost: a1("L41"),
        }
    }
}

impl MonthlyAnchors {
    fn all(&self) -> [(&'static str, CellRef); 6] {
        [
            ("kwh", self.kwh),
            ("kw_primary", self.kw_primary),
            ("kw_secondary", self.kw_secondary),
            ("electric_cost", self.electric_cost),
            ("gas_volume", self.gas_volume),
            ("gas_cost", self.gas_cost),
        ]
    }
}

/// Complete geometry of the destination workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub form_sheet: String,
    pub report_sheet: String,
    pub profile: ProfileCells,
    pub monthly: MonthlyAnchors,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            form_sheet: "Form".to_string(),
            report_sheet: "Report".to_string(),
            profile: ProfileCells::default(),
            monthly: MonthlyAnchors::default(),
        }
    }
}

impl TemplateLayout {
    /// Load a layout override document from a YAML file. Fields omitted in
    /// the document keep their default coordinates.
    pub fn from_path<P: AsRef<Path>>(path: P) -> BillResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse a layout override document from YAML text.
    pub fn from_yaml_str(content: &str) -> BillResult<Self> {
        let layout: Self = serde_yaml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> BillResult<()> {
        if self.form_sheet.trim().is_empty() {
            return Err(BillError::Layout("form sheet name is empty".to_string()));
        }
        if self.report_sheet.trim().is_empty() {
            return Err(BillError::Layout("report sheet name is empty".to_string()));
        }
        if self.profile.gross_floor_area.is_empty() {
            return Err(BillError::Layout(
                "gross_floor_area needs at least one target cell".to_string(),
            ));
        }

        // Two monthly blocks sharing an anchor would silently overwrite each
        // other twelve rows deep.
        let anchors = self.monthly.all();
        for (i, (name_a, cell_a)) in anchors.iter().enumerate() {
            for (name_b, cell_b) in anchors.iter().skip(i + 1) {
                if cell_a == cell_b {
                    return Err(BillError::Layout(format!(
                        "monthly anchors '{name_a}' and '{name_b}' both target {cell_a}"
                    )));
                }
            }
        }

        Ok(())
    }
}
