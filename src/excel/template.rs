//! Report template projection - extracted records → report workbook
//!
//! Projects one bill's record set (and optionally a facility profile) onto
//! the fixed coordinates of the energy report template. Derived figures on
//! the report sheet are written as live Excel formulas referencing the form
//! cells, so the workbook recomputes itself when opened.

use crate::error::{BillError, BillResult};
use crate::layout::{CellRef, TemplateLayout};
use crate::types::{BillExtraction, CellValue, ExtractionResult, FacilityProfile};
use rust_xlsxwriter::{Formula, Workbook, Worksheet};
use std::path::Path;

/// Report template writer bound to one [`TemplateLayout`].
pub struct ReportTemplate {
    layout: TemplateLayout,
}

impl ReportTemplate {
    /// Create a writer for the given template geometry
    pub fn new(layout: TemplateLayout) -> Self {
        Self { layout }
    }

    /// Writer for the standard template geometry
    pub fn standard() -> Self {
        Self::new(TemplateLayout::default())
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// Project the extraction onto the template and save the workbook
    pub fn write(
        &self,
        extraction: &BillExtraction,
        profile: Option<&FacilityProfile>,
        output_path: &Path,
    ) -> BillResult<()> {
        let mut workbook = self.build(extraction, profile)?;
        workbook
            .save(output_path)
            .map_err(|e| BillError::Export(format!("failed to save report workbook: {e}")))?;
        Ok(())
    }

    /// Project the extraction onto the template and return the workbook bytes
    pub fn to_bytes(
        &self,
        extraction: &BillExtraction,
        profile: Option<&FacilityProfile>,
    ) -> BillResult<Vec<u8>> {
        let mut workbook = self.build(extraction, profile)?;
        workbook
            .save_to_buffer()
            .map_err(|e| BillError::Export(format!("failed to serialize report workbook: {e}")))
    }

    fn build(
        &self,
        extraction: &BillExtraction,
        profile: Option<&FacilityProfile>,
    ) -> BillResult<Workbook> {
        let mut workbook = Workbook::new();

        {
            let form = workbook.add_worksheet();
            form.set_name(&self.layout.form_sheet)
                .map_err(|e| BillError::Export(format!("failed to name form sheet: {e}")))?;

            if let Some(profile) = profile {
                self.write_profile(form, profile)?;
            }
            self.write_monthly_block(form, &extraction.records)?;
        }

        {
            let report = workbook.add_worksheet();
            report
                .set_name(&self.layout.report_sheet)
                .map_err(|e| BillError::Export(format!("failed to name report sheet: {e}")))?;
            self.write_report(report)?;
        }

        Ok(workbook)
    }

    /// Copy the facility intake fields to their mapped form cells. Each
    /// value cell gets a label in the column to its left, the way the
    /// template lays out its keyword column.
    fn write_profile(&self, sheet: &mut Worksheet, profile: &FacilityProfile) -> BillResult<()> {
        let cells = &self.layout.profile;

        write_labeled_text(sheet, cells.entity, "Entity", &profile.entity)?;
        write_labeled_text(sheet, cells.facility, "Facility", &profile.facility)?;
        write_labeled_text(sheet, cells.address, "Address", &profile.address)?;
        write_labeled_text(
            sheet,
            cells.state_province,
            "State/Province",
            &profile.state_province,
        )?;
        write_labeled_text(sheet, cells.zip_code, "Zip Code", &profile.zip_code)?;
        write_labeled_text(
            sheet,
            cells.building_type,
            "Building Type",
            &profile.building_type,
        )?;
        write_labeled_text(sheet, cells.state_code, "State Code", &profile.state_code)?;
        write_labeled_text(sheet, cells.high_school, "High School", &profile.high_school)?;
        write_labeled_text(
            sheet,
            cells.open_weekends,
            "Open weekends",
            &profile.open_weekends,
        )?;

        // The template reads gross floor area from both its report and
        // benchmark sections; write every mapped copy.
        for cell in &cells.gross_floor_area {
            write_labeled_number(
                sheet,
                *cell,
                "Gross Floor Area",
                profile.gross_floor_area,
            )?;
        }

        // Entered as 0-100, stored as the fraction the template formulas use
        write_labeled_number(
            sheet,
            cells.percent_cooled,
            "Percent Cooled",
            profile.percent_cooled.map(|p| p / 100.0),
        )?;
        write_labeled_number(
            sheet,
            cells.heating_degree_days,
            "Heating Degree Days",
            profile.heating_degree_days,
        )?;
        write_labeled_number(
            sheet,
            cells.cooling_degree_days,
            "Cooling Degree Days",
            profile.cooling_degree_days,
        )?;
        write_labeled_number(
            sheet,
            cells.number_of_workers,
            "Number of workers",
            profile.number_of_workers,
        )?;
        write_labeled_number(
            sheet,
            cells.presence_of_cooking,
            "Presence of cooking",
            profile.presence_of_cooking,
        )?;

        Ok(())
    }

    /// Write the six twelve-row monthly columns at their anchors.
    fn write_monthly_block(
        &self,
        sheet: &mut Worksheet,
        records: &ExtractionResult,
    ) -> BillResult<()> {
        let anchors = &self.layout.monthly;

        for (i, record) in records.electrical.iter().enumerate() {
            let row = i as u32;
            write_cell(sheet, anchors.kwh.down(row), &record.kwh)?;
            write_cell(sheet, anchors.kw_primary.down(row), &record.kw_primary)?;
            write_cell(sheet, anchors.kw_secondary.down(row), &record.kw_secondary)?;
            write_cell(sheet, anchors.electric_cost.down(row), &record.electric_cost)?;
        }

        for (i, record) in records.gas.iter().enumerate() {
            let row = i as u32;
            write_cell(sheet, anchors.gas_volume.down(row), &record.volume)?;
            write_cell(sheet, anchors.gas_cost.down(row), &record.cost)?;
        }

        Ok(())
    }

    /// Derived annual figures as live formulas over the form cells.
    fn write_report(&self, sheet: &mut Worksheet) -> BillResult<()> {
        let form = &self.layout.form_sheet;
        let anchors = &self.layout.monthly;
        let area_cell = self.layout.profile.gross_floor_area[0];

        let rows: [(&str, String); 7] = [
            (
                "Annual consumption (kWh)",
                format!("=SUM({})", block_range(form, anchors.kwh)),
            ),
            (
                "Peak demand (kW)",
                format!("=MAX({})", block_range(form, anchors.kw_primary)),
            ),
            (
                "Average demand (kW)",
                format!("=AVERAGE({})", block_range(form, anchors.kw_primary)),
            ),
            (
                "Annual electric cost",
                format!("=SUM({})", block_range(form, anchors.electric_cost)),
            ),
            (
                "Annual gas volume (MCF)",
                format!("=SUM({})", block_range(form, anchors.gas_volume)),
            ),
            (
                "Annual gas cost",
                format!("=SUM({})", block_range(form, anchors.gas_cost)),
            ),
            ("Total utility cost", "=B4+B6".to_string()),
        ];

        for (row, (label, formula)) in rows.iter().enumerate() {
            let row = row as u32;
            sheet
                .write_string(row, 0, *label)
                .map_err(|e| BillError::Export(format!("failed to write report label: {e}")))?;
            sheet
                .write_formula(row, 1, Formula::new(formula.as_str()))
                .map_err(|e| BillError::Export(format!("failed to write report formula: {e}")))?;
        }

        // Intensity only divides when an area was supplied on the form
        let area = format!("'{form}'!{area_cell}");
        sheet
            .write_string(7, 0, "Cost per square foot")
            .map_err(|e| BillError::Export(format!("failed to write report label: {e}")))?;
        sheet
            .write_formula(7, 1, Formula::new(format!("=IF({area}>0,B7/{area},0)")))
            .map_err(|e| BillError::Export(format!("failed to write report formula: {e}")))?;

        Ok(())
    }
}

/// A1 range covering one monthly block on the form sheet.
fn block_range(form_sheet: &str, anchor: CellRef) -> String {
    format!(
        "'{form_sheet}'!{anchor}:{end}",
        end = anchor.down(ExtractionResult::MONTHS as u32 - 1)
    )
}

/// Write one extracted cell at its template coordinate. Empty cells are not
/// written at all; the template's formulas treat unwritten cells as blank.
fn write_cell(sheet: &mut Worksheet, at: CellRef, value: &CellValue) -> BillResult<()> {
    match value {
        CellValue::Number(n) => sheet
            .write_number(at.row, at.col, *n)
            .map_err(|e| BillError::Export(format!("failed to write {at}: {e}")))
            .map(|_| ()),
        CellValue::Text(s) => sheet
            .write_string(at.row, at.col, s)
            .map_err(|e| BillError::Export(format!("failed to write {at}: {e}")))
            .map(|_| ()),
        CellValue::Empty => Ok(()),
    }
}

fn write_label(sheet: &mut Worksheet, value_cell: CellRef, label: &str) -> BillResult<()> {
    if value_cell.col == 0 {
        return Ok(());
    }
    sheet
        .write_string(value_cell.row, value_cell.col - 1, label)
        .map_err(|e| BillError::Export(format!("failed to write label '{label}': {e}")))
        .map(|_| ())
}

fn write_labeled_text(
    sheet: &mut Worksheet,
    at: CellRef,
    label: &str,
    value: &str,
) -> BillResult<()> {
    write_label(sheet, at, label)?;
    if value.is_empty() {
        return Ok(());
    }
    sheet
        .write_string(at.row, at.col, value)
        .map_err(|e| BillError::Export(format!("failed to write {at}: {e}")))
        .map(|_| ())
}

fn write_labeled_number(
    sheet: &mut Worksheet,
    at: CellRef,
    label: &str,
    value: Option<f64>,
) -> BillResult<()> {
    write_label(sheet, at, label)?;
    let Some(value) = value else {
        return Ok(());
    };
    sheet
        .write_number(at.row, at.col, value)
        .map_err(|e| BillError::Export(format!("failed to write {at}: {e}")))
        .map(|_| ())
}
