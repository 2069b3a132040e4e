//! utilibill - utility bill extraction into energy report templates
//!
//! This library finds the monthly data table inside an unstructured utility
//! bill export, resolves which column carries which figure, and projects
//! twelve months of electrical and gas data onto the fixed cells of a
//! formula-bearing report template.
//!
//! # Features
//!
//! - Content-based header location (no fixed table position assumed)
//! - Column role resolution with deterministic duplicate-label handling
//! - Fixed 12-month window extraction tolerant of short tables
//! - Excel bill decoding (calamine) and report generation (rust_xlsxwriter)
//! - Facility profile and template layout documents in YAML
//!
//! # Example
//!
//! ```no_run
//! use utilibill::excel::BillImporter;
//! use utilibill::extract::extract_bill;
//!
//! let grid = BillImporter::new("bill.xlsx").import()?;
//! let extraction = extract_bill(&grid)?;
//!
//! println!("header at row {}", extraction.header_row);
//! println!("{} electrical records", extraction.records.electrical.len());
//! # Ok::<(), utilibill::error::BillError>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod extract;
pub mod layout;
pub mod types;

// Re-export commonly used types
pub use error::{BillError, BillResult};
pub use types::{
    BillExtraction, CellValue, ElectricalRecord, ExtractionResult, FacilityProfile, GasRecord,
    Grid, Role, RoleMap,
};
