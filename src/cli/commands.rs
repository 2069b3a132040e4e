use crate::error::{BillError, BillResult};
use crate::excel::{BillImporter, ReportTemplate};
use crate::extract::extract_bill;
use crate::layout::{CellRef, TemplateLayout};
use crate::types::{BillExtraction, CellValue, FacilityProfile, Role, BUILDING_TYPES};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Format a cell for terminal display, trimming float noise on numbers.
fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) => {
            let rounded = (n * 1e6).round() / 1e6;
            format!("{rounded:.6}")
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        }
        CellValue::Text(s) => s.clone(),
        CellValue::Empty => "-".to_string(),
    }
}

/// Execute the extract command over one or more bills.
///
/// Each bill is decoded, located and resolved independently; a failure is
/// reported and the batch moves on to the next file. The command fails
/// overall if any bill failed.
pub fn extract(
    files: Vec<PathBuf>,
    json: bool,
    yaml: bool,
    output: Option<PathBuf>,
    verbose: bool,
) -> BillResult<()> {
    println!("{}", "⚡ utilibill - Extracting bill data".bold().green());
    println!();

    let mut extracted: Vec<(PathBuf, BillExtraction)> = Vec::new();
    let mut last_error: Option<BillError> = None;

    for file in &files {
        println!("   Bill: {}", file.display());

        let result = BillImporter::new(file).import().and_then(|grid| {
            if verbose {
                println!(
                    "{}",
                    format!("   📖 Decoded {} rows", grid.row_count()).cyan()
                );
            }
            extract_bill(&grid)
        });

        match result {
            Ok(extraction) => {
                if verbose {
                    println!(
                        "{}",
                        format!(
                            "   📌 Header at spreadsheet row {}",
                            extraction.header_row + 1
                        )
                        .cyan()
                    );
                }
                if !json && !yaml {
                    print_extraction(&extraction);
                }
                extracted.push((file.clone(), extraction));
            }
            Err(e) => {
                println!("{}", format!("   ❌ {e}").bold().red());
                last_error = Some(e);
            }
        }
        println!();
    }

    if json || yaml {
        let serialized = serialize_extractions(&extracted, json)?;
        match &output {
            Some(path) => {
                std::fs::write(path, serialized)?;
                println!("   Wrote {}", path.display());
            }
            None => println!("{serialized}"),
        }
    }

    match last_error {
        Some(e) if extracted.is_empty() => Err(e),
        Some(e) => {
            println!(
                "{}",
                format!(
                    "⚠️  {} of {} bills failed extraction",
                    files.len() - extracted.len(),
                    files.len()
                )
                .yellow()
            );
            Err(e)
        }
        None => {
            println!("{}", "✅ Extraction complete".bold().green());
            Ok(())
        }
    }
}

fn serialize_extractions(
    extracted: &[(PathBuf, BillExtraction)],
    json: bool,
) -> BillResult<String> {
    #[derive(serde::Serialize)]
    struct Entry<'a> {
        bill: String,
        #[serde(flatten)]
        extraction: &'a BillExtraction,
    }

    let entries: Vec<Entry> = extracted
        .iter()
        .map(|(path, extraction)| Entry {
            bill: path.display().to_string(),
            extraction,
        })
        .collect();

    if json {
        serde_json::to_string_pretty(&entries)
            .map_err(|e| BillError::Export(format!("failed to serialize records: {e}")))
    } else {
        Ok(serde_yaml::to_string(&entries)?)
    }
}

fn print_extraction(extraction: &BillExtraction) {
    println!(
        "   {:<5} {:>12} {:>10} {:>14} {:>10} {:>10}",
        "Month".bold(),
        "kWh".bold(),
        "kW".bold(),
        "Electric Cost".bold(),
        "MCF".bold(),
        "Gas Cost".bold()
    );
    for (i, (electrical, gas)) in extraction
        .records
        .electrical
        .iter()
        .zip(&extraction.records.gas)
        .enumerate()
    {
        println!(
            "   {:<5} {:>12} {:>10} {:>14} {:>10} {:>10}",
            i + 1,
            format_cell(&electrical.kwh),
            format_cell(&electrical.kw_primary),
            format_cell(&electrical.electric_cost),
            format_cell(&gas.volume),
            format_cell(&gas.cost),
        );
    }
}

/// Execute the roles command - show how the header resolved.
///
/// Diagnostic view for fixing a bill that fails extraction: which row was
/// taken as the header, which column feeds each role, and the label that
/// matched.
pub fn roles(file: PathBuf) -> BillResult<()> {
    println!("{}", "🔍 utilibill - Column role resolution".bold().green());
    println!("   Bill: {}\n", file.display());

    let grid = BillImporter::new(&file).import()?;
    let extraction = extract_bill(&grid)?;

    println!(
        "   Header found at spreadsheet row {}",
        (extraction.header_row + 1).to_string().bright_blue().bold()
    );
    println!();

    let header = grid.row(extraction.header_row).unwrap_or(&[]);
    let all_roles = [
        Role::Kwh,
        Role::Kw,
        Role::ElectricCost,
        Role::GasVolume,
        Role::GasCost,
    ];
    for role in all_roles {
        match extraction.roles.column(role) {
            Some(col) => {
                let label = header
                    .get(col)
                    .and_then(|c| c.normalized())
                    .unwrap_or_default();
                println!(
                    "   {:<14} column {} ({})",
                    role.name().cyan(),
                    CellRef::column_letters(col as u16).bold(),
                    label
                );
            }
            None => println!("   {:<14} {}", role.name().cyan(), "not present".yellow()),
        }
    }

    println!();
    println!("{}", "✅ Resolution complete".bold().green());
    Ok(())
}

/// Execute the apply command - full pipeline into a report workbook.
pub fn apply(
    bill: PathBuf,
    output: Option<PathBuf>,
    profile: Option<PathBuf>,
    layout: Option<PathBuf>,
    verbose: bool,
) -> BillResult<()> {
    println!("{}", "⚡ utilibill - Applying bill to template".bold().green());
    println!("   Bill: {}", bill.display());

    let layout = match layout {
        Some(path) => {
            if verbose {
                println!("{}", format!("   📐 Layout: {}", path.display()).cyan());
            }
            TemplateLayout::from_path(path)?
        }
        None => TemplateLayout::default(),
    };

    let profile = match profile {
        Some(path) => {
            if verbose {
                println!("{}", format!("   🏢 Profile: {}", path.display()).cyan());
            }
            let profile = load_profile(&path)?;
            // The template's benchmark lookups only know the listed types;
            // anything else is written as-is but will not benchmark.
            if !profile.building_type.is_empty()
                && !BUILDING_TYPES.contains(&profile.building_type.as_str())
            {
                println!(
                    "{}",
                    format!(
                        "   ⚠️  Building type '{}' is not in the template's benchmark list",
                        profile.building_type
                    )
                    .yellow()
                );
            }
            Some(profile)
        }
        None => None,
    };

    let grid = BillImporter::new(&bill).import()?;
    let extraction = extract_bill(&grid)?;

    if verbose {
        println!(
            "{}",
            format!(
                "   📌 Header at spreadsheet row {}",
                extraction.header_row + 1
            )
            .cyan()
        );
    }

    let output = output.unwrap_or_else(default_report_path);
    let template = ReportTemplate::new(layout);
    template.write(&extraction, profile.as_ref(), &output)?;

    println!();
    println!(
        "{}",
        format!("✅ Report written to {}", output.display())
            .bold()
            .green()
    );
    Ok(())
}

/// Profiles are YAML documents; JSON parses as a YAML subset.
fn load_profile(path: &Path) -> BillResult<FacilityProfile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn default_report_path() -> PathBuf {
    PathBuf::from(format!(
        "energy-report-{}.xlsx",
        chrono::Local::now().format("%Y%m%d")
    ))
}
