use clap::{Parser, Subcommand};
use std::path::PathBuf;
use utilibill::cli;
use utilibill::error::BillResult;

#[derive(Parser)]
#[command(name = "utilibill")]
#[command(about = "Extract monthly utility bill data into energy report templates")]
#[command(long_about = "utilibill - Utility bill table extraction

Finds the monthly data table inside an unstructured bill export, resolves
which column carries which figure (kWh, kW, electric cost, MCF, gas cost),
and projects twelve months of data onto the fixed cells of the energy
report template.

COMMANDS:
  extract - Pull the monthly record set out of one or more bills
  roles   - Show how a bill's header row resolved (debugging aid)
  apply   - Write a bill's data into a report workbook

EXAMPLES:
  utilibill extract bill.xlsx                   # Print the monthly table
  utilibill extract *.xlsx --json -o bills.json # Batch to JSON
  utilibill roles bill.xlsx                     # Inspect column resolution
  utilibill apply bill.xlsx -o report.xlsx --profile site.yaml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Extract the monthly record set from one or more bills.

Each bill is processed independently: the header row is located by its
'Month' marker, column labels are resolved to semantic roles, and the
twelve rows beneath the header become the electrical and gas tables.
A bill that fails (no header, or a required column missing) is reported
and the rest of the batch still runs; the exit code reflects any failure.

OUTPUT:
  Terminal table (default)
  JSON:  utilibill extract bill.xlsx --json
  YAML:  utilibill extract bill.xlsx --yaml
  File:  add -o records.json")]
    /// Extract monthly records from bill workbooks
    Extract {
        /// Bill workbook(s) (.xlsx or .xlsm)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Emit records as JSON
        #[arg(long)]
        json: bool,

        /// Emit records as YAML
        #[arg(long, conflicts_with = "json")]
        yaml: bool,

        /// Write serialized output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose extraction steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Show how a bill's header row resolved.

Prints the located header row and, for every semantic role, the column
that feeds it together with the normalized label that matched. Use this
to see why a bill fails extraction before editing the source file.")]
    /// Show header location and column role resolution for a bill
    Roles {
        /// Bill workbook (.xlsx or .xlsm)
        file: PathBuf,
    },

    #[command(long_about = "Apply a bill to the energy report template.

Runs the full pipeline: decode the bill, locate and resolve the monthly
table, then write the twelve-month block and (optionally) a facility
profile onto the template's fixed cells. The report sheet's derived
figures are written as live Excel formulas, so the workbook recomputes
when opened.

EXAMPLES:
  utilibill apply bill.xlsx -o report.xlsx
  utilibill apply bill.xlsx --profile site.yaml --layout custom.yaml")]
    /// Write a bill's data into a report workbook
    Apply {
        /// Bill workbook (.xlsx or .xlsm)
        bill: PathBuf,

        /// Output report path (defaults to a date-stamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Facility profile document (YAML)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Template layout override document (YAML)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Show verbose pipeline steps
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> BillResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            files,
            json,
            yaml,
            output,
            verbose,
        } => cli::extract(files, json, yaml, output, verbose),

        Commands::Roles { file } => cli::roles(file),

        Commands::Apply {
            bill,
            output,
            profile,
            layout,
            verbose,
        } => cli::apply(bill, output, profile, layout, verbose),
    }
}
