//! oldbook CLI - inspect and tidy BIFF8 (.xls) workbooks

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use oldbook_xls::biff::records::RecordKind;
use oldbook_xls::biff::strings::DEFAULT_ENCODING;
use oldbook_xls::biff::unframe;
use oldbook_xls::styles::XfKind;
use oldbook_xls::{
    BiffWorkbook, GlobalsItem, LineEdit, ReadOptions, WriteOptions, XlsReader, XlsWriter,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "oldbook")]
#[command(author, version, about = "Inspect and tidy legacy Excel (.xls) workbooks")]
struct Cli {
    /// Code page for compressed strings when the workbook names none
    #[arg(long, global = true, default_value = DEFAULT_ENCODING)]
    encoding: String,

    /// Log decoding warnings to stderr (-vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a workbook
    Info {
        /// Input .xls file
        input: PathBuf,
    },

    /// List the records of the Workbook stream
    Records {
        /// Input .xls file
        input: PathBuf,

        /// Only show records of this type (hex code or name, e.g. 0x00E0 or XF)
        #[arg(short = 't', long = "type")]
        record_type: Option<String>,
    },

    /// List the cell formats (XF records) with their resolved styles
    Styles {
        /// Input .xls file
        input: PathBuf,
    },

    /// Merge duplicate fonts, number formats and cell formats
    Rationalize {
        /// Input .xls file
        input: PathBuf,

        /// Output .xls file
        output: Option<PathBuf>,

        /// Report what would be merged without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Shift conditional format and data validation ranges for an inserted or
    /// removed row or column
    Shift {
        /// Input .xls file
        input: PathBuf,

        /// Output .xls file
        output: PathBuf,

        /// Sheet index (0-based)
        #[arg(short, long, default_value = "0")]
        sheet: usize,

        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EditArgs {
    /// Insert a column before this index
    #[arg(long)]
    insert_column: Option<u16>,
    /// Remove the column at this index
    #[arg(long)]
    remove_column: Option<u16>,
    /// Insert a row before this index
    #[arg(long)]
    insert_row: Option<u32>,
    /// Remove the row at this index
    #[arg(long)]
    remove_row: Option<u32>,
}

impl EditArgs {
    fn line_edit(&self) -> Option<LineEdit> {
        self.insert_column
            .map(LineEdit::InsertColumn)
            .or(self.remove_column.map(LineEdit::RemoveColumn))
            .or(self.insert_row.map(LineEdit::InsertRow))
            .or(self.remove_row.map(LineEdit::RemoveRow))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = ReadOptions::with_encoding(cli.encoding);

    match cli.command {
        Commands::Info { input } => show_info(&input, &options),
        Commands::Records { input, record_type } => {
            list_records(&input, record_type.as_deref())
        }
        Commands::Styles { input } => list_styles(&input, &options),
        Commands::Rationalize {
            input,
            output,
            dry_run,
        } => rationalize(&input, output.as_deref(), dry_run, &options),
        Commands::Shift {
            input,
            output,
            sheet,
            edit,
        } => shift(&input, &output, sheet, &edit, &options),
    }
}

fn open(input: &Path, options: &ReadOptions) -> Result<BiffWorkbook> {
    XlsReader::read_file(input, options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn show_info(input: &Path, options: &ReadOptions) -> Result<()> {
    let workbook = open(input, options)?;
    let table = workbook.table();

    println!("File: {}", input.display());
    println!("Encoding: {}", workbook.encoding());
    println!(
        "Date system: {}",
        if workbook.date1904() { "1904" } else { "1900" }
    );
    println!("Fonts: {}", table.fonts().len());
    println!(
        "Number formats: {} ({} custom)",
        table.formats().len(),
        table.custom_format_count()
    );
    println!("Cell formats: {}", table.xfs().len());
    println!("Shared strings: {}", workbook.shared_strings().len());
    println!("Sheets: {}", workbook.sheet_info().len());

    for (i, info) in workbook.sheet_info().iter().enumerate() {
        let kind = match info.sheet_type {
            0 => "worksheet",
            2 => "chart",
            6 => "VB module",
            _ => "other",
        };
        println!();
        println!("  Sheet {}: \"{}\" ({kind})", i, info.name);
        if info.visibility != 0 {
            println!("    Hidden");
        }
        if let Some(sheet) = workbook.sheets().get(i) {
            println!("    Records: {}", sheet.records.len());
            println!("    Formatted cells: {}", sheet.cell_xfs().len());
        }
    }

    Ok(())
}

/// Parse a record type filter: a hex code or a record name.
fn parse_record_type(filter: &str) -> Result<u16> {
    if let Some(hex) = filter
        .strip_prefix("0x")
        .or_else(|| filter.strip_prefix("0X"))
    {
        return u16::from_str_radix(hex, 16)
            .with_context(|| format!("Invalid record type '{filter}'"));
    }
    (0..=u16::MAX)
        .map(RecordKind::from_code)
        .find(|kind| kind.name().eq_ignore_ascii_case(filter) && kind.name() != "UNKNOWN")
        .map(RecordKind::code)
        .with_context(|| format!("Unknown record type '{filter}'"))
}

fn list_records(input: &Path, filter: Option<&str>) -> Result<()> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let stream = XlsReader::workbook_stream(file)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let filter = filter.map(parse_record_type).transpose()?;

    for record in unframe(&stream)? {
        if filter.is_some_and(|code| code != record.record_type) {
            continue;
        }
        let offset = record.stream_offset.unwrap_or_default();
        let kind = record.kind();
        print!(
            "{offset:08X}\t{:04X}\t{:<12}\t{}",
            record.record_type,
            kind.name(),
            record.data.len()
        );
        if record.fragments().len() > 1 {
            print!("\t{:?}", record.fragments());
        }
        println!();
    }

    Ok(())
}

fn list_styles(input: &Path, options: &ReadOptions) -> Result<()> {
    let workbook = open(input, options)?;

    for (index, (xf, style)) in workbook
        .table()
        .xfs()
        .iter()
        .zip(workbook.styles())
        .enumerate()
    {
        let kind = match xf.kind {
            XfKind::Style => "style",
            XfKind::Cell => "cell",
        };
        let font = &style.font;
        let mut flags = Vec::new();
        if font.bold {
            flags.push("bold");
        }
        if font.italic {
            flags.push("italic");
        }
        println!(
            "{index}\t{kind}\t{} {}pt{}{}\t{}",
            font.name,
            font.size,
            if flags.is_empty() { "" } else { " " },
            flags.join(" "),
            style.number_format.format_string()
        );
    }

    for item in workbook.globals() {
        if let GlobalsItem::Record(record) = item {
            if record.kind() == RecordKind::Style {
                if let Ok(style) =
                    oldbook_xls::styles::StyleRecord::parse(&record.data, workbook.encoding())
                {
                    println!("style\t{}\t-> XF {}", style.display_name(), style.xf_index);
                }
            }
        }
    }

    Ok(())
}

fn rationalize(
    input: &Path,
    output: Option<&Path>,
    dry_run: bool,
    options: &ReadOptions,
) -> Result<()> {
    let mut workbook = open(input, options)?;
    let result = workbook.rationalize();
    eprintln!("{}", result.report);

    if dry_run {
        return Ok(());
    }
    let Some(output) = output else {
        bail!("An output file is required unless --dry-run is given");
    };
    // Already rationalized in place
    XlsWriter::write_file(&workbook, output, &WriteOptions { rationalize: false })
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    eprintln!("Wrote '{}'", output.display());
    Ok(())
}

fn shift(
    input: &Path,
    output: &Path,
    sheet: usize,
    edit: &EditArgs,
    options: &ReadOptions,
) -> Result<()> {
    let Some(edit) = edit.line_edit() else {
        bail!("No row or column edit given");
    };
    let mut workbook = open(input, options)?;
    let sheet_count = workbook.sheets().len();
    let records = workbook
        .sheets_mut()
        .get_mut(sheet)
        .with_context(|| format!("Sheet index {sheet} not found ({sheet_count} sheets)"))?;

    let changed = records.apply_line_edit(edit);
    eprintln!("{edit:?}: {changed} conditional format and validation records changed");

    XlsWriter::write_file(&workbook, output, &WriteOptions { rationalize: false })
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    Ok(())
}

/// Log level for `-v` repetitions
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

/// Log to stderr at the `-v` level; `OLDBOOK_LOG` filters override it.
fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .parse_env("OLDBOOK_LOG")
        .format_timestamp(None)
        .init();
}
