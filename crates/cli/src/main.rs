// gridex CLI - unit conversion, export and search over delimited files

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_NOT_FOUND, EXIT_SUCCESS, EXIT_USAGE};
use gridex_config::Settings;
use gridex_core::{CellRange, GridAccessor, GridError, Selection};
use gridex_engine::clipboard::CopySource;
use gridex_engine::column_units::format_number;
use gridex_engine::find::{FindDirection, FindOptions};
use gridex_engine::units::UnitRegistry;
use gridex_engine::{Matrix, Sheet};
use gridex_io::csv::ImportOptions;
use gridex_io::{ExportOptions, Format, IoError};

#[derive(Parser)]
#[command(name = "gridex")]
#[command(about = "Grid data tools: unit conversion, export and search")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Settings file to use instead of the per-user one
    #[arg(long, global = true, env = "GRIDEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a value between two units of the same quantity
    #[command(after_help = "\
Examples:
  gridex convert 100 degC degF
  gridex convert 3 mile km --decimals 2
  gridex convert 1 'square metre' ha")]
    Convert {
        /// Value to convert
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Source unit (symbol or name)
        from: String,

        /// Target unit (symbol or name)
        to: String,

        /// Fixed number of decimals in the output
        #[arg(long)]
        decimals: Option<usize>,
    },

    /// List quantities, or the units of one quantity
    Units {
        /// Quantity name (e.g. Length)
        quantity: Option<String>,
    },

    /// Export a delimited file as text, HTML or LaTeX
    #[command(after_help = "\
Output format follows the extension (.txt/.csv/.tsv, .html, .tex);
use '-' to write text to stdout.

Examples:
  gridex export data.csv table.html
  gridex export data.csv - --range 1:1-3:2 --separator ';'
  gridex export data.csv part.tex --marked C110")]
    Export {
        /// Input file (CSV/TSV, delimiter sniffed)
        input: PathBuf,

        /// Output file, or '-' for stdout
        output: PathBuf,

        /// Cell range "r1:c1-r2:c2" or ALL
        #[arg(long, conflicts_with = "marked")]
        range: Option<String>,

        /// Selection string: C or L prefix + bits, or a bare cell mask
        #[arg(long)]
        marked: Option<String>,

        /// Field separator for text output
        #[arg(long)]
        separator: Option<char>,

        /// Force the output format instead of using the extension
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Write unmarked cells as blanks instead of failing on ragged selections
        #[arg(long)]
        keep_structure: bool,

        /// First input row holds column titles
        #[arg(long)]
        titles: bool,
    },

    /// Search a delimited file for a value
    #[command(after_help = "\
Prints row:column and the value of each hit. Exits with 4 when nothing matches.

Examples:
  gridex find data.csv total
  gridex find data.csv 42 --whole-cell --all
  gridex find data.csv x --direction topleft")]
    Find {
        /// Input file (CSV/TSV, delimiter sniffed)
        input: PathBuf,

        /// Text to search for
        text: String,

        /// Walk order
        #[arg(long, value_enum)]
        direction: Option<Direction>,

        /// Case-sensitive comparison
        #[arg(long)]
        match_case: bool,

        /// Match the whole cell instead of a substring
        #[arg(long)]
        whole_cell: bool,

        /// Restrict the search to one column
        #[arg(long)]
        column: Option<u32>,

        /// Report every hit, not only the first
        #[arg(long)]
        all: bool,

        /// First input row holds column titles
        #[arg(long)]
        titles: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Text,
    Html,
    Latex,
}

impl From<ExportFormat> for Format {
    fn from(f: ExportFormat) -> Self {
        match f {
            ExportFormat::Text => Format::Text,
            ExportFormat::Html => Format::Html,
            ExportFormat::Latex => Format::Latex,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Lefttop,
    Topleft,
    Bottomright,
    Rightbottom,
}

impl From<Direction> for FindDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Lefttop => FindDirection::LeftTop,
            Direction::Topleft => FindDirection::TopLeft,
            Direction::Bottomright => FindDirection::BottomRight,
            Direction::Rightbottom => FindDirection::RightBottom,
        }
    }
}

/// `--quiet` silences everything; each `-v` raises the level from warnings.
fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Log to stderr. Records from the libraries' `log` macros are forwarded.
fn init_tracing(level: LevelFilter) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false).with_level(true))
        .with(level)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(log_level(cli.verbose, cli.quiet));

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let result = match cli.command {
        None => {
            eprintln!("Usage: gridex <command> [options]");
            eprintln!("       gridex --help for more information");
            Ok(())
        }
        Some(Commands::Convert { value, from, to, decimals }) => {
            cmd_convert(&settings, &value, &from, &to, decimals)
        }
        Some(Commands::Units { quantity }) => cmd_units(&settings, quantity.as_deref()),
        Some(Commands::Export { input, output, range, marked, separator, format, keep_structure, titles }) => {
            let args = ExportArgs { range, marked, separator, format, keep_structure, titles };
            cmd_export(&settings, &input, &output, args)
        }
        Some(Commands::Find { input, text, direction, match_case, whole_cell, column, all, titles }) => {
            let mut options = settings.matrix_config().find;
            if let Some(d) = direction {
                options.direction = d.into();
            }
            options.match_case |= match_case;
            options.match_whole_cell |= whole_cell;
            options.column = column;
            cmd_find(&settings, &input, &text, &options, all, titles)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Nothing to report on stderr; only the status matters.
    fn not_found() -> Self {
        Self { code: EXIT_NOT_FOUND, message: String::new(), hint: None }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Grid(e) => e.into(),
            IoError::UnknownFormat(_) => {
                CliError::args(err.to_string()).with_hint("use .txt, .csv, .tsv, .html or .tex, or pass --format")
            }
            other => CliError::io(other.to_string()),
        }
    }
}

impl From<GridError> for CliError {
    fn from(err: GridError) -> Self {
        let code = match err {
            GridError::FileOpen(_) | GridError::FileSave(_) => EXIT_IO,
            GridError::NoSelection
            | GridError::InvalidSelection
            | GridError::InvalidInterval(_)
            | GridError::Decode(_) => EXIT_USAGE,
            _ => EXIT_ERROR,
        };
        let hint = match err {
            GridError::InvalidSelection => Some("pass --keep-structure to export ragged selections".to_string()),
            GridError::InvalidInterval(_) => Some("ranges look like 1:1-3:4, or ALL".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn registry(settings: &Settings) -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    registry.set_options(settings.matrix_config().units);
    registry
}

fn cmd_convert(
    settings: &Settings,
    value: &str,
    from: &str,
    to: &str,
    decimals: Option<usize>,
) -> Result<(), CliError> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| CliError::args(format!("not a number: {}", value)))?;

    let registry = registry(settings);
    let (quantity, from_id, to_id) = registry.find_pair(from, to).ok_or_else(|| {
        CliError::args(format!("no quantity has both '{}' and '{}'", from, to))
            .with_hint("run 'gridex units' to list quantities and their units")
    })?;
    debug!("convert: resolved {} -> {} in quantity {}", from, to, quantity.0);

    let result = registry
        .convert(quantity, number, from_id, to_id)
        .map_err(|e| CliError::args(e.to_string()))?;
    let symbol = registry.unit_symbol(quantity, to_id).unwrap_or(to);
    println!("{} {}", format_number(result, decimals), symbol);
    Ok(())
}

fn cmd_units(settings: &Settings, quantity: Option<&str>) -> Result<(), CliError> {
    let registry = registry(settings);

    let Some(name) = quantity else {
        for (_, q) in registry.quantities() {
            println!("{}\t{}", q.name, q.units.len());
        }
        return Ok(());
    };

    let id = registry.find_quantity(name).ok_or_else(|| {
        CliError::args(format!("unknown quantity: {}", name)).with_hint("run 'gridex units' to list quantities")
    })?;
    let Some(q) = registry.quantity(id) else {
        return Err(CliError::args(format!("unknown quantity: {}", name)));
    };
    for index in 0..q.units.len() {
        let unit = gridex_engine::units::UnitId(index);
        let unit_name = registry.unit_name(id, unit).unwrap_or_default();
        let symbol = registry.unit_symbol(id, unit).unwrap_or_default();
        println!("{}\t{}", symbol, unit_name);
    }
    Ok(())
}

struct ExportArgs {
    range: Option<String>,
    marked: Option<String>,
    separator: Option<char>,
    format: Option<ExportFormat>,
    keep_structure: bool,
    titles: bool,
}

fn load_sheet(path: &Path, titles: bool) -> Result<Sheet, CliError> {
    let options = ImportOptions { delimiter: None, titles };
    let sheet = gridex_io::csv::import_with_options(path, &options)?;
    info!("loaded {} ({} rows x {} cols)", path.display(), sheet.rows(), sheet.cols());
    Ok(sheet)
}

fn cmd_export(settings: &Settings, input: &Path, output: &Path, args: ExportArgs) -> Result<(), CliError> {
    let sheet = load_sheet(input, args.titles)?;
    let (rows, cols) = (sheet.row_count(), sheet.col_count());

    let source = if let Some(marked) = &args.marked {
        Some(CopySource::Marked(Selection::decode(marked, rows, cols).map_err(GridError::from)?))
    } else if let Some(range) = &args.range {
        Some(CopySource::Range(CellRange::parse(range, rows, cols)?))
    } else {
        None
    };

    let options = ExportOptions {
        format: args.format.map(Format::from),
        separator: args.separator.unwrap_or_else(|| settings.separator_char()),
        source,
        keep_structure: args.keep_structure || settings.keep_structure,
    };

    if output == Path::new("-") {
        let source = options.source.clone().unwrap_or(CopySource::Range(CellRange::all(rows, cols)));
        let format = options.format.unwrap_or(Format::Text);
        let text = gridex_io::export::render(&sheet, &source, format, options.separator, options.keep_structure)?;
        print!("{}", text);
        return Ok(());
    }

    gridex_io::export_file(&sheet, output, &options)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn cmd_find(
    settings: &Settings,
    input: &Path,
    text: &str,
    options: &FindOptions,
    all: bool,
    titles: bool,
) -> Result<(), CliError> {
    if text.is_empty() {
        return Err(CliError::args("search text is empty"));
    }
    let sheet = load_sheet(input, titles)?;
    let mut matrix = Matrix::new(sheet);
    matrix.apply_settings(&settings.matrix_config());
    // start on the title corner so the first data cell in walk order wins
    matrix.set_focus(0, 0);

    let Some(first) = matrix.find(text, options) else {
        return Err(CliError::not_found());
    };
    print_hit(&matrix, first);
    if !all {
        return Ok(());
    }

    while let Some(hit) = matrix.find(text, options) {
        if hit == first {
            break;
        }
        print_hit(&matrix, hit);
    }
    Ok(())
}

fn print_hit(matrix: &Matrix<Sheet>, (row, col): (u32, u32)) {
    let value = matrix.display_cell(row, col).unwrap_or_default();
    println!("{}:{}\t{}", row, col, value);
}
