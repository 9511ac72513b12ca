// Entry point and high-level CLI flow.
//
// Every run (or every menu selection in interactive mode) is one reporting
// pass: load the sheets the screen needs, compute, print, export. The
// selected screen is passed down explicitly; nothing is kept between passes.
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use haci_bi::config::{FileConfig, Settings, CONFIG_FILE};
use haci_bi::loader::LoadReport;
use haci_bi::source::CsvDirectory;
use haci_bi::{output, run_pass, util, Screen};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScreenArg {
    Executive,
    Financial,
    Sales,
    Marketing,
    Seo,
    Training,
    Renewals,
    All,
}

impl ScreenArg {
    fn screens(self) -> Vec<Screen> {
        match self {
            ScreenArg::Executive => vec![Screen::Executive],
            ScreenArg::Financial => vec![Screen::Financial],
            ScreenArg::Sales => vec![Screen::Sales],
            ScreenArg::Marketing => vec![Screen::Marketing],
            ScreenArg::Seo => vec![Screen::Seo],
            ScreenArg::Training => vec![Screen::Training],
            ScreenArg::Renewals => vec![Screen::Renewals],
            ScreenArg::All => Screen::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "haci-bi")]
#[command(about = "HACI business-intelligence KPI reports from a workbook export")]
struct Args {
    /// Config file (default: haci.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with one <Sheet>.csv per workbook sheet
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Output directory for report.json and CSV series
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Screen to build
    #[arg(short, long, value_enum, default_value_t = ScreenArg::All)]
    screen: ScreenArg,

    /// Reference date for the renewal monitor (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Renewal horizon in days
    #[arg(long)]
    horizon_days: Option<i64>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Skip writing files to the output directory
    #[arg(long)]
    no_export: bool,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 12)]
    rows: usize,

    /// Pick screens from a menu until you choose to exit
    #[arg(short, long)]
    interactive: bool,
}

/// Everything resolved from config file + flags.
struct Run {
    data_dir: PathBuf,
    output_dir: PathBuf,
    settings: Settings,
    json: bool,
    export: bool,
    rows: usize,
}

fn resolve(args: &Args) -> Result<Run> {
    let (config_path, explicit) = match &args.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };
    let file = FileConfig::load_or_default(&config_path, explicit)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let mut settings = Settings::from_file(&file, today);
    if let Some(days) = args.horizon_days {
        if days < 0 {
            anyhow::bail!("--horizon-days must not be negative (got {})", days);
        }
        settings.horizon_days = days;
    }

    Ok(Run {
        data_dir: args.data_dir.clone().unwrap_or(file.data_dir),
        output_dir: args.output_dir.clone().unwrap_or(file.output_dir),
        settings,
        json: args.json,
        export: !args.no_export,
        rows: args.rows,
    })
}

fn print_load_summary(load_report: &LoadReport) {
    println!(
        "Processing workbook... ({} rows across {} sheets)",
        util::format_int(load_report.total_rows()),
        load_report.rows_per_sheet.len()
    );
    if !load_report.defaulted_columns.is_empty() {
        println!(
            "Note: optional columns not found, counted as 0: {}",
            load_report.defaulted_columns.join(", ")
        );
    }
    if load_report.blank_cells > 0 {
        println!(
            "Note: {} blank numeric cells counted as 0.",
            util::format_int(load_report.blank_cells)
        );
    }
    println!();
}

/// One reporting pass for `screens`.
fn run_screens(run: &Run, screens: &[Screen]) -> Result<()> {
    let source = CsvDirectory::new(&run.data_dir);
    info!("reading workbook from {}", source.root().display());
    let (report, load_report) = run_pass(&source, screens, &run.settings)
        .with_context(|| format!("Failed to load workbook from {}", run.data_dir.display()))?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_load_summary(&load_report);
        output::print_report(&report, &run.settings.currency, run.rows);
    }

    if run.export {
        let written = output::export_report(&report, &run.output_dir)?;
        if !run.json {
            println!(
                "({} files exported to {})\n",
                written.len(),
                run.output_dir.display()
            );
        }
    }
    Ok(())
}

/// One trimmed line from `input`, or `None` once input is closed or unreadable.
fn read_line_from(input: &mut impl BufRead) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice(input: &mut impl BufRead) -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    read_line_from(input)
}

/// Ask whether to go back to the screen menu after a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` or input
/// ended.
fn prompt_back_to_menu(input: &mut impl BufRead) -> bool {
    loop {
        print!("Back to Screen Selection (Y/N): ");
        let _ = io::stdout().flush();
        let Some(answer) = read_line_from(input) else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn interactive(run: &Run) {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        println!("Select Dashboard:");
        for (i, screen) in Screen::ALL.iter().enumerate() {
            println!("[{}] {}", i + 1, screen.title());
        }
        println!("[{}] All screens\n", Screen::ALL.len() + 1);

        let Some(choice) = read_choice(&mut input) else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        let screens = match choice.parse::<usize>() {
            Ok(n) if (1..=Screen::ALL.len()).contains(&n) => vec![Screen::ALL[n - 1]],
            Ok(n) if n == Screen::ALL.len() + 1 => Screen::ALL.to_vec(),
            _ => {
                println!("Invalid choice. Please enter 1-{}.\n", Screen::ALL.len() + 1);
                continue;
            }
        };

        println!();
        if let Err(e) = run_screens(run, &screens) {
            // A failed pass aborts that report only; the menu stays usable.
            warn!("report failed: {:#}", e);
            eprintln!("Error: {:#}\n", e);
        }
        if !prompt_back_to_menu(&mut input) {
            println!("Exiting the program.");
            break;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let run = resolve(&args)?;

    if args.interactive {
        interactive(&run);
        return Ok(());
    }
    run_screens(&run, &args.screen.screens())
}
