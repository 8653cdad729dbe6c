// Entry point and CLI flow.
//
// Batch subcommands write templates or a dashboard in one go; `interactive`
// offers the menu-driven flow:
// - [1] picks the planning years to analyze,
// - [2] loads result workbooks for those years,
// - [3] renders the dashboard and exports the normalized tables,
// - [4] writes blank templates for the optimisation model.
mod chart;
mod constants;
mod error;
mod loader;
mod logging;
mod output;
mod render;
mod reports;
mod session;
mod taxonomy;
mod template;
mod types;
mod util;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use session::{IngestOutcome, Session, SessionPhase, Upload};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use types::Year;

#[derive(Parser)]
#[command(name = "fuel_mix_report")]
#[command(about = "Visualize fuel supplier optimization results for 2030/2040/2050 scenarios")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the blank results template for one year
    Template {
        #[arg(short, long)]
        year: Year,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Write blank templates for every year
    Templates {
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Parse result workbooks and write the comparative dashboard
    Dashboard {
        /// Years to analyze, e.g. 2030,2040
        #[arg(short, long, value_delimiter = ',', required = true)]
        years: Vec<Year>,

        #[arg(short, long, default_value = "dashboard")]
        out_dir: PathBuf,

        /// Rows shown per table in the console preview
        #[arg(long, default_value_t = 10)]
        preview_rows: usize,

        /// Result workbooks; each name must contain its year (e.g. results_2030.xlsx)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Menu-driven session
    Interactive {
        #[arg(short, long, default_value = "dashboard")]
        out_dir: PathBuf,
    },
}

fn write_template(year: Year, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let bytes = template::template_bytes(year)?;
    let path = dir.join(template::template_file_name(year));
    std::fs::write(&path, bytes.as_slice()).with_context(|| format!("writing {}", path.display()))?;
    info!(%year, path = %path.display(), "template written");
    Ok(path)
}

fn write_all_templates(dir: &Path) -> Result<()> {
    for year in Year::ALL {
        let path = write_template(year, dir)?;
        println!("Template for {} saved to {}", year, path.display());
    }
    Ok(())
}

/// Read each file's bytes. A file that cannot be read is reported and left
/// out; the rest of the batch still goes through.
fn read_uploads(paths: &[PathBuf]) -> Vec<Upload> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(path) {
            Ok(bytes) => uploads.push(Upload { name, bytes }),
            Err(e) => {
                let err = error::IngestError::UnexpectedFormat { file: name, message: e.to_string() };
                warn!("{}", err);
                println!("Warning: {}", err);
            }
        }
    }
    uploads
}

fn report_outcome(outcome: &IngestOutcome) {
    if !outcome.reprocessed {
        println!("Files unchanged; using previously parsed results.\n");
        return;
    }
    for w in &outcome.warnings {
        println!("Warning: {}", w);
    }
    for (file, d) in &outcome.dropped {
        println!(
            "Warning: '{}' sheet '{}' has non-taxonomy fuel(s) with data that were dropped: {}",
            file,
            d.sheet,
            d.columns.join(", ")
        );
    }
    if !outcome.parsed.is_empty() {
        let years: Vec<String> = outcome.parsed.iter().map(|y| y.to_string()).collect();
        println!("Successfully parsed results for: {}", years.join(", "));
    }
    println!();
}

/// Write dashboard.html, per-year CSVs and kpi_summary.json, and print the
/// panels to the console.
fn generate_dashboard(session: &mut Session, out_dir: &Path, preview_rows: usize) -> Result<()> {
    if session.results().is_empty() {
        println!("Please upload the corresponding Excel file(s) to see the results dashboard.\n");
        return Ok(());
    }
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let html_path = out_dir.join("dashboard.html");
    std::fs::write(&html_path, render::render_dashboard(session.results()))
        .with_context(|| format!("writing {}", html_path.display()))?;

    let mut kpis = Vec::new();
    for (year, result) in session.results() {
        output::export_scenario(out_dir, result)?;
        match reports::build_panel(result) {
            Ok(panel) => {
                output::print_panel(&panel, preview_rows);
                kpis.push(reports::kpi_summary(result)?);
            }
            Err(e) => {
                warn!(%year, "{}", e);
                println!("Error: {}\n", e);
            }
        }
    }
    let json_path = out_dir.join("kpi_summary.json");
    output::write_json(&json_path, &kpis)?;

    session.mark_rendered();
    println!("Dashboard saved to {}", html_path.display());
    println!("Tables exported to {}\n", out_dir.display());
    Ok(())
}

fn run_dashboard(years: Vec<Year>, files: &[PathBuf], out_dir: &Path, preview_rows: usize) -> Result<()> {
    let mut session = Session::new(&taxonomy::MASTER_FUELS);
    session.select_years(years);
    let outcome = session.ingest(&read_uploads(files));
    report_outcome(&outcome);
    if session.results().is_empty() {
        bail!("no result file could be parsed");
    }
    generate_dashboard(&mut session, out_dir, preview_rows)
}

/// Print `prompt` and read one trimmed line. `None` once input is closed.
fn read_line<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the menu after generating the
/// dashboard. Returns `true` for `Y`, `false` for `N` or closed input.
fn prompt_back_to_menu<R: BufRead>(input: &mut R) -> bool {
    loop {
        let Some(answer) = read_line(input, "Back to Menu (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn parse_years(input: &str) -> Result<Vec<Year>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn handle_select_years<R: BufRead>(session: &mut Session, input: &mut R) {
    let Some(line) = read_line(input, "Select years to analyze (2030, 2040, 2050): ") else {
        return;
    };
    match parse_years(&line) {
        Ok(years) => {
            session.select_years(years);
            if session.selected_years().is_empty() {
                println!("Please select one or more years to begin.\n");
            } else {
                let list: Vec<String> = session.selected_years().iter().map(|y| y.to_string()).collect();
                println!("Analyzing: {}\n", list.join(", "));
            }
        }
        Err(e) => println!("Invalid selection: {}\n", e),
    }
}

fn handle_load<R: BufRead>(session: &mut Session, input: &mut R) {
    if session.phase() == SessionPhase::NoYearsSelected {
        println!("Please select one or more years to begin.\n");
        return;
    }
    println!("Upload one Excel file for each selected year. Name files with the year (e.g., 'results_2030.xlsx').");
    let Some(line) = read_line(input, "File paths (comma separated): ") else {
        return;
    };
    let paths: Vec<PathBuf> = line
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        println!("No files given.\n");
        return;
    }
    let outcome = session.ingest(&read_uploads(&paths));
    report_outcome(&outcome);
}

/// Menu loop over `input`. Returns the session so callers can inspect it.
fn run_menu<'t, R: BufRead>(input: &mut R, out_dir: &Path, session: Session<'t>) -> Session<'t> {
    let mut session = session;
    loop {
        println!("Fuel Supplier Optimization Results Visualizer");
        println!("[1] Select years");
        println!("[2] Load result files");
        println!("[3] Generate dashboard");
        println!("[4] Download templates");
        println!("[5] Exit\n");
        let Some(choice) = read_line(input, "Enter choice: ") else {
            println!();
            break;
        };
        match choice.as_str() {
            "1" => handle_select_years(&mut session, input),
            "2" => handle_load(&mut session, input),
            "3" => {
                println!();
                if let Err(e) = generate_dashboard(&mut session, out_dir, 10) {
                    eprintln!("Failed to generate dashboard: {:#}\n", e);
                }
                if !prompt_back_to_menu(input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                if let Err(e) = write_all_templates(out_dir) {
                    eprintln!("Failed to write templates: {:#}\n", e);
                }
                println!();
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
    session
}

fn run_interactive(out_dir: &Path) -> Result<()> {
    let stdin = io::stdin();
    run_menu(&mut stdin.lock(), out_dir, Session::new(&taxonomy::MASTER_FUELS));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Template { year, out_dir } => {
            let path = write_template(year, &out_dir)?;
            println!("Template for {} saved to {}", year, path.display());
        }
        Commands::Templates { out_dir } => write_all_templates(&out_dir)?,
        Commands::Dashboard { years, out_dir, preview_rows, files } => {
            run_dashboard(years, &files, &out_dir, preview_rows)?
        }
        Commands::Interactive { out_dir } => run_interactive(&out_dir)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dashboard_years_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "fuel_mix_report", "dashboard", "--years", "2030,2050", "results_2030.xlsx",
        ])
        .unwrap();
        match cli.command {
            Commands::Dashboard { years, files, .. } => {
                assert_eq!(years, vec![Year::Y2030, Year::Y2050]);
                assert_eq!(files, vec![PathBuf::from("results_2030.xlsx")]);
            }
            _ => panic!("expected dashboard"),
        }
        assert!(Cli::try_parse_from(["fuel_mix_report", "template", "--year", "2035"]).is_err());
    }

    #[test]
    fn parse_years_accepts_commas_and_spaces() {
        assert_eq!(parse_years("2030, 2040").unwrap(), vec![Year::Y2030, Year::Y2040]);
        assert_eq!(parse_years("").unwrap(), Vec::<Year>::new());
        assert!(parse_years("2030,20x0").is_err());
    }

    #[test]
    fn dashboard_run_writes_all_outputs() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("results_2030.xlsx");
        std::fs::write(&input, template::template_bytes(Year::Y2030).unwrap().as_slice()).unwrap();
        let out = dir.path().join("out");
        run_dashboard(vec![Year::Y2030], &[input], &out, 3).unwrap();
        assert!(out.join("dashboard.html").exists());
        assert!(out.join("kpi_summary.json").exists());
        assert!(out.join("2030_production.csv").exists());
    }

    #[test]
    fn dashboard_run_fails_when_nothing_parses() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plan.xlsx");
        std::fs::write(&input, template::template_bytes(Year::Y2030).unwrap().as_slice()).unwrap();
        let out = dir.path().join("out");
        assert!(run_dashboard(vec![Year::Y2030], &[input], &out, 3).is_err());
        assert!(!out.join("dashboard.html").exists());
    }

    #[test]
    fn templates_land_in_out_dir() {
        let dir = tempdir().unwrap();
        write_all_templates(dir.path()).unwrap();
        for year in Year::ALL {
            assert!(dir.path().join(template::template_file_name(year)).exists());
        }
    }

    #[test]
    fn menu_stops_when_input_closes() {
        let dir = tempdir().unwrap();
        let mut input: &[u8] = b"";
        let session = run_menu(&mut input, dir.path(), Session::new(&taxonomy::MASTER_FUELS));
        assert_eq!(session.phase(), SessionPhase::NoYearsSelected);
    }

    #[test]
    fn menu_stops_on_eof_mid_session() {
        let dir = tempdir().unwrap();
        let mut input: &[u8] = b"7\n1\n2040\n";
        let session = run_menu(&mut input, dir.path(), Session::new(&taxonomy::MASTER_FUELS));
        assert_eq!(session.phase(), SessionPhase::AwaitingFiles);
        assert!(session.selected_years().contains(&Year::Y2040));
    }

    #[test]
    fn back_to_menu_defaults_to_exit_on_closed_input() {
        let mut closed: &[u8] = b"";
        assert!(!prompt_back_to_menu(&mut closed));
        let mut answers: &[u8] = b"maybe\ny\n";
        assert!(prompt_back_to_menu(&mut answers));
    }

    #[test]
    fn menu_loads_and_renders_a_dashboard() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("results_2050.xlsx");
        std::fs::write(&file, template::template_bytes(Year::Y2050).unwrap().as_slice()).unwrap();
        let out = dir.path().join("out");
        let script = format!("1\n2050\n2\n{}\n3\nN\n", file.display());
        let mut input = script.as_bytes();
        let session = run_menu(&mut input, &out, Session::new(&taxonomy::MASTER_FUELS));
        assert_eq!(session.phase(), SessionPhase::DashboardRendered);
        assert!(out.join("dashboard.html").exists());
    }
}
