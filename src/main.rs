use std::io::{self, Write};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, ValueEnum};
use lening::error::AppError;
use lening::input::{parse_start_date, RawInputs};
use lening::overview::{render_schedule, render_summary};
use lening::session::Session;
use lening::{ui_cli, RateMode};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

/// Fixed-rate loan calculator: monthly payment, interest and amortization table
#[derive(Parser, Debug)]
#[command(name = "lening", version, about)]
struct Cli {
    /// Amount to borrow
    #[arg(short, long, default_value = "")]
    principal: String,

    /// Annual interest rate in percent
    #[arg(short, long, default_value = "")]
    rate: String,

    /// How the annual rate converts to a monthly rate
    #[arg(short, long, value_enum, default_value_t = ModeArg::Nominal)]
    mode: ModeArg,

    /// Number of monthly payments
    #[arg(short = 'n', long, default_value = "")]
    periods: String,

    /// Start date (YYYY-MM-DD); the first payment falls one month later. Defaults to today
    #[arg(short = 'd', long)]
    start_date: Option<String>,

    /// Print the amortization table
    #[arg(short, long)]
    schedule: bool,

    /// Print the loan overview together with the table
    #[arg(long)]
    print: bool,

    /// Read commands from the terminal and recompute after each one
    #[arg(short, long)]
    interactive: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Nominal,
    Effective,
}

impl From<ModeArg> for RateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Nominal => RateMode::Nominal,
            ModeArg::Effective => RateMode::Effective,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<ExitCode, AppError> {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).env().init()?;

    let start_date: NaiveDate = match &cli.start_date {
        Some(text) => parse_start_date(text)?,
        None => Local::now().date_naive(),
    };
    let raw = RawInputs::new(&cli.principal, &cli.rate, &cli.periods);
    let mut session = Session::new(raw, cli.mode.into(), start_date);

    if cli.interactive {
        info!("interactive session, start date {}", start_date);
        let stdin = io::stdin();
        ui_cli::run(&mut session, stdin.lock(), &mut io::stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut out = io::stdout().lock();
    if !session.can_show_schedule() {
        writeln!(out, "no result: principal, rate and periods must be valid numbers")?;
        return Ok(ExitCode::FAILURE);
    }

    write!(out, "{}", render_summary(session.summary()))?;
    if cli.schedule || cli.print {
        session.generate_schedule()?;
    }
    if cli.print {
        writeln!(out)?;
        for line in session.print_overview() {
            writeln!(out, "  - {}", line)?;
        }
    }
    if let Some(plan) = session.schedule() {
        info!("{} payments from {}", plan.get_pmt_count(), start_date);
        plan.show_amortization();
        writeln!(out)?;
        write!(out, "{}", render_schedule(plan.rows()))?;
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_one_shot_arguments() {
        let cli = Cli::try_parse_from([
            "lening", "-p", "10000", "-r", "6", "-n", "12", "--mode", "effective", "-s", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.principal, "10000");
        assert_eq!(cli.periods, "12");
        assert_eq!(RateMode::from(cli.mode), RateMode::Effective);
        assert!(cli.schedule);
        assert!(!cli.print);
        assert_eq!(cli.verbose, 2);
    }
}
