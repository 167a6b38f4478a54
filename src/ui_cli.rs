use std::io::{BufRead, Write};

use log::warn;

use crate::error::{AppError, LoanResult};
use crate::input::parse_start_date;
use crate::loan::RateMode;
use crate::overview::{render_schedule, render_summary};
use crate::session::{Field, Session};

const HELP: &str = "\
Commands:
  principal <amount>     amount to borrow
  rate <percent>         annual rate (JKP)
  periods <months>       number of monthly payments
  mode nominal|effective how the annual rate converts to a monthly rate
  date <YYYY-MM-DD>      start date of the schedule
  schedule               show the amortization table
  row <n>                details of payment n
  print                  show the printable overview
  help                   this text
  quit";

/// One parsed line of user input.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Set(Field, String),
    Mode(String),
    Date(String),
    Schedule,
    Row(String),
    Print,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim().to_string();
    match word.to_ascii_lowercase().as_str() {
        "principal" | "bedrag" => Command::Set(Field::Principal, rest),
        "rate" | "jkp" => Command::Set(Field::AnnualRate, rest),
        "periods" | "periode" => Command::Set(Field::Periods, rest),
        "mode" | "type" => Command::Mode(rest),
        "date" | "datum" => Command::Date(rest),
        "schedule" | "tabel" => Command::Schedule,
        "row" | "rij" => Command::Row(rest),
        "print" | "afdrukken" => Command::Print,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Reads commands until `quit` or end of input, redrawing after each one.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
) -> Result<(), AppError> {
    writeln!(out, "{}", HELP)?;
    draw(session, out)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome: LoanResult<()> = match parse_command(&line) {
            Command::Set(field, text) => session.set_field(field, &text),
            Command::Mode(text) => text
                .parse::<RateMode>()
                .and_then(|mode| session.set_rate_mode(mode)),
            Command::Date(text) => {
                parse_start_date(&text).and_then(|date| session.set_start_date(date))
            }
            Command::Schedule => {
                if session.can_show_schedule() {
                    session.generate_schedule()
                } else {
                    writeln!(out, "Enter a valid loan first.")?;
                    Ok(())
                }
            }
            Command::Row(text) => {
                match (session.schedule(), text.parse::<usize>()) {
                    (Some(plan), Ok(pmt_number)) => {
                        writeln!(out, "{}", plan.get_pmt_info(pmt_number))?
                    }
                    (None, _) => writeln!(out, "Show the schedule first.")?,
                    (_, Err(_)) => writeln!(out, "Give a payment number, e.g. `row 12`.")?,
                }
                continue;
            }
            Command::Print => {
                if session.can_print() {
                    for line in session.print_overview() {
                        writeln!(out, "  - {}", line)?;
                    }
                    if let Some(plan) = session.schedule() {
                        write!(out, "{}", render_schedule(plan.rows()))?;
                    }
                } else {
                    writeln!(out, "Show the schedule before printing.")?;
                }
                continue;
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            Command::Quit => break,
            Command::Unknown(text) => {
                warn!("unknown command {:?}", text);
                writeln!(out, "Unknown command, type `help`.")?;
                continue;
            }
        };
        if let Err(err) = outcome {
            warn!("{:?} failed: {}", line.trim(), err);
            writeln!(out, "{}", err)?;
        }
        draw(session, out)?;
    }
    Ok(())
}

fn draw<W: Write>(session: &Session, out: &mut W) -> Result<(), AppError> {
    writeln!(out)?;
    if session.summary().is_empty() {
        writeln!(out, "(no result: enter principal, rate and periods)")?;
    } else {
        write!(out, "{}", render_summary(session.summary()))?;
    }
    if let Some(plan) = session.schedule() {
        write!(out, "{}", render_schedule(plan.rows()))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RawInputs;
    use chrono::NaiveDate;
    use test_log::test;

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("principal 10000"),
            Command::Set(Field::Principal, "10000".to_string())
        );
        assert_eq!(
            parse_command("  JKP   3,5 "),
            Command::Set(Field::AnnualRate, "3,5".to_string())
        );
        assert_eq!(parse_command("periods"), Command::Set(Field::Periods, String::new()));
        assert_eq!(parse_command("mode effective"), Command::Mode("effective".to_string()));
        assert_eq!(parse_command("schedule"), Command::Schedule);
        assert_eq!(parse_command("row 3"), Command::Row("3".to_string()));
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("dance"), Command::Unknown("dance".to_string()));
    }

    #[test]
    fn test_run_session() {
        let mut session = Session::new(
            RawInputs::default(),
            RateMode::Nominal,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let script = "print\nprincipal 3000\nrate 0\nperiods 3\nschedule\nprint\nquit\nprincipal 1\n";
        let mut out = Vec::new();
        run(&mut session, script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Show the schedule before printing."));
        assert!(text.contains("Maandelijkse aflossing: € 1.000,00"));
        assert!(text.contains("  - Periode: 3 maanden"));
        assert!(text.contains("01/04/2024"));
        // input after quit is ignored
        assert_eq!(session.params().unwrap().principal(), 3000.);
    }

    #[test]
    fn test_errors_keep_session_running() {
        let mut session = Session::new(
            RawInputs::default(),
            RateMode::Nominal,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let script = "principal 1200\nrate 0\nperiods 12\nschedule\ndate +262142-06-01\nmode weekly\ndate tomorrow\nprincipal 2400\nrow 1\nrow 13\nrow x\n";
        let mut out = Vec::new();
        run(&mut session, script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("no due date exists one month after +262142-12-01"));
        assert!(text.contains("unknown rate mode: weekly"));
        assert!(text.contains("invalid date: tomorrow"));
        assert_eq!(session.params().unwrap().principal(), 2400.);
        assert_eq!(session.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(text.contains("pmt number 1, date 2024-02-01, opening balance $2400.0000"));
        assert!(text.contains("No payment information."));
        assert!(text.contains("Give a payment number"));
    }
}
