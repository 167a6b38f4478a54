//! Text presentation of the calculator output: summary fields, the
//! amortization table and the print overview.

use std::fmt::Write;

use crate::loan::{round, LedgerRow, LoanParameters, LoanSummary};

const COLUMNS: [&str; 10] = [
    "Nr",
    "Datum",
    "Begin saldo",
    "Betaling",
    "Kapitaal",
    "Interest",
    "Eind saldo",
    "Cum. interest",
    "Cum. kapitaal",
    "Cum. betaald",
];

pub fn format_number(n: f64, digits: usize) -> String {
    if n.is_finite() {
        format!("{:.*}", digits, n)
    } else {
        format!("{:.*}", digits, 0.)
    }
}

/// Euro amount with `.` grouping and `,` decimals, e.g. `€ 1.234,56`.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { round(amount, 2) } else { 0. };
    let text = format!("{:.2}", amount.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0. { "-" } else { "" };
    format!("€ {}{},{}", sign, grouped, cents)
}

/// The four read-only summary fields. Empty strings are the reset state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryFields {
    pub payment: String,
    pub rate: String,
    pub period: String,
    pub interest: String,
}

impl SummaryFields {
    pub fn is_empty(&self) -> bool {
        self.payment.is_empty()
            && self.rate.is_empty()
            && self.period.is_empty()
            && self.interest.is_empty()
    }
}

impl From<&LoanSummary> for SummaryFields {
    fn from(summary: &LoanSummary) -> Self {
        Self {
            payment: format_currency(round(summary.monthly_payment, 2)),
            rate: format!("{} %", format_number(summary.periodic_rate_percent, 4)),
            period: format!("{} jaar", format_number(summary.period_years, 2)),
            interest: format_currency(summary.total_interest),
        }
    }
}

pub fn render_summary(fields: &SummaryFields) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Maandelijkse aflossing: {}", fields.payment);
    let _ = writeln!(out, "Maandelijkse rente:     {}", fields.rate);
    let _ = writeln!(out, "Periode:                {}", fields.period);
    let _ = writeln!(out, "Totaal interesten:      {}", fields.interest);
    out
}

pub fn row_cells(row: &LedgerRow) -> [String; 10] {
    [
        row.index.to_string(),
        row.due_date.format("%d/%m/%Y").to_string(),
        format_currency(row.opening_balance),
        format_currency(row.payment),
        format_currency(row.principal_portion),
        format_currency(row.interest_portion),
        format_currency(row.closing_balance),
        format_currency(row.cumulative_interest),
        format_currency(row.cumulative_principal),
        format_currency(row.cumulative_paid),
    ]
}

/// Right-aligned amortization table, one line per row after the header.
pub fn render_schedule(rows: &[LedgerRow]) -> String {
    let cells: Vec<[String; 10]> = rows.iter().map(row_cells).collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &COLUMNS.map(String::from), &widths);
    let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    let _ = writeln!(out, "{}", "-".repeat(total));
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 10], widths: &[usize; 10]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", line.join("  "));
}

/// Lines of the printed loan overview. Missing values print as `-`.
pub fn print_overview(params: Option<&LoanParameters>, fields: &SummaryFields) -> Vec<String> {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    let principal = params
        .map(|p| format_currency(p.principal()))
        .unwrap_or_else(|| "-".to_string());
    let rate = params
        .map(|p| p.annual_rate_percent())
        .filter(|r| *r != 0.)
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let periods = params
        .map(|p| p.periods().to_string())
        .unwrap_or_else(|| "-".to_string());

    vec![
        format!("Te lenen bedrag: {}", principal),
        format!("Maandelijkse aflossing: {}", or_dash(&fields.payment)),
        format!("JKP: {} %", rate),
        format!("Periode: {} maanden", periods),
        format!("Totaal interesten: {}", or_dash(&fields.interest)),
    ]
}
