//! Turns raw field text into validated loan parameters.
//!
//! A field that is empty or does not hold a number makes the whole input
//! invalid; callers show the reset state instead of a result.

use chrono::NaiveDate;
use log::warn;
use std::str::FromStr;

use crate::error::{LoanError, LoanResult};
use crate::loan::{LoanParameters, RateMode};

impl FromStr for RateMode {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" | "nominaal" | "0" => Ok(RateMode::Nominal),
            "effective" | "effectief" | "1" => Ok(RateMode::Effective),
            other => Err(LoanError::InvalidRateMode(other.to_string())),
        }
    }
}

/// Raw text of the three numeric form fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawInputs {
    pub principal: String,
    pub annual_rate: String,
    pub periods: String,
}

impl RawInputs {
    pub fn new(principal: &str, annual_rate: &str, periods: &str) -> Self {
        Self {
            principal: principal.to_string(),
            annual_rate: annual_rate.to_string(),
            periods: periods.to_string(),
        }
    }
}

pub fn parse_inputs(raw: &RawInputs, rate_mode: RateMode) -> LoanResult<LoanParameters> {
    let result = parse_fields(raw).and_then(|(principal, annual_rate, periods)| {
        LoanParameters::new(principal, annual_rate, rate_mode, periods)
    });
    if let Err(err) = &result {
        warn!("rejected input {:?}: {}", raw, err);
    }
    result
}

fn parse_fields(raw: &RawInputs) -> LoanResult<(f64, f64, u32)> {
    let principal = parse_amount("principal", &raw.principal)?;
    let annual_rate = parse_amount("rate", &raw.annual_rate)?;
    let periods = parse_periods(&raw.periods)?;
    Ok((principal, annual_rate, periods))
}

/// Accepts either `.` or `,` as the decimal separator.
pub fn parse_amount(field: &str, text: &str) -> LoanResult<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LoanError::invalid(field, "is empty"));
    }
    let value: f64 = text
        .replace(',', ".")
        .parse()
        .map_err(|_| LoanError::invalid(field, "is not a number"))?;
    if !value.is_finite() {
        return Err(LoanError::invalid(field, "must be a finite number"));
    }
    Ok(value)
}

/// Reads the leading whole number and ignores the rest, so `12.5` and
/// `12 maanden` both mean 12 months.
pub fn parse_periods(text: &str) -> LoanResult<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LoanError::invalid("periods", "is empty"));
    }
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let end = text[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |i| i + sign_len);
    if end == sign_len {
        return Err(LoanError::invalid("periods", "is not a whole number of months"));
    }
    let periods: i64 = text[..end]
        .parse()
        .map_err(|_| LoanError::invalid("periods", "is too large"))?;
    if periods <= 0 {
        return Err(LoanError::invalid("periods", "must be at least one month"));
    }
    u32::try_from(periods).map_err(|_| LoanError::invalid("periods", "is too large"))
}

/// Parses an ISO `YYYY-MM-DD` start date.
pub fn parse_start_date(text: &str) -> LoanResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|err| LoanError::InvalidDate(format!("{}: {}", text.trim(), err)))
}
