use chrono::{Months, NaiveDate};
use log::{debug, info, trace};
use std::fmt;

use crate::error::{LoanError, LoanResult};

/// How the annual percentage converts to a monthly rate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RateMode {
    #[default]
    Nominal,
    Effective,
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateMode::Nominal => write!(f, "nominal"),
            RateMode::Effective => write!(f, "effective"),
        }
    }
}

/// Validated loan input. Only `LoanParameters::new` builds one, so every
/// calculation below can rely on finite values, a positive principal, a
/// non-negative rate and at least one period.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLoanParameters"))]
pub struct LoanParameters {
    principal: f64,
    annual_rate_percent: f64,
    rate_mode: RateMode,
    periods: u32,
}

impl LoanParameters {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        rate_mode: RateMode,
        periods: u32,
    ) -> LoanResult<Self> {
        if !principal.is_finite() {
            return Err(LoanError::invalid("principal", "must be a finite number"));
        }
        if principal <= 0. {
            return Err(LoanError::invalid("principal", "must be greater than zero"));
        }
        if !annual_rate_percent.is_finite() {
            return Err(LoanError::invalid("rate", "must be a finite number"));
        }
        if annual_rate_percent < 0. {
            return Err(LoanError::invalid("rate", "must not be negative"));
        }
        if periods == 0 {
            return Err(LoanError::invalid("periods", "must be at least one month"));
        }
        Ok(Self {
            principal,
            annual_rate_percent,
            rate_mode,
            periods,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }

    pub fn rate_mode(&self) -> RateMode {
        self.rate_mode
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    pub fn monthly_rate(&self) -> f64 {
        monthly_rate_of(self.annual_rate_percent, self.rate_mode)
    }
}

/// Parameters as they arrive from outside, before validation.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct RawLoanParameters {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub rate_mode: RateMode,
    pub periods: u32,
}

impl TryFrom<RawLoanParameters> for LoanParameters {
    type Error = LoanError;

    fn try_from(raw: RawLoanParameters) -> LoanResult<Self> {
        LoanParameters::new(
            raw.principal,
            raw.annual_rate_percent,
            raw.rate_mode,
            raw.periods,
        )
    }
}

/// One period of the amortization schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerRow {
    pub index: u32,
    pub due_date: NaiveDate,
    pub opening_balance: f64,
    pub payment: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub closing_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub cumulative_paid: f64,
}

impl fmt::Display for LedgerRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pmt number {}, date {}, opening balance ${:.4}, payment ${:.4}, principal ${:.4}, interest ${:.4}, closing balance ${:.4}",
            self.index,
            self.due_date,
            self.opening_balance,
            self.payment,
            self.principal_portion,
            self.interest_portion,
            self.closing_balance
        )
    }
}

/// Headline figures shown next to the input form.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanSummary {
    pub monthly_payment: f64,
    pub periodic_rate_percent: f64,
    pub period_years: f64,
    pub total_interest: f64,
}

impl LoanSummary {
    pub fn new(params: &LoanParameters) -> Self {
        let monthly_rate = params.monthly_rate();
        let monthly_payment =
            compute_monthly_payment(params.principal, monthly_rate, params.periods);
        Self {
            monthly_payment,
            periodic_rate_percent: monthly_rate * 100.,
            period_years: params.periods as f64 / 12.,
            total_interest: monthly_payment * params.periods as f64 - params.principal,
        }
    }
}

/// The fixed payment together with the full schedule it produces.
#[derive(Clone, PartialEq, Debug)]
pub struct PaymentPlan {
    monthly_payment: f64,
    rows: Vec<LedgerRow>,
}

impl PaymentPlan {
    pub fn new(params: &LoanParameters, start_date: NaiveDate) -> LoanResult<Self> {
        let monthly_rate = params.monthly_rate();
        let monthly_payment =
            compute_monthly_payment(params.principal, monthly_rate, params.periods);
        let rows = build_schedule(
            params.principal,
            monthly_rate,
            monthly_payment,
            params.periods,
            start_date,
        )?;
        Ok(Self {
            monthly_payment,
            rows,
        })
    }

    pub fn get_pmt_amount(&self) -> f64 {
        self.monthly_payment
    }

    pub fn get_pmt_count(&self) -> usize {
        self.rows.len()
    }

    /// Row for a 1-based payment number.
    pub fn get_pmt_detail(&self, pmt_number: usize) -> Option<&LedgerRow> {
        pmt_number
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }

    pub fn get_pmt_info(&self, pmt_number: usize) -> String {
        match self.get_pmt_detail(pmt_number) {
            Some(row) => row.to_string(),
            None => "No payment information.".to_string(),
        }
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn show_amortization(&self) {
        for row in &self.rows {
            info!("{}", row);
        }
    }
}

/// Recomputes every derived value from scratch for the current input.
pub fn recompute(
    params: &LoanParameters,
    start_date: NaiveDate,
) -> LoanResult<(LoanSummary, PaymentPlan)> {
    debug!(
        "recompute: principal {}, rate {}% {}, {} months, start {}",
        params.principal, params.annual_rate_percent, params.rate_mode, params.periods, start_date
    );
    Ok((LoanSummary::new(params), PaymentPlan::new(params, start_date)?))
}

pub fn round(amt: f64, dec: i32) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powi(dec)).round() / 10_f64.powi(dec)
    }
}

pub fn monthly_rate_of(annual_rate_percent: f64, rate_mode: RateMode) -> f64 {
    match rate_mode {
        RateMode::Nominal => annual_rate_percent / 100. / 12.,
        // (1 + r)^(1/12) - 1 without losing tiny rates
        RateMode::Effective => ((annual_rate_percent / 100.).ln_1p() / 12.).exp_m1(),
    }
}

/// Fixed annuity payment; straight-line when there is no interest.
/// `periods` must be positive.
pub fn compute_monthly_payment(principal: f64, monthly_rate: f64, periods: u32) -> f64 {
    if monthly_rate <= 0. {
        return principal / periods as f64;
    }
    // 1 - (1 + r)^-n, kept accurate when 1 + r rounds to 1
    let denom = -(-(periods as f64) * monthly_rate.ln_1p()).exp_m1();
    principal * (monthly_rate / denom)
}

const MAX_RESERVED_ROWS: u32 = 1200;

pub fn build_schedule(
    principal: f64,
    monthly_rate: f64,
    payment: f64,
    periods: u32,
    start_date: NaiveDate,
) -> LoanResult<Vec<LedgerRow>> {
    // chrono's date range ends very long schedules, so only reserve for common terms
    let mut rows: Vec<LedgerRow> = Vec::with_capacity(periods.min(MAX_RESERVED_ROWS) as usize);

    let mut balance = principal;
    let mut due_date = start_date;
    let mut cumulative_interest = 0.;
    let mut cumulative_principal = 0.;

    for index in 1..=periods {
        due_date = get_next_due_date(due_date)?;

        let interest_portion = balance * monthly_rate;
        // the last payment never takes more principal than is left, and the
        // final scheduled payment clears whatever rounding left behind
        let principal_portion = if index == periods {
            balance
        } else {
            (payment - interest_portion).min(balance)
        };
        let actual_payment = principal_portion + interest_portion;
        let closing_balance = (balance - principal_portion).max(0.);

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;

        trace!(
            "pmt # {}, due {}, interest {}, principal {}, closing bal {}",
            index,
            due_date,
            interest_portion,
            principal_portion,
            closing_balance
        );

        rows.push(LedgerRow {
            index,
            due_date,
            opening_balance: balance,
            payment: actual_payment,
            principal_portion,
            interest_portion,
            closing_balance,
            cumulative_interest,
            cumulative_principal,
            // projection of full payments, not a sum of actuals
            cumulative_paid: actual_payment * index as f64,
        });

        balance = closing_balance;
        if balance <= 0. {
            break;
        }
    }
    Ok(rows)
}

fn get_next_due_date(due_date: NaiveDate) -> LoanResult<NaiveDate> {
    due_date
        .checked_add_months(Months::new(1))
        .ok_or(LoanError::DateOutOfRange(due_date))
}
