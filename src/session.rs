//! Presentation state for one calculator screen.
//!
//! The session owns everything mutable: the raw field text, the selected rate
//! mode, the start date and whether the schedule is on screen. Each edit
//! recomputes the derived output from scratch; nothing is carried over from
//! an earlier input.

use chrono::NaiveDate;
use log::debug;

use crate::error::LoanResult;
use crate::input::{parse_inputs, RawInputs};
use crate::loan::{LoanParameters, LoanSummary, PaymentPlan, RateMode};
use crate::overview::{print_overview, SummaryFields};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Principal,
    AnnualRate,
    Periods,
}

#[derive(Debug)]
pub struct Session {
    raw: RawInputs,
    rate_mode: RateMode,
    start_date: NaiveDate,
    params: Option<LoanParameters>,
    summary: SummaryFields,
    plan: Option<PaymentPlan>,
}

impl Session {
    pub fn new(raw: RawInputs, rate_mode: RateMode, start_date: NaiveDate) -> Self {
        let mut session = Self {
            raw,
            rate_mode,
            start_date,
            params: None,
            summary: SummaryFields::default(),
            plan: None,
        };
        session.update_summary();
        session
    }

    pub fn set_field(&mut self, field: Field, text: &str) -> LoanResult<()> {
        match field {
            Field::Principal => self.raw.principal = text.to_string(),
            Field::AnnualRate => self.raw.annual_rate = text.to_string(),
            Field::Periods => self.raw.periods = text.to_string(),
        }
        self.input_changed()
    }

    pub fn set_rate_mode(&mut self, rate_mode: RateMode) -> LoanResult<()> {
        self.rate_mode = rate_mode;
        self.input_changed()
    }

    /// Only the schedule depends on the start date. A date the schedule
    /// cannot be built from is refused and the current one is kept.
    pub fn set_start_date(&mut self, start_date: NaiveDate) -> LoanResult<()> {
        if self.plan.is_some() {
            if let Some(params) = &self.params {
                self.plan = Some(PaymentPlan::new(params, start_date)?);
            }
        }
        self.start_date = start_date;
        Ok(())
    }

    /// Builds and shows the schedule. Does nothing while the input is invalid;
    /// hides the schedule when it cannot be built.
    pub fn generate_schedule(&mut self) -> LoanResult<()> {
        if let Some(params) = &self.params {
            match PaymentPlan::new(params, self.start_date) {
                Ok(plan) => self.plan = Some(plan),
                Err(err) => {
                    self.plan = None;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    pub fn can_show_schedule(&self) -> bool {
        self.params.is_some()
    }

    pub fn can_print(&self) -> bool {
        self.plan.is_some()
    }

    pub fn params(&self) -> Option<&LoanParameters> {
        self.params.as_ref()
    }

    pub fn rate_mode(&self) -> RateMode {
        self.rate_mode
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn summary(&self) -> &SummaryFields {
        &self.summary
    }

    /// The visible schedule, if any.
    pub fn schedule(&self) -> Option<&PaymentPlan> {
        self.plan.as_ref()
    }

    pub fn print_overview(&self) -> Vec<String> {
        print_overview(self.params.as_ref(), &self.summary)
    }

    fn input_changed(&mut self) -> LoanResult<()> {
        self.update_summary();
        if self.plan.is_some() {
            self.generate_schedule()?;
        }
        Ok(())
    }

    fn update_summary(&mut self) {
        match parse_inputs(&self.raw, self.rate_mode) {
            Ok(params) => {
                debug!("summary for {:?}", params);
                self.summary = SummaryFields::from(&LoanSummary::new(&params));
                self.params = Some(params);
            }
            Err(_) => self.reset_outputs(),
        }
    }

    fn reset_outputs(&mut self) {
        self.params = None;
        self.summary = SummaryFields::default();
        self.plan = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(RawInputs::new("10000", "6", "12"), RateMode::Nominal, start());
        assert!(session.can_show_schedule());
        assert!(!session.can_print());
        assert!(session.schedule().is_none());
        assert_eq!(session.summary().payment, "€ 860,66");

        let empty = Session::new(RawInputs::default(), RateMode::Nominal, start());
        assert!(!empty.can_show_schedule());
        assert!(empty.summary().is_empty());
    }

    #[test]
    fn test_schedule_follows_edits_while_visible() {
        let mut session =
            Session::new(RawInputs::new("10000", "0", "10"), RateMode::Nominal, start());
        session.generate_schedule().unwrap();
        assert!(session.can_print());
        assert_eq!(session.schedule().unwrap().get_pmt_count(), 10);

        session.set_field(Field::Periods, "4").unwrap();
        assert_eq!(session.schedule().unwrap().get_pmt_count(), 4);
        assert_eq!(session.schedule().unwrap().get_pmt_amount(), 2500.);
        assert_eq!(session.summary().payment, "€ 2.500,00");

        session.set_rate_mode(RateMode::Effective).unwrap();
        assert_eq!(session.schedule().unwrap().get_pmt_amount(), 2500.);

        session.set_field(Field::AnnualRate, "12").unwrap();
        assert!(session.schedule().unwrap().get_pmt_amount() > 2500.);
    }

    #[test]
    fn test_invalid_edit_resets_output() {
        let mut session =
            Session::new(RawInputs::new("10000", "6", "12"), RateMode::Nominal, start());
        session.generate_schedule().unwrap();

        session.set_field(Field::Periods, "0").unwrap();
        assert!(session.summary().is_empty());
        assert!(session.schedule().is_none());
        assert!(!session.can_show_schedule());
        assert!(!session.can_print());

        // a valid edit brings the summary back, but the schedule stays hidden
        session.set_field(Field::Periods, "24").unwrap();
        assert!(!session.summary().is_empty());
        assert!(session.schedule().is_none());

        // the schedule button does nothing on invalid input
        session.set_field(Field::Principal, "abc").unwrap();
        session.generate_schedule().unwrap();
        assert!(session.schedule().is_none());
    }

    #[test]
    fn test_start_date_moves_due_dates() {
        let mut session =
            Session::new(RawInputs::new("1200", "0", "12"), RateMode::Nominal, start());
        session.set_start_date(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()).unwrap();
        assert!(session.schedule().is_none());

        session.generate_schedule().unwrap();
        session.set_start_date(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()).unwrap();
        let first = session.schedule().unwrap().get_pmt_detail(1).unwrap();
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());
    }

    #[test]
    fn test_unreachable_start_date_is_refused() {
        let mut session =
            Session::new(RawInputs::new("1200", "0", "12"), RateMode::Nominal, start());
        session.generate_schedule().unwrap();

        let late = NaiveDate::from_ymd_opt(262142, 6, 1).unwrap();
        assert!(session.set_start_date(late).is_err());
        assert_eq!(session.start_date(), start());
        let first = session.schedule().unwrap().get_pmt_detail(1).unwrap();
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        // while hidden the date is only stored; showing the schedule then fails
        // and leaves it hidden
        let mut hidden =
            Session::new(RawInputs::new("1200", "0", "12"), RateMode::Nominal, start());
        hidden.set_start_date(late).unwrap();
        assert!(hidden.generate_schedule().is_err());
        assert!(hidden.schedule().is_none());
        assert!(!hidden.can_print());

        // an edit that makes the visible schedule unbuildable hides it
        let mut session =
            Session::new(RawInputs::new("1200", "0", "1"), RateMode::Nominal, late);
        session.generate_schedule().unwrap();
        assert!(session.set_field(Field::Periods, "12").is_err());
        assert!(session.schedule().is_none());
        assert!(!session.summary().is_empty());
    }

    #[test]
    fn test_print_overview() {
        let mut session =
            Session::new(RawInputs::new("10000", "6", "12"), RateMode::Nominal, start());
        session.generate_schedule().unwrap();
        let lines = session.print_overview();
        assert_eq!(lines[0], "Te lenen bedrag: € 10.000,00");
        assert_eq!(lines[4], "Totaal interesten: € 327,97");
    }
}
