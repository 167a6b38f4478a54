//! Loan amortization calculator: monthly payment, rate breakdown and a full
//! repayment schedule for a fixed-rate loan.

pub mod error;
pub mod input;
pub mod loan;
pub mod overview;
pub mod session;
pub mod ui_cli;

pub use error::{AppError, LoanError, LoanResult};
pub use loan::{
    build_schedule, compute_monthly_payment, monthly_rate_of, recompute, LedgerRow,
    LoanParameters, LoanSummary, PaymentPlan, RateMode, RawLoanParameters,
};
