//! Explain command - form-style summary from raw text fields

use crate::engine::money::parse_amount;
use crate::engine::{compute_company_income_tax, CitSummary, TaxError, DEFAULT_STATUTORY_RATE};
use clap::Args;

/// Raw form fields, coerced to numbers only when the summary is rendered
#[derive(Args, Debug, Clone)]
pub struct FormFields {
    /// Profit before tax
    #[arg(allow_hyphen_values = true)]
    profit: String,

    /// Capital allowance
    #[arg(allow_hyphen_values = true)]
    allowance: String,

    /// Loss brought forward
    #[arg(allow_hyphen_values = true)]
    loss: String,

    /// Statutory rate as a fraction (default 0.30)
    #[arg(allow_hyphen_values = true)]
    rate: Option<String>,
}

impl FormFields {
    pub fn exec(&self) -> anyhow::Result<()> {
        println!("{}", render(self));
        Ok(())
    }
}

pub fn explain(fields: &FormFields) -> Result<CitSummary, TaxError> {
    let rate = match fields.rate.as_deref() {
        Some(rate) => parse_amount(rate)?,
        None => DEFAULT_STATUTORY_RATE,
    };
    compute_company_income_tax(
        parse_amount(&fields.profit)?,
        parse_amount(&fields.allowance)?,
        parse_amount(&fields.loss)?,
        rate,
    )
}

/// The summary line, or an error message in its place
pub fn render(fields: &FormFields) -> String {
    match explain(fields) {
        Ok(summary) => summary.explanation(),
        Err(err) => format!("Error: {}", err),
    }
}
