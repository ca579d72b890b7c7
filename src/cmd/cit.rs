//! Cit command - single-rate company income tax

use super::amount_arg;
use crate::engine::money::format_amount;
use crate::engine::{compute_company_income_tax, CitSummary, DEFAULT_STATUTORY_RATE};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct CitCommand {
    /// Profit before tax (may be negative)
    #[arg(short, long, value_parser = amount_arg, allow_hyphen_values = true)]
    profit: Decimal,

    /// Capital allowance
    #[arg(short = 'c', long, value_parser = amount_arg, allow_hyphen_values = true)]
    allowance: Decimal,

    /// Loss brought forward
    #[arg(short, long, value_parser = amount_arg, allow_hyphen_values = true)]
    loss: Decimal,

    /// Statutory rate as a fraction
    #[arg(short, long, value_parser = amount_arg, default_value_t = DEFAULT_STATUTORY_RATE)]
    rate: Decimal,

    /// Currency label
    #[arg(long, default_value = "NGN")]
    currency: String,

    /// Print a one-line summary instead of every field
    #[arg(long, conflicts_with = "json")]
    summary: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl CitCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut result =
            compute_company_income_tax(self.profit, self.allowance, self.loss, self.rate)?;
        result.currency = self.currency.clone();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if self.summary {
            println!("{}", result.explanation());
        } else {
            print_fields(&result);
        }
        Ok(())
    }
}

fn print_fields(result: &CitSummary) {
    println!();
    println!("COMPANY INCOME TAX ({})", result.currency);
    println!();
    for (name, value) in result_fields(result) {
        println!("{}: {}", name, value);
    }
}

fn result_fields(result: &CitSummary) -> Vec<(&'static str, String)> {
    vec![
        ("profit_before_tax", format_amount(result.profit_before_tax)),
        ("capital_allowance", format_amount(result.capital_allowance)),
        ("loss_bf", format_amount(result.loss_bf)),
        ("statutory_rate", format_amount(result.statutory_rate)),
        ("adjusted_profit", format_amount(result.line_items.adjusted_profit)),
        ("taxable_profit", format_amount(result.line_items.taxable_profit)),
        ("tax_payable", format_amount(result.tax_payable)),
        ("currency", result.currency.clone()),
    ]
}
