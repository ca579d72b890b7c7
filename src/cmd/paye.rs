//! Paye command - progressive personal income tax on gross pay

use super::amount_arg;
use super::compute::{band_rows, render_table};
use crate::engine::money::format_amount;
use crate::engine::{compute_paye, statutory_bands, PayeInput, PayeReport, TaxBand};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct PayeCommand {
    /// Gross pay
    #[arg(short, long, value_parser = amount_arg)]
    gross: Decimal,

    /// Tax band as LIMIT:RATE, in ascending order (e.g. 300000:0.07, inf:0.24).
    /// Uses the statutory schedule when not given.
    #[arg(short, long = "band")]
    bands: Vec<TaxBand>,

    /// Personal relief deducted from the computed tax
    #[arg(short, long, value_parser = amount_arg, default_value = "0")]
    relief: Decimal,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl PayeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let bands = if self.bands.is_empty() {
            log::debug!("No bands given, using the statutory schedule");
            statutory_bands()
        } else {
            self.bands.clone()
        };
        let input = PayeInput {
            personal_relief: self.relief,
            ..PayeInput::new(self.gross, bands)
        };
        let report = compute_paye(&input)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &PayeReport) {
    println!();
    println!("PAYE ON GROSS PAY {}", format_amount(report.gross_pay));
    println!();
    if report.bands.is_empty() {
        println!("  (no bands)");
    } else {
        println!("{}", render_table(band_rows(report)));
    }
    println!();
    println!("  Tax before relief: {}", format_amount(report.tax_before_relief));
    println!("  Personal relief: {}", format_amount(report.personal_relief));
    println!("TAX PAYABLE: {}", format_amount(report.tax_payable));
    println!();
}
