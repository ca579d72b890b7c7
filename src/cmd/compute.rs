//! Compute command - full CIT, capital schedule, levies and PAYE from a JSON request

use super::read_request;
use crate::engine::money::{format_amount, format_rate};
use crate::engine::paye::BandLimit;
use crate::engine::{Levy, NamedLevy, PayeReport, TaxComputation};
use clap::Args;
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ComputeCommand {
    /// JSON request file. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Show formatted tables instead of JSON
    #[arg(long, conflicts_with = "csv")]
    table: bool,

    /// Output line items as CSV instead of JSON
    #[arg(long)]
    csv: bool,

    /// Add or replace a levy: NAME=VALUE, NAME=rate:VALUE or NAME=amount:VALUE
    #[arg(long = "levy")]
    levies: Vec<NamedLevy>,
}

impl ComputeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut request = read_request(&self.file)?;
        for NamedLevy { name, levy } in &self.levies {
            request.cit.levies.insert(name.clone(), *levy);
        }
        let computation = request.compute()?;

        if self.table {
            print_tables(&computation);
            Ok(())
        } else if self.csv {
            write_csv(&computation)
        } else {
            println!("{}", serde_json::to_string_pretty(&computation)?);
            Ok(())
        }
    }
}

/// Row for the line item table and CSV output
#[derive(Debug, Clone, PartialEq, Tabled, serde::Serialize)]
pub struct LineRow {
    #[tabled(rename = "Section")]
    pub section: &'static str,

    #[tabled(rename = "Item")]
    pub item: String,

    #[tabled(rename = "Value")]
    pub value: String,
}

impl LineRow {
    fn new(section: &'static str, item: impl Into<String>, value: String) -> Self {
        LineRow {
            section,
            item: item.into(),
            value,
        }
    }
}

/// Flatten a computation into section/item/value rows
pub fn computation_rows(c: &TaxComputation) -> Vec<LineRow> {
    let li = &c.line_items;
    let mut rows = vec![
        LineRow::new("line_items", "adjusted_profit", li.adjusted_profit.to_string()),
        LineRow::new("line_items", "taxable_profit", li.taxable_profit.to_string()),
        LineRow::new("line_items", "standard_cit", li.standard_cit.to_string()),
        LineRow::new("line_items", "minimum_tax", li.minimum_tax.to_string()),
        LineRow::new(
            "line_items",
            "tax_payable_before_levies",
            li.tax_payable_before_levies.to_string(),
        ),
        LineRow::new("twdv", "opening_twdv", c.twdv.opening_twdv.to_string()),
        LineRow::new("twdv", "additions", c.twdv.additions.to_string()),
        LineRow::new("twdv", "disposals", c.twdv.disposals.to_string()),
        LineRow::new("twdv", "wear_and_tear_rate", c.twdv.wear_and_tear_rate.to_string()),
        LineRow::new("twdv", "wear_and_tear_charge", c.twdv.wear_and_tear_charge.to_string()),
        LineRow::new("twdv", "closing_twdv", c.twdv.closing_twdv.to_string()),
    ];
    rows.extend(
        c.levies
            .iter()
            .map(|l| LineRow::new("levies", l.name.clone(), l.amount.to_string())),
    );
    rows.push(LineRow::new("totals", "total_levies", c.totals.total_levies.to_string()));
    rows.push(LineRow::new(
        "totals",
        "total_tax_payable",
        c.totals.total_tax_payable.to_string(),
    ));
    if let Some(paye) = &c.paye {
        rows.push(LineRow::new("paye", "gross_pay", paye.gross_pay.to_string()));
        rows.push(LineRow::new("paye", "tax_before_relief", paye.tax_before_relief.to_string()));
        rows.push(LineRow::new("paye", "personal_relief", paye.personal_relief.to_string()));
        rows.push(LineRow::new("paye", "tax_payable", paye.tax_payable.to_string()));
    }
    rows
}

fn write_csv(computation: &TaxComputation) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    for row in computation_rows(computation) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Tabled)]
struct AmountRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct LevyRow {
    #[tabled(rename = "Levy")]
    name: String,
    #[tabled(rename = "Basis")]
    basis: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
pub struct BandRow {
    #[tabled(rename = "Band Up To")]
    pub threshold: String,
    #[tabled(rename = "Rate")]
    pub rate: String,
    #[tabled(rename = "Taxable")]
    pub taxable: String,
    #[tabled(rename = "Tax")]
    pub tax: String,
}

pub fn band_rows(paye: &PayeReport) -> Vec<BandRow> {
    paye.bands
        .iter()
        .map(|b| BandRow {
            threshold: match b.threshold {
                BandLimit::UpTo(limit) => format_amount(limit),
                BandLimit::Unbounded => "and above".to_string(),
            },
            rate: format_rate(b.rate),
            taxable: format_amount(b.taxable_amount),
            tax: format_amount(b.band_tax),
        })
        .collect()
}

pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

fn amount_rows(items: &[(&str, Decimal)]) -> Vec<AmountRow> {
    items
        .iter()
        .map(|(item, amount)| AmountRow {
            item: item.to_string(),
            amount: format_amount(*amount),
        })
        .collect()
}

fn print_tables(c: &TaxComputation) {
    let currency = &c.inputs.currency;
    let li = &c.line_items;

    println!();
    println!("COMPANY INCOME TAX ({})", currency);
    println!(
        "{}",
        render_table(amount_rows(&[
            ("Profit before tax", c.inputs.profit_before_tax),
            ("Adjusted profit", li.adjusted_profit),
            ("Taxable profit", li.taxable_profit),
            ("Standard CIT", li.standard_cit),
            ("Minimum tax", li.minimum_tax),
            ("Tax payable before levies", li.tax_payable_before_levies),
        ]))
    );
    println!("  Basis: {:?} tax", li.basis);
    println!();

    println!("CAPITAL ALLOWANCES (wear and tear @ {})", format_rate(c.twdv.wear_and_tear_rate));
    println!(
        "{}",
        render_table(amount_rows(&[
            ("Opening TWDV", c.twdv.opening_twdv),
            ("Additions", c.twdv.additions),
            ("Disposals", c.twdv.disposals),
            ("Wear and tear", c.twdv.wear_and_tear_charge),
            ("Closing TWDV", c.twdv.closing_twdv),
        ]))
    );
    println!();

    println!("LEVIES");
    if c.levies.is_empty() {
        println!("  (none)");
    } else {
        let rows: Vec<LevyRow> = c
            .levies
            .iter()
            .map(|l| LevyRow {
                name: l.name.clone(),
                basis: match l.basis {
                    Levy::Rate(rate) => format!("{} of taxable profit", format_rate(rate)),
                    Levy::Amount(_) => "flat amount".to_string(),
                },
                amount: format_amount(l.amount),
            })
            .collect();
        println!("{}", render_table(rows));
    }
    println!();

    if let Some(paye) = &c.paye {
        println!("PAYE");
        if paye.bands.is_empty() {
            println!("  (no bands)");
        } else {
            println!("{}", render_table(band_rows(paye)));
        }
        println!(
            "  Gross: {} | Tax: {} | Relief: {} | Payable: {}",
            format_amount(paye.gross_pay),
            format_amount(paye.tax_before_relief),
            format_amount(paye.personal_relief),
            format_amount(paye.tax_payable)
        );
        println!();
    }

    println!(
        "TOTAL TAX PAYABLE: {} {} (levies {})",
        currency,
        format_amount(c.totals.total_tax_payable),
        format_amount(c.totals.total_levies)
    );
    println!();
}
