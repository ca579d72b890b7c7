//! Company income tax line items

use super::levy::{Levy, LevySpec};
use super::money::{format_amount, round_money};
use super::{InputField, TaxError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxng_derive::InputFields;

pub const DEFAULT_STATUTORY_RATE: Decimal = dec!(0.30);
pub const DEFAULT_MINIMUM_TAX_RATE: Decimal = dec!(0.01);
pub const DEFAULT_WEAR_AND_TEAR_RATE: Decimal = dec!(0.20);
pub const DEFAULT_CURRENCY: &str = "NGN";

fn default_statutory_rate() -> Decimal {
    DEFAULT_STATUTORY_RATE
}

fn default_minimum_tax_rate() -> Decimal {
    DEFAULT_MINIMUM_TAX_RATE
}

fn default_wear_and_tear_rate() -> Decimal {
    DEFAULT_WEAR_AND_TEAR_RATE
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Company income tax inputs for a single computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, InputFields)]
pub struct CitInput {
    /// Profit before tax for the period
    #[schemars(with = "f64")]
    pub profit_before_tax: Decimal,
    /// Capital allowance claimed (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub capital_allowance: Decimal,
    /// Loss brought forward from earlier periods (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub loss_bf: Decimal,
    /// Standard CIT rate as a fraction (default 0.30)
    #[serde(default = "default_statutory_rate")]
    #[schemars(with = "f64")]
    pub statutory_rate: Decimal,
    /// Minimum tax rate applied to profit before tax (default 0.01)
    #[serde(default = "default_minimum_tax_rate")]
    #[schemars(with = "f64")]
    pub minimum_tax_rate: Decimal,
    /// Levies by name: {"rate": x}, {"amount": x}, or a bare number (0 < x < 1 is a rate)
    #[serde(default, alias = "add_other_levies")]
    #[schemars(with = "BTreeMap<String, LevySpec>")]
    pub levies: BTreeMap<String, Levy>,
    /// Opening tax written down value of capital assets (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub opening_twdv: Decimal,
    /// Capital additions in the period (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub additions: Decimal,
    /// Capital disposals in the period (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub disposals: Decimal,
    /// Wear and tear (depreciation) rate as a fraction (default 0.20)
    #[serde(default = "default_wear_and_tear_rate")]
    #[schemars(with = "f64")]
    pub wear_and_tear_rate: Decimal,
    /// Currency label for display (default NGN)
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl CitInput {
    /// Inputs with every optional field at its default
    pub fn new(profit_before_tax: Decimal) -> Self {
        CitInput {
            profit_before_tax,
            capital_allowance: Decimal::ZERO,
            loss_bf: Decimal::ZERO,
            statutory_rate: DEFAULT_STATUTORY_RATE,
            minimum_tax_rate: DEFAULT_MINIMUM_TAX_RATE,
            levies: BTreeMap::new(),
            opening_twdv: Decimal::ZERO,
            additions: Decimal::ZERO,
            disposals: Decimal::ZERO,
            wear_and_tear_rate: DEFAULT_WEAR_AND_TEAR_RATE,
            currency: default_currency(),
        }
    }
}

/// Profit less capital allowance and losses brought forward. Not floored.
pub fn adjusted_profit(input: &CitInput) -> Result<Decimal, TaxError> {
    input
        .profit_before_tax
        .checked_sub(input.capital_allowance)
        .and_then(|profit| profit.checked_sub(input.loss_bf))
        .map(round_money)
        .ok_or(TaxError::Overflow("adjusted profit"))
}

pub fn taxable_profit(adjusted_profit: Decimal) -> Decimal {
    round_money(adjusted_profit.max(Decimal::ZERO))
}

pub fn standard_tax(taxable_profit: Decimal, statutory_rate: Decimal) -> Result<Decimal, TaxError> {
    taxable_profit
        .checked_mul(statutory_rate)
        .map(round_money)
        .ok_or(TaxError::Overflow("standard tax"))
}

/// Floor tax on gross profit, independent of allowances and losses
pub fn minimum_tax(input: &CitInput) -> Result<Decimal, TaxError> {
    input
        .profit_before_tax
        .checked_mul(input.minimum_tax_rate)
        .map(|tax| round_money(tax.max(Decimal::ZERO)))
        .ok_or(TaxError::Overflow("minimum tax"))
}

/// Which computation set the tax payable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    Standard,
    Minimum,
}

/// The larger of standard and minimum tax. Ties report the standard basis.
pub fn tax_payable_before_levies(standard_tax: Decimal, minimum_tax: Decimal) -> (Decimal, TaxBasis) {
    if minimum_tax > standard_tax {
        (minimum_tax, TaxBasis::Minimum)
    } else {
        (standard_tax, TaxBasis::Standard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitLineItems {
    pub adjusted_profit: Decimal,
    pub taxable_profit: Decimal,
    pub standard_cit: Decimal,
    pub minimum_tax: Decimal,
    pub tax_payable_before_levies: Decimal,
    pub basis: TaxBasis,
}

pub fn compute_line_items(input: &CitInput) -> Result<CitLineItems, TaxError> {
    let adjusted = adjusted_profit(input)?;
    let taxable = taxable_profit(adjusted);
    let standard = standard_tax(taxable, input.statutory_rate)?;
    let minimum = minimum_tax(input)?;
    let (payable, basis) = tax_payable_before_levies(standard, minimum);

    log::debug!(
        "CIT adjusted={}, taxable={}, standard={}, minimum={}, payable={} ({:?})",
        adjusted,
        taxable,
        standard,
        minimum,
        payable,
        basis
    );

    Ok(CitLineItems {
        adjusted_profit: adjusted,
        taxable_profit: taxable,
        standard_cit: standard,
        minimum_tax: minimum,
        tax_payable_before_levies: payable,
        basis,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitLineItems {
    pub adjusted_profit: Decimal,
    pub taxable_profit: Decimal,
}

/// Result of the single-rate calculator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitSummary {
    pub profit_before_tax: Decimal,
    pub capital_allowance: Decimal,
    pub loss_bf: Decimal,
    pub statutory_rate: Decimal,
    pub line_items: ProfitLineItems,
    pub tax_payable: Decimal,
    pub currency: String,
}

impl CitSummary {
    pub fn explanation(&self) -> String {
        format!(
            "Adjusted profit: {}, Taxable profit: {}, Tax payable: {}",
            format_amount(self.line_items.adjusted_profit),
            format_amount(self.line_items.taxable_profit),
            format_amount(self.tax_payable)
        )
    }
}

/// Single-rate company income tax: no minimum tax, levies or capital schedule
pub fn compute_company_income_tax(
    profit_before_tax: Decimal,
    capital_allowance: Decimal,
    loss_bf: Decimal,
    statutory_rate: Decimal,
) -> Result<CitSummary, TaxError> {
    let input = CitInput {
        capital_allowance,
        loss_bf,
        statutory_rate,
        ..CitInput::new(profit_before_tax)
    };
    let adjusted = adjusted_profit(&input)?;
    let taxable = taxable_profit(adjusted);
    let tax_payable = standard_tax(taxable, input.statutory_rate)?;

    Ok(CitSummary {
        profit_before_tax: round_money(input.profit_before_tax),
        capital_allowance: round_money(input.capital_allowance),
        loss_bf: round_money(input.loss_bf),
        statutory_rate: input.statutory_rate,
        line_items: ProfitLineItems {
            adjusted_profit: adjusted,
            taxable_profit: taxable,
        },
        tax_payable,
        currency: input.currency,
    })
}
