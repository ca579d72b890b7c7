use super::money::{parse_amount, round_money};
use super::TaxError;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A supplementary levy charged on top of company income tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "LevySpec")]
pub enum Levy {
    /// Fraction of taxable profit
    Rate(Decimal),
    /// Flat amount, independent of profit
    Amount(Decimal),
}

impl Levy {
    /// Classify a bare number: strictly between 0 and 1 is a rate, anything else a flat amount.
    ///
    /// Only used where the caller gave no explicit `rate`/`amount` tag.
    pub fn classify(value: Decimal) -> Self {
        if value > Decimal::ZERO && value < Decimal::ONE {
            Levy::Rate(value)
        } else {
            Levy::Amount(value)
        }
    }

    pub fn charge(&self, taxable_profit: Decimal) -> Result<Decimal, TaxError> {
        match self {
            Levy::Rate(rate) => taxable_profit
                .checked_mul(*rate)
                .map(round_money)
                .ok_or(TaxError::Overflow("levy charge")),
            Levy::Amount(amount) => Ok(round_money(*amount)),
        }
    }
}

/// Accepted levy representations: `{"rate": 0.02}`, `{"amount": 5000}` or a bare number
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LevySpec {
    Rate {
        #[schemars(with = "f64")]
        rate: Decimal,
    },
    Amount {
        #[schemars(with = "f64")]
        amount: Decimal,
    },
    Bare(#[schemars(with = "f64")] Decimal),
}

impl From<LevySpec> for Levy {
    fn from(repr: LevySpec) -> Self {
        match repr {
            LevySpec::Rate { rate } => Levy::Rate(rate),
            LevySpec::Amount { amount } => Levy::Amount(amount),
            LevySpec::Bare(value) => Levy::classify(value),
        }
    }
}

/// Parses `0.02`, `rate:0.02` or `amount:5000`
impl FromStr for Levy {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaxError::InvalidLevy(s.to_string());
        match s.split_once(':') {
            Some((kind, value)) => {
                let value = parse_amount(value).map_err(|_| invalid())?;
                match kind.trim().to_lowercase().as_str() {
                    "rate" => Ok(Levy::Rate(value)),
                    "amount" => Ok(Levy::Amount(value)),
                    _ => Err(invalid()),
                }
            }
            None => parse_amount(s).map(Levy::classify).map_err(|_| invalid()),
        }
    }
}

/// A named levy as given on the command line, `NAME=VALUE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLevy {
    pub name: String,
    pub levy: Levy,
}

impl FromStr for NamedLevy {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| TaxError::InvalidLevy(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TaxError::InvalidLevy(s.to_string()));
        }
        let levy = value
            .parse()
            .map_err(|_| TaxError::InvalidLevy(s.to_string()))?;
        Ok(NamedLevy {
            name: name.to_string(),
            levy,
        })
    }
}

/// Computed charge for a single levy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevyCharge {
    pub name: String,
    pub basis: Levy,
    pub amount: Decimal,
}

/// Charge each levy against taxable profit, in name order
pub fn compute_levies(
    taxable_profit: Decimal,
    levies: &BTreeMap<String, Levy>,
) -> Result<Vec<LevyCharge>, TaxError> {
    levies
        .iter()
        .map(|(name, levy)| {
            let amount = levy.charge(taxable_profit)?;
            log::debug!("Levy {}: {:?} -> {}", name, levy, amount);
            Ok(LevyCharge {
                name: name.clone(),
                basis: *levy,
                amount,
            })
        })
        .collect()
}

pub fn total_levies(charges: &[LevyCharge]) -> Result<Decimal, TaxError> {
    charges
        .iter()
        .try_fold(Decimal::ZERO, |total, c| total.checked_add(c.amount))
        .map(round_money)
        .ok_or(TaxError::Overflow("total levies"))
}
