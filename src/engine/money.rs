use super::TaxError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Decimal places kept on every monetary value
pub const MONEY_DP: u32 = 2;

/// Round to two decimal places with a fixed scale, so values always render as `N.NN`
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(MONEY_DP);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Parse a user supplied amount, e.g. `10,000,000`, ` 0.30 ` or `1e6`
pub fn parse_amount(input: &str) -> Result<Decimal, TaxError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(TaxError::InvalidAmount(input.to_string()));
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| TaxError::InvalidAmount(input.to_string()))
}

/// Format with thousands separators, keeping the decimal's own fractional digits
pub fn format_amount(amount: Decimal) -> String {
    let digits = amount.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Rate as a percentage for display, e.g. `0.075` -> `7.5%`
pub fn format_rate(rate: Decimal) -> String {
    match rate.checked_mul(Decimal::ONE_HUNDRED) {
        Some(percent) => format!("{}%", percent.normalize()),
        None => rate.to_string(),
    }
}
