//! Tax written down value of capital assets

use super::cit::CitInput;
use super::money::round_money;
use super::TaxError;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwdvSchedule {
    pub opening_twdv: Decimal,
    pub additions: Decimal,
    pub disposals: Decimal,
    pub wear_and_tear_rate: Decimal,
    pub wear_and_tear_charge: Decimal,
    pub closing_twdv: Decimal,
}

/// Roll the capital pool forward: opening + additions - disposals, less wear and tear.
///
/// The closing value is not floored, so disposals exceeding the pool give a negative value.
pub fn compute_twdv(input: &CitInput) -> Result<TwdvSchedule, TaxError> {
    let pre_wear = input
        .opening_twdv
        .checked_add(input.additions)
        .and_then(|pool| pool.checked_sub(input.disposals))
        .ok_or(TaxError::Overflow("pre-wear TWDV"))?;
    if pre_wear < Decimal::ZERO {
        log::warn!(
            "Disposals {} exceed opening TWDV {} plus additions {}; closing TWDV will be negative",
            input.disposals,
            input.opening_twdv,
            input.additions
        );
    }
    let wear_and_tear_charge = pre_wear
        .checked_mul(input.wear_and_tear_rate)
        .map(round_money)
        .ok_or(TaxError::Overflow("wear and tear charge"))?;
    let closing_twdv = pre_wear
        .checked_sub(wear_and_tear_charge)
        .map(round_money)
        .ok_or(TaxError::Overflow("closing TWDV"))?;

    log::debug!(
        "TWDV pre-wear={}, wear={}, closing={}",
        pre_wear,
        wear_and_tear_charge,
        closing_twdv
    );

    Ok(TwdvSchedule {
        opening_twdv: round_money(input.opening_twdv),
        additions: round_money(input.additions),
        disposals: round_money(input.disposals),
        wear_and_tear_rate: input.wear_and_tear_rate,
        wear_and_tear_charge,
        closing_twdv,
    })
}
