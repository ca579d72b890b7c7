//! Full tax computation: CIT line items, capital schedule, levies and optional PAYE

use super::cit::{compute_line_items, CitInput, CitLineItems};
use super::levy::{compute_levies, total_levies, LevyCharge};
use super::money::round_money;
use super::paye::{compute_paye, PayeInput, PayeReport};
use super::twdv::{compute_twdv, TwdvSchedule};
use super::TaxError;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request payload: CIT fields at the top level, PAYE nested under `paye`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComputeRequest {
    #[serde(flatten)]
    pub cit: CitInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paye: Option<PayeInput>,
}

impl ComputeRequest {
    pub fn compute(&self) -> Result<TaxComputation, TaxError> {
        compute_full_tax(&self.cit, self.paye.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total_levies: Decimal,
    pub total_tax_payable: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxComputation {
    pub inputs: CitInput,
    pub line_items: CitLineItems,
    pub twdv: TwdvSchedule,
    pub levies: Vec<LevyCharge>,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paye: Option<PayeReport>,
}

/// Run every CIT step and, when PAYE inputs are given, the PAYE computation.
///
/// Fails as a whole: no partial result is returned.
pub fn compute_full_tax(
    cit: &CitInput,
    paye: Option<&PayeInput>,
) -> Result<TaxComputation, TaxError> {
    let line_items = compute_line_items(cit)?;
    let levies = compute_levies(line_items.taxable_profit, &cit.levies)?;
    let total_levies = total_levies(&levies)?;
    let total_tax_payable = line_items
        .tax_payable_before_levies
        .checked_add(total_levies)
        .map(round_money)
        .ok_or(TaxError::Overflow("total tax payable"))?;
    let twdv = compute_twdv(cit)?;
    let paye = paye.map(compute_paye).transpose()?;

    log::info!(
        "Total tax payable {} {} (levies {})",
        cit.currency,
        total_tax_payable,
        total_levies
    );

    Ok(TaxComputation {
        inputs: cit.clone(),
        line_items,
        twdv,
        levies,
        totals: Totals {
            total_levies,
            total_tax_payable,
        },
        paye,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cit::TaxBasis;
    use crate::engine::levy::Levy;
    use crate::engine::paye::TaxBand;
    use rust_decimal_macros::dec;

    #[test]
    fn full_computation_without_paye() {
        let result = compute_full_tax(&CitInput::new(dec!(1000000)), None).unwrap();

        assert_eq!(result.line_items.standard_cit, dec!(300000));
        assert_eq!(result.line_items.minimum_tax, dec!(10000));
        assert_eq!(result.line_items.tax_payable_before_levies, dec!(300000));
        assert!(result.levies.is_empty());
        assert_eq!(result.totals.total_levies, Decimal::ZERO);
        assert_eq!(result.totals.total_tax_payable, dec!(300000));
        assert!(result.paye.is_none());
    }

    #[test]
    fn full_computation_with_levy() {
        let mut input = CitInput::new(dec!(1000000));
        input
            .levies
            .insert("edu_levy".to_string(), Levy::Rate(dec!(0.02)));
        let result = compute_full_tax(&input, None).unwrap();

        assert_eq!(result.levies.len(), 1);
        assert_eq!(result.levies[0].amount, dec!(20000));
        assert_eq!(result.totals.total_levies, dec!(20000));
        assert_eq!(result.totals.total_tax_payable, dec!(320000));
    }

    #[test]
    fn levies_add_to_minimum_tax() {
        let mut input = CitInput {
            capital_allowance: dec!(9900000),
            ..CitInput::new(dec!(10000000))
        };
        input
            .levies
            .insert("stamp".to_string(), Levy::Amount(dec!(2500)));
        let result = compute_full_tax(&input, None).unwrap();

        assert_eq!(result.line_items.basis, TaxBasis::Minimum);
        assert_eq!(result.totals.total_tax_payable, dec!(102500));
    }

    #[test]
    fn full_computation_with_paye() {
        let paye = PayeInput {
            personal_relief: dec!(5000),
            ..PayeInput::new(
                dec!(500000),
                vec![
                    TaxBand::up_to(dec!(300000), dec!(0.07)),
                    TaxBand::unbounded(dec!(0.11)),
                ],
            )
        };
        let result = compute_full_tax(&CitInput::new(dec!(1000000)), Some(&paye)).unwrap();

        let paye = result.paye.unwrap();
        assert_eq!(paye.tax_before_relief, dec!(43000));
        assert_eq!(paye.tax_payable, dec!(38000));
        // PAYE is reported alongside, not added to CIT
        assert_eq!(result.totals.total_tax_payable, dec!(300000));
    }

    #[test]
    fn invalid_paye_fails_whole_call() {
        let paye = PayeInput::new(
            dec!(500000),
            vec![
                TaxBand::unbounded(dec!(0.11)),
                TaxBand::up_to(dec!(300000), dec!(0.07)),
            ],
        );
        let result = compute_full_tax(&CitInput::new(dec!(1000000)), Some(&paye));
        assert_eq!(result, Err(TaxError::UnboundedBandNotLast { position: 1 }));
    }

    #[test]
    fn overflow_fails_whole_call() {
        let request: ComputeRequest = serde_json::from_str(
            r#"{"profit_before_tax": 50000000000000000000000000000, "minimum_tax_rate": 2}"#,
        )
        .unwrap();
        assert_eq!(request.compute(), Err(TaxError::Overflow("minimum tax")));

        let mut input = CitInput::new(dec!(1000000));
        input
            .levies
            .insert("stamp".to_string(), Levy::Amount(Decimal::MAX));
        assert_eq!(
            compute_full_tax(&input, None),
            Err(TaxError::Overflow("total tax payable"))
        );
    }

    #[test]
    fn repeated_computation_is_identical() {
        let request: ComputeRequest = serde_json::from_str(
            r#"{
                "profit_before_tax": 25000000,
                "capital_allowance": 3000000,
                "levies": {"edu_levy": 0.025, "nitda": {"amount": 150000}},
                "opening_twdv": 8000000,
                "additions": 2000000,
                "paye": {"gross_pay": 2400000, "bands": [{"threshold": 300000, "rate": 0.07}, {"threshold": "inf", "rate": 0.11}]}
            }"#,
        )
        .unwrap();

        let first = serde_json::to_string(&request.compute().unwrap()).unwrap();
        let second = serde_json::to_string(&request.compute().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn request_payload_round_trip_shape() {
        let request: ComputeRequest =
            serde_json::from_str(r#"{"profit_before_tax": 1000000, "levies": {"edu_levy": 0.02}}"#)
                .unwrap();
        let result = serde_json::to_value(request.compute().unwrap()).unwrap();

        assert_eq!(result["line_items"]["tax_payable_before_levies"], "300000.00");
        assert_eq!(result["line_items"]["basis"], "standard");
        assert_eq!(result["levies"][0]["name"], "edu_levy");
        assert_eq!(result["levies"][0]["amount"], "20000.00");
        assert_eq!(result["totals"]["total_tax_payable"], "320000.00");
        assert_eq!(result["inputs"]["currency"], "NGN");
        assert!(result.get("paye").is_none());
    }

    #[test]
    fn request_requires_profit() {
        let result = serde_json::from_str::<ComputeRequest>(r#"{"paye": {"gross_pay": 100}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_requires_gross_pay_when_paye_given() {
        let result = serde_json::from_str::<ComputeRequest>(
            r#"{"profit_before_tax": 100, "paye": {"bands": []}}"#,
        );
        assert!(result.is_err());
    }
}
