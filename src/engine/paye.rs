//! Progressive PAYE (personal income tax) computation

use super::money::{parse_amount, round_money};
use super::{InputField, TaxError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use taxng_derive::InputFields;

/// Upper limit of a tax band, as a cumulative amount of gross pay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandLimit {
    UpTo(Decimal),
    /// Catches all remaining pay
    Unbounded,
}

impl fmt::Display for BandLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandLimit::UpTo(limit) => write!(f, "{}", limit),
            BandLimit::Unbounded => write!(f, "inf"),
        }
    }
}

impl FromStr for BandLimit {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inf" | "infinity" | "unbounded" => Ok(BandLimit::Unbounded),
            _ => parse_amount(s).map(BandLimit::UpTo),
        }
    }
}

impl Serialize for BandLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BandLimit::UpTo(limit) => Serialize::serialize(limit, serializer),
            BandLimit::Unbounded => serializer.serialize_str("inf"),
        }
    }
}

/// Accepts a number, a numeric string, `"inf"` or null (unbounded)
fn deserialize_band_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BandLimit, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Amount(Decimal),
        Word(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(BandLimit::Unbounded),
        Some(Repr::Amount(limit)) => Ok(BandLimit::UpTo(limit)),
        Some(Repr::Word(word)) => word
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid band threshold '{}'", word))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, InputFields)]
pub struct TaxBand {
    /// Cumulative upper limit of the band; "inf" or null for the final band
    #[serde(deserialize_with = "deserialize_band_limit")]
    #[schemars(with = "Option<f64>")]
    pub threshold: BandLimit,
    /// Marginal rate for pay within the band
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

impl TaxBand {
    pub fn up_to(limit: Decimal, rate: Decimal) -> Self {
        TaxBand {
            threshold: BandLimit::UpTo(limit),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        TaxBand {
            threshold: BandLimit::Unbounded,
            rate,
        }
    }
}

/// Parses `LIMIT:RATE`, e.g. `300000:0.07` or `inf:0.24`
impl FromStr for TaxBand {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaxError::InvalidBand(s.to_string());
        let (limit, rate) = s.split_once(':').ok_or_else(invalid)?;
        Ok(TaxBand {
            threshold: limit.parse().map_err(|_| invalid())?,
            rate: parse_amount(rate).map_err(|_| invalid())?,
        })
    }
}

/// Statutory Nigerian PAYE schedule, as cumulative thresholds
pub fn statutory_bands() -> Vec<TaxBand> {
    vec![
        TaxBand::up_to(dec!(300000), dec!(0.07)),
        TaxBand::up_to(dec!(600000), dec!(0.11)),
        TaxBand::up_to(dec!(1100000), dec!(0.15)),
        TaxBand::up_to(dec!(1600000), dec!(0.19)),
        TaxBand::up_to(dec!(3200000), dec!(0.21)),
        TaxBand::unbounded(dec!(0.24)),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, InputFields)]
pub struct PayeInput {
    /// Gross pay for the period
    #[schemars(with = "f64")]
    pub gross_pay: Decimal,
    /// Tax bands in ascending threshold order (default none, i.e. no tax)
    #[serde(default)]
    pub bands: Vec<TaxBand>,
    /// Relief deducted from the computed tax (default 0)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub personal_relief: Decimal,
}

impl PayeInput {
    pub fn new(gross_pay: Decimal, bands: Vec<TaxBand>) -> Self {
        PayeInput {
            gross_pay,
            bands,
            personal_relief: Decimal::ZERO,
        }
    }

    /// Thresholds must strictly ascend, and only the last band may be unbounded
    pub fn validate(&self) -> Result<(), TaxError> {
        let mut previous: Option<Decimal> = None;
        for (i, band) in self.bands.iter().enumerate() {
            let position = i + 1;
            match band.threshold {
                BandLimit::Unbounded if position != self.bands.len() => {
                    return Err(TaxError::UnboundedBandNotLast { position });
                }
                BandLimit::Unbounded => {}
                BandLimit::UpTo(threshold) => {
                    if let Some(previous) = previous {
                        if threshold <= previous {
                            return Err(TaxError::UnsortedBands {
                                position,
                                threshold,
                                previous,
                            });
                        }
                    }
                    previous = Some(threshold);
                }
            }
        }
        Ok(())
    }
}

/// Tax charged within a single band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandTax {
    pub threshold: BandLimit,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub band_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayeReport {
    pub gross_pay: Decimal,
    pub tax_before_relief: Decimal,
    pub personal_relief: Decimal,
    pub tax_payable: Decimal,
    pub bands: Vec<BandTax>,
}

/// Slice gross pay across the bands and apply personal relief.
///
/// Bands after the one that exhausts the pay are not listed. Pay above the last
/// bounded band is untaxed unless an unbounded band is given.
pub fn compute_paye(input: &PayeInput) -> Result<PayeReport, TaxError> {
    input.validate()?;

    let gross = input.gross_pay.max(Decimal::ZERO);
    let mut remaining = gross;
    let mut previous_threshold = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut bands = Vec::new();

    for band in &input.bands {
        let taxable = match band.threshold {
            BandLimit::UpTo(limit) => remaining.min(
                limit
                    .checked_sub(previous_threshold)
                    .ok_or(TaxError::Overflow("band width"))?,
            ),
            BandLimit::Unbounded => remaining,
        }
        .max(Decimal::ZERO);

        let band_tax = taxable
            .checked_mul(band.rate)
            .map(round_money)
            .ok_or(TaxError::Overflow("band tax"))?;
        log::debug!(
            "PAYE band up to {} @ {}: taxable={}, tax={}",
            band.threshold,
            band.rate,
            taxable,
            band_tax
        );

        total_tax = total_tax
            .checked_add(band_tax)
            .ok_or(TaxError::Overflow("PAYE before relief"))?;
        remaining -= taxable;
        if let BandLimit::UpTo(limit) = band.threshold {
            previous_threshold = limit;
        }
        bands.push(BandTax {
            threshold: band.threshold,
            rate: band.rate,
            taxable_amount: round_money(taxable),
            band_tax,
        });

        if remaining <= Decimal::ZERO {
            break;
        }
    }

    if remaining > Decimal::ZERO && !input.bands.is_empty() {
        log::warn!("{} of gross pay falls above the last tax band and is untaxed", remaining);
    }

    let tax_payable = total_tax
        .checked_sub(input.personal_relief)
        .map(|tax| round_money(tax.max(Decimal::ZERO)))
        .ok_or(TaxError::Overflow("PAYE after relief"))?;

    Ok(PayeReport {
        gross_pay: round_money(gross),
        tax_before_relief: round_money(total_tax),
        personal_relief: round_money(input.personal_relief),
        tax_payable,
        bands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bands() -> Vec<TaxBand> {
        vec![
            TaxBand::up_to(dec!(300000), dec!(0.07)),
            TaxBand::unbounded(dec!(0.11)),
        ]
    }

    #[test]
    fn two_band_example_with_relief() {
        let input = PayeInput {
            personal_relief: dec!(5000),
            ..PayeInput::new(dec!(500000), two_bands())
        };
        let report = compute_paye(&input).unwrap();

        assert_eq!(report.bands.len(), 2);
        assert_eq!(report.bands[0].taxable_amount, dec!(300000));
        assert_eq!(report.bands[0].band_tax, dec!(21000));
        assert_eq!(report.bands[1].taxable_amount, dec!(200000));
        assert_eq!(report.bands[1].band_tax, dec!(22000));
        assert_eq!(report.tax_before_relief, dec!(43000));
        assert_eq!(report.personal_relief, dec!(5000));
        assert_eq!(report.tax_payable, dec!(38000));
    }

    #[test]
    fn slicing_is_exhaustive() {
        let report = compute_paye(&PayeInput::new(dec!(4567890.12), statutory_bands())).unwrap();

        let sliced: Decimal = report.bands.iter().map(|b| b.taxable_amount).sum();
        assert_eq!(sliced, dec!(4567890.12));
        assert_eq!(report.bands.len(), 6);

        let band_tax: Decimal = report.bands.iter().map(|b| b.band_tax).sum();
        assert_eq!(report.tax_before_relief, band_tax);
        assert_eq!(report.tax_payable, band_tax);
    }

    #[test]
    fn statutory_schedule_top_band() {
        // 21000 + 33000 + 75000 + 95000 + 336000 + 24% of 800000
        let report = compute_paye(&PayeInput::new(dec!(4000000), statutory_bands())).unwrap();
        assert_eq!(report.tax_before_relief, dec!(752000));
        assert_eq!(report.bands[5].taxable_amount, dec!(800000));
    }

    #[test]
    fn stops_after_band_that_exhausts_pay() {
        let report = compute_paye(&PayeInput::new(dec!(450000), statutory_bands())).unwrap();

        assert_eq!(report.bands.len(), 2);
        assert_eq!(report.bands[1].taxable_amount, dec!(150000));
        assert_eq!(report.bands[1].band_tax, dec!(16500));
        assert_eq!(report.tax_before_relief, dec!(37500));
    }

    #[test]
    fn pay_on_threshold_boundary() {
        let report = compute_paye(&PayeInput::new(dec!(300000), two_bands())).unwrap();
        assert_eq!(report.bands.len(), 1);
        assert_eq!(report.tax_before_relief, dec!(21000));
    }

    #[test]
    fn zero_pay_lists_first_band_only() {
        let report = compute_paye(&PayeInput::new(dec!(0), two_bands())).unwrap();
        assert_eq!(report.bands.len(), 1);
        assert_eq!(report.bands[0].taxable_amount, Decimal::ZERO);
        assert_eq!(report.tax_payable, Decimal::ZERO);
    }

    #[test]
    fn negative_pay_is_clamped() {
        let report = compute_paye(&PayeInput::new(dec!(-1000), two_bands())).unwrap();
        assert_eq!(report.gross_pay, Decimal::ZERO);
        assert_eq!(report.tax_payable, Decimal::ZERO);
    }

    #[test]
    fn relief_cannot_make_tax_negative() {
        let input = PayeInput {
            personal_relief: dec!(50000),
            ..PayeInput::new(dec!(100000), two_bands())
        };
        let report = compute_paye(&input).unwrap();
        assert_eq!(report.tax_before_relief, dec!(7000));
        assert_eq!(report.tax_payable, Decimal::ZERO);
    }

    #[test]
    fn pay_above_last_bounded_band_is_untaxed() {
        let bands = vec![TaxBand::up_to(dec!(100000), dec!(0.10))];
        let report = compute_paye(&PayeInput::new(dec!(250000), bands)).unwrap();
        assert_eq!(report.bands[0].taxable_amount, dec!(100000));
        assert_eq!(report.tax_before_relief, dec!(10000));
    }

    #[test]
    fn no_bands_no_tax() {
        let report = compute_paye(&PayeInput::new(dec!(250000), vec![])).unwrap();
        assert!(report.bands.is_empty());
        assert_eq!(report.tax_payable, Decimal::ZERO);
    }

    #[test]
    fn unsorted_bands_rejected() {
        let bands = vec![
            TaxBand::up_to(dec!(600000), dec!(0.11)),
            TaxBand::up_to(dec!(300000), dec!(0.07)),
        ];
        assert_eq!(
            compute_paye(&PayeInput::new(dec!(500000), bands)),
            Err(TaxError::UnsortedBands {
                position: 2,
                threshold: dec!(300000),
                previous: dec!(600000),
            })
        );
    }

    #[test]
    fn duplicate_thresholds_rejected() {
        let bands = vec![
            TaxBand::up_to(dec!(300000), dec!(0.07)),
            TaxBand::up_to(dec!(300000), dec!(0.11)),
        ];
        assert!(matches!(
            PayeInput::new(dec!(1), bands).validate(),
            Err(TaxError::UnsortedBands { position: 2, .. })
        ));
    }

    #[test]
    fn unbounded_band_must_be_last() {
        let bands = vec![
            TaxBand::unbounded(dec!(0.24)),
            TaxBand::up_to(dec!(300000), dec!(0.07)),
        ];
        assert_eq!(
            compute_paye(&PayeInput::new(dec!(500000), bands)),
            Err(TaxError::UnboundedBandNotLast { position: 1 })
        );
    }

    #[test]
    fn parse_band_arguments() {
        assert_eq!(
            "300000:0.07".parse::<TaxBand>().unwrap(),
            TaxBand::up_to(dec!(300000), dec!(0.07))
        );
        assert_eq!(
            "inf:0.24".parse::<TaxBand>().unwrap(),
            TaxBand::unbounded(dec!(0.24))
        );
        assert_eq!(
            "1,100,000:0.15".parse::<TaxBand>().unwrap(),
            TaxBand::up_to(dec!(1100000), dec!(0.15))
        );
        assert_eq!(
            "300000".parse::<TaxBand>(),
            Err(TaxError::InvalidBand("300000".to_string()))
        );
        assert!("lots:0.1".parse::<TaxBand>().is_err());
    }

    #[test]
    fn deserialize_band_thresholds() {
        let bands: Vec<TaxBand> = serde_json::from_str(
            r#"[
                {"threshold": 300000, "rate": 0.07},
                {"threshold": "600000", "rate": 0.11},
                {"threshold": "inf", "rate": 0.15},
                {"threshold": null, "rate": 0.19}
            ]"#,
        )
        .unwrap();

        assert_eq!(bands[0].threshold, BandLimit::UpTo(dec!(300000)));
        assert_eq!(bands[1].threshold, BandLimit::UpTo(dec!(600000)));
        assert_eq!(bands[2].threshold, BandLimit::Unbounded);
        assert_eq!(bands[3].threshold, BandLimit::Unbounded);

        let invalid = serde_json::from_str::<TaxBand>(r#"{"threshold": "lots", "rate": 0.1}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn deserialize_requires_threshold() {
        let result = serde_json::from_str::<Vec<TaxBand>>(r#"[{"rate": 0.1}]"#);
        assert!(result.is_err());

        let fields = TaxBand::input_fields();
        assert_eq!(fields[0].name, "threshold");
        assert!(fields[0].required);
    }

    #[test]
    fn serialize_thresholds() {
        let json = serde_json::to_string(&BandLimit::Unbounded).unwrap();
        assert_eq!(json, r#""inf""#);

        let json = serde_json::to_string(&BandLimit::UpTo(dec!(300000))).unwrap();
        assert_eq!(json, r#""300000""#);

        let band = serde_json::to_value(TaxBand::up_to(dec!(300000), dec!(0.07))).unwrap();
        assert_eq!(band["threshold"], "300000");
        assert_eq!(band["rate"], "0.07");
    }

    #[test]
    fn report_serializes_band_thresholds() {
        let report = compute_paye(&PayeInput::new(dec!(500000), two_bands())).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["bands"][0]["threshold"], "300000");
        assert_eq!(json["bands"][1]["threshold"], "inf");
        assert_eq!(json["tax_payable"], "43000.00");
    }

    #[test]
    fn overflow_is_an_error() {
        let bands = vec![TaxBand::unbounded(dec!(10))];
        assert_eq!(
            compute_paye(&PayeInput::new(Decimal::MAX, bands)),
            Err(TaxError::Overflow("band tax"))
        );

        let bands = vec![
            TaxBand::up_to(Decimal::MIN, dec!(0.1)),
            TaxBand::up_to(Decimal::MAX, dec!(0.1)),
        ];
        assert_eq!(
            compute_paye(&PayeInput::new(dec!(100), bands)),
            Err(TaxError::Overflow("band width"))
        );
    }

    #[test]
    fn deserialize_requires_gross_pay() {
        let result = serde_json::from_str::<PayeInput>(r#"{"personal_relief": 200}"#);
        assert!(result.is_err());
    }
}
