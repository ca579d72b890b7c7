use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("invalid tax band '{0}': expected LIMIT:RATE (e.g. 300000:0.07 or inf:0.24)")]
    InvalidBand(String),
    #[error("invalid levy '{0}': expected NAME=VALUE, NAME=rate:VALUE or NAME=amount:VALUE")]
    InvalidLevy(String),
    #[error("tax band {position} threshold {threshold} must exceed the previous threshold {previous}")]
    UnsortedBands {
        position: usize,
        threshold: Decimal,
        previous: Decimal,
    },
    #[error("unbounded tax band at position {position} must be the last band")]
    UnboundedBandNotLast { position: usize },
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}
