pub mod cit;
pub mod computation;
pub mod error;
pub mod levy;
pub mod money;
pub mod paye;
pub mod twdv;

// Flat public surface for domain types and functions.
pub use cit::{compute_company_income_tax, CitInput, CitSummary, DEFAULT_STATUTORY_RATE};
pub use computation::{compute_full_tax, ComputeRequest, TaxComputation};
pub use error::TaxError;
pub use levy::{Levy, NamedLevy};
pub use paye::{compute_paye, statutory_bands, PayeInput, PayeReport, TaxBand};

/// Description of one input field, generated by `#[derive(InputFields)]`
#[derive(Debug, Clone, Copy)]
pub struct InputField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}
