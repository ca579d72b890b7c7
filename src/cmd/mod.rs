pub mod cit;
pub mod compute;
pub mod explain;
pub mod paye;
pub mod schema;

use crate::engine::money::parse_amount;
use crate::engine::{ComputeRequest, TaxError};
use anyhow::Context;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a JSON compute request from a file (or stdin with "-")
pub fn read_request(path: &Path) -> anyhow::Result<ComputeRequest> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<ComputeRequest> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let request = serde_json::from_reader(reader)
        .with_context(|| format!("parsing compute request from {}", path.display()))?;
    Ok(request)
}

fn read_from_stdin() -> anyhow::Result<ComputeRequest> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe a JSON request to stdin.");
    }

    let request = serde_json::from_slice(&buffer).context("parsing compute request from stdin")?;
    Ok(request)
}

/// clap value parser for amounts, tolerating thousands separators
pub fn amount_arg(s: &str) -> Result<Decimal, TaxError> {
    parse_amount(s)
}
