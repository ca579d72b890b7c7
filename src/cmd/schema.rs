//! Schema command - print the expected compute request format

use crate::engine::{CitInput, ComputeRequest, InputField, PayeInput, TaxBand};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the compute request
    JsonSchema,
    /// Field descriptions for the compute request
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Fields => {
                self.print_fields();
                Ok(())
            }
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(ComputeRequest);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_fields(&self) {
        println!("Compute Request Format");
        println!("======================");
        print_section("Company income tax (top level)", CitInput::input_fields());
        print_section("PAYE (under \"paye\", optional)", PayeInput::input_fields());
        print_section("Tax band (each entry of \"paye.bands\")", TaxBand::input_fields());
        println!();
        println!("Rates are fractions, e.g. 0.30 for 30%.");
    }
}

fn print_section(title: &str, fields: &[InputField]) {
    println!();
    println!("{}", title);
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("  {:20} ({:8})  {}", field.name, req, field.description);
    }
}
