use clap::{Parser, Subcommand};

mod cmd;
mod engine;

/// Nigerian Company Income Tax and PAYE calculator
#[derive(Parser, Debug)]
#[command(name = "taxng", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Single-rate company income tax from profit, allowance and losses
    Cit(cmd::cit::CitCommand),
    /// Full computation (CIT, capital allowances, levies, PAYE) from a JSON request
    Compute(cmd::compute::ComputeCommand),
    /// Progressive PAYE on gross pay
    Paye(cmd::paye::PayeCommand),
    /// One-line summary from raw form values
    Explain(cmd::explain::FormFields),
    /// Print the expected compute request format
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Cit(cit) => cit.exec(),
        Command::Compute(compute) => compute.exec(),
        Command::Paye(paye) => paye.exec(),
        Command::Explain(form) => form.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
