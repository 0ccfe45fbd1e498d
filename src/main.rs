use clap::{Parser, Subcommand};

mod cmd;

use cmd::{
    batch::BatchCommand, calculate::CalculateCommand, deductions::DeductionsCommand,
    schema::SchemaCommand, serve::ServeCommand,
};

#[derive(Parser, Debug)]
#[command(name = "incometax", version, about = "Progressive personal income tax calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),
    /// Calculate tax for a single JSON request
    Calculate(CalculateCommand),
    /// Calculate tax for every row of a CSV tax file
    Batch(BatchCommand),
    /// Show or update the stored deduction policy
    Deductions(DeductionsCommand),
    /// Print the expected input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(serve) => serve.exec(),
        Command::Calculate(calculate) => calculate.exec(),
        Command::Batch(batch) => batch.exec(),
        Command::Deductions(deductions) => deductions.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
