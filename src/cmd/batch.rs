//! Batch command - tax for every row of a CSV tax file

use super::{format_baht, read_input, DatabaseArgs};
use clap::Args;
use incometax::request::{self, BatchEntry, BatchResponse};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file with totalIncome,wht,donation columns. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    database: DatabaseArgs,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = read_input(&self.file)?;
        let store = self.database.open()?;
        let taxes = request::calculate_batch(&store, input.as_slice())?;

        if self.json {
            let output = BatchResponse { taxes };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_entries(&taxes);
        }
        Ok(())
    }
}

fn print_entries(entries: &[BatchEntry]) {
    if entries.is_empty() {
        println!("No rows found in tax file");
        return;
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| EntryRow {
            row: i + 1,
            total_income: format_baht(e.total_income),
            tax: format_baht(e.tax),
            refund: e.tax_refund.map(format_baht).unwrap_or_default(),
        })
        .collect();

    println!();
    println!("BATCH RESULTS");
    println!();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

#[derive(Debug, Clone, Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    row: usize,
    #[tabled(rename = "Total Income")]
    total_income: String,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Refund")]
    refund: String,
}
