//! Calculate command - tax for a single JSON request

use super::{format_baht, read_input, DatabaseArgs};
use anyhow::Context;
use clap::Args;
use incometax::request::{self, CalculationRequest, CalculationResponse};
use incometax::tax::BRACKETS;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON calculation request. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    database: DatabaseArgs,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = read_input(&self.file)?;
        let payload: CalculationRequest =
            serde_json::from_slice(&input).context("Failed to parse calculation request")?;
        let store = self.database.open()?;
        let response = request::calculate(&store, &payload)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_response(&response);
        }
        Ok(())
    }
}

fn print_response(response: &CalculationResponse) {
    let rows: Vec<LevelRow> = response
        .tax_level
        .iter()
        .zip(BRACKETS.iter())
        .map(|(level, bracket)| LevelRow {
            level: level.level.clone(),
            rate: format!("{}%", bracket.rate_pct()),
            tax: format_baht(level.tax),
        })
        .collect();

    println!();
    println!("TAX BY BRACKET");
    println!();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
    println!("Tax payable:  {}", format_baht(response.tax));
    if let Some(refund) = response.tax_refund {
        println!("Tax refund:   {}", format_baht(refund));
    }
}

#[derive(Debug, Clone, Tabled)]
struct LevelRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Tax")]
    tax: String,
}
