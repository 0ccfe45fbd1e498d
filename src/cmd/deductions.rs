//! Deductions command - inspect or update the stored deduction policy

use super::{format_baht, DatabaseArgs};
use clap::{Args, Subcommand};
use incometax::policy::PolicyStore;
use incometax::request::{self, DeductionSetting};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DeductionsCommand {
    #[command(subcommand)]
    action: DeductionsAction,

    #[command(flatten)]
    database: DatabaseArgs,

    /// Output as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum DeductionsAction {
    /// Show the current deduction policy
    Show,
    /// Set the personal deduction (10,000 to 100,000)
    Personal {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Set the ceiling for donation and k-receipt allowances (up to 100,000)
    KReceipt {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyOutput {
    #[serde(with = "rust_decimal::serde::float")]
    personal_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    capped_deduction: Decimal,
}

impl DeductionsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = self.database.open()?;
        match &self.action {
            DeductionsAction::Show => {
                let policy = store.policy()?;
                let output = PolicyOutput {
                    personal_deduction: policy.personal_deduction,
                    capped_deduction: policy.capped_deduction_ceiling,
                };
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    print_policy(&output);
                }
            }
            DeductionsAction::Personal { amount } => {
                let response =
                    request::update_personal_deduction(&store, &DeductionSetting::new(*amount))?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    println!(
                        "Personal deduction set to {}",
                        format_baht(response.personal_deduction)
                    );
                }
            }
            DeductionsAction::KReceipt { amount } => {
                let response = request::update_capped_deduction_ceiling(
                    &store,
                    &DeductionSetting::new(*amount),
                )?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    println!(
                        "K-receipt deduction ceiling set to {}",
                        format_baht(response.capped_deduction)
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_policy(policy: &PolicyOutput) {
    let rows = vec![
        SettingRow {
            setting: "Personal deduction".to_string(),
            amount: format_baht(policy.personal_deduction),
        },
        SettingRow {
            setting: "Donation / k-receipt ceiling".to_string(),
            amount: format_baht(policy.capped_deduction),
        },
    ];

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

#[derive(Debug, Clone, Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Amount")]
    amount: String,
}
