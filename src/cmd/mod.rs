pub mod batch;
pub mod calculate;
pub mod deductions;
pub mod schema;
pub mod serve;

use anyhow::Context;
use clap::Args;
use incometax::policy::SqlitePolicyStore;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Location of the SQLite policy database
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// SQLite database file holding the deduction policy
    #[arg(long, env = "DATABASE_URL", default_value = "incometax.db", global = true)]
    database: PathBuf,
}

impl DatabaseArgs {
    pub fn open(&self) -> anyhow::Result<SqlitePolicyStore> {
        SqlitePolicyStore::open(&self.database).with_context(|| {
            format!("Failed to open policy database {}", self.database.display())
        })
    }
}

/// Read a whole input file into memory (or stdin with "-")
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        let stdin = io::stdin();
        BufReader::new(stdin.lock()).read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        BufReader::new(file).read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

fn format_baht(amount: Decimal) -> String {
    format!("฿{:.2}", amount)
}
