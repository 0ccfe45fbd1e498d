use super::{PolicySetting, PolicyStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

/// Policy store backed by a SQLite `deductions_setting` table.
///
/// Amounts are stored as decimal text so values round-trip exactly.
pub struct SqlitePolicyStore {
    db: Mutex<Connection>,
}

impl SqlitePolicyStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS deductions_setting (
            allowance_type TEXT PRIMARY KEY,
            amount TEXT NOT NULL
        );
    ";

    /// Open or create the policy database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Connection::open(path.as_ref())?;
        Self::initialize(db)
    }

    /// Open an in-memory policy store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Connection::open_in_memory()?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self, StoreError> {
        db.execute_batch(Self::SCHEMA)?;
        for setting in PolicySetting::ALL {
            db.execute(
                "INSERT OR IGNORE INTO deductions_setting (allowance_type, amount)
                 VALUES (?1, ?2)",
                params![setting.key(), setting.default_amount().to_string()],
            )?;
        }
        Ok(Self { db: Mutex::new(db) })
    }

    fn get(&self, setting: PolicySetting) -> Result<Decimal, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        let amount: Option<String> = db
            .query_row(
                "SELECT amount FROM deductions_setting WHERE allowance_type = ?1",
                params![setting.key()],
                |row| row.get(0),
            )
            .optional()?;
        let amount = amount.ok_or(StoreError::MissingSetting(setting))?;
        parse_amount(setting, amount)
    }

    fn set(&self, setting: PolicySetting, amount: Decimal) -> Result<Decimal, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        let stored: Option<String> = db
            .query_row(
                "UPDATE deductions_setting SET amount = ?1 WHERE allowance_type = ?2
                 RETURNING amount",
                params![amount.to_string(), setting.key()],
                |row| row.get(0),
            )
            .optional()?;
        let stored = stored.ok_or(StoreError::MissingSetting(setting))?;
        log::info!("Deduction setting {} updated to {}", setting, stored);
        parse_amount(setting, stored)
    }
}

fn parse_amount(setting: PolicySetting, value: String) -> Result<Decimal, StoreError> {
    Decimal::from_str(&value).map_err(|_| StoreError::InvalidAmount { setting, value })
}

impl PolicyStore for SqlitePolicyStore {
    fn personal_deduction(&self) -> Result<Decimal, StoreError> {
        self.get(PolicySetting::Personal)
    }

    fn capped_deduction_ceiling(&self) -> Result<Decimal, StoreError> {
        self.get(PolicySetting::KReceipt)
    }

    fn set_personal_deduction(&self, amount: Decimal) -> Result<Decimal, StoreError> {
        self.set(PolicySetting::Personal, amount)
    }

    fn set_capped_deduction_ceiling(&self, amount: Decimal) -> Result<Decimal, StoreError> {
        self.set(PolicySetting::KReceipt, amount)
    }
}
