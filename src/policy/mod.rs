//! Deduction policy and the store that persists it

pub mod sqlite;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use sqlite::SqlitePolicyStore;

/// Deduction parameters read on every calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionPolicy {
    /// Flat deduction every taxpayer receives
    pub personal_deduction: Decimal,
    /// Upper limit on each capped allowance kind (donation, k-receipt)
    pub capped_deduction_ceiling: Decimal,
}

impl DeductionPolicy {
    pub const DEFAULT_PERSONAL_DEDUCTION: Decimal = dec!(60000);
    pub const DEFAULT_CAPPED_DEDUCTION_CEILING: Decimal = dec!(50000);
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        DeductionPolicy {
            personal_deduction: Self::DEFAULT_PERSONAL_DEDUCTION,
            capped_deduction_ceiling: Self::DEFAULT_CAPPED_DEDUCTION_CEILING,
        }
    }
}

/// Named rows held by a policy store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySetting {
    Personal,
    KReceipt,
}

impl PolicySetting {
    pub const ALL: [PolicySetting; 2] = [PolicySetting::Personal, PolicySetting::KReceipt];

    pub fn key(&self) -> &'static str {
        match self {
            PolicySetting::Personal => "personal",
            PolicySetting::KReceipt => "k-receipt",
        }
    }

    pub fn default_amount(&self) -> Decimal {
        match self {
            PolicySetting::Personal => DeductionPolicy::DEFAULT_PERSONAL_DEDUCTION,
            PolicySetting::KReceipt => DeductionPolicy::DEFAULT_CAPPED_DEDUCTION_CEILING,
        }
    }
}

impl std::fmt::Display for PolicySetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("policy store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
    #[error("policy setting not found: {0}")]
    MissingSetting(PolicySetting),
    #[error("policy setting {setting} holds a non-decimal amount: {value}")]
    InvalidAmount {
        setting: PolicySetting,
        value: String,
    },
    #[error("policy store lock poisoned")]
    Poisoned,
}

/// Source of the current deduction policy.
///
/// Each call is a single read or a single update-returning-value; the
/// backing store is responsible for its atomicity.
pub trait PolicyStore: Send + Sync {
    fn personal_deduction(&self) -> Result<Decimal, StoreError>;

    fn capped_deduction_ceiling(&self) -> Result<Decimal, StoreError>;

    /// Returns the amount now held by the store
    fn set_personal_deduction(&self, amount: Decimal) -> Result<Decimal, StoreError>;

    /// Returns the amount now held by the store
    fn set_capped_deduction_ceiling(&self, amount: Decimal) -> Result<Decimal, StoreError>;

    fn policy(&self) -> Result<DeductionPolicy, StoreError> {
        Ok(DeductionPolicy {
            personal_deduction: self.personal_deduction()?,
            capped_deduction_ceiling: self.capped_deduction_ceiling()?,
        })
    }
}
