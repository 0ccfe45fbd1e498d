use super::brackets::{round_money, BRACKETS};
use crate::policy::DeductionPolicy;
use rust_decimal::Decimal;

/// Allowance categories a taxpayer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowanceKind {
    Donation,
    KReceipt,
    /// Implicit in every calculation, supplied by the deduction policy
    Personal,
}

impl AllowanceKind {
    /// Kinds whose claimable total is limited by the policy ceiling
    pub const CAPPED: [AllowanceKind; 2] = [AllowanceKind::Donation, AllowanceKind::KReceipt];

    pub fn from_wire(s: &str) -> Option<AllowanceKind> {
        match s {
            "donation" => Some(AllowanceKind::Donation),
            "k-receipt" => Some(AllowanceKind::KReceipt),
            "personal" => Some(AllowanceKind::Personal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllowanceKind::Donation => "donation",
            AllowanceKind::KReceipt => "k-receipt",
            AllowanceKind::Personal => "personal",
        }
    }

    pub fn is_capped(&self) -> bool {
        Self::CAPPED.contains(self)
    }
}

impl std::fmt::Display for AllowanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowance {
    pub kind: AllowanceKind,
    pub amount: Decimal,
}

impl Allowance {
    pub fn new(kind: AllowanceKind, amount: Decimal) -> Self {
        Allowance { kind, amount }
    }
}

/// Validated calculation input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxpayerInfo {
    pub total_income: Decimal,
    /// Tax already withheld at source
    pub withheld: Decimal,
    pub allowances: Vec<Allowance>,
}

/// Tax owed within a single bracket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTax {
    pub label: &'static str,
    pub tax: Decimal,
}

/// Outcome of a calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxResult {
    /// Tax due after withholding; negative means a refund is owed
    pub liability: Decimal,
    /// One entry per bracket, in bracket order, zero when untouched
    pub brackets: Vec<BracketTax>,
}

impl TaxResult {
    /// Tax before withholding, equal to the sum of the breakdown
    pub fn gross_tax(&self) -> Decimal {
        self.brackets.iter().map(|b| b.tax).sum()
    }
}

/// Sum of capped allowances, each entry clamped to the policy ceiling
/// before it is added.
pub fn capped_deductions(allowances: &[Allowance], ceiling: Decimal) -> Decimal {
    allowances
        .iter()
        .filter(|a| a.kind.is_capped())
        .map(|a| a.amount.min(ceiling))
        .sum()
}

/// Net income subject to the progressive brackets, may be negative
pub fn net_taxable_income(info: &TaxpayerInfo, policy: &DeductionPolicy) -> Decimal {
    info.total_income
        - policy.personal_deduction
        - capped_deductions(&info.allowances, policy.capped_deduction_ceiling)
}

/// Calculate progressive income tax.
///
/// Input is assumed validated. Net income is consumed bracket by bracket,
/// each bracket taking at most its capacity, and withholding is subtracted
/// from the rounded bracket total.
pub fn calculate_tax(info: &TaxpayerInfo, policy: &DeductionPolicy) -> TaxResult {
    let net = net_taxable_income(info, policy);
    let mut remaining = net.max(Decimal::ZERO);
    let mut brackets = Vec::with_capacity(BRACKETS.len());

    for bracket in &BRACKETS {
        let portion = match bracket.capacity() {
            Some(capacity) => remaining.min(capacity),
            None => remaining,
        };
        let tax = round_money(portion * bracket.rate);
        remaining -= portion;
        log::debug!(
            "Bracket {}: portion={}, rate={}, tax={}. Remaining: {}",
            bracket.label,
            portion,
            bracket.rate,
            tax,
            remaining
        );
        brackets.push(BracketTax {
            label: bracket.label,
            tax,
        });
    }

    let gross: Decimal = brackets.iter().map(|b| b.tax).sum();
    TaxResult {
        liability: round_money(gross - info.withheld),
        brackets,
    }
}
