pub mod brackets;
pub mod income;

pub use brackets::{round_money, TaxBracket, BRACKETS};
pub use income::{
    calculate_tax, capped_deductions, net_taxable_income, Allowance, AllowanceKind, BracketTax,
    TaxResult, TaxpayerInfo,
};
