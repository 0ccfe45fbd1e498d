//! Request surface: validation, policy lookup and result normalization shared
//! by the HTTP API and the command line.

pub mod batch;
pub mod payload;

use crate::policy::{PolicyStore, StoreError};
use crate::tax::calculate_tax;
use std::io::Read;

pub use batch::{read_tax_file, TaxFileRow};
pub use payload::{
    settle, AllowanceInput, BatchEntry, BatchResponse, CalculationRequest, CalculationResponse,
    CappedDeductionResponse, DeductionSetting, PersonalDeductionResponse, Settlement, TaxLevel,
};

/// Client input errors. The display strings are part of the wire contract.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid request body")]
    InvalidBody,
    #[error("total income is required")]
    TotalIncomeRequired,
    #[error("total income must be greater than 0.0")]
    TotalIncomeNotPositive,
    #[error("wht must be greater than or equal to 0.0")]
    WhtNegative,
    #[error("wht must be less than or equal to total income")]
    WhtExceedsIncome,
    #[error("missing allowanceType key")]
    MissingAllowanceType,
    #[error("allowance amount must be greater than or equal to 0.0")]
    NegativeAllowance,
    #[error("user can not fill personal allowance")]
    PersonalAllowance,
    #[error("invalid allowance type")]
    InvalidAllowanceType,
    #[error("amount is required")]
    AmountRequired,
    #[error("personal deduction amount must be greater than or equal to 10,000.0")]
    PersonalDeductionTooLow,
    #[error("personal deduction amount must be less than or equal to 100,000.0")]
    PersonalDeductionTooHigh,
    /// Extends the documented message catalog. A zero ceiling still reports
    /// `AmountRequired`; only negative ceilings get this message.
    #[error("max k-receipt amount must be greater than 0.0")]
    KReceiptNotPositive,
    #[error("max k-receipt amount must be less than or equal to 100,000.0")]
    KReceiptTooHigh,
    #[error("invalid file : key must be taxFile")]
    MissingTaxFile,
    #[error("error reading file: invalid format")]
    InvalidFileFormat,
    #[error("totalIncome must be a numeric value")]
    TotalIncomeNotNumeric,
    #[error("wht must be a numeric value")]
    WhtNotNumeric,
    #[error("donation must be a numeric value")]
    DonationNotNumeric,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] RequestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a single request, look up the policy and calculate.
pub fn calculate(
    store: &dyn PolicyStore,
    request: &CalculationRequest,
) -> Result<CalculationResponse, ServiceError> {
    let info = request.validate()?;
    let policy = store.policy()?;
    Ok(calculate_tax(&info, &policy).into())
}

/// Calculate every row of a CSV tax file.
///
/// The whole file is parsed and validated before the policy is read, so a
/// bad row aborts the batch without computing anything.
pub fn calculate_batch<R: Read>(
    store: &dyn PolicyStore,
    reader: R,
) -> Result<Vec<BatchEntry>, ServiceError> {
    let rows = read_tax_file(reader)?;
    let policy = store.policy()?;
    log::info!("Calculating {} batch rows", rows.len());

    Ok(rows
        .iter()
        .map(|info| {
            let settlement = settle(calculate_tax(info, &policy).liability);
            BatchEntry {
                total_income: info.total_income,
                tax: settlement.tax,
                tax_refund: settlement.refund,
            }
        })
        .collect())
}

pub fn update_personal_deduction(
    store: &dyn PolicyStore,
    setting: &DeductionSetting,
) -> Result<PersonalDeductionResponse, ServiceError> {
    let amount = setting.validate_personal()?;
    Ok(PersonalDeductionResponse {
        personal_deduction: store.set_personal_deduction(amount)?,
    })
}

pub fn update_capped_deduction_ceiling(
    store: &dyn PolicyStore,
    setting: &DeductionSetting,
) -> Result<CappedDeductionResponse, ServiceError> {
    let amount = setting.validate_k_receipt()?;
    Ok(CappedDeductionResponse {
        capped_deduction: store.set_capped_deduction_ceiling(amount)?,
    })
}
