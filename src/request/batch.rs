use super::payload::{AllowanceInput, CalculationRequest};
use super::RequestError;
use crate::tax::{AllowanceKind, TaxpayerInfo};
use incometax_derive::CsvSchema;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// Column description generated by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Raw row of an uploaded tax file, matched by position
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, CsvSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxFileRow {
    /// Gross income for the year
    pub total_income: String,
    /// Tax withheld at source
    pub wht: String,
    /// Donation amount, capped by the k-receipt ceiling
    pub donation: String,
}

impl TaxFileRow {
    /// Parse the numeric columns and validate the row as a calculation
    /// request with a single donation allowance.
    pub fn parse(&self) -> Result<TaxpayerInfo, RequestError> {
        if self.total_income.is_empty() || self.wht.is_empty() || self.donation.is_empty() {
            return Err(RequestError::InvalidFileFormat);
        }
        let total_income = parse_number(&self.total_income, RequestError::TotalIncomeNotNumeric)?;
        let wht = parse_number(&self.wht, RequestError::WhtNotNumeric)?;
        let donation = parse_number(&self.donation, RequestError::DonationNotNumeric)?;

        CalculationRequest {
            total_income,
            wht,
            allowances: vec![AllowanceInput::new(AllowanceKind::Donation.as_str(), donation)],
        }
        .validate()
    }
}

fn parse_number(s: &str, err: RequestError) -> Result<Decimal, RequestError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| err)
}

/// Read a tax file: a header row followed by `totalIncome,wht,donation` rows.
///
/// Stops at the first malformed or invalid row.
pub fn read_tax_file<R: Read>(reader: R) -> Result<Vec<TaxpayerInfo>, RequestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_len = rdr
        .headers()
        .map_err(|e| {
            log::debug!("Tax file header: {}", e);
            RequestError::InvalidFileFormat
        })?
        .len();
    if header_len == 0 {
        return Err(RequestError::InvalidFileFormat);
    }

    let mut result = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let row_num = i + 2;
        let record = record.map_err(|e| {
            log::debug!("Tax file row {}: {}", row_num, e);
            RequestError::InvalidFileFormat
        })?;
        if record.len() != TaxFileRow::csv_schema().len() {
            return Err(RequestError::InvalidFileFormat);
        }
        let row: TaxFileRow = record.deserialize(None).map_err(|e| {
            log::debug!("Tax file row {}: {}", row_num, e);
            RequestError::InvalidFileFormat
        })?;
        let info = row.parse().inspect_err(|e| {
            log::debug!("Tax file row {} rejected: {}", row_num, e);
        })?;
        result.push(info);
    }
    log::info!("Read {} tax file rows", result.len());
    Ok(result)
}
