use super::RequestError;
use crate::tax::{Allowance, AllowanceKind, TaxResult, TaxpayerInfo};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const PERSONAL_DEDUCTION_MIN: Decimal = dec!(10000);
pub const PERSONAL_DEDUCTION_MAX: Decimal = dec!(100000);
pub const K_RECEIPT_MAX: Decimal = dec!(100000);

/// Body of a tax calculation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculationRequest {
    /// Gross income for the year, must be greater than zero
    #[schemars(with = "f64")]
    pub total_income: Decimal,
    /// Tax withheld at source, between zero and the total income
    #[schemars(with = "f64")]
    pub wht: Decimal,
    pub allowances: Vec<AllowanceInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceInput {
    /// One of "donation" or "k-receipt"
    #[serde(default)]
    pub allowance_type: Option<String>,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

impl AllowanceInput {
    pub fn new(allowance_type: &str, amount: Decimal) -> Self {
        AllowanceInput {
            allowance_type: Some(allowance_type.to_string()),
            amount,
        }
    }
}

impl CalculationRequest {
    /// Check the request and convert it into calculator input.
    ///
    /// Field checks run before allowance type resolution, and the first
    /// failure is returned.
    pub fn validate(&self) -> Result<TaxpayerInfo, RequestError> {
        if self.total_income.is_zero() {
            return Err(RequestError::TotalIncomeRequired);
        }
        if self.total_income < Decimal::ZERO {
            return Err(RequestError::TotalIncomeNotPositive);
        }
        if self.wht < Decimal::ZERO {
            return Err(RequestError::WhtNegative);
        }
        if self.wht > self.total_income {
            return Err(RequestError::WhtExceedsIncome);
        }

        for allowance in &self.allowances {
            let allowance_type = allowance.allowance_type.as_deref().unwrap_or_default();
            if allowance_type.is_empty() {
                return Err(RequestError::MissingAllowanceType);
            }
            if allowance.amount < Decimal::ZERO {
                return Err(RequestError::NegativeAllowance);
            }
            if AllowanceKind::from_wire(allowance_type) == Some(AllowanceKind::Personal) {
                return Err(RequestError::PersonalAllowance);
            }
        }

        let allowances = self
            .allowances
            .iter()
            .map(|a| {
                let kind = a
                    .allowance_type
                    .as_deref()
                    .and_then(AllowanceKind::from_wire)
                    .ok_or(RequestError::InvalidAllowanceType)?;
                Ok(Allowance::new(kind, a.amount))
            })
            .collect::<Result<Vec<_>, RequestError>>()?;

        Ok(TaxpayerInfo {
            total_income: self.total_income,
            withheld: self.wht,
            allowances,
        })
    }
}

/// Body of an admin deduction update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeductionSetting {
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

impl DeductionSetting {
    pub fn new(amount: Decimal) -> Self {
        DeductionSetting { amount }
    }

    pub fn validate_personal(&self) -> Result<Decimal, RequestError> {
        if self.amount.is_zero() {
            return Err(RequestError::AmountRequired);
        }
        if self.amount < PERSONAL_DEDUCTION_MIN {
            return Err(RequestError::PersonalDeductionTooLow);
        }
        if self.amount > PERSONAL_DEDUCTION_MAX {
            return Err(RequestError::PersonalDeductionTooHigh);
        }
        Ok(self.amount)
    }

    pub fn validate_k_receipt(&self) -> Result<Decimal, RequestError> {
        if self.amount.is_zero() {
            return Err(RequestError::AmountRequired);
        }
        if self.amount < Decimal::ZERO {
            return Err(RequestError::KReceiptNotPositive);
        }
        if self.amount > K_RECEIPT_MAX {
            return Err(RequestError::KReceiptTooHigh);
        }
        Ok(self.amount)
    }
}

/// Liability split into the non-negative amounts shown to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub tax: Decimal,
    pub refund: Option<Decimal>,
}

/// A negative liability becomes zero tax plus a refund of its magnitude.
pub fn settle(liability: Decimal) -> Settlement {
    if liability < Decimal::ZERO {
        Settlement {
            tax: Decimal::ZERO,
            refund: Some(-liability),
        }
    } else {
        Settlement {
            tax: liability,
            refund: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxLevel {
    pub level: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_refund: Option<Decimal>,
    pub tax_level: Vec<TaxLevel>,
}

impl From<TaxResult> for CalculationResponse {
    fn from(result: TaxResult) -> Self {
        let settlement = settle(result.liability);
        CalculationResponse {
            tax: settlement.tax,
            tax_refund: settlement.refund,
            tax_level: result
                .brackets
                .into_iter()
                .map(|b| TaxLevel {
                    level: b.label.to_string(),
                    tax: b.tax,
                })
                .collect(),
        }
    }
}

/// One computed row of a batch upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_refund: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResponse {
    pub taxes: Vec<BatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDeductionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub personal_deduction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CappedDeductionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub capped_deduction: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::BracketTax;

    fn request(income: Decimal, wht: Decimal, allowances: Vec<AllowanceInput>) -> CalculationRequest {
        CalculationRequest {
            total_income: income,
            wht,
            allowances,
        }
    }

    fn validation_message(req: &CalculationRequest) -> String {
        req.validate().unwrap_err().to_string()
    }

    #[test]
    fn valid_request_converts_allowances() {
        let req = request(
            dec!(500000),
            dec!(25000),
            vec![
                AllowanceInput::new("donation", dec!(200000)),
                AllowanceInput::new("k-receipt", dec!(1000)),
            ],
        );
        let info = req.validate().unwrap();

        assert_eq!(info.total_income, dec!(500000));
        assert_eq!(info.withheld, dec!(25000));
        assert_eq!(
            info.allowances,
            vec![
                Allowance::new(AllowanceKind::Donation, dec!(200000)),
                Allowance::new(AllowanceKind::KReceipt, dec!(1000)),
            ]
        );
    }

    #[test]
    fn missing_total_income() {
        let req: CalculationRequest = serde_json::from_str(
            r#"{"wht": 0.0, "allowances": [{"allowanceType": "donation", "amount": 0.0}]}"#,
        )
        .unwrap();
        assert_eq!(validation_message(&req), "total income is required");
    }

    #[test]
    fn negative_total_income() {
        let req = request(dec!(-1000), dec!(0), vec![]);
        assert_eq!(validation_message(&req), "total income must be greater than 0.0");
    }

    #[test]
    fn negative_wht() {
        let req = request(dec!(5000000), dec!(-1000), vec![]);
        assert_eq!(validation_message(&req), "wht must be greater than or equal to 0.0");
    }

    #[test]
    fn wht_greater_than_income() {
        let req = request(dec!(5000000), dec!(6000000), vec![]);
        assert_eq!(
            validation_message(&req),
            "wht must be less than or equal to total income"
        );
    }

    #[test]
    fn wht_equal_to_income_is_allowed() {
        let req = request(dec!(5000), dec!(5000), vec![]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_allowance_type() {
        let req: CalculationRequest = serde_json::from_str(
            r#"{"totalIncome": 5000000.0, "wht": 0.0, "allowances": [{"amount": 0.0}]}"#,
        )
        .unwrap();
        assert_eq!(validation_message(&req), "missing allowanceType key");

        let empty = request(dec!(1000), dec!(0), vec![AllowanceInput::new("", dec!(1))]);
        assert_eq!(validation_message(&empty), "missing allowanceType key");
    }

    #[test]
    fn negative_allowance_amount() {
        let req = request(
            dec!(5000000),
            dec!(0),
            vec![AllowanceInput::new("donation", dec!(-1000))],
        );
        assert_eq!(
            validation_message(&req),
            "allowance amount must be greater than or equal to 0.0"
        );
    }

    #[test]
    fn personal_allowance_rejected() {
        let req = request(
            dec!(5000000),
            dec!(0),
            vec![AllowanceInput::new("personal", dec!(100000))],
        );
        assert_eq!(validation_message(&req), "user can not fill personal allowance");
    }

    #[test]
    fn unknown_allowance_type() {
        let req = request(
            dec!(5000000),
            dec!(0),
            vec![AllowanceInput::new("invalid", dec!(0))],
        );
        assert_eq!(validation_message(&req), "invalid allowance type");
    }

    #[test]
    fn field_checks_precede_type_resolution() {
        let req = request(
            dec!(5000000),
            dec!(0),
            vec![
                AllowanceInput::new("invalid", dec!(0)),
                AllowanceInput::new("donation", dec!(-1)),
            ],
        );
        assert_eq!(
            validation_message(&req),
            "allowance amount must be greater than or equal to 0.0"
        );
    }

    #[test]
    fn personal_deduction_bounds() {
        assert_eq!(
            DeductionSetting::new(dec!(0)).validate_personal().unwrap_err().to_string(),
            "amount is required"
        );
        assert_eq!(
            DeductionSetting::new(dec!(5000)).validate_personal().unwrap_err().to_string(),
            "personal deduction amount must be greater than or equal to 10,000.0"
        );
        assert_eq!(
            DeductionSetting::new(dec!(150000)).validate_personal().unwrap_err().to_string(),
            "personal deduction amount must be less than or equal to 100,000.0"
        );
        assert_eq!(DeductionSetting::new(dec!(10000)).validate_personal(), Ok(dec!(10000)));
        assert_eq!(DeductionSetting::new(dec!(70000)).validate_personal(), Ok(dec!(70000)));
        assert_eq!(DeductionSetting::new(dec!(100000)).validate_personal(), Ok(dec!(100000)));
    }

    #[test]
    fn k_receipt_bounds() {
        assert_eq!(
            DeductionSetting::new(dec!(0)).validate_k_receipt().unwrap_err().to_string(),
            "amount is required"
        );
        assert_eq!(
            DeductionSetting::new(dec!(-1)).validate_k_receipt(),
            Err(RequestError::KReceiptNotPositive)
        );
        assert_eq!(
            DeductionSetting::new(dec!(100000.01)).validate_k_receipt().unwrap_err().to_string(),
            "max k-receipt amount must be less than or equal to 100,000.0"
        );
        assert_eq!(DeductionSetting::new(dec!(0.01)).validate_k_receipt(), Ok(dec!(0.01)));
        assert_eq!(DeductionSetting::new(dec!(100000)).validate_k_receipt(), Ok(dec!(100000)));
    }

    #[test]
    fn settle_negative_liability() {
        assert_eq!(
            settle(dec!(-1000)),
            Settlement {
                tax: dec!(0),
                refund: Some(dec!(1000))
            }
        );
        assert_eq!(
            settle(dec!(29000)),
            Settlement {
                tax: dec!(29000),
                refund: None
            }
        );
        assert_eq!(settle(dec!(0)).refund, None);
    }

    #[test]
    fn response_serializes_numbers() {
        let result = TaxResult {
            liability: dec!(-1999.90),
            brackets: vec![
                BracketTax {
                    label: "0-150,000",
                    tax: dec!(0),
                },
                BracketTax {
                    label: "150,001-500,000",
                    tax: dec!(35000),
                },
            ],
        };
        let json = serde_json::to_value(CalculationResponse::from(result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tax": 0.0,
                "taxRefund": 1999.9,
                "taxLevel": [
                    {"level": "0-150,000", "tax": 0.0},
                    {"level": "150,001-500,000", "tax": 35000.0},
                ]
            })
        );
    }

    #[test]
    fn response_omits_absent_refund() {
        let entry = BatchEntry {
            total_income: dec!(100000),
            tax: dec!(0),
            tax_refund: None,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"totalIncome":100000.0,"tax":0.0}"#
        );
    }

    #[test]
    fn non_numeric_amount_fails_to_bind() {
        assert!(serde_json::from_str::<DeductionSetting>(r#"{"amount": "invalid"}"#).is_err());
        assert_eq!(
            serde_json::from_str::<DeductionSetting>("{}").unwrap(),
            DeductionSetting::default()
        );
    }
}
