use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// A contiguous band of net taxable income taxed at one marginal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBracket {
    /// Label reported in the per-bracket breakdown
    pub label: &'static str,
    /// Net income at which the bracket starts
    pub lower: Decimal,
    /// Net income at which the bracket ends, `None` for the top bracket
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    /// Amount of net income the bracket can absorb, `None` when unbounded
    pub fn capacity(&self) -> Option<Decimal> {
        self.upper.map(|upper| upper - self.lower)
    }

    /// Rate as a whole percentage, e.g. 15 for 0.15
    pub fn rate_pct(&self) -> Decimal {
        (self.rate * dec!(100)).normalize()
    }
}

/// Progressive brackets, ordered from the lowest band upwards.
pub const BRACKETS: [TaxBracket; 5] = [
    TaxBracket {
        label: "0-150,000",
        lower: dec!(0),
        upper: Some(dec!(150000)),
        rate: dec!(0),
    },
    TaxBracket {
        label: "150,001-500,000",
        lower: dec!(150000),
        upper: Some(dec!(500000)),
        rate: dec!(0.10),
    },
    TaxBracket {
        label: "500,001-1,000,000",
        lower: dec!(500000),
        upper: Some(dec!(1000000)),
        rate: dec!(0.15),
    },
    TaxBracket {
        label: "1,000,001-2,000,000",
        lower: dec!(1000000),
        upper: Some(dec!(2000000)),
        rate: dec!(0.20),
    },
    TaxBracket {
        label: "2,000,001 ขึ้นไป",
        lower: dec!(2000000),
        upper: None,
        rate: dec!(0.35),
    },
];

/// Round a monetary amount to satang (2dp), midpoint away from zero.
///
/// Every bracket amount and the final liability go through this, so the
/// breakdown always sums to the reported total.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
