#![deny(warnings)]

//! Input model and shared invariants for the financial literacy lab.
//!
//! Every page of the lab (balance sheet, P&L, ratios) edits one flat record
//! of currency amounts. This crate defines those records, the line-item
//! enumerations used to address their fields, and the validation that keeps
//! every amount within `[0, MAX_AMOUNT]`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

mod model;

pub use model::{
    BalanceSheetField, BalanceSheetInputs, ProfitLossBreakdown, ProfitLossBreakdownField,
    ProfitLossField, ProfitLossInputs, RatioField, RatioInputs,
};

/// Largest amount accepted for any single line item (one trillion).
///
/// Keeps sums over a whole record far away from `Decimal`'s overflow limit.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Rejected edit at the input boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidInput {
    /// Amounts are never negative; negative edits are rejected, not clamped.
    #[error("invalid input for `{field}`: {value} is negative")]
    Negative { field: &'static str, value: Decimal },
    /// Amount above [`MAX_AMOUNT`], or a delta that would overflow.
    #[error("invalid input for `{field}`: {value} exceeds the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
    /// Text or float that does not denote a finite number.
    #[error("invalid input for `{field}`: `{raw}` is not a number")]
    NotNumeric { field: &'static str, raw: String },
    /// Field key not present on the addressed record.
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

impl InvalidInput {
    /// Key of the offending field, when the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            InvalidInput::Negative { field, .. }
            | InvalidInput::OutOfRange { field, .. }
            | InvalidInput::NotNumeric { field, .. } => Some(field),
            InvalidInput::UnknownField(_) => None,
        }
    }
}

/// Validate a single amount destined for `field`.
pub fn validate_amount(field: &'static str, value: Decimal) -> Result<Decimal, InvalidInput> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(InvalidInput::Negative { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(InvalidInput::OutOfRange {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    // Normalise `-0` so snapshots compare equal.
    Ok(value.abs())
}

/// Parse user-entered text into a validated amount.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, InvalidInput> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| InvalidInput::NotNumeric {
        field,
        raw: raw.to_string(),
    })?;
    validate_amount(field, value)
}

/// Convert a float coming from a slider widget into a validated amount.
pub fn amount_from_f64(field: &'static str, value: f64) -> Result<Decimal, InvalidInput> {
    let not_numeric = || InvalidInput::NotNumeric {
        field,
        raw: value.to_string(),
    };
    if !value.is_finite() {
        return Err(not_numeric());
    }
    let dec = Decimal::from_f64(value).ok_or_else(not_numeric)?;
    validate_amount(field, dec)
}

/// A named line item on one page's input record.
pub trait LineItem: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Every line item, in statement order.
    const ALL: &'static [Self];

    /// Stable snake_case key, e.g. `accounts_receivable`.
    fn key(self) -> &'static str;

    /// Human-readable label, e.g. "Accounts Receivable".
    fn label(self) -> &'static str;

    /// Documented default amount used when a page loads.
    fn default_amount(self) -> Decimal;

    /// Look up a line item by key. Dashes are accepted in place of underscores.
    fn from_key(key: &str) -> Result<Self, InvalidInput> {
        let normalized = key.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == normalized)
            .ok_or_else(|| InvalidInput::UnknownField(key.to_string()))
    }
}

/// A page's flat record of raw, user-entered amounts.
///
/// Fields are only reachable through [`InputModel::set`] and friends, so a
/// record can never hold a negative or oversized amount.
pub trait InputModel: Clone + Default + PartialEq + fmt::Debug {
    type Field: LineItem;

    /// Page identifier used in logs and scenario files.
    const PAGE: &'static str;

    fn get(&self, field: Self::Field) -> Decimal;

    /// Replace one field. Fails with [`InvalidInput`] and leaves the record
    /// untouched when `value` is out of bounds.
    fn set(&mut self, field: Self::Field, value: Decimal) -> Result<(), InvalidInput>;

    /// Record with every field at zero.
    fn zeroed() -> Self;

    fn set_str(&mut self, field: Self::Field, raw: &str) -> Result<(), InvalidInput> {
        let value = parse_amount(field.key(), raw)?;
        self.set(field, value)
    }

    fn set_f64(&mut self, field: Self::Field, value: f64) -> Result<(), InvalidInput> {
        let value = amount_from_f64(field.key(), value)?;
        self.set(field, value)
    }

    fn set_by_key(&mut self, key: &str, value: Decimal) -> Result<(), InvalidInput> {
        let field = Self::Field::from_key(key)?;
        self.set(field, value)
    }

    /// Apply a signed delta to one field; the result must stay valid.
    fn adjust(&mut self, field: Self::Field, delta: Decimal) -> Result<(), InvalidInput> {
        let next = self
            .get(field)
            .checked_add(delta)
            .ok_or(InvalidInput::OutOfRange {
                field: field.key(),
                value: delta,
                max: MAX_AMOUNT,
            })?;
        self.set(field, next)
    }

    /// Field-wise sum of `self` and `other`.
    fn accumulate(&mut self, other: &Self) -> Result<(), InvalidInput> {
        for &field in Self::Field::ALL {
            self.adjust(field, other.get(field))?;
        }
        Ok(())
    }

    /// `(field, amount)` pairs in statement order.
    fn entries(&self) -> Vec<(Self::Field, Decimal)> {
        Self::Field::ALL
            .iter()
            .map(|&f| (f, self.get(f)))
            .collect()
    }

    /// Apply `key = value` pairs on top of the current values.
    fn apply_pairs<'a, I>(&mut self, pairs: I) -> Result<(), InvalidInput>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        for (key, value) in pairs {
            self.set_by_key(key, value)?;
        }
        debug!(page = Self::PAGE, "applied input overlay");
        Ok(())
    }
}

/// Tunables shared by the engine and the presentation layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    /// Largest `|assets - (liabilities + equity)|` still reported as balanced.
    pub balance_tolerance: Decimal,
    /// Largest gap between reported and derived net income that is not flagged.
    pub net_income_tolerance: Decimal,
    /// Symbol prefixed to formatted currency amounts.
    pub currency_symbol: String,
    /// Decimal places for percentages (margins, returns).
    pub percent_decimals: u32,
    /// Decimal places for plain ratios (current ratio, D/E).
    pub ratio_decimals: u32,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: Decimal::ONE,
            net_income_tolerance: Decimal::ONE,
            currency_symbol: "$".to_string(),
            percent_decimals: 1,
            ratio_decimals: 2,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be > 0")]
    NonPositiveTolerance(&'static str),
    #[error("at most 6 decimal places are supported, got {0}")]
    TooManyDecimals(u32),
}

/// Validate configuration values.
pub fn validate_config(cfg: &LabConfig) -> Result<(), ConfigError> {
    if cfg.balance_tolerance <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveTolerance("balance_tolerance"));
    }
    if cfg.net_income_tolerance <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveTolerance("net_income_tolerance"));
    }
    for d in [cfg.percent_decimals, cfg.ratio_decimals] {
        if d > 6 {
            return Err(ConfigError::TooManyDecimals(d));
        }
    }
    Ok(())
}
