//! Qualitative status labels.
//!
//! Ratio statuses come from [`THRESHOLDS`], a table of descending inclusive
//! lower bounds per ratio. A value takes the status of the first band it
//! reaches, or the row's floor status when it reaches none.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    CurrentRatio,
    QuickRatio,
    DebtToEquity,
    DebtToAssets,
    ReturnOnAssets,
    ReturnOnEquity,
}

impl RatioKind {
    pub const ALL: [RatioKind; 6] = [
        RatioKind::CurrentRatio,
        RatioKind::QuickRatio,
        RatioKind::DebtToEquity,
        RatioKind::DebtToAssets,
        RatioKind::ReturnOnAssets,
        RatioKind::ReturnOnEquity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatioKind::CurrentRatio => "Current Ratio",
            RatioKind::QuickRatio => "Quick Ratio",
            RatioKind::DebtToEquity => "Debt to Equity",
            RatioKind::DebtToAssets => "Debt to Assets",
            RatioKind::ReturnOnAssets => "Return on Assets (ROA)",
            RatioKind::ReturnOnEquity => "Return on Equity (ROE)",
        }
    }

    /// Returns are shown as percentages, the rest as plain ratios.
    pub fn is_percentage(self) -> bool {
        matches!(self, RatioKind::ReturnOnAssets | RatioKind::ReturnOnEquity)
    }
}

/// Three-tier label for a ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Strong,
    Acceptable,
    Weak,
    Conservative,
    Moderate,
    Aggressive,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Strong => "strong",
            Status::Acceptable => "acceptable",
            Status::Weak => "weak",
            Status::Conservative => "conservative",
            Status::Moderate => "moderate",
            Status::Aggressive => "aggressive",
        }
    }
}

/// Values `>= at_least` earn `status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Band {
    pub at_least: Decimal,
    pub status: Status,
}

/// One row of the threshold table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Threshold {
    pub kind: RatioKind,
    /// Sorted by `at_least`, highest first.
    pub bands: [Band; 2],
    /// Status for values below every band.
    pub floor: Status,
}

const fn row(kind: RatioKind, upper: (Decimal, Status), lower: (Decimal, Status), floor: Status) -> Threshold {
    Threshold {
        kind,
        bands: [
            Band {
                at_least: upper.0,
                status: upper.1,
            },
            Band {
                at_least: lower.0,
                status: lower.1,
            },
        ],
        floor,
    }
}

pub const THRESHOLDS: [Threshold; 6] = [
    row(
        RatioKind::CurrentRatio,
        (dec!(1.5), Status::Strong),
        (dec!(1), Status::Acceptable),
        Status::Weak,
    ),
    row(
        RatioKind::QuickRatio,
        (dec!(1), Status::Strong),
        (dec!(0.5), Status::Acceptable),
        Status::Weak,
    ),
    row(
        RatioKind::DebtToEquity,
        (dec!(2), Status::Aggressive),
        (dec!(1), Status::Moderate),
        Status::Conservative,
    ),
    row(
        RatioKind::DebtToAssets,
        (dec!(0.7), Status::Aggressive),
        (dec!(0.5), Status::Moderate),
        Status::Conservative,
    ),
    row(
        RatioKind::ReturnOnAssets,
        (dec!(0.05), Status::Strong),
        (dec!(0.02), Status::Acceptable),
        Status::Weak,
    ),
    row(
        RatioKind::ReturnOnEquity,
        (dec!(0.15), Status::Strong),
        (dec!(0.08), Status::Acceptable),
        Status::Weak,
    ),
];

/// Table row for `kind`.
pub fn threshold(kind: RatioKind) -> &'static Threshold {
    // Rows are stored in `RatioKind::ALL` order.
    &THRESHOLDS[kind as usize]
}

/// Classify `value` for `kind` using the threshold table.
pub fn classify(kind: RatioKind, value: Decimal) -> Status {
    let t = threshold(kind);
    t.bands
        .iter()
        .find(|b| value >= b.at_least)
        .map(|b| b.status)
        .unwrap_or(t.floor)
}

/// Sign of a profit figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitStatus {
    Profit,
    BreakEven,
    Loss,
}

impl ProfitStatus {
    pub fn of(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            ProfitStatus::Profit
        } else if amount < Decimal::ZERO {
            ProfitStatus::Loss
        } else {
            ProfitStatus::BreakEven
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfitStatus::Profit => "profit",
            ProfitStatus::BreakEven => "break-even",
            ProfitStatus::Loss => "loss",
        }
    }
}
