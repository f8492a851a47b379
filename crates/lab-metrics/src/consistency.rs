//! Cross-checks between inputs that should agree.
//!
//! Nothing here rejects an edit; findings are returned as warnings for the
//! page to display next to the derived values.

use lab_core::RatioInputs;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// A directly entered net income that disagrees with `ebt - tax`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetIncomeMismatch {
    pub reported: Decimal,
    pub derived: Decimal,
    /// `reported - derived`.
    pub difference: Decimal,
}

/// Compare a reported net income with the derived one.
///
/// The derived value always wins in calculations; this only reports the gap
/// when it reaches `tolerance`.
pub fn check_reported_net_income(
    derived: Decimal,
    reported: Decimal,
    tolerance: Decimal,
) -> Option<NetIncomeMismatch> {
    let difference = reported - derived;
    if difference.abs() < tolerance {
        return None;
    }
    warn!(%reported, %derived, "reported net income disagrees with derived value");
    Some(NetIncomeMismatch {
        reported,
        derived,
        difference,
    })
}

/// Ratio-page inputs that contradict each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    InventoryExceedsCurrentAssets {
        inventory: Decimal,
        current_assets: Decimal,
    },
    CurrentAssetsExceedTotalAssets {
        current_assets: Decimal,
        total_assets: Decimal,
    },
    CurrentLiabilitiesExceedTotalLiabilities {
        current_liabilities: Decimal,
        total_liabilities: Decimal,
    },
    /// `total_assets - (total_liabilities + equity)` outside the tolerance.
    Unbalanced {
        total_assets: Decimal,
        liabilities_plus_equity: Decimal,
        delta: Decimal,
    },
}

pub fn ratio_input_inconsistencies(i: &RatioInputs, balance_tolerance: Decimal) -> Vec<Inconsistency> {
    let mut found = Vec::new();
    if i.inventory() > i.current_assets() {
        found.push(Inconsistency::InventoryExceedsCurrentAssets {
            inventory: i.inventory(),
            current_assets: i.current_assets(),
        });
    }
    if i.current_assets() > i.total_assets() {
        found.push(Inconsistency::CurrentAssetsExceedTotalAssets {
            current_assets: i.current_assets(),
            total_assets: i.total_assets(),
        });
    }
    if i.current_liabilities() > i.total_liabilities() {
        found.push(Inconsistency::CurrentLiabilitiesExceedTotalLiabilities {
            current_liabilities: i.current_liabilities(),
            total_liabilities: i.total_liabilities(),
        });
    }
    let liabilities_plus_equity = i.total_liabilities() + i.equity();
    let delta = i.total_assets() - liabilities_plus_equity;
    if delta.abs() >= balance_tolerance {
        found.push(Inconsistency::Unbalanced {
            total_assets: i.total_assets(),
            liabilities_plus_equity,
            delta,
        });
    }
    found
}
