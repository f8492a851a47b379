#![deny(warnings)]

//! Derivation engine: pure formulas from page inputs to derived metrics.
//!
//! Every function here is total over valid input records and keeps no state
//! between calls. Derived records are recomputed on every edit and never
//! cached, so they cannot go stale.
//!
//! - Balance sheet totals, the balance identity check and gap remediation
//! - P&L profit levels and margins
//! - Liquidity, leverage and return ratios with table-driven status labels
//! - Cross-checks for contradictory or directly-entered values

use lab_core::{BalanceSheetInputs, ProfitLossBreakdown, ProfitLossInputs, RatioInputs};
use rust_decimal::Decimal;
use std::fmt;
use tracing::warn;

pub mod balance;
pub mod consistency;
pub mod profit;
pub mod ratios;
pub mod status;

pub use balance::{
    derive_balance_sheet, BalanceSheetMetrics, Direction, Lever, Remediation, Side,
    BALANCE_TOLERANCE,
};
pub use consistency::{
    check_reported_net_income, ratio_input_inconsistencies, Inconsistency, NetIncomeMismatch,
};
pub use profit::{
    derive_breakdown, derive_profit_loss, share_of_revenue, ProfitLossMetrics, ProfitLossStatus,
};
pub use ratios::{derive_ratios, RatioMetrics};
pub use status::{classify, threshold, Band, ProfitStatus, RatioKind, Status, Threshold, THRESHOLDS};

/// Division with the zero-denominator guard applied to every ratio.
///
/// Returns `0` when `denominator` is zero so displays stay stable. A quotient
/// too large for `Decimal` is also reported as `0` rather than panicking.
pub fn guarded_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    match numerator.checked_div(denominator) {
        Some(q) => q,
        None => {
            warn!(%numerator, %denominator, "ratio overflowed; reporting 0");
            Decimal::ZERO
        }
    }
}

/// Full recomputation of a page's derived record.
pub trait Derive {
    type Metrics: Clone + fmt::Debug + PartialEq;

    fn derive(&self) -> Self::Metrics;
}

impl Derive for BalanceSheetInputs {
    type Metrics = BalanceSheetMetrics;

    fn derive(&self) -> Self::Metrics {
        derive_balance_sheet(self)
    }
}

impl Derive for ProfitLossInputs {
    type Metrics = ProfitLossMetrics;

    fn derive(&self) -> Self::Metrics {
        derive_profit_loss(self)
    }
}

impl Derive for ProfitLossBreakdown {
    type Metrics = ProfitLossMetrics;

    fn derive(&self) -> Self::Metrics {
        derive_breakdown(self)
    }
}

impl Derive for RatioInputs {
    type Metrics = RatioMetrics;

    fn derive(&self) -> Self::Metrics {
        derive_ratios(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(guarded_div(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(guarded_div(dec!(-5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(guarded_div(dec!(3), dec!(2)), dec!(1.5));
    }

    #[test]
    fn overflowing_quotient_is_zero() {
        let tiny = Decimal::new(1, 28);
        assert_eq!(guarded_div(dec!(1000000000000), tiny), Decimal::ZERO);
    }

    #[test]
    fn derive_trait_matches_free_functions() {
        let bs = BalanceSheetInputs::default();
        assert_eq!(bs.derive(), derive_balance_sheet(&bs));
        let r = RatioInputs::default();
        assert_eq!(r.derive(), derive_ratios(&r));
    }

    proptest! {
        #[test]
        fn guard_never_panics(n in any::<i64>(), d in any::<i64>(), scale in 0u32..28) {
            let q = guarded_div(Decimal::new(n, 0), Decimal::new(d, scale));
            if d == 0 {
                prop_assert_eq!(q, Decimal::ZERO);
            }
        }
    }
}
