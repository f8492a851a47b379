//! Balance sheet totals, the balance identity and gap remediation.

use lab_core::BalanceSheetInputs;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Default tolerance for the balance identity: one currency unit.
pub const BALANCE_TOLERANCE: Decimal = Decimal::ONE;

/// Derived balance sheet totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceSheetMetrics {
    pub current_assets: Decimal,
    pub non_current_assets: Decimal,
    pub total_assets: Decimal,
    pub current_liabilities: Decimal,
    pub non_current_liabilities: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    pub liabilities_plus_equity: Decimal,
    /// `total_assets - liabilities_plus_equity`.
    pub balance_delta: Decimal,
}

/// Compute every balance sheet total from the inputs.
pub fn derive_balance_sheet(i: &BalanceSheetInputs) -> BalanceSheetMetrics {
    let current_assets = i.cash() + i.accounts_receivable() + i.inventory();
    let non_current_assets = i.ppe() + i.intangible_assets();
    let total_assets = current_assets + non_current_assets;

    let current_liabilities = i.accounts_payable() + i.short_term_debt();
    let non_current_liabilities = i.long_term_debt();
    let total_liabilities = current_liabilities + non_current_liabilities;

    let total_equity = i.share_capital() + i.retained_earnings();
    let liabilities_plus_equity = total_liabilities + total_equity;
    let balance_delta = total_assets - liabilities_plus_equity;

    debug!(%total_assets, %liabilities_plus_equity, %balance_delta, "balance sheet derived");
    BalanceSheetMetrics {
        current_assets,
        non_current_assets,
        total_assets,
        current_liabilities,
        non_current_liabilities,
        total_liabilities,
        total_equity,
        liabilities_plus_equity,
        balance_delta,
    }
}

/// Side of the balance identity a lever acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Assets,
    Liabilities,
    Equity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
}

/// One way to close the balance gap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Lever {
    pub direction: Direction,
    pub side: Side,
    /// Exact amount that closes the gap: `|balance_delta|`.
    pub amount: Decimal,
    /// False when a decrease would push the side's total below zero.
    pub feasible: bool,
}

/// Structured suggestions for an unbalanced sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Remediation {
    /// `|balance_delta|`.
    pub gap: Decimal,
    /// True when assets exceed liabilities plus equity.
    pub assets_exceed: bool,
    /// Liabilities lever, equity lever, assets lever, in that order.
    pub levers: [Lever; 3],
}

impl BalanceSheetMetrics {
    /// `|balance_delta| < tolerance`.
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        self.balance_delta.abs() < tolerance
    }

    /// Remediation levers, or `None` when `balance_delta` is exactly zero.
    pub fn remediation(&self) -> Option<Remediation> {
        if self.balance_delta.is_zero() {
            return None;
        }
        let gap = self.balance_delta.abs();
        let assets_exceed = self.balance_delta > Decimal::ZERO;
        let lever = |direction: Direction, side: Side, side_total: Decimal| Lever {
            direction,
            side,
            amount: gap,
            feasible: direction == Direction::Increase || gap <= side_total,
        };
        let levers = if assets_exceed {
            [
                lever(Direction::Increase, Side::Liabilities, self.total_liabilities),
                lever(Direction::Increase, Side::Equity, self.total_equity),
                lever(Direction::Decrease, Side::Assets, self.total_assets),
            ]
        } else {
            [
                lever(Direction::Decrease, Side::Liabilities, self.total_liabilities),
                lever(Direction::Decrease, Side::Equity, self.total_equity),
                lever(Direction::Increase, Side::Assets, self.total_assets),
            ]
        };
        Some(Remediation {
            gap,
            assets_exceed,
            levers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::{BalanceSheetField, InputModel, LineItem};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_leave_a_gap() {
        // The documented defaults do not satisfy the identity: assets are
        // 1,000,000 against 900,000 of liabilities plus equity.
        let m = derive_balance_sheet(&BalanceSheetInputs::default());
        assert_eq!(m.total_assets, dec!(1000000));
        assert_eq!(m.total_liabilities, dec!(450000));
        assert_eq!(m.total_equity, dec!(450000));
        assert_eq!(m.liabilities_plus_equity, dec!(900000));
        assert_eq!(m.current_assets, dec!(450000));
        assert_eq!(m.current_liabilities, dec!(150000));
        assert_eq!(m.balance_delta, dec!(100000));
        assert!(!m.is_balanced(BALANCE_TOLERANCE));
        let r = m.remediation().unwrap();
        assert_eq!(r.gap, dec!(100000));
        assert!(r.assets_exceed);
    }

    fn balanced_defaults() -> BalanceSheetInputs {
        let mut bs = BalanceSheetInputs::default();
        // Cash brought down by 100k so that A = L + E.
        bs.set(BalanceSheetField::Cash, dec!(100000)).unwrap();
        bs
    }

    #[test]
    fn balanced_sheet_has_no_remediation() {
        let m = derive_balance_sheet(&balanced_defaults());
        assert_eq!(m.balance_delta, Decimal::ZERO);
        assert!(m.is_balanced(BALANCE_TOLERANCE));
        assert!(m.remediation().is_none());
    }

    #[test]
    fn tolerance_is_exclusive() {
        let mut bs = balanced_defaults();
        bs.adjust(BalanceSheetField::Cash, dec!(0.99)).unwrap();
        assert!(derive_balance_sheet(&bs).is_balanced(BALANCE_TOLERANCE));
        bs.adjust(BalanceSheetField::Cash, dec!(0.01)).unwrap();
        assert!(!derive_balance_sheet(&bs).is_balanced(BALANCE_TOLERANCE));
    }

    #[test]
    fn assets_exceeding_suggests_raising_funding_or_cutting_assets() {
        let mut bs = balanced_defaults();
        bs.adjust(BalanceSheetField::Inventory, dec!(25000)).unwrap();
        let r = derive_balance_sheet(&bs).remediation().unwrap();
        assert_eq!(r.gap, dec!(25000));
        assert!(r.assets_exceed);
        assert_eq!(r.levers[0].direction, Direction::Increase);
        assert_eq!(r.levers[0].side, Side::Liabilities);
        assert_eq!(r.levers[1].side, Side::Equity);
        assert_eq!(r.levers[2].direction, Direction::Decrease);
        assert_eq!(r.levers[2].side, Side::Assets);
        assert!(r.levers.iter().all(|l| l.amount == dec!(25000) && l.feasible));
    }

    #[test]
    fn funding_exceeding_reverses_levers_and_flags_infeasible_cuts() {
        let mut bs = BalanceSheetInputs::zeroed();
        bs.set(BalanceSheetField::Cash, dec!(100)).unwrap();
        bs.set(BalanceSheetField::AccountsPayable, dec!(50)).unwrap();
        bs.set(BalanceSheetField::ShareCapital, dec!(1000)).unwrap();
        let m = derive_balance_sheet(&bs);
        assert_eq!(m.balance_delta, dec!(-950));
        let r = m.remediation().unwrap();
        assert!(!r.assets_exceed);
        assert_eq!(r.levers[0].direction, Direction::Decrease);
        assert!(!r.levers[0].feasible, "only 50 of liabilities to cut");
        assert!(r.levers[1].feasible);
        assert_eq!(r.levers[2].direction, Direction::Increase);
        assert_eq!(r.levers[2].side, Side::Assets);
    }

    proptest! {
        #[test]
        fn accounting_identity(vals in proptest::collection::vec(0i64..100_000_000_000, 10)) {
            let mut bs = BalanceSheetInputs::zeroed();
            for (field, cents) in BalanceSheetField::ALL.iter().zip(&vals) {
                bs.set(*field, Decimal::new(*cents, 2)).unwrap();
            }
            let d: Vec<Decimal> = vals.iter().map(|c| Decimal::new(*c, 2)).collect();
            let assets = d[0] + d[1] + d[2] + d[3] + d[4];
            let liabilities = d[5] + d[6] + d[7];
            let equity = d[8] + d[9];
            let m = derive_balance_sheet(&bs);
            prop_assert_eq!(m.total_assets, assets);
            prop_assert_eq!(m.balance_delta, assets - (liabilities + equity));
            prop_assert_eq!(m.clone(), derive_balance_sheet(&bs));
            if let Some(r) = m.remediation() {
                prop_assert_eq!(r.gap, m.balance_delta.abs());
            }
        }
    }
}
