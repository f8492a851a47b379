//! Liquidity, leverage and return ratios.

use crate::guarded_div;
use crate::profit::derive_profit_loss;
use crate::status::{classify, RatioKind, Status};
use lab_core::RatioInputs;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Derived ratio record. Net income and margins come from the P&L formulas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RatioMetrics {
    pub current_ratio: Decimal,
    pub quick_ratio: Decimal,
    pub debt_to_equity: Decimal,
    pub debt_to_assets: Decimal,
    pub roa: Decimal,
    pub roe: Decimal,
    pub net_income: Decimal,
    pub gross_margin: Decimal,
    pub operating_margin: Decimal,
    pub net_margin: Decimal,
}

pub fn derive_ratios(i: &RatioInputs) -> RatioMetrics {
    let pl = derive_profit_loss(&i.profit_and_loss());
    let m = RatioMetrics {
        current_ratio: guarded_div(i.current_assets(), i.current_liabilities()),
        quick_ratio: guarded_div(i.current_assets() - i.inventory(), i.current_liabilities()),
        debt_to_equity: guarded_div(i.total_liabilities(), i.equity()),
        debt_to_assets: guarded_div(i.total_liabilities(), i.total_assets()),
        roa: guarded_div(pl.net_income, i.total_assets()),
        roe: guarded_div(pl.net_income, i.equity()),
        net_income: pl.net_income,
        gross_margin: pl.gross_margin,
        operating_margin: pl.operating_margin,
        net_margin: pl.net_margin,
    };
    debug!(current = %m.current_ratio, de = %m.debt_to_equity, "ratios derived");
    m
}

impl RatioMetrics {
    pub fn value(&self, kind: RatioKind) -> Decimal {
        match kind {
            RatioKind::CurrentRatio => self.current_ratio,
            RatioKind::QuickRatio => self.quick_ratio,
            RatioKind::DebtToEquity => self.debt_to_equity,
            RatioKind::DebtToAssets => self.debt_to_assets,
            RatioKind::ReturnOnAssets => self.roa,
            RatioKind::ReturnOnEquity => self.roe,
        }
    }

    pub fn status(&self, kind: RatioKind) -> Status {
        classify(kind, self.value(kind))
    }

    /// `(kind, value, status)` for every classified ratio.
    pub fn statuses(&self) -> Vec<(RatioKind, Decimal, Status)> {
        RatioKind::ALL
            .iter()
            .map(|&k| (k, self.value(k), self.status(k)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::{InputModel, RatioField};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_liquid() {
        let m = derive_ratios(&RatioInputs::default());
        assert_eq!(m.current_ratio, dec!(2));
        assert_eq!(m.quick_ratio, dec!(1.6));
        assert_eq!(m.status(RatioKind::CurrentRatio), Status::Strong);
        assert_eq!(m.status(RatioKind::QuickRatio), Status::Strong);
        assert_eq!(m.debt_to_equity, dec!(1.5));
        assert_eq!(m.status(RatioKind::DebtToEquity), Status::Moderate);
        assert_eq!(m.debt_to_assets, dec!(0.6));
        assert_eq!(m.status(RatioKind::DebtToAssets), Status::Moderate);
        assert_eq!(m.net_income, dec!(250000));
        assert_eq!(m.roa, dec!(0.125));
        assert_eq!(m.roe, dec!(0.3125));
        assert_eq!(m.statuses().len(), 6);
    }

    #[test]
    fn every_zero_denominator_yields_zero() {
        let mut i = RatioInputs::default();
        i.set(RatioField::CurrentLiabilities, Decimal::ZERO).unwrap();
        i.set(RatioField::Equity, Decimal::ZERO).unwrap();
        i.set(RatioField::TotalAssets, Decimal::ZERO).unwrap();
        let m = derive_ratios(&i);
        assert_eq!(m.current_ratio, Decimal::ZERO);
        assert_eq!(m.quick_ratio, Decimal::ZERO);
        assert_eq!(m.debt_to_equity, Decimal::ZERO);
        assert_eq!(m.debt_to_assets, Decimal::ZERO);
        assert_eq!(m.roa, Decimal::ZERO);
        assert_eq!(m.roe, Decimal::ZERO);
    }

    #[test]
    fn quick_ratio_can_go_negative_on_contradictory_inputs() {
        let mut i = RatioInputs::default();
        i.set(RatioField::Inventory, dec!(1500000)).unwrap();
        assert_eq!(derive_ratios(&i).quick_ratio, dec!(-1));
    }

    proptest! {
        #[test]
        fn zero_denominators_for_any_numerator(ca in 0i64..1_000_000_000, tl in 0i64..1_000_000_000, rev in 0i64..1_000_000_000) {
            let mut i = RatioInputs::zeroed();
            i.set(RatioField::CurrentAssets, Decimal::new(ca, 0)).unwrap();
            i.set(RatioField::TotalLiabilities, Decimal::new(tl, 0)).unwrap();
            i.set(RatioField::Revenue, Decimal::new(rev, 0)).unwrap();
            let m = derive_ratios(&i);
            for kind in RatioKind::ALL {
                prop_assert_eq!(m.value(kind), Decimal::ZERO);
            }
            prop_assert_eq!(m.clone(), derive_ratios(&i));
        }
    }
}
