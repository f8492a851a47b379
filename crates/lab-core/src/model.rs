//! Per-page input records.

use crate::{validate_amount, InputModel, InvalidInput, LineItem};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declares a page record together with its line-item enum.
///
/// The record's fields stay private; reads go through generated getters and
/// writes through `InputModel::set`, which validates every amount.
macro_rules! line_items {
    (
        $(#[$model_meta:meta])*
        record $model:ident, field $field:ident, page $page:literal {
            $( $name:ident => $variant:ident, $label:literal, $default:expr; )+
        }
    ) => {
        #[doc = concat!("Line items of the `", $page, "` page.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $field {
            $( #[doc = $label] $variant, )+
        }

        impl LineItem for $field {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($name),)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn default_amount(self) -> Decimal {
                match self {
                    $(Self::$variant => $default,)+
                }
            }
        }

        $(#[$model_meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "BTreeMap<String, Decimal>")]
        pub struct $model {
            $($name: Decimal,)+
        }

        impl $model {
            $(
                #[doc = $label]
                pub fn $name(&self) -> Decimal {
                    self.$name
                }
            )+
        }

        impl Default for $model {
            fn default() -> Self {
                Self {
                    $($name: $default,)+
                }
            }
        }

        impl InputModel for $model {
            type Field = $field;
            const PAGE: &'static str = $page;

            fn get(&self, field: $field) -> Decimal {
                match field {
                    $($field::$variant => self.$name,)+
                }
            }

            fn set(&mut self, field: $field, value: Decimal) -> Result<(), InvalidInput> {
                let value = validate_amount(field.key(), value)?;
                match field {
                    $($field::$variant => self.$name = value,)+
                }
                Ok(())
            }

            fn zeroed() -> Self {
                Self {
                    $($name: Decimal::ZERO,)+
                }
            }
        }

        /// Missing keys keep their defaults; every present key is validated.
        impl TryFrom<BTreeMap<String, Decimal>> for $model {
            type Error = InvalidInput;

            fn try_from(values: BTreeMap<String, Decimal>) -> Result<Self, Self::Error> {
                let mut model = Self::default();
                model.apply_pairs(values.iter().map(|(k, v)| (k.as_str(), *v)))?;
                Ok(model)
            }
        }
    };
}

line_items! {
    /// Balance sheet inputs: assets, liabilities and equity line items.
    record BalanceSheetInputs, field BalanceSheetField, page "balance_sheet" {
        cash => Cash, "Cash & Cash Equivalents", dec!(200000);
        accounts_receivable => AccountsReceivable, "Accounts Receivable", dec!(150000);
        inventory => Inventory, "Inventory", dec!(100000);
        ppe => Ppe, "Property, Plant & Equipment", dec!(500000);
        intangible_assets => IntangibleAssets, "Intangible Assets", dec!(50000);
        accounts_payable => AccountsPayable, "Accounts Payable", dec!(80000);
        short_term_debt => ShortTermDebt, "Short-term Debt", dec!(70000);
        long_term_debt => LongTermDebt, "Long-term Debt", dec!(300000);
        share_capital => ShareCapital, "Share Capital", dec!(300000);
        retained_earnings => RetainedEarnings, "Retained Earnings", dec!(150000);
    }
}

line_items! {
    /// Summary P&L inputs for one period.
    record ProfitLossInputs, field ProfitLossField, page "profit_loss" {
        revenue => Revenue, "Revenue", dec!(1500000);
        cogs => Cogs, "Cost of Goods Sold", dec!(800000);
        operating_expenses => OperatingExpenses, "Operating Expenses", dec!(300000);
        interest_expense => InterestExpense, "Interest Expense", dec!(50000);
        tax_expense => TaxExpense, "Tax Expense", dec!(100000);
    }
}

line_items! {
    /// Learn-mode P&L inputs, broken down into individual revenue and cost lines.
    record ProfitLossBreakdown, field ProfitLossBreakdownField, page "profit_loss_detail" {
        product_sales => ProductSales, "Product Sales", dec!(500000);
        service_revenue => ServiceRevenue, "Service Revenue", dec!(200000);
        other_income => OtherIncome, "Other Income", dec!(50000);
        raw_materials => RawMaterials, "Raw Materials", dec!(150000);
        direct_labor => DirectLabor, "Direct Labor", dec!(100000);
        packaging => Packaging, "Packaging & Shipping", dec!(50000);
        marketing => Marketing, "Marketing & Advertising", dec!(50000);
        sales_salaries => SalesSalaries, "Sales Salaries", dec!(80000);
        rent => Rent, "Rent & Utilities", dec!(60000);
        admin_salaries => AdminSalaries, "Admin Salaries", dec!(70000);
        other_opex => OtherOpex, "Other Operating Expenses", dec!(40000);
        interest_expense => InterestExpense, "Interest Expense", dec!(30000);
        tax_expense => TaxExpense, "Tax Expense", dec!(50000);
    }
}

line_items! {
    /// Ratio page inputs: balance sheet aggregates plus the P&L lines.
    record RatioInputs, field RatioField, page "ratios" {
        current_assets => CurrentAssets, "Current Assets", dec!(1000000);
        inventory => Inventory, "Inventory", dec!(200000);
        total_assets => TotalAssets, "Total Assets", dec!(2000000);
        current_liabilities => CurrentLiabilities, "Current Liabilities", dec!(500000);
        total_liabilities => TotalLiabilities, "Total Liabilities", dec!(1200000);
        equity => Equity, "Equity", dec!(800000);
        revenue => Revenue, "Revenue", dec!(1500000);
        cogs => Cogs, "Cost of Goods Sold", dec!(800000);
        operating_expenses => OperatingExpenses, "Operating Expenses", dec!(300000);
        interest_expense => InterestExpense, "Interest Expense", dec!(50000);
        tax_expense => TaxExpense, "Tax Expense", dec!(100000);
    }
}

fn total(field: &'static str, parts: &[Decimal]) -> Result<Decimal, InvalidInput> {
    validate_amount(field, parts.iter().copied().sum())
}

impl ProfitLossBreakdown {
    /// Revenue streams: product sales + service revenue + other income.
    pub fn total_revenue(&self) -> Decimal {
        self.product_sales + self.service_revenue + self.other_income
    }

    /// Direct costs: raw materials + direct labor + packaging.
    pub fn total_cogs(&self) -> Decimal {
        self.raw_materials + self.direct_labor + self.packaging
    }

    /// Selling, general and administrative lines.
    pub fn total_operating_expenses(&self) -> Decimal {
        self.marketing + self.sales_salaries + self.rent + self.admin_salaries + self.other_opex
    }

    /// Collapse the breakdown into the summary P&L record.
    pub fn summarize(&self) -> Result<ProfitLossInputs, InvalidInput> {
        Ok(ProfitLossInputs {
            revenue: total("revenue", &[self.total_revenue()])?,
            cogs: total("cogs", &[self.total_cogs()])?,
            operating_expenses: total("operating_expenses", &[self.total_operating_expenses()])?,
            interest_expense: self.interest_expense,
            tax_expense: self.tax_expense,
        })
    }
}

impl RatioInputs {
    /// The P&L portion of the ratio page.
    pub fn profit_and_loss(&self) -> ProfitLossInputs {
        ProfitLossInputs {
            revenue: self.revenue,
            cogs: self.cogs,
            operating_expenses: self.operating_expenses,
            interest_expense: self.interest_expense,
            tax_expense: self.tax_expense,
        }
    }

    /// Assemble ratio inputs from a balance sheet and a P&L statement.
    pub fn from_statements(
        bs: &BalanceSheetInputs,
        pl: &ProfitLossInputs,
    ) -> Result<Self, InvalidInput> {
        Ok(Self {
            current_assets: total(
                "current_assets",
                &[bs.cash, bs.accounts_receivable, bs.inventory],
            )?,
            inventory: bs.inventory,
            total_assets: total(
                "total_assets",
                &[
                    bs.cash,
                    bs.accounts_receivable,
                    bs.inventory,
                    bs.ppe,
                    bs.intangible_assets,
                ],
            )?,
            current_liabilities: total(
                "current_liabilities",
                &[bs.accounts_payable, bs.short_term_debt],
            )?,
            total_liabilities: total(
                "total_liabilities",
                &[bs.accounts_payable, bs.short_term_debt, bs.long_term_debt],
            )?,
            equity: total("equity", &[bs.share_capital, bs.retained_earnings])?,
            revenue: pl.revenue,
            cogs: pl.cogs,
            operating_expenses: pl.operating_expenses,
            interest_expense: pl.interest_expense,
            tax_expense: pl.tax_expense,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_match_documented_values() {
        let bs = BalanceSheetInputs::default();
        for &field in BalanceSheetField::ALL {
            assert_eq!(bs.get(field), field.default_amount());
            assert!(bs.get(field) > Decimal::ZERO);
        }
        assert_eq!(bs.cash(), dec!(200000));
        assert_eq!(ProfitLossInputs::default().revenue(), dec!(1500000));
        assert_eq!(RatioInputs::default().equity(), dec!(800000));
    }

    #[test]
    fn set_rejects_negative_and_keeps_old_value() {
        let mut bs = BalanceSheetInputs::default();
        let err = bs.set(BalanceSheetField::Cash, dec!(-1)).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::Negative {
                field: "cash",
                value: dec!(-1)
            }
        );
        assert_eq!(bs.cash(), dec!(200000));
    }

    #[test]
    fn set_by_key_accepts_dashes() {
        let mut bs = BalanceSheetInputs::default();
        bs.set_by_key("accounts-receivable", dec!(10)).unwrap();
        assert_eq!(bs.accounts_receivable(), dec!(10));
        assert_eq!(
            bs.set_by_key("goodwill", dec!(1)),
            Err(InvalidInput::UnknownField("goodwill".to_string()))
        );
    }

    #[test]
    fn adjust_cannot_go_below_zero() {
        let mut pl = ProfitLossInputs::zeroed();
        pl.adjust(ProfitLossField::Revenue, dec!(100)).unwrap();
        pl.adjust(ProfitLossField::Revenue, dec!(-40)).unwrap();
        assert_eq!(pl.revenue(), dec!(60));
        assert!(matches!(
            pl.adjust(ProfitLossField::Revenue, dec!(-61)),
            Err(InvalidInput::Negative { field: "revenue", .. })
        ));
        assert_eq!(pl.revenue(), dec!(60));
    }

    #[test]
    fn accumulate_sums_field_wise() {
        let mut acc = ProfitLossInputs::zeroed();
        acc.accumulate(&ProfitLossInputs::default()).unwrap();
        acc.accumulate(&ProfitLossInputs::default()).unwrap();
        assert_eq!(acc.revenue(), dec!(3000000));
        assert_eq!(acc.tax_expense(), dec!(200000));
    }

    #[test]
    fn breakdown_summarizes_to_learn_mode_totals() {
        let pl = ProfitLossBreakdown::default().summarize().unwrap();
        assert_eq!(pl.revenue(), dec!(750000));
        assert_eq!(pl.cogs(), dec!(300000));
        assert_eq!(pl.operating_expenses(), dec!(300000));
        assert_eq!(pl.interest_expense(), dec!(30000));
        assert_eq!(pl.tax_expense(), dec!(50000));
    }

    #[test]
    fn ratio_inputs_from_default_statements() {
        let r = RatioInputs::from_statements(
            &BalanceSheetInputs::default(),
            &ProfitLossInputs::default(),
        )
        .unwrap();
        assert_eq!(r.current_assets(), dec!(450000));
        assert_eq!(r.total_assets(), dec!(1000000));
        assert_eq!(r.current_liabilities(), dec!(150000));
        assert_eq!(r.total_liabilities(), dec!(450000));
        assert_eq!(r.equity(), dec!(450000));
        assert_eq!(r.profit_and_loss(), ProfitLossInputs::default());
    }

    #[test]
    fn deserialize_validates_and_fills_defaults() {
        let bs: BalanceSheetInputs = serde_json::from_str(r#"{"cash": "10"}"#).unwrap();
        assert_eq!(bs.cash(), dec!(10));
        assert_eq!(bs.ppe(), dec!(500000));
        assert!(serde_json::from_str::<BalanceSheetInputs>(r#"{"cash": "-10"}"#).is_err());
        assert!(serde_json::from_str::<BalanceSheetInputs>(r#"{"bogus": "1"}"#).is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_values() {
        let mut pl = ProfitLossInputs::default();
        pl.set(ProfitLossField::Cogs, dec!(123.45)).unwrap();
        let s = serde_json::to_string(&pl).unwrap();
        let back: ProfitLossInputs = serde_json::from_str(&s).unwrap();
        assert_eq!(back, pl);
    }

    proptest! {
        #[test]
        fn set_then_get_returns_value(cents in 0i64..100_000_000_000_000, idx in 0usize..10) {
            let field = BalanceSheetField::ALL[idx];
            let mut bs = BalanceSheetInputs::default();
            let v = Decimal::new(cents, 2);
            bs.set(field, v).unwrap();
            prop_assert_eq!(bs.get(field), v);
        }

        #[test]
        fn keys_roundtrip(idx in 0usize..13) {
            let field = ProfitLossBreakdownField::ALL[idx];
            prop_assert_eq!(ProfitLossBreakdownField::from_key(field.key()).unwrap(), field);
        }
    }
}
