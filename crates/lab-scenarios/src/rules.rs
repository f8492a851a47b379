//! Derived-input rules a scenario applies after its stage overlay.

use lab_core::{BalanceSheetInputs, InputModel, InvalidInput, ProfitLossField, ProfitLossInputs};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum StageRule {
    /// Tax is `rate` times earnings before tax when positive, otherwise zero.
    TaxOnProfit { rate: Decimal },
    /// COGS is a fixed share of revenue.
    CogsShareOfRevenue { share: Decimal },
}

impl fmt::Display for StageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageRule::TaxOnProfit { rate } => write!(f, "tax_on_profit({rate})"),
            StageRule::CogsShareOfRevenue { share } => write!(f, "cogs_share_of_revenue({share})"),
        }
    }
}

/// Input records that can appear in a scenario table.
pub trait StageModel: InputModel {
    fn supports(rule: &StageRule) -> bool;

    /// Recompute the inputs a rule owns. Callers only pass supported rules.
    fn apply_rule(&mut self, rule: &StageRule) -> Result<(), InvalidInput>;
}

impl StageModel for ProfitLossInputs {
    fn supports(_: &StageRule) -> bool {
        true
    }

    fn apply_rule(&mut self, rule: &StageRule) -> Result<(), InvalidInput> {
        match *rule {
            StageRule::TaxOnProfit { rate } => {
                let ebt = self.revenue() - self.cogs() - self.operating_expenses() - self.interest_expense();
                let tax = if ebt > Decimal::ZERO { ebt * rate } else { Decimal::ZERO };
                self.set(ProfitLossField::TaxExpense, tax)
            }
            StageRule::CogsShareOfRevenue { share } => {
                self.set(ProfitLossField::Cogs, self.revenue() * share)
            }
        }
    }
}

impl StageModel for BalanceSheetInputs {
    fn supports(_: &StageRule) -> bool {
        false
    }

    fn apply_rule(&mut self, _: &StageRule) -> Result<(), InvalidInput> {
        Ok(())
    }
}
