//! P&L profit levels and margins.

use crate::guarded_div;
use crate::status::ProfitStatus;
use lab_core::{ProfitLossBreakdown, ProfitLossInputs};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Derived P&L record. Margins are fractions of revenue (0.25 = 25%).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfitLossMetrics {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub operating_expenses: Decimal,
    pub interest_expense: Decimal,
    pub tax_expense: Decimal,
    /// COGS + OpEx + interest + tax.
    pub total_expenses: Decimal,
    pub gross_profit: Decimal,
    pub operating_profit: Decimal,
    pub ebt: Decimal,
    pub net_income: Decimal,
    pub gross_margin: Decimal,
    pub operating_margin: Decimal,
    pub net_margin: Decimal,
}

/// Profit status at each level of the statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProfitLossStatus {
    pub gross: ProfitStatus,
    pub operating: ProfitStatus,
    pub net: ProfitStatus,
}

/// `amount / revenue`, or `0` when revenue is zero.
pub fn share_of_revenue(amount: Decimal, revenue: Decimal) -> Decimal {
    guarded_div(amount, revenue)
}

fn from_totals(
    revenue: Decimal,
    cogs: Decimal,
    operating_expenses: Decimal,
    interest_expense: Decimal,
    tax_expense: Decimal,
) -> ProfitLossMetrics {
    let gross_profit = revenue - cogs;
    let operating_profit = gross_profit - operating_expenses;
    let ebt = operating_profit - interest_expense;
    let net_income = ebt - tax_expense;
    debug!(%revenue, %net_income, "profit and loss derived");
    ProfitLossMetrics {
        revenue,
        cogs,
        operating_expenses,
        interest_expense,
        tax_expense,
        total_expenses: cogs + operating_expenses + interest_expense + tax_expense,
        gross_profit,
        operating_profit,
        ebt,
        net_income,
        gross_margin: share_of_revenue(gross_profit, revenue),
        operating_margin: share_of_revenue(operating_profit, revenue),
        net_margin: share_of_revenue(net_income, revenue),
    }
}

/// Compute profit levels and margins from a summary P&L.
pub fn derive_profit_loss(i: &ProfitLossInputs) -> ProfitLossMetrics {
    from_totals(
        i.revenue(),
        i.cogs(),
        i.operating_expenses(),
        i.interest_expense(),
        i.tax_expense(),
    )
}

/// Compute profit levels and margins from the learn-mode line items.
///
/// Totals are summed without the per-field bound, so this never fails even
/// when the summary record could not hold them.
pub fn derive_breakdown(b: &ProfitLossBreakdown) -> ProfitLossMetrics {
    from_totals(
        b.total_revenue(),
        b.total_cogs(),
        b.total_operating_expenses(),
        b.interest_expense(),
        b.tax_expense(),
    )
}

impl ProfitLossMetrics {
    pub fn status(&self) -> ProfitLossStatus {
        ProfitLossStatus {
            gross: ProfitStatus::of(self.gross_profit),
            operating: ProfitStatus::of(self.operating_profit),
            net: ProfitStatus::of(self.net_income),
        }
    }

    /// Any line of the statement as a fraction of revenue.
    pub fn share(&self, amount: Decimal) -> Decimal {
        share_of_revenue(amount, self.revenue)
    }
}
