//! Statement tables with a common-size column.

use crate::format::Formatter;
use lab_core::{BalanceSheetField, BalanceSheetInputs, InputModel, LineItem, ProfitLossBreakdown, ProfitLossBreakdownField};
use lab_metrics::{guarded_div, BalanceSheetMetrics, ProfitLossMetrics};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Line,
    Subtotal,
    Total,
}

/// One statement line. `share` is the amount relative to the statement base
/// (revenue for a P&L, total assets for a balance sheet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatementRow {
    pub label: String,
    pub kind: RowKind,
    pub amount: Decimal,
    pub display: String,
    pub share: String,
}

struct Rows<'a> {
    fmt: &'a Formatter,
    base: Decimal,
    rows: Vec<StatementRow>,
}

impl<'a> Rows<'a> {
    fn new(fmt: &'a Formatter, base: Decimal) -> Self {
        Self {
            fmt,
            base,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, label: impl Into<String>, kind: RowKind, amount: Decimal) -> &mut Self {
        self.rows.push(StatementRow {
            label: label.into(),
            kind,
            amount,
            display: self.fmt.currency(amount),
            share: self.fmt.percent(guarded_div(amount, self.base)),
        });
        self
    }

    fn lines<F: LineItem>(&mut self, fields: &[F], amount: impl Fn(F) -> Decimal) -> &mut Self {
        for &f in fields {
            self.push(f.label(), RowKind::Line, amount(f));
        }
        self
    }
}

/// Summary P&L from revenue down to net income.
pub fn profit_loss_statement(m: &ProfitLossMetrics, fmt: &Formatter) -> Vec<StatementRow> {
    let mut r = Rows::new(fmt, m.revenue);
    r.push("Revenue", RowKind::Line, m.revenue)
        .push("Less: Cost of Goods Sold", RowKind::Line, m.cogs)
        .push("= Gross Profit", RowKind::Subtotal, m.gross_profit)
        .push("Less: Operating Expenses", RowKind::Line, m.operating_expenses)
        .push("= Operating Profit (EBIT)", RowKind::Subtotal, m.operating_profit)
        .push("Less: Interest Expense", RowKind::Line, m.interest_expense)
        .push("= Earnings Before Tax", RowKind::Subtotal, m.ebt)
        .push("Less: Income Tax", RowKind::Line, m.tax_expense)
        .push("= Net Income", RowKind::Total, m.net_income);
    r.rows
}

/// Learn-mode P&L listing every revenue and cost line.
pub fn breakdown_statement(b: &ProfitLossBreakdown, m: &ProfitLossMetrics, fmt: &Formatter) -> Vec<StatementRow> {
    use ProfitLossBreakdownField as F;
    let mut r = Rows::new(fmt, m.revenue);
    r.lines(&[F::ProductSales, F::ServiceRevenue, F::OtherIncome], |f| b.get(f))
        .push("Total Revenue", RowKind::Subtotal, m.revenue)
        .lines(&[F::RawMaterials, F::DirectLabor, F::Packaging], |f| b.get(f))
        .push("Total COGS", RowKind::Subtotal, m.cogs)
        .push("Gross Profit", RowKind::Subtotal, m.gross_profit)
        .lines(
            &[F::Marketing, F::SalesSalaries, F::Rent, F::AdminSalaries, F::OtherOpex],
            |f| b.get(f),
        )
        .push("Total Operating Expenses", RowKind::Subtotal, m.operating_expenses)
        .push("Operating Profit", RowKind::Subtotal, m.operating_profit)
        .lines(&[F::InterestExpense], |f| b.get(f))
        .push("Earnings Before Tax", RowKind::Subtotal, m.ebt)
        .lines(&[F::TaxExpense], |f| b.get(f))
        .push("Net Income", RowKind::Total, m.net_income);
    r.rows
}

/// Balance sheet grouped into assets, liabilities and equity.
pub fn balance_sheet_statement(
    i: &BalanceSheetInputs,
    m: &BalanceSheetMetrics,
    fmt: &Formatter,
) -> Vec<StatementRow> {
    use BalanceSheetField as F;
    let mut r = Rows::new(fmt, m.total_assets);
    r.lines(&[F::Cash, F::AccountsReceivable, F::Inventory], |f| i.get(f))
        .push("Current Assets", RowKind::Subtotal, m.current_assets)
        .lines(&[F::Ppe, F::IntangibleAssets], |f| i.get(f))
        .push("Total Assets", RowKind::Total, m.total_assets)
        .lines(&[F::AccountsPayable, F::ShortTermDebt], |f| i.get(f))
        .push("Current Liabilities", RowKind::Subtotal, m.current_liabilities)
        .lines(&[F::LongTermDebt], |f| i.get(f))
        .push("Total Liabilities", RowKind::Subtotal, m.total_liabilities)
        .lines(&[F::ShareCapital, F::RetainedEarnings], |f| i.get(f))
        .push("Total Equity", RowKind::Subtotal, m.total_equity)
        .push("Total Liabilities + Equity", RowKind::Total, m.liabilities_plus_equity);
    r.rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_metrics::{derive_balance_sheet, derive_breakdown, derive_profit_loss};
    use lab_core::ProfitLossInputs;

    #[test]
    fn profit_loss_rows_carry_common_size() {
        let m = derive_profit_loss(&ProfitLossInputs::default());
        let rows = profit_loss_statement(&m, &Formatter::default());
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].share, "100.0%");
        assert_eq!(rows[2].display, "$700,000");
        assert_eq!(rows[2].share, "46.7%");
        let last = rows.last().unwrap();
        assert_eq!(last.kind, RowKind::Total);
        assert_eq!(last.display, "$250,000");
        assert_eq!(last.share, "16.7%");
    }

    #[test]
    fn zero_revenue_shares_are_zero() {
        let m = derive_profit_loss(&ProfitLossInputs::zeroed());
        assert!(profit_loss_statement(&m, &Formatter::default())
            .iter()
            .all(|r| r.share == "0.0%"));
    }

    #[test]
    fn breakdown_lists_every_line_item() {
        let b = ProfitLossBreakdown::default();
        let rows = breakdown_statement(&b, &derive_breakdown(&b), &Formatter::default());
        let lines = rows.iter().filter(|r| r.kind == RowKind::Line).count();
        assert_eq!(lines, ProfitLossBreakdownField::ALL.len());
        let total_revenue = rows.iter().find(|r| r.label == "Total Revenue").unwrap();
        assert_eq!(total_revenue.display, "$750,000");
        assert_eq!(rows.last().unwrap().display, "$70,000");
    }

    #[test]
    fn balance_sheet_shares_are_of_total_assets() {
        let i = BalanceSheetInputs::default();
        let rows = balance_sheet_statement(&i, &derive_balance_sheet(&i), &Formatter::default());
        assert_eq!(rows[0].label, "Cash & Cash Equivalents");
        assert_eq!(rows[0].share, "20.0%");
        let total = rows.iter().find(|r| r.label == "Total Assets").unwrap();
        assert_eq!(total.display, "$1,000,000");
        assert_eq!(rows.last().unwrap().display, "$900,000");
    }
}
