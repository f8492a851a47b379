//! Chart-ready series. Values are `f64` because renderers expect floats;
//! labels are preformatted with the same [`Formatter`] as the tables.

use crate::format::{percent_points, to_f64, Formatter};
use lab_core::ProfitLossInputs;
use lab_metrics::{derive_profit_loss, BalanceSheetMetrics, ProfitLossMetrics, RatioKind, RatioMetrics};
use lab_scenarios::StageSnapshot;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Moves the running total by `value`.
    Relative,
    /// Shows the running total; `value` equals it.
    Total,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WaterfallStep {
    pub label: &'static str,
    pub measure: Measure,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: usize,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Revenue down to net income, costs as negative steps.
pub fn profit_loss_waterfall(m: &ProfitLossMetrics) -> Vec<WaterfallStep> {
    let step = |label, measure, value: Decimal| WaterfallStep {
        label,
        measure,
        value: to_f64(value),
    };
    vec![
        step("Revenue", Measure::Relative, m.revenue),
        step("COGS", Measure::Relative, -m.cogs),
        step("Gross Profit", Measure::Total, m.gross_profit),
        step("OpEx", Measure::Relative, -m.operating_expenses),
        step("Operating Profit", Measure::Total, m.operating_profit),
        step("Interest", Measure::Relative, -m.interest_expense),
        step("Tax", Measure::Relative, -m.tax_expense),
        step("Net Income", Measure::Total, m.net_income),
    ]
}

/// Margins as percentages (46.7, not 0.467).
pub fn margin_bars(gross: Decimal, operating: Decimal, net: Decimal, fmt: &Formatter) -> Vec<Bar> {
    [("Gross Margin", gross), ("Operating Margin", operating), ("Net Margin", net)]
        .into_iter()
        .map(|(label, fraction)| percent_bar(label, fraction, fmt))
        .collect()
}

/// Assets against liabilities plus equity.
pub fn balance_bars(m: &BalanceSheetMetrics, fmt: &Formatter) -> Vec<Bar> {
    [("Assets", m.total_assets), ("Liabilities + Equity", m.liabilities_plus_equity)]
        .into_iter()
        .map(|(label, amount)| Bar {
            label: label.to_string(),
            value: to_f64(amount),
            text: fmt.currency(amount),
        })
        .collect()
}

/// Liquidity, leverage and profitability groups, in that order.
pub fn ratio_bars(m: &RatioMetrics, fmt: &Formatter) -> [Vec<Bar>; 3] {
    let plain = |kind: RatioKind| Bar {
        label: kind.label().to_string(),
        value: to_f64(m.value(kind)),
        text: fmt.ratio(m.value(kind)),
    };
    let mut profitability = margin_bars(m.gross_margin, m.operating_margin, m.net_margin, fmt);
    profitability.push(percent_bar("ROA", m.roa, fmt));
    profitability.push(percent_bar("ROE", m.roe, fmt));
    [
        vec![plain(RatioKind::CurrentRatio), plain(RatioKind::QuickRatio)],
        vec![plain(RatioKind::DebtToEquity), plain(RatioKind::DebtToAssets)],
        profitability,
    ]
}

/// Revenue and net income per stage.
pub fn profit_trend(stages: &[StageSnapshot<ProfitLossInputs>]) -> Vec<Series> {
    let mut revenue = Vec::with_capacity(stages.len());
    let mut profit = Vec::with_capacity(stages.len());
    for s in stages {
        let m = derive_profit_loss(&s.inputs);
        revenue.push(Point {
            x: s.index,
            y: to_f64(m.revenue),
        });
        profit.push(Point {
            x: s.index,
            y: to_f64(m.net_income),
        });
    }
    vec![
        Series {
            name: "Revenue".to_string(),
            points: revenue,
        },
        Series {
            name: "Net Profit".to_string(),
            points: profit,
        },
    ]
}

/// One extra figure (e.g. `users`) per stage, skipping stages without it.
pub fn extra_trend<M>(stages: &[StageSnapshot<M>], key: &str) -> Option<Series> {
    let points: Vec<Point> = stages
        .iter()
        .filter_map(|s| {
            s.extras.get(key).map(|v| Point {
                x: s.index,
                y: to_f64(*v),
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    Some(Series {
        name: key.to_string(),
        points,
    })
}

fn percent_bar(label: &str, fraction: Decimal, fmt: &Formatter) -> Bar {
    Bar {
        label: label.to_string(),
        value: to_f64(percent_points(fraction)),
        text: fmt.percent(fraction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::{BalanceSheetInputs, RatioInputs};
    use lab_metrics::{derive_balance_sheet, derive_ratios};
    use lab_scenarios::Catalog;

    #[test]
    fn waterfall_totals_match_the_running_sum() {
        let m = derive_profit_loss(&ProfitLossInputs::default());
        let steps = profit_loss_waterfall(&m);
        let mut running = 0.0;
        for s in &steps {
            match s.measure {
                Measure::Relative => running += s.value,
                Measure::Total => assert_eq!(s.value, running, "{}", s.label),
            }
        }
        assert_eq!(steps.last().unwrap().value, 250000.0);
    }

    #[test]
    fn ratio_groups() {
        let m = derive_ratios(&RatioInputs::default());
        let [liquidity, leverage, profitability] = ratio_bars(&m, &Formatter::default());
        assert_eq!(liquidity[0].text, "2.00");
        assert!((liquidity[1].value - 1.6).abs() < 1e-9);
        assert_eq!(leverage[0].text, "1.50");
        assert_eq!(profitability.len(), 5);
        assert_eq!(profitability[4].text, "31.2%");
    }

    #[test]
    fn balance_bars_show_the_gap() {
        let m = derive_balance_sheet(&BalanceSheetInputs::default());
        let bars = balance_bars(&m, &Formatter::default());
        assert_eq!(bars[0].value - bars[1].value, 100000.0);
    }

    #[test]
    fn mobile_trend_series() {
        let t = Catalog::builtin().unwrap().profit_loss_scenario("mobile-app").unwrap();
        let stages = t.trend(4).unwrap();
        let series = profit_trend(&stages);
        assert_eq!(series[0].points.len(), 4);
        // 2000 - 300 - 150000
        assert_eq!(series[1].points[0].y, -148300.0);
        let users = extra_trend(&stages, "users").unwrap();
        assert_eq!(users.points[3], Point { x: 4, y: 150000.0 });
        assert!(extra_trend(&stages, "downloads").is_none());
    }
}
