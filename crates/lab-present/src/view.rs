//! Page views: everything a page shows, already formatted.
//!
//! Views keep the derived record next to its formatted form so a renderer
//! can choose either. They are rebuilt from inputs on every call.

use crate::badge::Badge;
use crate::chart::{
    balance_bars, extra_trend, margin_bars, profit_loss_waterfall, profit_trend, ratio_bars, Bar,
    Series, WaterfallStep,
};
use crate::format::Formatter;
use crate::statement::{balance_sheet_statement, breakdown_statement, profit_loss_statement, StatementRow};
use lab_core::{BalanceSheetInputs, LabConfig, ProfitLossBreakdown, ProfitLossInputs, RatioInputs};
use lab_metrics::{
    check_reported_net_income, derive_balance_sheet, guarded_div, derive_breakdown, derive_profit_loss, derive_ratios,
    ratio_input_inconsistencies, threshold, BalanceSheetMetrics, Direction, Inconsistency, Lever,
    ProfitLossMetrics, RatioKind, RatioMetrics, Side,
};
use lab_scenarios::{CoffeeShopOutcome, RandomChallenge, ScenarioError, ScenarioTable, StageModel, StageSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// A labelled headline number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub label: String,
    pub value: String,
    /// Signed change against a reference, when there is one.
    pub change: Option<String>,
}

impl Figure {
    fn new(label: impl Into<String>, value: String) -> Self {
        Self {
            label: label.into(),
            value,
            change: None,
        }
    }

    fn with_change(mut self, change: String) -> Self {
        self.change = Some(change);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemediationHint {
    pub lever: Lever,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceSheetView {
    pub metrics: BalanceSheetMetrics,
    pub rows: Vec<StatementRow>,
    pub status: Badge,
    /// `assets - (liabilities + equity)`, formatted.
    pub difference: String,
    pub remediation: Vec<RemediationHint>,
    pub chart: Vec<Bar>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfitLossView {
    pub metrics: ProfitLossMetrics,
    pub rows: Vec<StatementRow>,
    pub gross: Badge,
    pub operating: Badge,
    pub net: Badge,
    pub waterfall: Vec<WaterfallStep>,
    pub margins: Vec<Bar>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RatioLine {
    pub kind: RatioKind,
    pub value: String,
    pub badge: Badge,
    /// Threshold table row, e.g. `strong >= 1.50, acceptable >= 1.00, otherwise weak`.
    pub guide: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatioView {
    pub metrics: RatioMetrics,
    pub lines: Vec<RatioLine>,
    pub net_income: Figure,
    pub liquidity: Vec<Bar>,
    pub leverage: Vec<Bar>,
    pub profitability: Vec<Bar>,
    pub warnings: Vec<String>,
}

/// Narrative header shown above a scenario stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageHeader {
    pub scenario: String,
    pub label: String,
    pub title: Option<String>,
    pub story: String,
    pub note: Option<String>,
    pub phase: Option<String>,
    pub advice: Vec<String>,
    pub extras: Vec<Figure>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoffeeShopView {
    pub outcome: CoffeeShopOutcome,
    pub verdict: Badge,
    pub figures: Vec<Figure>,
    pub insights: Vec<&'static str>,
    pub statement: ProfitLossView,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RandomChallengeView {
    pub seed: u64,
    pub business: &'static str,
    pub statement: ProfitLossView,
}

/// Everything one call can render.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    BalanceSheet(BalanceSheetView),
    ProfitLoss(ProfitLossView),
    ProfitLossDetail(ProfitLossView),
    Ratios(RatioView),
    ProfitLossStage {
        stage: StageHeader,
        statement: ProfitLossView,
        trend: Vec<Series>,
    },
    BalanceSheetStage {
        stage: StageHeader,
        statement: BalanceSheetView,
    },
    CoffeeShop(CoffeeShopView),
    RandomChallenge(RandomChallengeView),
}

/// Builds page views under one configuration.
#[derive(Clone, Debug, Default)]
pub struct Presenter {
    cfg: LabConfig,
    fmt: Formatter,
}

impl Presenter {
    pub fn new(cfg: LabConfig) -> Self {
        let fmt = Formatter::new(&cfg);
        Self { cfg, fmt }
    }

    pub fn formatter(&self) -> &Formatter {
        &self.fmt
    }

    pub fn config(&self) -> &LabConfig {
        &self.cfg
    }

    pub fn balance_sheet(&self, i: &BalanceSheetInputs) -> BalanceSheetView {
        let m = derive_balance_sheet(i);
        let balanced = m.is_balanced(self.cfg.balance_tolerance);
        let remediation = m
            .remediation()
            .map(|r| r.levers.iter().map(|l| self.hint(l)).collect())
            .unwrap_or_default();
        BalanceSheetView {
            rows: balance_sheet_statement(i, &m, &self.fmt),
            status: Badge::balanced(balanced),
            difference: self.fmt.currency(m.balance_delta),
            remediation,
            chart: balance_bars(&m, &self.fmt),
            metrics: m,
        }
    }

    pub fn profit_loss(&self, i: &ProfitLossInputs, reported_net_income: Option<Decimal>) -> ProfitLossView {
        let m = derive_profit_loss(i);
        let rows = profit_loss_statement(&m, &self.fmt);
        self.statement_view(m, rows, reported_net_income)
    }

    pub fn profit_loss_detail(&self, b: &ProfitLossBreakdown, reported_net_income: Option<Decimal>) -> ProfitLossView {
        let m = derive_breakdown(b);
        let rows = breakdown_statement(b, &m, &self.fmt);
        self.statement_view(m, rows, reported_net_income)
    }

    pub fn ratios(&self, i: &RatioInputs, reported_net_income: Option<Decimal>) -> RatioView {
        let m = derive_ratios(i);
        let lines = m
            .statuses()
            .into_iter()
            .map(|(kind, value, status)| RatioLine {
                kind,
                value: self.ratio_value(kind, value),
                badge: Badge::ratio(kind, status),
                guide: self.guide(kind),
            })
            .collect();
        let mut warnings: Vec<String> = ratio_input_inconsistencies(i, self.cfg.balance_tolerance)
            .iter()
            .map(|c| self.inconsistency(c))
            .collect();
        warnings.extend(self.net_income_warning(m.net_income, reported_net_income));
        let [liquidity, leverage, profitability] = ratio_bars(&m, &self.fmt);
        RatioView {
            net_income: Figure::new("Net Income", self.fmt.currency(m.net_income)),
            lines,
            liquidity,
            leverage,
            profitability,
            warnings,
            metrics: m,
        }
    }

    /// Stage `k` of a P&L scenario, optionally as running totals.
    pub fn profit_loss_stage(
        &self,
        table: &ScenarioTable<ProfitLossInputs>,
        k: usize,
        cumulative: bool,
    ) -> Result<PageView, ScenarioError> {
        let snapshot = if cumulative { table.cumulative(k)? } else { table.select(k)? };
        let stages = table.trend(k)?;
        let mut trend = profit_trend(&stages);
        trend.extend(snapshot.extras.keys().filter_map(|key| extra_trend(&stages, key)));
        let mut stage = self.header(table, &snapshot);
        if let (false, Some(users)) = (cumulative, snapshot.extras.get("users")) {
            let arpu = guarded_div(snapshot.inputs.revenue(), *users);
            stage.extras.push(Figure::new("revenue per user", self.fmt.unit_amount(arpu)));
        }
        debug!(scenario = %table.id, stage = k, cumulative, "profit and loss stage rendered");
        Ok(PageView::ProfitLossStage {
            stage,
            statement: self.profit_loss(&snapshot.inputs, None),
            trend,
        })
    }

    /// Stage `k` of a balance sheet scenario.
    pub fn balance_sheet_stage(
        &self,
        table: &ScenarioTable<BalanceSheetInputs>,
        k: usize,
    ) -> Result<PageView, ScenarioError> {
        let snapshot = table.select(k)?;
        Ok(PageView::BalanceSheetStage {
            stage: self.header(table, &snapshot),
            statement: self.balance_sheet(&snapshot.inputs),
        })
    }

    pub fn coffee_shop(&self, outcome: &CoffeeShopOutcome) -> CoffeeShopView {
        let m = &outcome.metrics;
        let figures = vec![
            Figure::new("Revenue", self.fmt.currency(m.revenue))
                .with_change(self.fmt.currency_change(outcome.revenue_change)),
            Figure::new("Total Expenses", self.fmt.currency(m.total_expenses)),
            Figure::new("Net Income", self.fmt.currency(m.net_income))
                .with_change(self.fmt.currency_change(outcome.profit_change)),
            Figure::new("Net Margin", self.fmt.percent(m.net_margin)),
            Figure::new("Profit per Coffee", self.fmt.unit_amount(outcome.profit_per_unit)),
        ];
        CoffeeShopView {
            verdict: Badge::verdict(outcome.verdict),
            figures,
            insights: outcome.insights.iter().map(|i| i.message()).collect(),
            statement: self.profit_loss(&outcome.inputs, None),
            outcome: outcome.clone(),
        }
    }

    pub fn random_challenge(&self, c: &RandomChallenge) -> RandomChallengeView {
        RandomChallengeView {
            seed: c.seed,
            business: c.business,
            statement: self.profit_loss(&c.inputs, None),
        }
    }

    fn statement_view(&self, m: ProfitLossMetrics, rows: Vec<StatementRow>, reported: Option<Decimal>) -> ProfitLossView {
        let status = m.status();
        ProfitLossView {
            rows,
            gross: Badge::profit(status.gross),
            operating: Badge::profit(status.operating),
            net: Badge::profit(status.net),
            waterfall: profit_loss_waterfall(&m),
            margins: margin_bars(m.gross_margin, m.operating_margin, m.net_margin, &self.fmt),
            warnings: self.net_income_warning(m.net_income, reported).into_iter().collect(),
            metrics: m,
        }
    }

    fn header<M: StageModel>(&self, table: &ScenarioTable<M>, s: &StageSnapshot<M>) -> StageHeader {
        let phase = table.phase_for(s.index);
        let extras = s
            .extras
            .iter()
            .map(|(key, value)| {
                let figure = Figure::new(key.as_str(), self.fmt.count(*value));
                match table.extra_delta(s.index, key) {
                    Some(delta) => figure.with_change(format!(
                        "{}{}",
                        if delta.is_sign_negative() { "" } else { "+" },
                        self.fmt.count(delta)
                    )),
                    None => figure,
                }
            })
            .collect();
        StageHeader {
            scenario: table.title.clone(),
            label: s.label.clone(),
            title: s.title.clone(),
            story: s.story.clone(),
            note: s.note.clone(),
            phase: phase.map(|p| p.title.clone()),
            advice: phase.map(|p| p.notes.clone()).unwrap_or_default(),
            extras,
        }
    }

    fn hint(&self, lever: &Lever) -> RemediationHint {
        let verb = match lever.direction {
            Direction::Increase => "Increase",
            Direction::Decrease => "Decrease",
        };
        let side = match lever.side {
            Side::Assets => "assets",
            Side::Liabilities => "liabilities",
            Side::Equity => "equity",
        };
        let mut text = format!("{verb} {side} by {}", self.fmt.currency(lever.amount));
        if !lever.feasible {
            text.push_str(" (more than the current total)");
        }
        RemediationHint {
            lever: lever.clone(),
            text,
        }
    }

    fn ratio_value(&self, kind: RatioKind, value: Decimal) -> String {
        if kind.is_percentage() {
            self.fmt.percent(value)
        } else {
            self.fmt.ratio(value)
        }
    }

    fn guide(&self, kind: RatioKind) -> String {
        let t = threshold(kind);
        let mut parts: Vec<String> = t
            .bands
            .iter()
            .map(|b| format!("{} >= {}", b.status.label(), self.ratio_value(kind, b.at_least)))
            .collect();
        parts.push(format!("otherwise {}", t.floor.label()));
        parts.join(", ")
    }

    fn inconsistency(&self, c: &Inconsistency) -> String {
        let f = &self.fmt;
        match c {
            Inconsistency::InventoryExceedsCurrentAssets {
                inventory,
                current_assets,
            } => format!(
                "Inventory ({}) exceeds current assets ({})",
                f.currency(*inventory),
                f.currency(*current_assets)
            ),
            Inconsistency::CurrentAssetsExceedTotalAssets {
                current_assets,
                total_assets,
            } => format!(
                "Current assets ({}) exceed total assets ({})",
                f.currency(*current_assets),
                f.currency(*total_assets)
            ),
            Inconsistency::CurrentLiabilitiesExceedTotalLiabilities {
                current_liabilities,
                total_liabilities,
            } => format!(
                "Current liabilities ({}) exceed total liabilities ({})",
                f.currency(*current_liabilities),
                f.currency(*total_liabilities)
            ),
            Inconsistency::Unbalanced {
                total_assets,
                liabilities_plus_equity,
                delta,
            } => format!(
                "Total assets ({}) differ from liabilities plus equity ({}) by {}",
                f.currency(*total_assets),
                f.currency(*liabilities_plus_equity),
                f.currency(*delta)
            ),
        }
    }

    fn net_income_warning(&self, derived: Decimal, reported: Option<Decimal>) -> Option<String> {
        let mismatch = check_reported_net_income(derived, reported?, self.cfg.net_income_tolerance)?;
        Some(format!(
            "Reported net income {} differs from EBT - tax = {} by {}",
            self.fmt.currency(mismatch.reported),
            self.fmt.currency(mismatch.derived),
            self.fmt.currency_change(mismatch.difference)
        ))
    }
}
