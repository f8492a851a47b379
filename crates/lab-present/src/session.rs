//! Per-user lab state: the current page, the four editable records and
//! whichever scenario or challenge is being played.

use crate::view::{PageView, Presenter};
use lab_core::{
    BalanceSheetInputs, InputModel, InvalidInput, LineItem, ProfitLossBreakdown, ProfitLossInputs, RatioInputs,
};
use lab_scenarios::{evaluate_coffee_shop, random_challenge, Catalog, ChallengeError, CoffeeShopDecision, ScenarioError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown page `{0}` (expected balance-sheet, profit-loss, profit-loss-detail or ratios)")]
    UnknownPage(String),
    #[error(transparent)]
    Input(#[from] InvalidInput),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error("no scenario is open")]
    NoScenario,
}

/// The four editable pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    BalanceSheet,
    ProfitLoss,
    ProfitLossDetail,
    Ratios,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::BalanceSheet, Page::ProfitLoss, Page::ProfitLossDetail, Page::Ratios];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::BalanceSheet => "balance-sheet",
            Page::ProfitLoss => "profit-loss",
            Page::ProfitLossDetail => "profit-loss-detail",
            Page::Ratios => "ratios",
        }
    }

    /// Line-item keys accepted by [`LabSession::set`] on this page.
    pub fn keys(self) -> Vec<&'static str> {
        fn keys_of<M: InputModel>() -> Vec<&'static str> {
            M::Field::ALL.iter().map(|f| f.key()).collect()
        }
        match self {
            Page::BalanceSheet => keys_of::<BalanceSheetInputs>(),
            Page::ProfitLoss => keys_of::<ProfitLossInputs>(),
            Page::ProfitLossDetail => keys_of::<ProfitLossBreakdown>(),
            Page::Ratios => keys_of::<RatioInputs>(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Page::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| SessionError::UnknownPage(s.to_string()))
    }
}

/// What [`LabSession::render`] shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Activity {
    /// The current page with its edited inputs.
    Editing,
    Scenario { id: String, stage: usize, cumulative: bool },
    CoffeeShop(CoffeeShopDecision),
    RandomChallenge { seed: u64 },
}

/// One user's state. Every record starts from its documented defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct LabSession {
    page: Page,
    balance_sheet: BalanceSheetInputs,
    profit_loss: ProfitLossInputs,
    breakdown: ProfitLossBreakdown,
    ratios: RatioInputs,
    reported_net_income: Option<Decimal>,
    activity: Activity,
}

impl Default for LabSession {
    fn default() -> Self {
        Self::new(Page::default())
    }
}

impl LabSession {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            balance_sheet: BalanceSheetInputs::default(),
            profit_loss: ProfitLossInputs::default(),
            breakdown: ProfitLossBreakdown::default(),
            ratios: RatioInputs::default(),
            reported_net_income: None,
            activity: Activity::Editing,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Switch page and return to editing.
    pub fn open(&mut self, page: Page) {
        self.page = page;
        self.activity = Activity::Editing;
    }

    /// Edit one line item of the current page from text input. A rejected
    /// edit leaves the record unchanged.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), SessionError> {
        match self.page {
            Page::BalanceSheet => set_field(&mut self.balance_sheet, key, raw)?,
            Page::ProfitLoss => set_field(&mut self.profit_loss, key, raw)?,
            Page::ProfitLossDetail => set_field(&mut self.breakdown, key, raw)?,
            Page::Ratios => set_field(&mut self.ratios, key, raw)?,
        }
        debug!(page = %self.page, key, raw, "input edited");
        Ok(())
    }

    /// Restore the current page's documented defaults.
    pub fn reset(&mut self) {
        match self.page {
            Page::BalanceSheet => self.balance_sheet = BalanceSheetInputs::default(),
            Page::ProfitLoss => self.profit_loss = ProfitLossInputs::default(),
            Page::ProfitLossDetail => self.breakdown = ProfitLossBreakdown::default(),
            Page::Ratios => self.ratios = RatioInputs::default(),
        }
    }

    /// Net income as the user reported it, checked against the derived value.
    pub fn report_net_income(&mut self, reported: Option<Decimal>) {
        self.reported_net_income = reported;
    }

    /// Open a built-in scenario at `stage`, switching to its page.
    pub fn open_scenario(&mut self, catalog: &Catalog, id: &str, stage: usize) -> Result<(), SessionError> {
        let (page, len) = if let Ok(t) = catalog.profit_loss_scenario(id) {
            (Page::ProfitLoss, t.len())
        } else {
            (Page::BalanceSheet, catalog.balance_sheet_scenario(id)?.len())
        };
        if stage == 0 || stage > len {
            return Err(ScenarioError::StageOutOfRange {
                scenario: id.to_string(),
                stage,
                len,
            }
            .into());
        }
        self.page = page;
        self.activity = Activity::Scenario {
            id: id.to_string(),
            stage,
            cumulative: false,
        };
        info!(scenario = id, stage, "scenario opened");
        Ok(())
    }

    /// Jump to `stage` of the open scenario.
    pub fn select_stage(&mut self, catalog: &Catalog, stage: usize) -> Result<(), SessionError> {
        let Activity::Scenario { id, cumulative, .. } = &self.activity else {
            return Err(SessionError::NoScenario);
        };
        let cumulative = *cumulative;
        let id = id.clone();
        self.open_scenario(catalog, &id, stage)?;
        self.set_cumulative(cumulative)
    }

    /// Show running totals instead of the single stage.
    pub fn set_cumulative(&mut self, on: bool) -> Result<(), SessionError> {
        match &mut self.activity {
            Activity::Scenario { cumulative, .. } => {
                *cumulative = on;
                Ok(())
            }
            _ => Err(SessionError::NoScenario),
        }
    }

    pub fn play_coffee_shop(&mut self, decision: CoffeeShopDecision) -> Result<(), SessionError> {
        decision.validate()?;
        self.activity = Activity::CoffeeShop(decision);
        Ok(())
    }

    pub fn play_random_challenge(&mut self, seed: u64) {
        self.activity = Activity::RandomChallenge { seed };
    }

    /// Derive and format whatever the session currently shows.
    pub fn render(&self, presenter: &Presenter, catalog: &Catalog) -> Result<PageView, SessionError> {
        let reported = self.reported_net_income;
        let view = match &self.activity {
            Activity::Editing => match self.page {
                Page::BalanceSheet => PageView::BalanceSheet(presenter.balance_sheet(&self.balance_sheet)),
                Page::ProfitLoss => PageView::ProfitLoss(presenter.profit_loss(&self.profit_loss, reported)),
                Page::ProfitLossDetail => {
                    PageView::ProfitLossDetail(presenter.profit_loss_detail(&self.breakdown, reported))
                }
                Page::Ratios => PageView::Ratios(presenter.ratios(&self.ratios, reported)),
            },
            Activity::Scenario { id, stage, cumulative } => match self.page {
                Page::BalanceSheet => presenter.balance_sheet_stage(catalog.balance_sheet_scenario(id)?, *stage)?,
                _ => presenter.profit_loss_stage(catalog.profit_loss_scenario(id)?, *stage, *cumulative)?,
            },
            Activity::CoffeeShop(decision) => {
                PageView::CoffeeShop(presenter.coffee_shop(&evaluate_coffee_shop(decision)?))
            }
            Activity::RandomChallenge { seed } => {
                PageView::RandomChallenge(presenter.random_challenge(&random_challenge(*seed)?))
            }
        };
        Ok(view)
    }
}

fn set_field<M: InputModel>(record: &mut M, key: &str, raw: &str) -> Result<(), InvalidInput> {
    let field = M::Field::from_key(key)?;
    record.set_str(field, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> &'static Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn pages_parse_loosely() {
        assert_eq!("profit_loss".parse::<Page>().unwrap(), Page::ProfitLoss);
        assert_eq!(" Ratios ".parse::<Page>().unwrap(), Page::Ratios);
        assert!(matches!("cash-flow".parse::<Page>(), Err(SessionError::UnknownPage(_))));
        assert!(Page::BalanceSheet.keys().contains(&"cash"));
    }

    #[test]
    fn edits_apply_to_the_current_page_only() {
        let mut s = LabSession::new(Page::BalanceSheet);
        s.set("long-term-debt", "400000").unwrap();
        let PageView::BalanceSheet(v) = s.render(&Presenter::default(), catalog()).unwrap() else {
            panic!("expected the balance sheet");
        };
        assert!(v.status.is_good());

        s.open(Page::ProfitLoss);
        let PageView::ProfitLoss(v) = s.render(&Presenter::default(), catalog()).unwrap() else {
            panic!("expected the profit and loss page");
        };
        assert_eq!(v.metrics.net_income, dec!(250000));
    }

    #[test]
    fn rejected_edit_keeps_the_old_value() {
        let mut s = LabSession::new(Page::ProfitLoss);
        assert!(matches!(s.set("revenue", "-5"), Err(SessionError::Input(_))));
        assert!(matches!(s.set("revenue", "lots"), Err(SessionError::Input(_))));
        assert!(matches!(s.set("salary", "5"), Err(SessionError::Input(_))));
        assert_eq!(s, LabSession::new(Page::ProfitLoss));
        s.set("revenue", "2000000").unwrap();
        s.reset();
        assert_eq!(s, LabSession::new(Page::ProfitLoss));
    }

    #[test]
    fn scenarios_switch_page_and_track_stage() {
        let mut s = LabSession::default();
        s.open_scenario(catalog(), "pizza-year-one", 4).unwrap();
        assert_eq!(s.page(), Page::ProfitLoss);
        s.set_cumulative(true).unwrap();
        s.select_stage(catalog(), 12).unwrap();
        assert_eq!(
            s.activity(),
            &Activity::Scenario {
                id: "pizza-year-one".to_string(),
                stage: 12,
                cumulative: true
            }
        );
        let PageView::ProfitLossStage { statement, .. } = s.render(&Presenter::default(), catalog()).unwrap() else {
            panic!("expected a stage");
        };
        assert_eq!(statement.metrics.net_income, dec!(11200));

        s.open_scenario(catalog(), "restaurant-launch", 1).unwrap();
        assert_eq!(s.page(), Page::BalanceSheet);
    }

    #[test]
    fn bad_scenario_requests_fail_cleanly() {
        let mut s = LabSession::default();
        assert!(matches!(
            s.open_scenario(catalog(), "moon-base", 1),
            Err(SessionError::Scenario(ScenarioError::UnknownScenario(_)))
        ));
        assert!(matches!(
            s.open_scenario(catalog(), "tshirt-wholesale", 3),
            Err(SessionError::Scenario(ScenarioError::StageOutOfRange { .. }))
        ));
        assert!(matches!(s.select_stage(catalog(), 1), Err(SessionError::NoScenario)));
        assert_eq!(s.activity(), &Activity::Editing);
    }

    #[test]
    fn challenges_render() {
        let mut s = LabSession::default();
        s.play_coffee_shop(CoffeeShopDecision::default()).unwrap();
        assert!(matches!(
            s.render(&Presenter::default(), catalog()).unwrap(),
            PageView::CoffeeShop(_)
        ));
        let off_grid = CoffeeShopDecision {
            price: dec!(5.3),
            ..CoffeeShopDecision::default()
        };
        assert!(matches!(s.play_coffee_shop(off_grid), Err(SessionError::Challenge(_))));

        s.play_random_challenge(42);
        assert!(matches!(
            s.render(&Presenter::default(), catalog()).unwrap(),
            PageView::RandomChallenge(_)
        ));
    }

    #[test]
    fn reported_net_income_reaches_the_ratio_page() {
        let mut s = LabSession::new(Page::Ratios);
        s.report_net_income(Some(dec!(200000)));
        let PageView::Ratios(v) = s.render(&Presenter::default(), catalog()).unwrap() else {
            panic!("expected ratios");
        };
        assert_eq!(v.warnings.len(), 1);
    }
}
