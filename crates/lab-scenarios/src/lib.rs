#![deny(warnings)]

//! Staged narrative scenarios and challenges.
//!
//! Scenario tables are static YAML embedded in the crate and parsed once into
//! a process-wide [`Catalog`]. Selecting a stage is a pure lookup: absolute
//! scenarios read one self-contained snapshot, incremental scenarios refold
//! every delta from the opening balances on each call.

use lab_core::{BalanceSheetInputs, InputModel, InvalidInput, ProfitLossInputs};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

pub mod challenge;
pub mod rules;
pub mod table;

pub use challenge::{
    evaluate_coffee_shop, random_challenge, ChallengeError, CoffeeShopDecision, CoffeeShopOutcome,
    Grid, Insight, Positioning, RandomChallenge, Verdict, VolumeLevel, COFFEE_BASELINE_PROFIT,
    MARKETING_GRID, PRICE_GRID, VOLUME_GRID,
};
pub use rules::{StageModel, StageRule};
pub use table::{Accumulation, Phase, ScenarioKind, ScenarioTable, Stage, StageSnapshot};

/// Errors raised while loading or querying scenario tables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("scenario catalog is malformed: {0}")]
    Parse(String),
    #[error("scenario `{scenario}`: {source}")]
    Input {
        scenario: String,
        source: InvalidInput,
    },
    #[error("scenario `{scenario}`: rule `{rule}` does not apply to {page} inputs")]
    UnsupportedRule {
        scenario: String,
        rule: String,
        page: &'static str,
    },
    #[error("scenario `{0}` has no stages")]
    Empty(String),
    #[error("scenario `{scenario}`: stage {stage} is outside 1..={len}")]
    StageOutOfRange {
        scenario: String,
        stage: usize,
        len: usize,
    },
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
    #[error("duplicate scenario id `{0}`")]
    DuplicateId(String),
}

impl From<serde_yaml::Error> for ScenarioError {
    fn from(e: serde_yaml::Error) -> Self {
        ScenarioError::Parse(e.to_string())
    }
}

/// All scenario tables, grouped by the page they drive.
#[derive(Clone, Debug)]
pub struct Catalog {
    profit_loss: Vec<ScenarioTable<ProfitLossInputs>>,
    balance_sheet: Vec<ScenarioTable<BalanceSheetInputs>>,
}

static BUILTIN: Lazy<Result<Catalog, ScenarioError>> = Lazy::new(|| {
    Catalog::from_yaml(
        include_str!("../data/profit_loss.yaml"),
        include_str!("../data/balance_sheet.yaml"),
    )
});

impl Catalog {
    /// Parse and validate both scenario documents.
    pub fn from_yaml(profit_loss: &str, balance_sheet: &str) -> Result<Self, ScenarioError> {
        let catalog = Self {
            profit_loss: table::parse_document(profit_loss)?,
            balance_sheet: table::parse_document(balance_sheet)?,
        };
        let mut seen = BTreeSet::new();
        for id in catalog.ids().into_iter().map(|(id, _)| id) {
            if !seen.insert(id) {
                return Err(ScenarioError::DuplicateId(id.to_string()));
            }
        }
        info!(
            profit_loss = catalog.profit_loss.len(),
            balance_sheet = catalog.balance_sheet.len(),
            "scenario catalog loaded"
        );
        Ok(catalog)
    }

    /// The catalog compiled into the crate, parsed on first use.
    pub fn builtin() -> Result<&'static Catalog, ScenarioError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    pub fn profit_loss(&self) -> &[ScenarioTable<ProfitLossInputs>] {
        &self.profit_loss
    }

    pub fn balance_sheet(&self) -> &[ScenarioTable<BalanceSheetInputs>] {
        &self.balance_sheet
    }

    pub fn profit_loss_scenario(&self, id: &str) -> Result<&ScenarioTable<ProfitLossInputs>, ScenarioError> {
        find(&self.profit_loss, id)
    }

    pub fn balance_sheet_scenario(&self, id: &str) -> Result<&ScenarioTable<BalanceSheetInputs>, ScenarioError> {
        find(&self.balance_sheet, id)
    }

    /// `(id, page)` for every scenario, in file order.
    pub fn ids(&self) -> Vec<(&str, &'static str)> {
        self.profit_loss
            .iter()
            .map(|s| (s.id.as_str(), ProfitLossInputs::PAGE))
            .chain(
                self.balance_sheet
                    .iter()
                    .map(|s| (s.id.as_str(), BalanceSheetInputs::PAGE)),
            )
            .collect()
    }
}

fn find<'a, M: StageModel>(tables: &'a [ScenarioTable<M>], id: &str) -> Result<&'a ScenarioTable<M>, ScenarioError> {
    tables
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ScenarioError::UnknownScenario(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let c = Catalog::builtin().unwrap();
        let ids: Vec<&str> = c.ids().into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                "pizza-year-one",
                "mobile-app",
                "pizzeria-turnaround",
                "tshirt-wholesale",
                "restaurant-launch"
            ]
        );
    }

    #[test]
    fn unknown_scenario_is_reported() {
        let c = Catalog::builtin().unwrap();
        assert_eq!(
            c.profit_loss_scenario("gym").unwrap_err(),
            ScenarioError::UnknownScenario("gym".to_string())
        );
        // Ids are page-specific.
        assert!(c.balance_sheet_scenario("mobile-app").is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = r#"
scenarios:
  - id: twin
    title: A
    stage_label: Step
    stages:
      - story: one
        values: { revenue: 1 }
"#;
        let bs = r#"
scenarios:
  - id: twin
    title: B
    stage_label: Step
    stages:
      - story: one
        values: { cash: 1 }
"#;
        assert_eq!(
            Catalog::from_yaml(doc, bs).unwrap_err(),
            ScenarioError::DuplicateId("twin".to_string())
        );
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_yaml("scenarios: [", "scenarios: []"),
            Err(ScenarioError::Parse(_))
        ));
    }
}
