//! Scenario tables: ordered stages over one page's input record.

use crate::rules::{StageModel, StageRule};
use crate::ScenarioError;
use lab_core::{InputModel, InvalidInput, LineItem};
use lab_metrics::Derive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// A story followed stage by stage.
    #[default]
    Journey,
    /// Alternatives compared against the first stage.
    Challenge,
}

/// How a stage's `values` combine with earlier stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulation {
    /// Each stage is a complete snapshot over the scenario base.
    #[default]
    Absolute,
    /// Each stage holds signed deltas applied on top of every earlier stage.
    Incremental,
}

/// Narrative advice for stages up to and including `through`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    pub through: usize,
    pub title: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage<M: InputModel> {
    /// 1-based position.
    pub index: usize,
    pub title: Option<String>,
    pub story: String,
    pub note: Option<String>,
    overlay: Vec<(M::Field, Decimal)>,
    /// Non-financial figures shown next to the stage (e.g. user counts).
    pub extras: BTreeMap<String, Decimal>,
}

impl<M: InputModel> Stage<M> {
    pub fn overlay(&self) -> &[(M::Field, Decimal)] {
        &self.overlay
    }
}

/// Inputs for one stage, ready to derive.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageSnapshot<M> {
    pub index: usize,
    /// e.g. "Month 3".
    pub label: String,
    pub title: Option<String>,
    pub story: String,
    pub note: Option<String>,
    pub inputs: M,
    pub extras: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioTable<M: InputModel> {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub kind: ScenarioKind,
    pub mode: Accumulation,
    pub stage_label: String,
    base: M,
    rules: Vec<StageRule>,
    stages: Vec<Stage<M>>,
    phases: Vec<Phase>,
}

impl<M: StageModel> ScenarioTable<M> {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage<M>] {
        &self.stages
    }

    pub fn rules(&self) -> &[StageRule] {
        &self.rules
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn stage(&self, k: usize) -> Result<&Stage<M>, ScenarioError> {
        k.checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .ok_or_else(|| ScenarioError::StageOutOfRange {
                scenario: self.id.clone(),
                stage: k,
                len: self.stages.len(),
            })
    }

    /// Inputs for stage `k` (1-based).
    ///
    /// Always recomputed from the table, so jumping straight to a stage gives
    /// the same result as stepping through every earlier one.
    #[instrument(level = "debug", skip(self), fields(scenario = %self.id))]
    pub fn select(&self, k: usize) -> Result<StageSnapshot<M>, ScenarioError> {
        let stage = self.stage(k)?;
        let inputs = match self.mode {
            Accumulation::Absolute => self.raw(stage)?,
            Accumulation::Incremental => self.fold(k)?,
        };
        let inputs = self.with_rules(inputs)?;
        Ok(self.snapshot(stage, inputs))
    }

    /// Running totals for stages `1..=k`.
    ///
    /// Absolute stages are summed field by field before rules run, so rules
    /// like tax see the cumulative figures. Incremental stages already are
    /// running totals.
    pub fn cumulative(&self, k: usize) -> Result<StageSnapshot<M>, ScenarioError> {
        if self.mode == Accumulation::Incremental {
            return self.select(k);
        }
        let stage = self.stage(k)?;
        let mut total = M::zeroed();
        for s in &self.stages[..k] {
            let raw = self.raw(s)?;
            total.accumulate(&raw).map_err(|e| self.input_error(e))?;
        }
        let inputs = self.with_rules(total)?;
        let mut snapshot = self.snapshot(stage, inputs);
        snapshot.label = format!("{}s 1-{}", self.stage_label, k);
        Ok(snapshot)
    }

    /// Snapshots `1..=k` in order, for trend charts.
    pub fn trend(&self, k: usize) -> Result<Vec<StageSnapshot<M>>, ScenarioError> {
        self.stage(k)?;
        (1..=k).map(|i| self.select(i)).collect()
    }

    /// Advice covering stage `k`: the first phase whose range reaches it.
    pub fn phase_for(&self, k: usize) -> Option<&Phase> {
        self.phases.iter().find(|p| k <= p.through)
    }

    /// Change of an extra figure since the previous stage.
    pub fn extra_delta(&self, k: usize, key: &str) -> Option<Decimal> {
        let current = self.stage(k).ok()?.extras.get(key)?;
        let previous = self.stage(k.checked_sub(1)?).ok()?.extras.get(key)?;
        Some(*current - *previous)
    }

    pub fn derive(&self, k: usize) -> Result<(StageSnapshot<M>, M::Metrics), ScenarioError>
    where
        M: Derive,
    {
        let snapshot = self.select(k)?;
        let metrics = snapshot.inputs.derive();
        Ok((snapshot, metrics))
    }

    pub fn derive_cumulative(&self, k: usize) -> Result<(StageSnapshot<M>, M::Metrics), ScenarioError>
    where
        M: Derive,
    {
        let snapshot = self.cumulative(k)?;
        let metrics = snapshot.inputs.derive();
        Ok((snapshot, metrics))
    }

    fn raw(&self, stage: &Stage<M>) -> Result<M, ScenarioError> {
        let mut inputs = self.base.clone();
        for &(field, value) in &stage.overlay {
            inputs.set(field, value).map_err(|e| self.input_error(e))?;
        }
        Ok(inputs)
    }

    fn fold(&self, k: usize) -> Result<M, ScenarioError> {
        let mut inputs = self.base.clone();
        for s in &self.stages[..k] {
            for &(field, delta) in &s.overlay {
                inputs.adjust(field, delta).map_err(|e| self.input_error(e))?;
            }
        }
        debug!(stage = k, "folded incremental stages");
        Ok(inputs)
    }

    fn with_rules(&self, mut inputs: M) -> Result<M, ScenarioError> {
        for rule in &self.rules {
            inputs.apply_rule(rule).map_err(|e| self.input_error(e))?;
        }
        Ok(inputs)
    }

    fn snapshot(&self, stage: &Stage<M>, inputs: M) -> StageSnapshot<M> {
        StageSnapshot {
            index: stage.index,
            label: format!("{} {}", self.stage_label, stage.index),
            title: stage.title.clone(),
            story: stage.story.clone(),
            note: stage.note.clone(),
            inputs,
            extras: stage.extras.clone(),
        }
    }

    fn input_error(&self, source: InvalidInput) -> ScenarioError {
        ScenarioError::Input {
            scenario: self.id.clone(),
            source,
        }
    }

    fn from_raw(raw: RawScenario) -> Result<Self, ScenarioError> {
        let id = raw.id;
        if raw.stages.is_empty() {
            return Err(ScenarioError::Empty(id));
        }
        for rule in &raw.rules {
            let fraction = match *rule {
                StageRule::TaxOnProfit { rate } => rate,
                StageRule::CogsShareOfRevenue { share } => share,
            };
            if !M::supports(rule) || fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(ScenarioError::UnsupportedRule {
                    scenario: id,
                    rule: rule.to_string(),
                    page: M::PAGE,
                });
            }
        }

        let input_error = |source: InvalidInput| ScenarioError::Input {
            scenario: id.clone(),
            source,
        };
        let mut base = M::zeroed();
        for (key, value) in &raw.base {
            base.set_by_key(key, *value).map_err(input_error)?;
        }
        let stages = raw
            .stages
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let overlay = s
                    .values
                    .iter()
                    .map(|(key, &value)| Ok((M::Field::from_key(key)?, value)))
                    .collect::<Result<Vec<_>, InvalidInput>>()
                    .map_err(input_error)?;
                Ok(Stage {
                    index: i + 1,
                    title: s.title,
                    story: s.story,
                    note: s.note,
                    overlay,
                    extras: s.extras,
                })
            })
            .collect::<Result<Vec<_>, ScenarioError>>()?;

        let mut phases = raw.phases;
        phases.sort_by_key(|p| p.through);

        let table = Self {
            id,
            title: raw.title,
            summary: raw.summary,
            kind: raw.kind,
            mode: raw.mode,
            stage_label: raw.stage_label,
            base,
            rules: raw.rules,
            stages,
            phases,
        };
        // Every stage must resolve to valid inputs, one at a time and summed.
        for k in 1..=table.len() {
            table.select(k)?;
            table.cumulative(k)?;
        }
        debug!(scenario = %table.id, page = M::PAGE, stages = table.len(), "scenario validated");
        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    scenarios: Vec<RawScenario>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    id: String,
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    kind: ScenarioKind,
    #[serde(default)]
    mode: Accumulation,
    stage_label: String,
    #[serde(default)]
    base: BTreeMap<String, Decimal>,
    #[serde(default)]
    rules: Vec<StageRule>,
    stages: Vec<RawStage>,
    #[serde(default)]
    phases: Vec<Phase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStage {
    #[serde(default)]
    title: Option<String>,
    story: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    values: BTreeMap<String, Decimal>,
    #[serde(default)]
    extras: BTreeMap<String, Decimal>,
}

pub(crate) fn parse_document<M: StageModel>(yaml: &str) -> Result<Vec<ScenarioTable<M>>, ScenarioError> {
    let doc: RawDocument = serde_yaml::from_str(yaml)?;
    doc.scenarios.into_iter().map(ScenarioTable::from_raw).collect()
}
