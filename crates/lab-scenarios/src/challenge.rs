//! Interactive challenges computed from a few decisions instead of a table.

use crate::rules::{StageModel, StageRule};
use lab_core::{InputModel, InvalidInput, ProfitLossField, ProfitLossInputs};
use lab_metrics::{derive_profit_loss, guarded_div, ProfitLossMetrics};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub const COFFEE_UNIT_COST: Decimal = dec!(1.50);
pub const COFFEE_BASE_OPEX: Decimal = dec!(20000);
pub const COFFEE_INTEREST: Decimal = dec!(1000);
pub const COFFEE_TAX_RATE: Decimal = dec!(0.2);
pub const COFFEE_BASELINE_PRICE: Decimal = dec!(5);
pub const COFFEE_BASELINE_REVENUE: Decimal = dec!(50000);
pub const COFFEE_BASELINE_PROFIT: Decimal = dec!(11000);

/// Allowed values for one decision: `min..=max` in whole `step`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} step {}", self.min, self.max, self.step)
    }
}

impl Grid {
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max && ((value - self.min) % self.step).is_zero()
    }
}

pub const VOLUME_GRID: Grid = Grid {
    min: dec!(5000),
    max: dec!(10000),
    step: dec!(500),
};
pub const PRICE_GRID: Grid = Grid {
    min: dec!(3),
    max: dec!(7),
    step: dec!(0.25),
};
pub const MARKETING_GRID: Grid = Grid {
    min: dec!(0),
    max: dec!(10000),
    step: dec!(1000),
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChallengeError {
    #[error("{field} = {value} is not on the grid {grid}")]
    OffGrid {
        field: &'static str,
        value: Decimal,
        grid: Grid,
    },
    #[error(transparent)]
    Input(#[from] InvalidInput),
}

/// The three levers of the coffee-shop price war.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CoffeeShopDecision {
    pub sales_volume: Decimal,
    pub price: Decimal,
    pub marketing_spend: Decimal,
}

impl Default for CoffeeShopDecision {
    fn default() -> Self {
        Self {
            sales_volume: dec!(7000),
            price: COFFEE_BASELINE_PRICE,
            marketing_spend: Decimal::ZERO,
        }
    }
}

impl CoffeeShopDecision {
    pub fn validate(&self) -> Result<(), ChallengeError> {
        for (field, value, grid) in [
            ("sales_volume", self.sales_volume, VOLUME_GRID),
            ("price", self.price, PRICE_GRID),
            ("marketing_spend", self.marketing_spend, MARKETING_GRID),
        ] {
            if !grid.contains(value) {
                return Err(ChallengeError::OffGrid { field, value, grid });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Net income above the pre-competition baseline.
    BeatingBaseline,
    /// Still profitable, but below the baseline.
    ProfitableBelowBaseline,
    Losing,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::BeatingBaseline => "beating the competition",
            Verdict::ProfitableBelowBaseline => "surviving, below last month",
            Verdict::Losing => "losing money",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Positioning {
    CompetingOnPrice,
    HoldingSteady,
    Premium,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    Low,
    Normal,
    High,
}

/// Follow-up advice shown when the strategy beats the baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Insight {
    SustainLowerMargins,
    TrackAcquisitionCost,
    StaffForDemand,
}

impl Insight {
    pub fn message(self) -> &'static str {
        match self {
            Insight::SustainLowerMargins => "You competed on price. Make sure you can sustain these margins long-term.",
            Insight::TrackAcquisitionCost => "Heavy marketing investment. Track your customer acquisition cost.",
            Insight::StaffForDemand => "Volume is up. Make sure staff and supplies can handle demand.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoffeeShopOutcome {
    pub decision: CoffeeShopDecision,
    pub inputs: ProfitLossInputs,
    pub metrics: ProfitLossMetrics,
    pub verdict: Verdict,
    pub positioning: Positioning,
    pub volume: VolumeLevel,
    pub insights: Vec<Insight>,
    /// Revenue minus the baseline revenue.
    pub revenue_change: Decimal,
    /// Net income minus the baseline profit.
    pub profit_change: Decimal,
    pub profit_per_unit: Decimal,
}

/// Monthly P&L for a coffee-shop decision, compared with the baseline month.
pub fn evaluate_coffee_shop(d: &CoffeeShopDecision) -> Result<CoffeeShopOutcome, ChallengeError> {
    d.validate()?;
    let mut inputs = ProfitLossInputs::zeroed();
    inputs.set(ProfitLossField::Revenue, d.sales_volume * d.price)?;
    inputs.set(ProfitLossField::Cogs, d.sales_volume * COFFEE_UNIT_COST)?;
    inputs.set(ProfitLossField::OperatingExpenses, COFFEE_BASE_OPEX + d.marketing_spend)?;
    inputs.set(ProfitLossField::InterestExpense, COFFEE_INTEREST)?;
    inputs.apply_rule(&StageRule::TaxOnProfit {
        rate: COFFEE_TAX_RATE,
    })?;
    let metrics = derive_profit_loss(&inputs);
    let net = metrics.net_income;

    let verdict = if net > COFFEE_BASELINE_PROFIT {
        Verdict::BeatingBaseline
    } else if net > Decimal::ZERO {
        Verdict::ProfitableBelowBaseline
    } else {
        Verdict::Losing
    };
    let positioning = match d.price.cmp(&COFFEE_BASELINE_PRICE) {
        std::cmp::Ordering::Less => Positioning::CompetingOnPrice,
        std::cmp::Ordering::Equal => Positioning::HoldingSteady,
        std::cmp::Ordering::Greater => Positioning::Premium,
    };
    let volume = if d.sales_volume < dec!(7000) {
        VolumeLevel::Low
    } else if d.sales_volume > dec!(9000) {
        VolumeLevel::High
    } else {
        VolumeLevel::Normal
    };
    let mut insights = Vec::new();
    if verdict == Verdict::BeatingBaseline {
        if d.price < COFFEE_BASELINE_PRICE {
            insights.push(Insight::SustainLowerMargins);
        }
        if d.marketing_spend > dec!(5000) {
            insights.push(Insight::TrackAcquisitionCost);
        }
        if d.sales_volume > dec!(8000) {
            insights.push(Insight::StaffForDemand);
        }
    }
    debug!(%net, ?verdict, "coffee shop decision evaluated");
    Ok(CoffeeShopOutcome {
        decision: *d,
        revenue_change: metrics.revenue - COFFEE_BASELINE_REVENUE,
        profit_change: net - COFFEE_BASELINE_PROFIT,
        profit_per_unit: guarded_div(net, d.sales_volume),
        inputs,
        metrics,
        verdict,
        positioning,
        volume,
        insights,
    })
}

const BUSINESSES: [&str; 8] = [
    "Food Truck",
    "Bakery",
    "Bike Repair Shop",
    "Yoga Studio",
    "Bookstore",
    "Car Wash",
    "Florist",
    "Dog Grooming Salon",
];

/// A generated monthly P&L for a randomly picked small business.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RandomChallenge {
    pub seed: u64,
    pub business: &'static str,
    pub inputs: ProfitLossInputs,
}

/// Deterministic for a given seed.
pub fn random_challenge(seed: u64) -> Result<RandomChallenge, ChallengeError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let business = BUSINESSES[rng.gen_range(0..BUSINESSES.len())];
    let revenue = Decimal::from(rng.gen_range(50u32..=500) * 1000);
    let percent = |rng: &mut ChaCha8Rng, lo: u32, hi: u32| Decimal::new(i64::from(rng.gen_range(lo..=hi)), 2);
    let cogs = revenue * percent(&mut rng, 25, 65);
    let opex = revenue * percent(&mut rng, 15, 45);
    let interest = revenue * percent(&mut rng, 0, 5);

    let mut inputs = ProfitLossInputs::zeroed();
    inputs.set(ProfitLossField::Revenue, revenue)?;
    inputs.set(ProfitLossField::Cogs, cogs)?;
    inputs.set(ProfitLossField::OperatingExpenses, opex)?;
    inputs.set(ProfitLossField::InterestExpense, interest)?;
    inputs.apply_rule(&StageRule::TaxOnProfit {
        rate: COFFEE_TAX_RATE,
    })?;
    debug!(seed, business, %revenue, "random challenge generated");
    Ok(RandomChallenge {
        seed,
        business,
        inputs,
    })
}
