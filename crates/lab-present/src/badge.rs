//! Status badges: a label plus a traffic-light tone.

use lab_metrics::{ProfitStatus, RatioKind, Status};
use lab_scenarios::Verdict;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Caution,
    Bad,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }

    pub fn ratio(kind: RatioKind, status: Status) -> Self {
        let tone = match status {
            Status::Strong | Status::Conservative => Tone::Good,
            Status::Acceptable | Status::Moderate => Tone::Caution,
            Status::Weak | Status::Aggressive => Tone::Bad,
        };
        Self::new(format!("{}: {}", kind.label(), status.label()), tone)
    }

    pub fn profit(status: ProfitStatus) -> Self {
        let tone = match status {
            ProfitStatus::Profit => Tone::Good,
            ProfitStatus::BreakEven => Tone::Caution,
            ProfitStatus::Loss => Tone::Bad,
        };
        Self::new(status.label(), tone)
    }

    pub fn balanced(balanced: bool) -> Self {
        if balanced {
            Self::new("balanced", Tone::Good)
        } else {
            Self::new("not balanced", Tone::Bad)
        }
    }

    pub fn verdict(verdict: Verdict) -> Self {
        let tone = match verdict {
            Verdict::BeatingBaseline => Tone::Good,
            Verdict::ProfitableBelowBaseline => Tone::Caution,
            Verdict::Losing => Tone::Bad,
        };
        Self::new(verdict.label(), tone)
    }

    pub fn is_good(&self) -> bool {
        self.tone == Tone::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leverage_tones_run_opposite_to_labels() {
        assert_eq!(Badge::ratio(RatioKind::DebtToEquity, Status::Conservative).tone, Tone::Good);
        assert_eq!(Badge::ratio(RatioKind::DebtToEquity, Status::Aggressive).tone, Tone::Bad);
        assert_eq!(
            Badge::ratio(RatioKind::CurrentRatio, Status::Strong).label,
            "Current Ratio: strong"
        );
    }

    #[test]
    fn loss_is_bad() {
        assert_eq!(Badge::profit(ProfitStatus::Loss), Badge::new("loss", Tone::Bad));
        assert_eq!(Badge::balanced(false).tone, Tone::Bad);
        assert_eq!(Badge::verdict(Verdict::ProfitableBelowBaseline).tone, Tone::Caution);
    }
}
