//! Plain-text rendering of page views for terminals.

use crate::badge::{Badge, Tone};
use crate::chart::Series;
use crate::statement::{RowKind, StatementRow};
use crate::view::{
    BalanceSheetView, CoffeeShopView, Figure, PageView, ProfitLossView, RandomChallengeView, RatioView, StageHeader,
};
use std::fmt::{self, Display, Formatter};

const LABEL_WIDTH: usize = 34;

impl Display for Badge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mark = match self.tone {
            Tone::Good => "+",
            Tone::Caution => "~",
            Tone::Bad => "!",
        };
        write!(f, "[{mark}] {}", self.label)
    }
}

impl Display for Figure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:<LABEL_WIDTH$}{:>16}", self.label, self.value)?;
        if let Some(change) = &self.change {
            write!(f, "  ({change})")?;
        }
        Ok(())
    }
}

fn rows(f: &mut Formatter<'_>, rows: &[StatementRow]) -> fmt::Result {
    for r in rows {
        if r.kind == RowKind::Total {
            writeln!(f, "{}", "-".repeat(LABEL_WIDTH + 26))?;
        }
        let indent = if r.kind == RowKind::Line { "  " } else { "" };
        writeln!(
            f,
            "{indent}{:<width$}{:>16}{:>10}",
            r.label,
            r.display,
            r.share,
            width = LABEL_WIDTH - indent.len()
        )?;
    }
    Ok(())
}

fn warnings(f: &mut Formatter<'_>, list: &[String]) -> fmt::Result {
    for w in list {
        writeln!(f, "warning: {w}")?;
    }
    Ok(())
}

fn series(f: &mut Formatter<'_>, s: &[Series]) -> fmt::Result {
    for one in s {
        let line: String = one.points.iter().map(|p| format!(" {}:{:.0}", p.x, p.y)).collect();
        writeln!(f, "{}:{line}", one.name)?;
    }
    Ok(())
}

impl Display for BalanceSheetView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "BALANCE SHEET")?;
        rows(f, &self.rows)?;
        writeln!(f, "\n{}  difference {}", self.status, self.difference)?;
        for hint in &self.remediation {
            writeln!(f, "  - {}", hint.text)?;
        }
        Ok(())
    }
}

impl Display for ProfitLossView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROFIT & LOSS")?;
        rows(f, &self.rows)?;
        writeln!(f)?;
        writeln!(f, "Gross {}  Operating {}  Net {}", self.gross, self.operating, self.net)?;
        let margins: Vec<String> = self.margins.iter().map(|b| format!("{} {}", b.label, b.text)).collect();
        writeln!(f, "{}", margins.join(" | "))?;
        warnings(f, &self.warnings)
    }
}

impl Display for RatioView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "FINANCIAL RATIOS")?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<LABEL_WIDTH$}{:>10}  {:<28}{}",
                line.kind.label(),
                line.value,
                line.badge.to_string(),
                line.guide
            )?;
        }
        writeln!(f, "{}", self.net_income)?;
        let margins: Vec<String> = self
            .profitability
            .iter()
            .map(|b| format!("{} {}", b.label, b.text))
            .collect();
        writeln!(f, "{}", margins.join(" | "))?;
        warnings(f, &self.warnings)
    }
}

impl Display for StageHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.scenario, self.label)?;
        if let Some(title) = &self.title {
            write!(f, ": {title}")?;
        }
        writeln!(f)?;
        if let Some(phase) = &self.phase {
            writeln!(f, "Phase: {phase}")?;
        }
        writeln!(f, "{}", self.story)?;
        if let Some(note) = &self.note {
            writeln!(f, "Note: {note}")?;
        }
        for tip in &self.advice {
            writeln!(f, "  * {tip}")?;
        }
        for extra in &self.extras {
            writeln!(f, "{extra}")?;
        }
        Ok(())
    }
}

impl Display for CoffeeShopView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let d = &self.outcome.decision;
        writeln!(
            f,
            "COFFEE SHOP: {} cups at {} with {} marketing",
            d.sales_volume, d.price, d.marketing_spend
        )?;
        for figure in &self.figures {
            writeln!(f, "{figure}")?;
        }
        writeln!(f, "{}", self.verdict)?;
        for insight in &self.insights {
            writeln!(f, "  * {insight}")?;
        }
        writeln!(f)?;
        write!(f, "{}", self.statement)
    }
}

impl Display for RandomChallengeView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "RANDOM CHALLENGE #{}: {}", self.seed, self.business)?;
        write!(f, "{}", self.statement)
    }
}

impl Display for PageView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PageView::BalanceSheet(v) => v.fmt(f),
            PageView::ProfitLoss(v) | PageView::ProfitLossDetail(v) => v.fmt(f),
            PageView::Ratios(v) => v.fmt(f),
            PageView::ProfitLossStage { stage, statement, trend } => {
                writeln!(f, "{stage}")?;
                writeln!(f, "{statement}")?;
                series(f, trend)
            }
            PageView::BalanceSheetStage { stage, statement } => {
                writeln!(f, "{stage}")?;
                statement.fmt(f)
            }
            PageView::CoffeeShop(v) => v.fmt(f),
            PageView::RandomChallenge(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::view::Presenter;
    use lab_core::{BalanceSheetInputs, ProfitLossInputs};
    use lab_scenarios::Catalog;

    #[test]
    fn balance_sheet_text_lists_remediation() {
        let text = Presenter::default().balance_sheet(&BalanceSheetInputs::default()).to_string();
        assert!(text.starts_with("BALANCE SHEET\n"));
        assert!(text.contains("[!] not balanced  difference $100,000"));
        assert!(text.contains("  - Increase liabilities by $100,000"));
    }

    #[test]
    fn profit_loss_text_shows_badges() {
        let text = Presenter::default().profit_loss(&ProfitLossInputs::default(), None).to_string();
        assert!(text.contains("$250,000"));
        assert!(text.contains("Net [+] profit"));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn stage_text_has_story_and_trend() {
        let t = Catalog::builtin().unwrap().profit_loss_scenario("pizza-year-one").unwrap();
        let text = Presenter::default().profit_loss_stage(t, 2, false).unwrap().to_string();
        assert!(text.contains("/ Month 2"));
        assert!(text.contains("Revenue: 1:"));
    }
}
