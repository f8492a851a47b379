//! Display formatting for amounts, percentages and ratios.

use lab_core::LabConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Formats numbers according to a [`LabConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formatter {
    symbol: String,
    percent_decimals: u32,
    ratio_decimals: u32,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&LabConfig::default())
    }
}

impl Formatter {
    pub fn new(cfg: &LabConfig) -> Self {
        Self {
            symbol: cfg.currency_symbol.clone(),
            percent_decimals: cfg.percent_decimals,
            ratio_decimals: cfg.ratio_decimals,
        }
    }

    /// Whole currency units with thousands separators: `$1,500,000`, `-$18,000`.
    pub fn currency(&self, amount: Decimal) -> String {
        let rounded = positive_zero(amount.round_dp(0));
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        format!("{sign}{}{}", self.symbol, group_thousands(rounded.abs()))
    }

    /// Like [`currency`](Self::currency) but always signed, for changes.
    pub fn currency_change(&self, amount: Decimal) -> String {
        let text = self.currency(amount);
        if text.starts_with('-') {
            text
        } else {
            format!("+{text}")
        }
    }

    /// Currency with cents, for per-unit figures: `$0.40`, `-$1.25`.
    pub fn unit_amount(&self, amount: Decimal) -> String {
        let rounded = positive_zero(amount.round_dp(2));
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        format!("{sign}{}{:.2}", self.symbol, rounded.abs())
    }

    /// A fraction shown as a percentage: `0.46667` -> `46.7%`.
    pub fn percent(&self, fraction: Decimal) -> String {
        let pct = positive_zero(percent_points(fraction).round_dp(self.percent_decimals));
        format!("{:.*}%", self.percent_decimals as usize, pct)
    }

    /// A plain ratio: `1.6` -> `1.60`.
    pub fn ratio(&self, value: Decimal) -> String {
        let v = positive_zero(value.round_dp(self.ratio_decimals));
        format!("{:.*}", self.ratio_decimals as usize, v)
    }

    /// A count with separators and no symbol, e.g. users.
    pub fn count(&self, value: Decimal) -> String {
        let rounded = positive_zero(value.round_dp(0));
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        format!("{sign}{}", group_thousands(rounded.abs()))
    }
}

/// `fraction * 100`, or `0` when that overflows.
pub fn percent_points(fraction: Decimal) -> Decimal {
    fraction.checked_mul(Decimal::ONE_HUNDRED).unwrap_or_default()
}

/// Chart libraries take floats; precision loss only affects drawing.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn positive_zero(d: Decimal) -> Decimal {
    if d.is_zero() {
        Decimal::ZERO
    } else {
        d
    }
}

fn group_thousands(whole: Decimal) -> String {
    let digits = whole.trunc().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_groups_thousands() {
        let f = Formatter::default();
        assert_eq!(f.currency(dec!(1500000)), "$1,500,000");
        assert_eq!(f.currency(dec!(999)), "$999");
        assert_eq!(f.currency(dec!(1000)), "$1,000");
        assert_eq!(f.currency(Decimal::ZERO), "$0");
        assert_eq!(f.currency(dec!(-18000)), "-$18,000");
        assert_eq!(f.currency(dec!(10500.00)), "$10,500");
    }

    #[test]
    fn rounding_never_leaves_a_signed_zero() {
        let f = Formatter::default();
        assert_eq!(f.currency(dec!(-0.4)), "$0");
        assert_eq!(f.percent(dec!(-0.00001)), "0.0%");
        assert_eq!(f.ratio(dec!(-0.001)), "0.00");
    }

    #[test]
    fn percent_and_ratio_precision() {
        let f = Formatter::default();
        assert_eq!(f.percent(dec!(700000) / dec!(1500000)), "46.7%");
        assert_eq!(f.percent(dec!(0.25)), "25.0%");
        assert_eq!(f.percent(dec!(-0.225)), "-22.5%");
        assert_eq!(f.ratio(dec!(1.6)), "1.60");
        assert_eq!(f.ratio(dec!(2)), "2.00");
    }

    #[test]
    fn config_drives_symbol_and_precision() {
        let cfg = LabConfig {
            currency_symbol: "€".to_string(),
            percent_decimals: 2,
            ratio_decimals: 1,
            ..LabConfig::default()
        };
        let f = Formatter::new(&cfg);
        assert_eq!(f.currency(dec!(2500)), "€2,500");
        assert_eq!(f.percent(dec!(0.1234)), "12.34%");
        assert_eq!(f.ratio(dec!(1.25)), "1.2");
    }

    #[test]
    fn percent_of_a_huge_quotient_is_zero() {
        let f = Formatter::default();
        assert_eq!(f.percent(Decimal::MAX), "0.0%");
        assert_eq!(f.percent(Decimal::MIN), "0.0%");
        assert_eq!(percent_points(dec!(0.25)), dec!(25));
    }

    #[test]
    fn unit_amounts_keep_cents() {
        let f = Formatter::default();
        assert_eq!(f.unit_amount(dec!(0.4)), "$0.40");
        assert_eq!(f.unit_amount(dec!(-1.254)), "-$1.25");
        assert_eq!(f.unit_amount(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn changes_are_signed() {
        let f = Formatter::default();
        assert_eq!(f.currency_change(dec!(200)), "+$200");
        assert_eq!(f.currency_change(dec!(-15000)), "-$15,000");
        assert_eq!(f.count(dec!(1000000)), "1,000,000");
    }

    proptest! {
        #[test]
        fn grouping_preserves_digits(n in 0i64..1_000_000_000_000) {
            let s = Formatter::default().currency(Decimal::new(n, 0));
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            prop_assert_eq!(digits, n.to_string());
            prop_assert!(s.split(',').skip(1).all(|g| g.len() == 3));
        }
    }
}
