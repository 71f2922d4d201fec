use crate::advice::{Advice, RecommendationStatus};
use crate::domain::allocation::AssetClass;
use std::fmt;

/// Plain-text summary shown to the person who filled in the questionnaire.
pub fn render_text(advice: &Advice) -> String {
    Report(advice).to_string()
}

/// `Display` adapter over [`Advice`]; `render_text` collects it into a `String`.
pub struct Report<'a>(pub &'a Advice);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0.assessment;
        let s = &a.submission;

        writeln!(
            f,
            "You have approximately {:.1} years left to live.\n",
            a.horizon.years_left
        )?;
        writeln!(f, "Current Income: {}", dollars(s.current_income))?;
        writeln!(f, "Retirement Age: {}", s.retirement_age)?;
        writeln!(f, "Married: {}", yes_no(s.married))?;
        writeln!(f, "Spouse's Income: {}", dollars(s.spouse_income))?;
        writeln!(f, "Number of Kids: {}", s.kids)?;
        writeln!(f, "Target Retirement Savings: {}", dollars(s.target_savings))?;
        writeln!(f, "Owns/Plans to Buy a House: {}\n", yes_no(s.owns_house))?;

        writeln!(f, "Suggested Asset Allocation:")?;
        for (class, pct) in a.plan.entries() {
            writeln!(f, "{class}: {pct}%")?;
        }

        match &self.0.recommendations {
            RecommendationStatus::Available(recs) => {
                for (heading, class) in [
                    ("Recommended Stocks", AssetClass::Stocks),
                    ("Recommended Bonds", AssetClass::Bonds),
                    ("Recommended Real Estate Investments", AssetClass::RealEstate),
                ] {
                    writeln!(f, "\n{heading}:")?;
                    for symbol in recs.symbols(class) {
                        writeln!(f, "{symbol}")?;
                    }
                }
            }
            RecommendationStatus::Unavailable { reason } => {
                writeln!(f, "\nRecommendations unavailable: {reason}")?;
            }
            RecommendationStatus::NotRequested => {}
        }

        Ok(())
    }
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}

/// `$1,234,567.89`
pub fn dollars(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i != 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}
