//! Illustrative target-date glide path. Independent of any user's computed plan.

use serde::Serialize;

pub const FIRST_YEAR: i32 = -40;
pub const END_YEAR: i32 = 30;

const MIN_EQUITY_PCT: i32 = 25;
const MAX_EQUITY_PCT: i32 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlidePoint {
    pub years_relative_to_retirement: i32,
    pub equity_pct: i32,
    pub fixed_income_pct: i32,
}

pub fn point(years_relative_to_retirement: i32) -> GlidePoint {
    let equity = (100 - 2 * (years_relative_to_retirement + 40)).clamp(MIN_EQUITY_PCT, MAX_EQUITY_PCT);
    GlidePoint {
        years_relative_to_retirement,
        equity_pct: equity,
        fixed_income_pct: 100 - equity,
    }
}

/// One point per year over `[FIRST_YEAR, END_YEAR)`.
pub fn series() -> Vec<GlidePoint> {
    (FIRST_YEAR..END_YEAR).map(point).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_seventy_years() {
        let s = series();
        assert_eq!(s.len(), 70);
        assert_eq!(s.first().unwrap().years_relative_to_retirement, -40);
        assert_eq!(s.last().unwrap().years_relative_to_retirement, 29);
    }

    #[test]
    fn equity_is_clamped() {
        assert_eq!(point(-40).equity_pct, 95);
        assert_eq!(point(-38).equity_pct, 95);
        assert_eq!(point(-37).equity_pct, 94);
        assert_eq!(point(-20).equity_pct, 60);
        assert_eq!(point(0).equity_pct, 25);
        assert_eq!(point(29).equity_pct, 25);
    }

    #[test]
    fn halves_sum_to_one_hundred_and_equity_never_rises() {
        let s = series();
        assert!(s.iter().all(|p| p.equity_pct + p.fixed_income_pct == 100));
        assert!(s.windows(2).all(|w| w[1].equity_pct <= w[0].equity_pct));
    }
}
