//! Period life-expectancy lookup and the remaining-years horizon derived from it.

use crate::domain::person::{Gender, Person};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortalityEntry {
    pub age_bracket: u32,
    pub life_expectancy: f64,
}

const fn entry(age_bracket: u32, life_expectancy: f64) -> MortalityEntry {
    MortalityEntry {
        age_bracket,
        life_expectancy,
    }
}

// Brackets are kept in ascending order; `nearest_entry` relies on it for tie-breaks.
const MALE: [MortalityEntry; 4] = [
    entry(35, 79.2),
    entry(40, 78.0),
    entry(45, 76.8),
    entry(50, 75.4),
];

const FEMALE: [MortalityEntry; 4] = [
    entry(35, 82.0),
    entry(40, 81.0),
    entry(45, 79.8),
    entry(50, 78.4),
];

pub fn table(gender: Gender) -> &'static [MortalityEntry] {
    match gender {
        Gender::Male => &MALE,
        Gender::Female => &FEMALE,
    }
}

/// Bracket closest to `age`. When two brackets are equally near, the smaller one wins.
pub fn nearest_entry(gender: Gender, age: u32) -> MortalityEntry {
    let entries = table(gender);
    let mut best = entries[0];
    for candidate in &entries[1..] {
        if candidate.age_bracket.abs_diff(age) < best.age_bracket.abs_diff(age) {
            best = *candidate;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Horizon {
    pub age_bracket: u32,
    pub life_expectancy: f64,
    /// May be negative once `age` is past the bracket's expectancy.
    pub years_left: f64,
}

impl Horizon {
    pub fn for_person(person: Person) -> Self {
        let entry = nearest_entry(person.gender, person.age);
        Self {
            age_bracket: entry.age_bracket,
            life_expectancy: entry.life_expectancy,
            years_left: entry.life_expectancy - f64::from(person.age),
        }
    }
}

/// Returns `None` when `gender` is not recognised after normalisation.
pub fn years_left(age: u32, gender: &str) -> Option<f64> {
    let gender = Gender::parse(gender)?;
    Some(Horizon::for_person(Person { age, gender }).years_left)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn male_38_uses_forty_bracket() {
        let h = Horizon::for_person(Person {
            age: 38,
            gender: Gender::Male,
        });
        assert_eq!(h.age_bracket, 40);
        assert_eq!(h.life_expectancy, 78.0);
        assert!(approx(h.years_left, 40.0));
    }

    #[test]
    fn female_50_leaves_28_point_4() {
        let left = years_left(50, "female").unwrap();
        assert!(approx(left, 28.4), "got {left}");
    }

    #[test]
    fn ages_outside_the_table_clamp_to_edge_brackets() {
        assert_eq!(nearest_entry(Gender::Female, 0).age_bracket, 35);
        assert_eq!(nearest_entry(Gender::Female, 20).age_bracket, 35);
        assert_eq!(nearest_entry(Gender::Male, 90).age_bracket, 50);
    }

    #[test]
    fn degenerate_horizon_is_negative_not_an_error() {
        let left = years_left(90, "male").unwrap();
        assert!(approx(left, 75.4 - 90.0));
        assert!(left < 0.0);
    }

    #[test]
    fn gender_variants_share_a_lookup() {
        let expected = years_left(43, "male");
        for raw in ["Male", "MALE", " male "] {
            assert_eq!(years_left(43, raw), expected);
        }
    }

    #[test]
    fn unknown_gender_has_no_horizon() {
        assert_eq!(years_left(40, "unknown"), None);
    }

    #[test]
    fn every_age_maps_to_a_bracket_within_half_step() {
        for gender in [Gender::Male, Gender::Female] {
            for age in 35..=50 {
                let e = nearest_entry(gender, age);
                assert!(e.age_bracket.abs_diff(age) <= 2, "age {age} -> {}", e.age_bracket);
            }
        }
    }

    #[test]
    fn tables_are_ascending() {
        for gender in [Gender::Male, Gender::Female] {
            let t = table(gender);
            assert!(t.windows(2).all(|w| w[0].age_bracket < w[1].age_bracket));
        }
    }
}
