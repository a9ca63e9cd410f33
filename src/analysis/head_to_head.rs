//! Side-by-side comparison of two countries.

use super::AnalysisError;
use crate::data::{frame, DataStore, MedalTally, MedalType};
use serde::Serialize;

/// Disciplines listed per country.
pub const TOP_DISCIPLINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySide {
    pub code: String,
    pub name: String,
    pub medals: MedalTally,
    /// From the `Total` column when the table has one.
    pub total: i64,
    pub athletes: usize,
    /// Medal count per discipline, most first.
    pub top_disciplines: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub a: CountrySide,
    pub b: CountrySide,
}

impl Comparison {
    /// `b - a` for totals, golds and athletes.
    pub fn deltas(&self) -> (i64, i64, i64) {
        (
            self.b.total - self.a.total,
            self.b.medals.gold - self.a.medals.gold,
            self.b.athletes as i64 - self.a.athletes as i64,
        )
    }
}

/// Codes that can be compared: every country in the medal standings.
pub fn available_countries(store: &DataStore) -> Vec<String> {
    frame::unique_sorted(store.medals_total(), "country_code")
}

/// Compare two countries. Filters do not apply here.
pub fn compare(store: &DataStore, a: &str, b: &str) -> Result<Comparison, AnalysisError> {
    if a == b {
        return Err(AnalysisError::SameCountry);
    }
    Ok(Comparison {
        a: side(store, a),
        b: side(store, b),
    })
}

fn side(store: &DataStore, code: &str) -> CountrySide {
    let (medals, total) = tally(store, code);
    let athletes = frame::str_values(store.athletes(), "country_code")
        .iter()
        .filter(|c| c.as_deref() == Some(code))
        .count();
    let top_disciplines = frame::filter_eq(store.medals(), "country_code", code)
        .map(|rows| frame::value_counts(&rows, "discipline"))
        .unwrap_or_default()
        .into_iter()
        .take(TOP_DISCIPLINES)
        .collect();

    CountrySide {
        code: code.to_string(),
        name: store.country_name(code),
        medals,
        total,
        athletes,
        top_disciplines,
    }
}

fn tally(store: &DataStore, code: &str) -> (MedalTally, i64) {
    let df = store.medals_total();
    let Some(row) = frame::str_values(df, "country_code")
        .iter()
        .position(|c| c.as_deref() == Some(code))
    else {
        return (MedalTally::default(), 0);
    };

    let value = |column: &str| {
        frame::i64_values(df, column)
            .get(row)
            .copied()
            .flatten()
            .unwrap_or(0)
    };
    let medals = MedalTally::new(
        value(MedalType::Gold.column()),
        value(MedalType::Silver.column()),
        value(MedalType::Bronze.column()),
    );
    let total = if frame::has_column(df, "Total") {
        value("Total")
    } else {
        medals.total()
    };
    (medals, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    #[test]
    fn test_same_country_is_rejected() {
        let store = fixtures::store();
        assert!(matches!(
            compare(&store, "FRA", "FRA"),
            Err(AnalysisError::SameCountry)
        ));
    }

    #[test]
    fn test_compare() {
        let store = fixtures::store();
        let cmp = compare(&store, "FRA", "CHN").unwrap();
        assert_eq!(cmp.a.name, "France");
        assert_eq!(cmp.a.medals, MedalTally::new(2, 0, 1));
        assert_eq!(cmp.a.total, 3);
        assert_eq!(cmp.a.athletes, 2);
        assert_eq!(cmp.a.top_disciplines[0], ("Swimming".to_string(), 2));
        assert_eq!(cmp.b.total, 2);
        assert_eq!(cmp.deltas(), (-1, -2, -1));
    }

    #[test]
    fn test_country_without_medals() {
        let store = fixtures::store();
        let cmp = compare(&store, "USA", "KEN").unwrap();
        assert_eq!(cmp.b.name, "KEN");
        assert_eq!(cmp.b.total, 0);
        assert!(cmp.b.top_disciplines.is_empty());
        assert_eq!(cmp.a.athletes, 2);
    }

    #[test]
    fn test_available_countries_sorted() {
        let store = fixtures::store();
        assert_eq!(available_countries(&store), vec!["CHN", "EOR", "FRA", "USA"]);
    }
}
