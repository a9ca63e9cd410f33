//! Cross-page filters: country, continent, sport and medal type.
//!
//! A selection is a set of allow-lists. An empty list means "no filter" for
//! that dimension, and a filter whose column the table lacks is skipped.

use crate::data::{frame, DataStore, MedalType};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The user's filter choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub continents: Vec<String>,
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default = "all_medal_types")]
    pub medal_types: Vec<MedalType>,
}

fn all_medal_types() -> Vec<MedalType> {
    MedalType::ALL.to_vec()
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            continents: Vec::new(),
            sports: Vec::new(),
            medal_types: all_medal_types(),
        }
    }
}

impl FilterSelection {
    /// Reset every filter.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when every medal type is selected, which filters nothing.
    pub fn all_medal_types(&self) -> bool {
        MedalType::ALL.iter().all(|m| self.medal_types.contains(m))
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
            && self.continents.is_empty()
            && self.sports.is_empty()
            && self.all_medal_types()
    }

    pub fn medal_labels(&self) -> Vec<String> {
        self.medal_types.iter().map(|m| m.column().to_string()).collect()
    }

    /// Human-readable line describing the active filters.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.countries.is_empty() {
            parts.push(format!("{} countries", self.countries.len()));
        }
        if !self.continents.is_empty() {
            parts.push(format!("{} continents", self.continents.len()));
        }
        if !self.sports.is_empty() {
            parts.push(format!("{} sports", self.sports.len()));
        }
        if !self.medal_types.is_empty() && self.medal_types.len() < MedalType::ALL.len() {
            parts.push(format!("{} medal types", self.medal_types.len()));
        }

        if parts.is_empty() {
            "No filters active (showing all data)".to_string()
        } else {
            format!("Active filters: {}", parts.join(", "))
        }
    }
}

/// Which columns each filter dimension reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterColumns {
    /// Tried in order; the first present column is used.
    pub country: &'static [&'static str],
    pub continent: &'static str,
    pub sport: &'static str,
    pub medal_type: &'static str,
}

impl Default for FilterColumns {
    fn default() -> Self {
        Self {
            country: &["country_code", "code"],
            continent: "continent",
            sport: "sport",
            medal_type: "medal_type",
        }
    }
}

impl FilterColumns {
    /// Medal records carry the sport in `discipline`.
    pub fn medal_records() -> Self {
        Self {
            sport: "discipline",
            ..Self::default()
        }
    }
}

/// Apply a selection to a table using the default column names.
pub fn apply_filters(df: &DataFrame, selection: &FilterSelection) -> PolarsResult<DataFrame> {
    apply_filters_with(df, selection, &FilterColumns::default())
}

/// Apply a selection, reading each dimension from the given columns.
pub fn apply_filters_with(
    df: &DataFrame,
    selection: &FilterSelection,
    columns: &FilterColumns,
) -> PolarsResult<DataFrame> {
    let mut predicates = Vec::new();

    if !selection.countries.is_empty() {
        if let Some(name) = columns
            .country
            .iter()
            .find(|name| frame::has_column(df, name))
        {
            predicates.push(frame::one_of(name, &selection.countries));
        }
    }

    if !selection.sports.is_empty() && frame::has_column(df, columns.sport) {
        predicates.push(frame::one_of(columns.sport, &selection.sports));
    }

    if !selection.medal_types.is_empty() && frame::has_column(df, columns.medal_type) {
        predicates.push(frame::one_of(columns.medal_type, &selection.medal_labels()));
    }

    if !selection.continents.is_empty() && frame::has_column(df, columns.continent) {
        predicates.push(frame::one_of(columns.continent, &selection.continents));
    }

    let Some(predicate) = predicates.into_iter().reduce(|acc, p| acc.and(p)) else {
        return Ok(df.clone());
    };
    let out = df.clone().lazy().filter(predicate).collect()?;

    debug!("Filtered {} -> {} rows", df.height(), out.height());
    Ok(out)
}

/// The values each filter can take, drawn from the loaded data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub continents: Vec<String>,
    pub sports: Vec<String>,
    pub medal_types: Vec<MedalType>,
}

impl FilterOptions {
    pub fn from_store(store: &DataStore) -> Self {
        Self {
            countries: frame::unique_sorted(store.nocs(), "code"),
            continents: frame::unique_sorted(store.nocs(), "continent"),
            sports: frame::unique_sorted(store.events(), "sport"),
            medal_types: all_medal_types(),
        }
    }
}
