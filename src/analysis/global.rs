//! Global analysis page: world map values, continent tallies and the
//! continent > country > discipline hierarchy.

use super::{medal_table, top_by_total, with_continent, AnalysisError, CountryTally};
use crate::data::{codes, frame, DataStore, MedalTally};
use crate::filters::{apply_filters_with, FilterColumns, FilterSelection};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// One shaded region of the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethCell {
    pub iso3: String,
    pub code: String,
    pub country: String,
    pub medals: MedalTally,
    pub value: i64,
}

/// Per-country medal totals keyed by ISO alpha-3 for the world map.
pub fn choropleth(store: &DataStore, selection: &FilterSelection) -> Vec<ChoroplethCell> {
    medal_table(store, selection)
        .into_iter()
        .map(|row| ChoroplethCell {
            value: row.total(),
            iso3: row.iso3,
            code: row.code,
            country: row.country,
            medals: row.medals,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentTally {
    pub continent: String,
    pub medals: MedalTally,
}

/// Medal sums per continent, alphabetical.
pub fn continent_medals(rows: &[CountryTally]) -> Vec<ContinentTally> {
    let mut by_continent: BTreeMap<&str, MedalTally> = BTreeMap::new();
    for row in rows {
        *by_continent.entry(row.continent.as_str()).or_default() += row.medals;
    }
    by_continent
        .into_iter()
        .map(|(continent, medals)| ContinentTally {
            continent: continent.to_string(),
            medals,
        })
        .collect()
}

/// One leaf of the medal hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct HierarchyRow {
    pub continent: String,
    pub country: String,
    pub discipline: String,
    pub medal_count: usize,
}

/// Medal records counted by continent, country and discipline.
///
/// All four filters apply; the sport filter reads the `discipline` column.
pub fn hierarchy(
    store: &DataStore,
    selection: &FilterSelection,
) -> Result<Vec<HierarchyRow>, AnalysisError> {
    let medals = with_continent(store.medals(), "country_code", store.nocs())?;
    let medals = apply_filters_with(&medals, selection, &FilterColumns::medal_records())?;

    let keys = ["continent", "country", "discipline"];
    if !keys.iter().all(|key| frame::has_column(&medals, key)) {
        return Ok(Vec::new());
    }
    let counts = medals
        .lazy()
        .filter(
            col("continent")
                .is_not_null()
                .and(col("country").is_not_null())
                .and(col("discipline").is_not_null()),
        )
        .group_by([col("continent"), col("country"), col("discipline")])
        .agg([len().alias("medal_count")])
        .sort(keys, SortMultipleOptions::default())
        .collect()?;

    let continents = frame::str_values(&counts, "continent");
    let countries = frame::str_values(&counts, "country");
    let disciplines = frame::str_values(&counts, "discipline");
    let medal_counts = frame::i64_values(&counts, "medal_count");

    Ok(continents
        .into_iter()
        .zip(countries)
        .zip(disciplines)
        .zip(medal_counts)
        .filter_map(|(((continent, country), discipline), n)| {
            Some(HierarchyRow {
                continent: continent?,
                country: country?,
                discipline: discipline?,
                medal_count: n? as usize,
            })
        })
        .collect())
}

/// Headline numbers of the global page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalKpis {
    /// Continent with the most gold medals and its gold count.
    pub top_gold_continent: Option<(String, i64)>,
    pub continents_with_medals: usize,
    pub countries_with_gold: usize,
    pub average_medals: f64,
}

pub fn kpis(rows: &[CountryTally]) -> GlobalKpis {
    let continents = continent_medals(rows);
    let top_gold_continent = continents
        .iter()
        .fold(None::<&ContinentTally>, |best, c| match best {
            Some(b) if b.medals.gold >= c.medals.gold => Some(b),
            _ => Some(c),
        })
        .map(|c| (c.continent.clone(), c.medals.gold));

    let average_medals = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(CountryTally::total).sum::<i64>() as f64 / rows.len() as f64
    };

    GlobalKpis {
        top_gold_continent,
        continents_with_medals: continents.iter().filter(|c| c.medals.gold > 0).count(),
        countries_with_gold: rows.iter().filter(|r| r.medals.gold > 0).count(),
        average_medals,
    }
}

/// Everything the global page shows, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalView {
    pub map: Vec<ChoroplethCell>,
    pub continents: Vec<ContinentTally>,
    pub hierarchy: Vec<HierarchyRow>,
    pub top_countries: Vec<CountryTally>,
    pub kpis: GlobalKpis,
}

pub fn view(
    store: &DataStore,
    selection: &FilterSelection,
    top_n: usize,
) -> Result<GlobalView, AnalysisError> {
    let rows = medal_table(store, selection);
    Ok(GlobalView {
        map: choropleth(store, selection),
        continents: continent_medals(&rows),
        hierarchy: hierarchy(store, selection)?,
        top_countries: top_by_total(&rows, top_n),
        kpis: kpis(&rows),
    })
}

/// Number of continents with a dedicated entry in the code table.
pub fn continent_count() -> usize {
    codes::Continent::ALL.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::data::MedalType;

    #[test]
    fn test_choropleth_uses_iso_codes() {
        let store = fixtures::store();
        let cells = choropleth(&store, &FilterSelection::default());
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| c.value == c.medals.total()));
    }

    #[test]
    fn test_continent_medals() {
        let store = fixtures::store();
        let rows = medal_table(&store, &FilterSelection::default());
        let continents = continent_medals(&rows);
        let names: Vec<&str> = continents.iter().map(|c| c.continent.as_str()).collect();
        assert_eq!(names, vec!["Asia", "Europe", "North America", "Other"]);
        let total: i64 = continents.iter().map(|c| c.medals.total()).sum();
        assert_eq!(total, rows.iter().map(CountryTally::total).sum::<i64>());
    }

    #[test]
    fn test_hierarchy_counts() {
        let store = fixtures::store();
        let rows = hierarchy(&store, &FilterSelection::default()).unwrap();
        let france_swimming = rows
            .iter()
            .find(|r| r.country == "France" && r.discipline == "Swimming")
            .unwrap();
        assert_eq!(france_swimming.continent, "Europe");
        assert_eq!(france_swimming.medal_count, 2);
        assert_eq!(rows.iter().map(|r| r.medal_count).sum::<usize>(), 6);
    }

    #[test]
    fn test_hierarchy_respects_medal_and_sport_filters() {
        let store = fixtures::store();
        let selection = FilterSelection {
            sports: vec!["Swimming".into()],
            medal_types: vec![MedalType::Gold],
            ..FilterSelection::default()
        };
        let rows = hierarchy(&store, &selection).unwrap();
        assert_eq!(rows.iter().map(|r| r.medal_count).sum::<usize>(), 2);
    }

    #[test]
    fn test_global_kpis() {
        let store = fixtures::store();
        let rows = medal_table(&store, &FilterSelection::default());
        let kpis = kpis(&rows);
        assert_eq!(kpis.top_gold_continent, Some(("Europe".to_string(), 2)));
        assert_eq!(kpis.continents_with_medals, 2);
        assert_eq!(kpis.countries_with_gold, 2);
        assert!((kpis.average_medals - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_kpis() {
        let kpis = kpis(&[]);
        assert_eq!(kpis.top_gold_continent, None);
        assert_eq!(kpis.average_medals, 0.0);
        assert_eq!(continent_count(), 6);
    }
}
