//! Overview page: headline KPIs, medal distribution and standings.

use super::{medal_table, top_by_total, with_continent, AnalysisError, CountryTally};
use crate::data::{frame, DataStore, MedalTally};
use crate::filters::{apply_filters, FilterSelection};
use serde::Serialize;

/// Headline numbers under the current filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub athletes: usize,
    pub countries: usize,
    pub sports: usize,
    pub medals: i64,
    pub events: usize,
}

/// Athletes filtered by country and continent.
fn filtered_athletes(
    store: &DataStore,
    selection: &FilterSelection,
) -> Result<polars::prelude::DataFrame, AnalysisError> {
    let scoped = FilterSelection {
        countries: selection.countries.clone(),
        continents: selection.continents.clone(),
        ..FilterSelection::default()
    };
    let athletes = with_continent(store.athletes(), "country_code", store.nocs())?;
    Ok(apply_filters(&athletes, &scoped)?)
}

/// Compute the overview KPIs.
///
/// Athletes respond to the country and continent filters, events to the
/// sport filter, medals to country and continent.
pub fn kpis(store: &DataStore, selection: &FilterSelection) -> Result<Kpis, AnalysisError> {
    let athletes = filtered_athletes(store, selection)?;

    let sport_only = FilterSelection {
        sports: selection.sports.clone(),
        ..FilterSelection::default()
    };
    let events = apply_filters(store.events(), &sport_only)?;

    let medals: i64 = medal_table(store, selection)
        .iter()
        .map(CountryTally::total)
        .sum();

    Ok(Kpis {
        athletes: athletes.height(),
        countries: frame::n_unique(&athletes, "country_code"),
        sports: frame::n_unique(&events, "sport"),
        medals,
        events: events.height(),
    })
}

/// Gold, silver and bronze totals across the filtered standings.
pub fn medal_distribution(store: &DataStore, selection: &FilterSelection) -> MedalTally {
    medal_table(store, selection)
        .iter()
        .fold(MedalTally::default(), |mut acc, row| {
            acc += row.medals;
            acc
        })
}

/// The `n` countries with the most medals, largest first.
pub fn top_standings(store: &DataStore, selection: &FilterSelection, n: usize) -> Vec<CountryTally> {
    top_by_total(&medal_table(store, selection), n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    #[test]
    fn test_unfiltered_kpis() {
        let store = fixtures::store();
        let kpis = kpis(&store, &FilterSelection::default()).unwrap();
        assert_eq!(
            kpis,
            Kpis {
                athletes: 6,
                countries: 4,
                sports: 2,
                medals: 6,
                events: 4,
            }
        );
    }

    #[test]
    fn test_filtered_kpis() {
        let store = fixtures::store();
        let selection = FilterSelection {
            continents: vec!["Europe".into()],
            sports: vec!["Judo".into()],
            ..FilterSelection::default()
        };
        let kpis = kpis(&store, &selection).unwrap();
        assert_eq!(kpis.athletes, 2);
        assert_eq!(kpis.countries, 1);
        assert_eq!(kpis.events, 1);
        assert_eq!(kpis.sports, 1);
        assert_eq!(kpis.medals, 3);
    }

    #[test]
    fn test_distribution_sums_to_total_medals() {
        let store = fixtures::store();
        let selection = FilterSelection::default();
        let dist = medal_distribution(&store, &selection);
        assert_eq!(dist, MedalTally::new(3, 1, 2));
        assert_eq!(dist.total(), kpis(&store, &selection).unwrap().medals);
    }

    #[test]
    fn test_top_standings() {
        let store = fixtures::store();
        let top = top_standings(&store, &FilterSelection::default(), 10);
        assert_eq!(top.len(), 4);
        assert_eq!(top[0].code, "FRA");
        assert!(top.windows(2).all(|w| w[0].total() >= w[1].total()));
    }
}
