//! Athlete performance: profiles, age and gender distributions, top medallists.

use super::distribution::{summarize_groups, BoxSummary};
use super::{parse_date, parse_list, truncate_label, AnalysisError, GAMES_YEAR};
use crate::data::{codes, frame, DataStore, MedalTally, MedalType};
use crate::filters::FilterSelection;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Plausible competitor ages; anything outside is a data error.
pub const AGE_RANGE: std::ops::RangeInclusive<i32> = 10..=80;

/// Athletes listed in the top medallists chart.
pub const TOP_MEDALLISTS: usize = 10;

/// Countries shown in the per-country gender breakdown.
pub const GENDER_TOP_COUNTRIES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteProfile {
    pub name: String,
    pub gender: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub disciplines: Vec<String>,
    pub events: Vec<String>,
    pub coaches: Vec<String>,
}

/// Sorted distinct athlete names for the profile picker.
pub fn athlete_names(store: &DataStore) -> Vec<String> {
    frame::unique_sorted(store.athletes(), "name")
}

/// Split the coach field; entries are separated by `<br>` or newlines.
pub fn parse_coaches(raw: &str) -> Vec<String> {
    if raw.trim().eq_ignore_ascii_case("nan") {
        return Vec::new();
    }
    raw.replace("<br>", "\n")
        .lines()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Age at the Games, `None` when implausible.
pub fn age_at_games(birth: NaiveDate) -> Option<i32> {
    let age = GAMES_YEAR - birth.year();
    AGE_RANGE.contains(&age).then_some(age)
}

/// NOC code to display name, from the NOC table.
fn noc_names(store: &DataStore) -> HashMap<String, String> {
    let nocs = store.nocs();
    frame::str_values(nocs, "code")
        .into_iter()
        .zip(frame::str_values(nocs, "country"))
        .filter_map(|(code, name)| Some((code?, name?)))
        .collect()
}

/// Look up one athlete by exact name. The first match wins.
pub fn profile(store: &DataStore, name: &str) -> Result<AthleteProfile, AnalysisError> {
    let df = store.athletes();
    let row = frame::str_values(df, "name")
        .iter()
        .position(|n| n.as_deref() == Some(name))
        .ok_or_else(|| AnalysisError::UnknownAthlete(name.to_string()))?;

    let text = |column: &str| frame::str_values(df, column).get(row).cloned().flatten();
    let number = |column: &str| frame::f64_values(df, column).get(row).copied().flatten();

    let country_code = text("country_code");
    let country = country_code
        .as_deref()
        .and_then(|code| noc_names(store).get(code).cloned())
        .or_else(|| text("country"));

    Ok(AthleteProfile {
        name: name.to_string(),
        gender: text("gender"),
        continent: country_code.as_deref().map(|c| codes::continent_of(c).to_string()),
        country,
        country_code,
        height: number("height"),
        weight: number("weight"),
        birth_date: text("birth_date").as_deref().and_then(parse_date),
        disciplines: text("disciplines").as_deref().map(parse_list).unwrap_or_default(),
        events: text("events").as_deref().map(parse_list).unwrap_or_default(),
        coaches: text("coach").as_deref().map(parse_coaches).unwrap_or_default(),
    })
}

/// One athlete with a plausible age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeSample {
    pub name: String,
    pub gender: Option<String>,
    pub country: String,
    pub continent: String,
    pub disciplines: Vec<String>,
    pub age: i32,
}

/// Athletes under the country and continent filters with an age in
/// [`AGE_RANGE`]. Missing or unparsable birth dates are dropped.
pub fn age_samples(store: &DataStore, selection: &FilterSelection) -> Vec<AgeSample> {
    let df = store.athletes();
    let names = noc_names(store);
    let athlete_names = frame::str_values(df, "name");
    let genders = frame::str_values(df, "gender");
    let country_codes = frame::str_values(df, "country_code");
    let own_countries = frame::str_values(df, "country");
    let disciplines = frame::str_values(df, "disciplines");
    let births = frame::str_values(df, "birth_date");

    (0..df.height())
        .filter_map(|i| {
            let code = country_codes.get(i).cloned().flatten();
            let continent = code
                .as_deref()
                .map(codes::continent_of)
                .unwrap_or(codes::OTHER_CONTINENT);
            if !selection.countries.is_empty()
                && !code.as_ref().is_some_and(|c| selection.countries.contains(c))
            {
                return None;
            }
            if !selection.continents.is_empty()
                && !selection.continents.iter().any(|c| c == continent)
            {
                return None;
            }

            let birth = births.get(i)?.as_deref().and_then(parse_date)?;
            let age = age_at_games(birth)?;
            let country = code
                .as_ref()
                .and_then(|c| names.get(c).cloned())
                .or_else(|| own_countries.get(i).cloned().flatten())
                .or(code)
                .unwrap_or_default();

            Some(AgeSample {
                name: athlete_names.get(i).cloned().flatten().unwrap_or_default(),
                gender: genders.get(i).cloned().flatten(),
                country,
                continent: continent.to_string(),
                disciplines: disciplines
                    .get(i)
                    .cloned()
                    .flatten()
                    .as_deref()
                    .map(parse_list)
                    .unwrap_or_default(),
                age,
            })
        })
        .collect()
}

/// Grouping of the age distribution charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AgeView {
    #[default]
    Overall,
    Gender,
    Sport,
}

impl fmt::Display for AgeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgeView::Overall => "Overall",
            AgeView::Gender => "Gender",
            AgeView::Sport => "Sport",
        })
    }
}

/// Box summaries of age. The sport view counts an athlete once per selected
/// discipline they compete in and falls back to overall when no sport is
/// selected.
pub fn age_distribution(samples: &[AgeSample], view: AgeView, sports: &[String]) -> Vec<BoxSummary> {
    match view {
        AgeView::Sport if !sports.is_empty() => summarize_groups(samples.iter().flat_map(|s| {
            s.disciplines
                .iter()
                .filter(|d| sports.contains(d))
                .map(move |d| (d.clone(), f64::from(s.age)))
        })),
        AgeView::Gender => summarize_groups(
            samples
                .iter()
                .filter_map(|s| Some((s.gender.clone()?, f64::from(s.age)))),
        ),
        _ => summarize_groups(samples.iter().map(|s| ("All".to_string(), f64::from(s.age)))),
    }
}

/// Grouping of the gender breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GenderView {
    #[default]
    World,
    Continent,
    Country,
}

impl fmt::Display for GenderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GenderView::World => "World",
            GenderView::Continent => "By Continent",
            GenderView::Country => "By Country (Top 20)",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderCount {
    pub group: String,
    pub gender: String,
    pub count: usize,
}

/// Athlete counts per group and gender, ordered by group then gender.
pub fn gender_breakdown(samples: &[AgeSample], view: GenderView) -> Vec<GenderCount> {
    let group_of = |s: &AgeSample| match view {
        GenderView::World => "World".to_string(),
        GenderView::Continent => s.continent.clone(),
        GenderView::Country => s.country.clone(),
    };

    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for sample in samples {
        if let Some(gender) = &sample.gender {
            *counts.entry((group_of(sample), gender.clone())).or_default() += 1;
        }
    }

    let keep: Option<Vec<String>> = (view == GenderView::Country).then(|| {
        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        for ((group, _), count) in &counts {
            *totals.entry(group.as_str()).or_default() += count;
        }
        let mut totals: Vec<(&str, usize)> = totals.into_iter().collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1));
        totals
            .into_iter()
            .take(GENDER_TOP_COUNTRIES)
            .map(|(group, _)| group.to_string())
            .collect()
    });

    counts
        .into_iter()
        .filter(|((group, _), _)| keep.as_ref().map_or(true, |k| k.contains(group)))
        .map(|((group, gender), count)| GenderCount { group, gender, count })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMedallist {
    pub name: String,
    pub country_code: Option<String>,
    pub medals: MedalTally,
}

impl TopMedallist {
    pub fn total(&self) -> i64 {
        self.medals.total()
    }
}

/// Athletes with the most medal records, ties broken by name.
pub fn top_medallists(store: &DataStore, n: usize) -> Vec<TopMedallist> {
    let df = store.medallists();
    let names = frame::str_values(df, "name");
    let kinds = frame::str_values(df, "medal_type");
    let country_codes = frame::str_values(df, "country_code");

    let mut by_name: HashMap<String, TopMedallist> = HashMap::new();
    for (i, name) in names.into_iter().enumerate() {
        let Some(name) = name else { continue };
        let entry = by_name.entry(name.clone()).or_insert_with(|| TopMedallist {
            name,
            country_code: country_codes.get(i).cloned().flatten(),
            medals: MedalTally::default(),
        });
        if let Some(medal) = kinds.get(i).and_then(|k| k.as_deref()).and_then(MedalType::from_column) {
            entry.medals.add(medal, 1);
        }
    }

    let mut ranked: Vec<TopMedallist> = by_name.into_values().collect();
    ranked.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteKpis {
    pub average_age: Option<f64>,
    pub female: usize,
    pub male: usize,
    /// Female athletes as a percentage of the male count.
    pub female_ratio: f64,
    /// Display name (truncated) and medal count.
    pub most_decorated: Option<(String, i64)>,
}

pub fn kpis(samples: &[AgeSample], top: &[TopMedallist]) -> AthleteKpis {
    let count = |labels: [&str; 2]| {
        samples
            .iter()
            .filter(|s| s.gender.as_deref().is_some_and(|g| labels.contains(&g)))
            .count()
    };
    let female = count(["Female", "F"]);
    let male = count(["Male", "M"]);

    let average_age = (!samples.is_empty())
        .then(|| samples.iter().map(|s| f64::from(s.age)).sum::<f64>() / samples.len() as f64);

    AthleteKpis {
        average_age,
        female,
        male,
        female_ratio: if male > 0 {
            female as f64 / male as f64 * 100.0
        } else {
            0.0
        },
        most_decorated: top.first().map(|t| (truncate_label(&t.name, 20), t.total())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    #[test]
    fn test_profile() {
        let store = fixtures::store();
        let p = profile(&store, "LEDECKY Katie").unwrap();
        assert_eq!(p.country.as_deref(), Some("United States"));
        assert_eq!(p.continent.as_deref(), Some("North America"));
        assert_eq!(p.events.len(), 2);
        assert_eq!(p.coaches, vec!["HAWKE Anthony", "SMITH Jane"]);
        assert_eq!(p.height, Some(183.0));
        assert_eq!(p.weight, Some(70.0));
    }

    #[test]
    fn test_unknown_athlete() {
        let store = fixtures::store();
        assert!(matches!(
            profile(&store, "Nobody"),
            Err(AnalysisError::UnknownAthlete(_))
        ));
    }

    #[test]
    fn test_parse_coaches() {
        assert_eq!(parse_coaches("A<br>B\nC"), vec!["A", "B", "C"]);
        assert!(parse_coaches("nan").is_empty());
        assert!(parse_coaches("  ").is_empty());
    }

    #[test]
    fn test_age_bounds() {
        let date = |y| NaiveDate::from_ymd_opt(y, 6, 1).unwrap();
        assert_eq!(age_at_games(date(2000)), Some(24));
        assert_eq!(age_at_games(date(1944)), Some(80));
        assert_eq!(age_at_games(date(1900)), None);
        assert_eq!(age_at_games(date(2020)), None);
    }

    #[test]
    fn test_age_samples_drop_implausible() {
        let store = fixtures::store();
        let samples = age_samples(&store, &FilterSelection::default());
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| AGE_RANGE.contains(&s.age)));

        let europe = FilterSelection {
            continents: vec!["Europe".into()],
            ..FilterSelection::default()
        };
        assert_eq!(age_samples(&store, &europe).len(), 2);
    }

    #[test]
    fn test_age_distribution_views() {
        let store = fixtures::store();
        let samples = age_samples(&store, &FilterSelection::default());

        let overall = age_distribution(&samples, AgeView::Overall, &[]);
        assert_eq!(overall.len(), 1);
        assert!((overall[0].mean - 27.5).abs() < 1e-9);

        let by_gender = age_distribution(&samples, AgeView::Gender, &[]);
        assert_eq!(by_gender.len(), 2);

        let judo = age_distribution(&samples, AgeView::Sport, &["Judo".to_string()]);
        assert_eq!(judo.len(), 1);
        assert_eq!(judo[0].label, "Judo");
        assert_eq!(judo[0].median, 35.0);

        let no_sport = age_distribution(&samples, AgeView::Sport, &[]);
        assert_eq!(no_sport[0].label, "All");
    }

    #[test]
    fn test_gender_breakdown() {
        let store = fixtures::store();
        let samples = age_samples(&store, &FilterSelection::default());

        let world = gender_breakdown(&samples, GenderView::World);
        assert_eq!(world.iter().map(|g| g.count).sum::<usize>(), 4);

        let continents = gender_breakdown(&samples, GenderView::Continent);
        let europe_male = continents
            .iter()
            .find(|g| g.group == "Europe" && g.gender == "Male")
            .unwrap();
        assert_eq!(europe_male.count, 2);

        let countries = gender_breakdown(&samples, GenderView::Country);
        assert!(countries.iter().any(|g| g.group == "France"));
    }

    #[test]
    fn test_top_medallists() {
        let store = fixtures::store();
        let top = top_medallists(&store, TOP_MEDALLISTS);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].name, "MARCHAND Leon");
        assert_eq!(top[0].medals, MedalTally::new(1, 0, 1));
        assert_eq!(top[0].country_code.as_deref(), Some("FRA"));
        assert_eq!(top[1].name, "LEDECKY Katie");
    }

    #[test]
    fn test_kpis() {
        let store = fixtures::store();
        let samples = age_samples(&store, &FilterSelection::default());
        let top = top_medallists(&store, TOP_MEDALLISTS);
        let kpis = kpis(&samples, &top);
        assert_eq!(kpis.average_age, Some(27.5));
        assert_eq!(kpis.female, 2);
        assert_eq!(kpis.male, 2);
        assert!((kpis.female_ratio - 100.0).abs() < 1e-9);
        assert_eq!(kpis.most_decorated, Some(("MARCHAND Leon".to_string(), 2)));
    }

    #[test]
    fn test_empty_kpis() {
        let kpis = kpis(&[], &[]);
        assert_eq!(kpis.average_age, None);
        assert_eq!(kpis.female_ratio, 0.0);
        assert_eq!(kpis.most_decorated, None);
    }
}
