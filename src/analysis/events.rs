//! Sports, events and venues: schedule timeline, medals per discipline and
//! venue activity.

use super::{truncate_label, with_continent, AnalysisError};
use crate::data::{codes, frame, DataStore, MedalTally, MedalType};
use crate::filters::{apply_filters_with, FilterColumns, FilterSelection};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Timeline rows drawn at once.
pub const TIMELINE_LIMIT: usize = 50;
/// Bars in the per-event fallback chart.
pub const EVENT_COUNT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimelineBy {
    #[default]
    Discipline,
    Venue,
}

impl TimelineBy {
    /// Schedule column the selection is matched against.
    pub fn column(self) -> &'static str {
        match self {
            TimelineBy::Discipline => "discipline",
            TimelineBy::Venue => "venue",
        }
    }

    /// Column used to colour the bars: the dimension not selected on.
    pub fn colour_column(self) -> &'static str {
        match self {
            TimelineBy::Discipline => "venue",
            TimelineBy::Venue => "discipline",
        }
    }
}

impl fmt::Display for TimelineBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimelineBy::Discipline => "Discipline",
            TimelineBy::Venue => "Venue",
        })
    }
}

/// Values that can be picked for a timeline.
pub fn timeline_options(store: &DataStore, by: TimelineBy) -> Vec<String> {
    frame::unique_sorted(store.schedule(), by.column())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub event: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Venue or discipline, whichever the timeline is not selected on.
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Timeline {
    /// Sessions with parsable start and end, at most [`TIMELINE_LIMIT`].
    Scheduled {
        entries: Vec<TimelineEntry>,
        total: usize,
    },
    /// Per-event session counts when the schedule has no date columns.
    Counts(Vec<(String, usize)>),
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        match self {
            Timeline::Scheduled { entries, .. } => entries.is_empty(),
            Timeline::Counts(counts) => counts.is_empty(),
        }
    }
}

/// Parse an ISO-8601 timestamp. Timestamps without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Schedule of one discipline or venue.
pub fn timeline(store: &DataStore, by: TimelineBy, value: &str) -> Result<Timeline, AnalysisError> {
    let rows = frame::filter_eq(store.schedule(), by.column(), value)?;

    if !frame::has_column(&rows, "start_date") || !frame::has_column(&rows, "end_date") {
        let mut counts = frame::value_counts(&rows, "event");
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        counts.truncate(EVENT_COUNT_LIMIT);
        return Ok(Timeline::Counts(counts));
    }

    let events = frame::str_values(&rows, "event");
    let groups = frame::str_values(&rows, by.colour_column());
    let starts = frame::str_values(&rows, "start_date");
    let ends = frame::str_values(&rows, "end_date");

    let parsed: Vec<TimelineEntry> = (0..rows.height())
        .filter_map(|i| {
            let start = starts.get(i)?.as_deref().and_then(parse_timestamp)?;
            let end = ends.get(i)?.as_deref().and_then(parse_timestamp)?;
            Some(TimelineEntry {
                event: events.get(i).cloned().flatten().unwrap_or_default(),
                group: groups.get(i).cloned().flatten().unwrap_or_default(),
                start,
                end,
            })
        })
        .collect();

    let total = parsed.len();
    Ok(Timeline::Scheduled {
        entries: parsed.into_iter().take(TIMELINE_LIMIT).collect(),
        total,
    })
}

/// Medals won in one discipline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SportMedals {
    pub discipline: String,
    pub medals: MedalTally,
}

/// Medal records per discipline under every filter, most medals first.
/// This is both the treemap input and the breakdown pivot.
pub fn sport_medals(
    store: &DataStore,
    selection: &FilterSelection,
) -> Result<Vec<SportMedals>, AnalysisError> {
    let medals = with_continent(store.medals(), "country_code", store.nocs())?;
    let medals = apply_filters_with(&medals, selection, &FilterColumns::medal_records())?;

    if !frame::has_column(&medals, "discipline") || !frame::has_column(&medals, "medal_type") {
        return Ok(Vec::new());
    }
    let per_type = MedalType::ALL.map(|medal| {
        col("medal_type")
            .eq(lit(medal.column()))
            .cast(DataType::Int64)
            .sum()
            .alias(medal.short())
    });
    let table = medals
        .lazy()
        .filter(col("discipline").is_not_null())
        .group_by([col("discipline")])
        .agg(per_type)
        .with_column((col("Gold") + col("Silver") + col("Bronze")).alias("total"))
        .filter(col("total").gt(lit(0)))
        .sort(
            ["total", "discipline"],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let disciplines = frame::str_values(&table, "discipline");
    let gold = frame::i64_values(&table, "Gold");
    let silver = frame::i64_values(&table, "Silver");
    let bronze = frame::i64_values(&table, "Bronze");

    Ok(disciplines
        .into_iter()
        .zip(gold)
        .zip(silver)
        .zip(bronze)
        .filter_map(|(((discipline, gold), silver), bronze)| {
            Some(SportMedals {
                discipline: discipline?,
                medals: MedalTally {
                    gold: gold.unwrap_or(0),
                    silver: silver.unwrap_or(0),
                    bronze: bronze.unwrap_or(0),
                },
            })
        })
        .collect())
}

/// Scheduled sessions per venue, busiest first.
pub fn venue_event_counts(store: &DataStore) -> Vec<(String, usize)> {
    frame::value_counts(store.schedule(), "venue")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenuePoint {
    pub venue: String,
    pub lat: f64,
    pub lon: f64,
    pub events: usize,
}

/// Venues with coordinates. The table's own `lat`/`lon` columns win over the
/// built-in venue table; venues with neither are left out.
pub fn venue_points(store: &DataStore) -> Vec<VenuePoint> {
    let venues = store.venues();
    let names = frame::str_values(venues, "venue");
    let lats = frame::f64_values(venues, "lat");
    let lons = frame::f64_values(venues, "lon");
    let counts: HashMap<String, usize> = venue_event_counts(store).into_iter().collect();

    names
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let name = name?;
            let own = lats
                .get(i)
                .copied()
                .flatten()
                .zip(lons.get(i).copied().flatten());
            let (lat, lon) = own.or_else(|| codes::venue_coordinates(&name))?;
            Some(VenuePoint {
                events: counts.get(&name).copied().unwrap_or(0),
                venue: name,
                lat,
                lon,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventKpis {
    pub disciplines: usize,
    pub events: usize,
    pub venues: usize,
    /// Discipline with the most medals (display name) and its count.
    pub top_discipline: Option<(String, i64)>,
    /// Venue with the most sessions (display name) and its count.
    pub busiest_venue: Option<(String, usize)>,
}

pub fn kpis(store: &DataStore, sport_medals: &[SportMedals]) -> EventKpis {
    let schedule = store.schedule();
    EventKpis {
        disciplines: frame::n_unique(schedule, "discipline"),
        events: schedule.height(),
        venues: venue_points(store).len(),
        top_discipline: sport_medals
            .first()
            .map(|s| (truncate_label(&s.discipline, 25), s.medals.total())),
        busiest_venue: venue_event_counts(store)
            .into_iter()
            .next()
            .map(|(venue, count)| (truncate_label(&venue, 30), count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use polars::prelude::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-07-27T10:00:00+02:00").unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "10:00");
        assert!(parse_timestamp("2024-07-27 10:00:00").is_some());
        assert!(parse_timestamp("TBD").is_none());
    }

    #[test]
    fn test_timeline_by_discipline() {
        let store = fixtures::store();
        match timeline(&store, TimelineBy::Discipline, "Swimming").unwrap() {
            Timeline::Scheduled { entries, total } => {
                assert_eq!(total, 3);
                assert_eq!(entries[0].group, "Paris La Defense Arena");
            }
            other => panic!("unexpected timeline: {:?}", other),
        }
    }

    #[test]
    fn test_timeline_skips_unparsable_dates() {
        let store = fixtures::store();
        match timeline(&store, TimelineBy::Venue, "Champ-de-Mars Arena").unwrap() {
            Timeline::Scheduled { entries, total } => {
                assert_eq!(total, 1);
                assert_eq!(entries[0].group, "Judo");
            }
            other => panic!("unexpected timeline: {:?}", other),
        }
    }

    #[test]
    fn test_timeline_without_dates_counts_events() {
        let schedule = df!(
            "discipline" => &["Rowing", "Rowing", "Rowing"],
            "event" => &["Single Sculls", "Single Sculls", "Eight"]
        )
        .unwrap();
        let store = DataStore::from_frames(vec![(crate::data::Table::Schedule, schedule)]).unwrap();
        let timeline = timeline(&store, TimelineBy::Discipline, "Rowing").unwrap();
        assert_eq!(
            timeline,
            Timeline::Counts(vec![("Eight".to_string(), 1), ("Single Sculls".to_string(), 2)])
        );
    }

    #[test]
    fn test_sport_medals() {
        let store = fixtures::store();
        let rows = sport_medals(&store, &FilterSelection::default()).unwrap();
        assert_eq!(rows[0].discipline, "Swimming");
        assert_eq!(rows[0].medals, MedalTally::new(2, 1, 1));
        assert_eq!(rows[1].medals.total(), 2);

        let asia = FilterSelection {
            continents: vec!["Asia".into()],
            ..FilterSelection::default()
        };
        let rows = sport_medals(&store, &asia).unwrap();
        assert_eq!(rows.iter().map(|r| r.medals.total()).sum::<i64>(), 2);
    }

    #[test]
    fn test_venues() {
        let store = fixtures::store();
        assert_eq!(
            venue_event_counts(&store)[0],
            ("Paris La Defense Arena".to_string(), 3)
        );
        let points = venue_points(&store);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.venue != "Unmapped Hall"));
    }

    #[test]
    fn test_kpis() {
        let store = fixtures::store();
        let medals = sport_medals(&store, &FilterSelection::default()).unwrap();
        let kpis = kpis(&store, &medals);
        assert_eq!(kpis.disciplines, 2);
        assert_eq!(kpis.events, 5);
        assert_eq!(kpis.venues, 2);
        assert_eq!(kpis.top_discipline, Some(("Swimming".to_string(), 4)));
        assert_eq!(
            kpis.busiest_venue,
            Some(("Paris La Defense Arena".to_string(), 3))
        );
    }
}
