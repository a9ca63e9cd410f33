//! Daily highlights: who won the day, what was on and where.

use super::events::{parse_timestamp, VenuePoint};
use super::{parse_date, AnalysisError};
use crate::data::{codes, frame, DataStore, MedalType};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Countries in the "top of the day" chart.
pub const TOP_COUNTRIES: usize = 10;

/// Days that have at least one scheduled session, in order.
pub fn available_days(store: &DataStore) -> Vec<NaiveDate> {
    frame::str_values(store.schedule(), "day")
        .into_iter()
        .flatten()
        .filter_map(|d| parse_date(&d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a user supplied `YYYY-MM-DD` day.
pub fn parse_day(raw: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AnalysisError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub events: usize,
    pub medal_events: usize,
    pub medals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedalWinner {
    pub medal: MedalType,
    pub name: String,
    pub country: String,
    pub discipline: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    /// Local start time as `HH:MM`, `None` when the start is not a timestamp.
    pub time: Option<String>,
    pub discipline: String,
    pub event: String,
    pub status: String,
    pub venue: String,
    pub medal_event: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayHighlights {
    pub day: NaiveDate,
    pub counts: DayCounts,
    pub top_countries: Vec<(String, usize)>,
    pub winners: Vec<MedalWinner>,
    pub schedule: Vec<ScheduleRow>,
    pub venues: Vec<VenuePoint>,
}

/// Rows of `df` whose `column` falls on `day`.
fn rows_on(df: &DataFrame, column: &str, day: NaiveDate) -> Result<DataFrame, AnalysisError> {
    let keep: Vec<bool> = frame::str_values(df, column)
        .iter()
        .map(|v| v.as_deref().and_then(parse_date) == Some(day))
        .collect();
    if keep.is_empty() {
        return Ok(df.head(Some(0)));
    }
    Ok(frame::filter_rows(df, &keep)?)
}

/// Everything shown for one day. Filters do not apply here.
pub fn highlights(
    store: &DataStore,
    day: NaiveDate,
    medal_events_only: bool,
) -> Result<DayHighlights, AnalysisError> {
    let schedule = rows_on(store.schedule(), "day", day)?;
    let medals = rows_on(store.medals(), "medal_date", day)?;

    let medal_flags: Vec<bool> = frame::i64_values(&schedule, "event_medal")
        .into_iter()
        .map(|v| v == Some(1))
        .collect();

    let counts = DayCounts {
        events: schedule.height(),
        medal_events: medal_flags.iter().filter(|&&m| m).count(),
        medals: medals.height(),
    };

    let mut top_countries = frame::value_counts(&medals, "country");
    top_countries.truncate(TOP_COUNTRIES);

    Ok(DayHighlights {
        day,
        counts,
        top_countries,
        winners: winners(&medals),
        schedule: schedule_rows(&schedule, &medal_flags, medal_events_only),
        venues: venue_activity(&schedule),
    })
}

/// Medal records in Gold, Silver, Bronze order, otherwise as recorded.
fn winners(medals: &DataFrame) -> Vec<MedalWinner> {
    let column = |name: &str| frame::str_values(medals, name);
    let (kinds, names, countries, disciplines, events) = (
        column("medal_type"),
        column("name"),
        column("country"),
        column("discipline"),
        column("event"),
    );
    let text = |values: &[Option<String>], i: usize| values.get(i).cloned().flatten().unwrap_or_default();

    let mut rows: Vec<MedalWinner> = kinds
        .iter()
        .enumerate()
        .filter_map(|(i, kind)| {
            Some(MedalWinner {
                medal: MedalType::from_column(kind.as_deref()?)?,
                name: text(&names, i),
                country: text(&countries, i),
                discipline: text(&disciplines, i),
                event: text(&events, i),
            })
        })
        .collect();
    rows.sort_by_key(|w| w.medal);
    rows
}

fn schedule_rows(schedule: &DataFrame, medal_flags: &[bool], medal_events_only: bool) -> Vec<ScheduleRow> {
    let column = |name: &str| frame::str_values(schedule, name);
    let (starts, disciplines, events, statuses, venues) = (
        column("start_date"),
        column("discipline"),
        column("event"),
        column("status"),
        column("venue"),
    );
    let text = |values: &[Option<String>], i: usize| values.get(i).cloned().flatten().unwrap_or_default();

    let mut rows: Vec<ScheduleRow> = (0..schedule.height())
        .map(|i| ScheduleRow {
            time: starts
                .get(i)
                .cloned()
                .flatten()
                .as_deref()
                .and_then(parse_timestamp)
                .map(|ts| ts.format("%H:%M").to_string()),
            discipline: text(&disciplines, i),
            event: text(&events, i),
            status: text(&statuses, i),
            venue: text(&venues, i),
            medal_event: medal_flags.get(i).copied().unwrap_or(false),
        })
        .filter(|row| !medal_events_only || row.medal_event)
        .collect();
    // untimed sessions last
    rows.sort_by(|a, b| (a.time.is_none(), &a.time).cmp(&(b.time.is_none(), &b.time)));
    rows
}

/// Sessions per venue that day, for venues with known coordinates.
fn venue_activity(schedule: &DataFrame) -> Vec<VenuePoint> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for venue in frame::str_values(schedule, "venue").into_iter().flatten() {
        *counts.entry(venue).or_default() += 1;
    }
    counts
        .into_iter()
        .filter_map(|(venue, events)| {
            let (lat, lon) = codes::venue_coordinates(&venue)?;
            Some(VenuePoint { venue, lat, lon, events })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    fn day(d: &str) -> NaiveDate {
        parse_day(d).unwrap()
    }

    #[test]
    fn test_available_days() {
        let store = fixtures::store();
        assert_eq!(
            available_days(&store),
            vec![day("2024-07-27"), day("2024-07-28"), day("2024-08-02")]
        );
    }

    #[test]
    fn test_invalid_day() {
        assert!(matches!(parse_day("27/07/2024"), Err(AnalysisError::InvalidDate(_))));
    }

    #[test]
    fn test_highlights() {
        let store = fixtures::store();
        let h = highlights(&store, day("2024-07-27"), false).unwrap();
        assert_eq!(
            h.counts,
            DayCounts {
                events: 2,
                medal_events: 1,
                medals: 3,
            }
        );
        assert_eq!(h.top_countries.len(), 3);
        assert_eq!(h.top_countries[0], ("China".to_string(), 1));
        let medals: Vec<MedalType> = h.winners.iter().map(|w| w.medal).collect();
        assert_eq!(medals, MedalType::ALL.to_vec());
        assert_eq!(h.schedule[0].time.as_deref(), Some("09:00"));
        assert_eq!(h.venues.len(), 1);
        assert_eq!(h.venues[0].events, 2);
    }

    #[test]
    fn test_medal_events_only() {
        let store = fixtures::store();
        let h = highlights(&store, day("2024-07-27"), true).unwrap();
        assert_eq!(h.schedule.len(), 1);
        assert!(h.schedule[0].medal_event);
        assert_eq!(h.counts.events, 2);
    }

    #[test]
    fn test_untimed_session_sorts_last() {
        let store = fixtures::store();
        let h = highlights(&store, day("2024-08-02"), false).unwrap();
        assert_eq!(h.schedule.len(), 2);
        assert_eq!(h.schedule[0].time.as_deref(), Some("10:00"));
        assert_eq!(h.schedule[1].time, None);
        assert_eq!(h.schedule[1].status, "Cancelled");
    }

    #[test]
    fn test_quiet_day() {
        let store = fixtures::store();
        let h = highlights(&store, day("2024-08-11"), false).unwrap();
        assert_eq!(h.counts, DayCounts::default());
        assert!(h.winners.is_empty());
        assert!(h.venues.is_empty());
    }
}
