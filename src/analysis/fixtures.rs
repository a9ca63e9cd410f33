//! Small in-memory Games used by the analysis tests.

use crate::data::{DataStore, Table};
use polars::prelude::*;

pub fn store() -> DataStore {
    let athletes = df!(
        "code" => &["A1", "A2", "A3", "A4", "A5", "A6"],
        "name" => &["LEDECKY Katie", "MARCHAND Leon", "RINER Teddy", "ZHANG Yufei", "OLD Timer", "NO Birthdate"],
        "gender" => &["Female", "Male", "Male", "Female", "Male", "Female"],
        "country_code" => &["USA", "FRA", "FRA", "CHN", "EOR", "USA"],
        "country" => &["United States", "France", "France", "China", "Refugee Olympic Team", "United States"],
        "height" => &[Some(183.0f64), Some(187.0), Some(204.0), Some(176.0), None, None],
        "weight" => &[Some(70.0f64), None, Some(140.0), None, None, None],
        "disciplines" => &[Some("['Swimming']"), Some("['Swimming']"), Some("['Judo']"), Some("['Swimming']"), Some("['Judo']"), None],
        "events" => &[Some("[\"Women's 800m Freestyle\", \"Women's 1500m Freestyle\"]"), Some("[\"Men's 200m IM\"]"), Some("['Men +100 kg']"), None, None, None],
        "birth_date" => &[Some("1997-03-17"), Some("2002-05-17"), Some("1989-04-07"), Some("1998-04-19"), Some("1900-01-01"), None],
        "coach" => &[Some("HAWKE Anthony<br>SMITH Jane"), None, Some("GUERIN Franck"), None, None, None]
    )
    .unwrap();

    let events = df!(
        "event" => &["Women's 800m Freestyle", "Men's 200m IM", "Men +100 kg", "Women 78kg"],
        "sport" => &[Some("Swimming"), Some("Swimming"), Some("Judo"), None]
    )
    .unwrap();

    let medals = df!(
        "medal_type" => &["Gold Medal", "Gold Medal", "Gold Medal", "Silver Medal", "Bronze Medal", "Bronze Medal"],
        "medal_date" => &["2024-07-27", "2024-07-28", "2024-08-02", "2024-07-27", "2024-07-27", "2024-08-02"],
        "name" => &["LEDECKY Katie", "MARCHAND Leon", "RINER Teddy", "ZHANG Yufei", "MARCHAND Leon", "LI Wen"],
        "discipline" => &["Swimming", "Swimming", "Judo", "Swimming", "Swimming", "Judo"],
        "event" => &["Women's 800m Freestyle", "Men's 200m IM", "Men +100 kg", "Women's 800m Freestyle", "Men's 400m IM", "Men +100 kg"],
        "country_code" => &["USA", "FRA", "FRA", "CHN", "FRA", "CHN"],
        "country" => &["United States", "France", "France", "China", "France", "China"]
    )
    .unwrap();

    let medals_total = df!(
        "country_code" => &["FRA", "USA", "CHN", "EOR"],
        "country" => &["France", "United States", "China", "Refugee Olympic Team"],
        "Gold Medal" => &[2i64, 1, 0, 0],
        "Silver Medal" => &[0i64, 0, 1, 0],
        "Bronze Medal" => &[1i64, 0, 1, 0],
        "Total" => &[3i64, 1, 2, 0]
    )
    .unwrap();

    let medallists = medals
        .select(["medal_date", "medal_type", "name", "country_code", "discipline", "event"])
        .unwrap();

    let nocs = df!(
        "code" => &["USA", "FRA", "CHN", "EOR"],
        "country" => &["United States", "France", "China", "Refugee Olympic Team"],
        "note" => &["P", "P", "P", "P"]
    )
    .unwrap();

    let schedule = df!(
        "start_date" => &["2024-07-27T10:00:00+02:00", "2024-07-27T09:00:00+02:00", "2024-07-28T20:00:00+02:00", "2024-08-02T10:00:00+02:00", "TBD"],
        "end_date" => &["2024-07-27T12:00:00+02:00", "2024-07-27T09:30:00+02:00", "2024-07-28T21:00:00+02:00", "2024-08-02T18:00:00+02:00", "TBD"],
        "day" => &["2024-07-27", "2024-07-27", "2024-07-28", "2024-08-02", "2024-08-02"],
        "status" => &["Finished", "Finished", "Finished", "Finished", "Cancelled"],
        "discipline" => &["Swimming", "Swimming", "Swimming", "Judo", "Judo"],
        "event" => &["Women's 800m Freestyle", "Men's 200m IM Heats", "Men's 200m IM", "Men +100 kg", "Women 78kg Prelim"],
        "event_medal" => &[1i64, 0, 1, 1, 0],
        "venue" => &["Paris La Defense Arena", "Paris La Defense Arena", "Paris La Defense Arena", "Champ-de-Mars Arena", "Champ-de-Mars Arena"]
    )
    .unwrap();

    let venues = df!(
        "venue" => &["Paris La Defense Arena", "Champ-de-Mars Arena", "Unmapped Hall"],
        "sports" => &["['Swimming']", "['Judo']", "[]"]
    )
    .unwrap();

    DataStore::from_frames(vec![
        (Table::Athletes, athletes),
        (Table::Events, events),
        (Table::Medals, medals),
        (Table::MedalsTotal, medals_total),
        (Table::Medallists, medallists),
        (Table::Nocs, nocs),
        (Table::Schedule, schedule),
        (Table::Venues, venues),
    ])
    .unwrap()
}
