//! End-to-end checks against a small CSV folder on disk.

use podium::analysis::{daily, head_to_head, overview};
use podium::commands::Summary;
use podium::data::{DataStore, LoaderError, Table};
use podium::filters::{FilterOptions, FilterSelection};
use podium::report::{self, ReportSettings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ATHLETES: &str = "\
code,name,gender,country_code,country,height,weight,disciplines,events,birth_date,coach
1,LEDECKY Katie,Female,USA,United States,183,70,['Swimming'],['Women 800m Freestyle'],1997-03-17,
2,MARCHAND Leon,Male,FRA,France,187,,['Swimming'],['Men 200m IM'],2002-05-17,
3,RINER Teddy,Male,FRA,France,204,140,['Judo'],['Men +100 kg'],1989-04-07,GUERIN Franck
4,ZHANG Yufei,Female,CHN,China,176,,['Swimming'],,1998-04-19,
";

const EVENTS: &str = "\
event,sport
Women 800m Freestyle,Swimming
Men 200m IM,Swimming
Men +100 kg,Judo
";

const MEDALS: &str = "\
medal_type,medal_date,name,discipline,event,country_code,country
Gold Medal,2024-07-27,LEDECKY Katie,Swimming,Women 800m Freestyle,USA,United States
Gold Medal,2024-07-28,MARCHAND Leon,Swimming,Men 200m IM,FRA,France
Gold Medal,2024-08-02,RINER Teddy,Judo,Men +100 kg,FRA,France
Silver Medal,2024-07-27,ZHANG Yufei,Swimming,Women 800m Freestyle,CHN,China
";

const MEDALS_TOTAL: &str = "\
country_code,country,Gold Medal,Silver Medal,Bronze Medal,Total
FRA,France,2,0,0,2
USA,United States,1,0,0,1
CHN,China,0,1,0,1
";

const MEDALLISTS: &str = "\
medal_date,medal_type,name,country_code,discipline,event
2024-07-27,Gold Medal,LEDECKY Katie,USA,Swimming,Women 800m Freestyle
";

const NOCS: &str = "\
code,country,country_long,tag,note
USA,United States,United States of America,usa,P
FRA,France,France,france,P
CHN,China,People's Republic of China,china,P
";

const SCHEDULE: &str = "\
start_date,end_date,day,status,discipline,event,event_medal,venue
2024-07-27T10:00:00+02:00,2024-07-27T12:00:00+02:00,2024-07-27,Finished,Swimming,Women 800m Freestyle,1,Paris La Defense Arena
2024-07-27T09:00:00+02:00,2024-07-27T09:30:00+02:00,2024-07-27,Finished,Swimming,Men 200m IM Heats,0,Paris La Defense Arena
2024-08-02T10:00:00+02:00,2024-08-02T18:00:00+02:00,2024-08-02,Finished,Judo,Men +100 kg,1,Champ-de-Mars Arena
";

const VENUES: &str = "\
venue,sports
Paris La Defense Arena,['Swimming']
Champ-de-Mars Arena,['Judo']
";

fn write_games(dir: &Path) {
    let files = [
        (Table::Athletes, ATHLETES),
        (Table::Coaches, "name,country_code,discipline\nGUERIN Franck,FRA,Judo\n"),
        (Table::Events, EVENTS),
        (Table::Medals, MEDALS),
        (Table::MedalsTotal, MEDALS_TOTAL),
        (Table::Medallists, MEDALLISTS),
        (Table::Nocs, NOCS),
        (Table::Schedule, SCHEDULE),
        (Table::Teams, "team,country_code,discipline\nFRA Relay,FRA,Swimming\n"),
        (Table::Venues, VENUES),
    ];
    for (table, content) in files {
        fs::write(dir.join(table.file_name()), content).unwrap();
    }
}

fn games() -> (TempDir, DataStore) {
    let tmp = TempDir::new().unwrap();
    write_games(tmp.path());
    let store = DataStore::load(tmp.path()).unwrap();
    (tmp, store)
}

#[test]
fn loads_every_table() {
    let (_tmp, store) = games();
    let summary = store.summary();
    assert_eq!(summary.len(), Table::ALL.len());
    assert!(summary.iter().all(|t| t.rows > 0));
    assert_eq!(store.athletes().height(), 4);
}

#[test]
fn missing_file_stops_loading() {
    let tmp = TempDir::new().unwrap();
    write_games(tmp.path());
    fs::remove_file(tmp.path().join("medals_total.csv")).unwrap();
    let err = DataStore::load(tmp.path()).unwrap_err();
    assert!(matches!(err, LoaderError::MissingFile(_)));
}

#[test]
fn filter_options_come_from_the_data() {
    let (_tmp, store) = games();
    let options = FilterOptions::from_store(&store);
    assert_eq!(options.countries, vec!["CHN", "FRA", "USA"]);
    assert_eq!(options.sports, vec!["Judo", "Swimming"]);
    assert!(options.continents.contains(&"Europe".to_string()));
}

#[test]
fn overview_respects_country_filter() {
    let (_tmp, store) = games();
    let all = overview::kpis(&store, &FilterSelection::default()).unwrap();
    assert_eq!(all.athletes, 4);
    assert_eq!(all.medals, 4);

    let france = FilterSelection {
        countries: vec!["FRA".into()],
        ..FilterSelection::default()
    };
    let kpis = overview::kpis(&store, &france).unwrap();
    assert_eq!(kpis.athletes, 2);
    assert_eq!(kpis.medals, 2);
}

#[test]
fn head_to_head_and_daily() {
    let (_tmp, store) = games();
    let cmp = head_to_head::compare(&store, "FRA", "USA").unwrap();
    assert_eq!(cmp.a.medals.gold, 2);
    assert_eq!(cmp.b.medals.gold, 1);

    let day = daily::parse_day("2024-07-27").unwrap();
    let h = daily::highlights(&store, day, true).unwrap();
    assert_eq!(h.counts.events, 2);
    assert_eq!(h.counts.medal_events, 1);
    assert_eq!(h.counts.medals, 2);
    assert_eq!(h.schedule.len(), 1);
}

#[test]
fn summary_serializes() {
    let (_tmp, store) = games();
    let summary = Summary::collect(&store, &FilterSelection::default(), 10).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["standings"][0]["code"], "FRA");
}

#[test]
fn report_is_written_to_disk() {
    let (_tmp, store) = games();
    let out = TempDir::new().unwrap();
    let settings = ReportSettings {
        width: 640,
        height: 400,
        archive: true,
        ..ReportSettings::default()
    };
    let output = report::write_report(&store, &FilterSelection::default(), &settings, out.path()).unwrap();
    assert!(output.index.is_file());
    assert!(output.archive.as_ref().is_some_and(|p| p.is_file()));
    for chart in &output.summary.charts {
        assert!(out.path().join(&chart.file).is_file(), "{}", chart.file);
    }
}
