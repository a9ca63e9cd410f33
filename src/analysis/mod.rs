//! Analysis module - aggregates behind each dashboard page

pub mod athletes;
pub mod daily;
pub mod distribution;
pub mod events;
pub mod global;
pub mod head_to_head;
pub mod overview;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::data::{codes, frame, DataStore, MedalTally, MedalType};
use crate::filters::FilterSelection;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Year the Games were held; ages are computed against it.
pub const GAMES_YEAR: i32 = 2024;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Please select two different countries to compare")]
    SameCountry,
    #[error("Unknown athlete: {0}")]
    UnknownAthlete(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// One row of the medal standings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTally {
    pub code: String,
    pub country: String,
    pub continent: String,
    pub iso3: String,
    pub medals: MedalTally,
}

impl CountryTally {
    pub fn total(&self) -> i64 {
        self.medals.total()
    }
}

/// `medals_total` with a continent per row, restricted by the country and
/// continent filters. Sport and medal-type filters do not apply to totals.
pub fn medal_table(store: &DataStore, selection: &FilterSelection) -> Vec<CountryTally> {
    let df = store.medals_total();
    let codes_col = frame::str_values(df, "country_code");
    let names = frame::str_values(df, "country");
    let per_type: Vec<Vec<Option<i64>>> = MedalType::ALL
        .iter()
        .map(|m| frame::i64_values(df, m.column()))
        .collect();

    codes_col
        .iter()
        .enumerate()
        .filter_map(|(i, code)| {
            let code = code.clone()?;
            let count = |m: usize| per_type[m].get(i).copied().flatten().unwrap_or(0);
            let continent = codes::continent_of(&code).to_string();
            Some(CountryTally {
                country: names.get(i).cloned().flatten().unwrap_or_else(|| code.clone()),
                iso3: codes::iso3_of(&code).to_string(),
                medals: MedalTally::new(count(0), count(1), count(2)),
                continent,
                code,
            })
        })
        .filter(|row| selection.countries.is_empty() || selection.countries.contains(&row.code))
        .filter(|row| {
            selection.continents.is_empty() || selection.continents.contains(&row.continent)
        })
        .collect()
}

/// The `n` rows with the most medals, largest first. Ties keep table order.
pub fn top_by_total(rows: &[CountryTally], n: usize) -> Vec<CountryTally> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.total().cmp(&a.total()));
    sorted.truncate(n);
    sorted
}

/// Shorten a label to `max` characters, marking the cut with "...".
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

/// Split a list stored as text, e.g. `['Athletics', 'Swimming']`.
///
/// Commas inside a quoted item do not split it, and adjacent quoted pieces
/// join into one item.
pub fn parse_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }
    let body = raw.strip_prefix('[').unwrap_or(raw);
    let body = body.strip_suffix(']').unwrap_or(body);

    let mut items = Vec::new();
    let mut item = String::new();
    let mut quote: Option<char> = None;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => item.extend(chars.next()),
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => item.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, ',') => items.push(std::mem::take(&mut item)),
            (None, c) => item.push(c),
        }
    }
    items.push(item);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse the leading `YYYY-MM-DD` of a date or timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Add a `continent` column by left-joining `code_column` against the
/// `code`/`continent` columns of `nocs`. Codes the NOC table lacks, and null
/// codes, get a null continent.
pub(crate) fn with_continent(
    df: &DataFrame,
    code_column: &str,
    nocs: &DataFrame,
) -> PolarsResult<DataFrame> {
    if frame::has_column(df, "continent") || !frame::has_column(df, code_column) {
        return Ok(df.clone());
    }
    if !frame::has_column(nocs, "code") || !frame::has_column(nocs, "continent") {
        return df
            .clone()
            .lazy()
            .with_column(lit(Null {}).cast(DataType::String).alias("continent"))
            .collect();
    }
    let lookup = nocs
        .clone()
        .lazy()
        .select([col("code").cast(DataType::String).alias(NOC_KEY), col("continent")])
        .group_by([col(NOC_KEY)])
        .agg([col("continent").first()]);
    df.clone()
        .lazy()
        .join(
            lookup,
            [col(code_column)],
            [col(NOC_KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
}

const NOC_KEY: &str = "__noc_code";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_table_maps_every_code_to_a_continent() {
        let rows = medal_table(&fixtures::store(), &FilterSelection::default());
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| !r.continent.is_empty()));
        assert_eq!(rows[3].continent, codes::OTHER_CONTINENT);
        assert_eq!(rows[0].iso3, "FRA");
        assert_eq!(rows[2].iso3, "CHN");
    }

    #[test]
    fn test_medal_table_totals_match_source() {
        let store = fixtures::store();
        let rows = medal_table(&store, &FilterSelection::default());
        let totals: Vec<i64> = rows.iter().map(CountryTally::total).collect();
        let source: Vec<i64> = frame::i64_values(store.medals_total(), "Total")
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(totals, source);
    }

    #[test]
    fn test_medal_table_continent_filter() {
        let selection = FilterSelection {
            continents: vec!["Europe".into()],
            ..FilterSelection::default()
        };
        let rows = medal_table(&fixtures::store(), &selection);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "FRA");
    }

    #[test]
    fn test_top_by_total() {
        let rows = medal_table(&fixtures::store(), &FilterSelection::default());
        let top = top_by_total(&rows, 2);
        assert_eq!(
            top.iter().map(|r| r.code.as_str()).collect::<Vec<_>>(),
            vec!["FRA", "CHN"]
        );
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Judo", 20), "Judo");
        assert_eq!(truncate_label("Artistic Gymnastics", 8), "Artistic...");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("['Athletics', 'Swimming']"), vec!["Athletics", "Swimming"]);
        assert_eq!(parse_list("[\"Men's 100m\"]"), vec!["Men's 100m"]);
        assert!(parse_list("nan").is_empty());
        assert!(parse_list("[]").is_empty());
    }

    #[test]
    fn test_parse_list_keeps_quoted_commas() {
        let items = parse_list("[\"Men's 4 x 100m, Relay\", 'Women''s Judo']");
        assert_eq!(items, vec!["Men's 4 x 100m, Relay", "Womens Judo"]);
        assert_eq!(parse_list(r"['It\'s, fine']"), vec!["It's, fine"]);
        assert_eq!(parse_list("Swimming"), vec!["Swimming"]);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-07-27T10:00:00+02:00"), NaiveDate::from_ymd_opt(2024, 7, 27));
        assert_eq!(parse_date(" 1997-03-17 "), NaiveDate::from_ymd_opt(1997, 3, 17));
        assert_eq!(parse_date("TBD"), None);
    }

    #[test]
    fn test_with_continent() {
        let nocs = df!(
            "code" => &["KEN", "EOR"],
            "continent" => &["Africa", "Other"]
        )
        .unwrap();
        let df = df!(
            "country_code" => &[Some("KEN"), Some("XXX"), None],
            "medals" => &[1i64, 2, 3]
        )
        .unwrap();
        let out = with_continent(&df, "country_code", &nocs).unwrap();
        assert_eq!(out.height(), 3);
        assert!(!frame::has_column(&out, NOC_KEY));
        let mut pairs: Vec<(Option<i64>, Option<String>)> = frame::i64_values(&out, "medals")
            .into_iter()
            .zip(frame::str_values(&out, "continent"))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                (Some(1), Some("Africa".to_string())),
                (Some(2), None),
                (Some(3), None)
            ]
        );
    }

    #[test]
    fn test_unknown_code_is_outside_every_continent() {
        let nocs = df!("code" => &["KEN", "EOR"], "continent" => &["Africa", "Other"]).unwrap();
        let df = df!("country_code" => &["KEN", "ZZZ"]).unwrap();
        let out = with_continent(&df, "country_code", &nocs).unwrap();
        let other = FilterSelection {
            continents: vec![codes::OTHER_CONTINENT.to_string()],
            ..FilterSelection::default()
        };
        assert_eq!(crate::filters::apply_filters(&out, &other).unwrap().height(), 0);
        let africa = FilterSelection {
            continents: vec!["Africa".into()],
            ..FilterSelection::default()
        };
        assert_eq!(crate::filters::apply_filters(&out, &africa).unwrap().height(), 1);
    }

    #[test]
    fn test_with_continent_without_nocs() {
        let df = df!("country_code" => &["KEN"]).unwrap();
        let out = with_continent(&df, "country_code", &DataFrame::empty()).unwrap();
        assert_eq!(frame::str_values(&out, "continent"), vec![None]);
    }
}
