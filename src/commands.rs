//! Terminal output for the non-GUI subcommands.

use crate::analysis::athletes::AthleteProfile;
use crate::analysis::daily::DayHighlights;
use crate::analysis::global::{self, GlobalKpis};
use crate::analysis::head_to_head::Comparison;
use crate::analysis::overview::{self, Kpis};
use crate::analysis::{medal_table, top_by_total, AnalysisError, CountryTally};
use crate::data::{DataStore, TableSummary};
use crate::filters::FilterSelection;
use serde::Serialize;
use std::fmt::Write;

/// What `podium summary` prints.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub filters: FilterSelection,
    pub kpis: Kpis,
    pub global: GlobalKpis,
    pub standings: Vec<CountryTally>,
}

impl Summary {
    pub fn collect(store: &DataStore, selection: &FilterSelection, top_n: usize) -> Result<Self, AnalysisError> {
        let rows = medal_table(store, selection);
        Ok(Self {
            filters: selection.clone(),
            kpis: overview::kpis(store, selection)?,
            global: global::kpis(&rows),
            standings: top_by_total(&rows, top_n),
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let k = &self.kpis;
        let _ = writeln!(out, "Paris 2024 Olympic Summer Games");
        let _ = writeln!(out, "{}\n", self.filters.summary());
        let _ = writeln!(out, "  Athletes:  {}", k.athletes);
        let _ = writeln!(out, "  Countries: {}", k.countries);
        let _ = writeln!(out, "  Sports:    {}", k.sports);
        let _ = writeln!(out, "  Medals:    {}", k.medals);
        let _ = writeln!(out, "  Events:    {}", k.events);
        if let Some((continent, gold)) = &self.global.top_gold_continent {
            let _ = writeln!(out, "  Top gold continent: {} ({})", continent, gold);
        }
        let _ = writeln!(out, "  Average medals per country: {:.1}\n", self.global.average_medals);

        out.push_str(&standings_table(&self.standings));
        out
    }
}

fn standings_table(rows: &[CountryTally]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<28} {:>5} {:>6} {:>6} {:>5}",
        "#", "Country", "Gold", "Silver", "Bronze", "Total"
    );
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<28} {:>5} {:>6} {:>6} {:>5}",
            i + 1,
            crate::analysis::truncate_label(&row.country, 28),
            row.medals.gold,
            row.medals.silver,
            row.medals.bronze,
            row.total()
        );
    }
    out
}

pub fn head_to_head_text(cmp: &Comparison) -> String {
    let mut out = String::new();
    let (a, b) = (&cmp.a, &cmp.b);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "", a.code, b.code);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Country", truncate(&a.name), truncate(&b.name));
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Gold", a.medals.gold, b.medals.gold);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Silver", a.medals.silver, b.medals.silver);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Bronze", a.medals.bronze, b.medals.bronze);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Total", a.total, b.total);
    let _ = writeln!(out, "{:<18} {:>14} {:>14}", "Athletes", a.athletes, b.athletes);

    let (total, gold, athletes) = cmp.deltas();
    let _ = writeln!(
        out,
        "\n{} vs {}: total {:+}, gold {:+}, athletes {:+}",
        b.code, a.code, total, gold, athletes
    );

    for side in [a, b] {
        if side.top_disciplines.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\nTop disciplines for {}:", side.name);
        for (discipline, count) in &side.top_disciplines {
            let _ = writeln!(out, "  {:<30} {}", discipline, count);
        }
    }
    out
}

fn truncate(name: &str) -> String {
    crate::analysis::truncate_label(name, 14)
}

pub fn daily_text(day: &DayHighlights) -> String {
    let mut out = String::new();
    let c = &day.counts;
    let _ = writeln!(out, "{}", day.day.format("%A, %B %d, %Y"));
    let _ = writeln!(
        out,
        "  Events: {}  Medal events: {}  Medals awarded: {}",
        c.events, c.medal_events, c.medals
    );

    if !day.top_countries.is_empty() {
        let _ = writeln!(out, "\nTop countries:");
        for (country, medals) in &day.top_countries {
            let _ = writeln!(out, "  {:<28} {}", country, medals);
        }
    }

    if !day.winners.is_empty() {
        let _ = writeln!(out, "\nMedal winners:");
        for w in &day.winners {
            let _ = writeln!(
                out,
                "  {:<6} {:<28} {:<20} {} - {}",
                w.medal.short(),
                w.name,
                w.country,
                w.discipline,
                w.event
            );
        }
    }

    if !day.schedule.is_empty() {
        let _ = writeln!(out, "\nSchedule:");
        for row in &day.schedule {
            let _ = writeln!(
                out,
                "  {:<5} {}{:<20} {:<40} {:<12} {}",
                row.time.as_deref().unwrap_or("--:--"),
                if row.medal_event { "* " } else { "  " },
                row.discipline,
                row.event,
                row.status,
                row.venue
            );
        }
    }
    out
}

pub fn athlete_text(p: &AthleteProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.name);
    let field = |out: &mut String, label: &str, value: Option<String>| {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<12} {}", label, value);
        }
    };
    field(&mut out, "Gender", p.gender.clone());
    field(
        &mut out,
        "Country",
        match (&p.country, &p.country_code) {
            (Some(name), Some(code)) => Some(format!("{} ({})", name, code)),
            (name, code) => name.clone().or_else(|| code.clone()),
        },
    );
    field(&mut out, "Continent", p.continent.clone());
    field(&mut out, "Born", p.birth_date.map(|d| d.format("%Y-%m-%d").to_string()));
    field(&mut out, "Height", p.height.filter(|h| *h > 0.0).map(|h| format!("{:.0} cm", h)));
    field(&mut out, "Weight", p.weight.filter(|w| *w > 0.0).map(|w| format!("{:.0} kg", w)));
    for (label, list) in [("Disciplines", &p.disciplines), ("Events", &p.events), ("Coaches", &p.coaches)] {
        if !list.is_empty() {
            let _ = writeln!(out, "  {:<12} {}", label, list.join(", "));
        }
    }
    out
}

pub fn tables_text(tables: &[TableSummary]) -> String {
    let mut out = String::new();
    for t in tables {
        let _ = writeln!(out, "{:<14} {:>7} rows  {:>3} columns", t.table.name(), t.rows, t.columns.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::analysis::{athletes, daily, head_to_head};
    use chrono::NaiveDate;

    #[test]
    fn test_summary_text() {
        let store = fixtures::store();
        let summary = Summary::collect(&store, &FilterSelection::default(), 2).unwrap();
        assert_eq!(summary.standings.len(), 2);
        let text = summary.to_text();
        assert!(text.contains("Medals:    6"));
        assert!(text.contains("France"));
        assert!(text.contains("China"));
        assert!(!text.contains("United States"));
    }

    #[test]
    fn test_head_to_head_text() {
        let store = fixtures::store();
        let cmp = head_to_head::compare(&store, "FRA", "CHN").unwrap();
        let text = head_to_head_text(&cmp);
        assert!(text.contains("total -1, gold -2, athletes -1"));
    }

    #[test]
    fn test_daily_text_marks_untimed_rows() {
        let store = fixtures::store();
        let day = NaiveDate::from_ymd_opt(2024, 8, 2).unwrap();
        let text = daily_text(&daily::highlights(&store, day, false).unwrap());
        assert!(text.contains("--:--"));
        assert!(text.contains("Medal winners:"));
    }

    #[test]
    fn test_athlete_text() {
        let store = fixtures::store();
        let profile = athletes::profile(&store, "LEDECKY Katie").unwrap();
        let text = athlete_text(&profile);
        assert!(text.contains("United States (USA)"));
        assert!(text.contains("HAWKE Anthony, SMITH Jane"));
    }

    #[test]
    fn test_tables_text() {
        let store = fixtures::store();
        let text = tables_text(&store.summary());
        assert_eq!(text.lines().count(), store.summary().len());
    }
}
