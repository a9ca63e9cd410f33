//! Turns analysis results into chart specs, one builder per dashboard chart.
//! The desktop pages and the report share these builders.

use super::layout::TreeNode;
use super::palette;
use super::spec::{BarMode, ChartSpec, MapCell, MapPoint, NamedChart, Orientation, PieSlice, Series, TimeBar};
use crate::analysis::athletes::{self, AgeSample, AgeView, GenderCount, GenderView, TopMedallist};
use crate::analysis::daily::{self, DayHighlights};
use crate::analysis::distribution::BoxSummary;
use crate::analysis::events::{self, SportMedals, Timeline, TimelineBy, VenuePoint};
use crate::analysis::global::{self, ChoroplethCell, ContinentTally, HierarchyRow};
use crate::analysis::head_to_head::Comparison;
use crate::analysis::{overview, AnalysisError, CountryTally};
use crate::data::{DataStore, MedalTally, MedalType};
use crate::filters::FilterSelection;
use std::collections::BTreeMap;
use tracing::debug;

/// Per-type medal series aligned with `tallies`.
fn medal_series<'a>(tallies: impl Iterator<Item = &'a MedalTally> + Clone) -> Vec<Series> {
    MedalType::ALL
        .iter()
        .map(|&medal| Series {
            name: medal.short().to_string(),
            colour: palette::medal_colour(medal),
            values: tallies.clone().map(|t| t.get(medal) as f64).collect(),
        })
        .collect()
}

pub fn medal_distribution(tally: &MedalTally) -> ChartSpec {
    ChartSpec::Pie {
        title: "Medal Distribution".into(),
        slices: tally
            .by_type()
            .into_iter()
            .map(|(medal, count)| PieSlice {
                label: medal.short().to_string(),
                value: count as f64,
                colour: palette::medal_colour(medal),
            })
            .collect(),
        hole: 0.4,
    }
}

/// Stacked medal bars per country, largest first.
pub fn top_countries(rows: &[CountryTally], orientation: Orientation) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Top {} Countries by Medals", rows.len()),
        categories: rows.iter().map(|r| r.country.clone()).collect(),
        series: medal_series(rows.iter().map(|r| &r.medals)),
        mode: BarMode::Stacked,
        orientation,
        value_label: "Medals".into(),
    }
}

pub fn world_map(cells: &[ChoroplethCell]) -> ChartSpec {
    ChartSpec::Choropleth {
        title: "Total Medals by Country".into(),
        cells: cells
            .iter()
            .filter(|c| c.value > 0)
            .map(|c| MapCell {
                iso3: c.iso3.clone(),
                value: c.value as f64,
            })
            .collect(),
    }
}

pub fn continent_medals(continents: &[ContinentTally]) -> ChartSpec {
    ChartSpec::Bar {
        title: "Medals by Continent".into(),
        categories: continents.iter().map(|c| c.continent.clone()).collect(),
        series: medal_series(continents.iter().map(|c| &c.medals)),
        mode: BarMode::Grouped,
        orientation: Orientation::Vertical,
        value_label: "Medals".into(),
    }
}

/// Continent > country > discipline tree of medal counts.
pub fn hierarchy_tree(rows: &[HierarchyRow]) -> Vec<TreeNode> {
    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<TreeNode>>> = BTreeMap::new();
    for row in rows {
        tree.entry(row.continent.as_str())
            .or_default()
            .entry(row.country.as_str())
            .or_default()
            .push(TreeNode::leaf(row.discipline.clone(), row.medal_count as f64));
    }
    tree.into_iter()
        .map(|(continent, countries)| {
            TreeNode::branch(
                continent,
                countries
                    .into_iter()
                    .map(|(country, disciplines)| TreeNode::branch(country, disciplines))
                    .collect(),
            )
        })
        .collect()
}

pub fn hierarchy_sunburst(rows: &[HierarchyRow]) -> ChartSpec {
    ChartSpec::Sunburst {
        title: "Medals: Continent > Country > Discipline".into(),
        nodes: hierarchy_tree(rows),
    }
}

pub fn hierarchy_treemap(rows: &[HierarchyRow]) -> ChartSpec {
    ChartSpec::Treemap {
        title: "Medal Hierarchy".into(),
        nodes: hierarchy_tree(rows),
    }
}

pub fn head_to_head(cmp: &Comparison) -> ChartSpec {
    ChartSpec::Bar {
        title: "Medal Count Comparison".into(),
        categories: vec![cmp.a.code.clone(), cmp.b.code.clone()],
        series: medal_series([&cmp.a.medals, &cmp.b.medals].into_iter()),
        mode: BarMode::Grouped,
        orientation: Orientation::Vertical,
        value_label: "Count".into(),
    }
}

pub fn age_boxes(boxes: Vec<BoxSummary>, view: AgeView) -> ChartSpec {
    let title = match view {
        AgeView::Overall => "Overall Age Distribution".to_string(),
        other => format!("Age Distribution by {}", other),
    };
    ChartSpec::BoxPlot {
        title,
        boxes,
        value_label: "Age (years)".into(),
    }
}

/// World view is a pie, the other views group bars by gender.
pub fn gender(counts: &[GenderCount], view: GenderView) -> ChartSpec {
    if view == GenderView::World {
        return ChartSpec::Pie {
            title: "Global Gender Distribution of Athletes".into(),
            slices: counts
                .iter()
                .map(|c| PieSlice {
                    label: c.gender.clone(),
                    value: c.count as f64,
                    colour: palette::gender_colour(&c.gender),
                })
                .collect(),
            hole: 0.0,
        };
    }

    let mut groups: Vec<String> = Vec::new();
    let mut genders: Vec<String> = Vec::new();
    for c in counts {
        if !groups.contains(&c.group) {
            groups.push(c.group.clone());
        }
        if !genders.contains(&c.gender) {
            genders.push(c.gender.clone());
        }
    }
    let series = genders
        .iter()
        .map(|g| Series {
            name: g.clone(),
            colour: palette::gender_colour(g),
            values: groups
                .iter()
                .map(|group| {
                    counts
                        .iter()
                        .find(|c| &c.group == group && &c.gender == g)
                        .map_or(0.0, |c| c.count as f64)
                })
                .collect(),
        })
        .collect();

    ChartSpec::Bar {
        title: format!("Gender Distribution {}", view),
        categories: groups,
        series,
        mode: BarMode::Grouped,
        orientation: Orientation::Vertical,
        value_label: "Number of Athletes".into(),
    }
}

pub fn top_medallists(top: &[TopMedallist]) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Top {} Athletes by Medal Count", top.len()),
        categories: top.iter().map(|t| t.name.clone()).collect(),
        series: medal_series(top.iter().map(|t| &t.medals)),
        mode: BarMode::Stacked,
        orientation: Orientation::Horizontal,
        value_label: "Number of Medals".into(),
    }
}

pub fn timeline(timeline: &Timeline, subject: &str) -> ChartSpec {
    match timeline {
        Timeline::Scheduled { entries, .. } => ChartSpec::Timeline {
            title: format!("Event Schedule for {}", subject),
            bars: entries
                .iter()
                .map(|e| TimeBar {
                    label: e.event.clone(),
                    // wall-clock time at the venue
                    start: e.start.naive_local().and_utc().timestamp() as f64,
                    end: e.end.naive_local().and_utc().timestamp() as f64,
                    group: e.group.clone(),
                })
                .collect(),
        },
        Timeline::Counts(counts) => ChartSpec::Bar {
            title: format!("Events in {}", subject),
            categories: counts.iter().map(|(event, _)| event.clone()).collect(),
            series: vec![Series {
                name: "Occurrences".into(),
                colour: palette::categorical(0),
                values: counts.iter().map(|(_, n)| *n as f64).collect(),
            }],
            mode: BarMode::Grouped,
            orientation: Orientation::Vertical,
            value_label: "Occurrences".into(),
        },
    }
}

pub fn sport_treemap(rows: &[SportMedals]) -> ChartSpec {
    ChartSpec::Treemap {
        title: "Medal Distribution Across Sports".into(),
        nodes: rows
            .iter()
            .map(|r| TreeNode::leaf(r.discipline.clone(), r.medals.total() as f64))
            .collect(),
    }
}

pub fn sport_stacked(rows: &[SportMedals]) -> ChartSpec {
    ChartSpec::Bar {
        title: "Medal Distribution Across All Disciplines".into(),
        categories: rows.iter().map(|r| r.discipline.clone()).collect(),
        series: medal_series(rows.iter().map(|r| &r.medals)),
        mode: BarMode::Stacked,
        orientation: Orientation::Vertical,
        value_label: "Number of Medals".into(),
    }
}

pub fn venue_map(title: &str, points: &[VenuePoint]) -> ChartSpec {
    ChartSpec::ScatterMap {
        title: title.to_string(),
        points: points
            .iter()
            .map(|p| MapPoint {
                label: p.venue.clone(),
                lat: p.lat,
                lon: p.lon,
                size: p.events as f64,
            })
            .collect(),
    }
}

/// Pie of the ten busiest venues.
pub fn venue_share(counts: &[(String, usize)]) -> ChartSpec {
    ChartSpec::Pie {
        title: "Top 10 Venues by Event Count".into(),
        slices: counts
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, (venue, n))| PieSlice {
                label: venue.clone(),
                value: *n as f64,
                colour: palette::categorical(i),
            })
            .collect(),
        hole: 0.0,
    }
}

pub fn daily_top_countries(day: &DayHighlights) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Top {} Countries by Medals Won on {}", day.top_countries.len(), day.day.format("%B %d, %Y")),
        categories: day.top_countries.iter().map(|(c, _)| c.clone()).collect(),
        series: vec![Series {
            name: "Medals".into(),
            colour: palette::viridis(0.6),
            values: day.top_countries.iter().map(|(_, n)| *n as f64).collect(),
        }],
        mode: BarMode::Grouped,
        orientation: Orientation::Horizontal,
        value_label: "Medals".into(),
    }
}

/// Limits for [`build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Countries in the overview standings.
    pub top_n: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

fn named(page: &str, name: &str, spec: ChartSpec) -> NamedChart {
    NamedChart {
        name: name.to_string(),
        page: page.to_string(),
        spec,
    }
}

/// Every chart of the dashboard under `selection`, with the default picks
/// the pages start from: the first discipline's schedule and the first day.
pub fn build(
    store: &DataStore,
    selection: &FilterSelection,
    options: &CatalogOptions,
) -> Result<Vec<NamedChart>, AnalysisError> {
    let mut charts = vec![
        named("Overview", "medal_distribution", medal_distribution(&overview::medal_distribution(store, selection))),
        named(
            "Overview",
            "top_countries",
            top_countries(&overview::top_standings(store, selection, options.top_n), Orientation::Vertical),
        ),
    ];

    let global = global::view(store, selection, 20)?;
    charts.push(named("Global Analysis", "world_map", world_map(&global.map)));
    charts.push(named("Global Analysis", "continent_medals", continent_medals(&global.continents)));
    charts.push(named("Global Analysis", "medal_hierarchy", hierarchy_sunburst(&global.hierarchy)));
    charts.push(named(
        "Global Analysis",
        "top_20_countries",
        top_countries(&global.top_countries, Orientation::Horizontal),
    ));

    let samples: Vec<AgeSample> = athletes::age_samples(store, selection);
    let age_view = if selection.sports.is_empty() { AgeView::Overall } else { AgeView::Sport };
    charts.push(named(
        "Athlete Performance",
        "age_distribution",
        age_boxes(athletes::age_distribution(&samples, age_view, &selection.sports), age_view),
    ));
    charts.push(named(
        "Athlete Performance",
        "gender_by_continent",
        gender(&athletes::gender_breakdown(&samples, GenderView::Continent), GenderView::Continent),
    ));
    charts.push(named(
        "Athlete Performance",
        "top_medallists",
        top_medallists(&athletes::top_medallists(store, athletes::TOP_MEDALLISTS)),
    ));

    if let Some(discipline) = events::timeline_options(store, TimelineBy::Discipline).first() {
        let schedule = events::timeline(store, TimelineBy::Discipline, discipline)?;
        charts.push(named("Sports & Events", "schedule", timeline(&schedule, discipline)));
    }
    let sports = events::sport_medals(store, selection)?;
    charts.push(named("Sports & Events", "sport_treemap", sport_treemap(&sports)));
    charts.push(named("Sports & Events", "sport_medals", sport_stacked(&sports)));
    charts.push(named(
        "Sports & Events",
        "venues",
        venue_map("Olympic Venues", &events::venue_points(store)),
    ));

    if let Some(&day) = daily::available_days(store).first() {
        let highlights = daily::highlights(store, day, false)?;
        charts.push(named("Daily Highlights", "daily_top_countries", daily_top_countries(&highlights)));
        charts.push(named(
            "Daily Highlights",
            "daily_venues",
            venue_map("Event Locations", &highlights.venues),
        ));
    }

    debug!("Built {} charts", charts.len());
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::analysis::head_to_head;

    #[test]
    fn test_build_names_are_unique() {
        let store = fixtures::store();
        let charts = build(&store, &FilterSelection::default(), &CatalogOptions::default()).unwrap();
        assert_eq!(charts.len(), 15);
        let mut names: Vec<&str> = charts.iter().map(|c| c.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), charts.len());
    }

    #[test]
    fn test_top_countries_series_match_totals() {
        let store = fixtures::store();
        let rows = overview::top_standings(&store, &FilterSelection::default(), 3);
        let ChartSpec::Bar { categories, series, .. } = top_countries(&rows, Orientation::Vertical) else {
            panic!("expected a bar chart");
        };
        assert_eq!(categories[0], "France");
        let france: f64 = series.iter().map(|s| s.values[0]).sum();
        assert_eq!(france, rows[0].total() as f64);
    }

    #[test]
    fn test_hierarchy_tree() {
        let store = fixtures::store();
        let rows = global::hierarchy(&store, &FilterSelection::default()).unwrap();
        let tree = hierarchy_tree(&rows);
        let europe = tree.iter().find(|n| n.label == "Europe").unwrap();
        assert_eq!(europe.weight(), 3.0);
        assert_eq!(europe.depth(), 3);
        assert_eq!(tree.iter().map(TreeNode::weight).sum::<f64>(), 6.0);
    }

    #[test]
    fn test_head_to_head_chart() {
        let store = fixtures::store();
        let cmp = head_to_head::compare(&store, "FRA", "CHN").unwrap();
        let ChartSpec::Bar { series, .. } = head_to_head(&cmp) else {
            panic!("expected a bar chart");
        };
        assert_eq!(series[0].values, vec![2.0, 0.0]);
    }

    #[test]
    fn test_gender_views() {
        let store = fixtures::store();
        let samples = athletes::age_samples(&store, &FilterSelection::default());
        let world = gender(&athletes::gender_breakdown(&samples, GenderView::World), GenderView::World);
        assert!(matches!(world, ChartSpec::Pie { .. }));
        let ChartSpec::Bar { categories, series, .. } =
            gender(&athletes::gender_breakdown(&samples, GenderView::Continent), GenderView::Continent)
        else {
            panic!("expected a bar chart");
        };
        assert_eq!(categories.len(), 3);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_world_map_skips_empty_countries() {
        let store = fixtures::store();
        let cells = global::choropleth(&store, &FilterSelection::default());
        let ChartSpec::Choropleth { cells, .. } = world_map(&cells) else {
            panic!("expected a choropleth");
        };
        assert_eq!(cells.len(), 3);
    }
}
