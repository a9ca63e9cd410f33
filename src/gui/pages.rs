//! Dashboard pages.
//! Each page's content is computed once per filter or choice change and
//! drawn from the cached result.

use crate::analysis::athletes::{self, AgeView, GenderView};
use crate::analysis::events::{self, Timeline, TimelineBy};
use crate::analysis::head_to_head::{self, CountrySide};
use crate::analysis::{daily, global, overview, truncate_label, AnalysisError};
use crate::charts::catalog;
use crate::charts::interactive;
use crate::charts::spec::Orientation;
use crate::charts::ChartSpec;
use crate::commands;
use crate::data::DataStore;
use crate::filters::FilterSelection;
use chrono::NaiveDate;
use egui::{Color32, ComboBox, Grid, RichText, ScrollArea};
use tracing::debug;

const CHART_HEIGHT: f32 = 340.0;
const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Global,
    Athletes,
    HeadToHead,
    Events,
    Daily,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Overview,
        Page::Global,
        Page::Athletes,
        Page::HeadToHead,
        Page::Events,
        Page::Daily,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Global => "Global Analysis",
            Page::Athletes => "Athlete Performance",
            Page::HeadToHead => "Head to Head",
            Page::Events => "Sports & Events",
            Page::Daily => "Daily Highlights",
        }
    }
}

/// Choices made on individual pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageState {
    pub age_view: AgeView,
    pub gender_view: GenderView,
    pub athlete: Option<String>,
    pub country_a: String,
    pub country_b: String,
    pub timeline_by: TimelineBy,
    pub timeline_value: Option<String>,
    pub day: Option<NaiveDate>,
    pub medal_events_only: bool,
}

impl PageState {
    /// Defaults that depend on the loaded data: the first two country codes
    /// in sorted order.
    pub fn for_store(store: &DataStore) -> Self {
        let countries = head_to_head::available_countries(store);
        Self {
            country_a: countries.first().cloned().unwrap_or_default(),
            country_b: countries.get(1).cloned().unwrap_or_default(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

fn kpi(label: &str, value: impl ToString) -> Kpi {
    Kpi {
        label: label.to_string(),
        value: value.to_string(),
        delta: None,
    }
}

/// A titled table of text cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    fn new(title: &str, header: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Everything one page shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageContent {
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
    pub sections: Vec<Section>,
    pub notes: Vec<String>,
}

pub fn build(
    store: &DataStore,
    selection: &FilterSelection,
    page: Page,
    state: &PageState,
) -> Result<PageContent, AnalysisError> {
    debug!("Building page {}", page.label());
    match page {
        Page::Overview => build_overview(store, selection),
        Page::Global => build_global(store, selection),
        Page::Athletes => build_athletes(store, selection, state),
        Page::HeadToHead => build_head_to_head(store, state),
        Page::Events => build_events(store, selection, state),
        Page::Daily => build_daily(store, state),
    }
}

fn build_overview(store: &DataStore, selection: &FilterSelection) -> Result<PageContent, AnalysisError> {
    let k = overview::kpis(store, selection)?;
    let standings = overview::top_standings(store, selection, TOP_N);

    let mut table = Section::new("Medal Standings", &["#", "Country", "Gold", "Silver", "Bronze", "Total"]);
    for (i, row) in standings.iter().enumerate() {
        table.rows.push(vec![
            (i + 1).to_string(),
            row.country.clone(),
            row.medals.gold.to_string(),
            row.medals.silver.to_string(),
            row.medals.bronze.to_string(),
            row.total().to_string(),
        ]);
    }

    Ok(PageContent {
        kpis: vec![
            kpi("Athletes", k.athletes),
            kpi("Countries", k.countries),
            kpi("Sports", k.sports),
            kpi("Medals", k.medals),
            kpi("Events", k.events),
        ],
        charts: vec![
            catalog::medal_distribution(&overview::medal_distribution(store, selection)),
            catalog::top_countries(&standings, Orientation::Vertical),
        ],
        sections: vec![table],
        notes: Vec::new(),
    })
}

fn build_global(store: &DataStore, selection: &FilterSelection) -> Result<PageContent, AnalysisError> {
    let view = global::view(store, selection, 20)?;
    let k = &view.kpis;
    let mut kpis = Vec::new();
    if let Some((continent, gold)) = &k.top_gold_continent {
        kpis.push(kpi("Top continent by gold", format!("{} ({})", continent, gold)));
    }
    kpis.push(kpi(
        "Continents with gold",
        format!("{} / {}", k.continents_with_medals, global::continent_count()),
    ));
    kpis.push(kpi("Countries with gold", k.countries_with_gold));
    kpis.push(kpi("Average medals per country", format!("{:.1}", k.average_medals)));

    Ok(PageContent {
        kpis,
        charts: vec![
            catalog::world_map(&view.map),
            catalog::continent_medals(&view.continents),
            catalog::hierarchy_sunburst(&view.hierarchy),
            catalog::hierarchy_treemap(&view.hierarchy),
            catalog::top_countries(&view.top_countries, Orientation::Horizontal),
        ],
        sections: Vec::new(),
        notes: Vec::new(),
    })
}

fn build_athletes(
    store: &DataStore,
    selection: &FilterSelection,
    state: &PageState,
) -> Result<PageContent, AnalysisError> {
    let samples = athletes::age_samples(store, selection);
    let top = athletes::top_medallists(store, athletes::TOP_MEDALLISTS);
    let k = athletes::kpis(&samples, &top);

    let mut kpis = vec![
        kpi(
            "Average age",
            k.average_age.map_or_else(|| "n/a".to_string(), |a| format!("{:.1}", a)),
        ),
        kpi("Female athletes", k.female),
        kpi("Male athletes", k.male),
        kpi("Female per 100 male", format!("{:.1}", k.female_ratio)),
    ];
    if let Some((name, medals)) = &k.most_decorated {
        kpis.push(kpi("Most decorated", format!("{} ({})", name, medals)));
    }

    let mut notes = Vec::new();
    if state.age_view == AgeView::Sport && selection.sports.is_empty() {
        notes.push("Select sports in the filter panel to compare ages by sport.".to_string());
    }

    let mut sections = Vec::new();
    if let Some(name) = &state.athlete {
        let profile = athletes::profile(store, name)?;
        let mut section = Section::new("Athlete Profile", &[]);
        section.rows = commands::athlete_text(&profile)
            .lines()
            .map(|line| vec![line.trim().to_string()])
            .collect();
        sections.push(section);
    }

    Ok(PageContent {
        kpis,
        charts: vec![
            catalog::age_boxes(
                athletes::age_distribution(&samples, state.age_view, &selection.sports),
                state.age_view,
            ),
            catalog::gender(&athletes::gender_breakdown(&samples, state.gender_view), state.gender_view),
            catalog::top_medallists(&top),
        ],
        sections,
        notes,
    })
}

fn side_section(side: &CountrySide) -> Section {
    let mut section = Section::new(&format!("Top disciplines: {}", side.name), &["Discipline", "Medals"]);
    section.rows = side
        .top_disciplines
        .iter()
        .map(|(d, n)| vec![d.clone(), n.to_string()])
        .collect();
    section
}

fn build_head_to_head(store: &DataStore, state: &PageState) -> Result<PageContent, AnalysisError> {
    let cmp = match head_to_head::compare(store, &state.country_a, &state.country_b) {
        Ok(cmp) => cmp,
        Err(AnalysisError::SameCountry) => {
            return Ok(PageContent {
                notes: vec!["Please select two different countries to compare.".to_string()],
                ..PageContent::default()
            })
        }
        Err(e) => return Err(e),
    };

    let (total, gold, athletes) = cmp.deltas();
    let with_delta = |label: &str, a: i64, b: i64, delta: i64| Kpi {
        label: label.to_string(),
        value: format!("{} / {}", a, b),
        delta: Some(format!("{:+}", delta)),
    };

    Ok(PageContent {
        kpis: vec![
            with_delta("Total medals", cmp.a.total, cmp.b.total, total),
            with_delta("Gold medals", cmp.a.medals.gold, cmp.b.medals.gold, gold),
            with_delta("Athletes", cmp.a.athletes as i64, cmp.b.athletes as i64, athletes),
        ],
        charts: vec![catalog::head_to_head(&cmp)],
        sections: vec![side_section(&cmp.a), side_section(&cmp.b)],
        notes: Vec::new(),
    })
}

fn build_events(
    store: &DataStore,
    selection: &FilterSelection,
    state: &PageState,
) -> Result<PageContent, AnalysisError> {
    let sports = events::sport_medals(store, selection)?;
    let k = events::kpis(store, &sports);

    let mut kpis = vec![kpi("Disciplines", k.disciplines), kpi("Events", k.events), kpi("Venues", k.venues)];
    if let Some((discipline, medals)) = &k.top_discipline {
        kpis.push(kpi("Top discipline", format!("{} ({})", discipline, medals)));
    }
    if let Some((venue, sessions)) = &k.busiest_venue {
        kpis.push(kpi("Busiest venue", format!("{} ({})", venue, sessions)));
    }

    let mut charts = Vec::new();
    let mut notes = Vec::new();
    let options = events::timeline_options(store, state.timeline_by);
    let value = state.timeline_value.clone().or_else(|| options.first().cloned());
    if let Some(value) = value {
        let timeline = events::timeline(store, state.timeline_by, &value)?;
        if let Timeline::Scheduled { entries, total } = &timeline {
            if *total > entries.len() {
                notes.push(format!("Showing the first {} of {} sessions.", entries.len(), total));
            }
        }
        charts.push(catalog::timeline(&timeline, &value));
    }
    charts.push(catalog::sport_treemap(&sports));
    charts.push(catalog::sport_stacked(&sports));
    charts.push(catalog::venue_map("Olympic Venues", &events::venue_points(store)));
    charts.push(catalog::venue_share(&events::venue_event_counts(store)));

    Ok(PageContent {
        kpis,
        charts,
        sections: Vec::new(),
        notes,
    })
}

fn build_daily(store: &DataStore, state: &PageState) -> Result<PageContent, AnalysisError> {
    let Some(day) = state.day.or_else(|| daily::available_days(store).first().copied()) else {
        return Ok(PageContent {
            notes: vec!["The schedule has no dated sessions.".to_string()],
            ..PageContent::default()
        });
    };
    let h = daily::highlights(store, day, state.medal_events_only)?;

    let mut winners = Section::new("Medal Winners", &["Medal", "Name", "Country", "Discipline", "Event"]);
    winners.rows = h
        .winners
        .iter()
        .map(|w| {
            vec![
                w.medal.short().to_string(),
                w.name.clone(),
                w.country.clone(),
                w.discipline.clone(),
                truncate_label(&w.event, 40),
            ]
        })
        .collect();

    let mut schedule = Section::new("Schedule", &["Time", "Discipline", "Event", "Status", "Venue"]);
    schedule.rows = h
        .schedule
        .iter()
        .map(|r| {
            vec![
                r.time.clone().unwrap_or_else(|| "--:--".to_string()),
                r.discipline.clone(),
                format!("{}{}", if r.medal_event { "* " } else { "" }, truncate_label(&r.event, 40)),
                r.status.clone(),
                r.venue.clone(),
            ]
        })
        .collect();

    Ok(PageContent {
        kpis: vec![
            kpi("Events", h.counts.events),
            kpi("Medal events", h.counts.medal_events),
            kpi("Medals awarded", h.counts.medals),
        ],
        charts: vec![
            catalog::daily_top_countries(&h),
            catalog::venue_map("Event Locations", &h.venues),
        ],
        sections: vec![winners, schedule],
        notes: Vec::new(),
    })
}

/// Page tabs, page controls and the cached content.
#[derive(Default)]
pub struct PageViewer {
    pub page: Page,
    pub state: PageState,
    content: Option<Result<PageContent, String>>,
    athlete_names: Vec<String>,
    countries: Vec<String>,
    days: Vec<NaiveDate>,
}

impl PageViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset page choices for newly loaded data.
    pub fn set_store(&mut self, store: &DataStore) {
        self.state = PageState::for_store(store);
        self.athlete_names = athletes::athlete_names(store);
        self.countries = head_to_head::available_countries(store);
        self.days = daily::available_days(store);
        self.invalidate();
    }

    /// Drop the cached content so the next frame recomputes it.
    pub fn invalidate(&mut self) {
        self.content = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, store: Option<&DataStore>, selection: &FilterSelection) {
        ui.horizontal(|ui| {
            for page in Page::ALL {
                if ui.selectable_label(self.page == page, page.label()).clicked() && self.page != page {
                    self.page = page;
                    self.invalidate();
                }
            }
        });
        ui.separator();

        let Some(store) = store else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        if self.controls(ui, store) {
            self.invalidate();
        }

        if self.content.is_none() {
            self.content = Some(build(store, selection, self.page, &self.state).map_err(|e| e.to_string()));
        }

        let page = self.page;
        match &self.content {
            Some(Ok(content)) => draw_content(ui, page, content),
            Some(Err(e)) => {
                ui.label(RichText::new(format!("Error: {}", e)).color(Color32::from_rgb(220, 53, 69)));
            }
            None => {}
        }
    }

    /// Page-specific pickers. Returns true when a choice changed.
    fn controls(&mut self, ui: &mut egui::Ui, store: &DataStore) -> bool {
        let mut changed = false;
        let state = &mut self.state;
        match self.page {
            Page::Athletes => {
                ui.horizontal(|ui| {
                    ui.label("Age distribution:");
                    for view in [AgeView::Overall, AgeView::Gender, AgeView::Sport] {
                        changed |= ui.radio_value(&mut state.age_view, view, view.to_string()).changed();
                    }
                    ui.add_space(20.0);
                    ui.label("Gender breakdown:");
                    for view in [GenderView::World, GenderView::Continent, GenderView::Country] {
                        changed |= ui.radio_value(&mut state.gender_view, view, view.to_string()).changed();
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Athlete profile:");
                    changed |= picker(ui, "athlete", &mut state.athlete, &self.athlete_names);
                });
            }
            Page::HeadToHead => {
                ui.horizontal(|ui| {
                    let mut a = Some(state.country_a.clone());
                    let mut b = Some(state.country_b.clone());
                    ui.label("Country A:");
                    if picker(ui, "country_a", &mut a, &self.countries) {
                        state.country_a = a.unwrap_or_default();
                        changed = true;
                    }
                    ui.label("Country B:");
                    if picker(ui, "country_b", &mut b, &self.countries) {
                        state.country_b = b.unwrap_or_default();
                        changed = true;
                    }
                });
            }
            Page::Events => {
                ui.horizontal(|ui| {
                    ui.label("Timeline by:");
                    for by in [TimelineBy::Discipline, TimelineBy::Venue] {
                        if ui.radio_value(&mut state.timeline_by, by, by.to_string()).changed() {
                            state.timeline_value = None;
                            changed = true;
                        }
                    }
                    let options = events::timeline_options(store, state.timeline_by);
                    changed |= picker(ui, "timeline_value", &mut state.timeline_value, &options);
                });
            }
            Page::Daily => {
                ui.horizontal(|ui| {
                    ui.label("Day:");
                    let current = state.day.or_else(|| self.days.first().copied());
                    ComboBox::from_id_salt("day")
                        .selected_text(current.map(|d| d.format("%A, %B %d").to_string()).unwrap_or_default())
                        .show_ui(ui, |ui| {
                            for day in &self.days {
                                if ui
                                    .selectable_label(current == Some(*day), day.format("%A, %B %d").to_string())
                                    .clicked()
                                {
                                    state.day = Some(*day);
                                    changed = true;
                                }
                            }
                        });
                    changed |= ui.checkbox(&mut state.medal_events_only, "Medal events only").changed();
                });
            }
            Page::Overview | Page::Global => {}
        }
        if changed {
            debug!("Page choices changed: {:?}", self.state);
        }
        changed
    }
}

/// Combo box over `options`. Returns true when the selection changed.
fn picker(ui: &mut egui::Ui, id: &str, selected: &mut Option<String>, options: &[String]) -> bool {
    let mut changed = false;
    ComboBox::from_id_salt(id)
        .width(220.0)
        .selected_text(selected.as_deref().map(|s| truncate_label(s, 28)).unwrap_or_default())
        .show_ui(ui, |ui| {
            ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for option in options {
                    if ui.selectable_label(selected.as_deref() == Some(option), option).clicked() {
                        *selected = Some(option.clone());
                        changed = true;
                    }
                }
            });
        });
    changed
}

fn draw_content(ui: &mut egui::Ui, page: Page, content: &PageContent) {
    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for k in &content.kpis {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&k.value).size(20.0).strong());
                            ui.label(RichText::new(&k.label).size(11.0).color(Color32::GRAY));
                            if let Some(delta) = &k.delta {
                                let colour = if delta.starts_with('-') {
                                    Color32::from_rgb(220, 53, 69)
                                } else {
                                    Color32::from_rgb(40, 167, 69)
                                };
                                ui.label(RichText::new(delta).size(11.0).color(colour));
                            }
                        });
                    });
            }
        });

        for note in &content.notes {
            ui.label(RichText::new(note).italics().color(Color32::from_rgb(243, 156, 18)));
        }
        ui.add_space(10.0);

        let columns = if ui.available_width() > 1100.0 { 2 } else { 1 };
        for (row, pair) in content.charts.chunks(columns).enumerate() {
            ui.columns(columns, |cols| {
                for (i, spec) in pair.iter().enumerate() {
                    let id = format!("{}_{}_{}", page.label(), row, i);
                    interactive::show(&mut cols[i], &id, spec, CHART_HEIGHT);
                }
            });
            ui.add_space(15.0);
        }

        for section in &content.sections {
            ui.label(RichText::new(&section.title).size(15.0).strong());
            Grid::new(format!("{}_{}", page.label(), section.title))
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    if !section.header.is_empty() {
                        for h in &section.header {
                            ui.label(RichText::new(h).strong());
                        }
                        ui.end_row();
                    }
                    for row in &section.rows {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
            ui.add_space(15.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    #[test]
    fn test_every_page_builds() {
        let store = fixtures::store();
        let state = PageState::for_store(&store);
        for page in Page::ALL {
            let content = build(&store, &FilterSelection::default(), page, &state).unwrap();
            assert!(!content.kpis.is_empty() || !content.notes.is_empty(), "{}", page.label());
        }
    }

    #[test]
    fn test_default_countries() {
        let store = fixtures::store();
        let state = PageState::for_store(&store);
        assert_eq!(state.country_a, "CHN");
        assert_eq!(state.country_b, "EOR");

        let empty = DataStore::from_frames(Vec::new()).unwrap();
        let state = PageState::for_store(&empty);
        assert!(state.country_a.is_empty() && state.country_b.is_empty());
    }

    #[test]
    fn test_same_country_shows_note() {
        let store = fixtures::store();
        let state = PageState {
            country_a: "FRA".into(),
            country_b: "FRA".into(),
            ..PageState::default()
        };
        let content = build(&store, &FilterSelection::default(), Page::HeadToHead, &state).unwrap();
        assert!(content.charts.is_empty());
        assert_eq!(content.notes.len(), 1);
    }

    #[test]
    fn test_head_to_head_deltas() {
        let store = fixtures::store();
        let state = PageState {
            country_a: "FRA".into(),
            country_b: "CHN".into(),
            ..PageState::default()
        };
        let content = build(&store, &FilterSelection::default(), Page::HeadToHead, &state).unwrap();
        assert_eq!(content.kpis[0].value, "3 / 2");
        assert_eq!(content.kpis[0].delta.as_deref(), Some("-1"));
    }

    #[test]
    fn test_daily_defaults_to_first_day() {
        let store = fixtures::store();
        let content = build(&store, &FilterSelection::default(), Page::Daily, &PageState::default()).unwrap();
        assert_eq!(content.kpis[2].value, "3");
        assert_eq!(content.sections[0].rows[0][0], "Gold");
    }

    #[test]
    fn test_athlete_profile_section() {
        let store = fixtures::store();
        let state = PageState {
            athlete: Some("RINER Teddy".into()),
            ..PageState::default()
        };
        let content = build(&store, &FilterSelection::default(), Page::Athletes, &state).unwrap();
        assert_eq!(content.sections.len(), 1);
        assert_eq!(content.sections[0].rows[0][0], "RINER Teddy");
    }
}
