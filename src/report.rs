//! Static report export.
//! Renders every dashboard chart to PNG and writes `summary.json` and
//! `index.html` next to them, optionally bundled into `report.zip`.

use crate::analysis::athletes::{self, AthleteKpis};
use crate::analysis::events::{self, EventKpis};
use crate::analysis::global::{self, GlobalKpis};
use crate::analysis::overview::{self, Kpis};
use crate::analysis::CountryTally;
use crate::charts::catalog::{self, CatalogOptions};
use crate::charts::{render_png, NamedChart};
use crate::data::{codes, DataStore};
use crate::filters::FilterSelection;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::ZipWriter;

pub const INDEX_FILE: &str = "index.html";
pub const SUMMARY_FILE: &str = "summary.json";
pub const ARCHIVE_FILE: &str = "report.zip";

/// How the report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub width: u32,
    pub height: u32,
    pub top_n: usize,
    pub archive: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            top_n: 10,
            archive: false,
        }
    }
}

/// A chart image listed in the summary.
#[derive(Debug, Clone, Serialize)]
pub struct ChartEntry {
    pub name: String,
    pub page: String,
    pub title: String,
    pub file: String,
}

/// Everything `summary.json` holds.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub data_dir: PathBuf,
    pub filters: FilterSelection,
    pub overview: Kpis,
    pub global: GlobalKpis,
    pub athletes: AthleteKpis,
    pub events: EventKpis,
    pub standings: Vec<CountryTally>,
    pub charts: Vec<ChartEntry>,
    /// Charts whose rendering failed, by name.
    pub skipped: Vec<String>,
}

/// What [`write_report`] produced.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub archive: Option<PathBuf>,
    pub summary: ReportSummary,
}

/// Render all charts in parallel. Failed charts are logged and left out.
fn render_all(charts: &[NamedChart], width: u32, height: u32) -> Vec<(&NamedChart, Option<Vec<u8>>)> {
    charts
        .par_iter()
        .map(|chart| match render_png(&chart.spec, width, height) {
            Ok(png) => (chart, Some(png)),
            Err(e) => {
                warn!("Skipping chart '{}': {}", chart.name, e);
                (chart, None)
            }
        })
        .collect()
}

fn collect_summary(
    store: &DataStore,
    selection: &FilterSelection,
    settings: &ReportSettings,
) -> Result<ReportSummary> {
    let rows = crate::analysis::medal_table(store, selection);
    let samples = athletes::age_samples(store, selection);
    let top = athletes::top_medallists(store, athletes::TOP_MEDALLISTS);
    let sports = events::sport_medals(store, selection).context("Failed to count medals per discipline")?;

    Ok(ReportSummary {
        generated_at: Utc::now(),
        data_dir: store.dir().to_path_buf(),
        filters: selection.clone(),
        overview: overview::kpis(store, selection).context("Failed to compute overview KPIs")?,
        global: global::kpis(&rows),
        athletes: athletes::kpis(&samples, &top),
        events: events::kpis(store, &sports),
        standings: crate::analysis::top_by_total(&rows, settings.top_n),
        charts: Vec::new(),
        skipped: Vec::new(),
    })
}

/// Write the full report into `out_dir`, creating it when needed.
pub fn write_report(
    store: &DataStore,
    selection: &FilterSelection,
    settings: &ReportSettings,
    out_dir: &Path,
) -> Result<ReportOutput> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let charts = catalog::build(
        store,
        selection,
        &CatalogOptions {
            top_n: settings.top_n,
        },
    )
    .context("Failed to build charts")?;
    info!("Rendering {} charts at {}x{}", charts.len(), settings.width, settings.height);

    let mut summary = collect_summary(store, selection, settings)?;
    let mut files = Vec::new();
    for (chart, png) in render_all(&charts, settings.width, settings.height) {
        let Some(png) = png else {
            summary.skipped.push(chart.name.clone());
            continue;
        };
        let file = format!("{}.png", chart.name);
        let path = out_dir.join(&file);
        fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
        summary.charts.push(ChartEntry {
            name: chart.name.clone(),
            page: chart.page.clone(),
            title: chart.spec.title().to_string(),
            file: file.clone(),
        });
        files.push(file);
    }

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    fs::write(out_dir.join(SUMMARY_FILE), json).context("Failed to write summary.json")?;
    files.push(SUMMARY_FILE.to_string());

    let index = out_dir.join(INDEX_FILE);
    fs::write(&index, index_html(&summary)).context("Failed to write index.html")?;
    files.push(INDEX_FILE.to_string());

    let archive = if settings.archive {
        let path = out_dir.join(ARCHIVE_FILE);
        archive_files(out_dir, &files, &path)?;
        Some(path)
    } else {
        None
    };

    info!(
        "Report written to {} ({} charts, {} skipped)",
        out_dir.display(),
        summary.charts.len(),
        summary.skipped.len()
    );
    Ok(ReportOutput {
        dir: out_dir.to_path_buf(),
        index,
        archive,
        summary,
    })
}

/// Bundle `files` from `dir` into a ZIP at `target`.
pub fn archive_files(dir: &Path, files: &[String], target: &Path) -> Result<()> {
    let file = File::create(target).with_context(|| format!("Failed to create {}", target.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    for name in files {
        let bytes = fs::read(dir.join(name)).with_context(|| format!("Failed to read {}", name))?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&bytes)?;
    }
    zip.finish()?;
    debug!("Archived {} files into {}", files.len(), target.display());
    Ok(())
}

/// Open the report in the system's default browser.
pub fn open_index(index: &Path) -> Result<()> {
    open::that(index).with_context(|| format!("Failed to open {}", index.display()))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn kpi(label: &str, value: impl std::fmt::Display) -> String {
    format!(
        "<div class=\"kpi\"><div class=\"value\">{}</div><div class=\"label\">{}</div></div>\n",
        escape(&value.to_string()),
        escape(label)
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#fafafa;color:#222}\
h1{margin-bottom:0}.kpis{display:flex;flex-wrap:wrap;gap:1em;margin:1em 0}\
.kpi{background:#fff;border:1px solid #ddd;border-radius:6px;padding:.8em 1.2em;min-width:9em}\
.kpi .value{font-size:1.6em;font-weight:bold}.kpi .label{color:#666}\
table{border-collapse:collapse;background:#fff}td,th{border:1px solid #ddd;padding:.3em .8em;text-align:right}\
td:nth-child(2),th:nth-child(2){text-align:left}img.chart{max-width:100%;border:1px solid #ddd;margin:.5em 0}\
img.flag{vertical-align:middle;margin-right:.4em}";

/// The report's HTML page.
pub fn index_html(summary: &ReportSummary) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Paris 2024 Olympic Summer Games</title>\n");
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
    html.push_str("<h1>Paris 2024 Olympic Summer Games</h1>\n");
    html.push_str(&format!(
        "<p>Generated {} &middot; {}</p>\n",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC"),
        escape(&summary.filters.summary())
    ));

    let o = &summary.overview;
    html.push_str("<div class=\"kpis\">\n");
    html.push_str(&kpi("Athletes", o.athletes));
    html.push_str(&kpi("Countries", o.countries));
    html.push_str(&kpi("Sports", o.sports));
    html.push_str(&kpi("Medals", o.medals));
    html.push_str(&kpi("Events", o.events));
    if let Some((continent, gold)) = &summary.global.top_gold_continent {
        html.push_str(&kpi("Top gold continent", format!("{} ({})", continent, gold)));
    }
    if let Some(age) = summary.athletes.average_age {
        html.push_str(&kpi("Average age", format!("{:.1}", age)));
    }
    if let Some((name, medals)) = &summary.athletes.most_decorated {
        html.push_str(&kpi("Most decorated", format!("{} ({})", name, medals)));
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Medal Standings</h2>\n<table>\n");
    html.push_str("<tr><th>#</th><th>Country</th><th>Gold</th><th>Silver</th><th>Bronze</th><th>Total</th></tr>\n");
    for (i, row) in summary.standings.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td><img class=\"flag\" src=\"{}\" alt=\"\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            codes::flag_url(&row.code, 20),
            escape(&row.country),
            row.medals.gold,
            row.medals.silver,
            row.medals.bronze,
            row.total()
        ));
    }
    html.push_str("</table>\n");

    let mut page = "";
    for chart in &summary.charts {
        if chart.page.as_str() != page {
            page = chart.page.as_str();
            html.push_str(&format!("<h2>{}</h2>\n", escape(page)));
        }
        html.push_str(&format!(
            "<img class=\"chart\" src=\"{}\" alt=\"{}\">\n",
            escape(&chart.file),
            escape(&chart.title)
        ));
    }
    if !summary.skipped.is_empty() {
        html.push_str(&format!(
            "<p>Not rendered: {}</p>\n",
            escape(&summary.skipped.join(", "))
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(escape("Côte d'Ivoire"), "Côte d&#39;Ivoire");
    }

    #[test]
    fn test_write_report_with_archive() {
        let store = fixtures::store();
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings {
            width: 400,
            height: 300,
            top_n: 3,
            archive: true,
        };

        let out = write_report(&store, &FilterSelection::default(), &settings, dir.path()).unwrap();

        assert!(out.index.exists());
        assert!(dir.path().join(SUMMARY_FILE).exists());
        assert_eq!(out.summary.charts.len() + out.summary.skipped.len(), 15);
        assert_eq!(out.summary.standings.len(), 3);
        assert_eq!(out.summary.standings[0].code, "FRA");
        for chart in &out.summary.charts {
            assert!(dir.path().join(&chart.file).exists());
        }

        let archive = out.archive.unwrap();
        let reader = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        assert_eq!(reader.len(), out.summary.charts.len() + 2);
    }

    #[test]
    fn test_summary_json_shape() {
        let store = fixtures::store();
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings {
            width: 200,
            height: 150,
            ..ReportSettings::default()
        };
        write_report(&store, &FilterSelection::default(), &settings, dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["overview"]["medals"], 6);
        assert!(json["charts"].is_array());
        assert!(!dir.path().join(ARCHIVE_FILE).exists());
    }

    #[test]
    fn test_index_lists_flags_and_pages() {
        let store = fixtures::store();
        let mut summary = collect_summary(&store, &FilterSelection::default(), &ReportSettings::default()).unwrap();
        summary.charts.push(ChartEntry {
            name: "world_map".into(),
            page: "Global Analysis".into(),
            title: "Total Medals by Country".into(),
            file: "world_map.png".into(),
        });
        let html = index_html(&summary);
        assert!(html.contains("https://flagcdn.com/w20/fr.png"));
        assert!(html.contains("<h2>Global Analysis</h2>"));
        assert!(html.contains("world_map.png"));
    }
}
