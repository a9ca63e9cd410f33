//! Chart descriptions, independent of how they are drawn.

use super::layout::TreeNode;
use super::palette::Colour;
use crate::analysis::distribution::BoxSummary;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BarMode {
    #[default]
    Grouped,
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// One named run of values, aligned with the chart's categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub colour: Colour,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub colour: Colour,
}

/// A horizontal bar on a time axis. Times are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBar {
    pub label: String,
    pub start: f64,
    pub end: f64,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub size: f64,
}

/// A region of the tile choropleth: ISO3 code and value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCell {
    pub iso3: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar {
        title: String,
        categories: Vec<String>,
        series: Vec<Series>,
        mode: BarMode,
        orientation: Orientation,
        value_label: String,
    },
    Pie {
        title: String,
        slices: Vec<PieSlice>,
        /// Inner radius as a fraction of the outer one; zero for a full pie.
        hole: f64,
    },
    Treemap {
        title: String,
        nodes: Vec<TreeNode>,
    },
    Sunburst {
        title: String,
        nodes: Vec<TreeNode>,
    },
    Timeline {
        title: String,
        bars: Vec<TimeBar>,
    },
    ScatterMap {
        title: String,
        points: Vec<MapPoint>,
    },
    Choropleth {
        title: String,
        cells: Vec<MapCell>,
    },
    BoxPlot {
        title: String,
        boxes: Vec<BoxSummary>,
        value_label: String,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar { title, .. }
            | ChartSpec::Pie { title, .. }
            | ChartSpec::Treemap { title, .. }
            | ChartSpec::Sunburst { title, .. }
            | ChartSpec::Timeline { title, .. }
            | ChartSpec::ScatterMap { title, .. }
            | ChartSpec::Choropleth { title, .. }
            | ChartSpec::BoxPlot { title, .. } => title,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Bar { categories, series, .. } => categories.is_empty() || series.is_empty(),
            ChartSpec::Pie { slices, .. } => slices.iter().all(|s| s.value <= 0.0),
            ChartSpec::Treemap { nodes, .. } | ChartSpec::Sunburst { nodes, .. } => {
                nodes.iter().all(|n| n.weight() <= 0.0)
            }
            ChartSpec::Timeline { bars, .. } => bars.is_empty(),
            ChartSpec::ScatterMap { points, .. } => points.is_empty(),
            ChartSpec::Choropleth { cells, .. } => cells.is_empty(),
            ChartSpec::BoxPlot { boxes, .. } => boxes.is_empty(),
        }
    }

    /// Largest bar extent: the stacked sum or the single largest value.
    pub(crate) fn bar_max(categories: usize, series: &[Series], mode: BarMode) -> f64 {
        (0..categories)
            .map(|i| {
                let values = series.iter().map(|s| s.values.get(i).copied().unwrap_or(0.0));
                match mode {
                    BarMode::Stacked => values.filter(|v| *v > 0.0).sum(),
                    BarMode::Grouped => values.fold(0.0, f64::max),
                }
            })
            .fold(0.0, f64::max)
    }
}

/// A chart with the file stem it is exported under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedChart {
    pub name: String,
    pub page: String,
    pub spec: ChartSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::palette;

    fn series(values: &[f64]) -> Series {
        Series {
            name: "s".into(),
            colour: palette::GOLD,
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_bar_max() {
        let s = vec![series(&[1.0, 4.0]), series(&[3.0, 2.0])];
        assert_eq!(ChartSpec::bar_max(2, &s, BarMode::Stacked), 6.0);
        assert_eq!(ChartSpec::bar_max(2, &s, BarMode::Grouped), 4.0);
        assert_eq!(ChartSpec::bar_max(0, &s, BarMode::Grouped), 0.0);
    }

    #[test]
    fn test_is_empty() {
        let pie = ChartSpec::Pie {
            title: "Medals".into(),
            slices: vec![PieSlice {
                label: "Gold".into(),
                value: 0.0,
                colour: palette::GOLD,
            }],
            hole: 0.4,
        };
        assert!(pie.is_empty());
        assert_eq!(pie.title(), "Medals");

        let map = ChartSpec::Choropleth {
            title: "World".into(),
            cells: vec![MapCell {
                iso3: "FRA".into(),
                value: 64.0,
            }],
        };
        assert!(!map.is_empty());
    }
}
