//! Interactive charts for the desktop window.
//! Axis charts go through egui_plot; pies, trees and the tile map are painted.

use super::layout::{self, Rect};
use super::palette::{self, Colour};
use super::spec::{BarMode, ChartSpec, MapCell, MapPoint, Orientation, PieSlice, Series, TimeBar};
use crate::analysis::distribution::BoxSummary;
use crate::analysis::truncate_label;
use chrono::{DateTime, Utc};
use egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points,
};
use std::ops::RangeInclusive;

fn c32(c: Colour) -> Color32 {
    c.into()
}

/// Label of the category at an integer axis mark, blank between marks.
fn category_label(categories: &[String], mark: f64, reversed: bool) -> String {
    if (mark - mark.round()).abs() > 1e-6 || mark < -0.5 {
        return String::new();
    }
    let idx = mark.round() as usize;
    let idx = if reversed {
        match categories.len().checked_sub(idx + 1) {
            Some(i) => i,
            None => return String::new(),
        }
    } else {
        idx
    };
    categories
        .get(idx)
        .map(|c| truncate_label(c, 20))
        .unwrap_or_default()
}

/// Draw `spec` with its title above it.
pub fn show(ui: &mut egui::Ui, id: &str, spec: &ChartSpec, height: f32) {
    ui.label(RichText::new(spec.title()).strong().size(15.0));
    if spec.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new("No data available").italics().color(Color32::GRAY));
        ui.add_space(8.0);
        return;
    }

    match spec {
        ChartSpec::Bar {
            categories,
            series,
            mode,
            orientation,
            value_label,
            ..
        } => bars(ui, id, categories, series, *mode, *orientation, value_label, height),
        ChartSpec::Pie { slices, hole, .. } => pie(ui, slices, *hole, height),
        ChartSpec::Treemap { nodes, .. } => treemap(ui, nodes, height),
        ChartSpec::Sunburst { nodes, .. } => sunburst(ui, nodes, height),
        ChartSpec::Timeline { bars, .. } => timeline(ui, id, bars, height),
        ChartSpec::ScatterMap { points, .. } => scatter_map(ui, id, points, height),
        ChartSpec::Choropleth { cells, .. } => choropleth(ui, cells, height),
        ChartSpec::BoxPlot { boxes, value_label, .. } => box_plot(ui, id, boxes, value_label, height),
    }
}

#[allow(clippy::too_many_arguments)]
fn bars(
    ui: &mut egui::Ui,
    id: &str,
    categories: &[String],
    series: &[Series],
    mode: BarMode,
    orientation: Orientation,
    value_label: &str,
    height: f32,
) {
    let n = categories.len();
    let horizontal = orientation == Orientation::Horizontal;
    let width = match mode {
        BarMode::Stacked => 0.7,
        BarMode::Grouped => 0.8 / series.len().max(1) as f64,
    };

    let mut charts: Vec<BarChart> = Vec::new();
    for (s_idx, s) in series.iter().enumerate() {
        let offset = match mode {
            BarMode::Stacked => 0.0,
            BarMode::Grouped => (s_idx as f64 - (series.len() as f64 - 1.0) / 2.0) * width,
        };
        let items: Vec<Bar> = (0..n)
            .map(|i| {
                let position = if horizontal { (n - 1 - i) as f64 } else { i as f64 };
                let value = s.values.get(i).copied().unwrap_or(0.0);
                Bar::new(position + offset, value)
                    .width(width)
                    .name(format!("{} {}", categories[i], s.name))
            })
            .collect();
        let mut chart = BarChart::new(items).name(&s.name).color(c32(s.colour));
        if horizontal {
            chart = chart.horizontal();
        }
        if mode == BarMode::Stacked {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    let labels = categories.to_vec();
    let category_axis = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        category_label(&labels, mark.value, horizontal)
    };
    let mut plot = Plot::new(id.to_string())
        .height(height)
        .legend(Legend::default())
        .allow_scroll(false);
    plot = if horizontal {
        plot.x_axis_label(value_label.to_string()).y_axis_formatter(category_axis)
    } else {
        plot.y_axis_label(value_label.to_string()).x_axis_formatter(category_axis)
    };
    plot.show(ui, |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    });
}

fn box_plot(ui: &mut egui::Ui, id: &str, boxes: &[BoxSummary], value_label: &str, height: f32) {
    let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();
    Plot::new(id.to_string())
        .height(height)
        .allow_scroll(false)
        .y_axis_label(value_label.to_string())
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value, false))
        .show(ui, |plot_ui| {
            for (i, summary) in boxes.iter().enumerate() {
                let colour = c32(palette::categorical(i));
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.whisker_low,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.whisker_high,
                    ),
                )
                .name(&summary.label)
                .box_width(0.5)
                .fill(colour.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, colour));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&summary.label));
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[i as f64, summary.mean]]))
                        .radius(3.0)
                        .color(Color32::BLACK)
                        .name(format!("{} mean", summary.label)),
                );
            }
        });
}

fn format_time(seconds: f64) -> String {
    DateTime::<Utc>::from_timestamp(seconds as i64, 0)
        .map(|t| t.format("%d %b %H:%M").to_string())
        .unwrap_or_default()
}

fn timeline(ui: &mut egui::Ui, id: &str, items: &[TimeBar], height: f32) {
    let mut rows: Vec<String> = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    for bar in items {
        if !rows.contains(&bar.label) {
            rows.push(bar.label.clone());
        }
        if !groups.contains(&bar.group) {
            groups.push(bar.group.clone());
        }
    }
    let n = rows.len();

    let charts: Vec<BarChart> = groups
        .iter()
        .enumerate()
        .map(|(g, group)| {
            let members: Vec<Bar> = items
                .iter()
                .filter(|b| &b.group == group)
                .filter_map(|b| {
                    let row = rows.iter().position(|r| r == &b.label)?;
                    Some(
                        Bar::new((n - 1 - row) as f64, (b.end - b.start).max(60.0))
                            .base_offset(b.start)
                            .width(0.7)
                            .name(format!("{} {} - {}", b.label, format_time(b.start), format_time(b.end))),
                    )
                })
                .collect();
            BarChart::new(members)
                .horizontal()
                .name(group)
                .color(c32(palette::categorical(g)))
        })
        .collect();

    Plot::new(id.to_string())
        .height(height.max(24.0 * n as f32))
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_formatter(|mark, _range| format_time(mark.value))
        .y_axis_formatter(move |mark, _range| category_label(&rows, mark.value, true))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn scatter_map(ui: &mut egui::Ui, id: &str, points: &[MapPoint], height: f32) {
    let max = points.iter().map(|p| p.size).fold(0.0, f64::max);
    let named: Vec<(String, [f64; 2])> = points.iter().map(|p| (p.label.clone(), [p.lon, p.lat])).collect();

    Plot::new(id.to_string())
        .height(height)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(move |_name, value| {
            let nearest = named.iter().min_by(|a, b| {
                let da = (a.1[0] - value.x).powi(2) + (a.1[1] - value.y).powi(2);
                let db = (b.1[0] - value.x).powi(2) + (b.1[1] - value.y).powi(2);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            match nearest {
                Some((label, [lon, lat])) => format!("{}\n{:.4}, {:.4}", label, lat, lon),
                None => String::new(),
            }
        })
        .show(ui, |plot_ui| {
            for point in points {
                let radius = if max > 0.0 { 4.0 + 10.0 * (point.size / max) as f32 } else { 6.0 };
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[point.lon, point.lat]]))
                        .radius(radius)
                        .color(c32(palette::MARKER).gamma_multiply(0.8)),
                );
            }
        });
}

/// Allocate a painted chart area, returning its bounds as a layout rect.
fn canvas(ui: &mut egui::Ui, height: f32) -> (egui::Response, egui::Painter, Rect) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(Vec2::new(width, height), Sense::hover());
    let r = response.rect;
    let bounds = Rect::new(r.min.x as f64, r.min.y as f64, r.width() as f64, r.height() as f64);
    (response, painter, bounds)
}

fn pos(p: (f64, f64)) -> Pos2 {
    Pos2::new(p.0 as f32, p.1 as f32)
}

fn to_egui(r: &Rect) -> egui::Rect {
    egui::Rect::from_min_size(Pos2::new(r.x as f32, r.y as f32), Vec2::new(r.w as f32, r.h as f32))
}

/// Fill a ring segment as a strip of convex quads.
fn fill_segment(painter: &egui::Painter, center: (f64, f64), inner: f64, outer: f64, start: f64, sweep: f64, fill: Color32) {
    let steps = ((sweep / 0.05).ceil() as usize).max(1);
    let step = sweep / steps as f64;
    for i in 0..steps {
        let a0 = start + i as f64 * step;
        let a1 = a0 + step;
        let quad = vec![
            pos(layout::polar(center, inner, a0)),
            pos(layout::polar(center, outer, a0)),
            pos(layout::polar(center, outer, a1)),
            pos(layout::polar(center, inner, a1)),
        ];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
}

/// Angle of `p` around `center` normalised into `[start, start + TAU)`.
fn angle_from(center: (f64, f64), p: Pos2, start: f64) -> (f64, f64) {
    let dx = p.x as f64 - center.0;
    let dy = p.y as f64 - center.1;
    let mut angle = dy.atan2(dx);
    while angle < start {
        angle += std::f64::consts::TAU;
    }
    while angle >= start + std::f64::consts::TAU {
        angle -= std::f64::consts::TAU;
    }
    (angle, (dx * dx + dy * dy).sqrt())
}

fn pie(ui: &mut egui::Ui, slices: &[PieSlice], hole: f64, height: f32) {
    let (response, painter, bounds) = canvas(ui, height);
    let center = (bounds.x + bounds.w * 0.38, bounds.y + bounds.h / 2.0);
    let outer = (bounds.w * 0.33).min(bounds.h * 0.45);
    let inner = outer * hole.clamp(0.0, 0.9);
    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let geometry = layout::pie_slices(&values);

    for (slice, g) in slices.iter().zip(&geometry) {
        if g.sweep <= 0.0 {
            continue;
        }
        fill_segment(&painter, center, inner, outer, g.start, g.sweep, c32(slice.colour));
        if g.fraction >= 0.04 {
            painter.text(
                pos(layout::polar(center, (inner + outer) / 2.0, g.mid_angle())),
                Align2::CENTER_CENTER,
                format!("{:.1}%", g.fraction * 100.0),
                FontId::proportional(13.0),
                c32(slice.colour.text_on()),
            );
        }
    }

    let legend_x = (bounds.x + bounds.w * 0.75) as f32;
    for (i, slice) in slices.iter().enumerate() {
        let y = bounds.y as f32 + 10.0 + i as f32 * 22.0;
        painter.rect_filled(
            egui::Rect::from_min_size(Pos2::new(legend_x, y), Vec2::splat(14.0)),
            2.0,
            c32(slice.colour),
        );
        painter.text(
            Pos2::new(legend_x + 20.0, y + 7.0),
            Align2::LEFT_CENTER,
            truncate_label(&slice.label, 24),
            FontId::proportional(13.0),
            ui.visuals().text_color(),
        );
    }

    if let Some(hover) = response.hover_pos() {
        let first = geometry.first().map(|g| g.start).unwrap_or(0.0);
        let (angle, dist) = angle_from(center, hover, first);
        if dist >= inner && dist <= outer {
            let hit = slices
                .iter()
                .zip(&geometry)
                .find(|(_, g)| angle >= g.start && angle < g.start + g.sweep);
            if let Some((slice, g)) = hit {
                response.on_hover_text_at_pointer(format!(
                    "{}: {} ({:.1}%)",
                    slice.label,
                    slice.value,
                    g.fraction * 100.0
                ));
            }
        }
    }
}

fn treemap(ui: &mut egui::Ui, nodes: &[layout::TreeNode], height: f32) {
    let (response, painter, bounds) = canvas(ui, height);
    let tiles = layout::treemap(nodes, bounds.inset(2.0));
    let nested = nodes.iter().any(|n| !n.children.is_empty());
    let max = tiles.iter().filter(|t| t.is_leaf).map(|t| t.value).fold(0.0, f64::max);

    for tile in tiles.iter().filter(|t| t.is_leaf) {
        let fill = if nested {
            palette::categorical(tile.root).lighten(0.15 * tile.depth as f64)
        } else {
            palette::viridis_scaled(tile.value, max)
        };
        let rect = to_egui(&tile.rect);
        painter.rect_filled(rect, 0.0, c32(fill));
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::WHITE));
        if tile.rect.w > 50.0 && tile.rect.h > 34.0 {
            let max_chars = ((tile.rect.w - 8.0) / 7.0).max(3.0) as usize;
            painter.text(
                rect.left_top() + Vec2::new(4.0, 4.0),
                Align2::LEFT_TOP,
                format!("{}\n{}", truncate_label(&tile.label, max_chars), tile.value),
                FontId::proportional(12.0),
                c32(fill.text_on()),
            );
        }
    }
    for tile in tiles.iter().filter(|t| !t.is_leaf) {
        painter.rect_stroke(to_egui(&tile.rect), 0.0, Stroke::new(2.0, Color32::BLACK));
    }

    if let Some(hover) = response.hover_pos() {
        let hit = tiles
            .iter()
            .filter(|t| t.is_leaf)
            .find(|t| to_egui(&t.rect).contains(hover));
        if let Some(tile) = hit {
            response.on_hover_text_at_pointer(format!("{}: {}", tile.label, tile.value));
        }
    }
}

fn sunburst(ui: &mut egui::Ui, nodes: &[layout::TreeNode], height: f32) {
    let (response, painter, bounds) = canvas(ui, height);
    let center = bounds.center();
    let radius = bounds.w.min(bounds.h) / 2.0 - 6.0;
    let arcs = layout::sunburst(nodes);
    let rings = arcs.iter().map(|a| a.depth + 1).max().unwrap_or(1) as f64;
    let ring = radius / (rings + 0.3);
    let radii = |depth: usize| {
        let inner = ring * (0.3 + depth as f64);
        (inner, inner + ring)
    };

    for arc in arcs.iter().filter(|a| a.sweep > 0.0) {
        let (inner, outer) = radii(arc.depth);
        let fill = palette::categorical(arc.root).lighten(0.25 * arc.depth as f64);
        fill_segment(&painter, center, inner, outer, arc.start, arc.sweep, c32(fill));
        if arc.sweep * outer > 50.0 {
            painter.text(
                pos(layout::polar(center, (inner + outer) / 2.0, arc.start + arc.sweep / 2.0)),
                Align2::CENTER_CENTER,
                truncate_label(&arc.label, 12),
                FontId::proportional(11.0),
                c32(fill.text_on()),
            );
        }
    }

    if let Some(hover) = response.hover_pos() {
        let first = arcs.first().map(|a| a.start).unwrap_or(0.0);
        let (angle, dist) = angle_from(center, hover, first);
        let hit = arcs.iter().find(|a| {
            let (inner, outer) = radii(a.depth);
            dist >= inner && dist < outer && angle >= a.start && angle < a.start + a.sweep
        });
        if let Some(arc) = hit {
            response.on_hover_text_at_pointer(format!("{}: {}", arc.label, arc.value));
        }
    }
}

fn choropleth(ui: &mut egui::Ui, cells: &[MapCell], height: f32) {
    let (response, painter, bounds) = canvas(ui, height);
    let mut cells: Vec<&MapCell> = cells.iter().collect();
    cells.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.iso3.cmp(&b.iso3))
    });
    let max = cells.first().map(|c| c.value).unwrap_or(0.0);
    let grid = Rect::new(bounds.x, bounds.y, bounds.w, bounds.h - 24.0);
    let (cols, rows) = layout::grid_dims(cells.len(), grid.w / grid.h.max(1.0));
    let tile_w = grid.w / cols.max(1) as f64;
    let tile_h = grid.h / rows.max(1) as f64;

    let mut placed = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let rect = Rect::new(
            grid.x + (i % cols.max(1)) as f64 * tile_w,
            grid.y + (i / cols.max(1)) as f64 * tile_h,
            tile_w,
            tile_h,
        )
        .inset(1.0);
        let fill = palette::viridis_scaled(cell.value, max);
        let r = to_egui(&rect);
        painter.rect_filled(r, 2.0, c32(fill));
        if rect.w > 30.0 && rect.h > 14.0 {
            painter.text(r.center(), Align2::CENTER_CENTER, &cell.iso3, FontId::proportional(11.0), c32(fill.text_on()));
        }
        placed.push((r, *cell));
    }

    let bar_y = (grid.bottom() + 6.0) as f32;
    let bar_w = (bounds.w * 0.5) as f32;
    for step in 0..50 {
        let x = bounds.x as f32 + step as f32 * bar_w / 50.0;
        painter.rect_filled(
            egui::Rect::from_min_size(Pos2::new(x, bar_y), Vec2::new(bar_w / 50.0 + 1.0, 10.0)),
            0.0,
            c32(palette::viridis(step as f64 / 49.0)),
        );
    }
    painter.text(
        Pos2::new(bounds.x as f32 + bar_w + 6.0, bar_y + 5.0),
        Align2::LEFT_CENTER,
        format!("0 - {}", max),
        FontId::proportional(11.0),
        ui.visuals().text_color(),
    );

    if let Some(hover) = response.hover_pos() {
        if let Some((_, cell)) = placed.iter().find(|(r, _)| r.contains(hover)) {
            response.on_hover_text_at_pointer(format!("{}: {}", cell.iso3, cell.value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let cats = vec!["France".to_string(), "China".to_string()];
        assert_eq!(category_label(&cats, 0.0, false), "France");
        assert_eq!(category_label(&cats, 0.0, true), "China");
        assert_eq!(category_label(&cats, 0.5, false), "");
        assert_eq!(category_label(&cats, 2.0, true), "");
        assert_eq!(category_label(&cats, -1.0, false), "");
    }

    #[test]
    fn test_angle_from_wraps_into_range() {
        let start = -std::f64::consts::FRAC_PI_2;
        let (angle, dist) = angle_from((0.0, 0.0), Pos2::new(-1.0, 0.0), start);
        assert!((angle - std::f64::consts::PI).abs() < 1e-9);
        assert!((dist - 1.0).abs() < 1e-9);
        let (angle, _) = angle_from((0.0, 0.0), Pos2::new(0.0, -1.0), start);
        assert!((angle - start).abs() < 1e-9);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "01 Jan 00:00");
    }
}
