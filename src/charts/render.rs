//! Static chart renderer.
//! Draws a [`ChartSpec`] with plotters into an RGB buffer and encodes it as PNG.

use super::layout::{self, Rect};
use super::palette::{self, Colour};
use super::spec::{BarMode, ChartSpec, MapCell, MapPoint, Orientation, PieSlice, Series, TimeBar};
use crate::analysis::distribution::BoxSummary;
use crate::analysis::truncate_label;
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid image size {0}x{1}")]
    InvalidSize(u32, u32),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(e.to_string())
    }
}

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const LABEL_CHARS: usize = 18;

fn rgb(c: Colour) -> RGBColor {
    c.into()
}

/// Render a chart to PNG bytes.
pub fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidSize(width, height));
    }
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(spec, &root)?;
        root.present()?;
    }
    encode_png(buffer, width, height)
}

/// Encode a packed RGB buffer as PNG.
pub fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let image = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::InvalidSize(width, height))?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn draw(spec: &ChartSpec, root: &Canvas<'_>) -> Result<(), RenderError> {
    let area = root.titled(spec.title(), (FONT, 26))?;
    if spec.is_empty() {
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            "No data available",
            (w as i32 / 2 - 70, h as i32 / 2),
            (FONT, 20).into_font().color(&palette::GRID.into_rgb()),
        ))?;
        return Ok(());
    }

    match spec {
        ChartSpec::Bar {
            categories,
            series,
            mode,
            orientation,
            value_label,
            ..
        } => match orientation {
            Orientation::Vertical => draw_bars_vertical(&area, categories, series, *mode, value_label),
            Orientation::Horizontal => draw_bars_horizontal(&area, categories, series, *mode, value_label),
        },
        ChartSpec::Pie { slices, hole, .. } => draw_pie(&area, slices, *hole),
        ChartSpec::Treemap { nodes, .. } => draw_treemap(&area, nodes),
        ChartSpec::Sunburst { nodes, .. } => draw_sunburst(&area, nodes),
        ChartSpec::Timeline { bars, .. } => draw_timeline(&area, bars),
        ChartSpec::ScatterMap { points, .. } => draw_scatter_map(&area, points),
        ChartSpec::Choropleth { cells, .. } => draw_choropleth(&area, cells),
        ChartSpec::BoxPlot { boxes, value_label, .. } => draw_boxes(&area, boxes, value_label),
    }
}

trait IntoRgb {
    fn into_rgb(self) -> RGBColor;
}

impl IntoRgb for Colour {
    fn into_rgb(self) -> RGBColor {
        rgb(self)
    }
}

/// Category label at integer positions of a `-0.5..n-0.5` axis.
fn category_at(categories: &[String], position: f64, reversed: bool) -> String {
    if (position - position.round()).abs() > 1e-6 || position < -0.5 {
        return String::new();
    }
    let idx = position.round() as usize;
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
        .map(|c| truncate_label(c, LABEL_CHARS))
        .unwrap_or_default()
}

/// Bar extents per series and category: `(low, high)` along the value axis
/// and `(offset, width)` across it, relative to the category center.
fn bar_geometry(n_series: usize, mode: BarMode, series: &[Series]) -> Vec<Vec<(f64, f64, f64, f64)>> {
    let n_categories = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let mut base = vec![0.0; n_categories];
    series
        .iter()
        .enumerate()
        .map(|(j, s)| {
            s.values
                .iter()
                .enumerate()
                .map(|(i, &v)| match mode {
                    BarMode::Stacked => {
                        let v = v.max(0.0);
                        let low = base[i];
                        base[i] += v;
                        (low, low + v, -0.4, 0.8)
                    }
                    BarMode::Grouped => {
                        let w = 0.8 / n_series.max(1) as f64;
                        (0.0, v, -0.4 + j as f64 * w, w)
                    }
                })
                .collect()
        })
        .collect()
}

fn draw_legend<'a, DB: DrawingBackend + 'a, CT: plotters::coord::CoordTranslate>(
    chart: &mut ChartContext<'a, DB, CT>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()
}

fn draw_bars_vertical(
    area: &Canvas<'_>,
    categories: &[String],
    series: &[Series],
    mode: BarMode,
    value_label: &str,
) -> Result<(), RenderError> {
    let n = categories.len();
    let max = layout::nice_max(ChartSpec::bar_max(n, series, mode));
    let rotate = n > 8;

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(if rotate { 130 } else { 40 })
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..max)?;

    let label_of = |x: &f64| category_at(categories, *x, false);
    let label_font = if rotate {
        (FONT, 12).into_font().transform(FontTransform::Rotate90)
    } else {
        (FONT, 13).into_font()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&label_of)
        .x_label_style(label_font)
        .y_desc(value_label)
        .draw()?;

    let geometry = bar_geometry(series.len(), mode, series);
    for (s, bars) in series.iter().zip(geometry) {
        let colour = rgb(s.colour);
        chart
            .draw_series(bars.into_iter().enumerate().map(|(i, (low, high, offset, width))| {
                let x = i as f64 + offset;
                Rectangle::new([(x, low), (x + width, high)], colour.filled())
            }))?
            .label(s.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], colour.filled()));
    }
    if series.len() > 1 {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn draw_bars_horizontal(
    area: &Canvas<'_>,
    categories: &[String],
    series: &[Series],
    mode: BarMode,
    value_label: &str,
) -> Result<(), RenderError> {
    let n = categories.len();
    let max = layout::nice_max(ChartSpec::bar_max(n, series, mode));

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(170)
        .build_cartesian_2d(0f64..max, -0.5f64..n as f64 - 0.5)?;

    // first category on top
    let label_of = |y: &f64| category_at(categories, *y, true);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&label_of)
        .x_desc(value_label)
        .draw()?;

    let geometry = bar_geometry(series.len(), mode, series);
    for (s, bars) in series.iter().zip(geometry) {
        let colour = rgb(s.colour);
        chart
            .draw_series(bars.into_iter().enumerate().map(|(i, (low, high, offset, width))| {
                let y = n.saturating_sub(i + 1) as f64 + offset;
                Rectangle::new([(low, y), (high, y + width)], colour.filled())
            }))?
            .label(s.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], colour.filled()));
    }
    if series.len() > 1 {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn to_px(points: Vec<(f64, f64)>) -> Vec<(i32, i32)> {
    points
        .into_iter()
        .map(|(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

fn draw_pie(area: &Canvas<'_>, slices: &[PieSlice], hole: f64) -> Result<(), RenderError> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);
    let center = (w * 0.38, h / 2.0);
    let outer = (w * 0.33).min(h * 0.44);
    let inner = outer * hole.clamp(0.0, 0.9);

    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let geometry = layout::pie_slices(&values);
    for (slice, g) in slices.iter().zip(&geometry) {
        if g.sweep <= 0.0 {
            continue;
        }
        let outline = layout::ring_segment(center, inner, outer, g.start, g.sweep);
        area.draw(&Polygon::new(to_px(outline), rgb(slice.colour).filled()))?;

        if g.fraction >= 0.04 {
            let (x, y) = layout::polar(center, (inner + outer) / 2.0, g.mid_angle());
            let style = (FONT, 14).into_font().color(&slice.colour.text_on().into_rgb());
            area.draw(&Text::new(
                format!("{:.1}%", g.fraction * 100.0),
                (x as i32 - 18, y as i32 - 7),
                style,
            ))?;
        }
    }

    let legend_x = (w * 0.75) as i32;
    for (i, (slice, g)) in slices.iter().zip(&geometry).enumerate() {
        let y = 40 + i as i32 * 26;
        area.draw(&Rectangle::new([(legend_x, y), (legend_x + 16, y + 16)], rgb(slice.colour).filled()))?;
        area.draw(&Text::new(
            format!("{} ({:.1}%)", truncate_label(&slice.label, LABEL_CHARS), g.fraction * 100.0),
            (legend_x + 24, y),
            (FONT, 15),
        ))?;
    }
    Ok(())
}

fn draw_tile_label(area: &Canvas<'_>, rect: &Rect, fill: Colour, lines: &[String]) -> Result<(), RenderError> {
    if rect.w < 50.0 || rect.h < 18.0 * lines.len() as f64 {
        return Ok(());
    }
    let style = (FONT, 13).into_font().color(&fill.text_on().into_rgb());
    let max_chars = ((rect.w - 8.0) / 7.5).max(3.0) as usize;
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            truncate_label(line, max_chars),
            (rect.x as i32 + 4, rect.y as i32 + 4 + i as i32 * 16),
            style.clone(),
        ))?;
    }
    Ok(())
}

fn draw_treemap(area: &Canvas<'_>, nodes: &[layout::TreeNode]) -> Result<(), RenderError> {
    let (w, h) = area.dim_in_pixel();
    let bounds = Rect::new(10.0, 5.0, w as f64 - 20.0, h as f64 - 15.0);
    let tiles = layout::treemap(nodes, bounds);
    let nested = nodes.iter().any(|n| !n.children.is_empty());
    let max = tiles.iter().filter(|t| t.is_leaf).map(|t| t.value).fold(0.0, f64::max);

    for tile in tiles.iter().filter(|t| t.is_leaf) {
        let fill = if nested {
            palette::categorical(tile.root).lighten(0.15 * tile.depth as f64)
        } else {
            palette::viridis_scaled(tile.value, max)
        };
        let r = tile.rect;
        area.draw(&Rectangle::new(
            [(r.x as i32, r.y as i32), (r.right() as i32, r.bottom() as i32)],
            rgb(fill).filled(),
        ))?;
        area.draw(&Rectangle::new(
            [(r.x as i32, r.y as i32), (r.right() as i32, r.bottom() as i32)],
            WHITE.stroke_width(1),
        ))?;
        draw_tile_label(area, &r, fill, &[tile.label.clone(), format!("{}", tile.value)])?;
    }
    for tile in tiles.iter().filter(|t| !t.is_leaf) {
        let r = tile.rect;
        area.draw(&Rectangle::new(
            [(r.x as i32, r.y as i32), (r.right() as i32, r.bottom() as i32)],
            BLACK.stroke_width(2),
        ))?;
    }
    Ok(())
}

fn draw_sunburst(area: &Canvas<'_>, nodes: &[layout::TreeNode]) -> Result<(), RenderError> {
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = (w.min(h) as f64 / 2.0) - 10.0;
    let arcs = layout::sunburst(nodes);
    let rings = arcs.iter().map(|a| a.depth + 1).max().unwrap_or(1) as f64;
    let ring = radius / (rings + 0.3);

    for arc in &arcs {
        if arc.sweep <= 0.0 {
            continue;
        }
        let inner = ring * (0.3 + arc.depth as f64);
        let outer = inner + ring;
        let fill = palette::categorical(arc.root).lighten(0.25 * arc.depth as f64);
        let outline = to_px(layout::ring_segment(center, inner, outer, arc.start, arc.sweep));
        area.draw(&Polygon::new(outline.clone(), rgb(fill).filled()))?;
        area.draw(&PathElement::new(outline, WHITE.stroke_width(1)))?;

        if arc.sweep * outer > 50.0 {
            let (x, y) = layout::polar(center, (inner + outer) / 2.0, arc.start + arc.sweep / 2.0);
            let style = (FONT, 12).into_font().color(&fill.text_on().into_rgb());
            area.draw(&Text::new(truncate_label(&arc.label, 12), (x as i32 - 25, y as i32 - 6), style))?;
        }
    }
    Ok(())
}

fn format_time(seconds: &f64) -> String {
    DateTime::<Utc>::from_timestamp(*seconds as i64, 0)
        .map(|t| t.format("%d %b %H:%M").to_string())
        .unwrap_or_default()
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

fn draw_timeline(area: &Canvas<'_>, bars: &[TimeBar]) -> Result<(), RenderError> {
    let rows = unique_in_order(bars.iter().map(|b| b.label.as_str()));
    let groups = unique_in_order(bars.iter().map(|b| b.group.as_str()));
    let start = bars.iter().map(|b| b.start).fold(f64::MAX, f64::min);
    let end = bars.iter().map(|b| b.end).fold(f64::MIN, f64::max);
    let pad = ((end - start) * 0.02).max(600.0);
    let n = rows.len();

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(220)
        .build_cartesian_2d(start - pad..end + pad, -0.5f64..n as f64 - 0.5)?;

    let label_of = |y: &f64| category_at(&rows, *y, true);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&label_of)
        .x_label_formatter(&format_time)
        .x_labels(6)
        .x_desc("Date")
        .draw()?;

    for (g, group) in groups.iter().enumerate() {
        let colour = rgb(palette::categorical(g));
        chart
            .draw_series(bars.iter().filter(|b| &b.group == group).filter_map(|b| {
                let row = rows.iter().position(|r| r == &b.label)?;
                let y = (n - 1 - row) as f64;
                Some(Rectangle::new([(b.start, y - 0.35), (b.end.max(b.start + 60.0), y + 0.35)], colour.filled()))
            }))?
            .label(truncate_label(group, 30))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], colour.filled()));
    }
    draw_legend(&mut chart)?;
    Ok(())
}

fn padded(min: f64, max: f64, fraction: f64, floor: f64) -> (f64, f64) {
    let pad = ((max - min) * fraction).max(floor);
    (min - pad, max + pad)
}

fn draw_scatter_map(area: &Canvas<'_>, points: &[MapPoint]) -> Result<(), RenderError> {
    let (lon_min, lon_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lon), hi.max(p.lon)));
    let (lat_min, lat_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lat), hi.max(p.lat)));
    let (x0, x1) = padded(lon_min, lon_max, 0.1, 0.02);
    let (y0, y1) = padded(lat_min, lat_max, 0.1, 0.02);
    let max_size = points.iter().map(|p| p.size).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;
    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .light_line_style(palette::GRID.into_rgb().mix(0.3).stroke_width(1))
        .draw()?;

    let marker = rgb(palette::MARKER);
    chart.draw_series(points.iter().map(|p| {
        let radius = if max_size > 0.0 {
            5 + (12.0 * (p.size / max_size).sqrt()) as i32
        } else {
            6
        };
        EmptyElement::at((p.lon, p.lat))
            + Circle::new((0, 0), radius, marker.mix(0.7).filled())
            + Text::new(truncate_label(&p.label, 24), (radius + 3, -6), (FONT, 12).into_font())
    }))?;
    Ok(())
}

fn draw_choropleth(area: &Canvas<'_>, cells: &[MapCell]) -> Result<(), RenderError> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64 - 40.0);
    let mut cells: Vec<&MapCell> = cells.iter().collect();
    cells.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.iso3.cmp(&b.iso3))
    });
    let max = cells.first().map(|c| c.value).unwrap_or(0.0);

    let (cols, rows) = layout::grid_dims(cells.len(), w / h.max(1.0));
    let tile_w = (w - 20.0) / cols.max(1) as f64;
    let tile_h = (h - 10.0) / rows.max(1) as f64;
    for (i, cell) in cells.iter().enumerate() {
        let rect = Rect::new(
            10.0 + (i % cols) as f64 * tile_w,
            5.0 + (i / cols) as f64 * tile_h,
            tile_w,
            tile_h,
        )
        .inset(1.0);
        let fill = palette::viridis_scaled(cell.value, max);
        area.draw(&Rectangle::new(
            [(rect.x as i32, rect.y as i32), (rect.right() as i32, rect.bottom() as i32)],
            rgb(fill).filled(),
        ))?;
        draw_tile_label(area, &rect, fill, &[cell.iso3.clone(), format!("{}", cell.value)])?;
    }

    // colour bar
    let bar_y = (h + 12.0) as i32;
    let bar_w = (w * 0.5) as i32;
    for step in 0..100 {
        let x = 10 + step * bar_w / 100;
        area.draw(&Rectangle::new(
            [(x, bar_y), (x + bar_w / 100 + 1, bar_y + 12)],
            rgb(palette::viridis(step as f64 / 99.0)).filled(),
        ))?;
    }
    area.draw(&Text::new("0", (10, bar_y + 14), (FONT, 12)))?;
    area.draw(&Text::new(format!("{}", max), (bar_w, bar_y + 14), (FONT, 12)))?;
    Ok(())
}

fn draw_boxes(area: &Canvas<'_>, boxes: &[BoxSummary], value_label: &str) -> Result<(), RenderError> {
    let n = boxes.len();
    let low = boxes.iter().map(|b| b.min).fold(f64::MAX, f64::min);
    let high = boxes.iter().map(|b| b.max).fold(f64::MIN, f64::max);
    let (y0, y1) = padded(low, high, 0.1, 1.0);
    let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, y0..y1)?;

    let label_of = |x: &f64| category_at(&labels, *x, false);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&label_of)
        .y_desc(value_label)
        .draw()?;

    for (i, b) in boxes.iter().enumerate() {
        let x = i as f64;
        let colour = palette::categorical(i);
        let line = rgb(colour).stroke_width(2);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, b.q1), (x + 0.3, b.q3)],
            rgb(colour.lighten(0.6)).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new([(x - 0.3, b.q1), (x + 0.3, b.q3)], line)))?;
        chart.draw_series(
            [
                vec![(x - 0.3, b.median), (x + 0.3, b.median)],
                vec![(x, b.q3), (x, b.whisker_high)],
                vec![(x, b.q1), (x, b.whisker_low)],
                vec![(x - 0.15, b.whisker_high), (x + 0.15, b.whisker_high)],
                vec![(x - 0.15, b.whisker_low), (x + 0.15, b.whisker_low)],
            ]
            .into_iter()
            .map(move |points| PathElement::new(points, line)),
        )?;
        chart.draw_series(std::iter::once(Cross::new((x, b.mean), 5, BLACK.stroke_width(2))))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(vec![255u8; 4 * 3 * 3], 4, 3).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        assert!(matches!(
            encode_png(vec![0u8; 5], 4, 3),
            Err(RenderError::InvalidSize(4, 3))
        ));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let spec = ChartSpec::Choropleth {
            title: "Medals".into(),
            cells: Vec::new(),
        };
        assert!(matches!(
            render_png(&spec, 0, 100),
            Err(RenderError::InvalidSize(0, 100))
        ));
    }

    #[test]
    fn test_category_positions() {
        let cats = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(category_at(&cats, 0.0, false), "A");
        assert_eq!(category_at(&cats, 0.0, true), "C");
        assert_eq!(category_at(&cats, 0.5, false), "");
        assert_eq!(category_at(&cats, 5.0, true), "");
    }

    #[test]
    fn test_stacked_geometry() {
        let series = vec![
            Series {
                name: "Gold".into(),
                colour: palette::GOLD,
                values: vec![2.0, 1.0],
            },
            Series {
                name: "Silver".into(),
                colour: palette::SILVER,
                values: vec![3.0, 0.0],
            },
        ];
        let stacked = bar_geometry(2, BarMode::Stacked, &series);
        assert_eq!(stacked[1][0], (2.0, 5.0, -0.4, 0.8));
        let grouped = bar_geometry(2, BarMode::Grouped, &series);
        assert_eq!(grouped[1][0].2, 0.0);
    }
}
