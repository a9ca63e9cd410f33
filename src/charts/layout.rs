//! Backend-independent chart geometry: pie slices, treemaps, sunburst rings
//! and scales. Angles are radians, measured clockwise in screen space from
//! 12 o'clock.

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Axis-aligned rectangle in pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Shrink by `by` on every side, never below zero size.
    pub fn inset(&self, by: f64) -> Self {
        let dx = by.min(self.w / 2.0);
        let dy = by.min(self.h / 2.0);
        Self::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }
}

/// One pie or donut slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slice {
    pub start: f64,
    pub sweep: f64,
    pub fraction: f64,
}

impl Slice {
    pub fn mid_angle(&self) -> f64 {
        self.start + self.sweep / 2.0
    }
}

/// Slices for `values` in order. Non-positive values get an empty slice; the
/// result is empty when nothing is positive.
pub fn pie_slices(values: &[f64]) -> Vec<Slice> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = -FRAC_PI_2;
    values
        .iter()
        .map(|&v| {
            let fraction = if v > 0.0 { v / total } else { 0.0 };
            let slice = Slice {
                start,
                sweep: fraction * TAU,
                fraction,
            };
            start += slice.sweep;
            slice
        })
        .collect()
}

/// Point on a circle around `center`.
pub fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
}

/// Outline of a ring segment (a pie slice when `inner` is zero) as a polygon.
pub fn ring_segment(center: (f64, f64), inner: f64, outer: f64, start: f64, sweep: f64) -> Vec<(f64, f64)> {
    let steps = ((sweep.abs() / TAU) * 120.0).ceil().max(2.0) as usize;
    let angle = |i: usize| start + sweep * i as f64 / steps as f64;

    let mut points: Vec<(f64, f64)> = (0..=steps).map(|i| polar(center, outer, angle(i))).collect();
    if inner > 0.0 {
        points.extend((0..=steps).rev().map(|i| polar(center, inner, angle(i))));
    } else {
        points.push(center);
    }
    points
}

/// Squarified treemap. Returns one rectangle per value, in input order.
/// Positive values exactly partition `bounds`; others get an empty rectangle.
pub fn squarify(values: &[f64], bounds: Rect) -> Vec<Rect> {
    let mut out = vec![Rect::new(bounds.x, bounds.y, 0.0, 0.0); values.len()];
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return out;
    }

    let scale = bounds.area() / total;
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.0)
        .map(|(i, v)| (i, v * scale))
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut remaining = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();
    for item in order {
        let side = remaining.w.min(remaining.h);
        if row.is_empty() {
            row.push(item);
            continue;
        }
        let mut candidate = row.clone();
        candidate.push(item);
        if worst_ratio(&candidate, side) <= worst_ratio(&row, side) {
            row = candidate;
        } else {
            remaining = lay_row(&row, remaining, &mut out);
            row = vec![item];
        }
    }
    if !row.is_empty() {
        lay_row(&row, remaining, &mut out);
    }
    out
}

fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|r| r.1).sum();
    let max = row.iter().map(|r| r.1).fold(f64::MIN, f64::max);
    let min = row.iter().map(|r| r.1).fold(f64::MAX, f64::min);
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Place a row along the short side of `rect` and return what is left.
fn lay_row(row: &[(usize, f64)], rect: Rect, out: &mut [Rect]) -> Rect {
    let sum: f64 = row.iter().map(|r| r.1).sum();
    if rect.w >= rect.h {
        let width = if rect.h > 0.0 { sum / rect.h } else { 0.0 };
        let mut y = rect.y;
        for &(i, area) in row {
            let h = if width > 0.0 { area / width } else { 0.0 };
            out[i] = Rect::new(rect.x, y, width, h);
            y += h;
        }
        Rect::new(rect.x + width, rect.y, (rect.w - width).max(0.0), rect.h)
    } else {
        let height = if rect.w > 0.0 { sum / rect.w } else { 0.0 };
        let mut x = rect.x;
        for &(i, area) in row {
            let w = if height > 0.0 { area / height } else { 0.0 };
            out[i] = Rect::new(x, rect.y, w, height);
            x += w;
        }
        Rect::new(rect.x, rect.y + height, rect.w, (rect.h - height).max(0.0))
    }
}

/// A labelled weight with optional children, for treemaps and sunbursts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub value: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let mut node = Self::leaf(label, 0.0);
        node.value = children.iter().map(TreeNode::weight).sum();
        node.children = children;
        node
    }

    /// Own value for leaves, sum of children otherwise.
    pub fn weight(&self) -> f64 {
        if self.children.is_empty() {
            self.value.max(0.0)
        } else {
            self.children.iter().map(TreeNode::weight).sum()
        }
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

/// A laid out tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub rect: Rect,
    pub depth: usize,
    pub label: String,
    pub value: f64,
    /// Index of the top-level node this tile belongs to.
    pub root: usize,
    pub is_leaf: bool,
}

/// Nested treemap: every node gets a tile, children subdivide their parent.
/// Parents come before their children in the output.
pub fn treemap(nodes: &[TreeNode], bounds: Rect) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let weights: Vec<f64> = nodes.iter().map(TreeNode::weight).collect();
    for (root, (node, rect)) in nodes.iter().zip(squarify(&weights, bounds)).enumerate() {
        place(node, rect, 0, root, &mut tiles);
    }
    tiles
}

fn place(node: &TreeNode, rect: Rect, depth: usize, root: usize, tiles: &mut Vec<Tile>) {
    tiles.push(Tile {
        rect,
        depth,
        label: node.label.clone(),
        value: node.weight(),
        root,
        is_leaf: node.children.is_empty(),
    });
    let weights: Vec<f64> = node.children.iter().map(TreeNode::weight).collect();
    for (child, child_rect) in node.children.iter().zip(squarify(&weights, rect)) {
        place(child, child_rect, depth + 1, root, tiles);
    }
}

/// One segment of a sunburst ring. Depth 0 is the innermost ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arc {
    pub depth: usize,
    pub start: f64,
    pub sweep: f64,
    pub label: String,
    pub value: f64,
    pub root: usize,
}

/// Sunburst segments. Each node spans its parent's angle in proportion to
/// its weight; the top level spans the full turn.
pub fn sunburst(nodes: &[TreeNode]) -> Vec<Arc> {
    let total: f64 = nodes.iter().map(TreeNode::weight).sum();
    let mut arcs = Vec::new();
    if total <= 0.0 {
        return arcs;
    }
    let mut start = -FRAC_PI_2;
    for (root, node) in nodes.iter().enumerate() {
        let sweep = node.weight() / total * TAU;
        ring(node, start, sweep, 0, root, &mut arcs);
        start += sweep;
    }
    arcs
}

fn ring(node: &TreeNode, start: f64, sweep: f64, depth: usize, root: usize, arcs: &mut Vec<Arc>) {
    let weight = node.weight();
    arcs.push(Arc {
        depth,
        start,
        sweep,
        label: node.label.clone(),
        value: weight,
        root,
    });
    if weight <= 0.0 {
        return;
    }
    let mut child_start = start;
    for child in &node.children {
        let child_sweep = child.weight() / weight * sweep;
        ring(child, child_start, child_sweep, depth + 1, root, arcs);
        child_start += child_sweep;
    }
}

/// Round `max` up to 1, 2 or 5 times a power of ten, for axis ranges.
pub fn nice_max(max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 || max.is_infinite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .find(|m| m * magnitude >= max)
        .unwrap_or(10.0);
    step * magnitude
}

/// Linear map from a data domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.0) / span * (self.range.1 - self.range.0)
    }
}

/// Columns and rows of a near-square grid holding `n` cells in a space with
/// the given width/height ratio.
pub fn grid_dims(n: usize, aspect: f64) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    let cols = ((n as f64 * aspect).sqrt().ceil() as usize).clamp(1, n);
    (cols, n.div_ceil(cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_pie_slices_cover_full_turn() {
        let slices = pie_slices(&[3.0, 1.0, 0.0, 4.0]);
        assert_eq!(slices.len(), 4);
        assert!(close(slices.iter().map(|s| s.sweep).sum::<f64>(), TAU));
        assert!(close(slices[0].start, -FRAC_PI_2));
        assert_eq!(slices[2].sweep, 0.0);
        assert!(close(slices[3].fraction, 0.5));
        assert!(pie_slices(&[0.0, -1.0]).is_empty());
    }

    #[test]
    fn test_squarify_partitions_area() {
        let bounds = Rect::new(10.0, 20.0, 600.0, 400.0);
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let rects = squarify(&values, bounds);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!(close(total, bounds.area()));
        for (rect, value) in rects.iter().zip(values) {
            assert!(close(rect.area(), value / 24.0 * bounds.area()));
            assert!(rect.x >= bounds.x - 1e-6 && rect.right() <= bounds.right() + 1e-6);
            assert!(rect.y >= bounds.y - 1e-6 && rect.bottom() <= bounds.bottom() + 1e-6);
        }
    }

    #[test]
    fn test_squarify_skips_empty_values() {
        let rects = squarify(&[0.0, 5.0], Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rects[0].area(), 0.0);
        assert!(close(rects[1].area(), 100.0));
        assert!(squarify(&[], Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_nested_treemap() {
        let nodes = vec![
            TreeNode::branch("Europe", vec![TreeNode::leaf("France", 3.0), TreeNode::leaf("Italy", 1.0)]),
            TreeNode::leaf("Asia", 4.0),
        ];
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let tiles = treemap(&nodes, bounds);
        assert_eq!(tiles.len(), 4);
        let leaves: f64 = tiles.iter().filter(|t| t.is_leaf).map(|t| t.rect.area()).sum();
        assert!(close(leaves, bounds.area()));
        let europe = tiles.iter().find(|t| t.label == "Europe").unwrap();
        assert_eq!(europe.value, 4.0);
        assert!(!europe.is_leaf);
    }

    #[test]
    fn test_sunburst_children_share_parent_span() {
        let nodes = vec![
            TreeNode::branch("Europe", vec![TreeNode::leaf("France", 3.0), TreeNode::leaf("Italy", 1.0)]),
            TreeNode::leaf("Asia", 4.0),
        ];
        let arcs = sunburst(&nodes);
        let top: f64 = arcs.iter().filter(|a| a.depth == 0).map(|a| a.sweep).sum();
        assert!(close(top, TAU));
        let children: f64 = arcs.iter().filter(|a| a.depth == 1).map(|a| a.sweep).sum();
        assert!(close(children, TAU / 2.0));
        assert_eq!(nodes[0].depth(), 2);
    }

    #[test]
    fn test_ring_segment_closes_on_center() {
        let points = ring_segment((0.0, 0.0), 0.0, 10.0, 0.0, FRAC_PI_2);
        assert_eq!(*points.last().unwrap(), (0.0, 0.0));
        let donut = ring_segment((0.0, 0.0), 5.0, 10.0, 0.0, FRAC_PI_2);
        assert!(donut.iter().all(|(x, y)| (x * x + y * y).sqrt() >= 5.0 - 1e-9));
    }

    #[test]
    fn test_scales() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(7.0), 10.0);
        assert_eq!(nice_max(120.0), 200.0);
        assert_eq!(nice_max(40.0), 50.0);
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(scale.map(5.0), 50.0);
        assert_eq!(grid_dims(0, 1.5), (0, 0));
        assert_eq!(grid_dims(10, 1.0), (4, 3));
        assert_eq!(grid_dims(1, 2.0), (1, 1));
    }
}
