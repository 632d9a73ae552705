//! Spot extraction: turn a thresholded frame into a list of sub-pixel
//! centroids under one of five centroiding policies.
//!
//! All policies share the same pre-work (8-connected component labelling of
//! the nonzero pixels) and the same area filter: a candidate survives only
//! when its area exceeds `min_area`. The contour policies additionally
//! pre-filter by minimum enclosing-circle radius `r > sqrt(min_area / π)`.
//!
//! Output order is deterministic: component policies emit in raster
//! first-encounter order, contour policies in contour discovery order (the
//! same raster order over components).

pub mod contour;
pub mod label;

use std::f64::consts::PI;

use tracing::debug;

use crate::frame::Frame;
use crate::spot::{CentroidMethod, Spot};
use crate::Vector2;

use contour::{filled_region, min_enclosing_circle, trace_boundary};
use label::{label_components, LabelMap};

/// Per-component accumulators gathered in a single pass over the label map.
struct ComponentStats {
    pixel_count: u32,
    sum_col: u64,
    sum_row: u64,
    // Intensity-weighted sums; integer accumulation stays exact
    weighted_col: u64,
    weighted_row: u64,
    weight: u64,
    min_row: usize,
    min_col: usize,
    max_row: usize,
    max_col: usize,
    first: (usize, usize),
}

fn component_stats(frame: &Frame, map: &LabelMap) -> Vec<ComponentStats> {
    let w = frame.cols();
    let mut stats: Vec<ComponentStats> = Vec::with_capacity(map.count);

    for (idx, &lbl) in map.labels.iter().enumerate() {
        if lbl == 0 {
            continue;
        }
        let row = idx / w;
        let col = idx % w;
        let value = frame.data()[idx] as u64;

        let slot = lbl as usize - 1;
        if slot == stats.len() {
            stats.push(ComponentStats {
                pixel_count: 0,
                sum_col: 0,
                sum_row: 0,
                weighted_col: 0,
                weighted_row: 0,
                weight: 0,
                min_row: row,
                min_col: col,
                max_row: row,
                max_col: col,
                first: (row, col),
            });
        }
        let s = &mut stats[slot];
        s.pixel_count += 1;
        s.sum_col += col as u64;
        s.sum_row += row as u64;
        s.min_row = s.min_row.min(row);
        s.min_col = s.min_col.min(col);
        s.max_row = s.max_row.max(row);
        s.max_col = s.max_col.max(col);
        s.weighted_col += col as u64 * value;
        s.weighted_row += row as u64 * value;
        s.weight += value;
    }

    stats
}

/// Extract spots from an already-thresholded frame.
///
/// Returns an empty list when nothing passes the filters; that is not an
/// error.
pub fn extract_spots(thresholded: &Frame, method: CentroidMethod, min_area: u32) -> Vec<Spot> {
    let map = label_components(thresholded);
    let stats = component_stats(thresholded, &map);

    let spots = match method {
        CentroidMethod::ConnectedGeometric => connected_geometric(&stats, min_area),
        CentroidMethod::ConnectedWeighted => connected_weighted(&stats, min_area),
        CentroidMethod::ContourGeometric
        | CentroidMethod::ContourWeighted
        | CentroidMethod::ContourBboxWeighted => {
            contour_spots(thresholded, &map, &stats, method, min_area)
        }
    };

    debug!(
        "extracted {} spots from {} components ({:?})",
        spots.len(),
        map.count,
        method
    );
    spots
}

fn connected_geometric(stats: &[ComponentStats], min_area: u32) -> Vec<Spot> {
    stats
        .iter()
        .filter(|s| s.pixel_count > min_area)
        .map(|s| {
            let n = s.pixel_count as f64;
            let center = Vector2::new(
                (s.sum_col as f64 / n) as f32,
                (s.sum_row as f64 / n) as f32,
            );
            Spot::new(center, s.pixel_count)
        })
        .collect()
}

fn connected_weighted(stats: &[ComponentStats], min_area: u32) -> Vec<Spot> {
    stats
        .iter()
        .filter(|s| s.pixel_count > min_area && s.weight > 0)
        .map(|s| {
            let weight = s.weight as f64;
            let center = Vector2::new(
                (s.weighted_col as f64 / weight) as f32,
                (s.weighted_row as f64 / weight) as f32,
            );
            Spot::new(center, s.pixel_count)
        })
        .collect()
}

fn contour_spots(
    frame: &Frame,
    map: &LabelMap,
    stats: &[ComponentStats],
    method: CentroidMethod,
    min_area: u32,
) -> Vec<Spot> {
    let rows = frame.rows();
    let cols = frame.cols();
    let min_radius = (min_area as f64 / PI).sqrt();

    let mut spots = Vec::new();
    for (slot, s) in stats.iter().enumerate() {
        let lbl = slot as u32 + 1;
        let boundary = trace_boundary(&map.labels, rows, cols, lbl, s.first);
        let points: Vec<(f64, f64)> = boundary
            .iter()
            .map(|&(col, row)| (col as f64, row as f64))
            .collect();
        let circle = min_enclosing_circle(&points);
        if circle.radius <= min_radius {
            continue;
        }

        match method {
            CentroidMethod::ContourGeometric => {
                let area = (PI * circle.radius * circle.radius).ceil() as u32;
                spots.push(Spot::new(
                    Vector2::new(circle.cx as f32, circle.cy as f32),
                    area,
                ));
            }
            CentroidMethod::ContourWeighted => {
                if let Some(spot) = weighted_in_contour(frame, map, lbl, s, min_area) {
                    spots.push(spot);
                }
            }
            CentroidMethod::ContourBboxWeighted => {
                if let Some(spot) = weighted_in_bbox(frame, s, min_area) {
                    spots.push(spot);
                }
            }
            _ => unreachable!("connected-component methods handled by caller"),
        }
    }
    spots
}

/// Intensity-weighted centroid over the filled contour (component plus
/// enclosed holes). Area is the count of nonzero pixels inside it.
fn weighted_in_contour(
    frame: &Frame,
    map: &LabelMap,
    lbl: u32,
    s: &ComponentStats,
    min_area: u32,
) -> Option<Spot> {
    let cols = frame.cols();
    let bbox = (s.min_row, s.min_col, s.max_row, s.max_col);
    let mask = filled_region(&map.labels, frame.rows(), cols, lbl, bbox);
    let bw = s.max_col - s.min_col + 1;

    let mut weight = 0u64;
    let mut weighted_col = 0u64;
    let mut weighted_row = 0u64;
    let mut area = 0u32;
    for row in s.min_row..=s.max_row {
        for col in s.min_col..=s.max_col {
            if !mask[(row - s.min_row) * bw + (col - s.min_col)] {
                continue;
            }
            let value = frame.data()[row * cols + col] as u64;
            if value > 0 {
                area += 1;
            }
            weight += value;
            weighted_col += (col - s.min_col) as u64 * value;
            weighted_row += (row - s.min_row) as u64 * value;
        }
    }

    if area <= min_area || weight == 0 {
        return None;
    }
    let center = Vector2::new(
        (s.min_col as f64 + weighted_col as f64 / weight as f64) as f32,
        (s.min_row as f64 + weighted_row as f64 / weight as f64) as f32,
    );
    Some(Spot::new(center, area))
}

/// Intensity-weighted centroid over the contour's bounding rectangle.
/// Area is the rectangle area.
fn weighted_in_bbox(frame: &Frame, s: &ComponentStats, min_area: u32) -> Option<Spot> {
    let cols = frame.cols();

    let mut weight = 0u64;
    let mut weighted_col = 0u64;
    let mut weighted_row = 0u64;
    for row in s.min_row..=s.max_row {
        for col in s.min_col..=s.max_col {
            let value = frame.data()[row * cols + col] as u64;
            weight += value;
            weighted_col += (col - s.min_col) as u64 * value;
            weighted_row += (row - s.min_row) as u64 * value;
        }
    }

    let area = ((s.max_row - s.min_row + 1) * (s.max_col - s.min_col + 1)) as u32;
    if area <= min_area || weight == 0 {
        return None;
    }
    let center = Vector2::new(
        (s.min_col as f64 + weighted_col as f64 / weight as f64) as f32,
        (s.min_row as f64 + weighted_row as f64 / weight as f64) as f32,
    );
    Some(Spot::new(center, area))
}
