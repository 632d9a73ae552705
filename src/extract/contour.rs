//! External contour support: Moore-neighbor boundary tracing, hole-inclusive
//! region filling, and minimum enclosing circles.
//!
//! Contours are traced over the label image produced by
//! [`label_components`](super::label::label_components), one external
//! boundary per 8-connected component, starting from the component's first
//! raster pixel.

/// Moore neighborhood in clockwise order for y-down screen coordinates:
/// E, SE, S, SW, W, NW, N, NE as (dcol, drow).
const NEIGHBORS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn direction_index(from: (i64, i64), to: (i64, i64)) -> usize {
    let step = (to.0 - from.0, to.1 - from.1);
    NEIGHBORS
        .iter()
        .position(|&d| d == step)
        .expect("cells are Moore neighbors")
}

/// Trace the external boundary of the component `label`, clockwise, starting
/// from its first raster pixel `start` (topmost row, leftmost column).
///
/// Returns boundary pixels as `(col, row)`. A single-pixel component yields
/// a one-point contour.
pub fn trace_boundary(
    labels: &[u32],
    rows: usize,
    cols: usize,
    label: u32,
    start: (usize, usize),
) -> Vec<(usize, usize)> {
    let on_component = |col: i64, row: i64| -> bool {
        col >= 0
            && row >= 0
            && (col as usize) < cols
            && (row as usize) < rows
            && labels[row as usize * cols + col as usize] == label
    };

    let start = (start.1 as i64, start.0 as i64); // (col, row)
    let mut contour = Vec::new();
    let mut current = start;
    // The raster scan reaches the start pixel from the west, so the first
    // clockwise sweep begins just past its west neighbor.
    let mut backtrack = (start.0 - 1, start.1);
    let mut first_move: Option<(i64, i64)> = None;

    // Bounded for safety on pathologically pinched boundaries; the trace
    // normally terminates when the opening move repeats.
    let max_steps = 8 * rows * cols + 8;
    for _ in 0..max_steps {
        let mut dir = direction_index(current, backtrack);
        let mut next = None;
        for _ in 0..8 {
            dir = (dir + 1) % 8;
            let cand = (current.0 + NEIGHBORS[dir].0, current.1 + NEIGHBORS[dir].1);
            if on_component(cand.0, cand.1) {
                next = Some(cand);
                break;
            }
        }

        let Some(next) = next else {
            // Isolated pixel: the contour is the pixel itself.
            contour.push((current.0 as usize, current.1 as usize));
            break;
        };

        if current == start {
            match first_move {
                Some(fm) if fm == next => break,
                Some(_) => {}
                None => first_move = Some(next),
            }
        }

        contour.push((current.0 as usize, current.1 as usize));
        backtrack = current;
        current = next;
    }

    contour
}

/// Region enclosed by a component's external boundary: the component pixels
/// plus any holes, computed by flood-filling the complement from outside the
/// bounding box. Returns a row-major mask over the (inclusive) bounding box.
pub fn filled_region(
    labels: &[u32],
    rows: usize,
    cols: usize,
    label: u32,
    bbox: (usize, usize, usize, usize), // (min_row, min_col, max_row, max_col)
) -> Vec<bool> {
    let (r0, c0, r1, c1) = bbox;
    let bh = r1 - r0 + 1;
    let bw = c1 - c0 + 1;

    // Padded grid, one background cell around the box, so the outside is a
    // single 4-connected region.
    let ph = bh + 2;
    let pw = bw + 2;
    let is_component = |pi: usize, pj: usize| -> bool {
        if pi == 0 || pj == 0 || pi > bh || pj > bw {
            return false;
        }
        let row = r0 + pi - 1;
        let col = c0 + pj - 1;
        row < rows && col < cols && labels[row * cols + col] == label
    };

    let mut outside = vec![false; ph * pw];
    let mut stack = vec![(0usize, 0usize)];
    outside[0] = true;
    while let Some((pi, pj)) = stack.pop() {
        let mut visit = |ni: usize, nj: usize, outside: &mut Vec<bool>, stack: &mut Vec<(usize, usize)>| {
            let idx = ni * pw + nj;
            if !outside[idx] && !is_component(ni, nj) {
                outside[idx] = true;
                stack.push((ni, nj));
            }
        };
        if pi > 0 {
            visit(pi - 1, pj, &mut outside, &mut stack);
        }
        if pi + 1 < ph {
            visit(pi + 1, pj, &mut outside, &mut stack);
        }
        if pj > 0 {
            visit(pi, pj - 1, &mut outside, &mut stack);
        }
        if pj + 1 < pw {
            visit(pi, pj + 1, &mut outside, &mut stack);
        }
    }

    let mut mask = vec![false; bh * bw];
    for i in 0..bh {
        for j in 0..bw {
            mask[i * bw + j] = !outside[(i + 1) * pw + (j + 1)];
        }
    }
    mask
}

// ── Minimum enclosing circle ────────────────────────────────────────────────

const CIRCLE_EPS: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl Circle {
    fn contains(&self, p: (f64, f64)) -> bool {
        let dx = p.0 - self.cx;
        let dy = p.1 - self.cy;
        (dx * dx + dy * dy).sqrt() <= self.radius + CIRCLE_EPS
    }
}

fn circle_two(a: (f64, f64), b: (f64, f64)) -> Circle {
    let cx = (a.0 + b.0) / 2.0;
    let cy = (a.1 + b.1) / 2.0;
    let radius = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
    Circle { cx, cy, radius }
}

fn circle_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Circle {
    // Circumcircle; degenerate (collinear) triples fall back to the widest
    // two-point circle.
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < 1e-12 {
        let ab = circle_two(a, b);
        let ac = circle_two(a, c);
        let bc = circle_two(b, c);
        let mut widest = ab;
        if ac.radius > widest.radius {
            widest = ac;
        }
        if bc.radius > widest.radius {
            widest = bc;
        }
        return widest;
    }
    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let radius = ((a.0 - cx).powi(2) + (a.1 - cy).powi(2)).sqrt();
    Circle { cx, cy, radius }
}

/// Minimum enclosing circle of a point set (Welzl's incremental scheme,
/// deterministic for a given point order).
pub fn min_enclosing_circle(points: &[(f64, f64)]) -> Circle {
    if points.is_empty() {
        return Circle {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
        };
    }

    let mut circle = Circle {
        cx: points[0].0,
        cy: points[0].1,
        radius: 0.0,
    };
    for i in 1..points.len() {
        if circle.contains(points[i]) {
            continue;
        }
        circle = Circle {
            cx: points[i].0,
            cy: points[i].1,
            radius: 0.0,
        };
        for j in 0..i {
            if circle.contains(points[j]) {
                continue;
            }
            circle = circle_two(points[i], points[j]);
            for k in 0..j {
                if !circle.contains(points[k]) {
                    circle = circle_three(points[i], points[j], points[k]);
                }
            }
        }
    }
    circle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::label::label_components;
    use crate::frame::Frame;

    fn frame_from_rows(rows: &[&[u8]]) -> Frame {
        let h = rows.len();
        let w = rows[0].len();
        let data: Vec<u8> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Frame::from_vec(h, w, data).unwrap()
    }

    fn first_pixel(labels: &[u32], cols: usize, label: u32) -> (usize, usize) {
        let idx = labels.iter().position(|&l| l == label).unwrap();
        (idx / cols, idx % cols)
    }

    #[test]
    fn test_boundary_of_square() {
        let frame = frame_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 9, 9, 9, 0],
            &[0, 9, 9, 9, 0],
            &[0, 9, 9, 9, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let map = label_components(&frame);
        let start = first_pixel(&map.labels, 5, 1);
        let contour = trace_boundary(&map.labels, 5, 5, 1, start);

        // Boundary of a 3x3 square is its 8 perimeter pixels
        assert_eq!(contour.len(), 8);
        assert!(!contour.contains(&(2, 2)), "interior pixel in contour");
    }

    #[test]
    fn test_boundary_single_pixel() {
        let frame = frame_from_rows(&[&[0, 0], &[0, 9]]);
        let map = label_components(&frame);
        let contour = trace_boundary(&map.labels, 2, 2, 1, (1, 1));
        assert_eq!(contour, vec![(1, 1)]);
    }

    #[test]
    fn test_filled_region_includes_holes() {
        // Ring with a below-threshold center: the fill covers the hole
        let frame = frame_from_rows(&[
            &[9, 9, 9],
            &[9, 0, 9],
            &[9, 9, 9],
        ]);
        let map = label_components(&frame);
        let mask = filled_region(&map.labels, 3, 3, 1, (0, 0, 2, 2));
        assert!(mask.iter().all(|&inside| inside));
    }

    #[test]
    fn test_filled_region_excludes_outside_notch() {
        // L-shape: the empty corner is reachable from outside the box
        let frame = frame_from_rows(&[
            &[9, 0],
            &[9, 9],
        ]);
        let map = label_components(&frame);
        let mask = filled_region(&map.labels, 2, 2, 1, (0, 0, 1, 1));
        assert_eq!(mask, vec![true, false, true, true]);
    }

    #[test]
    fn test_min_circle_two_points() {
        let circle = min_enclosing_circle(&[(0.0, 0.0), (4.0, 0.0)]);
        assert!((circle.cx - 2.0).abs() < 1e-9);
        assert!(circle.cy.abs() < 1e-9);
        assert!((circle.radius - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_circle_square_corners() {
        let pts = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)];
        let circle = min_enclosing_circle(&pts);
        assert!((circle.cx - 1.0).abs() < 1e-9);
        assert!((circle.cy - 1.0).abs() < 1e-9);
        assert!((circle.radius - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_min_circle_interior_point_ignored() {
        let pts = [(0.0, 0.0), (4.0, 0.0), (2.0, 1.0)];
        let circle = min_enclosing_circle(&pts);
        assert!((circle.radius - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_circle_collinear() {
        let pts = [(0.0, 0.0), (1.0, 1.0), (3.0, 3.0)];
        let circle = min_enclosing_circle(&pts);
        let expected = (18.0_f64).sqrt() / 2.0;
        assert!((circle.radius - expected).abs() < 1e-9);
    }
}
