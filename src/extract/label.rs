//! Two-pass connected-component labelling over a thresholded frame.
//!
//! Foreground is every nonzero pixel. Components are 8-connected. Labels are
//! assigned in raster first-encounter order of each component's root, so the
//! numbering (and therefore downstream spot order) is deterministic for a
//! given frame.

use std::collections::HashMap;

use crate::frame::Frame;

/// Label image plus the number of components found.
#[derive(Debug)]
pub struct LabelMap {
    /// Per-pixel label, row-major; 0 is background, components are 1..=count.
    pub labels: Vec<u32>,
    pub count: usize,
}

/// Union-find over provisional labels, path-halving, smaller root wins so
/// final numbering follows raster order.
struct Equivalences {
    parent: Vec<u32>,
}

impl Equivalences {
    fn new() -> Self {
        // Slot 0 is the background and its own root.
        Self { parent: vec![0] }
    }

    fn make_label(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else if rb < ra {
            self.parent[ra as usize] = rb;
        }
    }
}

/// Label the 8-connected nonzero components of `frame`.
pub fn label_components(frame: &Frame) -> LabelMap {
    let w = frame.cols();
    let h = frame.rows();
    let pixels = frame.data();

    let mut labels = vec![0u32; w * h];
    let mut eq = Equivalences::new();

    // First pass: provisional labels from the four already-visited
    // neighbors (west, north-west, north, north-east).
    for row in 0..h {
        for col in 0..w {
            let idx = row * w + col;
            if pixels[idx] == 0 {
                continue;
            }

            let mut neighbors = [0u32; 4];
            let mut n = 0;
            if col > 0 && labels[idx - 1] > 0 {
                neighbors[n] = labels[idx - 1];
                n += 1;
            }
            if row > 0 {
                if col > 0 && labels[idx - w - 1] > 0 {
                    neighbors[n] = labels[idx - w - 1];
                    n += 1;
                }
                if labels[idx - w] > 0 {
                    neighbors[n] = labels[idx - w];
                    n += 1;
                }
                if col + 1 < w && labels[idx - w + 1] > 0 {
                    neighbors[n] = labels[idx - w + 1];
                    n += 1;
                }
            }

            if n == 0 {
                labels[idx] = eq.make_label();
            } else {
                let min = *neighbors[..n].iter().min().unwrap();
                labels[idx] = min;
                for &other in &neighbors[..n] {
                    eq.union(min, other);
                }
            }
        }
    }

    // Second pass: collapse equivalences into sequential labels, numbered
    // by first raster encounter of each root.
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut next = 1u32;
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = eq.find(*label);
        *label = *remap.entry(root).or_insert_with(|| {
            let assigned = next;
            next += 1;
            assigned
        });
    }

    LabelMap {
        labels,
        count: (next - 1) as usize,
    }
}
