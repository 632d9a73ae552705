//! K-vector index (back-end B).
//!
//! A θ-sorted feature list paired with the envelope line `y(j) = Q + M·j`
//! and the integer array `K`, where `K[j]` is the index of the last feature
//! with `θ ≤ y(j)`. A query interval translates to line steps in constant
//! time and the answer is a contiguous slice of the feature list — always a
//! superset of the exact answer, which callers post-filter if they need
//! tight bounds.

use std::path::Path;

use tracing::info;

use super::{Feature, FeatureCatalog};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct KVector {
    q: f32,
    m: f32,
    /// `k[j]` = index of the last feature with `θ ≤ q + m·j`; -1 when no
    /// feature is below the envelope at step `j`.
    k: Vec<i64>,
    /// Sorted by θ ascending.
    features: Vec<Feature>,
}

impl KVector {
    /// Build an index from parallel arrays. `k` and `features` must be the
    /// same length, with `features` sorted by θ ascending and `k`
    /// non-decreasing.
    pub fn new(q: f32, m: f32, k: Vec<i64>, features: Vec<Feature>) -> Result<Self> {
        if k.len() != features.len() {
            return Err(Error::InvalidArgument(format!(
                "k-vector length {} does not match feature count {}",
                k.len(),
                features.len()
            )));
        }
        Ok(Self { q, m, k, features })
    }

    /// Load the plain-text k-vector format: a `Q M` header line followed by
    /// one `k_j id1 id2 theta` record per line, sorted by θ ascending.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| Error::io(path, "empty k-vector file"))?;
        let mut fields = header.split_whitespace();
        let parse_header = |field: Option<&str>| -> Option<f32> { field?.parse().ok() };
        let q = parse_header(fields.next())
            .ok_or_else(|| Error::io(path, "bad Q in k-vector header"))?;
        let m = parse_header(fields.next())
            .ok_or_else(|| Error::io(path, "bad M in k-vector header"))?;

        let mut k = Vec::new();
        let mut features = Vec::new();
        for (lineno, line) in lines.enumerate() {
            let mut fields = line.split_whitespace();
            let parsed = (|| {
                let kj: i64 = fields.next()?.parse().ok()?;
                let id1: i32 = fields.next()?.parse().ok()?;
                let id2: i32 = fields.next()?.parse().ok()?;
                let theta: f32 = fields.next()?.parse().ok()?;
                Some((kj, Feature::new(id1, id2, theta)))
            })();
            match parsed {
                Some((kj, f)) => {
                    k.push(kj);
                    features.push(f);
                }
                None => {
                    return Err(Error::io(
                        path,
                        format!("bad k-vector record on line {}", lineno + 2),
                    ))
                }
            }
        }

        info!(
            "loaded k-vector index ({} features, Q={}, M={}) from {}",
            features.len(),
            q,
            m,
            path.display()
        );
        Self::new(q, m, k, features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Translate a θ interval into an inclusive slice of the feature list.
    ///
    /// Steps that fall outside the envelope's range fall back to the
    /// corresponding end of the table, so `K` is never indexed out of range
    /// and the slice remains a superset of the exact answer.
    fn slice_bounds(&self, lo: f32, hi: f32) -> Option<(usize, usize)> {
        let n = self.features.len();
        if n == 0 || self.m == 0.0 {
            return if n == 0 { None } else { Some((0, n - 1)) };
        }

        let j_bottom = ((lo - self.q) / self.m).floor();
        let j_top = ((hi - self.q) / self.m).ceil();

        let start = if j_bottom.is_finite() && j_bottom >= 0.0 && (j_bottom as usize) < n {
            (self.k[j_bottom as usize] + 1).max(0) as usize
        } else {
            0
        };
        let end = if j_top.is_finite() && j_top >= 0.0 && (j_top as usize) < n {
            self.k[j_top as usize].min(n as i64 - 1)
        } else {
            n as i64 - 1
        };

        if end < 0 || start > end as usize {
            return None;
        }
        Some((start, end as usize))
    }
}

impl FeatureCatalog for KVector {
    /// The contiguous superset slice for `(lo, hi)`; no exact filtering.
    fn range(&self, lo: f32, hi: f32) -> Result<Vec<Feature>> {
        Ok(match self.slice_bounds(lo, hi) {
            Some((start, end)) => self.features[start..=end].to_vec(),
            None => Vec::new(),
        })
    }

    fn range_with_id(&self, lo: f32, hi: f32, id: i32) -> Result<Vec<Feature>> {
        let mut out = self.range(lo, hi)?;
        out.retain(|f| f.contains(id));
        Ok(out)
    }

    fn pair(&self, a: i32, b: i32) -> Result<Option<Feature>> {
        let key = (a.min(b), a.max(b));
        Ok(self
            .features
            .iter()
            .find(|f| (f.id1, f.id2) == key)
            .copied())
    }
}
