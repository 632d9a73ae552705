//! In-memory indexed feature table (back-end A).
//!
//! The reference stand-in for the external indexed store: features sorted by
//! θ with binary-searched range queries returning exactly the records whose
//! angle lies strictly between the bounds, plus a hash index for id-pair
//! lookups. Deterministic and side-effect-free, as the store contract
//! requires.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::{Feature, FeatureCatalog};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    /// Sorted by θ ascending.
    features: Vec<Feature>,
    /// `(id1, id2)` with `id1 < id2` → index into `features`.
    pairs: HashMap<(i32, i32), usize>,
}

impl FeatureTable {
    /// Build a table from features in any order; ids are normalized so
    /// `id1 < id2` and the list is sorted by θ.
    pub fn new(mut features: Vec<Feature>) -> Self {
        for f in features.iter_mut() {
            *f = Feature::new(f.id1, f.id2, f.theta);
        }
        features.sort_by(|a, b| a.theta.total_cmp(&b.theta));

        let pairs = features
            .iter()
            .enumerate()
            .map(|(i, f)| ((f.id1, f.id2), i))
            .collect();
        Self { features, pairs }
    }

    /// Load a table from whitespace-separated `id1 id2 theta` lines.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut features = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parsed = (|| {
                let id1: i32 = fields.next()?.parse().ok()?;
                let id2: i32 = fields.next()?.parse().ok()?;
                let theta: f32 = fields.next()?.parse().ok()?;
                Some(Feature::new(id1, id2, theta))
            })();
            match parsed {
                Some(f) => features.push(f),
                None => {
                    return Err(Error::io(
                        path,
                        format!("bad feature record on line {}", lineno + 1),
                    ))
                }
            }
        }

        info!("loaded {} features from {}", features.len(), path.display());
        Ok(Self::new(features))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }
}

impl FeatureCatalog for FeatureTable {
    fn range(&self, lo: f32, hi: f32) -> Result<Vec<Feature>> {
        let start = self.features.partition_point(|f| f.theta <= lo);
        let end = self.features.partition_point(|f| f.theta < hi);
        Ok(self.features[start..end.max(start)].to_vec())
    }

    fn range_with_id(&self, lo: f32, hi: f32, id: i32) -> Result<Vec<Feature>> {
        let mut out = self.range(lo, hi)?;
        out.retain(|f| f.contains(id));
        Ok(out)
    }

    fn pair(&self, a: i32, b: i32) -> Result<Option<Feature>> {
        let key = (a.min(b), a.max(b));
        Ok(self.pairs.get(&key).map(|&i| self.features[i]))
    }
}
