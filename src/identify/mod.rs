//! Catalog identification: map a list of direction vectors to catalog ids.
//!
//! [`StarIdentifier`] owns the loaded catalog back-ends and is read-only
//! during queries; run one instance per thread if you need parallel
//! identification. Every method reports per-spot results in input order,
//! with `-1` marking a false star.

mod pyramid;
mod two_star;

use std::path::Path;

use tracing::info;

use crate::catalog::{Feature, FeatureCatalog, FeatureTable, KVector};
use crate::error::{Error, Result};
use crate::Vector3;

/// Identification algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentificationMethod {
    /// Two-star voting with vote-minimization validation, over the indexed
    /// feature table.
    TwoStar,
    /// Pyramid (triad plus confirming fourth star), over the indexed
    /// feature table.
    PyramidIndexed,
    /// Pyramid over the k-vector index.
    PyramidKVector,
}

/// Identification session: owns the catalog back-ends.
#[derive(Debug, Default)]
pub struct StarIdentifier {
    table: Option<FeatureTable>,
    kvector: Option<KVector>,
}

impl StarIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the indexed feature table from `id1 id2 theta` lines.
    pub fn load_feature_table(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.table = Some(FeatureTable::from_file(path)?);
        Ok(())
    }

    pub fn set_feature_table(&mut self, table: FeatureTable) {
        self.table = Some(table);
    }

    /// Load the k-vector index from its plain-text format.
    pub fn load_kvector(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.kvector = Some(KVector::from_file(path)?);
        Ok(())
    }

    pub fn set_kvector(&mut self, kvector: KVector) {
        self.kvector = Some(kvector);
    }

    /// Identify each direction vector against the catalog.
    ///
    /// `eps` is the angular tolerance in degrees applied to every θ
    /// comparison. The result has one entry per input vector, in input
    /// order: a catalog id, or `-1` for an unidentified/false star.
    pub fn identify(
        &self,
        vectors: &[Vector3],
        eps: f32,
        method: IdentificationMethod,
    ) -> Result<Vec<i32>> {
        if !eps.is_finite() || eps < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "tolerance must be a non-negative angle in degrees, got {eps}"
            )));
        }

        let ids = match method {
            IdentificationMethod::TwoStar => two_star::identify(self.table()?, vectors, eps)?,
            IdentificationMethod::PyramidIndexed => {
                pyramid::identify(self.table()?, vectors, eps)?
            }
            IdentificationMethod::PyramidKVector => {
                pyramid::identify(self.kvector()?, vectors, eps)?
            }
        };

        info!(
            "identified {} of {} spots ({:?})",
            ids.iter().filter(|&&id| id >= 0).count(),
            vectors.len(),
            method
        );
        Ok(ids)
    }

    fn table(&self) -> Result<&FeatureTable> {
        self.table.as_ref().ok_or(Error::CatalogUnavailable)
    }

    fn kvector(&self) -> Result<&KVector> {
        self.kvector.as_ref().ok_or(Error::CatalogUnavailable)
    }
}

/// Angular separation between two direction vectors, in degrees.
///
/// The dot product is clamped to `[-1, 1]` before `acos`; floating clipping
/// must never surface as NaN.
pub(crate) fn pair_angle(a: &Vector3, b: &Vector3) -> f32 {
    let dot = a.dot(b) / (a.norm() * b.norm());
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Catalog window query with exact bounds: the k-vector back-end
/// over-selects, so the slice is filtered down to the open interval.
pub(crate) fn query_window<C: FeatureCatalog + ?Sized>(
    catalog: &C,
    theta: f32,
    eps: f32,
) -> Result<Vec<Feature>> {
    let (lo, hi) = (theta - eps, theta + eps);
    let mut out = catalog.range(lo, hi)?;
    out.retain(|f| f.theta > lo && f.theta < hi);
    Ok(out)
}

/// Like [`query_window`], restricted to features containing `id`.
pub(crate) fn query_window_with_id<C: FeatureCatalog + ?Sized>(
    catalog: &C,
    theta: f32,
    eps: f32,
    id: i32,
) -> Result<Vec<Feature>> {
    let (lo, hi) = (theta - eps, theta + eps);
    let mut out = catalog.range_with_id(lo, hi, id)?;
    out.retain(|f| f.theta > lo && f.theta < hi);
    Ok(out)
}
