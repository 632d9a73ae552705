//! Pyramid identification: a uniquely-matched triad of spots, accepted once
//! a fourth star confirms it, then used to identify every remaining spot.
//!
//! Triads are visited in the order suggested by Mortari's pyramid paper:
//! outer loop over the first index gap `dj`, then the second gap `dk`, then
//! the base index `i`. This reaches widely-separated spot combinations early
//! instead of dwelling on neighbors of a possibly-false first spot.

use tracing::debug;

use super::{pair_angle, query_window, query_window_with_id};
use crate::catalog::{Feature, FeatureCatalog};
use crate::error::{Error, Result};
use crate::Vector3;

pub(crate) fn identify<C: FeatureCatalog + ?Sized>(
    catalog: &C,
    vectors: &[Vector3],
    eps: f32,
) -> Result<Vec<i32>> {
    let n = vectors.len();
    if n < 4 {
        return Err(Error::InsufficientInputs { needed: 4, got: n });
    }

    for dj in 1..(n - 1) {
        for dk in 1..(n - dj) {
            for i in 0..(n - dj - dk) {
                let j = i + dj;
                let k = j + dk;

                let theta_ij = pair_angle(&vectors[i], &vectors[j]);
                let theta_ik = pair_angle(&vectors[i], &vectors[k]);
                let theta_jk = pair_angle(&vectors[j], &vectors[k]);

                let list_ij = query_window(catalog, theta_ij, eps)?;
                if list_ij.is_empty() {
                    continue;
                }
                let list_ik = query_window(catalog, theta_ik, eps)?;
                if list_ik.is_empty() {
                    continue;
                }
                let list_jk = query_window(catalog, theta_jk, eps)?;
                if list_jk.is_empty() {
                    continue;
                }

                let Some((cat_i, cat_j, cat_k)) = unique_triad(&list_ij, &list_ik, &list_jk)
                else {
                    continue;
                };

                // Tentatively commit the triad, then look for a confirming
                // fourth star. Every remaining spot confirms independently.
                let mut ids = vec![-1i32; n];
                ids[i] = cat_i;
                ids[j] = cat_j;
                ids[k] = cat_k;

                let mut confirmed = false;
                for r in 0..n {
                    if r == i || r == j || r == k {
                        continue;
                    }
                    if let Some(id) =
                        confirm_spot(catalog, vectors, [i, j, k], [cat_i, cat_j, cat_k], r, eps)?
                    {
                        ids[r] = id;
                        confirmed = true;
                    }
                }

                if confirmed {
                    debug!(
                        "triad ({i}, {j}, {k}) -> ({cat_i}, {cat_j}, {cat_k}) confirmed"
                    );
                    return Ok(ids);
                }
            }
        }
    }

    // No triad ever confirmed
    Ok(vec![-1; n])
}

/// Search the three candidate lists for triangles consistent with the
/// observed angles. Returns the match only when it is unique.
fn unique_triad(
    list_ij: &[Feature],
    list_ik: &[Feature],
    list_jk: &[Feature],
) -> Option<(i32, i32, i32)> {
    let mut found = None;
    let mut count = 0usize;

    for f_ij in list_ij {
        for f_ik in list_ik {
            // The star shared by the IJ and IK features is I
            let cat_i = if f_ij.contains(f_ik.id1) {
                f_ik.id1
            } else if f_ij.contains(f_ik.id2) {
                f_ik.id2
            } else {
                continue;
            };
            let cat_j = f_ij.other(cat_i);
            let cat_k = f_ik.other(cat_i);

            if list_jk
                .iter()
                .any(|f| f.contains(cat_j) && f.contains(cat_k))
            {
                found = Some((cat_i, cat_j, cat_k));
                count += 1;
            }
        }
    }

    if count == 1 {
        found
    } else {
        None
    }
}

/// Identify spot `r` against an accepted triad: its three angles to the
/// triad stars are queried with the known id as a filter, and the match is
/// the unique id appearing in all three lists.
fn confirm_spot<C: FeatureCatalog + ?Sized>(
    catalog: &C,
    vectors: &[Vector3],
    triad: [usize; 3],
    triad_ids: [i32; 3],
    r: usize,
    eps: f32,
) -> Result<Option<i32>> {
    let theta_ir = pair_angle(&vectors[triad[0]], &vectors[r]);
    let list_ir = query_window_with_id(catalog, theta_ir, eps, triad_ids[0])?;
    if list_ir.is_empty() {
        return Ok(None);
    }

    let theta_jr = pair_angle(&vectors[triad[1]], &vectors[r]);
    let list_jr = query_window_with_id(catalog, theta_jr, eps, triad_ids[1])?;
    if list_jr.is_empty() {
        return Ok(None);
    }

    let theta_kr = pair_angle(&vectors[triad[2]], &vectors[r]);
    let list_kr = query_window_with_id(catalog, theta_kr, eps, triad_ids[2])?;
    if list_kr.is_empty() {
        return Ok(None);
    }

    let mut found = None;
    let mut count = 0usize;
    let mut candidates_seen: Vec<i32> = Vec::new();
    for f in &list_ir {
        let candidate = f.other(triad_ids[0]);
        if candidates_seen.contains(&candidate) {
            continue;
        }
        candidates_seen.push(candidate);

        if list_jr.iter().any(|f| f.contains(candidate))
            && list_kr.iter().any(|f| f.contains(candidate))
        {
            found = Some(candidate);
            count += 1;
        }
    }

    Ok(if count == 1 { found } else { None })
}
