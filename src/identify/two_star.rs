//! Two-star voting identification.
//!
//! Every observed pair of spots votes for the catalog stars whose features
//! fall inside the tolerance window around the observed angle; each spot's
//! tentative id is its highest-voted candidate. A validation loop then
//! cross-checks every identified pair against the catalog and repeatedly
//! demotes the least-confirmed spot until every survivor is confirmed by all
//! of its identifiable peers.

use std::collections::BTreeMap;

use tracing::debug;

use super::{pair_angle, query_window};
use crate::catalog::FeatureCatalog;
use crate::error::Result;
use crate::Vector3;

pub(crate) fn identify<C: FeatureCatalog + ?Sized>(
    catalog: &C,
    vectors: &[Vector3],
    eps: f32,
) -> Result<Vec<i32>> {
    let n = vectors.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // ── Voting phase ──
    // Observed features are every (i, j, θ) with i < j, in input order.
    // BTreeMap keys keep candidate iteration in ascending id order, which
    // makes vote ties resolve to the smaller catalog id.
    let mut votes: Vec<BTreeMap<i32, u32>> = vec![BTreeMap::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let theta = pair_angle(&vectors[i], &vectors[j]);
            for feature in query_window(catalog, theta, eps)? {
                // The pair is symmetric: both spots collect both candidates
                for id in [feature.id1, feature.id2] {
                    *votes[i].entry(id).or_insert(0) += 1;
                    *votes[j].entry(id).or_insert(0) += 1;
                }
            }
        }
    }

    // ── Initial assignment ──
    let mut ids: Vec<i32> = Vec::with_capacity(n);
    let mut false_stars: i64 = 0;
    for candidate_votes in &votes {
        match best_candidate(candidate_votes) {
            Some(id) => ids.push(id),
            None => {
                ids.push(-1);
                false_stars += 1;
            }
        }
    }
    debug!(
        "voting done: {} tentative ids, {} false stars",
        n as i64 - false_stars,
        false_stars
    );

    // ── Validation phase ──
    // Each identified spot must be confirmed against every other
    // identifiable spot: confirm count >= n - false_stars - 1. False stars
    // are parked at n so they never become the weakest link.
    let mut confirms = vec![0i64; n];
    loop {
        for (c, id) in confirms.iter_mut().zip(ids.iter()) {
            *c = if *id < 0 { n as i64 } else { 0 };
        }
        for i in 0..n {
            if ids[i] < 0 {
                continue;
            }
            for j in (i + 1)..n {
                if ids[j] < 0 {
                    continue;
                }
                if let Some(feature) = catalog.pair(ids[i], ids[j])? {
                    let observed = pair_angle(&vectors[i], &vectors[j]);
                    if (feature.theta - observed).abs() <= eps {
                        confirms[i] += 1;
                        confirms[j] += 1;
                    }
                }
            }
        }

        let threshold = n as i64 - false_stars - 1;
        // Weakest link: first index among the minima
        let (weakest, &min_confirms) = confirms
            .iter()
            .enumerate()
            .min_by_key(|&(_, &c)| c)
            .expect("n > 0");
        if min_confirms >= threshold {
            break;
        }

        // Demote the weakest spot's current id and fall back to its next
        // best candidate, or mark it false when none is left.
        if let Some(count) = votes[weakest].get_mut(&ids[weakest]) {
            *count = 0;
        }
        match best_candidate(&votes[weakest]) {
            Some(id) => ids[weakest] = id,
            None => {
                ids[weakest] = -1;
                false_stars += 1;
            }
        }
    }

    // Clear anything that ended below the acceptance threshold
    let threshold = n as i64 - false_stars - 1;
    for (id, &confirmed) in ids.iter_mut().zip(confirms.iter()) {
        if *id >= 0 && confirmed < threshold {
            *id = -1;
        }
    }

    Ok(ids)
}

/// Highest-voted candidate with at least one vote; ties go to the smaller
/// id via the map's ascending iteration order.
fn best_candidate(votes: &BTreeMap<i32, u32>) -> Option<i32> {
    let mut best: Option<(i32, u32)> = None;
    for (&id, &count) in votes {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((id, count)),
        }
    }
    best.map(|(id, _)| id)
}
