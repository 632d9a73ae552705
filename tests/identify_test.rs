//! Identifier properties over synthetic catalogs with known geometry.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use starident::{
    Error, Feature, FeatureCatalog, FeatureTable, IdentificationMethod, KVector, StarIdentifier,
    Vector3,
};

/// Angular separation in degrees, computed the same way the identifier
/// compares observed and catalog angles.
fn angle_deg(a: &Vector3, b: &Vector3) -> f32 {
    let dot = a.dot(b) / (a.norm() * b.norm());
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Six directions scattered around the boresight; every pairwise angle is
/// distinct and separated from its neighbors by at least ~0.1 degrees.
fn star_field() -> Vec<Vector3> {
    [
        (0.000f32, 0.000f32),
        (0.060, 0.010),
        (-0.040, 0.055),
        (0.085, -0.065),
        (-0.080, -0.050),
        (0.020, 0.100),
    ]
    .iter()
    .map(|&(x, y)| Vector3::new(x, y, 1.0).normalize())
    .collect()
}

/// Catalog of every pairwise feature, star `i` assigned id `i + 1`.
fn field_features(vectors: &[Vector3]) -> Vec<Feature> {
    let mut features = Vec::new();
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            features.push(Feature::new(
                i as i32 + 1,
                j as i32 + 1,
                angle_deg(&vectors[i], &vectors[j]),
            ));
        }
    }
    features
}

/// Build a well-formed k-vector over the features: Q just below the smallest
/// θ, M chosen so the envelope line reaches past the largest.
fn build_kvector(mut features: Vec<Feature>) -> KVector {
    features.sort_by(|a, b| a.theta.total_cmp(&b.theta));
    let n = features.len();
    let theta_min = features[0].theta;
    let theta_max = features[n - 1].theta;
    let q = theta_min - 1e-3;
    let m = (theta_max - q + 1e-3) / (n - 1).max(1) as f32;

    let k = (0..n)
        .map(|j| {
            let envelope = q + m * j as f32;
            features.iter().take_while(|f| f.theta <= envelope).count() as i64 - 1
        })
        .collect();
    KVector::new(q, m, k, features).unwrap()
}

fn identifier_with_table(features: Vec<Feature>) -> StarIdentifier {
    let mut ident = StarIdentifier::new();
    ident.set_feature_table(FeatureTable::new(features));
    ident
}

#[test]
fn test_two_star_identifies_perfect_field() {
    let vectors = star_field();
    let ident = identifier_with_table(field_features(&vectors));
    let ids = ident
        .identify(&vectors, 1e-3, IdentificationMethod::TwoStar)
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_pyramid_identifies_perfect_field() {
    let vectors = star_field();
    let ident = identifier_with_table(field_features(&vectors));
    let ids = ident
        .identify(&vectors, 1e-3, IdentificationMethod::PyramidIndexed)
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_pyramid_kvector_identifies_perfect_field() {
    let vectors = star_field();
    let mut ident = StarIdentifier::new();
    ident.set_kvector(build_kvector(field_features(&vectors)));
    let ids = ident
        .identify(&vectors, 1e-3, IdentificationMethod::PyramidKVector)
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_identification_survives_small_noise() {
    let vectors = star_field();
    let features = field_features(&vectors);

    // Jitter each direction by ~2 arcsec per tangent axis
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0f32, 1e-5).unwrap();
    let noisy: Vec<Vector3> = vectors
        .iter()
        .map(|v| {
            Vector3::new(
                v.x / v.z + noise.sample(&mut rng),
                v.y / v.z + noise.sample(&mut rng),
                1.0,
            )
            .normalize()
        })
        .collect();

    let ident = identifier_with_table(features.clone());
    for method in [
        IdentificationMethod::TwoStar,
        IdentificationMethod::PyramidIndexed,
    ] {
        let ids = ident.identify(&noisy, 0.05, method).unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6], "{method:?}");
    }

    let mut kv_ident = StarIdentifier::new();
    kv_ident.set_kvector(build_kvector(features));
    let ids = kv_ident
        .identify(&noisy, 0.05, IdentificationMethod::PyramidKVector)
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

/// Property: identifying a permutation of the inputs permutes the outputs.
#[test]
fn test_permuted_input_permutes_output() {
    let vectors = star_field();
    let ident = identifier_with_table(field_features(&vectors));

    let order = [3usize, 0, 4, 1, 5, 2];
    let permuted: Vec<Vector3> = order.iter().map(|&i| vectors[i]).collect();

    for method in [
        IdentificationMethod::TwoStar,
        IdentificationMethod::PyramidIndexed,
    ] {
        let base = ident.identify(&vectors, 1e-3, method).unwrap();
        let shuffled = ident.identify(&permuted, 1e-3, method).unwrap();
        let expected: Vec<i32> = order.iter().map(|&i| base[i]).collect();
        assert_eq!(shuffled, expected, "{method:?}");
    }
}

/// Property: for any window, the k-vector slice is a superset of the
/// indexed table's exact answer.
#[test]
fn test_kvector_slice_is_superset_of_table() {
    let features = field_features(&star_field());
    let table = FeatureTable::new(features.clone());
    let kvector = build_kvector(features);

    for step in 0..1200 {
        let lo = step as f32 * 0.01;
        let hi = lo + 0.35;
        let exact = table.range(lo, hi).unwrap();
        let slice = kvector.range(lo, hi).unwrap();
        for f in &exact {
            assert!(
                slice.iter().any(|s| (s.id1, s.id2) == (f.id1, f.id2)),
                "feature ({}, {}) missing from k-vector slice for ({lo}, {hi})",
                f.id1,
                f.id2
            );
        }
    }
}

/// S4: a single-feature catalog and two spots 45 degrees apart. Both spots
/// vote for both ids; the smaller-id tie-break gives spot 0 id 1 first, and
/// validation demotes it to id 2. Documented outcome: `[2, 1]`.
#[test]
fn test_s4_two_spots_single_feature() {
    let vectors = vec![
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(45.0f32.to_radians().sin(), 0.0, 45.0f32.to_radians().cos()),
    ];
    let ident = identifier_with_table(vec![Feature::new(1, 2, 45.0)]);
    let ids = ident
        .identify(&vectors, 0.1, IdentificationMethod::TwoStar)
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(ids, vec![2, 1]);
}

/// S5: the pyramid methods need at least four vectors.
#[test]
fn test_s5_pyramid_requires_four_vectors() {
    let vectors = star_field()[..3].to_vec();
    let ident = identifier_with_table(field_features(&star_field()));
    assert!(matches!(
        ident.identify(&vectors, 0.1, IdentificationMethod::PyramidIndexed),
        Err(Error::InsufficientInputs { needed: 4, got: 3 })
    ));

    let mut kv_ident = StarIdentifier::new();
    kv_ident.set_kvector(build_kvector(field_features(&star_field())));
    assert!(matches!(
        kv_ident.identify(&vectors, 0.1, IdentificationMethod::PyramidKVector),
        Err(Error::InsufficientInputs { .. })
    ));
}

/// S6: a k-vector file whose envelope cannot reach the stored angles falls
/// back to a full-table slice; the caller's exact post-filter then isolates
/// the true answer.
#[test]
fn test_s6_kvector_overselection_with_post_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kvector.txt");
    std::fs::write(
        &path,
        "0 0.01\n0 1 2 10.00\n1 1 3 10.01\n2 2 3 10.02\n",
    )
    .unwrap();

    let kvector = KVector::from_file(&path).unwrap();
    let slice = kvector.range(10.005, 10.015).unwrap();
    assert!(
        slice.iter().any(|f| f.theta == 10.01),
        "slice must contain the in-window feature"
    );

    let exact: Vec<Feature> = slice
        .into_iter()
        .filter(|f| f.theta > 10.005 && f.theta < 10.015)
        .collect();
    assert_eq!(exact.len(), 1);
    assert_eq!((exact[0].id1, exact[0].id2), (1, 3));
}

/// Invariant 7: a triad whose angles match the catalog two ways, with no
/// confirming fourth star, identifies nothing.
#[test]
fn test_ambiguous_triad_identifies_nothing() {
    let vectors = star_field()[..4].to_vec();
    let t01 = angle_deg(&vectors[0], &vectors[1]);
    let t02 = angle_deg(&vectors[0], &vectors[2]);
    let t12 = angle_deg(&vectors[1], &vectors[2]);

    // Two congruent triangles and nothing else: every triad containing
    // spot 3 finds an empty window, and triad (0, 1, 2) matches twice.
    let features = vec![
        Feature::new(1, 2, t01),
        Feature::new(1, 3, t02),
        Feature::new(2, 3, t12),
        Feature::new(11, 12, t01),
        Feature::new(11, 13, t02),
        Feature::new(12, 13, t12),
    ];
    let ident = identifier_with_table(features);
    let ids = ident
        .identify(&vectors, 1e-3, IdentificationMethod::PyramidIndexed)
        .unwrap();
    assert_eq!(ids, vec![-1, -1, -1, -1]);
}

/// A spot whose geometry matches nothing is reported as a false star while
/// the rest of the field still identifies.
#[test]
fn test_false_star_is_marked_unknown() {
    let mut vectors = star_field()[..5].to_vec();
    let features = field_features(&vectors);

    // A sixth spot far outside the field's angular range
    vectors.push(Vector3::new(0.5, 0.5, 1.0).normalize());

    let ident = identifier_with_table(features);
    for method in [
        IdentificationMethod::TwoStar,
        IdentificationMethod::PyramidIndexed,
    ] {
        let ids = ident.identify(&vectors, 1e-3, method).unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, -1], "{method:?}");
    }
}

/// A minimal three-spot field resolves through voting alone: every spot's
/// true id collects two votes against one for each decoy.
#[test]
fn test_two_star_minimal_field() {
    // Spots 45 and 30 degrees apart along a great circle
    let vectors = vec![
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(45.0f32.to_radians().sin(), 0.0, 45.0f32.to_radians().cos()),
        Vector3::new(75.0f32.to_radians().sin(), 0.0, 75.0f32.to_radians().cos()),
    ];
    let t01 = angle_deg(&vectors[0], &vectors[1]);
    let t02 = angle_deg(&vectors[0], &vectors[2]);
    let t12 = angle_deg(&vectors[1], &vectors[2]);

    let features = vec![
        Feature::new(1, 2, t01),
        Feature::new(1, 3, t02),
        Feature::new(2, 3, t12),
    ];
    let ident = identifier_with_table(features);
    let ids = ident
        .identify(&vectors, 1e-3, IdentificationMethod::TwoStar)
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3]);
}
