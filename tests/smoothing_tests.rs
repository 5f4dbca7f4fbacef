//! Smoothing-group reconstruction tests
//!
//! Fixtures describe meshes the way importers hand them over: per-face
//! signed edge ids plus one normal per corner in a flat float array.

mod support;

use polyview::errors::SmoothingDataError;
use polyview::float_types::{Real, TAU, UNLOCKED_NORMAL};
use polyview::mesh::reversed;
use polyview::mesh::smoothing::{
    SmoothingOptions, calc_smooth_groups, calc_smooth_groups_with, can_calc_smooth_groups,
    validate_smoothing_data,
};
use support::{
    assert_valid_masks, corner_count, cube_corner_normals, cube_faces, quad_strip,
    tilted_normals, uniform_normals,
};

/// A flat strip of quads smooths into a single group with bit 0 set.
#[test]
fn test_flat_strip_is_one_group() {
    let faces = quad_strip(4, 0);
    let normals = uniform_normals(corner_count(&faces), [0.0, 0.0, 1.0]);

    let groups = calc_smooth_groups(&faces, &normals);

    assert_eq!(groups, vec![1, 1, 1, 1]);
    assert_valid_masks(&groups);
}

/// A closed cube has a 90° crease at every edge, so every face stays
/// faceted with mask 0.
#[test]
fn test_cube_faces_stay_faceted() {
    let faces = cube_faces();
    let normals = cube_corner_normals();

    let groups = calc_smooth_groups(&faces, &normals);

    assert_eq!(groups, vec![0; 6]);
    println!("✓ cube reconstructs as six faceted faces");
}

/// A lone face forms a trivial component and keeps mask 0.
#[test]
fn test_single_face_gets_zero_mask() {
    let faces = quad_strip(1, 0);
    let normals = uniform_normals(4, [0.0, 0.0, 1.0]);

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![0]);
}

/// No faces, no masks, no trouble.
#[test]
fn test_empty_mesh_yields_no_masks() {
    let faces: Vec<Vec<i32>> = Vec::new();
    let normals: Vec<Real> = Vec::new();

    assert!(can_calc_smooth_groups(&faces, &normals));
    assert!(calc_smooth_groups(&faces, &normals).is_empty());
}

/// Corner normals 1° apart stay in one group; 3° apart crosses the 2°
/// crease threshold and splits the faces into trivial components.
#[test]
fn test_crease_angle_splits_groups() {
    let faces = quad_strip(2, 0);

    let mut gentle = uniform_normals(4, [0.0, 0.0, 1.0]);
    gentle.extend(tilted_normals(4, 1.0));
    assert_eq!(calc_smooth_groups(&faces, &gentle), vec![1, 1]);

    let mut sharp = uniform_normals(4, [0.0, 0.0, 1.0]);
    sharp.extend(tilted_normals(4, 3.0));
    assert_eq!(calc_smooth_groups(&faces, &sharp), vec![0, 0]);
}

/// A caller-provided threshold widens the smoothing cone.
#[test]
fn test_custom_threshold_widens_the_cone() {
    let faces = quad_strip(2, 0);
    let mut normals = uniform_normals(4, [0.0, 0.0, 1.0]);
    normals.extend(tilted_normals(4, 3.0));

    let options = SmoothingOptions {
        min_normal_dot: (10.0 as Real).to_radians().cos(),
    };

    assert_eq!(calc_smooth_groups_with(&faces, &normals, &options), vec![1, 1]);
}

/// Grouping follows adjacent agreement, not global agreement: a chain of
/// gently bending faces smooths end to end even when the two ends point
/// far apart.
#[test]
fn test_smoothing_is_transitive_along_chains() {
    let quads = 10;
    let faces = quad_strip(quads, 0);
    let mut normals = Vec::new();
    for i in 0..quads {
        normals.extend(tilted_normals(4, 1.5 * i as Real));
    }

    let groups = calc_smooth_groups(&faces, &normals);

    assert_eq!(groups, vec![1; quads]);
    println!("✓ 13.5° of total bend smooths through 1.5° steps");
}

/// An unlocked corner normal (any component at the sentinel magnitude)
/// never matches, so its edges stay hard.
#[test]
fn test_unlocked_normals_force_hard_edges() {
    let faces = quad_strip(2, 0);
    let mut normals = uniform_normals(4, [0.0, 0.0, 1.0]);
    normals.extend(uniform_normals(4, [0.0, 0.0, UNLOCKED_NORMAL]));

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![0, 0]);
}

/// When the corner and normal counts disagree the reconstruction never
/// fails; it hands the whole mesh back as one smoothing group.
#[test]
fn test_mismatched_normals_fall_back_to_one_group() {
    let faces = quad_strip(3, 0);
    let mut normals = uniform_normals(corner_count(&faces), [0.0, 0.0, 1.0]);
    normals.truncate(normals.len() - 3);

    assert!(!can_calc_smooth_groups(&faces, &normals));
    assert_eq!(calc_smooth_groups(&faces, &normals), vec![1, 1, 1]);
}

/// The validation entry point tells a truncated array apart from a
/// whole-triplet miscount.
#[test]
fn test_validation_reports_the_disagreement() {
    let faces = quad_strip(2, 0);
    let good = uniform_normals(8, [0.0, 0.0, 1.0]);
    assert_eq!(validate_smoothing_data(&faces, &good), Ok(()));

    let mut torn = good.clone();
    torn.pop();
    assert_eq!(
        validate_smoothing_data(&faces, &torn),
        Err(SmoothingDataError::TruncatedNormalArray { len: 23 })
    );

    let short = uniform_normals(6, [0.0, 0.0, 1.0]);
    assert_eq!(
        validate_smoothing_data(&faces, &short),
        Err(SmoothingDataError::NormalCountMismatch {
            expected: 8,
            actual: 6
        })
    );
}

/// Group bits cycle: the 33rd multi-face component reuses bit 0.
///
/// Components are discovered from the highest face index down, so the
/// last strip gets bit 0 and the numbering runs backwards from there.
#[test]
fn test_group_bits_wrap_after_thirty_two() {
    let strips = 34;
    let mut faces = Vec::new();
    for k in 0..strips {
        // 3n+1 = 7 edge ids per two-quad strip
        faces.extend(quad_strip(2, (k * 7) as i32));
    }
    let normals = uniform_normals(corner_count(&faces), [0.0, 0.0, 1.0]);

    let groups = calc_smooth_groups(&faces, &normals);

    assert_valid_masks(&groups);
    for k in 0..strips {
        let expected = 1u32 << ((strips - 1 - k) % 32);
        assert_eq!(
            groups[2 * k],
            expected,
            "strip {} should carry bit {}",
            k,
            (strips - 1 - k) % 32
        );
        assert_eq!(groups[2 * k + 1], expected);
    }
    // The wraparound itself: 33rd discovery shares bit 0 with the 1st
    assert_eq!(groups[2 * (strips - 1)], groups[2 * 1]);
    println!("✓ 34 smooth components cycle through 32 group bits");
}

/// An edge shared by three faces is excluded from adjacency instead of
/// failing; the faces simply cannot smooth across it.
#[test]
fn test_non_manifold_edges_are_excluded() {
    let faces = vec![vec![0, 1, 2, 3], vec![0, 4, 5, 6], vec![0, 7, 8, 9]];
    let normals = uniform_normals(12, [0.0, 0.0, 1.0]);

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![0, 0, 0]);
}

/// Triangles and quads mix freely; the corner offsets follow each face's
/// own arity.
#[test]
fn test_mixed_arity_faces_share_groups() {
    let faces = vec![vec![0, 1, 2], vec![reversed(0), 3, 4, 5]];
    let normals = uniform_normals(7, [0.0, 0.0, 1.0]);

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![1, 1]);
}

/// Both endpoints of an edge must agree from both sides; one
/// disagreeing corner hardens the whole edge.
#[test]
fn test_one_disagreeing_endpoint_hardens_the_edge() {
    let faces = vec![vec![0, 1, 2], vec![reversed(0), 3, 4, 5]];
    let mut normals = uniform_normals(7, [0.0, 0.0, 1.0]);
    // Quad corner 1 sits on the shared edge; tilt only that normal
    let tilted = tilted_normals(1, 5.0);
    normals[12..15].copy_from_slice(&tilted);

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![0, 0]);
}

/// Corner normals are compared by direction; magnitude is irrelevant.
#[test]
fn test_normals_need_not_be_unit_length() {
    let faces = quad_strip(2, 0);
    let mut normals = uniform_normals(4, [0.0, 0.0, 7.0]);
    normals.extend(uniform_normals(4, [0.0, 0.0, 0.25]));

    assert_eq!(calc_smooth_groups(&faces, &normals), vec![1, 1]);
}

/// An unrolled cylinder at fine tessellation smooths into one group:
/// each 1° step stays inside the crease threshold.
#[test]
fn test_fine_cylinder_strip_smooths_whole() {
    let sectors = 360;
    let faces = quad_strip(sectors, 0);
    let mut normals = Vec::new();
    for i in 0..sectors {
        let theta = TAU * i as Real / sectors as Real;
        normals.extend(uniform_normals(4, [0.0, theta.sin(), theta.cos()]));
    }

    let groups = calc_smooth_groups(&faces, &normals);

    assert_eq!(groups, vec![1; sectors]);
}

/// The reconstruction is a pure function of its inputs.
#[test]
fn test_results_are_deterministic() {
    let faces = cube_faces();
    let normals = cube_corner_normals();

    let first = calc_smooth_groups(&faces, &normals);
    let second = calc_smooth_groups(&faces, &normals);

    assert_eq!(first, second);
}
