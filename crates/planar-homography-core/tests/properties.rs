use approx::assert_relative_eq;
use nalgebra::{Matrix3, Point2, Rotation2, Vector2};
use planar_homography_core::{
    estimate_homography_dlt, estimate_homography_least_squares, reprojection_errors, ErrorKind,
    Homography, ReprojectionStats,
};

fn ground_truths() -> Vec<Homography> {
    vec![
        Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        )),
        Homography::new(Matrix3::new(
            1.3, -0.4, -20.0, //
            0.25, 0.7, 45.0, //
            -0.0012, 0.0007, 1.0,
        )),
        Homography::new(Matrix3::new(
            0.5, 0.0, 3.0, //
            0.0, 0.5, -7.0, //
            0.0, 0.0, 1.0,
        )),
    ]
}

fn scattered_points() -> Vec<Point2<f64>> {
    (0..12)
        .map(|i| {
            let t = i as f64;
            Point2::new(
                10.0 + 170.0 * (0.5 + 0.5 * (1.3 * t).sin()),
                5.0 + 140.0 * (0.5 + 0.5 * (0.7 * t + 0.4).cos()),
            )
        })
        .collect()
}

/// Deterministic zero-mean perturbation with amplitude `sigma`.
fn jitter(points: &[Point2<f64>], sigma: f64) -> Vec<Point2<f64>> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = i as f64;
            Point2::new(p.x + sigma * (2.1 * t).sin(), p.y + sigma * (3.7 * t + 1.0).cos())
        })
        .collect()
}

/// Frobenius distance between two homographies after fixing scale and sign.
fn up_to_scale_distance(a: &Homography, b: &Homography) -> f64 {
    let an = a.h / a.h.norm();
    let bn = b.h / b.h.norm();
    (an - bn).norm().min((an + bn).norm())
}

#[test]
fn dlt_recovers_known_homographies() {
    let src = scattered_points();
    for gt in ground_truths() {
        let dst: Vec<Point2<f64>> = src.iter().map(|&p| gt.apply(p)).collect();
        let est = estimate_homography_dlt(&src, &dst).expect("dlt");
        assert!(
            up_to_scale_distance(&est, &gt) < 1e-9,
            "distance {}",
            up_to_scale_distance(&est, &gt)
        );
    }
}

#[test]
fn unit_square_scenario_extrapolates() {
    let gt = Homography::new(Matrix3::new(
        1.2, 0.1, 0.3, //
        -0.2, 0.9, 0.5, //
        0.15, -0.1, 1.0,
    ));
    let src = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    let dst = src.map(|p| gt.apply(p));

    let est = estimate_homography_dlt(&src, &dst).expect("dlt from 4 points");
    let probe = Point2::new(2.0, 2.0);
    let a = est.apply(probe);
    let b = gt.apply(probe);
    assert!((a - b).norm() < 1e-6, "{a:?} vs {b:?}");
}

#[test]
fn reprojection_scales_with_noise() {
    let gt = ground_truths()[0];
    let src = scattered_points();
    let exact: Vec<Point2<f64>> = src.iter().map(|&p| gt.apply(p)).collect();

    for sigma in [0.0, 0.1, 1.0] {
        let dst = jitter(&exact, sigma);
        let est = estimate_homography_dlt(&src, &dst).expect("dlt");
        let stats = ReprojectionStats::compute(&est, &src, &dst).expect("stats");
        assert!(
            stats.max <= 5.0 * sigma + 1e-9,
            "sigma={sigma} max={}",
            stats.max
        );
    }
}

#[test]
fn estimate_is_invariant_to_similarity_of_inputs() {
    let gt = ground_truths()[1];
    let src = scattered_points();
    let dst: Vec<Point2<f64>> = src.iter().map(|&p| gt.apply(p)).collect();

    let similarity = |angle: f64, scale: f64, t: Vector2<f64>| {
        let r = Rotation2::new(angle).into_inner() * scale;
        Matrix3::new(
            r[(0, 0)], r[(0, 1)], t.x, //
            r[(1, 0)], r[(1, 1)], t.y, //
            0.0, 0.0, 1.0,
        )
    };
    let s_src = similarity(0.6, 3.5, Vector2::new(-400.0, 250.0));
    let s_dst = similarity(-1.1, 0.02, Vector2::new(7.0, -3.0));

    let src2: Vec<Point2<f64>> = src.iter().map(|&p| Homography::new(s_src).apply(p)).collect();
    let dst2: Vec<Point2<f64>> = dst.iter().map(|&p| Homography::new(s_dst).apply(p)).collect();

    let h1 = estimate_homography_dlt(&src, &dst).expect("original frame");
    let h2 = estimate_homography_dlt(&src2, &dst2).expect("transformed frame");

    // H2 = S_dst * H1 * S_src^-1
    let s_src_inv = s_src.try_inverse().expect("similarity is invertible");
    let expected = Homography::new(s_dst * h1.h * s_src_inv);
    assert!(
        up_to_scale_distance(&h2, &expected) < 1e-7,
        "distance {}",
        up_to_scale_distance(&h2, &expected)
    );
}

#[test]
fn dlt_and_least_squares_agree_on_exact_data() {
    let src = scattered_points();
    for gt in ground_truths() {
        let dst: Vec<Point2<f64>> = src.iter().map(|&p| gt.apply(p)).collect();
        let dlt = estimate_homography_dlt(&src, &dst).expect("dlt");
        let ls = estimate_homography_least_squares(&src, &dst).expect("least squares");

        assert_eq!(ls.h[(2, 2)], 1.0);
        let dlt = dlt.normalized();
        assert_relative_eq!(dlt.h, ls.h, epsilon = 1e-6 * gt.h.norm());
    }
}

#[test]
fn estimators_reject_bad_inputs() {
    let src = scattered_points();

    let err = estimate_homography_dlt(&src[..3], &src[..3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);

    for err in [
        estimate_homography_dlt(&src, &src[..11]).unwrap_err(),
        estimate_homography_least_squares(&src, &src[..11]).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }

    let same = vec![Point2::new(4.0, 2.0); 8];
    let err = estimate_homography_least_squares(&same, &same).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericFailure);
}

#[test]
fn errors_vanish_on_exact_data() {
    let gt = ground_truths()[2];
    let src = scattered_points();
    let dst: Vec<Point2<f64>> = src.iter().map(|&p| gt.apply(p)).collect();
    let est = estimate_homography_least_squares(&src, &dst).expect("least squares");
    let errs = reprojection_errors(&est, &src, &dst).expect("errors");
    assert!(errs.iter().all(|e| *e < 1e-8), "{errs:?}");
}
