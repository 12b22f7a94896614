use nalgebra::{Matrix3, Point2};
use planar_homography::{estimate, EstimationMethod, Homography, HomographyConfig, RefineParams};

#[cfg(feature = "tracing")]
use planar_homography::init_tracing_with_log_bridge;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing_with_log_bridge("debug");
    #[cfg(not(feature = "tracing"))]
    planar_homography::init_with_level(log::LevelFilter::Debug).map_err(|e| e.to_string())?;

    let truth = Homography::new(Matrix3::new(
        1.2, 0.15, 30.0, //
        -0.1, 0.95, 12.0, //
        0.0008, 0.0004, 1.0,
    ));

    // 6x6 grid of a 100-unit square, with a little deterministic noise on the targets.
    let source: Vec<Point2<f64>> = (0..36)
        .map(|i| Point2::new(20.0 * (i % 6) as f64, 20.0 * (i / 6) as f64))
        .collect();
    let target: Vec<Point2<f64>> = source
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let q = truth.apply(p);
            let t = i as f64;
            Point2::new(q.x + 0.05 * (3.1 * t).sin(), q.y + 0.05 * (1.7 * t).cos())
        })
        .collect();

    for method in [EstimationMethod::Dlt, EstimationMethod::LeastSquares] {
        let config = HomographyConfig {
            method,
            refine: Some(RefineParams::default()),
        };
        let result = estimate(&source, &target, &config)?;
        println!(
            "{:?}: rms={:.4} max={:.4}",
            method, result.reprojection.rms, result.reprojection.max
        );
        if let Some(r) = &result.refinement {
            println!(
                "  refinement info={} evals={} cost {:.4e} -> {:.4e}",
                r.info, r.evaluations, r.initial_cost, r.final_cost
            );
        }
        println!("  H = {:?}", result.homography.to_array());
    }

    Ok(())
}
