//! Property tests for static posture parameters and confidence ellipses.
//!
//! These tests use deterministic pseudo-random sway so that results are
//! reproducible across runs. The serialization test needs
//! `cargo test --features serde`.

use approx::assert_relative_eq;
use posturography::{
    confidence_ellipse_interval, EllipseConfig, ParameterValue, PostureError, StaticAnalyzer,
    Trajectory2D, BOUNDARY_POINTS,
};
use std::f64::consts::PI;

// =============================================================================
// TRAJECTORY GENERATORS
// =============================================================================

/// Linear congruential generator yielding uniforms in `(0, 1)`.
struct Lcg(u64);

impl Lcg {
    fn next_uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 11) as f64 + 0.5) / (1u64 << 53) as f64
    }

    /// Standard normal sample (Box-Muller).
    fn next_normal(&mut self) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Random walk with uniform steps in `[-step, step]` on each axis.
fn generate_random_walk(n: usize, step: f64, seed: u64) -> Trajectory2D {
    let mut rng = Lcg(seed);
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let (mut px, mut py) = (0.0, 0.0);
    for _ in 0..n {
        px += step * (2.0 * rng.next_uniform() - 1.0);
        py += step * (2.0 * rng.next_uniform() - 1.0);
        x.push(px);
        y.push(py);
    }
    Trajectory2D::new(x, y, 100.0).unwrap()
}

/// Correlated Gaussian cloud with standard deviations `(3, 1)` rotated by `angle`.
fn generate_gaussian_cloud(n: usize, angle: f64, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = Lcg(seed);
    let (s, c) = angle.sin_cos();
    (0..n)
        .map(|_| {
            let u = 3.0 * rng.next_normal();
            let v = rng.next_normal();
            (2.0 + c * u - s * v, -1.0 + s * u + c * v)
        })
        .unzip()
}

// =============================================================================
// SWAY STATISTICS
// =============================================================================

#[test]
fn test_path_length_bounds_range() {
    for seed in [1, 7, 42, 1234] {
        let trajectory = generate_random_walk(500, 0.5, seed);
        let stats = StaticAnalyzer::new(trajectory).calculate_params();

        assert!(stats.path_length >= stats.range[0].max(stats.range[1]));
        assert!(stats.standard_deviation[0] <= stats.range[0]);
        assert!(stats.standard_deviation[1] <= stats.range[1]);
        // Mean speed is total path over total duration.
        assert_relative_eq!(stats.speed_total, stats.path_length * 100.0 / 499.0, epsilon = 1e-9);
    }
}

#[test]
fn test_repeated_point_is_degenerate() {
    let trajectory = Trajectory2D::new(vec![1.5; 50], vec![-0.5; 50], 50.0).unwrap();
    let mut analyzer = StaticAnalyzer::new(trajectory);
    let params = analyzer.parameters(0.95).unwrap();

    assert_eq!(params.mean_position, [1.5, -0.5]);
    assert_eq!(params.path_length, 0.0);
    assert_eq!(params.range, [0.0, 0.0]);
    assert_eq!(params.standard_deviation, [0.0, 0.0]);
    assert_eq!(params.speed_total, 0.0);
    assert_eq!(params.area, 0.0);
    assert_eq!(analyzer.cached_ellipse().unwrap().ratio, None);
}

#[test]
fn test_parameter_map_names() {
    let mut analyzer = StaticAnalyzer::new(generate_random_walk(200, 1.0, 3));
    let params = analyzer.parameters(0.95).unwrap();
    let map = params.to_map();

    let keys: Vec<&str> = map.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            "area",
            "mean_position",
            "path_length",
            "range",
            "speed_by_axis",
            "speed_total",
            "standard_deviation",
        ]
    );
    assert_eq!(map["area"], ParameterValue::Scalar(params.area));
    assert_eq!(map["range"], ParameterValue::Axes(params.range));
}

// =============================================================================
// CONFIDENCE ELLIPSE
// =============================================================================

#[test]
fn test_shape_mismatch() {
    let err = confidence_ellipse_interval(&[0.0, 1.0, 2.0], &[0.0, 1.0], &EllipseConfig::default())
        .unwrap_err();
    assert_eq!(err, PostureError::ShapeMismatch { x: 3, y: 2 });

    assert!(matches!(
        Trajectory2D::new(vec![0.0; 4], vec![0.0; 5], 100.0),
        Err(PostureError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_area_grows_with_confidence() {
    let (x, y) = generate_gaussian_cloud(1000, 0.4, 11);
    let area = |conf: f64| {
        confidence_ellipse_interval(&x, &y, &EllipseConfig::new(conf))
            .unwrap()
            .area
    };

    let (a90, a95, a99) = (area(0.90), area(0.95), area(0.99));
    assert!(a90 < a95);
    assert!(a95 < a99);

    // Area scales with the chi-square quantile, -2 ln(1 - p) for two dof.
    assert_relative_eq!(a99 / a95, 0.01f64.ln() / 0.05f64.ln(), max_relative = 1e-2);
}

#[test]
fn test_center_is_mean_position() {
    let trajectory = generate_random_walk(300, 0.2, 99);
    let mut analyzer = StaticAnalyzer::new(trajectory);
    let stats = analyzer.calculate_params();
    let ellipse = analyzer.confidence_ellipse_interval(0.95).unwrap();

    assert_relative_eq!(ellipse.center[0], stats.mean_position[0], epsilon = 1e-12);
    assert_relative_eq!(ellipse.center[1], stats.mean_position[1], epsilon = 1e-12);
    assert_eq!(ellipse.path.len(), BOUNDARY_POINTS);
}

#[test]
fn test_area_matches_closed_form() {
    let (x, y) = generate_gaussian_cloud(2000, 1.1, 5);
    let ellipse = confidence_ellipse_interval(&x, &y, &EllipseConfig::principal(0.95)).unwrap();

    let [[sxx, sxy], [_, syy]] = ellipse.covariance;
    let det = sxx * syy - sxy * sxy;
    let expected = PI * ellipse.scale * ellipse.scale * det.sqrt();
    assert_relative_eq!(ellipse.area, expected, max_relative = 2e-2);

    // Principal axis follows the generating rotation.
    assert!((ellipse.axis_angle[0] - 1.1).abs() < 0.05);
}

#[test]
fn test_front_back_sway_area() {
    // Antero-posterior dominant sway, the usual case for quiet standing.
    let (x, y) = generate_gaussian_cloud(2000, 1.3, 17);
    let mut analyzer = StaticAnalyzer::new(Trajectory2D::new(x.clone(), y.clone(), 100.0).unwrap());
    let params = analyzer.parameters(0.95).unwrap();
    let principal = confidence_ellipse_interval(&x, &y, &EllipseConfig::principal(0.95)).unwrap();

    assert!(principal.covariance[0][0] < principal.covariance[1][1]);
    assert_eq!(params.area, principal.area);

    let [[sxx, sxy], [_, syy]] = principal.covariance;
    let expected = PI * principal.scale * principal.scale * (sxx * syy - sxy * sxy).sqrt();
    assert_relative_eq!(params.area, expected, max_relative = 2e-2);
}

#[test]
fn test_side_to_side_sway_legacy_area() {
    // With the x variance larger, the first raw eigenpair is the major axis
    // and the legacy area uses the major half-length twice.
    let (x, y) = generate_gaussian_cloud(2000, 0.3, 23);
    let legacy = confidence_ellipse_interval(&x, &y, &EllipseConfig::new(0.95)).unwrap();
    let principal = confidence_ellipse_interval(&x, &y, &EllipseConfig::principal(0.95)).unwrap();

    assert!(legacy.covariance[0][0] > legacy.covariance[1][1]);
    assert_eq!(legacy.axis_length[0], legacy.axis_length[1]);
    assert_relative_eq!(legacy.area, PI * legacy.axis_length[0] * legacy.axis_length[0]);
    assert!(legacy.area > 2.0 * principal.area);
}

#[test]
fn test_gaussian_coverage() {
    let (x, y) = generate_gaussian_cloud(5000, 0.7, 2024);
    for conf in [0.5, 0.9, 0.95] {
        let ellipse = confidence_ellipse_interval(&x, &y, &EllipseConfig::new(conf)).unwrap();
        let [[sxx, sxy], [_, syy]] = ellipse.covariance;
        let det = sxx * syy - sxy * sxy;
        let k2 = ellipse.scale * ellipse.scale;

        let inside = x
            .iter()
            .zip(&y)
            .filter(|&(&px, &py)| {
                let dx = px - ellipse.center[0];
                let dy = py - ellipse.center[1];
                (syy * dx * dx - 2.0 * sxy * dx * dy + sxx * dy * dy) / det <= k2
            })
            .count();

        let fraction = inside as f64 / x.len() as f64;
        assert!((fraction - conf).abs() < 0.02, "conf={conf} fraction={fraction}");
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_parameters_serialize() {
    let mut analyzer = StaticAnalyzer::new(generate_random_walk(100, 1.0, 8));
    let params = analyzer.parameters(0.9).unwrap();

    let json = serde_json::to_string(&params).unwrap();
    let back: posturography::StaticParameters = serde_json::from_str(&json).unwrap();
    assert_eq!(back.confidence, 0.9);
    assert_relative_eq!(back.area, params.area, epsilon = 1e-9);
}
