//! Stress tests for the evaluator
//!
//! Run with: cargo test --release stress -- --ignored

use metric_reasoning::*;
use std::time::Instant;

fn dense_series(now: f64, window: f64, points: usize) -> RawSeries {
    let step = 2.0 * window / points as f64;
    let samples: Vec<(f64, f64)> = (0..points)
        .map(|i| {
            let t = now - 2.0 * window + i as f64 * step;
            (t, 50.0 + (i as f64 * 0.01).sin() * 10.0)
        })
        .collect();
    RawSeries::from_samples(&samples)
}

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_evaluations() {
    let now = 1_700_000_000.0;
    let policy = EvaluationPolicy::default();
    let raw = vec![dense_series(now, policy.window_sec, 16)];

    let iterations = 200_000;
    let start = Instant::now();

    for i in 0..iterations {
        let eval = evaluate("cpu", &raw, now, &policy).unwrap();
        assert!(eval.is_conclusive(), "iteration {}", i);
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Ran {} evaluations in {:?}", iterations, elapsed);
    println!("Rate: {:.0} evaluations/second", rate);

    assert!(
        rate > 50_000.0,
        "Should evaluate at least 50k windows/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_large_window() {
    let now = 1_700_000_000.0;
    let policy = EvaluationPolicy::default()
        .with_window(86_400.0)
        .with_expected_interval(1.0);
    let raw = vec![dense_series(now, policy.window_sec, 2 * 86_400)];

    let start = Instant::now();
    let eval = evaluate("cpu", &raw, now, &policy).unwrap();
    let elapsed = start.elapsed();

    println!("Evaluated {} samples in {:?}", 2 * 86_400, elapsed);
    assert_eq!(eval.stats_now.sample_count, 86_400);
    assert!(elapsed.as_secs_f64() < 2.0);
}
