use std::sync::Arc;
use std::time::Duration;

use heartbeat_common::metric_names as names;
use heartbeat_common::snapshot::MetricMap;
use heartbeat_diagnostics::{
    correlate, triage, BaselineEvaluator, Cooldown, Direction, InMemoryBaselineStore, Pattern,
    TriageAction, TriagePolicy,
};

fn evaluator() -> BaselineEvaluator {
    BaselineEvaluator::new(Arc::new(InMemoryBaselineStore::new()), 2.0, 5)
}

fn map(pairs: &[(&str, f64)]) -> MetricMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Bitrate around 3000 ± 50 and fps around 30 ± 1.
async fn seed(ev: &BaselineEvaluator, tenant: &str, samples: usize) {
    for i in 0..samples {
        let (bitrate, fps) = if i % 2 == 0 { (2950.0, 29.0) } else { (3050.0, 31.0) };
        let m = map(&[(names::AVG_BITRATE, bitrate), (names::AVG_FPS, fps)]);
        ev.update(tenant, "", &m).await.unwrap();
    }
}

#[tokio::test]
async fn joint_bitrate_and_fps_drop_is_investigated_as_correlation() {
    let ev = evaluator();
    seed(&ev, "t1", 10).await;

    let observed = map(&[(names::AVG_BITRATE, 2500.0), (names::AVG_FPS, 20.0)]);
    let deviations = ev.deviations("t1", "", &observed).await.unwrap();
    assert_eq!(deviations.len(), 2);
    assert!(deviations.iter().all(|d| d.direction == Direction::Below));
    assert!(deviations.iter().all(|d| (d.sigma - 10.0).abs() < 1e-6));

    let correlations = correlate(&deviations);
    assert_eq!(correlations[0].pattern, Pattern::EncoderOverload);

    let result = triage(&[], &deviations, &correlations, &TriagePolicy::default());
    assert_eq!(result.action, TriageAction::Investigate);
    assert_eq!(result.trigger, "correlation");
}

#[tokio::test]
async fn scoring_reads_the_baseline_before_the_observation_lands() {
    let ev = evaluator();
    seed(&ev, "t1", 6).await;
    let observed = map(&[(names::AVG_BITRATE, 2500.0)]);

    let before = ev.deviations("t1", "", &observed).await.unwrap();
    ev.update("t1", "", &observed).await.unwrap();
    let after = ev.deviations("t1", "", &observed).await.unwrap();

    assert!((before[0].sigma - 10.0).abs() < 1e-6);
    assert!(after.is_empty() || after[0].sigma < before[0].sigma);
}

#[tokio::test]
async fn moderate_deviation_flags_once_per_cooldown() {
    let ev = evaluator();
    seed(&ev, "t1", 10).await;
    let observed = map(&[(names::AVG_BITRATE, 2850.0), (names::AVG_FPS, 30.0)]);

    let deviations = ev.deviations("t1", "", &observed).await.unwrap();
    let result = triage(&[], &deviations, &correlate(&deviations), &TriagePolicy::default());
    assert_eq!(result.action, TriageAction::Flag);
    assert_eq!(result.deviated_metrics(), vec![names::AVG_BITRATE.to_string()]);

    let cooldown = Cooldown::new(Duration::from_secs(3600));
    assert!(cooldown.should_flag("t1"));
    assert!(!cooldown.should_flag("t1"));
    assert!(cooldown.should_flag("t2"));
}

#[tokio::test]
async fn tenants_and_streams_keep_separate_baselines() {
    let ev = evaluator();
    seed(&ev, "t1", 10).await;
    let observed = map(&[(names::AVG_BITRATE, 2500.0)]);

    assert!(ev.deviations("t2", "", &observed).await.unwrap().is_empty());
    assert!(ev.deviations("t1", "stream-9", &observed).await.unwrap().is_empty());
    assert_eq!(ev.deviations("t1", "", &observed).await.unwrap().len(), 1);
}
