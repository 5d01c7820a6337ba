use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use heartbeat_common::metric_names as names;
use heartbeat_common::snapshot::{MetricMap, StreamHealthPage, StreamHealthRecord};

use crate::baseline::{BaselineError, BaselineEvaluator};
use crate::correlator::{correlate, Correlation};
use crate::deviation::Deviation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_ANOMALOUS_STREAMS: usize = 20;

/// Paged access to per-stream health records.
#[async_trait]
pub trait StreamMetricsSource: Send + Sync {
    async fn stream_health_page(
        &self,
        tenant_id: &str,
        window: Duration,
        first: u32,
        after: Option<&str>,
    ) -> Result<StreamHealthPage, BoxError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamAnomaly {
    pub stream_id: String,
    pub max_sigma: f64,
    pub deviations: Vec<Deviation>,
    pub correlations: Vec<Correlation>,
}

/// Drill-down that scores each stream against the tenant-wide baseline.
#[derive(Clone)]
pub struct PerStreamAnalyzer {
    evaluator: BaselineEvaluator,
    page_size: u32,
    max_streams: usize,
}

impl PerStreamAnalyzer {
    pub fn new(evaluator: BaselineEvaluator) -> Self {
        Self {
            evaluator,
            page_size: DEFAULT_PAGE_SIZE,
            max_streams: MAX_ANOMALOUS_STREAMS,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetches every page and analyzes it. Failures yield an empty result.
    pub async fn collect(
        &self,
        source: &dyn StreamMetricsSource,
        tenant_id: &str,
        window: Duration,
    ) -> Vec<StreamAnomaly> {
        let records = match self.fetch_all(source, tenant_id, window).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, stage = "per_stream_fetch", error = %e, "per-stream metrics fetch failed");
                return Vec::new();
            }
        };
        if records.is_empty() {
            return Vec::new();
        }
        match self.analyze(tenant_id, &records).await {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, stage = "per_stream_analyze", error = %e, "per-stream analysis failed");
                Vec::new()
            }
        }
    }

    /// Pages until `has_next_page` is false or the cursor is empty or repeats.
    pub async fn fetch_all(
        &self,
        source: &dyn StreamMetricsSource,
        tenant_id: &str,
        window: Duration,
    ) -> Result<Vec<StreamHealthRecord>, BoxError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = source
                .stream_health_page(tenant_id, window, self.page_size, cursor.as_deref())
                .await?;
            all.extend(page.records);
            if !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => break,
            }
        }
        Ok(all)
    }

    pub async fn analyze(
        &self,
        tenant_id: &str,
        records: &[StreamHealthRecord],
    ) -> Result<Vec<StreamAnomaly>, BaselineError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let baselines = self.evaluator_baselines(tenant_id).await?;

        let mut anomalies = Vec::new();
        for (stream_id, metrics) in group_by_stream(records) {
            let deviations = self.evaluator.score(&baselines, &metrics);
            if deviations.is_empty() {
                continue;
            }
            let max_sigma = deviations.iter().map(|d| d.sigma).fold(0.0, f64::max);
            let correlations = correlate(&deviations);
            anomalies.push(StreamAnomaly {
                stream_id,
                max_sigma,
                deviations,
                correlations,
            });
        }

        anomalies.sort_by(|a, b| {
            b.max_sigma
                .total_cmp(&a.max_sigma)
                .then_with(|| a.stream_id.cmp(&b.stream_id))
        });
        anomalies.truncate(self.max_streams);
        Ok(anomalies)
    }

    async fn evaluator_baselines(
        &self,
        tenant_id: &str,
    ) -> Result<crate::baseline::BaselineMap, BaselineError> {
        self.evaluator.store().get(tenant_id, "").await
    }
}

#[derive(Default)]
struct Sums {
    bitrate: f64,
    fps: f64,
    buffer_health: f64,
    count: f64,
}

fn group_by_stream(records: &[StreamHealthRecord]) -> BTreeMap<String, MetricMap> {
    let mut sums: BTreeMap<&str, Sums> = BTreeMap::new();
    for r in records {
        if r.stream_id.is_empty() {
            continue;
        }
        let s = sums.entry(r.stream_id.as_str()).or_default();
        s.bitrate += r.bitrate;
        s.fps += r.fps;
        s.buffer_health += r.buffer_health;
        s.count += 1.0;
    }

    sums.into_iter()
        .map(|(id, s)| {
            let mut m = MetricMap::new();
            m.insert(names::AVG_BITRATE.into(), s.bitrate / s.count);
            m.insert(names::AVG_FPS.into(), s.fps / s.count);
            m.insert(names::AVG_BUFFER_HEALTH.into(), s.buffer_health / s.count);
            (id.to_string(), m)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{InMemoryBaselineStore, DEFAULT_MIN_SAMPLES, DEFAULT_SIGMA_LIMIT};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::sync::Mutex;

    fn record(id: &str, bitrate: f64, fps: f64, buffer: f64) -> StreamHealthRecord {
        StreamHealthRecord {
            stream_id: id.into(),
            bitrate,
            fps,
            buffer_health: buffer,
        }
    }

    async fn seeded_analyzer() -> PerStreamAnalyzer {
        let eval = BaselineEvaluator::new(
            Arc::new(InMemoryBaselineStore::new()),
            DEFAULT_SIGMA_LIMIT,
            DEFAULT_MIN_SAMPLES,
        );
        for v in [5.0e6, 5.1e6, 4.9e6, 5.05e6, 4.95e6, 5.0e6, 5.1e6, 4.9e6, 5.05e6, 4.95e6] {
            let m: MetricMap = [
                ("avg_bitrate".to_string(), v),
                ("avg_fps".to_string(), 30.0),
                ("avg_buffer_health".to_string(), 3.0),
            ]
            .into_iter()
            .collect();
            eval.update("t1", "", &m).await.unwrap();
        }
        PerStreamAnalyzer::new(eval)
    }

    struct Pages {
        pages: Vec<StreamHealthPage>,
        calls: AtomicUsize,
        cursors: Mutex<Vec<Option<String>>>,
        fail_at: Option<usize>,
    }

    impl Pages {
        fn new(pages: Vec<StreamHealthPage>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                cursors: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }
    }

    #[async_trait]
    impl StreamMetricsSource for Pages {
        async fn stream_health_page(
            &self,
            _tenant_id: &str,
            _window: Duration,
            _first: u32,
            after: Option<&str>,
        ) -> Result<StreamHealthPage, BoxError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.cursors.lock().unwrap().push(after.map(String::from));
            if self.fail_at == Some(n) {
                return Err("metrics unavailable".into());
            }
            Ok(self.pages.get(n).cloned().unwrap_or_else(|| StreamHealthPage {
                records: vec![record("late", 1.0, 1.0, 1.0)],
                end_cursor: Some(format!("c{n}")),
                has_next_page: true,
            }))
        }
    }

    fn page(records: Vec<StreamHealthRecord>, cursor: &str, more: bool) -> StreamHealthPage {
        StreamHealthPage {
            records,
            end_cursor: Some(cursor.into()),
            has_next_page: more,
        }
    }

    #[tokio::test]
    async fn finds_outlier_stream_first() {
        let a = seeded_analyzer().await;
        let records = vec![
            record("stream-good", 5.0e6, 30.0, 3.0),
            record("stream-good", 5.0e6, 30.0, 3.0),
            record("stream-bad", 1.0e5, 10.0, 0.5),
            record("stream-bad", 1.0e5, 10.0, 0.5),
        ];
        let out = a.analyze("t1", &records).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stream_id, "stream-bad");
        assert!(out[0].max_sigma > 2.0);
        assert_eq!(out[0].deviations[0].metric, "avg_bitrate");
    }

    #[tokio::test]
    async fn empty_stream_ids_are_skipped() {
        let a = seeded_analyzer().await;
        let out = a
            .analyze("t1", &[record("", 1.0e5, 10.0, 0.5)])
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn caps_at_twenty_sorted_by_sigma() {
        let a = seeded_analyzer().await;
        let records: Vec<_> = (0..25)
            .map(|i| record(&format!("s{i:02}"), 1.0e6 + i as f64 * 1.0e4, 30.0, 3.0))
            .collect();
        let out = a.analyze("t1", &records).await.unwrap();
        assert_eq!(out.len(), MAX_ANOMALOUS_STREAMS);
        assert_eq!(out[0].stream_id, "s00");
        for pair in out.windows(2) {
            assert!(pair[0].max_sigma >= pair[1].max_sigma);
        }
    }

    #[tokio::test]
    async fn analysis_does_not_touch_baselines() {
        let a = seeded_analyzer().await;
        let before = a.evaluator.store().get("t1", "").await.unwrap();
        a.analyze("t1", &[record("s", 1.0e5, 10.0, 0.5)]).await.unwrap();
        let after = a.evaluator.store().get("t1", "").await.unwrap();
        assert_eq!(before, after);
        assert!(a.evaluator.store().get("t1", "s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pagination_stops_when_no_next_page() {
        let a = seeded_analyzer().await;
        let src = Pages::new(vec![
            page(vec![record("s1", 1.0e5, 30.0, 3.0)], "c1", true),
            page(vec![record("s2", 5.0e6, 30.0, 3.0)], "c2", true),
            page(vec![record("s3", 2.0e5, 30.0, 3.0)], "c3", false),
        ]);
        let records = a
            .fetch_all(&src, "t1", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(src.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *src.cursors.lock().unwrap(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn pagination_stops_on_empty_cursor() {
        let a = seeded_analyzer().await;
        let src = Pages::new(vec![page(vec![record("s1", 1.0e5, 30.0, 3.0)], "", true)]);
        let records = a
            .fetch_all(&src, "t1", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pagination_stops_on_repeated_cursor() {
        let a = seeded_analyzer().await;
        let src = Pages::new(vec![
            page(vec![], "same", true),
            page(vec![], "same", true),
        ]);
        a.fetch_all(&src, "t1", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_drill_down() {
        let a = seeded_analyzer().await;
        let mut src = Pages::new(vec![page(vec![record("s1", 1.0e5, 30.0, 3.0)], "c1", true)]);
        src.fail_at = Some(1);
        let out = a.collect(&src, "t1", Duration::from_secs(900)).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn collect_returns_ranked_anomalies() {
        let a = seeded_analyzer().await;
        let src = Pages::new(vec![
            page(vec![record("s1", 2.0e5, 30.0, 3.0)], "c1", true),
            page(vec![record("s2", 1.0e5, 30.0, 3.0)], "c2", false),
        ]);
        let out = a.collect(&src, "t1", Duration::from_secs(900)).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].stream_id, "s2");
    }
}
