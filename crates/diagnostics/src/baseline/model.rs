use chrono::{DateTime, Utc};

/// Running mean and variance of one metric, folded with Welford's method.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub avg: f64,
    pub m2: f64,
    pub sample_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl Baseline {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            avg: 0.0,
            m2: 0.0,
            sample_count: 0,
            updated_at: now,
        }
    }

    pub fn observe(&mut self, value: f64, now: DateTime<Utc>) {
        self.sample_count += 1;
        let delta = value - self.avg;
        self.avg += delta / self.sample_count as f64;
        self.m2 += delta * (value - self.avg);
        self.updated_at = now;
    }

    /// Population standard deviation; zero until two samples exist.
    pub fn stddev(&self) -> f64 {
        if self.sample_count < 2 {
            return 0.0;
        }
        (self.m2 / self.sample_count as f64).sqrt()
    }
}
