use std::future::Future;
use std::time::Duration;

/// Capped exponential backoff for startup dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub attempts: u32,
    pub first_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            attempts: 5,
            first_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl Backoff {
    /// Delay slept after failed attempt `n` (1-based).
    pub fn delay_after(&self, n: u32) -> Duration {
        let exp = self.multiplier.max(1.0).powi(n.saturating_sub(1) as i32);
        let secs = self.first_delay.as_secs_f64() * exp;
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Retries `op` under `backoff`, returning the last error once attempts run out.
pub async fn retry_async<F, Fut, T, E>(backoff: &Backoff, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = backoff.attempts.max(1);
    let mut n = 1;
    loop {
        let err = match op().await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        if n >= attempts {
            tracing::error!(target_op = what, attempts, error = %err, "giving up");
            return Err(err);
        }
        let delay = backoff.delay_after(n);
        tracing::warn!(target_op = what, attempt = n, delay_ms = delay.as_millis() as u64, error = %err, "dependency unavailable, backing off");
        tokio::time::sleep(delay).await;
        n += 1;
    }
}
