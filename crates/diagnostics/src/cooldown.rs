use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_FLAG_COOLDOWN: Duration = Duration::from_secs(2 * 3600);

/// Allows at most one flag per key within the configured window.
#[derive(Debug)]
pub struct Cooldown {
    window: Duration,
    last_flag: Mutex<HashMap<String, Instant>>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        let window = if window.is_zero() {
            DEFAULT_FLAG_COOLDOWN
        } else {
            window
        };
        Self {
            window,
            last_flag: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn should_flag(&self, key: &str) -> bool {
        self.should_flag_at(key, Instant::now())
    }

    /// Returns true and records `now` only when no flag landed inside the window.
    pub fn should_flag_at(&self, key: &str, now: Instant) -> bool {
        let mut map = match self.last_flag.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.retain(|_, last| now.saturating_duration_since(*last) < self.window);
        if map.contains_key(key) {
            return false;
        }
        map.insert(key.to_string(), now);
        true
    }

    /// Number of keys still inside their window as of the last check.
    pub fn tracked(&self) -> usize {
        match self.last_flag.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(DEFAULT_FLAG_COOLDOWN)
    }
}
