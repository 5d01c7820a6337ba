use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric observation that sits `sigma` standard deviations away from its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Deviation {
    pub metric: String,
    pub current: f64,
    pub baseline: f64,
    pub stddev: f64,
    pub sigma: f64,
    pub direction: Direction,
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} (baseline {:.2} ± {:.2}, {:.1}σ {})",
            self.metric, self.current, self.baseline, self.stddev, self.sigma, self.direction
        )
    }
}
