use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Inclusive window-length interval `[min, max]` with `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRange {
    min: usize,
    max: usize,
}

impl WindowRange {
    pub fn new(min: usize, max: usize) -> Result<Self, AnalysisError> {
        if min == 0 {
            return Err(AnalysisError::invalid(format!(
                "window range {}-{}: windows must be at least 1",
                min, max
            )));
        }
        if min > max {
            return Err(AnalysisError::invalid(format!(
                "window range {}-{}: min exceeds max",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// Never true for a constructed range; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl FromStr for WindowRange {
    type Err = AnalysisError;

    /// Accepts `"min-max"` or a single `"n"` (meaning `n-n`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let parse = |part: &str| {
            part.trim().parse::<usize>().map_err(|_| {
                AnalysisError::invalid(format!(
                    "window range '{}' must look like 'min-max' with positive integers",
                    s
                ))
            })
        };

        match text.split_once('-') {
            Some((lo, hi)) => WindowRange::new(parse(lo)?, parse(hi)?),
            None => {
                let n = parse(text)?;
                WindowRange::new(n, n)
            }
        }
    }
}

impl fmt::Display for WindowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A (short, long) window combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct WindowPair {
    pub short: usize,
    pub long: usize,
}

impl WindowPair {
    pub const fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    /// Only pairs with a strictly shorter short window are ever evaluated.
    pub fn is_valid(&self) -> bool {
        self.short >= 1 && self.short < self.long
    }
}

impl FromStr for WindowPair {
    type Err = AnalysisError;

    /// `"10-50"` -> short 10, long 50.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || {
            AnalysisError::invalid(format!("window pair '{}' must look like 'short-long'", s))
        };
        let (lo, hi) = s.trim().split_once('-').ok_or_else(bad)?;
        let short = lo.trim().parse::<usize>().map_err(|_| bad())?;
        let long = hi.trim().parse::<usize>().map_err(|_| bad())?;
        Ok(Self { short, long })
    }
}

impl fmt::Display for WindowPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.short, self.long)
    }
}
