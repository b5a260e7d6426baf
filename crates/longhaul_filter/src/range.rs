//! Inclusive numeric range filters over a bounded, steppable domain.

use longhaul_foundation::{Error, Result};

use crate::predicate::Predicate;

/// The declared domain of a range filter.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeDomain {
    /// Lowest selectable value.
    pub min: f64,
    /// Highest selectable value.
    pub max: f64,
    /// Increment presentation layers step by.
    pub step: f64,
}

impl RangeDomain {
    /// Creates a domain.
    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Checks that the domain is usable.
    ///
    /// # Errors
    ///
    /// Fails unless `min < max` and `step > 0`.
    pub fn validate(&self) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() || self.min >= self.max {
            return Err(Error::invalid_filter(format!(
                "domain minimum {} must be below maximum {}",
                self.min, self.max
            )));
        }
        if self.step.is_nan() || self.step <= 0.0 {
            return Err(Error::invalid_filter(format!(
                "step {} must be positive",
                self.step
            )));
        }
        Ok(())
    }
}

/// A `[lo, hi]` selection inside a fixed domain.
///
/// A bound resting on the domain edge is treated as open at that edge, so
/// the default selection constrains nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeFilter {
    name: String,
    domain: RangeDomain,
    lo: f64,
    hi: f64,
}

impl RangeFilter {
    /// Creates a filter selecting its whole domain.
    ///
    /// # Errors
    ///
    /// Fails if `min >= max` or the step is not positive.
    pub fn new(name: impl Into<String>, min: f64, max: f64, step: f64) -> Result<Self> {
        Self::with_domain(name, RangeDomain::new(min, max, step))
    }

    /// Creates a filter from a domain.
    ///
    /// # Errors
    ///
    /// Fails if the domain is unusable.
    pub fn with_domain(name: impl Into<String>, domain: RangeDomain) -> Result<Self> {
        domain.validate()?;
        Ok(Self {
            name: name.into(),
            domain,
            lo: domain.min,
            hi: domain.max,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared domain.
    #[must_use]
    pub fn domain(&self) -> RangeDomain {
        self.domain
    }

    /// The step increment.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.domain.step
    }

    /// Current `(lo, hi)` selection.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Sets the selection, clamping each bound into the domain.
    ///
    /// Returns true if the selection changed.
    ///
    /// # Errors
    ///
    /// Fails if `lo > hi` or either bound is `NaN`; the selection is unchanged.
    #[allow(clippy::float_cmp)]
    pub fn set_bounds(&mut self, lo: f64, hi: f64) -> Result<bool> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(Error::invalid_filter(format!(
                "{}: lower bound {lo} exceeds upper bound {hi}",
                self.name
            )));
        }
        let lo = lo.clamp(self.domain.min, self.domain.max);
        let hi = hi.clamp(self.domain.min, self.domain.max);
        let changed = (lo, hi) != (self.lo, self.hi);
        self.lo = lo;
        self.hi = hi;
        Ok(changed)
    }

    /// Selects the whole domain again. Returns true if the selection changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.is_active();
        self.lo = self.domain.min;
        self.hi = self.domain.max;
        changed
    }

    /// Returns true if the selection is narrower than the domain.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lo > self.domain.min || self.hi < self.domain.max
    }

    /// Tests a value against the selection, honouring open edges.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (min, max) = self.open_bounds();
        min.is_none_or(|lo| value >= lo) && max.is_none_or(|hi| value <= hi)
    }

    /// The selection with domain edges mapped to `None`.
    #[must_use]
    pub fn open_bounds(&self) -> (Option<f64>, Option<f64>) {
        let lo = (self.lo > self.domain.min).then_some(self.lo);
        let hi = (self.hi < self.domain.max).then_some(self.hi);
        (lo, hi)
    }

    /// Returns the predicate for `column`, or `None` when nothing is constrained.
    #[must_use]
    pub fn predicate(&self, column: &str) -> Option<Predicate> {
        let (min, max) = self.open_bounds();
        (min.is_some() || max.is_some()).then(|| Predicate::between(column, min, max))
    }
}
