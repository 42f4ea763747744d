use crate::error::CoreError;
use crate::integrand::Integrand;

/// One pending sub-interval of the integration domain.
///
/// Carries the integrand samples already taken at both ends and at the
/// midpoint, so a task is never re-evaluated at a point its parent sampled.
/// Tasks are plain values: the kernel consumes one and produces either a
/// contribution or two fresh children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
    /// Acceptance tolerance, inherited unchanged by both children.
    pub tol: f64,
    pub f_left: f64,
    pub f_mid: f64,
    pub f_right: f64,
}

impl Interval {
    /// Build the root task covering `[left, right]`.
    ///
    /// This is where the three samples every later task inherits are taken.
    pub fn seed(f: &dyn Integrand, left: f64, right: f64, tol: f64) -> Result<Self, CoreError> {
        validate_bounds(left, right)?;
        validate_tolerance(tol)?;

        Ok(Self {
            left,
            right,
            tol,
            f_left: f.eval(left),
            f_mid: f.eval((left + right) / 2.0),
            f_right: f.eval(right),
        })
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

pub(crate) fn validate_bounds(left: f64, right: f64) -> Result<(), CoreError> {
    if left.is_finite() && right.is_finite() && left < right {
        Ok(())
    } else {
        Err(CoreError::InvalidBounds { left, right })
    }
}

pub(crate) fn validate_tolerance(tol: f64) -> Result<(), CoreError> {
    if tol.is_finite() && tol > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidTolerance(tol))
    }
}
