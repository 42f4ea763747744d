//! Dual-order Simpson kernel shared by every scheduler.
//!
//! One call takes exactly two new integrand samples (the quarter points) and
//! either accepts the interval or hands back its two halves.

use subdivide_core::{Integrand, Interval};

/// Intervals narrower than this are accepted whatever their error estimate.
pub const MIN_WIDTH: f64 = 1.0e-12;

/// Result of running the kernel on one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Richardson-extrapolated contribution of an accepted interval.
    Accept(f64),
    /// The left and right halves, in that order.
    Split(Interval, Interval),
}

/// Evaluate one task. Pure apart from the two integrand calls.
pub fn evaluate(f: &dyn Integrand, task: &Interval) -> Evaluation {
    let h = task.right - task.left;
    let c = (task.left + task.right) / 2.0;
    let d = (task.left + c) / 2.0;
    let e = (c + task.right) / 2.0;
    let fd = f.eval(d);
    let fe = f.eval(e);

    // 3-point and 5-point Simpson estimates.
    let q1 = h / 6.0 * (task.f_left + 4.0 * task.f_mid + task.f_right);
    let q2 = h / 12.0 * (task.f_left + 4.0 * fd + 2.0 * task.f_mid + 4.0 * fe + task.f_right);

    if (q2 - q1).abs() < task.tol || h < MIN_WIDTH {
        return Evaluation::Accept(q2 + (q2 - q1) / 15.0);
    }

    let left = Interval {
        left: task.left,
        right: c,
        tol: task.tol,
        f_left: task.f_left,
        f_mid: fd,
        f_right: task.f_mid,
    };
    let right = Interval {
        left: c,
        right: task.right,
        tol: task.tol,
        f_left: task.f_mid,
        f_mid: fe,
        f_right: task.f_right,
    };
    Evaluation::Split(left, right)
}
