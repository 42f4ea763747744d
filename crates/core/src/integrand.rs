/// A real function of one real variable.
///
/// Implementations must be pure and reentrant: every scheduler calls
/// `eval` from several worker threads at once with no synchronization.
pub trait Integrand: Sync {
    fn eval(&self, x: f64) -> f64;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64 + Sync,
{
    fn eval(&self, x: f64) -> f64 {
        self(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_dyn(f: &dyn Integrand, x: f64) -> f64 {
        f.eval(x)
    }

    #[test]
    fn closures_and_fn_pointers_are_integrands() {
        let offset = 2.0;
        assert_eq!(eval_dyn(&|x: f64| x + offset, 1.0), 3.0);
        assert_eq!(eval_dyn(&(f64::sqrt as fn(f64) -> f64), 9.0), 3.0);
    }
}
