//! Named integrands for the driver binary and the scheduler cross-checks.

/// A catalog entry: the integrand and, when one exists, its antiderivative.
#[derive(Debug, Clone, Copy)]
pub struct NamedIntegrand {
    pub name: &'static str,
    pub description: &'static str,
    function: fn(f64) -> f64,
    antiderivative: Option<fn(f64) -> f64>,
}

impl NamedIntegrand {
    /// The integrand itself; `fn(f64) -> f64` is an [`subdivide_core::Integrand`].
    pub fn function(&self) -> fn(f64) -> f64 {
        self.function
    }

    /// Analytic value of the integral over `[left, right]`, if known.
    pub fn exact(&self, left: f64, right: f64) -> Option<f64> {
        self.antiderivative.map(|g| g(right) - g(left))
    }
}

fn neg_cos(x: f64) -> f64 {
    -x.cos()
}

fn square(x: f64) -> f64 {
    x * x
}

fn square_antiderivative(x: f64) -> f64 {
    x * x * x / 3.0
}

fn cubic(x: f64) -> f64 {
    x * x * x - 2.0 * x
}

fn cubic_antiderivative(x: f64) -> f64 {
    x.powi(4) / 4.0 - x * x
}

fn runge(x: f64) -> f64 {
    1.0 / (1.0 + 25.0 * x * x)
}

fn runge_antiderivative(x: f64) -> f64 {
    (5.0 * x).atan() / 5.0
}

fn sqrt_abs(x: f64) -> f64 {
    x.abs().sqrt()
}

fn sqrt_abs_antiderivative(x: f64) -> f64 {
    2.0 / 3.0 * x.signum() * x.abs().powf(1.5)
}

fn oscillating(x: f64) -> f64 {
    (1.0 / (x + 0.05)).sin()
}

const CATALOG: &[NamedIntegrand] = &[
    NamedIntegrand {
        name: "sin",
        description: "sin(x)",
        function: f64::sin,
        antiderivative: Some(neg_cos),
    },
    NamedIntegrand {
        name: "square",
        description: "x^2",
        function: square,
        antiderivative: Some(square_antiderivative),
    },
    NamedIntegrand {
        name: "cubic",
        description: "x^3 - 2x",
        function: cubic,
        antiderivative: Some(cubic_antiderivative),
    },
    NamedIntegrand {
        name: "exp",
        description: "e^x",
        function: f64::exp,
        antiderivative: Some(f64::exp),
    },
    NamedIntegrand {
        name: "runge",
        description: "1 / (1 + 25x^2)",
        function: runge,
        antiderivative: Some(runge_antiderivative),
    },
    NamedIntegrand {
        name: "sqrt",
        description: "sqrt(|x|)",
        function: sqrt_abs,
        antiderivative: Some(sqrt_abs_antiderivative),
    },
    NamedIntegrand {
        name: "oscillating",
        description: "sin(1 / (x + 0.05))",
        function: oscillating,
        antiderivative: None,
    },
];

/// Find an integrand by name (case-insensitive).
pub fn lookup(name: &str) -> Option<NamedIntegrand> {
    CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name.trim()))
        .copied()
}

pub fn entries() -> &'static [NamedIntegrand] {
    CATALOG
}

pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.name).collect()
}
