//! Single computational unit with a bias, two weights, two inputs and an activation.
use crate::activations::Activation;
use crate::error::{ensure_finite, Result};
use std::fmt;
use tracing::debug;

pub const DEFAULT_BIAS: f64 = 0.0;
pub const DEFAULT_W1: f64 = 1.0;
pub const DEFAULT_W2: f64 = 0.5;
pub const DEFAULT_X1: f64 = 90.0;
pub const DEFAULT_X2: f64 = 25.0;

/// Result of one forward evaluation: pre-activation `z` and prediction `y_hat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardPass {
    pub z: f64,
    pub y_hat: f64,
}

/// A single neuron: `y_hat = act(bias + w1*x1 + w2*x2)`.
///
/// Fields are private so every mutation goes through a setter that validates
/// finiteness and drops the cached forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    bias: f64,
    w1: f64,
    w2: f64,
    x1: f64,
    x2: f64,
    activation: Activation,
    cached: Option<ForwardPass>,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            bias: DEFAULT_BIAS,
            w1: DEFAULT_W1,
            w2: DEFAULT_W2,
            x1: DEFAULT_X1,
            x2: DEFAULT_X2,
            activation: Activation::Identity,
            cached: None,
        }
    }
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn w1(&self) -> f64 {
        self.w1
    }

    pub fn w2(&self) -> f64 {
        self.w2
    }

    /// `(bias, w1, w2)`
    pub fn parameters(&self) -> (f64, f64, f64) {
        (self.bias, self.w1, self.w2)
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn x2(&self) -> f64 {
        self.x2
    }

    pub fn inputs(&self) -> (f64, f64) {
        (self.x1, self.x2)
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Replace all three parameters. Nothing changes if any value is non-finite.
    pub fn set_parameters(&mut self, bias: f64, w1: f64, w2: f64) -> Result<()> {
        let bias = ensure_finite("bias", bias)?;
        let w1 = ensure_finite("w1", w1)?;
        let w2 = ensure_finite("w2", w2)?;
        self.bias = bias;
        self.w1 = w1;
        self.w2 = w2;
        self.cached = None;
        debug!(bias, w1, w2, "parameters set");
        Ok(())
    }

    pub fn set_inputs(&mut self, x1: f64, x2: f64) -> Result<()> {
        let x1 = ensure_finite("x1", x1)?;
        let x2 = ensure_finite("x2", x2)?;
        self.x1 = x1;
        self.x2 = x2;
        self.cached = None;
        debug!(x1, x2, "inputs set");
        Ok(())
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
        self.cached = None;
        debug!(%activation, "activation set");
    }

    /// Restore the default parameters, inputs and activation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn activate(&self, z: f64) -> f64 {
        self.activation.apply(z)
    }

    /// Recomputed from `z` on every call; never reads the cache.
    pub fn activate_derivative(&self, z: f64) -> f64 {
        self.activation.derivative(z)
    }

    /// Linear combination for arbitrary inputs, leaving the stored inputs alone.
    pub fn linear(&self, x1: f64, x2: f64) -> f64 {
        self.bias + self.w1 * x1 + self.w2 * x2
    }

    /// Forward pass for arbitrary inputs without touching the cache.
    pub fn evaluate(&self, x1: f64, x2: f64) -> ForwardPass {
        let z = self.linear(x1, x2);
        ForwardPass { z, y_hat: self.activate(z) }
    }

    /// Forward pass on the stored inputs without touching the cache.
    pub fn predict(&self) -> ForwardPass {
        self.evaluate(self.x1, self.x2)
    }

    /// Forward pass on the stored inputs; caches and returns `(z, y_hat)`.
    pub fn forward(&mut self) -> ForwardPass {
        let pass = self.predict();
        self.cached = Some(pass);
        pass
    }

    /// The last forward pass, if no mutation happened since.
    pub fn last_forward(&self) -> Option<ForwardPass> {
        self.cached
    }

    pub fn z(&self) -> Option<f64> {
        self.cached.map(|p| p.z)
    }

    pub fn y_hat(&self) -> Option<f64> {
        self.cached.map(|p| p.y_hat)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "z = {:.2} + {:.2}·{} + {:.2}·{}, ŷ = {}(z)",
            self.bias, self.w1, self.x1, self.w2, self.x2, self.activation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let unit = Unit::new();
        assert_eq!(unit.parameters(), (0.0, 1.0, 0.5));
        assert_eq!(unit.inputs(), (90.0, 25.0));
        assert_eq!(unit.activation(), Activation::Identity);
        assert_eq!(unit.last_forward(), None);
    }

    #[test]
    fn test_forward_default_unit() {
        let mut unit = Unit::new();
        let pass = unit.forward();
        assert_eq!(pass.z, 102.5);
        assert_eq!(pass.y_hat, 102.5);
        assert_eq!(unit.z(), Some(102.5));
        assert_eq!(unit.y_hat(), Some(102.5));
    }

    #[test]
    fn test_forward_applies_activation() {
        let mut unit = Unit::new();
        unit.set_parameters(-200.0, 1.0, 0.5).unwrap();
        unit.set_activation(Activation::ReLU);
        let pass = unit.forward();
        assert_eq!(pass.z, -97.5);
        assert_eq!(pass.y_hat, 0.0);

        unit.set_parameters(0.0, 0.0, 0.0).unwrap();
        unit.set_activation(Activation::Sigmoid);
        assert_eq!(unit.forward().y_hat, 0.5);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mut unit = Unit::new();
        unit.forward();
        unit.set_inputs(95.0, 30.0).unwrap();
        assert_eq!(unit.last_forward(), None);

        unit.forward();
        unit.set_parameters(1.0, 1.0, 1.0).unwrap();
        assert_eq!(unit.last_forward(), None);

        unit.forward();
        unit.set_activation(Activation::Sigmoid);
        assert_eq!(unit.last_forward(), None);
    }

    #[test]
    fn test_predict_leaves_cache_alone() {
        let unit = Unit::new();
        assert_eq!(unit.predict().y_hat, 102.5);
        assert_eq!(unit.last_forward(), None);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut unit = Unit::new();
        unit.forward();
        assert!(unit.set_parameters(f64::NAN, 0.0, 0.0).is_err());
        assert!(unit.set_parameters(0.0, f64::INFINITY, 0.0).is_err());
        assert!(unit.set_inputs(0.0, f64::NEG_INFINITY).is_err());
        // a rejected command changes nothing, including the cache
        assert_eq!(unit.parameters(), (0.0, 1.0, 0.5));
        assert_eq!(unit.inputs(), (90.0, 25.0));
        assert!(unit.last_forward().is_some());
    }

    #[test]
    fn test_reset() {
        let mut unit = Unit::new();
        unit.set_parameters(3.0, 4.0, 5.0).unwrap();
        unit.set_inputs(1.0, 2.0).unwrap();
        unit.set_activation(Activation::ReLU);
        unit.reset();
        assert_eq!(unit, Unit::default());
    }

    #[test]
    fn test_display() {
        let unit = Unit::new();
        assert_eq!(unit.to_string(), "z = 0.00 + 1.00·90 + 0.50·25, ŷ = identity(z)");
    }

    fn any_activation() -> impl Strategy<Value = Activation> {
        prop_oneof![
            Just(Activation::Identity),
            Just(Activation::ReLU),
            Just(Activation::Sigmoid),
        ]
    }

    proptest! {
        #[test]
        fn forward_is_deterministic(
            bias in -1e6f64..1e6,
            w1 in -1e3f64..1e3,
            w2 in -1e3f64..1e3,
            x1 in -1e3f64..1e3,
            x2 in -1e3f64..1e3,
            activation in any_activation(),
        ) {
            let mut unit = Unit::new();
            unit.set_parameters(bias, w1, w2).unwrap();
            unit.set_inputs(x1, x2).unwrap();
            unit.set_activation(activation);
            let first = unit.forward();
            let second = unit.forward();
            prop_assert_eq!(first, second);
            prop_assert_eq!(first, unit.predict());
        }
    }
}
