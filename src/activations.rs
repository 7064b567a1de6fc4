use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::error::Error;

/// Activation applied to the unit's linear output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Linear: identity
    #[default]
    #[serde(alias = "linear")]
    Identity,
    /// ReLU: max(0, x)
    ReLU,
    /// Sigmoid: 1 / (1 + exp(-x))
    Sigmoid,
}

impl Activation {
    pub const ALL: [Activation; 3] = [Activation::Identity, Activation::ReLU, Activation::Sigmoid];

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::ReLU => x.max(0.0),
            Activation::Sigmoid => sigmoid(x),
        }
    }

    /// Derivative with respect to the pre-activation. ReLU uses 0 at exactly 0.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::ReLU => (x > 0.0) as u8 as f64,
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::ReLU => "relu",
            Activation::Sigmoid => "sigmoid",
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Activation::Identity => "identity",
            Activation::ReLU => "ReLU",
            Activation::Sigmoid => "sigmoid",
        };
        f.write_str(label)
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" => Ok(Activation::Identity),
            "relu" => Ok(Activation::ReLU),
            "sigmoid" => Ok(Activation::Sigmoid),
            other => Err(Error::InvalidArgument(format!("unknown activation: {:?}", other))),
        }
    }
}
