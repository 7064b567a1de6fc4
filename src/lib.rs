//! A single-neuron teaching core: forward pass, full-batch gradient descent,
//! and a challenge scoreboard that checks goals against the model state.
//!
//! - `Unit` with identity, ReLU and sigmoid activations
//! - `Trainer` with cooperative, cancellable multi-epoch runs
//! - `ChallengeEngine` with the five built-in league goals
//! - `Session` tying them together for a UI layer
//! - JSON/CSV dataset loaders and TOML session config

pub mod activations;
pub mod error;
pub mod unit;
pub mod loss;
pub mod datasets;
pub mod trainer;
pub mod challenges;
pub mod config;
pub mod session;
pub mod utils;

pub use activations::Activation;
pub use error::{Error, Result};
pub use unit::{ForwardPass, Unit};
pub use loss::{mse_loss, squared_error};
pub use datasets::{fallback_examples, load_dataset, load_or_fallback, Dataset, Example};
pub use trainer::{Gradients, RunGuard, StopHandle, Trainer, TrainingResult, TrainingSummary};
pub use challenges::{default_catalog, ChallengeEngine, ChallengeState, Goal};
pub use config::SessionConfig;
pub use session::Session;
pub use utils::{generate_synthetic_examples, print_session_summary, print_summary_table};
