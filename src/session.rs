//! One user's session: a trainer bound to its unit, the challenge scoreboard and the last loss.
use crate::activations::Activation;
use crate::challenges::{ChallengeEngine, Goal};
use crate::config::SessionConfig;
use crate::datasets::{Dataset, Example};
use crate::error::{Error, Result};
use crate::trainer::{StopHandle, Trainer, TrainingResult, TrainingSummary};
use crate::unit::{ForwardPass, Unit};
use tracing::debug;

/// Command surface consumed by the UI layer.
#[derive(Debug, Default)]
pub struct Session {
    trainer: Trainer,
    challenges: ChallengeEngine,
    last_loss: Option<f64>,
}

impl Session {
    /// Default unit, default learning rate, empty dataset, built-in goals.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_challenges(challenges: ChallengeEngine) -> Self {
        Self { trainer: Trainer::default(), challenges, last_loss: None }
    }

    /// Apply the unit and training settings of `config`. The dataset path is
    /// left to the host.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let mut session = Self::new();
        let unit = &config.unit;
        session.set_parameters(unit.bias, unit.w1, unit.w2)?;
        session.set_inputs(unit.x1, unit.x2)?;
        session.trainer.unit_mut().set_activation(unit.activation);
        session.set_learning_rate(config.training.learning_rate)?;
        session.trainer.set_pacing(config.training.pacing());
        Ok(session)
    }

    pub fn unit(&self) -> &Unit {
        self.trainer.unit()
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    pub fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    /// Loss reported by the most recent epoch, if any epoch has run.
    pub fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    pub fn set_parameters(&mut self, bias: f64, w1: f64, w2: f64) -> Result<()> {
        self.trainer.unit_mut().set_parameters(bias, w1, w2)
    }

    pub fn set_inputs(&mut self, x1: f64, x2: f64) -> Result<()> {
        self.trainer.unit_mut().set_inputs(x1, x2)
    }

    /// Select an activation by name (`identity`/`linear`, `relu`, `sigmoid`).
    pub fn set_activation(&mut self, name: &str) -> Result<Activation> {
        let activation: Activation = name.parse()?;
        self.trainer.unit_mut().set_activation(activation);
        Ok(activation)
    }

    pub fn set_dataset(&mut self, examples: Dataset) -> Result<()> {
        self.trainer.set_dataset(examples)
    }

    pub fn set_learning_rate(&mut self, rate: f64) -> Result<()> {
        self.trainer.set_learning_rate(rate)
    }

    /// Copy the inputs of dataset row `index` into the unit.
    pub fn select_example(&mut self, index: usize) -> Result<Example> {
        let example = *self.trainer.dataset().get(index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "example {} out of range for {} examples",
                index,
                self.trainer.dataset().len()
            ))
        })?;
        self.set_inputs(example.x1, example.x2)?;
        debug!(index, x1 = example.x1, x2 = example.x2, "inputs set from dataset");
        Ok(example)
    }

    /// Restore the default unit and learning rate. Dataset, score and last
    /// loss are kept.
    pub fn reset(&mut self) {
        self.trainer.unit_mut().reset();
        self.trainer.reset_learning_rate();
        debug!("controls reset to defaults");
    }

    pub fn forward(&mut self) -> ForwardPass {
        self.trainer.unit_mut().forward()
    }

    pub fn dataset_loss(&self) -> Result<f64> {
        self.trainer.dataset_loss()
    }

    pub fn run_epoch(&mut self) -> Result<TrainingResult> {
        let result = self.trainer.run_epoch()?;
        self.last_loss = Some(result.loss);
        Ok(result)
    }

    /// Train for `epochs`, recording each epoch's loss as the session's last loss.
    pub fn train<F>(&mut self, epochs: usize, mut on_epoch_complete: F) -> Result<TrainingSummary>
    where
        F: FnMut(usize, usize, &TrainingResult),
    {
        let mut last_loss = self.last_loss;
        let summary = self.trainer.train(epochs, |i, total, result| {
            last_loss = Some(result.loss);
            on_epoch_complete(i, total, result);
        });
        self.last_loss = last_loss;
        summary
    }

    pub fn stop(&self) {
        self.trainer.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.trainer.stop_handle()
    }

    pub fn start_challenge(&mut self, goal_id: &str) -> Result<&Goal> {
        self.challenges.start(goal_id)
    }

    pub fn next_hint(&mut self) -> Option<&str> {
        self.challenges.next_hint()
    }

    pub fn solution(&self) -> Option<&[String]> {
        self.challenges.solution()
    }

    /// Evaluate the active challenge against the current unit, trainer and last loss.
    pub fn evaluate(&mut self) -> bool {
        self.challenges
            .evaluate(self.trainer.unit(), Some(&self.trainer), self.last_loss)
    }
}
