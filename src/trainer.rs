//! Full-batch gradient descent for a single unit, with cooperative cancellation.
use crate::datasets::{Dataset, Example};
use crate::error::{ensure_finite, Error, Result};
use crate::loss::{mse_loss, squared_error, squared_error_deriv};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Gradients (and loss) for one example, or their mean over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gradients {
    pub d_bias: f64,
    pub d_w1: f64,
    pub d_w2: f64,
    pub loss: f64,
}

/// Record of one completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Cumulative 1-based epoch number on this trainer.
    pub epoch: usize,
    /// Mean squared error over the dataset before this epoch's update.
    pub loss: f64,
    pub bias: f64,
    pub w1: f64,
    pub w2: f64,
}

/// Outcome of a [`Trainer::train`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub epochs_requested: usize,
    pub epochs_run: usize,
    pub cancelled: bool,
    pub last: Option<TrainingResult>,
}

#[derive(Debug, Default)]
struct RunControl {
    running: AtomicBool,
    cancel: AtomicBool,
}

/// Cloneable handle that requests cancellation of the current run.
///
/// Safe to move into an epoch callback or another thread. A request only
/// takes effect at the next epoch boundary.
#[derive(Debug, Clone)]
pub struct StopHandle {
    control: Arc<RunControl>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.control.cancel.store(true, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.control.running.load(Ordering::Acquire)
    }
}

/// In-flight marker for a training run; released on drop.
///
/// [`Trainer::train`] takes one internally. Hosts that drive
/// [`Trainer::run_epoch`] from their own scheduler take one with
/// [`Trainer::begin_run`] so that a concurrent `train` is refused.
#[derive(Debug)]
pub struct RunGuard {
    control: Arc<RunControl>,
}

impl RunGuard {
    pub fn cancel_requested(&self) -> bool {
        self.control.cancel.load(Ordering::Acquire)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.running.store(false, Ordering::Release);
    }
}

/// Gradient-descent trainer bound to one [`Unit`].
#[derive(Debug)]
pub struct Trainer {
    unit: Unit,
    dataset: Dataset,
    learning_rate: f64,
    epochs_trained: usize,
    last_run_epochs: usize,
    pacing: Duration,
    control: Arc<RunControl>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(Unit::default())
    }
}

impl Trainer {
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            dataset: Vec::new(),
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs_trained: 0,
            last_run_epochs: 0,
            pacing: Duration::ZERO,
            control: Arc::new(RunControl::default()),
        }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut Unit {
        &mut self.unit
    }

    pub fn dataset(&self) -> &[Example] {
        &self.dataset
    }

    /// Replace the dataset. An empty dataset is accepted here and rejected
    /// when an epoch is requested.
    pub fn set_dataset(&mut self, examples: Dataset) -> Result<()> {
        for (i, example) in examples.iter().enumerate() {
            example
                .validate()
                .map_err(|e| Error::InvalidArgument(format!("example {}: {}", i, e)))?;
        }
        debug!(examples = examples.len(), "dataset set");
        self.dataset = examples;
        Ok(())
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Any finite rate is accepted, including zero and negative values.
    pub fn set_learning_rate(&mut self, rate: f64) -> Result<()> {
        self.learning_rate = ensure_finite("learning_rate", rate)?;
        debug!(learning_rate = rate, "learning rate set");
        Ok(())
    }

    pub fn reset_learning_rate(&mut self) {
        self.learning_rate = DEFAULT_LEARNING_RATE;
    }

    /// Delay inserted between epochs of [`Trainer::train`], for hosts that render each epoch.
    pub fn set_pacing(&mut self, pacing: Duration) {
        self.pacing = pacing;
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Completed epochs since this trainer was created.
    pub fn epochs_trained(&self) -> usize {
        self.epochs_trained
    }

    /// Epochs completed by the most recent [`Trainer::train`] call.
    pub fn last_run_epochs(&self) -> usize {
        self.last_run_epochs
    }

    pub fn is_running(&self) -> bool {
        self.control.running.load(Ordering::Acquire)
    }

    /// Request cancellation of the current run.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { control: Arc::clone(&self.control) }
    }

    /// Mark a run as in flight, clearing any stale cancellation request.
    pub fn begin_run(&self) -> Result<RunGuard> {
        self.control
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AlreadyRunning)?;
        self.control.cancel.store(false, Ordering::Release);
        Ok(RunGuard { control: Arc::clone(&self.control) })
    }

    /// Gradients for a single example, evaluated on the given inputs rather
    /// than the unit's stored ones.
    ///
    /// `d_bias = (y_hat - y) * act'(z)`; the factor of 2 from the squared
    /// error is folded into the learning rate.
    pub fn compute_gradients(&self, x1: f64, x2: f64, y_true: f64) -> Gradients {
        let pass = self.unit.evaluate(x1, x2);
        let error = squared_error_deriv(pass.y_hat, y_true);
        let d_bias = error * self.unit.activate_derivative(pass.z);
        Gradients {
            d_bias,
            d_w1: d_bias * x1,
            d_w2: d_bias * x2,
            loss: squared_error(pass.y_hat, y_true),
        }
    }

    /// Mean gradients and mean loss over the whole dataset.
    pub fn batch_gradients(&self) -> Result<Gradients> {
        if self.dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let mut sum = Gradients::default();
        for example in &self.dataset {
            let g = self.compute_gradients(example.x1, example.x2, example.y);
            sum.d_bias += g.d_bias;
            sum.d_w1 += g.d_w1;
            sum.d_w2 += g.d_w2;
            sum.loss += g.loss;
        }
        let n = self.dataset.len() as f64;
        Ok(Gradients {
            d_bias: sum.d_bias / n,
            d_w1: sum.d_w1 / n,
            d_w2: sum.d_w2 / n,
            loss: sum.loss / n,
        })
    }

    /// Apply gradients (GD step). Leaves the unit untouched if the step
    /// would produce a non-finite parameter.
    pub fn apply_gradients(&mut self, grads: &Gradients) -> Result<()> {
        let lr = self.learning_rate;
        let (bias, w1, w2) = self.unit.parameters();
        let next = [
            ("bias", bias - lr * grads.d_bias),
            ("w1", w1 - lr * grads.d_w1),
            ("w2", w2 - lr * grads.d_w2),
        ];
        if let Some(&(name, value)) = next.iter().find(|(_, v)| !v.is_finite()) {
            return Err(diverged(name, value));
        }
        self.unit.set_parameters(next[0].1, next[1].1, next[2].1)
    }

    /// One full-batch epoch: mean gradients over every example, then one update.
    ///
    /// A non-finite loss or parameter fails the epoch and leaves the unit unchanged.
    pub fn run_epoch(&mut self) -> Result<TrainingResult> {
        let grads = self.batch_gradients()?;
        if !grads.loss.is_finite() {
            return Err(diverged("loss", grads.loss));
        }
        self.apply_gradients(&grads)?;
        self.epochs_trained += 1;
        let (bias, w1, w2) = self.unit.parameters();
        let result = TrainingResult { epoch: self.epochs_trained, loss: grads.loss, bias, w1, w2 };
        debug!(epoch = result.epoch, loss = result.loss, bias, w1, w2, "epoch complete");
        Ok(result)
    }

    /// Mean squared error of the current unit over the dataset, without updating.
    pub fn dataset_loss(&self) -> Result<f64> {
        let (pred, target): (Vec<f64>, Vec<f64>) = self
            .dataset
            .iter()
            .map(|e| (self.unit.evaluate(e.x1, e.x2).y_hat, e.y))
            .unzip();
        mse_loss(&pred, &target)
    }

    /// Run `epochs` sequential epochs, calling `on_epoch_complete(index, total, result)`
    /// after each one with a 1-based index.
    ///
    /// Cancellation is checked before every epoch; between epochs the thread
    /// yields and sleeps for the configured pacing.
    pub fn train<F>(&mut self, epochs: usize, mut on_epoch_complete: F) -> Result<TrainingSummary>
    where
        F: FnMut(usize, usize, &TrainingResult),
    {
        let guard = self.begin_run()?;
        self.last_run_epochs = 0;
        info!(
            epochs,
            learning_rate = self.learning_rate,
            examples = self.dataset.len(),
            "training started"
        );
        let mut summary = TrainingSummary {
            epochs_requested: epochs,
            epochs_run: 0,
            cancelled: false,
            last: None,
        };
        for epoch in 1..=epochs {
            if guard.cancel_requested() {
                summary.cancelled = true;
                break;
            }
            let result = self.run_epoch()?;
            on_epoch_complete(epoch, epochs, &result);
            summary.epochs_run = epoch;
            self.last_run_epochs = epoch;
            summary.last = Some(result);
            if epoch < epochs {
                std::thread::yield_now();
                if !self.pacing.is_zero() {
                    std::thread::sleep(self.pacing);
                }
            }
        }
        match summary.last {
            Some(last) => info!(
                epochs_run = summary.epochs_run,
                cancelled = summary.cancelled,
                loss = last.loss,
                "training finished"
            ),
            None => info!(cancelled = summary.cancelled, "training finished without running an epoch"),
        }
        Ok(summary)
    }
}

fn diverged(name: &str, value: f64) -> Error {
    Error::InvalidArgument(format!("training diverged: {} became {}", name, value))
}
