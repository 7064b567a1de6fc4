//! Squared-error loss used by the trainer.
use crate::error::{Error, Result};

/// Squared error of a single prediction.
pub fn squared_error(pred: f64, target: f64) -> f64 {
    let error = pred - target;
    error * error
}

/// Gradient of the squared error with respect to the prediction, with the
/// conventional factor of 2 folded into the learning rate.
pub fn squared_error_deriv(pred: f64, target: f64) -> f64 {
    pred - target
}

/// MSE
pub fn mse_loss(pred: &[f64], target: &[f64]) -> Result<f64> {
    if pred.len() != target.len() {
        return Err(Error::InvalidArgument(format!(
            "pred and target size mismatch: {} vs {}",
            pred.len(),
            target.len()
        )));
    }
    if pred.is_empty() {
        return Err(Error::EmptyDataset);
    }
    Ok(pred
        .iter()
        .zip(target)
        .map(|(&p, &t)| squared_error(p, t))
        .sum::<f64>()
        / pred.len() as f64)
}
