//! Utility functions for synthetic scouting data and printed summaries.
use crate::datasets::{Dataset, Example};
use crate::session::Session;
use rand::Rng;

/// Ground truth used for synthetic data: `10 + 0.8*x1 + 0.5*x2`.
pub const SYNTHETIC_TRUTH: (f64, f64, f64) = (10.0, 0.8, 0.5);

/// Generate synthetic examples around realistic pitch speeds and launch angles
pub fn generate_synthetic_examples(n_samples: usize) -> Dataset {
    generate_synthetic_examples_with(&mut rand::thread_rng(), n_samples)
}

pub fn generate_synthetic_examples_with<R: Rng>(rng: &mut R, n_samples: usize) -> Dataset {
    let (b, w1, w2) = SYNTHETIC_TRUTH;
    (0..n_samples)
        .map(|_| {
            let x1: f64 = rng.gen_range(80.0..100.0);
            let x2: f64 = rng.gen_range(15.0..35.0);
            let noise: f64 = rng.gen_range(-2.0..2.0);
            Example { x1, x2, y: b + w1 * x1 + w2 * x2 + noise }
        })
        .collect()
}

/// Print session summary
pub fn print_session_summary(session: &Session) {
    let challenges = session.challenges();
    println!("Model: {}", session.unit());
    println!(
        "Learning rate: {} | Epochs trained: {} | Last loss: {}",
        session.trainer().learning_rate(),
        session.trainer().epochs_trained(),
        session
            .last_loss()
            .map_or_else(|| "n/a".to_string(), |l| format!("{:.4}", l))
    );
    println!(
        "Challenges: {}/{} completed | Accuracy: {:.0}% | Progress: {:.0}%",
        challenges.state().completed,
        challenges.state().attempted,
        challenges.accuracy(),
        challenges.progress()
    );
}

/// Print simple table for losses, one row per tenth of the run
pub fn print_summary_table(values: &[f64], title: &str) {
    println!("\n{} Summary Table:", title);
    println!("+-----------------+--------------+");
    println!("| Epoch Range     |    Avg Value |");
    println!("+-----------------+--------------+");
    for (start, end, avg) in summarize(values, 10) {
        println!("| {:>6} - {:<6} | {:>12.4} |", start, end, avg);
    }
    println!("+-----------------+--------------+");
}

/// Average `values` over at most `rows` contiguous, 1-based epoch ranges.
pub fn summarize(values: &[f64], rows: usize) -> Vec<(usize, usize, f64)> {
    if values.is_empty() || rows == 0 {
        return Vec::new();
    }
    let chunk = values.len().div_ceil(rows);
    values
        .chunks(chunk)
        .enumerate()
        .map(|(i, c)| {
            let start = i * chunk + 1;
            (start, start + c.len() - 1, c.iter().sum::<f64>() / c.len() as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_synthetic_examples_follow_truth() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = generate_synthetic_examples_with(&mut rng, 50);
        assert_eq!(data.len(), 50);
        for e in &data {
            assert!((80.0..100.0).contains(&e.x1));
            assert!((15.0..35.0).contains(&e.x2));
            let truth = 10.0 + 0.8 * e.x1 + 0.5 * e.x2;
            assert!((e.y - truth).abs() <= 2.0);
            assert!(e.validate().is_ok());
        }
    }

    #[test]
    fn test_synthetic_examples_are_seeded() {
        let a = generate_synthetic_examples_with(&mut StdRng::seed_from_u64(1), 5);
        let b = generate_synthetic_examples_with(&mut StdRng::seed_from_u64(1), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_summarize() {
        assert!(summarize(&[], 10).is_empty());
        let rows = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(rows, vec![(1, 3, 2.0), (4, 5, 4.5)]);
        let rows = summarize(&[4.0, 2.0], 10);
        assert_eq!(rows, vec![(1, 1, 4.0), (2, 2, 2.0)]);
    }
}
