//! Challenge catalog and the scoreboard that evaluates goals against model state.
use crate::activations::Activation;
use crate::error::{Error, Result};
use crate::trainer::Trainer;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Predicate over a unit, an optional trainer and the last observed loss.
pub type GoalCheck = Box<dyn Fn(&Unit, Option<&Trainer>, Option<f64>) -> bool + Send + Sync>;

/// A named pedagogical goal.
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub hints: Vec<String>,
    /// Worked answer, one step per entry.
    pub solution: Vec<String>,
    check: GoalCheck,
}

impl Goal {
    pub fn new<F>(id: &str, title: &str, description: &str, hints: &[&str], check: F) -> Self
    where
        F: Fn(&Unit, Option<&Trainer>, Option<f64>) -> bool + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
            solution: Vec::new(),
            check: Box::new(check),
        }
    }

    pub fn with_solution(mut self, steps: &[&str]) -> Self {
        self.solution = steps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_met(&self, unit: &Unit, trainer: Option<&Trainer>, last_loss: Option<f64>) -> bool {
        (self.check)(unit, trainer, last_loss)
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("hints", &self.hints.len())
            .field("solution", &self.solution.len())
            .finish_non_exhaustive()
    }
}

pub const ROOKIE_INPUTS: (f64, f64) = (95.0, 30.0);
pub const INPUT_TOLERANCE: f64 = 0.1;
pub const SINGLE_A_TARGET: f64 = 100.0;
pub const SINGLE_A_TOLERANCE: f64 = 5.0;
pub const TRIPLE_A_MIN_EPOCHS: usize = 20;
pub const MAJOR_LOSS_THRESHOLD: f64 = 10.0;

/// The five built-in goals, in league order.
pub fn default_catalog() -> Vec<Goal> {
    vec![
        Goal::new(
            "rookie",
            "Rookie League: Understanding Forward Pass",
            "Set pitch speed to 95 mph and launch angle to 30°. What will be the predicted exit velocity with current weights?",
            &[
                "Use the Player Stats sliders to adjust the inputs.",
                "Pitch speed should be 95 mph and launch angle should be 30°.",
                "After setting the values, click \"Take a Swing\" to see the prediction.",
            ],
            |unit, _, _| {
                let (x1, x2) = unit.inputs();
                (x1 - ROOKIE_INPUTS.0).abs() < INPUT_TOLERANCE
                    && (x2 - ROOKIE_INPUTS.1).abs() < INPUT_TOLERANCE
            },
        )
        .with_solution(&[
            "Set pitch speed to 95 mph.",
            "Set launch angle to 30°.",
            "Take a swing: z = w₀ + w₁×95 + w₂×30, then apply the activation.",
        ]),
        Goal::new(
            "single-a",
            "Single-A: Adjusting Weights",
            "Try to get an exit velocity prediction of approximately 100 mph by adjusting the weights. (Pitch speed: 90, Launch angle: 25)",
            &[
                "You need to adjust the weights (w₀, w₁, w₂) to change the prediction.",
                "The formula is: z = w₀ + w₁×90 + w₂×25, then apply activation.",
                "Try increasing w₀ (bias) to shift the prediction higher.",
            ],
            |unit, _, _| (unit.predict().y_hat - SINGLE_A_TARGET).abs() < SINGLE_A_TOLERANCE,
        )
        .with_solution(&[
            "Set pitch speed to 90 and launch angle to 25.",
            "Start from w₀ ≈ 10, w₁ ≈ 0.8, w₂ ≈ 0.5.",
            "That gives z = 10 + 0.8×90 + 0.5×25 = 94.5; raise w₀ a few points to reach 100.",
            "Take a swing to check the prediction.",
        ]),
        Goal::new(
            "double-a",
            "Double-A: Activation Functions",
            "Use ReLU activation and set weights so that the prediction is positive. Then switch to Sigmoid and observe the difference.",
            &[
                "Change the activation function using the dropdown menu.",
                "ReLU returns 0 for negative inputs, max(0, z).",
                "Sigmoid squashes output between 0 and 1.",
            ],
            |unit, _, _| unit.activation() == Activation::Sigmoid,
        )
        .with_solution(&[
            "Select ReLU and take a swing: f(z) = max(0, z).",
            "Switch to Sigmoid and take a swing again: f(z) = 1/(1+e⁻ᶻ).",
            "ReLU zeroes negative z; Sigmoid squashes every z into (0, 1).",
        ]),
        Goal::new(
            "triple-a",
            "Triple-A: Training Understanding",
            "Run a training session with at least 20 epochs. Observe how the weights change to minimize loss.",
            &[
                "Set the Training Rounds slider to at least 20.",
                "Click \"Run Training Session\" to start gradient descent.",
                "Watch the weights update automatically to reduce loss.",
            ],
            |_, trainer, _| {
                trainer.is_some_and(|t| {
                    !t.is_running() && t.last_run_epochs() >= TRIPLE_A_MIN_EPOCHS
                })
            },
        )
        .with_solution(&[
            "Set the learning rate (try 0.01 or 0.05).",
            "Set the training rounds to at least 20.",
            "Run the training session and watch the weights adjust.",
            "Each epoch applies w = w - α × ∂Loss/∂w.",
        ]),
        Goal::new(
            "major",
            "Major League: Optimization Challenge",
            "Achieve a loss below 10.0 by training the network on the dataset. Use appropriate learning rate and epochs.",
            &[
                "You may need to adjust the learning rate for better convergence.",
                "Try different numbers of epochs (higher might be better).",
                "A learning rate around 0.001-0.01 usually works well.",
            ],
            |_, _, last_loss| last_loss.is_some_and(|loss| loss < MAJOR_LOSS_THRESHOLD),
        )
        .with_solution(&[
            "Start with a learning rate of 0.01 to 0.05 and 50 to 100 epochs.",
            "Run the training session and check the loss.",
            "If the loss is still above 10, lower the rate when it grows or add epochs when it falls slowly.",
            "A learning rate of 0.01 with 100 epochs on identity or sigmoid is a good combination.",
        ]),
    ]
}

/// Scoreboard counters and the active goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    pub active_goal_id: Option<String>,
    pub hints_revealed: usize,
    pub attempted: u32,
    pub completed: u32,
}

/// Tracks attempts and completions over a goal catalog.
///
/// Idle until [`ChallengeEngine::start`]; starting another goal replaces the
/// active one. Completion is reported by [`ChallengeEngine::evaluate`] and
/// never ends the active challenge.
#[derive(Debug)]
pub struct ChallengeEngine {
    catalog: Vec<Goal>,
    state: ChallengeState,
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::with_catalog(default_catalog())
    }
}

impl ChallengeEngine {
    pub fn with_catalog(catalog: Vec<Goal>) -> Self {
        Self { catalog, state: ChallengeState::default() }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.catalog
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.catalog.iter().find(|g| g.id == id)
    }

    pub fn state(&self) -> &ChallengeState {
        &self.state
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        self.state.active_goal_id.as_deref().and_then(|id| self.goal(id))
    }

    pub fn start(&mut self, goal_id: &str) -> Result<&Goal> {
        let index = self
            .catalog
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| Error::UnknownGoal(goal_id.to_string()))?;
        self.state.active_goal_id = Some(goal_id.to_string());
        self.state.hints_revealed = 0;
        self.state.attempted += 1;
        info!(goal = goal_id, attempted = self.state.attempted, "challenge started");
        Ok(&self.catalog[index])
    }

    /// Check the active goal. Every passing call counts as a completion and
    /// resets the hint ladder.
    pub fn evaluate(&mut self, unit: &Unit, trainer: Option<&Trainer>, last_loss: Option<f64>) -> bool {
        let passed = match self.active_goal() {
            Some(goal) => goal.is_met(unit, trainer, last_loss),
            None => return false,
        };
        if passed {
            self.state.completed += 1;
            self.state.hints_revealed = 0;
        }
        debug!(
            goal = self.state.active_goal_id.as_deref().unwrap_or_default(),
            passed,
            completed = self.state.completed,
            "challenge evaluated"
        );
        passed
    }

    /// Worked answer for the active goal; `None` while idle.
    pub fn solution(&self) -> Option<&[String]> {
        self.active_goal().map(|g| g.solution.as_slice())
    }

    pub fn next_hint(&mut self) -> Option<&str> {
        let index = self.state.hints_revealed;
        let id = self.state.active_goal_id.as_deref()?;
        let goal = self.catalog.iter().find(|g| g.id == id)?;
        let hint = goal.hints.get(index)?;
        self.state.hints_revealed += 1;
        Some(hint.as_str())
    }

    /// Completed / attempted as a percentage; 0 before any attempt.
    pub fn accuracy(&self) -> f64 {
        if self.state.attempted == 0 {
            0.0
        } else {
            self.state.completed as f64 / self.state.attempted as f64 * 100.0
        }
    }

    /// Completed challenges as a percentage of the catalog size.
    pub fn progress(&self) -> f64 {
        if self.catalog.is_empty() {
            0.0
        } else {
            self.state.completed as f64 / self.catalog.len() as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::fallback_examples;

    #[test]
    fn test_default_catalog() {
        let engine = ChallengeEngine::default();
        let ids: Vec<&str> = engine.goals().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["rookie", "single-a", "double-a", "triple-a", "major"]);
        assert!(engine.goals().iter().all(|g| g.hints.len() == 3));
        assert!(engine.goals().iter().all(|g| !g.solution.is_empty()));
    }

    #[test]
    fn test_solution_follows_active_goal() {
        let mut engine = ChallengeEngine::default();
        assert_eq!(engine.solution(), None);
        engine.start("single-a").unwrap();
        let steps = engine.solution().unwrap();
        assert!(steps.iter().any(|s| s.contains("w₀ ≈ 10, w₁ ≈ 0.8, w₂ ≈ 0.5")));
        engine.start("major").unwrap();
        let steps = engine.solution().unwrap();
        assert!(steps.last().unwrap().contains("0.01 with 100 epochs"));
        assert_eq!(engine.state().hints_revealed, 0);
    }

    #[test]
    fn test_custom_goal_without_solution() {
        let mut engine = ChallengeEngine::with_catalog(vec![Goal::new(
            "any",
            "Any",
            "Always passes.",
            &[],
            |_, _, _| true,
        )]);
        engine.start("any").unwrap();
        assert_eq!(engine.solution(), Some(&[][..]));
    }

    #[test]
    fn test_accuracy_before_any_attempt() {
        let engine = ChallengeEngine::default();
        assert_eq!(engine.accuracy(), 0.0);
        assert_eq!(engine.progress(), 0.0);
        assert!(engine.active_goal().is_none());
    }

    #[test]
    fn test_evaluate_idle_has_no_side_effects() {
        let mut engine = ChallengeEngine::default();
        let unit = Unit::new();
        assert!(!engine.evaluate(&unit, None, Some(0.0)));
        assert_eq!(engine.state(), &ChallengeState::default());
    }

    #[test]
    fn test_start_unknown_goal() {
        let mut engine = ChallengeEngine::default();
        assert_eq!(
            engine.start("world-series").unwrap_err(),
            Error::UnknownGoal("world-series".to_string())
        );
        assert_eq!(engine.state().attempted, 0);
    }

    #[test]
    fn test_accuracy_after_one_pass() {
        let mut engine = ChallengeEngine::default();
        let mut unit = Unit::new();
        engine.start("double-a").unwrap();
        unit.set_activation(Activation::Sigmoid);
        assert!(engine.evaluate(&unit, None, None));
        assert_eq!(engine.accuracy(), 100.0);
        assert_eq!(engine.progress(), 20.0);
    }

    #[test]
    fn test_failed_evaluate_keeps_counters() {
        let mut engine = ChallengeEngine::default();
        let unit = Unit::new();
        engine.start("rookie").unwrap();
        assert!(!engine.evaluate(&unit, None, None));
        assert_eq!(engine.state().completed, 0);
        assert_eq!(engine.accuracy(), 0.0);
    }

    #[test]
    fn test_repeated_passing_evaluate_counts_twice() {
        let mut engine = ChallengeEngine::default();
        engine.start("major").unwrap();
        let unit = Unit::new();
        assert!(engine.evaluate(&unit, None, Some(1.0)));
        assert!(engine.evaluate(&unit, None, Some(1.0)));
        assert_eq!(engine.state().completed, 2);
        assert_eq!(engine.accuracy(), 200.0);
    }

    #[test]
    fn test_start_replaces_active_goal() {
        let mut engine = ChallengeEngine::default();
        engine.start("rookie").unwrap();
        engine.next_hint();
        let goal = engine.start("major").unwrap();
        assert_eq!(goal.id, "major");
        assert_eq!(engine.state().active_goal_id.as_deref(), Some("major"));
        assert_eq!(engine.state().hints_revealed, 0);
        assert_eq!(engine.state().attempted, 2);
    }

    #[test]
    fn test_hints_in_order_then_exhausted() {
        let mut engine = ChallengeEngine::default();
        assert_eq!(engine.next_hint(), None);
        engine.start("rookie").unwrap();
        assert_eq!(engine.next_hint(), Some("Use the Player Stats sliders to adjust the inputs."));
        assert_eq!(
            engine.next_hint(),
            Some("Pitch speed should be 95 mph and launch angle should be 30°.")
        );
        assert!(engine.next_hint().is_some());
        assert_eq!(engine.next_hint(), None);
        assert_eq!(engine.state().hints_revealed, 3);
    }

    #[test]
    fn test_pass_resets_hints() {
        let mut engine = ChallengeEngine::default();
        engine.start("double-a").unwrap();
        engine.next_hint();
        engine.next_hint();
        let mut unit = Unit::new();
        unit.set_activation(Activation::Sigmoid);
        assert!(engine.evaluate(&unit, None, None));
        assert_eq!(engine.state().hints_revealed, 0);
    }

    #[test]
    fn test_rookie_goal() {
        let engine = ChallengeEngine::default();
        let goal = engine.goal("rookie").unwrap();
        let mut unit = Unit::new();
        assert!(!goal.is_met(&unit, None, None));
        unit.set_inputs(95.05, 29.95).unwrap();
        assert!(goal.is_met(&unit, None, None));
        unit.set_inputs(95.2, 30.0).unwrap();
        assert!(!goal.is_met(&unit, None, None));
    }

    #[test]
    fn test_single_a_goal() {
        let engine = ChallengeEngine::default();
        let goal = engine.goal("single-a").unwrap();
        let mut unit = Unit::new();
        // default prediction is 102.5
        assert!(goal.is_met(&unit, None, None));
        unit.set_parameters(10.0, 0.8, 0.5).unwrap();
        // 10 + 72 + 12.5 = 94.5
        assert!(!goal.is_met(&unit, None, None));
        unit.set_parameters(14.0, 0.8, 0.5).unwrap();
        assert!(goal.is_met(&unit, None, None));
    }

    #[test]
    fn test_triple_a_goal() {
        let engine = ChallengeEngine::default();
        let goal = engine.goal("triple-a").unwrap();
        let unit = Unit::new();
        let mut trainer = Trainer::default();
        trainer.set_dataset(fallback_examples()).unwrap();
        trainer.set_learning_rate(0.0001).unwrap();
        assert!(!goal.is_met(&unit, None, None));
        trainer.train(19, |_, _, _| {}).unwrap();
        assert!(!goal.is_met(trainer.unit(), Some(&trainer), None));
        trainer.train(20, |_, _, _| {}).unwrap();
        assert!(goal.is_met(trainer.unit(), Some(&trainer), None));
        let _guard = trainer.begin_run().unwrap();
        assert!(!goal.is_met(trainer.unit(), Some(&trainer), None));
    }

    #[test]
    fn test_triple_a_needs_one_long_run() {
        let engine = ChallengeEngine::default();
        let goal = engine.goal("triple-a").unwrap();
        let mut trainer = Trainer::default();
        trainer.set_dataset(fallback_examples()).unwrap();
        trainer.set_learning_rate(0.0001).unwrap();
        for _ in 0..20 {
            trainer.train(1, |_, _, _| {}).unwrap();
        }
        assert_eq!(trainer.epochs_trained(), 20);
        assert!(!goal.is_met(trainer.unit(), Some(&trainer), None));
        trainer.train(25, |_, _, _| {}).unwrap();
        assert!(goal.is_met(trainer.unit(), Some(&trainer), None));
        trainer.train(3, |_, _, _| {}).unwrap();
        assert!(!goal.is_met(trainer.unit(), Some(&trainer), None));
    }

    #[test]
    fn test_major_goal() {
        let engine = ChallengeEngine::default();
        let goal = engine.goal("major").unwrap();
        let unit = Unit::new();
        assert!(!goal.is_met(&unit, None, None));
        assert!(!goal.is_met(&unit, None, Some(10.0)));
        assert!(goal.is_met(&unit, None, Some(9.99)));
    }

    #[test]
    fn test_custom_catalog() {
        let mut engine = ChallengeEngine::with_catalog(vec![Goal::new(
            "positive-bias",
            "Positive bias",
            "Make the bias positive.",
            &[],
            |unit, _, _| unit.bias() > 0.0,
        )]);
        engine.start("positive-bias").unwrap();
        assert_eq!(engine.next_hint(), None);
        let mut unit = Unit::new();
        assert!(!engine.evaluate(&unit, None, None));
        unit.set_parameters(1.0, 1.0, 0.5).unwrap();
        assert!(engine.evaluate(&unit, None, None));
        assert_eq!(engine.progress(), 100.0);
    }
}
