//! Derived Stats Aggregator
//!
//! Recomputes daily calorie/protein totals and progress from the current
//! set of committed log entries plus plan targets. [`DailyStats`] is pure
//! derived state: recreated on every computation, never mutated in place,
//! and order-independent over the log set (sums are commutative).
//!
//! Proposed actions (`propose_food` / `propose_exercise`) never reach the
//! log set and are therefore never counted here.

use crate::api::types::{ExerciseLog, MealLog, MealPlanItem};
use crate::profile::Plan;

/// Daily calorie/protein targets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Targets {
    /// Calorie target (kcal)
    pub calories: i64,
    /// Protein target (grams)
    pub protein: f64,
}

impl Targets {
    /// Fixed lookup table for the active plan
    ///
    /// Used when no concrete day plan exists for today.
    #[must_use]
    pub fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Cut => Self {
                calories: 1800,
                protein: 160.0,
            },
            Plan::Maintain => Self {
                calories: 2200,
                protein: 150.0,
            },
            Plan::Bulk => Self {
                calories: 2900,
                protein: 180.0,
            },
        }
    }

    /// Targets summed from a fetched day plan, when one exists
    ///
    /// Returns `None` for an empty plan so callers can fall back to the
    /// per-plan table.
    #[must_use]
    pub fn from_meal_plan(plan: &[MealPlanItem]) -> Option<Self> {
        if plan.is_empty() {
            return None;
        }
        Some(Self {
            calories: plan.iter().map(|item| item.calories).sum(),
            protein: plan.iter().map(|item| item.protein_g).sum(),
        })
    }
}

/// Derived daily progress snapshot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyStats {
    /// Calories consumed today (kcal)
    pub calories_consumed: i64,
    /// Calorie target (kcal)
    pub calories_target: i64,
    /// Protein consumed today (grams)
    pub protein_consumed: f64,
    /// Protein target (grams)
    pub protein_target: f64,
    /// Completed set-groups today (one per exercise log entry)
    pub workouts_completed: usize,
}

impl DailyStats {
    /// Calorie progress, clamped to 0..=100
    #[must_use]
    pub fn calories_pct(&self) -> u8 {
        percentage(self.calories_consumed as f64, self.calories_target as f64)
    }

    /// Protein progress, clamped to 0..=100
    #[must_use]
    pub fn protein_pct(&self) -> u8 {
        percentage(self.protein_consumed, self.protein_target)
    }

    /// Calories over target, surfaced only when positive
    #[must_use]
    pub fn calories_excess(&self) -> Option<i64> {
        let excess = self.calories_consumed - self.calories_target;
        (excess > 0).then_some(excess)
    }

    /// Protein over target, surfaced only when positive
    #[must_use]
    pub fn protein_excess(&self) -> Option<f64> {
        let excess = self.protein_consumed - self.protein_target;
        (excess > 0.0).then_some(excess)
    }

    /// Calories left toward the target (may be negative)
    #[must_use]
    pub fn calories_remaining(&self) -> i64 {
        self.calories_target - self.calories_consumed
    }
}

/// Clamped percentage display; a zero target shows 0 when nothing is
/// consumed and 100 otherwise.
fn percentage(consumed: f64, target: f64) -> u8 {
    if target <= 0.0 {
        return if consumed > 0.0 { 100 } else { 0 };
    }
    let pct = (consumed / target * 100.0).clamp(0.0, 100.0);
    pct.round() as u8
}

/// Compute today's stats from committed logs and targets
///
/// Pure function of `(logs, targets)`; idempotent. Each exercise log entry
/// is one completed set-group — entries are not deduplicated by name.
#[must_use]
pub fn compute_stats(
    meal_logs: &[MealLog],
    exercise_logs: &[ExerciseLog],
    targets: &Targets,
) -> DailyStats {
    DailyStats {
        calories_consumed: meal_logs.iter().map(|m| m.calories).sum(),
        calories_target: targets.calories,
        protein_consumed: meal_logs.iter().map(|m| m.protein_g).sum(),
        protein_target: targets.protein,
        workouts_completed: exercise_logs.len(),
    }
}
