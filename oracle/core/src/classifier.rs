//! Rule-Based Message Classifier
//!
//! Decides whether a free-text chat message describes a food or an exercise
//! event and extracts the structured fields for the action envelope. This is
//! the offline/mock stand-in for the server brain: pure, synchronous, no
//! external calls, and never an error — unrecognized input falls back to a
//! static help reply.
//!
//! Keyword scanning is first-match-wins over a fixed priority order. That
//! tie-break is deliberate but arbitrary (multiple keywords can co-occur in
//! one message); keep the table order stable.

use lazy_static::lazy_static;
use regex::Regex;

use crate::messages::{Action, ExerciseAction, FoodAction};

/// Reply produced by the classifier
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    /// Assistant response text
    pub text: String,
    /// Structured action envelope
    pub action: Action,
}

/// Fixed nutrition table, scanned in priority order
const FOOD_KEYWORDS: &[(&str, &str, i64, f64)] = &[
    ("banana", "Banana", 105, 1.3),
    ("shake", "Protein Shake", 130, 24.0),
    ("coffee", "Coffee", 5, 0.3),
    ("eggs", "Scrambled Eggs", 155, 12.6),
    ("rice", "White Rice", 205, 4.3),
    ("chicken", "Chicken Breast", 165, 31.0),
    ("apple", "Apple", 95, 0.5),
    ("yogurt", "Greek Yogurt", 100, 17.0),
];

/// Words that signal food intent without naming a known item
const FOOD_INTENT: &[&str] = &["ate", "food", "meal"];

/// Words that signal an exercise event
const EXERCISE_KEYWORDS: &[&str] = &["set", "rep", "gym", "lift", "press", "squat", "deadlift"];

/// Defaults when numeric extraction finds nothing
const DEFAULT_SETS: u32 = 3;
/// Defaults when numeric extraction finds nothing
const DEFAULT_REPS: u32 = 10;

/// Reply text when an image is attached (real vision analysis is server-side)
pub const VISION_REPLY: &str =
    "Got your photo! I'll take a closer look at the meal and estimate its macros.";

/// Fallback reply when no rule matches
pub const HELP_REPLY: &str = "I can log meals and workouts for you. Try \"I ate a banana\" or \
     \"3 sets of leg press at 100kg\".";

lazy_static! {
    static ref SETS_RE: Regex = Regex::new(r"(\d+)\s*set").expect("valid regex");
    static ref REPS_RE: Regex = Regex::new(r"(\d+)\s*rep").expect("valid regex");
    static ref WEIGHT_RE: Regex = Regex::new(r"(\d+)\s*kg").expect("valid regex");
}

/// Classify a chat message into a reply and action envelope
///
/// Rules, in order:
/// 1. an attached image short-circuits to the fixed vision narrative;
/// 2. first matching food keyword wins and maps to its fixed tuple;
/// 3. food-intent words without a keyword match log a generic food item;
/// 4. exercise keywords log an exercise with regex-extracted numbers;
/// 5. anything else gets the static help reply.
#[must_use]
pub fn classify(text: &str, has_image: bool) -> Reply {
    if has_image {
        return Reply {
            text: VISION_REPLY.to_string(),
            action: Action::None,
        };
    }

    let lower = text.to_lowercase();

    for &(keyword, name, calories, protein) in FOOD_KEYWORDS {
        if lower.contains(keyword) {
            return food_reply(name, calories, protein);
        }
    }

    if FOOD_INTENT.iter().any(|w| lower.contains(w)) {
        return food_reply("Food Item", 200, 10.0);
    }

    if EXERCISE_KEYWORDS.iter().any(|w| lower.contains(w)) {
        return exercise_reply(&lower);
    }

    Reply {
        text: HELP_REPLY.to_string(),
        action: Action::None,
    }
}

fn food_reply(name: &str, calories: i64, protein: f64) -> Reply {
    let text = format!("Logged {name}: {calories} kcal, {protein:.0}g protein.");
    Reply {
        text,
        action: Action::LogFood(FoodAction {
            name: name.to_string(),
            calories,
            protein,
            is_tracked: true,
        }),
    }
}

fn exercise_reply(lower: &str) -> Reply {
    let name = if lower.contains("press") {
        "Leg Press"
    } else if lower.contains("squat") {
        "Barbell Squat"
    } else if lower.contains("deadlift") {
        "Romanian Deadlift"
    } else {
        "Exercise"
    };

    let sets = extract_number(&SETS_RE, lower).unwrap_or(DEFAULT_SETS);
    let reps = extract_number(&REPS_RE, lower).unwrap_or(DEFAULT_REPS);
    let weight = f64::from(extract_number(&WEIGHT_RE, lower).unwrap_or(0));

    let text = format!("Logged {name}: {sets}x{reps} at {weight:.0}kg.");
    Reply {
        text,
        action: Action::LogExercise(ExerciseAction {
            name: name.to_string(),
            sets,
            reps,
            weight,
            is_tracked: true,
        }),
    }
}

/// Extract the first numeric prefix matched by `re`, e.g. `3` from "3 sets"
fn extract_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn food(reply: &Reply) -> &FoodAction {
        match &reply.action {
            Action::LogFood(food) => food,
            other => panic!("expected LogFood, got {other:?}"),
        }
    }

    fn exercise(reply: &Reply) -> &ExerciseAction {
        match &reply.action {
            Action::LogExercise(ex) => ex,
            other => panic!("expected LogExercise, got {other:?}"),
        }
    }

    #[test]
    fn test_every_food_keyword_maps_to_its_tuple() {
        for &(keyword, name, calories, protein) in FOOD_KEYWORDS {
            let reply = classify(&format!("I ate a {keyword}"), false);
            let food = food(&reply);
            assert_eq!(food.name, name);
            assert_eq!(food.calories, calories);
            assert!((food.protein - protein).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let reply = classify("I ATE A BANANA", false);
        assert_eq!(food(&reply).name, "Banana");
    }

    #[test]
    fn test_first_match_wins_on_cooccurring_keywords() {
        // "banana" precedes "rice" in the table regardless of text order.
        let reply = classify("rice and a banana", false);
        assert_eq!(food(&reply).name, "Banana");
    }

    #[test]
    fn test_intent_words_without_keyword_log_generic_food() {
        let reply = classify("just had some food", false);
        let food = food(&reply);
        assert_eq!(food.name, "Food Item");
        assert_eq!(food.calories, 200);
        assert!((food.protein - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exercise_extraction_with_partial_numbers() {
        let reply = classify("I did 3 sets of leg press at 100kg", false);
        let ex = exercise(&reply);
        assert_eq!(ex.name, "Leg Press");
        assert_eq!(ex.sets, 3);
        assert_eq!(ex.reps, DEFAULT_REPS);
        assert!((ex.weight - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exercise_name_mapping() {
        assert_eq!(exercise(&classify("squat day", false)).name, "Barbell Squat");
        assert_eq!(
            exercise(&classify("deadlift session", false)).name,
            "Romanian Deadlift"
        );
        assert_eq!(exercise(&classify("hit the gym", false)).name, "Exercise");
    }

    #[test]
    fn test_exercise_defaults_when_no_numbers() {
        let reply = classify("went to the gym", false);
        let ex = exercise(&reply);
        assert_eq!(ex.sets, DEFAULT_SETS);
        assert_eq!(ex.reps, DEFAULT_REPS);
        assert!((ex.weight - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_rep_extraction() {
        let reply = classify("4 sets of 8 reps squat at 80 kg", false);
        let ex = exercise(&reply);
        assert_eq!(ex.sets, 4);
        assert_eq!(ex.reps, 8);
        assert!((ex.weight - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unrecognized_text_gets_help_reply() {
        let reply = classify("how is the weather", false);
        assert_eq!(reply.action, Action::None);
        assert_eq!(reply.text, HELP_REPLY);
    }

    #[test]
    fn test_image_short_circuits_to_vision_reply() {
        // Even text full of keywords classifies as none with an image.
        let reply = classify("I ate a banana after squats", true);
        assert_eq!(reply.action, Action::None);
        assert_eq!(reply.text, VISION_REPLY);
    }
}
