//! In-Memory Mock Backend
//!
//! [`MockApi`] implements [`FitnessApi`] entirely in process: offline mode
//! and tests run against it without a server. Chat replies come from the
//! rule-based [`classifier`](crate::classifier); log entries, plans, and the
//! profile live behind a mutex and behave like their server counterparts,
//! including the auth guard (every call except the demo endpoints requires
//! a token).
//!
//! A message with an image attachment skips the classifier and produces a
//! food proposal, standing in for the server-side vision analysis.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use super::client::{ApiError, FitnessApi};
use super::types::{
    ChatHistory, ChatMessageDto, DailyLogs, DailySummary, DemoPersona, ExerciseLog,
    ExerciseLogCreate, ImageUpload, ImageUploadRequest, MealLog, MealLogCreate, MealPlanItem,
    ProfileDto, SendMessageRequest, SimulatedDay, TrainingRoutine,
};
use crate::auth::AuthSession;
use crate::classifier;
use crate::messages::{Action, ActionType, AttachmentType, ExerciseAction, FoodAction, MessageRole};
use crate::profile::Plan;
use crate::stats::{compute_stats, Targets};

/// Proposal produced for image messages, standing in for vision analysis
const VISION_PROPOSAL: (&str, i64, f64) = ("Grilled Chicken Bowl", 550, 42.0);

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

struct State {
    messages: Vec<ChatMessageDto>,
    meal_logs: Vec<MealLog>,
    exercise_logs: Vec<ExerciseLog>,
    images: HashMap<String, Vec<u8>>,
    profile: ProfileDto,
    simulated_day: u8,
}

/// In-memory [`FitnessApi`] implementation
pub struct MockApi {
    session: AuthSession,
    state: Mutex<State>,
}

impl MockApi {
    /// Create an empty mock backend sharing the given session
    #[must_use]
    pub fn new(session: AuthSession) -> Self {
        Self {
            session,
            state: Mutex::new(State {
                messages: Vec::new(),
                meal_logs: Vec::new(),
                exercise_logs: Vec::new(),
                images: HashMap::new(),
                profile: ProfileDto::default(),
                simulated_day: 0,
            }),
        }
    }

    fn require_auth(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    /// Build the assistant reply for a message, applying log side effects
    fn respond(&self, state: &mut State, request: &SendMessageRequest) -> ChatMessageDto {
        let has_image = request.attachment_type == AttachmentType::Image;

        let (text, action) = if has_image {
            let (name, calories, protein) = VISION_PROPOSAL;
            (
                format!(
                    "That looks like a {name} — about {calories} kcal and {protein:.0}g of \
                     protein. Want me to track it?"
                ),
                Action::ProposeFood(FoodAction {
                    name: name.to_string(),
                    calories,
                    protein,
                    is_tracked: false,
                }),
            )
        } else if request.content.to_lowercase().contains("reset") {
            state.meal_logs.clear();
            state.exercise_logs.clear();
            ("Done — today's logs are cleared.".to_string(), Action::Reset)
        } else {
            let reply = classifier::classify(&request.content, false);
            (reply.text, reply.action)
        };

        match &action {
            Action::LogFood(food) => state.meal_logs.push(meal_log_from_action(food)),
            Action::LogExercise(ex) => state.exercise_logs.push(exercise_log_from_action(ex)),
            _ => {}
        }

        let (action_type, action_data) = action.to_wire();
        ChatMessageDto {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: text,
            action_type,
            action_data,
            attachment_type: AttachmentType::None,
            attachment_url: None,
            created_at: Utc::now(),
        }
    }
}

fn meal_log_from_action(food: &FoodAction) -> MealLog {
    MealLog {
        id: Uuid::new_v4().to_string(),
        meal_name: food.name.clone(),
        meal_type: "snack".to_string(),
        calories: food.calories,
        protein_g: food.protein,
        carbs_g: 0.0,
        fat_g: 0.0,
        logged_at: Utc::now(),
    }
}

fn exercise_log_from_action(ex: &ExerciseAction) -> ExerciseLog {
    ExerciseLog {
        id: Uuid::new_v4().to_string(),
        exercise_name: ex.name.clone(),
        sets: ex.sets,
        reps: ex.reps,
        weight_kg: ex.weight,
        logged_at: Utc::now(),
    }
}

fn plan_item(day: u8, meal_type: &str, name: &str, calories: i64, protein: f64) -> MealPlanItem {
    MealPlanItem {
        id: Uuid::new_v4().to_string(),
        day_of_week: day,
        meal_type: meal_type.to_string(),
        item_name: name.to_string(),
        calories,
        protein_g: protein,
        carbs_g: 0.0,
        fat_g: 0.0,
    }
}

fn routine(day: u8, name: &str, hint: &str, sets: u32, reps: u32, load: f64) -> TrainingRoutine {
    TrainingRoutine {
        id: Uuid::new_v4().to_string(),
        day_of_week: day,
        exercise_name: name.to_string(),
        machine_hint: Some(hint.to_string()),
        sets,
        reps,
        target_load_kg: load,
    }
}

#[async_trait]
impl FitnessApi for MockApi {
    async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> Result<ChatMessageDto, ApiError> {
        self.require_auth()?;
        let mut state = self.state.lock();

        state.messages.push(ChatMessageDto {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: request.content.clone(),
            action_type: ActionType::None,
            action_data: None,
            attachment_type: request.attachment_type,
            attachment_url: request.attachment_url.clone(),
            created_at: Utc::now(),
        });

        let reply = self.respond(&mut state, request);
        state.messages.push(reply.clone());
        Ok(reply)
    }

    async fn chat_history(&self, limit: u32) -> Result<ChatHistory, ApiError> {
        self.require_auth()?;
        let state = self.state.lock();
        let skip = state.messages.len().saturating_sub(limit as usize);
        let data: Vec<_> = state.messages[skip..].to_vec();
        let count = data.len();
        Ok(ChatHistory { data, count })
    }

    async fn clear_messages(&self) -> Result<(), ApiError> {
        self.require_auth()?;
        let mut state = self.state.lock();
        state.messages.clear();
        state.meal_logs.clear();
        state.exercise_logs.clear();
        Ok(())
    }

    async fn confirm_tracking(&self, message_id: &str) -> Result<ChatMessageDto, ApiError> {
        self.require_auth()?;
        let mut state = self.state.lock();

        let index = state
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or(ApiError::Status {
                status: 404,
                body: "message not found".to_string(),
            })?;

        let action = Action::from_wire(
            state.messages[index].action_type,
            state.messages[index].action_data.as_ref(),
        );
        let committed = match action {
            Action::ProposeFood(mut food) => {
                food.is_tracked = true;
                state.meal_logs.push(meal_log_from_action(&food));
                Action::LogFood(food)
            }
            Action::ProposeExercise(mut ex) => {
                ex.is_tracked = true;
                state.exercise_logs.push(exercise_log_from_action(&ex));
                Action::LogExercise(ex)
            }
            _ => {
                return Err(ApiError::Status {
                    status: 400,
                    body: "message carries no proposal".to_string(),
                })
            }
        };

        let (action_type, action_data) = committed.to_wire();
        let message = &mut state.messages[index];
        message.action_type = action_type;
        message.action_data = action_data;
        Ok(message.clone())
    }

    async fn todays_logs(&self) -> Result<DailyLogs, ApiError> {
        self.require_auth()?;
        let state = self.state.lock();
        Ok(DailyLogs {
            meal_logs: state.meal_logs.clone(),
            exercise_logs: state.exercise_logs.clone(),
        })
    }

    async fn log_meal(&self, request: &MealLogCreate) -> Result<MealLog, ApiError> {
        self.require_auth()?;
        let entry = MealLog {
            id: Uuid::new_v4().to_string(),
            meal_name: request.meal_name.clone(),
            meal_type: request.meal_type.clone(),
            calories: request.calories,
            protein_g: request.protein_g,
            carbs_g: request.carbs_g,
            fat_g: request.fat_g,
            logged_at: Utc::now(),
        };
        self.state.lock().meal_logs.push(entry.clone());
        Ok(entry)
    }

    async fn log_exercise(&self, request: &ExerciseLogCreate) -> Result<ExerciseLog, ApiError> {
        self.require_auth()?;
        let entry = ExerciseLog {
            id: Uuid::new_v4().to_string(),
            exercise_name: request.exercise_name.clone(),
            sets: request.sets,
            reps: request.reps,
            weight_kg: request.weight_kg,
            logged_at: Utc::now(),
        };
        self.state.lock().exercise_logs.push(entry.clone());
        Ok(entry)
    }

    async fn todays_summary(&self) -> Result<DailySummary, ApiError> {
        self.require_auth()?;
        let state = self.state.lock();
        let targets = Targets::for_plan(state.profile.plan);
        let stats = compute_stats(&state.meal_logs, &state.exercise_logs, &targets);
        Ok(DailySummary {
            calories_consumed: stats.calories_consumed,
            calories_target: stats.calories_target,
            protein_consumed: stats.protein_consumed,
            protein_target: stats.protein_target,
            workouts_completed: stats.workouts_completed as u32,
            calories_remaining: stats.calories_remaining(),
            protein_remaining: stats.protein_target - stats.protein_consumed,
        })
    }

    async fn todays_meal_plan(&self) -> Result<Vec<MealPlanItem>, ApiError> {
        self.require_auth()?;
        let state = self.state.lock();
        let day = state.simulated_day;
        let targets = Targets::for_plan(state.profile.plan);
        // Rough thirds of the plan target, same split every day.
        let per_meal = targets.calories / 3;
        let per_protein = targets.protein / 3.0;
        Ok(vec![
            plan_item(day, "breakfast", "Oatmeal with Berries", per_meal, per_protein),
            plan_item(day, "lunch", "Chicken & Rice", per_meal, per_protein),
            plan_item(day, "dinner", "Salmon & Potatoes", per_meal, per_protein),
        ])
    }

    async fn todays_training_plan(&self) -> Result<Vec<TrainingRoutine>, ApiError> {
        self.require_auth()?;
        let day = self.state.lock().simulated_day;
        // Push/pull/legs rotation; rest on Sunday.
        let plan = match day % 7 {
            0 | 3 => vec![
                routine(day, "Bench Press", "Flat bench, rack 4", 4, 8, 70.0),
                routine(day, "Overhead Press", "Smith machine", 3, 10, 40.0),
            ],
            1 | 4 => vec![
                routine(day, "Romanian Deadlift", "Barbell area", 4, 8, 90.0),
                routine(day, "Lat Pulldown", "Cable station 2", 3, 12, 55.0),
            ],
            2 | 5 => vec![
                routine(day, "Barbell Squat", "Squat rack 1", 4, 8, 85.0),
                routine(day, "Leg Press", "Press machine 3", 3, 12, 140.0),
            ],
            _ => Vec::new(),
        };
        Ok(plan)
    }

    async fn profile(&self) -> Result<ProfileDto, ApiError> {
        self.require_auth()?;
        Ok(self.state.lock().profile.clone())
    }

    async fn update_profile(&self, profile: &ProfileDto) -> Result<ProfileDto, ApiError> {
        self.require_auth()?;
        self.state.lock().profile = profile.clone();
        Ok(profile.clone())
    }

    async fn upload_image(&self, request: &ImageUploadRequest) -> Result<ImageUpload, ApiError> {
        self.require_auth()?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&request.image_base64)
            .map_err(|err| ApiError::Status {
                status: 422,
                body: format!("invalid base64 payload: {err}"),
            })?;
        let attachment_id = Uuid::new_v4().to_string();
        self.state.lock().images.insert(attachment_id.clone(), bytes);
        Ok(ImageUpload { attachment_id })
    }

    async fn fetch_image(&self, attachment_id: &str) -> Result<Vec<u8>, ApiError> {
        self.require_auth()?;
        self.state
            .lock()
            .images
            .get(attachment_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: "attachment not found".to_string(),
            })
    }

    async fn simulated_day(&self) -> Result<SimulatedDay, ApiError> {
        self.require_auth()?;
        let day = self.state.lock().simulated_day;
        Ok(SimulatedDay {
            simulated_day: day,
            day_name: DAY_NAMES[usize::from(day % 7)].to_string(),
        })
    }

    async fn set_simulated_day(&self, day: u8) -> Result<SimulatedDay, ApiError> {
        self.require_auth()?;
        let day = day % 7;
        self.state.lock().simulated_day = day;
        Ok(SimulatedDay {
            simulated_day: day,
            day_name: DAY_NAMES[usize::from(day)].to_string(),
        })
    }

    async fn demo_personas(&self) -> Result<Vec<DemoPersona>, ApiError> {
        Ok(Plan::ALL
            .iter()
            .map(|plan| DemoPersona {
                persona: plan.label().to_lowercase(),
                description: format!("{} demo persona", plan.label()),
            })
            .collect())
    }

    async fn demo_login(&self, persona: &str) -> Result<(), ApiError> {
        let plan = match persona {
            "cut" => Plan::Cut,
            "maintain" => Plan::Maintain,
            "bulk" => Plan::Bulk,
            _ => {
                return Err(ApiError::Status {
                    status: 404,
                    body: format!("unknown persona: {persona}"),
                })
            }
        };
        {
            let mut state = self.state.lock();
            state.profile.plan = plan;
            state.profile.onboarding_complete = true;
        }
        if let Err(err) = self.session.set_token(format!("demo-{persona}")) {
            tracing::warn!(error = %err, "failed to persist demo token");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn logged_in_mock() -> MockApi {
        let api = MockApi::new(AuthSession::in_memory());
        api.demo_login("maintain").await.unwrap();
        api
    }

    #[tokio::test]
    async fn test_requires_auth() {
        let api = MockApi::new(AuthSession::in_memory());
        let err = api.todays_logs().await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_food_message_logs_a_meal() {
        let api = logged_in_mock().await;
        let reply = api
            .send_message(&SendMessageRequest {
                content: "I ate a banana".to_string(),
                attachment_type: AttachmentType::None,
                attachment_url: None,
            })
            .await
            .unwrap();

        assert_eq!(reply.action_type, ActionType::LogFood);
        let logs = api.todays_logs().await.unwrap();
        assert_eq!(logs.meal_logs.len(), 1);
        assert_eq!(logs.meal_logs[0].meal_name, "Banana");
        assert_eq!(logs.meal_logs[0].calories, 105);
    }

    #[tokio::test]
    async fn test_image_message_proposes_without_logging() {
        let api = logged_in_mock().await;
        let reply = api
            .send_message(&SendMessageRequest {
                content: "what's in this?".to_string(),
                attachment_type: AttachmentType::Image,
                attachment_url: Some("att-1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(reply.action_type, ActionType::ProposeFood);
        assert!(api.todays_logs().await.unwrap().meal_logs.is_empty());

        let summary = api.todays_summary().await.unwrap();
        assert_eq!(summary.calories_consumed, 0);
    }

    #[tokio::test]
    async fn test_confirm_tracking_commits_the_proposal() {
        let api = logged_in_mock().await;
        let proposal = api
            .send_message(&SendMessageRequest {
                content: String::new(),
                attachment_type: AttachmentType::Image,
                attachment_url: Some("att-1".to_string()),
            })
            .await
            .unwrap();

        let confirmed = api.confirm_tracking(&proposal.id).await.unwrap();
        assert_eq!(confirmed.action_type, ActionType::LogFood);

        let logs = api.todays_logs().await.unwrap();
        assert_eq!(logs.meal_logs.len(), 1);
        assert_eq!(logs.meal_logs[0].meal_name, "Grilled Chicken Bowl");

        // A second confirm is a 400: the action is no longer a proposal.
        let err = api.confirm_tracking(&proposal.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_reset_clears_logs() {
        let api = logged_in_mock().await;
        api.send_message(&SendMessageRequest {
            content: "I ate a banana".to_string(),
            attachment_type: AttachmentType::None,
            attachment_url: None,
        })
        .await
        .unwrap();

        let reply = api
            .send_message(&SendMessageRequest {
                content: "reset my day".to_string(),
                attachment_type: AttachmentType::None,
                attachment_url: None,
            })
            .await
            .unwrap();
        assert_eq!(reply.action_type, ActionType::Reset);

        let logs = api.todays_logs().await.unwrap();
        assert!(logs.meal_logs.is_empty());
        assert!(logs.exercise_logs.is_empty());
    }

    #[tokio::test]
    async fn test_summary_tracks_plan_targets() {
        let api = logged_in_mock().await;
        api.demo_login("cut").await.unwrap();
        let summary = api.todays_summary().await.unwrap();
        assert_eq!(summary.calories_target, 1800);
        assert_eq!(summary.calories_remaining, 1800);
    }

    #[tokio::test]
    async fn test_history_limit_keeps_latest() {
        let api = logged_in_mock().await;
        for text in ["one", "two", "three"] {
            api.send_message(&SendMessageRequest {
                content: text.to_string(),
                attachment_type: AttachmentType::None,
                attachment_url: None,
            })
            .await
            .unwrap();
        }

        // Six stored messages (three user, three assistant); keep the last 2.
        let history = api.chat_history(2).await.unwrap();
        assert_eq!(history.count, 2);
        assert_eq!(history.data[0].content, "three");
        assert_eq!(history.data[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_image_upload_round_trip() {
        let api = logged_in_mock().await;
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"jpeg bytes");
        let upload = api
            .upload_image(&ImageUploadRequest {
                image_base64: encoded,
                content_type: "image/jpeg".to_string(),
            })
            .await
            .unwrap();

        let bytes = api.fetch_image(&upload.attachment_id).await.unwrap();
        assert_eq!(bytes, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_simulated_day_wraps() {
        let api = logged_in_mock().await;
        let day = api.set_simulated_day(6).await.unwrap();
        assert_eq!(day.day_name, "Sunday");
        assert!(api.todays_training_plan().await.unwrap().is_empty());
    }
}
