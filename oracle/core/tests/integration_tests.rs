//! Integration tests for the orchestrator
//!
//! These tests run the full client stack (Oracle + chat session + caches)
//! against the in-memory mock backend and verify that the pieces work
//! together in realistic scenarios:
//! - A full day of chat-driven logging feeding the dashboard
//! - Optimistic message ordering across sends
//! - The propose/confirm tracking flow
//! - Cache invalidation cascades from chat actions and profile edits
//! - Forced logout when the backend rejects credentials

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use oracle_core::api::client::{ApiError, FitnessApi};
use oracle_core::api::types::{
    ChatHistory, ChatMessageDto, DailyLogs, DailySummary, DemoPersona, ExerciseLog,
    ExerciseLogCreate, ImageUpload, ImageUploadRequest, MealLog, MealLogCreate, MealPlanItem,
    ProfileDto, SendMessageRequest, SimulatedDay, TrainingRoutine,
};
use oracle_core::{
    Action, AuthSession, ChatError, MessageRole, MockApi, Oracle, OracleConfig, OutgoingMessage,
    Plan, UserProfile,
};

fn offline_oracle() -> Oracle {
    let session = AuthSession::in_memory();
    let api = Arc::new(MockApi::new(session.clone()));
    Oracle::with_api(OracleConfig::default(), api, session)
}

async fn logged_in_oracle() -> Oracle {
    let oracle = offline_oracle();
    oracle.demo_login("maintain").await.unwrap();
    oracle
}

// =============================================================================
// Full day flow
// =============================================================================

#[tokio::test]
async fn test_chat_driven_day_feeds_the_dashboard() {
    let oracle = logged_in_oracle().await;

    oracle
        .send_message(OutgoingMessage::text("I ate a banana"))
        .await
        .unwrap();
    oracle
        .send_message(OutgoingMessage::text("had a protein shake"))
        .await
        .unwrap();
    oracle
        .send_message(OutgoingMessage::text("3 sets of leg press at 100kg"))
        .await
        .unwrap();

    let stats = oracle.dashboard().await.unwrap();
    assert_eq!(stats.calories_consumed, 235);
    assert!((stats.protein_consumed - 25.3).abs() < 1e-9);
    assert_eq!(stats.workouts_completed, 1);

    let logs = oracle.todays_logs().await.unwrap();
    assert_eq!(logs.meal_logs.len(), 2);
    assert_eq!(logs.exercise_logs.len(), 1);
    assert_eq!(logs.exercise_logs[0].exercise_name, "Leg Press");
}

#[tokio::test]
async fn test_messages_stay_in_chronological_pairs() {
    let oracle = logged_in_oracle().await;

    for text in ["first", "second", "third"] {
        oracle
            .send_message(OutgoingMessage::text(text))
            .await
            .unwrap();
    }

    let messages = oracle.messages();
    assert_eq!(messages.len(), 6);
    for pair in messages.chunks(2) {
        assert_eq!(pair[0].role, MessageRole::User);
        assert_eq!(pair[1].role, MessageRole::Assistant);
        assert!(!pair[0].pending);
    }
    assert_eq!(messages[0].content, "first");
    assert_eq!(messages[4].content, "third");

    // Reloading from server history preserves the same order.
    oracle.load_history().await.unwrap();
    let reloaded = oracle.messages();
    assert_eq!(reloaded.len(), 6);
    assert_eq!(reloaded[0].content, "first");
}

// =============================================================================
// Propose / confirm tracking
// =============================================================================

#[tokio::test]
async fn test_photo_proposal_counts_only_after_confirmation() {
    let oracle = logged_in_oracle().await;

    let image = oracle.upload_image(b"fake jpeg", "image/jpeg").await.unwrap();
    let proposal = oracle
        .send_message(OutgoingMessage::image("what did I just eat?", image))
        .await
        .unwrap();
    assert!(proposal.action.is_proposal());

    // Proposals are never counted into stats.
    assert_eq!(oracle.todays_summary().await.unwrap().calories_consumed, 0);
    assert_eq!(oracle.dashboard().await.unwrap().calories_consumed, 0);

    let confirmed = oracle.confirm_tracking(&proposal.id).await.unwrap();
    let Action::LogFood(food) = &confirmed.action else {
        panic!("expected LogFood after confirmation, got {:?}", confirmed.action);
    };
    assert!(food.is_tracked);

    // The chat shows the committed card and the caches observe the entry.
    let last = oracle.messages().last().cloned().unwrap();
    assert_eq!(last.id, confirmed.id);
    assert!(matches!(last.action, Action::LogFood(_)));
    assert_eq!(
        oracle.todays_summary().await.unwrap().calories_consumed,
        food.calories
    );
}

// =============================================================================
// Invalidation cascades
// =============================================================================

#[tokio::test]
async fn test_clear_chat_resets_logs_and_summary() {
    let oracle = logged_in_oracle().await;
    oracle
        .send_message(OutgoingMessage::text("I ate a banana"))
        .await
        .unwrap();
    assert_eq!(oracle.todays_summary().await.unwrap().calories_consumed, 105);

    oracle.clear_chat().await.unwrap();
    assert!(oracle.messages().is_empty());
    assert_eq!(oracle.todays_summary().await.unwrap().calories_consumed, 0);
    assert!(oracle.todays_logs().await.unwrap().meal_logs.is_empty());
}

#[tokio::test]
async fn test_plan_change_moves_summary_targets() {
    let oracle = logged_in_oracle().await;
    assert_eq!(oracle.todays_summary().await.unwrap().calories_target, 2200);

    let mut profile = oracle.profile();
    profile.plan = Plan::Bulk;
    oracle.update_profile(profile).await.unwrap();

    // The summary cache was invalidated by the profile update.
    assert_eq!(oracle.todays_summary().await.unwrap().calories_target, 2900);
    assert_eq!(oracle.profile().plan, Plan::Bulk);
}

#[tokio::test]
async fn test_simulated_day_refreshes_training_plan() {
    let oracle = logged_in_oracle().await;

    let monday = oracle.todays_training_plan().await.unwrap();
    assert!(!monday.is_empty());

    let updated = oracle.set_simulated_day(6).await.unwrap();
    assert_eq!(updated.day_name, "Sunday");

    // Rest day: the cache refetched instead of serving Monday's plan.
    assert!(oracle.todays_training_plan().await.unwrap().is_empty());
}

// =============================================================================
// Auth failure handling
// =============================================================================

/// Backend stub whose every call is rejected as unauthenticated
struct ExpiredTokenApi;

#[async_trait]
impl FitnessApi for ExpiredTokenApi {
    async fn send_message(&self, _: &SendMessageRequest) -> Result<ChatMessageDto, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn chat_history(&self, _: u32) -> Result<ChatHistory, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn clear_messages(&self) -> Result<(), ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn confirm_tracking(&self, _: &str) -> Result<ChatMessageDto, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn todays_logs(&self) -> Result<DailyLogs, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn log_meal(&self, _: &MealLogCreate) -> Result<MealLog, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn log_exercise(&self, _: &ExerciseLogCreate) -> Result<ExerciseLog, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn todays_summary(&self) -> Result<DailySummary, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn todays_meal_plan(&self) -> Result<Vec<MealPlanItem>, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn todays_training_plan(&self) -> Result<Vec<TrainingRoutine>, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn profile(&self) -> Result<ProfileDto, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn update_profile(&self, _: &ProfileDto) -> Result<ProfileDto, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn upload_image(&self, _: &ImageUploadRequest) -> Result<ImageUpload, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn fetch_image(&self, _: &str) -> Result<Vec<u8>, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn simulated_day(&self) -> Result<SimulatedDay, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn set_simulated_day(&self, _: u8) -> Result<SimulatedDay, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn demo_personas(&self) -> Result<Vec<DemoPersona>, ApiError> {
        Err(ApiError::Unauthorized)
    }

    async fn demo_login(&self, _: &str) -> Result<(), ApiError> {
        Err(ApiError::Unauthorized)
    }
}

#[tokio::test]
async fn test_expired_token_forces_full_logout() {
    let session = AuthSession::in_memory();
    session.set_token("stale-token").unwrap();
    let oracle = Oracle::with_api(
        OracleConfig::default(),
        Arc::new(ExpiredTokenApi),
        session.clone(),
    );
    assert!(oracle.is_authenticated());

    let err = oracle
        .send_message(OutgoingMessage::text("I ate a banana"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Api(ApiError::Unauthorized)));

    // Token, chat, and profile state are all gone.
    assert!(!oracle.is_authenticated());
    assert!(!session.is_authenticated());
    assert!(oracle.messages().is_empty());
    assert_eq!(oracle.profile(), UserProfile::default());
}
