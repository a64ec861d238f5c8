//! Wire Types for the Fitness Backend
//!
//! Shapes consumed from and sent to the HTTP API. The backend serializes
//! responses in camelCase; request bodies are snake_case. Log entries are
//! owned by the backend — the client holds a read-through cache only and
//! never originates an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::{
    Action, ActionType, AttachmentType, ChatMessage, MessageId, MessageRole, OutgoingMessage,
};
use crate::profile::UserProfile;

/// Chat message as transported on the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    /// Server-assigned message id
    pub id: String,
    /// Sender role
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Action discriminant
    #[serde(default)]
    pub action_type: ActionType,
    /// Action payload, shape keyed by `action_type`
    #[serde(default)]
    pub action_data: Option<serde_json::Value>,
    /// Attachment kind
    #[serde(default)]
    pub attachment_type: AttachmentType,
    /// Attachment reference
    #[serde(default)]
    pub attachment_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessageDto> for ChatMessage {
    fn from(dto: ChatMessageDto) -> Self {
        Self {
            id: MessageId(dto.id),
            role: dto.role,
            content: dto.content,
            action: Action::from_wire(dto.action_type, dto.action_data.as_ref()),
            attachment_type: dto.attachment_type,
            attachment_url: dto.attachment_url,
            created_at: dto.created_at,
            pending: false,
        }
    }
}

/// `GET /chat/messages` response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Messages ordered oldest first
    pub data: Vec<ChatMessageDto>,
    /// Number of messages returned
    pub count: usize,
}

/// `POST /chat/messages` request body (snake_case)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub content: String,
    /// Attachment kind
    pub attachment_type: AttachmentType,
    /// Attachment reference (upload id)
    pub attachment_url: Option<String>,
}

impl From<&OutgoingMessage> for SendMessageRequest {
    fn from(outgoing: &OutgoingMessage) -> Self {
        Self {
            content: outgoing.content.clone(),
            attachment_type: outgoing.attachment_type,
            attachment_url: outgoing.attachment_url.clone(),
        }
    }
}

/// Persisted meal log entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    /// Server-assigned id
    pub id: String,
    /// Meal name
    pub meal_name: String,
    /// Meal slot (breakfast/lunch/dinner/snack)
    pub meal_type: String,
    /// Calories (kcal)
    pub calories: i64,
    /// Protein (grams)
    pub protein_g: f64,
    /// Carbohydrates (grams)
    pub carbs_g: f64,
    /// Fat (grams)
    pub fat_g: f64,
    /// When the entry was logged
    pub logged_at: DateTime<Utc>,
}

/// Persisted exercise log entry (one completed set-group)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    /// Server-assigned id
    pub id: String,
    /// Exercise name
    pub exercise_name: String,
    /// Number of sets
    pub sets: u32,
    /// Reps per set
    pub reps: u32,
    /// Working weight in kg
    pub weight_kg: f64,
    /// When the entry was logged
    pub logged_at: DateTime<Utc>,
}

/// `GET /logs/today` response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogs {
    /// Today's meal entries
    pub meal_logs: Vec<MealLog>,
    /// Today's exercise entries
    pub exercise_logs: Vec<ExerciseLog>,
}

/// `POST /logs/meal` request body (snake_case)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealLogCreate {
    /// Meal name
    pub meal_name: String,
    /// Meal slot
    pub meal_type: String,
    /// Calories (kcal)
    pub calories: i64,
    /// Protein (grams)
    pub protein_g: f64,
    /// Carbohydrates (grams)
    pub carbs_g: f64,
    /// Fat (grams)
    pub fat_g: f64,
}

/// `POST /logs/exercise` request body (snake_case)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseLogCreate {
    /// Exercise name
    pub exercise_name: String,
    /// Number of sets
    pub sets: u32,
    /// Reps per set
    pub reps: u32,
    /// Working weight in kg
    pub weight_kg: f64,
}

/// `GET /summary/today` response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Calories consumed (kcal)
    pub calories_consumed: i64,
    /// Calorie target (kcal)
    pub calories_target: i64,
    /// Protein consumed (grams)
    pub protein_consumed: f64,
    /// Protein target (grams)
    pub protein_target: f64,
    /// Completed set-groups today
    pub workouts_completed: u32,
    /// Calories left toward the target (may be negative)
    pub calories_remaining: i64,
    /// Protein left toward the target (may be negative)
    pub protein_remaining: f64,
}

/// Scheduled meal for one day of the plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanItem {
    /// Server-assigned id
    pub id: String,
    /// Day of week (0=Monday .. 6=Sunday)
    pub day_of_week: u8,
    /// Meal slot
    pub meal_type: String,
    /// Item name
    pub item_name: String,
    /// Calories (kcal)
    pub calories: i64,
    /// Protein (grams)
    pub protein_g: f64,
    /// Carbohydrates (grams)
    pub carbs_g: f64,
    /// Fat (grams)
    pub fat_g: f64,
}

/// Scheduled exercise for one day of the training plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRoutine {
    /// Server-assigned id
    pub id: String,
    /// Day of week (0=Monday .. 6=Sunday)
    pub day_of_week: u8,
    /// Exercise name
    pub exercise_name: String,
    /// Optional gym machine hint
    #[serde(default)]
    pub machine_hint: Option<String>,
    /// Target sets
    pub sets: u32,
    /// Target reps per set
    pub reps: u32,
    /// Target load in kg
    pub target_load_kg: f64,
}

/// Generic `{data, count}` list wrapper used by plan endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items
    pub data: Vec<T>,
    /// Item count
    pub count: usize,
}

/// `GET/PUT /profile/simulated-day` response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedDay {
    /// Day of week override (0=Monday .. 6=Sunday)
    pub simulated_day: u8,
    /// Human-readable day name
    pub day_name: String,
}

/// `PUT /profile/simulated-day` request body (snake_case)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatedDayUpdate {
    /// Day of week override (0=Monday .. 6=Sunday)
    pub simulated_day: u8,
}

/// `POST /upload/image` request body (snake_case)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageUploadRequest {
    /// Base64-encoded image bytes
    pub image_base64: String,
    /// MIME type, e.g. "image/jpeg"
    pub content_type: String,
}

/// `POST /upload/image` response
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    /// Id to reference from a chat message's `attachment_url`
    pub attachment_id: String,
}

/// Bearer token response from login endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token
    pub access_token: String,
    /// Token type, always "bearer"
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Demo persona listed by `GET /demo/users`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemoPersona {
    /// Persona key ("cut", "maintain", "bulk")
    pub persona: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

/// Wire shape of the user profile (camelCase, same as the domain type)
pub type ProfileDto = UserProfile;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_chat_message_decodes_camel_case() {
        let raw = json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "role": "assistant",
            "content": "Logged Banana: 105 kcal, 1g protein.",
            "actionType": "log_food",
            "actionData": {"name": "Banana", "calories": 105, "protein": 1.3},
            "attachmentType": "none",
            "attachmentUrl": null,
            "createdAt": "2025-06-02T12:00:00Z"
        });
        let dto: ChatMessageDto = serde_json::from_value(raw).unwrap();
        assert_eq!(dto.action_type, ActionType::LogFood);

        let message = ChatMessage::from(dto);
        match message.action {
            Action::LogFood(food) => {
                assert_eq!(food.name, "Banana");
                assert_eq!(food.calories, 105);
            }
            other => panic!("expected LogFood, got {other:?}"),
        }
        assert!(!message.pending);
    }

    #[test]
    fn test_unknown_action_payload_degrades_to_none() {
        let raw = json!({
            "id": "a",
            "role": "assistant",
            "content": "hello",
            "actionType": "log_exercise",
            "actionData": {"sets": "three"},
            "createdAt": "2025-06-02T12:00:00Z"
        });
        let dto: ChatMessageDto = serde_json::from_value(raw).unwrap();
        assert_eq!(ChatMessage::from(dto).action, Action::None);
    }

    #[test]
    fn test_send_request_serializes_snake_case() {
        let request = SendMessageRequest::from(&OutgoingMessage::image("lunch", "att-1"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["attachment_type"], json!("image"));
        assert_eq!(value["attachment_url"], json!("att-1"));
    }

    #[test]
    fn test_daily_logs_decode_camel_case() {
        let raw = json!({
            "mealLogs": [{
                "id": "m1",
                "mealName": "Banana",
                "mealType": "snack",
                "calories": 105,
                "proteinG": 1.3,
                "carbsG": 27.0,
                "fatG": 0.4,
                "loggedAt": "2025-06-02T09:30:00Z"
            }],
            "exerciseLogs": []
        });
        let logs: DailyLogs = serde_json::from_value(raw).unwrap();
        assert_eq!(logs.meal_logs.len(), 1);
        assert_eq!(logs.meal_logs[0].meal_name, "Banana");
        assert!(logs.exercise_logs.is_empty());
    }
}
