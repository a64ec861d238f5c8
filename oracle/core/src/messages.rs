//! Chat Messages and Action Envelopes
//!
//! Domain types for the chat conversation. A message may carry an action
//! envelope describing a structured side effect (a food or exercise log,
//! a proposal awaiting confirmation, or a daily reset). UI surfaces render
//! envelopes as specialized cards instead of plain text.
//!
//! # Design Philosophy
//!
//! The wire format transports actions as an `action_type` discriminant plus
//! a free-form `action_data` object. Inside the core that pair is lifted
//! into the [`Action`] sum type so rendering and side-effect handling can
//! match exhaustively. Lifting is total: an unknown discriminant or a
//! malformed payload degrades to [`Action::None`], never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message identifier
///
/// Server-assigned ids are opaque UUID strings. Optimistic client-side
/// messages carry a local id minted by [`MessageId::local`]; the two
/// namespaces never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Mint a temporary id for an optimistic client-side message
    pub fn local() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("local_{id}"))
    }

    /// Whether this id was minted client-side and never confirmed
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local_")
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// The Oracle assistant
    Assistant,
}

/// Attachment kind carried by a message
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    /// No attachment
    #[default]
    None,
    /// Uploaded image (meal photo)
    Image,
    /// Voice note
    Audio,
}

/// Wire discriminant for action envelopes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// No structured action
    #[default]
    None,
    /// A meal was committed to the log
    LogFood,
    /// An exercise was committed to the log
    LogExercise,
    /// A meal suggestion awaiting user confirmation
    ProposeFood,
    /// An exercise suggestion awaiting user confirmation
    ProposeExercise,
    /// Today's logs were reset
    Reset,
}

/// Structured payload for food actions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAction {
    /// Display name of the food item
    pub name: String,
    /// Estimated calories (kcal)
    pub calories: i64,
    /// Estimated protein (grams)
    pub protein: f64,
    /// Whether the entry has been committed to the log
    #[serde(default)]
    pub is_tracked: bool,
}

/// Structured payload for exercise actions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAction {
    /// Display name of the exercise
    pub name: String,
    /// Number of sets
    pub sets: u32,
    /// Reps per set
    pub reps: u32,
    /// Working weight in kg
    pub weight: f64,
    /// Whether the entry has been committed to the log
    #[serde(default)]
    pub is_tracked: bool,
}

/// Action envelope attached to a chat message
///
/// `Propose*` variants are pending suggestions and must never be counted
/// into aggregated stats; `Log*` variants are already committed server-side.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Action {
    /// No structured action
    #[default]
    None,
    /// Committed meal entry
    LogFood(FoodAction),
    /// Committed exercise entry
    LogExercise(ExerciseAction),
    /// Meal suggestion awaiting confirmation
    ProposeFood(FoodAction),
    /// Exercise suggestion awaiting confirmation
    ProposeExercise(ExerciseAction),
    /// Daily logs were cleared
    Reset,
}

impl Action {
    /// Wire discriminant for this envelope
    #[must_use]
    pub fn kind(&self) -> ActionType {
        match self {
            Self::None => ActionType::None,
            Self::LogFood(_) => ActionType::LogFood,
            Self::LogExercise(_) => ActionType::LogExercise,
            Self::ProposeFood(_) => ActionType::ProposeFood,
            Self::ProposeExercise(_) => ActionType::ProposeExercise,
            Self::Reset => ActionType::Reset,
        }
    }

    /// Lift the wire `(action_type, action_data)` pair into the sum type
    ///
    /// Total: an unknown discriminant, a missing payload, or a payload that
    /// fails to decode all degrade to [`Action::None`].
    #[must_use]
    pub fn from_wire(kind: ActionType, data: Option<&serde_json::Value>) -> Self {
        fn decode<T: serde::de::DeserializeOwned>(data: Option<&serde_json::Value>) -> Option<T> {
            data.and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        match kind {
            ActionType::None => Self::None,
            ActionType::Reset => Self::Reset,
            ActionType::LogFood => decode(data).map_or(Self::None, Self::LogFood),
            ActionType::LogExercise => decode(data).map_or(Self::None, Self::LogExercise),
            ActionType::ProposeFood => decode(data).map_or(Self::None, Self::ProposeFood),
            ActionType::ProposeExercise => decode(data).map_or(Self::None, Self::ProposeExercise),
        }
    }

    /// Lower this envelope to the wire `(action_type, action_data)` pair
    #[must_use]
    pub fn to_wire(&self) -> (ActionType, Option<serde_json::Value>) {
        let data = match self {
            Self::None | Self::Reset => None,
            Self::LogFood(food) | Self::ProposeFood(food) => serde_json::to_value(food).ok(),
            Self::LogExercise(ex) | Self::ProposeExercise(ex) => serde_json::to_value(ex).ok(),
        };
        (self.kind(), data)
    }

    /// Whether applying this action changes server-side log state
    ///
    /// Dependent caches (logs, summary) must be invalidated when a message
    /// carrying such an action is appended.
    #[must_use]
    pub fn mutates_logs(&self) -> bool {
        matches!(
            self,
            Self::LogFood(_) | Self::LogExercise(_) | Self::Reset
        )
    }

    /// Whether this is a proposal awaiting user confirmation
    #[must_use]
    pub fn is_proposal(&self) -> bool {
        matches!(self, Self::ProposeFood(_) | Self::ProposeExercise(_))
    }
}

/// A message in the chat conversation
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    /// Unique message id (server- or client-assigned)
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Structured action envelope, if any
    pub action: Action,
    /// Attachment kind
    pub attachment_type: AttachmentType,
    /// Attachment reference (upload id or URL)
    pub attachment_url: Option<String>,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Whether this is an optimistic local insert awaiting server echo
    pub pending: bool,
}

impl ChatMessage {
    /// Synthesize an optimistic local user message
    ///
    /// Appended to the session before any network round trip so the input
    /// renders immediately. The temporary id is never reconciled with a
    /// server id; once the send resolves the entry is simply marked
    /// non-pending.
    #[must_use]
    pub fn local_user(content: impl Into<String>, outgoing: &OutgoingMessage) -> Self {
        Self {
            id: MessageId::local(),
            role: MessageRole::User,
            content: content.into(),
            action: Action::None,
            attachment_type: outgoing.attachment_type,
            attachment_url: outgoing.attachment_url.clone(),
            created_at: Utc::now(),
            pending: true,
        }
    }
}

/// Input for a chat send
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingMessage {
    /// Message text
    pub content: String,
    /// Attachment kind
    pub attachment_type: AttachmentType,
    /// Attachment reference (upload id)
    pub attachment_url: Option<String>,
}

impl OutgoingMessage {
    /// Plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachment_type: AttachmentType::None,
            attachment_url: None,
        }
    }

    /// Message with an uploaded image attachment
    #[must_use]
    pub fn image(content: impl Into<String>, attachment_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachment_type: AttachmentType::Image,
            attachment_url: Some(attachment_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_ids_unique_and_flagged() {
        let a = MessageId::local();
        let b = MessageId::local();
        assert_ne!(a, b);
        assert!(a.is_local());
        assert!(!MessageId("a0b1".into()).is_local());
    }

    #[test]
    fn test_action_wire_round_trip() {
        let action = Action::LogFood(FoodAction {
            name: "Banana".into(),
            calories: 105,
            protein: 1.3,
            is_tracked: true,
        });
        let (kind, data) = action.to_wire();
        assert_eq!(kind, ActionType::LogFood);
        assert_eq!(Action::from_wire(kind, data.as_ref()), action);
    }

    #[test]
    fn test_malformed_payload_degrades_to_none() {
        let bad = json!({"unexpected": true});
        assert_eq!(
            Action::from_wire(ActionType::LogFood, Some(&bad)),
            Action::None
        );
        assert_eq!(Action::from_wire(ActionType::LogExercise, None), Action::None);
    }

    #[test]
    fn test_reset_carries_no_payload() {
        let (kind, data) = Action::Reset.to_wire();
        assert_eq!(kind, ActionType::Reset);
        assert!(data.is_none());
        assert_eq!(Action::from_wire(ActionType::Reset, None), Action::Reset);
    }

    #[test]
    fn test_mutates_logs() {
        let food = FoodAction {
            name: "Rice".into(),
            calories: 205,
            protein: 4.3,
            is_tracked: false,
        };
        assert!(Action::LogFood(food.clone()).mutates_logs());
        assert!(Action::Reset.mutates_logs());
        assert!(!Action::ProposeFood(food).mutates_logs());
        assert!(!Action::None.mutates_logs());
    }

    #[test]
    fn test_food_payload_uses_camel_case() {
        let food = FoodAction {
            name: "Eggs".into(),
            calories: 155,
            protein: 12.6,
            is_tracked: true,
        };
        let value = serde_json::to_value(&food).unwrap();
        assert_eq!(value["isTracked"], json!(true));
        assert_eq!(value["calories"], json!(155));
    }

    #[test]
    fn test_optimistic_message_is_pending_user() {
        let outgoing = OutgoingMessage::text("hi");
        let msg = ChatMessage::local_user("hi", &outgoing);
        assert_eq!(msg.role, MessageRole::User);
        assert!(msg.pending);
        assert!(msg.id.is_local());
        assert_eq!(msg.attachment_type, AttachmentType::None);
    }
}
