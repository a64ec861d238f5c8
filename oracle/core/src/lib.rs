//! Oracle Core - Headless fitness chat client
//!
//! This crate contains all the domain logic for Oracle, a chat-first
//! fitness tracker: the conversation state, the rule-based classifier,
//! the derived daily stats, the query caches, and the bindings to the
//! fitness backend. It has no UI dependencies and can be embedded in any
//! surface (TUI, desktop, tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 UI Surface (TUI)                │
//! └───────────────────────┬─────────────────────────┘
//!                         │
//! ┌───────────────────────▼─────────────────────────┐
//! │                     Oracle                      │
//! │   chat session · caches · profile · auth        │
//! └──────┬──────────────────────────────┬───────────┘
//!        │                              │
//! ┌──────▼───────┐              ┌───────▼───────┐
//! │  classifier  │              │  FitnessApi   │
//! │  stats/voice │              │ HttpApi/Mock  │
//! └──────────────┘              └───────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Oracle`] — central orchestrator owning all client state
//! - [`ChatSession`] — ordered message list with optimistic sends
//! - [`Action`] — structured action envelope on chat messages
//! - [`FitnessApi`] — backend seam, HTTP or in-memory mock
//! - [`DailyStats`] — derived calorie/protein progress
//!
//! # Module Overview
//!
//! - [`api`] — backend trait, HTTP client, mock backend, wire types
//! - [`auth`] — bearer token session with explicit lifecycle
//! - [`cache`] — invalidation-driven query cache with fetch coalescing
//! - [`chat`] — chat session store and send state machine
//! - [`classifier`] — rule-based food/exercise message classifier
//! - [`config`] — TOML config file plus environment overrides
//! - [`messages`] — message and action domain types
//! - [`oracle`] — the orchestrator tying everything together
//! - [`profile`] — user profile and its local cache
//! - [`stats`] — derived daily stats aggregation
//! - [`voice`] — voice capture state machine

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod chat;
pub mod classifier;
pub mod config;
pub mod messages;
pub mod oracle;
pub mod profile;
pub mod stats;
pub mod voice;

pub use api::client::{ApiError, FitnessApi, HttpApi};
pub use api::mock::MockApi;
pub use api::types::{DailyLogs, DailySummary, MealPlanItem, TrainingRoutine};
pub use auth::AuthSession;
pub use cache::CachedQuery;
pub use chat::{ChatError, ChatSession, SendState};
pub use classifier::{classify, Reply};
pub use config::OracleConfig;
pub use messages::{
    Action, ActionType, AttachmentType, ChatMessage, ExerciseAction, FoodAction, MessageId,
    MessageRole, OutgoingMessage,
};
pub use oracle::Oracle;
pub use profile::{Plan, Theme, UserProfile};
pub use stats::{compute_stats, DailyStats, Targets};
pub use voice::{NullSpeechEngine, RecorderState, SpeechEngine, VoiceRecorder};
