//! Oracle Orchestrator
//!
//! [`Oracle`] wires the pieces together: the chat session, the query
//! caches, the auth session, the profile store, and the backend client.
//! UI surfaces hold one `Oracle` and call it for everything; the core
//! stays headless and surface-agnostic.
//!
//! # Design Philosophy
//!
//! State lives in the core, not the views. Mutations flow one way: a UI
//! event calls an `Oracle` method, the method talks to the backend, updates
//! the owned state, and invalidates the caches that depend on what changed.
//! A send that commits a log entry marks the logs and summary caches stale;
//! the dashboard picks up fresh numbers on its next read without any view
//! knowing why.
//!
//! Every backend failure with an auth cause funnels through one place: an
//! [`ApiError::Unauthorized`] from any call forces a full logout so no
//! stale per-user state survives the session.

use std::sync::Arc;

use base64::Engine as _;
use parking_lot::RwLock;

use crate::api::client::{ApiError, FitnessApi, HttpApi};
use crate::api::mock::MockApi;
use crate::api::types::{
    DailyLogs, DailySummary, DemoPersona, MealPlanItem, SendMessageRequest, SimulatedDay,
    TrainingRoutine,
};
use crate::auth::AuthSession;
use crate::cache::CachedQuery;
use crate::chat::{ChatError, ChatSession};
use crate::config::OracleConfig;
use crate::messages::{ChatMessage, MessageId, OutgoingMessage};
use crate::profile::{ProfileStore, UserProfile};
use crate::stats::{compute_stats, DailyStats, Targets};

/// Default number of history messages fetched on load
pub const HISTORY_LIMIT: u32 = 100;

/// Central orchestrator owning all client-side state
pub struct Oracle {
    config: OracleConfig,
    api: Arc<dyn FitnessApi>,
    session: AuthSession,
    chat: RwLock<ChatSession>,
    logs: CachedQuery<DailyLogs>,
    summary: CachedQuery<DailySummary>,
    meal_plan: CachedQuery<Vec<MealPlanItem>>,
    training_plan: CachedQuery<Vec<TrainingRoutine>>,
    profile: ProfileStore,
}

impl Oracle {
    /// Build from configuration
    ///
    /// Offline mode swaps the HTTP client for the in-memory mock backend
    /// and keeps all state in memory; otherwise the token and profile
    /// caches are restored from disk.
    #[must_use]
    pub fn new(config: OracleConfig) -> Self {
        let (session, profile, api): (AuthSession, ProfileStore, Arc<dyn FitnessApi>) =
            if config.offline {
                let session = AuthSession::in_memory();
                let api = Arc::new(MockApi::new(session.clone()));
                (session, ProfileStore::in_memory(), api)
            } else {
                let session = AuthSession::new(config.token_path());
                if let Err(err) = session.load() {
                    tracing::warn!(error = %err, "failed to load auth token");
                }
                let profile = ProfileStore::new(config.profile_path());
                profile.load();
                let api = Arc::new(HttpApi::new(config.api_url.clone(), session.clone()));
                (session, profile, api)
            };

        tracing::info!(offline = config.offline, api_url = %config.api_url, "oracle ready");
        Self::assemble(config, api, session, profile)
    }

    /// Build against an explicit backend (tests, custom surfaces)
    #[must_use]
    pub fn with_api(config: OracleConfig, api: Arc<dyn FitnessApi>, session: AuthSession) -> Self {
        Self::assemble(config, api, session, ProfileStore::in_memory())
    }

    fn assemble(
        config: OracleConfig,
        api: Arc<dyn FitnessApi>,
        session: AuthSession,
        profile: ProfileStore,
    ) -> Self {
        Self {
            config,
            api,
            session,
            chat: RwLock::new(ChatSession::new()),
            logs: CachedQuery::new("logs"),
            summary: CachedQuery::new("summary"),
            meal_plan: CachedQuery::new("meal_plan"),
            training_plan: CachedQuery::new("training_plan"),
            profile,
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Whether a bearer token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Funnel for auth failures: any `Unauthorized` forces a full logout
    fn check<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                tracing::warn!("backend rejected credentials; forcing logout");
                self.logout();
            }
        }
        result
    }

    // ---- chat ----------------------------------------------------------

    /// Snapshot of the chat message list
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.chat.read().messages().to_vec()
    }

    /// Whether a send is in flight (the UI disables the send control)
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.chat.read().is_sending()
    }

    /// Whether the chat list must be resynchronized before being trusted
    #[must_use]
    pub fn is_chat_stale(&self) -> bool {
        self.chat.read().is_stale()
    }

    /// Send a chat message
    ///
    /// The user message is inserted optimistically before the network round
    /// trip; the returned value is the assistant reply. When the reply
    /// carries a log-mutating action the logs and summary caches are
    /// invalidated so dependent views refetch.
    ///
    /// # Errors
    ///
    /// [`ChatError::SendInFlight`] when a send is already running;
    /// [`ChatError::Api`] when the backend call fails (the chat list is
    /// then marked stale for resync).
    pub async fn send_message(&self, outgoing: OutgoingMessage) -> Result<ChatMessage, ChatError> {
        let optimistic_id = self.chat.write().begin_send(&outgoing)?;
        let request = SendMessageRequest::from(&outgoing);

        match self.check(self.api.send_message(&request).await) {
            Ok(dto) => {
                let reply = ChatMessage::from(dto);
                self.chat.write().complete_send(&optimistic_id, reply.clone());
                if reply.action.mutates_logs() {
                    self.logs.invalidate();
                    self.summary.invalidate();
                }
                Ok(reply)
            }
            Err(err) => {
                self.chat.write().fail_send();
                Err(err.into())
            }
        }
    }

    /// Replace the chat list with server history
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the local list is left untouched.
    pub async fn load_history(&self) -> Result<(), ApiError> {
        let history = self.check(self.api.chat_history(HISTORY_LIMIT).await)?;
        let messages = history.data.into_iter().map(ChatMessage::from).collect();
        self.chat.write().replace_history(messages);
        Ok(())
    }

    /// Resynchronize the chat list only when it is stale
    ///
    /// # Errors
    ///
    /// Propagates backend failures from the underlying history fetch.
    pub async fn sync_history(&self) -> Result<(), ApiError> {
        if self.is_chat_stale() {
            self.load_history().await?;
        }
        Ok(())
    }

    /// Clear the conversation (and, server-side, today's logs)
    ///
    /// # Errors
    ///
    /// Propagates backend failures; nothing is cleared locally on failure.
    pub async fn clear_chat(&self) -> Result<(), ApiError> {
        self.check(self.api.clear_messages().await)?;
        self.chat.write().clear();
        self.logs.invalidate();
        self.summary.invalidate();
        Ok(())
    }

    /// Confirm a proposed food/exercise action on a message
    ///
    /// The server commits the entry and echoes the updated message, which
    /// replaces the stale copy in the chat list. Log-dependent caches are
    /// invalidated.
    ///
    /// # Errors
    ///
    /// Propagates backend failures, including a rejection when the message
    /// carries no proposal.
    pub async fn confirm_tracking(&self, id: &MessageId) -> Result<ChatMessage, ApiError> {
        let dto = self.check(self.api.confirm_tracking(&id.0).await)?;
        let updated = ChatMessage::from(dto);
        self.chat.write().replace_message(updated.clone());
        self.logs.invalidate();
        self.summary.invalidate();
        Ok(updated)
    }

    // ---- logs, stats, plans --------------------------------------------

    /// Today's committed log entries (cached)
    ///
    /// # Errors
    ///
    /// Propagates backend failures from a refetch.
    pub async fn todays_logs(&self) -> Result<DailyLogs, ApiError> {
        let result = self
            .logs
            .get_with(|| async { self.api.todays_logs().await })
            .await;
        self.check(result)
    }

    /// Server-computed daily summary (cached)
    ///
    /// # Errors
    ///
    /// Propagates backend failures from a refetch.
    pub async fn todays_summary(&self) -> Result<DailySummary, ApiError> {
        let result = self
            .summary
            .get_with(|| async { self.api.todays_summary().await })
            .await;
        self.check(result)
    }

    /// Today's meal plan (cached)
    ///
    /// # Errors
    ///
    /// Propagates backend failures from a refetch.
    pub async fn todays_meal_plan(&self) -> Result<Vec<MealPlanItem>, ApiError> {
        let result = self
            .meal_plan
            .get_with(|| async { self.api.todays_meal_plan().await })
            .await;
        self.check(result)
    }

    /// Today's training plan (cached)
    ///
    /// # Errors
    ///
    /// Propagates backend failures from a refetch.
    pub async fn todays_training_plan(&self) -> Result<Vec<TrainingRoutine>, ApiError> {
        let result = self
            .training_plan
            .get_with(|| async { self.api.todays_training_plan().await })
            .await;
        self.check(result)
    }

    /// Log a meal directly, bypassing the chat
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn log_meal(
        &self,
        request: &crate::api::types::MealLogCreate,
    ) -> Result<crate::api::types::MealLog, ApiError> {
        let entry = self.check(self.api.log_meal(request).await)?;
        self.logs.invalidate();
        self.summary.invalidate();
        Ok(entry)
    }

    /// Log an exercise directly, bypassing the chat
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn log_exercise(
        &self,
        request: &crate::api::types::ExerciseLogCreate,
    ) -> Result<crate::api::types::ExerciseLog, ApiError> {
        let entry = self.check(self.api.log_exercise(request).await)?;
        self.logs.invalidate();
        self.summary.invalidate();
        Ok(entry)
    }

    /// Derived dashboard stats, computed client-side
    ///
    /// Targets come from today's meal plan when one exists; otherwise from
    /// the per-plan table keyed by the profile's active plan.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from the underlying fetches.
    pub async fn dashboard(&self) -> Result<DailyStats, ApiError> {
        let logs = self.todays_logs().await?;
        let plan = self.todays_meal_plan().await?;
        let targets = Targets::from_meal_plan(&plan)
            .unwrap_or_else(|| Targets::for_plan(self.profile.get().plan));
        Ok(compute_stats(&logs.meal_logs, &logs.exercise_logs, &targets))
    }

    // ---- profile & auth ------------------------------------------------

    /// Local profile snapshot (no network)
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        self.profile.get()
    }

    /// Fetch the remote profile and reconcile the local cache
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the local copy is kept on failure.
    pub async fn load_profile(&self) -> Result<UserProfile, ApiError> {
        let profile = self.check(self.api.profile().await)?;
        self.profile.set(profile.clone());
        Ok(profile)
    }

    /// Push a profile update and reconcile with the server's echo
    ///
    /// A plan change shifts the targets, so the summary and meal plan
    /// caches are invalidated.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the local copy is kept on failure.
    pub async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile, ApiError> {
        let echoed = self.check(self.api.update_profile(&profile).await)?;
        self.profile.set(echoed.clone());
        self.summary.invalidate();
        self.meal_plan.invalidate();
        Ok(echoed)
    }

    /// Upload raw image bytes, returning the attachment id
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn upload_image(
        &self,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ApiError> {
        let request = crate::api::types::ImageUploadRequest {
            image_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            content_type: content_type.to_string(),
        };
        let upload = self.check(self.api.upload_image(&request).await)?;
        Ok(upload.attachment_id)
    }

    /// Fetch uploaded image bytes by attachment id
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn fetch_image(&self, attachment_id: &str) -> Result<Vec<u8>, ApiError> {
        self.check(self.api.fetch_image(attachment_id).await)
    }

    /// Current demo day override
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn simulated_day(&self) -> Result<SimulatedDay, ApiError> {
        self.check(self.api.simulated_day().await)
    }

    /// Set the demo day override; plans are day-keyed, so their caches
    /// are invalidated
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn set_simulated_day(&self, day: u8) -> Result<SimulatedDay, ApiError> {
        let updated = self.check(self.api.set_simulated_day(day).await)?;
        self.meal_plan.invalidate();
        self.training_plan.invalidate();
        Ok(updated)
    }

    /// Available demo personas
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn demo_personas(&self) -> Result<Vec<DemoPersona>, ApiError> {
        self.check(self.api.demo_personas().await)
    }

    /// Log in as a demo persona and pull the initial state
    ///
    /// # Errors
    ///
    /// Propagates backend failures from the login or the profile fetch.
    pub async fn demo_login(&self, persona: &str) -> Result<(), ApiError> {
        self.check(self.api.demo_login(persona).await)?;
        self.load_profile().await?;
        Ok(())
    }

    /// Drop all per-user state: token, caches, chat, profile
    pub fn logout(&self) {
        self.session.clear();
        self.logs.clear();
        self.summary.clear();
        self.meal_plan.clear();
        self.training_plan.clear();
        self.chat.write().clear();
        self.profile.clear();
        tracing::info!("logged out");
    }
}
