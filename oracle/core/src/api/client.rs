//! HTTP Bindings for the Fitness Backend
//!
//! [`FitnessApi`] is the seam between the core and the backend: the
//! orchestrator and tests work against the trait, while [`HttpApi`] is the
//! reqwest implementation used in production. The bearer token comes from
//! the [`AuthSession`] handed over at construction and is attached to every
//! request; a 401/403 clears the session and surfaces as
//! [`ApiError::Unauthorized`] so the caller can force logout.
//!
//! Single attempt per call: no retries, no backoff. The caller resyncs via
//! refetch on failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::types::{
    ChatHistory, ChatMessageDto, DailyLogs, DailySummary, DemoPersona, ExerciseLog,
    ExerciseLogCreate, ImageUpload, ImageUploadRequest, MealLog, MealLogCreate, MealPlanItem,
    Paginated, ProfileDto, SendMessageRequest, SimulatedDay, SimulatedDayUpdate, TokenResponse,
    TrainingRoutine,
};
use crate::auth::AuthSession;

/// Errors from backend calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend rejected our credentials (401/403)
    #[error("not authenticated")]
    Unauthorized,
    /// Any other non-success HTTP status
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, best effort
        body: String,
    },
    /// The response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error means the session is no longer valid
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Backend operations consumed by the core
///
/// Implemented by [`HttpApi`] for production and by
/// [`MockApi`](super::mock::MockApi) for offline/demo operation and tests.
#[async_trait]
pub trait FitnessApi: Send + Sync {
    /// `POST /chat/messages` — send a message, receive the assistant reply
    async fn send_message(&self, request: &SendMessageRequest)
        -> Result<ChatMessageDto, ApiError>;

    /// `GET /chat/messages?limit=N` — chat history, oldest first
    async fn chat_history(&self, limit: u32) -> Result<ChatHistory, ApiError>;

    /// `POST /chat/messages/clear` — delete all chat messages
    async fn clear_messages(&self) -> Result<(), ApiError>;

    /// `POST /chat/messages/{id}/confirm-tracking` — commit a proposal
    async fn confirm_tracking(&self, message_id: &str) -> Result<ChatMessageDto, ApiError>;

    /// `GET /logs/today` — today's meal and exercise logs
    async fn todays_logs(&self) -> Result<DailyLogs, ApiError>;

    /// `POST /logs/meal` — log a meal directly
    async fn log_meal(&self, request: &MealLogCreate) -> Result<MealLog, ApiError>;

    /// `POST /logs/exercise` — log an exercise directly
    async fn log_exercise(&self, request: &ExerciseLogCreate) -> Result<ExerciseLog, ApiError>;

    /// `GET /summary/today` — server-computed daily summary
    async fn todays_summary(&self) -> Result<DailySummary, ApiError>;

    /// `GET /plans/meal/today` — today's meal plan items
    async fn todays_meal_plan(&self) -> Result<Vec<MealPlanItem>, ApiError>;

    /// `GET /plans/training/today` — today's training routine
    async fn todays_training_plan(&self) -> Result<Vec<TrainingRoutine>, ApiError>;

    /// `GET /profile/me` — remote profile (source of truth)
    async fn profile(&self) -> Result<ProfileDto, ApiError>;

    /// `PUT /profile/me` — update the remote profile
    async fn update_profile(&self, profile: &ProfileDto) -> Result<ProfileDto, ApiError>;

    /// `POST /upload/image` — upload an image, receive an attachment id
    async fn upload_image(&self, request: &ImageUploadRequest) -> Result<ImageUpload, ApiError>;

    /// `GET /upload/image/{id}` — authenticated binary fetch
    async fn fetch_image(&self, attachment_id: &str) -> Result<Vec<u8>, ApiError>;

    /// `GET /profile/simulated-day` — demo day override
    async fn simulated_day(&self) -> Result<SimulatedDay, ApiError>;

    /// `PUT /profile/simulated-day` — set the demo day override
    async fn set_simulated_day(&self, day: u8) -> Result<SimulatedDay, ApiError>;

    /// `GET /demo/users` — available demo personas
    async fn demo_personas(&self) -> Result<Vec<DemoPersona>, ApiError>;

    /// `POST /demo/login/{persona}` — obtain and store a bearer token
    async fn demo_login(&self, persona: &str) -> Result<(), ApiError>;
}

/// reqwest-backed [`FitnessApi`] implementation
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
    session: AuthSession,
}

impl HttpApi {
    /// Create a client against the given base URL
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, which is a
    /// misconfigured build rather than a runtime condition.
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: AuthSession) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to create HTTP client"),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check status; 401/403 clears the session and maps to `Unauthorized`
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(status = status.as_u16(), "auth rejected; clearing session");
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.authorize(self.http.get(self.url(path))).send().await?;
        Ok(self.check(response).await?.json().await?)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    async fn post_empty(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(self.http.post(self.url(path))).send().await?;
        self.check(response).await
    }

    async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.http.put(self.url(path)).json(body))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }
}

#[async_trait]
impl FitnessApi for HttpApi {
    async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> Result<ChatMessageDto, ApiError> {
        self.post_json("/chat/messages", request).await
    }

    async fn chat_history(&self, limit: u32) -> Result<ChatHistory, ApiError> {
        self.get_json(&format!("/chat/messages?limit={limit}")).await
    }

    async fn clear_messages(&self) -> Result<(), ApiError> {
        self.post_empty("/chat/messages/clear").await?;
        Ok(())
    }

    async fn confirm_tracking(&self, message_id: &str) -> Result<ChatMessageDto, ApiError> {
        let response = self
            .post_empty(&format!("/chat/messages/{message_id}/confirm-tracking"))
            .await?;
        Ok(response.json().await?)
    }

    async fn todays_logs(&self) -> Result<DailyLogs, ApiError> {
        self.get_json("/logs/today").await
    }

    async fn log_meal(&self, request: &MealLogCreate) -> Result<MealLog, ApiError> {
        self.post_json("/logs/meal", request).await
    }

    async fn log_exercise(&self, request: &ExerciseLogCreate) -> Result<ExerciseLog, ApiError> {
        self.post_json("/logs/exercise", request).await
    }

    async fn todays_summary(&self) -> Result<DailySummary, ApiError> {
        self.get_json("/summary/today").await
    }

    async fn todays_meal_plan(&self) -> Result<Vec<MealPlanItem>, ApiError> {
        let page: Paginated<MealPlanItem> = self.get_json("/plans/meal/today").await?;
        Ok(page.data)
    }

    async fn todays_training_plan(&self) -> Result<Vec<TrainingRoutine>, ApiError> {
        let page: Paginated<TrainingRoutine> = self.get_json("/plans/training/today").await?;
        Ok(page.data)
    }

    async fn profile(&self) -> Result<ProfileDto, ApiError> {
        self.get_json("/profile/me").await
    }

    async fn update_profile(&self, profile: &ProfileDto) -> Result<ProfileDto, ApiError> {
        self.put_json("/profile/me", profile).await
    }

    async fn upload_image(&self, request: &ImageUploadRequest) -> Result<ImageUpload, ApiError> {
        self.post_json("/upload/image", request).await
    }

    async fn fetch_image(&self, attachment_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/upload/image/{attachment_id}"))))
            .send()
            .await?;
        let response = self.check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn simulated_day(&self) -> Result<SimulatedDay, ApiError> {
        self.get_json("/profile/simulated-day").await
    }

    async fn set_simulated_day(&self, day: u8) -> Result<SimulatedDay, ApiError> {
        self.put_json(
            "/profile/simulated-day",
            &SimulatedDayUpdate { simulated_day: day },
        )
        .await
    }

    async fn demo_personas(&self) -> Result<Vec<DemoPersona>, ApiError> {
        self.get_json("/demo/users").await
    }

    async fn demo_login(&self, persona: &str) -> Result<(), ApiError> {
        let token: TokenResponse = {
            let response = self
                .http
                .post(self.url(&format!("/demo/login/{persona}")))
                .send()
                .await?;
            self.check(response).await?.json().await?
        };
        if let Err(err) = self.session.set_token(token.access_token) {
            tracing::warn!(error = %err, "failed to persist auth token");
        }
        Ok(())
    }
}
