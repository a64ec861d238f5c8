//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin view over the core:
//! - Event loop (keyboard, resize, background results)
//! - One [`Oracle`] for all state and backend calls
//! - Screen switching between chat, dashboard, plans, and profile
//!
//! Backend calls never block the event loop: every action spawns a task
//! that reports back through an [`AppEvent`] channel, and the next draw
//! reads the refreshed state straight from the core.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use oracle_core::{
    DailyStats, MealPlanItem, MessageId, NullSpeechEngine, Oracle, OutgoingMessage, Plan, Theme,
    TrainingRoutine, UserProfile, VoiceRecorder,
};

use crate::theme::Palette;
use crate::ui;

/// Seconds between background dashboard refreshes
const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Demo personas offered on the onboarding screen
pub const PERSONAS: [(&str, &str); 3] = [
    ("cut", "Cut - lose fat, keep muscle"),
    ("maintain", "Maintain - hold steady"),
    ("bulk", "Bulk - build mass"),
];

/// Active screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Persona selection before any backend data exists
    Onboarding,
    /// The conversation
    Chat,
    /// Daily stats
    Dashboard,
    /// Meal and training plans for today
    Plan,
    /// Profile editing
    Profile,
}

impl Screen {
    fn next(self) -> Self {
        match self {
            Self::Onboarding => Self::Onboarding,
            Self::Chat => Self::Dashboard,
            Self::Dashboard => Self::Plan,
            Self::Plan => Self::Profile,
            Self::Profile => Self::Chat,
        }
    }
}

/// Results reported back from background tasks
pub enum AppEvent {
    /// A chat send resolved
    SendFinished(Result<(), String>),
    /// History fetch resolved
    HistoryLoaded(Result<(), String>),
    /// Demo login resolved
    LoggedIn(Result<(), String>),
    /// Chat clear resolved
    ChatCleared(Result<(), String>),
    /// Confirm-tracking resolved
    TrackingConfirmed(Result<(), String>),
    /// Fresh dashboard stats
    Stats(Result<DailyStats, String>),
    /// Fresh plan data
    Plans(Result<(Vec<MealPlanItem>, Vec<TrainingRoutine>), String>),
    /// Profile save resolved
    ProfileSaved(Result<UserProfile, String>),
    /// Voice capture delivered a transcript
    Transcript(String),
    /// Voice capture failed
    VoiceError(String),
}

/// Main application state
pub struct App {
    oracle: Arc<Oracle>,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
    running: bool,

    /// Active screen
    pub screen: Screen,
    /// Chat input buffer
    pub input: String,
    /// Scroll offset in lines from the bottom of the chat
    pub scroll: u16,
    /// One-line status/error message
    pub status: Option<String>,
    /// Latest dashboard stats, if fetched
    pub stats: Option<DailyStats>,
    /// Today's meal plan
    pub meal_plan: Vec<MealPlanItem>,
    /// Today's training plan
    pub training_plan: Vec<TrainingRoutine>,
    /// Profile being edited on the profile screen
    pub profile_draft: UserProfile,
    /// Highlighted persona on the onboarding screen
    pub persona_index: usize,
    /// Resolved color palette
    pub palette: Palette,

    voice: VoiceRecorder,
}

impl App {
    /// Create the app over a shared core
    #[must_use]
    pub fn new(oracle: Arc<Oracle>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut voice = VoiceRecorder::new(Box::new(NullSpeechEngine));
        let sink = tx.clone();
        voice.on_transcript(move |text| {
            let _ = sink.send(AppEvent::Transcript(text.to_string()));
        });
        let sink = tx.clone();
        voice.on_error(move |message| {
            let _ = sink.send(AppEvent::VoiceError(message.to_string()));
        });

        let profile = oracle.profile();
        let screen = if oracle.is_authenticated() && profile.onboarding_complete {
            Screen::Chat
        } else {
            Screen::Onboarding
        };

        Self {
            palette: Palette::for_theme(profile.theme),
            profile_draft: profile,
            oracle,
            tx,
            rx: Some(rx),
            running: true,
            screen,
            input: String::new(),
            scroll: 0,
            status: None,
            stats: None,
            meal_plan: Vec::new(),
            training_plan: Vec::new(),
            persona_index: 1,
            voice,
        }
    }

    /// Handle to the core for rendering
    #[must_use]
    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    /// Run the event loop until quit
    ///
    /// # Errors
    ///
    /// Propagates terminal I/O failures.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow!("event loop already running"))?;
        let mut term_events = EventStream::new();
        let mut refresh = tokio::time::interval(REFRESH_INTERVAL);

        if self.screen == Screen::Chat {
            self.spawn_load_history();
            self.spawn_refresh();
        }

        while self.running {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                maybe_event = term_events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err.into()),
                        None => break,
                    }
                }
                Some(app_event) = rx.recv() => self.handle_app_event(app_event),
                _ = refresh.tick() => {
                    if self.screen == Screen::Dashboard {
                        self.spawn_refresh();
                    }
                }
            }
        }
        Ok(())
    }

    // ---- event handling ------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match self.screen {
            Screen::Onboarding => self.handle_onboarding_key(key),
            Screen::Chat => self.handle_chat_key(key),
            Screen::Dashboard | Screen::Plan => self.handle_view_key(key),
            Screen::Profile => self.handle_profile_key(key),
        }
    }

    fn handle_onboarding_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.persona_index = self.persona_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.persona_index = (self.persona_index + 1).min(PERSONAS.len() - 1);
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.persona_index = usize::from(c as u8 - b'1');
                self.spawn_login();
            }
            KeyCode::Enter => self.spawn_login(),
            KeyCode::Esc => self.running = false,
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => self.spawn_clear_chat(),
                KeyCode::Char('t') => self.spawn_confirm_tracking(),
                KeyCode::Char('v') => self.toggle_voice(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => self.input.clear(),
            KeyCode::Up => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Tab => self.switch_screen(),
            _ => {}
        }
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.switch_screen(),
            KeyCode::Char('r') => self.spawn_refresh(),
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.switch_screen(),
            KeyCode::Up => self.profile_draft.weight_kg += 0.5,
            KeyCode::Down => {
                self.profile_draft.weight_kg = (self.profile_draft.weight_kg - 0.5).max(0.0);
            }
            KeyCode::Right => self.profile_draft.height_cm += 1,
            KeyCode::Left => {
                self.profile_draft.height_cm = self.profile_draft.height_cm.saturating_sub(1);
            }
            KeyCode::Char('p') => {
                let current = Plan::ALL
                    .iter()
                    .position(|p| *p == self.profile_draft.plan)
                    .unwrap_or(0);
                self.profile_draft.plan = Plan::ALL[(current + 1) % Plan::ALL.len()];
            }
            KeyCode::Char('t') => {
                self.profile_draft.theme = match self.profile_draft.theme {
                    Theme::Dark => Theme::Light,
                    Theme::Light => Theme::Dark,
                };
                self.palette = Palette::for_theme(self.profile_draft.theme);
            }
            KeyCode::Enter => self.spawn_save_profile(),
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            _ => {}
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SendFinished(Ok(())) => {
                self.scroll = 0;
                if self
                    .oracle
                    .messages()
                    .last()
                    .is_some_and(|m| m.action.mutates_logs())
                {
                    self.spawn_refresh();
                }
            }
            AppEvent::SendFinished(Err(message)) => {
                self.status = Some(format!("Send failed: {message}"));
                self.spawn_load_history();
            }
            AppEvent::HistoryLoaded(Ok(())) => self.scroll = 0,
            AppEvent::HistoryLoaded(Err(message)) => {
                self.status = Some(format!("History load failed: {message}"));
            }
            AppEvent::LoggedIn(Ok(())) => {
                self.profile_draft = self.oracle.profile();
                self.palette = Palette::for_theme(self.profile_draft.theme);
                self.screen = Screen::Chat;
                self.spawn_load_history();
                self.spawn_refresh();
            }
            AppEvent::LoggedIn(Err(message)) => {
                self.status = Some(format!("Login failed: {message}"));
            }
            AppEvent::ChatCleared(Ok(())) => {
                self.status = Some("Chat cleared".to_string());
                self.spawn_refresh();
            }
            AppEvent::ChatCleared(Err(message)) => {
                self.status = Some(format!("Clear failed: {message}"));
            }
            AppEvent::TrackingConfirmed(Ok(())) => {
                self.status = Some("Tracked!".to_string());
                self.spawn_refresh();
            }
            AppEvent::TrackingConfirmed(Err(message)) => {
                self.status = Some(format!("Confirm failed: {message}"));
            }
            AppEvent::Stats(Ok(stats)) => self.stats = Some(stats),
            AppEvent::Stats(Err(message)) => {
                self.status = Some(format!("Stats unavailable: {message}"));
            }
            AppEvent::Plans(Ok((meals, training))) => {
                self.meal_plan = meals;
                self.training_plan = training;
            }
            AppEvent::Plans(Err(message)) => {
                self.status = Some(format!("Plans unavailable: {message}"));
            }
            AppEvent::ProfileSaved(Ok(profile)) => {
                self.profile_draft = profile;
                self.palette = Palette::for_theme(self.profile_draft.theme);
                self.status = Some("Profile saved".to_string());
                self.spawn_refresh();
            }
            AppEvent::ProfileSaved(Err(message)) => {
                self.status = Some(format!("Save failed: {message}"));
            }
            AppEvent::Transcript(text) => {
                if !self.input.is_empty() {
                    self.input.push(' ');
                }
                self.input.push_str(&text);
            }
            AppEvent::VoiceError(message) => self.status = Some(message),
        }

        if !self.oracle.is_authenticated() && self.screen != Screen::Onboarding {
            // Forced logout (auth rejected): back to onboarding.
            self.screen = Screen::Onboarding;
            self.stats = None;
            self.meal_plan.clear();
            self.training_plan.clear();
        }
    }

    // ---- actions -------------------------------------------------------

    fn switch_screen(&mut self) {
        self.status = None;
        self.screen = self.screen.next();
        match self.screen {
            Screen::Dashboard | Screen::Plan => self.spawn_refresh(),
            Screen::Profile => self.profile_draft = self.oracle.profile(),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.oracle.is_sending() {
            return;
        }
        self.input.clear();
        self.status = None;

        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = oracle
                .send_message(OutgoingMessage::text(text))
                .await
                .map(|_| ())
                .map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::SendFinished(result));
        });
    }

    fn toggle_voice(&mut self) {
        if self.voice.is_recording() {
            self.voice.stop();
        } else {
            self.voice.start();
        }
    }

    fn spawn_login(&mut self) {
        let persona = PERSONAS[self.persona_index].0;
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = oracle
                .demo_login(persona)
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::LoggedIn(result));
        });
    }

    fn spawn_load_history(&self) {
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = oracle.load_history().await.map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::HistoryLoaded(result));
        });
    }

    fn spawn_clear_chat(&self) {
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = oracle.clear_chat().await.map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::ChatCleared(result));
        });
    }

    fn spawn_confirm_tracking(&mut self) {
        let Some(id) = self.last_proposal() else {
            self.status = Some("Nothing to confirm".to_string());
            return;
        };
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = oracle
                .confirm_tracking(&id)
                .await
                .map(|_| ())
                .map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::TrackingConfirmed(result));
        });
    }

    fn spawn_refresh(&self) {
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let stats = oracle.dashboard().await.map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::Stats(stats));

            let plans = async {
                let meals = oracle.todays_meal_plan().await.map_err(|e| e.to_string())?;
                let training = oracle
                    .todays_training_plan()
                    .await
                    .map_err(|e| e.to_string())?;
                Ok((meals, training))
            }
            .await;
            let _ = tx.send(AppEvent::Plans(plans));
        });
    }

    fn spawn_save_profile(&self) {
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();
        let mut draft = self.profile_draft.clone();
        draft.onboarding_complete = true;
        tokio::spawn(async move {
            let result = oracle
                .update_profile(draft)
                .await
                .map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::ProfileSaved(result));
        });
    }

    fn last_proposal(&self) -> Option<MessageId> {
        self.oracle
            .messages()
            .iter()
            .rev()
            .find(|m| m.action.is_proposal())
            .map(|m| m.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_screen_cycle_skips_onboarding() {
        let mut screen = Screen::Chat;
        let mut seen = Vec::new();
        for _ in 0..4 {
            screen = screen.next();
            seen.push(screen);
        }
        assert_eq!(
            seen,
            [Screen::Dashboard, Screen::Plan, Screen::Profile, Screen::Chat]
        );
        assert_eq!(Screen::Onboarding.next(), Screen::Onboarding);
    }
}
