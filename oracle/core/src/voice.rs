//! Voice Capture Adapter
//!
//! Wraps platform speech-to-text behind a small state machine:
//! `Idle --start--> Recording --stop/end/error--> Idle`. Only final
//! transcript segments are committed to the buffer; a non-empty transcript
//! is delivered exactly once on the transition back to idle. Platform error
//! codes map to fixed user-facing strings rather than exceptions.
//!
//! The platform seam is the [`SpeechEngine`] trait. Engines push their
//! events back into the recorder via the `handle_*` methods; the recorder
//! owns all transition and delivery logic.

/// Error string when the platform has no speech capability
pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition is not supported on this device.";

/// Platform speech-to-text control surface
///
/// Implementations start and stop the underlying capture; they report
/// results and errors by calling [`VoiceRecorder::handle_result`],
/// [`VoiceRecorder::handle_end`] and [`VoiceRecorder::handle_error`].
pub trait SpeechEngine: Send {
    /// Whether the platform capability is present
    fn is_supported(&self) -> bool;

    /// Begin capturing audio
    fn start(&mut self);

    /// Request a graceful stop (platform will emit its end event)
    fn stop(&mut self);

    /// Tear down immediately without emitting results
    fn abort(&mut self);
}

/// Engine for platforms without speech support
///
/// `start` is never reached: the recorder refuses to leave idle when
/// `is_supported` returns false.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSpeechEngine;

impl SpeechEngine for NullSpeechEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self) {}
    fn stop(&mut self) {}
    fn abort(&mut self) {}
}

/// Recorder state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    /// Not capturing
    Idle,
    /// Actively capturing audio
    Recording,
}

type TranscriptCallback = Box<dyn FnMut(&str) + Send>;
type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Single-resource voice capture state machine
///
/// Only one recording session may be active; starting while recording is a
/// no-op. Session state (`transcript buffer`, `error`) is ephemeral and
/// never persisted.
pub struct VoiceRecorder {
    engine: Box<dyn SpeechEngine>,
    state: RecorderState,
    transcript: String,
    error: Option<String>,
    on_transcript: Option<TranscriptCallback>,
    on_error: Option<ErrorCallback>,
}

impl VoiceRecorder {
    /// Create an idle recorder over the given engine
    #[must_use]
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            state: RecorderState::Idle,
            transcript: String::new(),
            error: None,
            on_transcript: None,
            on_error: None,
        }
    }

    /// Register the transcript delivery callback
    pub fn on_transcript(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_transcript = Some(Box::new(callback));
    }

    /// Register the error delivery callback
    pub fn on_error(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Whether a recording session is active
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Last reported error, if any
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a recording session
    ///
    /// Fails immediately (no state change) when the platform capability is
    /// absent; the unsupported message is set and delivered via the error
    /// callback. Starting while already recording is a guarded no-op.
    pub fn start(&mut self) {
        if self.is_recording() {
            return;
        }
        if !self.engine.is_supported() {
            self.error = Some(UNSUPPORTED_MESSAGE.to_string());
            self.emit_error(UNSUPPORTED_MESSAGE);
            return;
        }

        self.transcript.clear();
        self.error = None;
        self.engine.start();
        self.state = RecorderState::Recording;
        tracing::debug!("voice capture started");
    }

    /// User-initiated stop; delivers any accumulated transcript
    pub fn stop(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.engine.stop();
        self.finish();
    }

    /// Abort without delivering a transcript or error (e.g. view teardown)
    pub fn abort(&mut self) {
        self.engine.abort();
        self.state = RecorderState::Idle;
        self.transcript.clear();
    }

    /// Platform result event; only final segments are committed
    pub fn handle_result(&mut self, segment: &str, is_final: bool) {
        if !self.is_recording() || !is_final {
            return;
        }
        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(segment);
    }

    /// Platform end-of-capture event
    ///
    /// Idempotent with [`stop`](Self::stop): whichever transitions the
    /// recorder out of `Recording` first delivers the transcript; the other
    /// becomes a no-op.
    pub fn handle_end(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.finish();
    }

    /// Platform error event; maps the code and returns to idle
    pub fn handle_error(&mut self, code: &str) {
        if !self.is_recording() {
            return;
        }
        self.state = RecorderState::Idle;
        self.transcript.clear();

        let Some(message) = map_error_code(code) else {
            // Aborted by the user/platform; not surfaced.
            return;
        };
        tracing::warn!(code, "speech recognition error");
        self.error = Some(message.clone());
        self.emit_error(&message);
    }

    fn finish(&mut self) {
        self.state = RecorderState::Idle;
        let transcript = std::mem::take(&mut self.transcript);
        if transcript.is_empty() {
            return;
        }
        if let Some(callback) = self.on_transcript.as_mut() {
            callback(&transcript);
        }
    }

    fn emit_error(&mut self, message: &str) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(message);
        }
    }
}

/// Map a platform error code to its user-facing string
///
/// `aborted` returns `None`: teardown is not an error worth surfacing.
fn map_error_code(code: &str) -> Option<String> {
    match code {
        "aborted" => None,
        "not-allowed" => Some(
            "Microphone access denied. Please allow microphone access and try again.".to_string(),
        ),
        "no-speech" => Some("No speech detected. Please try again.".to_string()),
        "network" => Some("Network error during speech recognition. Please try again.".to_string()),
        other => Some(format!("Speech recognition error: {other}")),
    }
}
