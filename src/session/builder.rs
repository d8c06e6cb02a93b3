//! The builder flow: one generation at a time, driven by user submissions
//!
//! `BuilderFlow` is the only writer of the conversation and the document.
//! Every transition is published as a [`SessionSnapshot`] on a watch
//! channel so the REPL and the preview server can read without locking.

use crate::config::BuilderConfig;
use crate::error::{FailureKind, SitewrightError};
use crate::providers::CodeGenerator;
use crate::session::conversation::{Conversation, Role, Turn, TurnIdGenerator};
use crate::session::document::GeneratedDocument;

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Assistant turn appended after any failed generation
pub const GENERATION_ERROR_MESSAGE: &str =
    "I'm sorry, I encountered an error while building your app. Please try again.";

/// Whether a generation is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Generating,
}

/// Read-only view of a session at one point in time
///
/// Cloning is cheap: the conversation and document share their buffers.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub conversation: Conversation,
    pub document: GeneratedDocument,
    pub phase: Phase,
}

/// Result of one call to [`BuilderFlow::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The text was blank; nothing happened
    Ignored,
    /// A generation was already in flight; nothing happened
    Rejected,
    /// The document was replaced and the summary appended
    Completed { summary: String },
    /// The apology turn was appended; the document is unchanged
    Failed { kind: FailureKind },
}

struct SessionState {
    conversation: Conversation,
    document: GeneratedDocument,
    phase: Phase,
    ids: TurnIdGenerator,
    seeded: bool,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversation: self.conversation.clone(),
            document: self.document.clone(),
            phase: self.phase,
        }
    }

    fn push_turn(&mut self, role: Role, content: impl Into<String>) {
        let id = self.ids.next_id();
        self.conversation = self.conversation.append(Turn::new(id, role, content));
    }
}

/// Drives a build session
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sitewright::config::Config;
/// use sitewright::providers::create_generator;
/// use sitewright::session::{BuilderFlow, SubmitOutcome};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let generator = create_generator(&config)?;
/// let flow = BuilderFlow::new(Arc::from(generator), Duration::from_secs(120));
///
/// if let SubmitOutcome::Completed { summary } = flow.submit("a pomodoro timer").await {
///     println!("{}", summary);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BuilderFlow {
    generator: Arc<dyn CodeGenerator>,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
    generation_timeout: Duration,
}

/// Resets the phase if a submit future is dropped mid-generation
struct InFlight<'a> {
    flow: &'a BuilderFlow,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Generation abandoned before completion");
            self.flow.finish(Err(SitewrightError::Cancelled.into()));
        }
    }
}

impl BuilderFlow {
    /// Create a flow with an empty conversation and no document
    ///
    /// # Arguments
    ///
    /// * `generator` - Backend that produces documents
    /// * `generation_timeout` - Upper bound on one generation
    pub fn new(generator: Arc<dyn CodeGenerator>, generation_timeout: Duration) -> Self {
        let state = SessionState {
            conversation: Conversation::new(),
            document: GeneratedDocument::new(),
            phase: Phase::Idle,
            ids: TurnIdGenerator::new(),
            seeded: false,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Self {
            generator,
            state: Mutex::new(state),
            updates,
            generation_timeout,
        }
    }

    /// Create a flow using the builder section of the configuration
    pub fn from_config(generator: Arc<dyn CodeGenerator>, config: &BuilderConfig) -> Self {
        Self::new(
            generator,
            Duration::from_secs(config.generation_timeout_seconds),
        )
    }

    /// The backend in use
    pub fn generator(&self) -> &dyn CodeGenerator {
        self.generator.as_ref()
    }

    /// Current state of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Receiver that observes every published transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Submit a request with no way to cancel it
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        self.submit_with_cancel(text, CancellationToken::new())
            .await
    }

    /// Submit a request that is abandoned when `cancel` fires
    ///
    /// Blank text is ignored and a submission during a generation is
    /// rejected; neither appends a turn nor reaches the generator. Any
    /// failure, including timeout and cancellation, appends
    /// [`GENERATION_ERROR_MESSAGE`] and leaves the document unchanged.
    pub async fn submit_with_cancel(&self, text: &str, cancel: CancellationToken) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank submission");
            return SubmitOutcome::Ignored;
        }

        let (history, document) = {
            let mut state = self.lock_state();
            if state.phase == Phase::Generating {
                tracing::warn!("Rejected submission while a generation is in flight");
                return SubmitOutcome::Rejected;
            }
            let history = state.conversation.clone();
            state.push_turn(Role::User, text);
            state.phase = Phase::Generating;
            self.publish(&state);
            (history, state.document.clone())
        };

        let mut guard = InFlight {
            flow: self,
            armed: true,
        };

        tracing::info!(
            "Generating: history_turns={}, updating={}",
            history.len(),
            !document.is_empty()
        );
        let started = Instant::now();

        let timeout_secs = self.generation_timeout.as_secs();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SitewrightError::Cancelled.into()),
            outcome = tokio::time::timeout(
                self.generation_timeout,
                self.generator.generate(text, history.turns(), document.as_context()),
            ) => match outcome {
                Ok(result) => result,
                Err(_) => Err(SitewrightError::Timeout(timeout_secs).into()),
            },
        };

        tracing::debug!("Generation finished in {} ms", started.elapsed().as_millis());
        guard.armed = false;
        self.finish(result)
    }

    /// Submit `initial_prompt` once, before anything else has happened
    ///
    /// Returns `None` when the prompt is blank, the conversation already
    /// has turns, or a seed has already run.
    pub async fn seed(&self, initial_prompt: &str) -> Option<SubmitOutcome> {
        self.seed_with_cancel(initial_prompt, CancellationToken::new())
            .await
    }

    /// [`BuilderFlow::seed`] that is abandoned when `cancel` fires
    pub async fn seed_with_cancel(
        &self,
        initial_prompt: &str,
        cancel: CancellationToken,
    ) -> Option<SubmitOutcome> {
        if initial_prompt.trim().is_empty() {
            tracing::debug!("Ignoring blank initial prompt");
            return None;
        }

        {
            let mut state = self.lock_state();
            if state.seeded || !state.conversation.is_empty() {
                tracing::debug!("Skipping seed: session already started");
                return None;
            }
            state.seeded = true;
        }
        Some(self.submit_with_cancel(initial_prompt, cancel).await)
    }

    fn finish(
        &self,
        result: crate::error::Result<crate::providers::GenerationResult>,
    ) -> SubmitOutcome {
        let mut state = self.lock_state();
        let outcome = match result {
            Ok(generated) => {
                tracing::info!("Generation succeeded: {} bytes of markup", generated.html.len());
                state.push_turn(Role::Assistant, generated.summary.clone());
                state.document = state.document.replace(generated.html);
                SubmitOutcome::Completed {
                    summary: generated.summary,
                }
            }
            Err(error) => {
                let kind = FailureKind::classify(&error);
                tracing::error!(kind = %kind, "Generation failed: {:#}", error);
                state.push_turn(Role::Assistant, GENERATION_ERROR_MESSAGE);
                SubmitOutcome::Failed { kind }
            }
        };
        state.phase = Phase::Idle;
        self.publish(&state);
        outcome
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot());
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
