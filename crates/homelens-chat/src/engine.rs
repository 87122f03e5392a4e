//! The chat engine: bootstrap, send, reveal and report hand-off

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use homelens_api::ChatBackend;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    dispatcher::MessageDispatcher,
    error::{Error, Result},
    events::ChatEvent,
    message::{Message, Sender},
    report::{Navigator, ReportConfig, ReportTrigger},
    reveal::{RevealConfig, StagedRevealer, segments_for},
    session::SessionContext,
    state::{ScreenState, StateCell},
    store::ConversationStore,
};

/// Greeting used when the bootstrap reply carries no text
pub const FALLBACK_GREETING: &str = "반갑습니다! 무엇을 도와드릴까요?";

/// Bot message shown when a round-trip fails
pub const FALLBACK_ERROR: &str = "오류가 발생했습니다.";

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub reveal: RevealConfig,
    pub report: ReportConfig,
    /// Refuse a new send while another one is outstanding
    pub exclusive_sends: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reveal.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "reveal interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// What a call to [`ChatEngine::send`] ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened
    Ignored,
    /// No auth token; nothing happened
    Skipped,
    /// The round-trip failed and the fallback error message was appended
    Failed { error: String },
    /// The reply was revealed in this many segments
    Revealed { segments: usize },
    /// The reply was revealed and the report view was opened
    ReportOpened,
}

/// Releases the in-flight count when a send finishes
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owns the chat screen's conversation and drives every round-trip.
///
/// All methods take `&self`; overlapping sends are possible unless
/// [`EngineConfig::exclusive_sends`] is set.
pub struct ChatEngine {
    config: EngineConfig,
    session: SessionContext,
    dispatcher: MessageDispatcher,
    store: ConversationStore,
    state: StateCell,
    revealer: StagedRevealer,
    trigger: ReportTrigger,
    lifetime: CancellationToken,
    in_flight: AtomicUsize,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl ChatEngine {
    /// Create an engine for one chat screen
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn ChatBackend>,
        session: SessionContext,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(256);
        let lifetime = CancellationToken::new();
        let store = ConversationStore::new(event_tx.clone());
        let state = StateCell::new(event_tx.clone());
        let revealer = StagedRevealer::new(store.clone(), config.reveal.interval, lifetime.clone());
        let trigger = ReportTrigger::new(
            config.report.clone(),
            state.clone(),
            navigator,
            lifetime.clone(),
        );

        Ok(Self {
            config,
            session,
            dispatcher: MessageDispatcher::new(backend),
            store,
            state,
            revealer,
            trigger,
            lifetime,
            in_flight: AtomicUsize::new(0),
            event_tx,
        })
    }

    /// Subscribe to re-render events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn state(&self) -> ScreenState {
        self.state.get()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Whether any send is still outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Tear the screen down: pending reveals and report delays stop
    pub fn teardown(&self) {
        tracing::debug!("chat screen torn down");
        self.lifetime.cancel();
    }

    /// Fetch the greeting and reset the conversation to it.
    ///
    /// Without a session this is a silent no-op. A failed request shows the
    /// fallback error message instead of a greeting.
    pub async fn bootstrap(&self) -> Result<()> {
        self.ensure_open()?;

        match self.dispatcher.send("", &self.session).await {
            Ok(reply) => {
                self.ensure_open()?;
                let text = if reply.text.is_empty() {
                    FALLBACK_GREETING.to_string()
                } else {
                    reply.text
                };
                self.store.initialize(text, Sender::Bot);
                Ok(())
            }
            Err(Error::MissingSession) => {
                tracing::warn!("no session token, skipping chat bootstrap");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat bootstrap failed");
                self.ensure_open()?;
                self.store.initialize(FALLBACK_ERROR, Sender::Bot);
                Ok(())
            }
        }
    }

    /// Send user text and play out the reply.
    ///
    /// Resolves once the reply is fully revealed, or once the report view was
    /// opened when the reply asks for it.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        self.ensure_open()?;

        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if !self.session.is_authenticated() {
            tracing::warn!("no session token, message not sent");
            return Ok(SendOutcome::Skipped);
        }

        let _in_flight = self.enter_send()?;

        self.store.append(text, Sender::User);
        self.state.set(ScreenState::AwaitingReply);

        let reply = match self.dispatcher.send(text, &self.session).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.ensure_open()?;
                self.store.append(FALLBACK_ERROR, Sender::Bot);
                self.state.set(ScreenState::Idle);
                return Ok(SendOutcome::Failed {
                    error: e.to_string(),
                });
            }
        };
        self.ensure_open()?;

        let segments = segments_for(&reply, &self.config.reveal.delimiter);
        self.state.set(ScreenState::Revealing);
        let count = self.revealer.reveal(segments).await?;

        match self.trigger.inspect(&reply) {
            Some(payload) => {
                self.trigger.run(payload.clone()).await?;
                Ok(SendOutcome::ReportOpened)
            }
            None => {
                self.state.set(ScreenState::Idle);
                Ok(SendOutcome::Revealed { segments: count })
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.lifetime.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.state.get().is_terminal() {
            return Err(Error::ScreenClosed);
        }
        Ok(())
    }

    fn enter_send(&self) -> Result<InFlight<'_>> {
        if self.config.exclusive_sends {
            self.in_flight
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                .map_err(|_| Error::Busy)?;
        } else {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
        }
        Ok(InFlight(&self.in_flight))
    }
}

impl Drop for ChatEngine {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
