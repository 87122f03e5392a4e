//! Screen state machine
//!
//! `Idle → AwaitingReply → Revealing → (AwaitingReportDelay → Loading →
//! Navigated) | Idle`. A failed reply goes straight back to `Idle`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::events::ChatEvent;

/// Where the chat screen currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenState {
    #[default]
    Idle,
    AwaitingReply,
    Revealing,
    AwaitingReportDelay,
    Loading,
    Navigated,
}

impl ScreenState {
    /// `Navigated` hands control to the report view; nothing follows it here
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScreenState::Navigated)
    }

    /// Whether a round-trip or its aftermath is still in progress
    pub fn is_working(&self) -> bool {
        !matches!(self, ScreenState::Idle | ScreenState::Navigated)
    }

    /// Short status text for the UI
    pub fn label(&self) -> &'static str {
        match self {
            ScreenState::Idle => "Ready",
            ScreenState::AwaitingReply => "Waiting for reply...",
            ScreenState::Revealing => "Typing...",
            ScreenState::AwaitingReportDelay => "Preparing report...",
            ScreenState::Loading => "Loading report...",
            ScreenState::Navigated => "Opened report",
        }
    }
}

/// Shared, observable holder for the current [`ScreenState`]
#[derive(Clone)]
pub struct StateCell {
    current: Arc<Mutex<ScreenState>>,
    events: broadcast::Sender<ChatEvent>,
}

impl StateCell {
    pub fn new(events: broadcast::Sender<ChatEvent>) -> Self {
        Self {
            current: Arc::new(Mutex::new(ScreenState::Idle)),
            events,
        }
    }

    pub fn get(&self) -> ScreenState {
        *self.current.lock()
    }

    /// Move to `next`. Returns false if the screen already navigated away.
    pub fn set(&self, next: ScreenState) -> bool {
        {
            let mut current = self.current.lock();
            if current.is_terminal() {
                tracing::debug!(?next, "ignoring state change after navigation");
                return false;
            }
            if *current == next {
                return true;
            }
            tracing::debug!(from = ?*current, to = ?next, "screen state change");
            *current = next;
        }
        let _ = self.events.send(ChatEvent::StateChanged { state: next });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigated_is_terminal() {
        let (tx, _rx) = broadcast::channel(8);
        let cell = StateCell::new(tx);
        assert!(cell.set(ScreenState::Loading));
        assert!(cell.set(ScreenState::Navigated));
        assert!(!cell.set(ScreenState::Idle));
        assert_eq!(cell.get(), ScreenState::Navigated);
    }

    #[test]
    fn test_state_change_emits_event_once() {
        let (tx, mut rx) = broadcast::channel(8);
        let cell = StateCell::new(tx);
        cell.set(ScreenState::AwaitingReply);
        cell.set(ScreenState::AwaitingReply);

        match rx.try_recv().unwrap() {
            ChatEvent::StateChanged { state } => assert_eq!(state, ScreenState::AwaitingReply),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_working_states() {
        assert!(!ScreenState::Idle.is_working());
        assert!(ScreenState::Revealing.is_working());
        assert!(ScreenState::Loading.is_working());
        assert!(!ScreenState::Navigated.is_working());
    }
}
