//! Report-readiness detection and the delayed hand-off to the report view

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    deferred::pause,
    dispatcher::RawReply,
    error::{Error, Result},
    state::{ScreenState, StateCell},
};

/// Substring of a reply that announces the analysis is done
pub const DEFAULT_COMPLETION_SIGNAL: &str = "분석 중";

/// Time to read the last revealed segment before the loading screen
pub const DEFAULT_READ_DELAY: Duration = Duration::from_millis(5000);

/// Time spent on the loading screen before navigating
pub const DEFAULT_LOADING_DELAY: Duration = Duration::from_millis(5000);

/// Where the chat screen goes once the report is ready
pub trait Navigator: Send + Sync {
    /// Open the report view with the backend's payload, untouched
    fn open_report(&self, payload: Value);
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub completion_signal: String,
    pub read_delay: Duration,
    pub loading_delay: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            completion_signal: DEFAULT_COMPLETION_SIGNAL.to_string(),
            read_delay: DEFAULT_READ_DELAY,
            loading_delay: DEFAULT_LOADING_DELAY,
        }
    }
}

/// Whether a payload carries anything.
///
/// `null`, `""`, `{}` and `[]` count as empty; numbers and booleans do not.
pub fn is_present(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Drives `AwaitingReportDelay → Loading → Navigated`
#[derive(Clone)]
pub struct ReportTrigger {
    config: ReportConfig,
    state: StateCell,
    navigator: Arc<dyn Navigator>,
    lifetime: CancellationToken,
}

impl ReportTrigger {
    pub fn new(
        config: ReportConfig,
        state: StateCell,
        navigator: Arc<dyn Navigator>,
        lifetime: CancellationToken,
    ) -> Self {
        Self {
            config,
            state,
            navigator,
            lifetime,
        }
    }

    /// The payload to hand off, if the reply both carries the completion
    /// signal (in its text or any segment) and a non-empty payload.
    pub fn inspect<'a>(&self, reply: &'a RawReply) -> Option<&'a Value> {
        if self.config.completion_signal.is_empty()
            || !reply.mentions(&self.config.completion_signal)
        {
            return None;
        }
        reply.report_payload.as_ref().filter(|p| is_present(p))
    }

    /// Wait, show loading, wait, then navigate.
    ///
    /// Both waits are cancelled with the screen; a cancelled run never
    /// navigates.
    pub async fn run(&self, payload: Value) -> Result<()> {
        self.state.set(ScreenState::AwaitingReportDelay);
        if !pause(&self.lifetime, self.config.read_delay).await {
            return Err(Error::Cancelled);
        }

        self.state.set(ScreenState::Loading);
        if !pause(&self.lifetime, self.config.loading_delay).await {
            return Err(Error::Cancelled);
        }

        tracing::info!("report ready, navigating to report view");
        self.navigator.open_report(payload);
        self.state.set(ScreenState::Navigated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::sync::broadcast;

    #[derive(Default)]
    struct RecordingNavigator {
        opened: Mutex<Vec<Value>>,
    }

    impl Navigator for RecordingNavigator {
        fn open_report(&self, payload: Value) {
            self.opened.lock().push(payload);
        }
    }

    fn trigger() -> (ReportTrigger, StateCell, Arc<RecordingNavigator>, CancellationToken) {
        let (tx, _rx) = broadcast::channel(16);
        let state = StateCell::new(tx);
        let navigator = Arc::new(RecordingNavigator::default());
        let token = CancellationToken::new();
        let trigger = ReportTrigger::new(
            ReportConfig::default(),
            state.clone(),
            navigator.clone(),
            token.clone(),
        );
        (trigger, state, navigator, token)
    }

    #[test]
    fn test_presence_rules() {
        assert!(!is_present(&Value::Null));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!({})));
        assert!(!is_present(&json!([])));
        assert!(is_present(&json!({ "id": 42 })));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!(false)));
    }

    #[test]
    fn test_inspect_needs_signal_and_payload() {
        let (trigger, ..) = trigger();

        let ready = RawReply::from_text("분석 중이에요!").with_payload(json!({ "id": 42 }));
        assert_eq!(trigger.inspect(&ready), Some(&json!({ "id": 42 })));

        let no_payload = RawReply::from_text("분석 중이에요!");
        assert!(trigger.inspect(&no_payload).is_none());

        let no_signal = RawReply::from_text("안녕하세요").with_payload(json!({ "id": 42 }));
        assert!(trigger.inspect(&no_signal).is_none());

        let empty_payload = RawReply::from_text("분석 중이에요!").with_payload(json!({}));
        assert!(trigger.inspect(&empty_payload).is_none());
    }

    #[test]
    fn test_signal_in_backend_segments_counts() {
        let (trigger, ..) = trigger();
        let reply = RawReply {
            segments: Some(vec!["결과가 나왔어요.".into(), "지금 분석 중입니다".into()]),
            ..Default::default()
        }
        .with_payload(json!({ "id": 7 }));
        assert!(reply.text.is_empty());
        assert_eq!(trigger.inspect(&reply), Some(&json!({ "id": 7 })));

        let unrelated = RawReply {
            segments: Some(vec!["안녕하세요".into()]),
            ..Default::default()
        }
        .with_payload(json!({ "id": 7 }));
        assert!(trigger.inspect(&unrelated).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_walks_states_then_navigates() {
        let (trigger, state, navigator, _token) = trigger();
        let task = tokio::spawn(async move { trigger.run(json!({ "id": 42 })).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(state.get(), ScreenState::AwaitingReportDelay);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(state.get(), ScreenState::Loading);
        assert!(navigator.opened.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        task.await.unwrap().unwrap();
        assert_eq!(state.get(), ScreenState::Navigated);
        assert_eq!(*navigator.opened.lock(), vec![json!({ "id": 42 })]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_run_never_navigates() {
        let (trigger, state, navigator, token) = trigger();
        let task = tokio::spawn(async move { trigger.run(json!({ "id": 1 })).await });

        tokio::time::sleep(Duration::from_millis(7000)).await;
        assert_eq!(state.get(), ScreenState::Loading);
        token.cancel();

        assert!(matches!(task.await.unwrap(), Err(Error::Cancelled)));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(navigator.opened.lock().is_empty());
        assert_ne!(state.get(), ScreenState::Navigated);
    }
}
