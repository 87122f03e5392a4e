//! Staged reveal of multi-part replies

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    deferred::defer_after,
    dispatcher::RawReply,
    error::{Error, Result},
    message::Sender,
    store::ConversationStore,
};

/// Phrase that opens the illustrative-example part of a reply
pub const DEFAULT_DELIMITER: &str = "예를 들어";

/// Gap between two revealed segments
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Reveal pacing and the split fallback
#[derive(Debug, Clone)]
pub struct RevealConfig {
    pub interval: Duration,
    /// Phrase used to split replies the backend did not segment itself.
    /// Empty disables splitting.
    pub delimiter: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Split a reply at the first occurrence of `delimiter`.
///
/// Yields `[trim(before), trim(from delimiter on)]` when found, otherwise
/// the text untouched as the only segment.
pub fn split_reply(full_text: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return vec![full_text.to_string()];
    }
    match full_text.find(delimiter) {
        Some(p) => vec![
            full_text[..p].trim().to_string(),
            full_text[p..].trim().to_string(),
        ],
        None => vec![full_text.to_string()],
    }
}

/// Segments to reveal for a reply: the backend's own split when it sent a
/// non-empty one, else [`split_reply`] on the full text.
pub fn segments_for(reply: &RawReply, delimiter: &str) -> Vec<String> {
    match &reply.segments {
        Some(segments) if !segments.is_empty() => segments.clone(),
        _ => split_reply(&reply.text, delimiter),
    }
}

/// Appends reply segments to the conversation at a fixed cadence
#[derive(Clone)]
pub struct StagedRevealer {
    store: ConversationStore,
    interval: Duration,
    lifetime: CancellationToken,
}

impl StagedRevealer {
    pub fn new(store: ConversationStore, interval: Duration, lifetime: CancellationToken) -> Self {
        Self {
            store,
            interval,
            lifetime,
        }
    }

    /// Reveal `segments` as bot messages.
    ///
    /// All segments are scheduled up front; segment `k` is due `k * interval`
    /// after the call and is appended only after segment `k - 1`. Resolves
    /// with the segment count once the last one has been appended, or
    /// [`Error::Cancelled`] if the screen went away first.
    pub async fn reveal(&self, segments: Vec<String>) -> Result<usize> {
        let count = segments.len();
        let mut last = None;

        for (k, segment) in segments.into_iter().enumerate() {
            let store = self.store.clone();
            let delay = self.interval * k as u32;
            last = Some(defer_after(&self.lifetime, delay, last.take(), move || {
                store.append(segment, Sender::Bot);
            }));
        }

        let Some(last) = last else {
            return Ok(0);
        };

        tracing::debug!(count, interval = ?self.interval, "revealing reply segments");
        match last.fired().await {
            Some(()) => Ok(count),
            None => Err(Error::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;
    use tokio::time::Instant;

    const EXAMPLE: &str = "분석 중이에요! 예를 들어 이런 식으로 분석해요";

    fn revealer(interval_ms: u64) -> (StagedRevealer, ConversationStore, CancellationToken) {
        let (tx, _rx) = broadcast::channel(64);
        let store = ConversationStore::new(tx);
        let token = CancellationToken::new();
        let revealer = StagedRevealer::new(
            store.clone(),
            Duration::from_millis(interval_ms),
            token.clone(),
        );
        (revealer, store, token)
    }

    #[test]
    fn test_split_on_delimiter() {
        let segments = split_reply(EXAMPLE, DEFAULT_DELIMITER);
        assert_eq!(
            segments,
            vec!["분석 중이에요!", "예를 들어 이런 식으로 분석해요"]
        );
        assert_eq!(segments.concat().replace(' ', ""), EXAMPLE.replace(' ', ""));
    }

    #[test]
    fn test_split_without_delimiter_keeps_text() {
        assert_eq!(split_reply("  안녕하세요 ", DEFAULT_DELIMITER), vec!["  안녕하세요 "]);
    }

    #[test]
    fn test_split_uses_first_occurrence() {
        let text = "A. 예를 들어 B. 예를 들어 C.";
        assert_eq!(
            split_reply(text, DEFAULT_DELIMITER),
            vec!["A.", "예를 들어 B. 예를 들어 C."]
        );
    }

    #[test]
    fn test_split_at_start_still_two_segments() {
        let segments = split_reply("예를 들어 이렇게", DEFAULT_DELIMITER);
        assert_eq!(segments, vec!["", "예를 들어 이렇게"]);
    }

    #[test]
    fn test_split_trimmed_concatenation_matches() {
        for text in [EXAMPLE, "x 예를 들어 y", "  lead 예를 들어tail  "] {
            let segments = split_reply(text, DEFAULT_DELIMITER);
            assert_eq!(segments.len(), 2);
            let joined = format!("{} {}", segments[0], segments[1]);
            let squash = |s: &str| s.split_whitespace().collect::<String>();
            assert_eq!(squash(&joined), squash(text.trim()));
        }
    }

    #[test]
    fn test_empty_delimiter_disables_split() {
        assert_eq!(split_reply(EXAMPLE, ""), vec![EXAMPLE]);
    }

    #[test]
    fn test_backend_segments_take_precedence() {
        let reply = RawReply {
            text: EXAMPLE.into(),
            segments: Some(vec!["one".into(), "two".into(), "three".into()]),
            report_payload: None,
        };
        assert_eq!(segments_for(&reply, DEFAULT_DELIMITER).len(), 3);
    }

    #[test]
    fn test_empty_backend_segments_fall_back() {
        let reply = RawReply {
            text: EXAMPLE.into(),
            segments: Some(vec![]),
            report_payload: None,
        };
        assert_eq!(segments_for(&reply, DEFAULT_DELIMITER).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_paces_segments() {
        let (revealer, store, _token) = revealer(1000);
        let segments = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let task = tokio::spawn(async move { revealer.reveal(segments).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.len(), 1);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.len(), 2);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(store.len(), 3);

        assert_eq!(task.await.unwrap().unwrap(), 3);
        let texts: Vec<String> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(store.snapshot().iter().all(|m| m.is_bot()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_resolves_after_last_segment() {
        let (revealer, store, _token) = revealer(1000);
        let start = Instant::now();
        let n = revealer
            .reveal(vec!["1".into(), "2".into(), "3".into(), "4".into()])
            .await
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(store.len(), 4);
        assert!(start.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_nothing() {
        let (revealer, store, _token) = revealer(1000);
        assert_eq!(revealer.reveal(Vec::new()).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_stops_when_cancelled() {
        let (revealer, store, token) = revealer(1000);
        let task = tokio::spawn(async move {
            revealer
                .reveal(vec!["a".into(), "b".into(), "c".into()])
                .await
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();

        assert!(matches!(task.await.unwrap(), Err(Error::Cancelled)));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_survives_stalled_workers() {
        let (revealer, store, _token) = revealer(1);
        let segments: Vec<String> = (0..200).map(|i| i.to_string()).collect();
        let expected = segments.clone();

        let task = tokio::spawn(async move { revealer.reveal(segments).await });

        // Block every worker so many deadlines pass at once
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stalls: Vec<_> = (0..4)
            .map(|_| tokio::spawn(async { std::thread::sleep(Duration::from_millis(300)) }))
            .collect();
        for stall in stalls {
            stall.await.unwrap();
        }

        assert_eq!(task.await.unwrap().unwrap(), 200);
        let texts: Vec<String> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, expected);
    }
}
