//! Line mode: plain line-by-line chat for pipes and dumb terminals

use std::io::Write;
use std::sync::Arc;

use homelens_chat::{ChatEngine, ChatEvent, Message, ScreenState, SendOutcome};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};

fn format_message(message: &Message) -> String {
    let who = if message.is_user() { "나" } else { "봇" };
    format!("{}> {}", who, message.text)
}

/// Text to print for an engine event, if any. The user's own lines are
/// already on screen so they are not echoed.
fn render_event(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::ConversationReset { messages } => Some(
            messages
                .iter()
                .map(format_message)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ChatEvent::MessageAppended { message } if message.is_bot() => {
            Some(format_message(message))
        }
        ChatEvent::StateChanged {
            state: state @ ScreenState::Loading,
        } => Some(format!("[{}]", state.label())),
        _ => None,
    }
}

/// Run the chat over `input`/`out` until EOF or the report opens.
///
/// Input is ignored while a message is still being handled. Returns the
/// report payload if the screen navigated.
pub async fn run_line<R, W>(
    engine: Arc<ChatEngine>,
    mut reports: mpsc::UnboundedReceiver<Value>,
    input: R,
    out: &mut W,
) -> anyhow::Result<Option<Value>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut chat_rx = engine.subscribe();
    let mut lines = input.lines();

    if let Err(e) = engine.bootstrap().await {
        tracing::warn!(error = %e, "bootstrap failed");
    }

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<homelens_chat::Result<SendOutcome>>();
    let mut sending = false;

    let result = loop {
        tokio::select! {
            biased;

            payload = reports.recv() => {
                if let Some(payload) = payload {
                    break Ok(Some(payload));
                }
            }

            event = chat_rx.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(text) = render_event(&event) {
                            if let Err(e) = writeln!(out, "{}", text) {
                                break Err(e.into());
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "chat events lagged");
                    }
                    Err(RecvError::Closed) => break Ok(None),
                }
            }

            Some(outcome) = done_rx.recv() => {
                sending = false;
                tracing::debug!(?outcome, "send finished");
            }

            line = lines.next_line(), if !sending => {
                match line {
                    Ok(Some(text)) => {
                        if text.trim().is_empty() {
                            continue;
                        }
                        sending = true;
                        let engine = engine.clone();
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let _ = done_tx.send(engine.send(&text).await);
                        });
                    }
                    Ok(None) => break Ok(None),
                    Err(e) => break Err(e.into()),
                }
            }
        }
    };

    engine.teardown();
    result
}
