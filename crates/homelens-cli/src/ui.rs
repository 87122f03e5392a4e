//! TUI implementation for homelens

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{EventStream, MouseEventKind};
use futures::StreamExt;
use homelens_chat::{ChatEngine, ChatEvent, FALLBACK_ERROR, Message, ScreenState, SendOutcome};
use homelens_tui::{
    TerminalGuard, Theme,
    input::{Action, event_to_action},
    widgets::{ChatBubble, InputBox, MessageList, Spinner, message_list},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use serde_json::Value;
use tokio::sync::{broadcast::error::RecvError, mpsc};

const TITLE: &str = "내 부동산 유형 분석하기";
const PLACEHOLDER: &str = "메시지를 입력해주세요.";
const SEND_LABEL: &str = "전송";
const BOOTSTRAP_TEXT: &str = "로딩 중...";
const REPORT_LOADING_TEXT: &str = "분석 결과를 불러오는 중...";
const REPLY_WAIT_TEXT: &str = "답변을 기다리는 중...";

/// Background work reporting back to the loop
enum TaskDone {
    Bootstrap,
    Send(homelens_chat::Result<SendOutcome>),
}

/// TUI application state
pub struct TuiState {
    bubbles: Vec<ChatBubble>,
    input: InputBox,
    /// First visible line of the conversation
    scroll: usize,
    /// Stick to the newest message
    follow: bool,
    /// Height of the message area at the last render
    page: usize,
    screen: ScreenState,
    bootstrapped: bool,
    sending: bool,
    theme: Theme,
    spinner_start: Instant,
}

impl TuiState {
    pub fn new(theme: Theme) -> Self {
        let input = InputBox::new()
            .with_placeholder(PLACEHOLDER)
            .with_button_label(SEND_LABEL);
        Self {
            bubbles: vec![ChatBubble::bot(BOOTSTRAP_TEXT)],
            input,
            scroll: 0,
            follow: true,
            page: 10,
            screen: ScreenState::Idle,
            bootstrapped: false,
            sending: false,
            theme,
            spinner_start: Instant::now(),
        }
    }

    fn bubble_for(message: &Message) -> ChatBubble {
        if message.is_user() {
            ChatBubble::user(&message.text)
        } else if message.text == FALLBACK_ERROR {
            ChatBubble::error(&message.text)
        } else {
            ChatBubble::bot(&message.text)
        }
    }

    fn replace_messages(&mut self, messages: &[Message]) {
        self.bubbles = messages.iter().map(Self::bubble_for).collect();
        self.follow = true;
    }

    /// Apply an engine event
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        if event.touches_conversation() {
            self.follow = true;
        }
        match event {
            ChatEvent::ConversationReset { messages } => {
                self.bootstrapped = true;
                self.replace_messages(&messages);
            }
            ChatEvent::MessageAppended { message } => {
                self.bubbles.push(Self::bubble_for(&message));
            }
            ChatEvent::StateChanged { state } => {
                if state.is_working() && !self.screen.is_working() {
                    self.spinner_start = Instant::now();
                }
                self.screen = state;
            }
        }
    }

    /// Rebuild from the engine after missing events
    fn resync(&mut self, engine: &ChatEngine) {
        let messages = engine.messages();
        if !messages.is_empty() {
            self.bootstrapped = true;
            self.replace_messages(&messages);
        }
        self.screen = engine.state();
    }

    fn finish_bootstrap(&mut self, engine: &ChatEngine) {
        if !self.bootstrapped {
            // Nothing was shown, e.g. no session: drop the placeholder
            self.bootstrapped = true;
            self.replace_messages(&engine.messages());
        }
    }

    fn can_send(&self) -> bool {
        self.bootstrapped && !self.sending && !self.screen.is_terminal()
    }

    /// Handle an editing or navigation action. Returns the text to send on
    /// submit.
    pub fn handle_action(&mut self, action: Action) -> Option<String> {
        match action {
            Action::Submit => {
                if !self.can_send() || self.input.content().trim().is_empty() {
                    return None;
                }
                self.sending = true;
                Some(self.input.take())
            }
            Action::PageUp => {
                self.follow = false;
                self.scroll = self.scroll.saturating_sub(self.page.max(1));
                None
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(self.page.max(1));
                None
            }
            other => {
                self.input.handle_action(&other);
                None
            }
        }
    }

    fn scroll_by(&mut self, lines: isize) {
        if lines < 0 {
            self.follow = false;
            self.scroll = self.scroll.saturating_sub(lines.unsigned_abs());
        } else {
            self.scroll = self.scroll.saturating_add(lines as usize);
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(frame.area());

        let title = Paragraph::new(Line::from(Span::styled(TITLE, self.theme.accent_bold())))
            .centered()
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(self.theme.border_style()),
            );
        frame.render_widget(title, chunks[0]);

        self.render_messages(frame, chunks[1]);
        self.render_status(frame, chunks[2]);

        self.input.set_focused(self.can_send());
        self.input
            .render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;
        let height = area.height as usize;
        self.page = height;

        let bottom = message_list::bottom_scroll(&self.bubbles, width, height);
        if self.follow || self.scroll >= bottom {
            self.scroll = bottom;
            self.follow = true;
        }

        frame.render_widget(
            MessageList::new(&self.bubbles, &self.theme).scroll(self.scroll),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let label = match self.screen {
            ScreenState::AwaitingReply => Some(REPLY_WAIT_TEXT),
            ScreenState::Loading => Some(REPORT_LOADING_TEXT),
            _ => None,
        };
        if let Some(label) = label {
            frame.render_widget(
                Spinner::new(label, &self.theme).with_start_time(self.spinner_start),
                area,
            );
        }
    }
}

/// Run the chat screen until the user quits or the report opens.
///
/// Returns the report payload if the screen navigated.
pub async fn run_tui(
    engine: Arc<ChatEngine>,
    mut reports: mpsc::UnboundedReceiver<Value>,
    theme: Theme,
) -> anyhow::Result<Option<Value>> {
    let mut guard = TerminalGuard::enter()?;
    let mut state = TuiState::new(theme);
    let mut chat_rx = engine.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<TaskDone>();
    {
        let engine = engine.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.bootstrap().await {
                tracing::warn!(error = %e, "bootstrap failed");
            }
            let _ = done_tx.send(TaskDone::Bootstrap);
        });
    }

    let result = loop {
        if let Err(e) = guard.terminal().draw(|frame| state.render(frame)) {
            break Err(e.into());
        }

        tokio::select! {
            biased;

            payload = reports.recv() => {
                if let Some(payload) = payload {
                    break Ok(Some(payload));
                }
            }

            event = chat_rx.recv() => {
                match event {
                    Ok(event) => state.handle_chat_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "chat events lagged, resyncing");
                        state.resync(&engine);
                    }
                    Err(RecvError::Closed) => break Ok(None),
                }
            }

            done = done_rx.recv() => {
                match done {
                    Some(TaskDone::Bootstrap) => state.finish_bootstrap(&engine),
                    Some(TaskDone::Send(outcome)) => {
                        state.sending = false;
                        match outcome {
                            Ok(outcome) => tracing::debug!(?outcome, "send finished"),
                            Err(e) => tracing::warn!(error = %e, "send refused"),
                        }
                    }
                    None => {}
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(crossterm::event::Event::Mouse(mouse))) => match mouse.kind {
                        MouseEventKind::ScrollUp => state.scroll_by(-3),
                        MouseEventKind::ScrollDown => state.scroll_by(3),
                        _ => {}
                    },
                    Some(Ok(event)) => {
                        let Some(action) = event_to_action(event) else {
                            continue;
                        };
                        if action == Action::Quit {
                            break Ok(None);
                        }
                        if let Some(text) = state.handle_action(action) {
                            let engine = engine.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let outcome = engine.send(&text).await;
                                let _ = done_tx.send(TaskDone::Send(outcome));
                            });
                        }
                    }
                    Some(Err(e)) => break Err(anyhow::anyhow!("Event error: {}", e)),
                    None => break Ok(None),
                }
            }

            _ = tick_interval.tick() => {}
        }
    };

    if engine.is_busy() {
        tracing::info!("leaving the chat screen with a reply still in progress");
    }
    engine.teardown();
    drop(guard);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelens_chat::Sender;

    fn message(id: u64, text: &str, sender: Sender) -> Message {
        Message {
            id,
            text: text.to_string(),
            sender,
        }
    }

    fn typed(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c));
        }
    }

    #[test]
    fn test_placeholder_until_bootstrap() {
        let mut state = TuiState::new(Theme::default());
        assert_eq!(state.bubbles.len(), 1);
        assert_eq!(state.bubbles[0].text, BOOTSTRAP_TEXT);

        state.handle_chat_event(ChatEvent::ConversationReset {
            messages: vec![message(1, "반갑습니다!", Sender::Bot)],
        });
        assert_eq!(state.bubbles.len(), 1);
        assert_eq!(state.bubbles[0].text, "반갑습니다!");
    }

    #[test]
    fn test_submit_blocked_before_bootstrap() {
        let mut state = TuiState::new(Theme::default());
        typed(&mut state, "hello");
        assert_eq!(state.handle_action(Action::Submit), None);
    }

    #[test]
    fn test_submit_clears_input_and_blocks_until_done() {
        let mut state = TuiState::new(Theme::default());
        state.bootstrapped = true;
        typed(&mut state, "전세 vs 매매");
        assert_eq!(state.handle_action(Action::Submit).as_deref(), Some("전세 vs 매매"));
        assert!(state.input.is_empty());

        typed(&mut state, "again");
        assert_eq!(state.handle_action(Action::Submit), None);
    }

    #[test]
    fn test_blank_submit_ignored() {
        let mut state = TuiState::new(Theme::default());
        state.bootstrapped = true;
        typed(&mut state, "   ");
        assert_eq!(state.handle_action(Action::Submit), None);
        assert!(!state.sending);
    }

    #[test]
    fn test_fallback_error_renders_as_error() {
        let mut state = TuiState::new(Theme::default());
        state.handle_chat_event(ChatEvent::MessageAppended {
            message: message(2, FALLBACK_ERROR, Sender::Bot),
        });
        assert!(state.bubbles.last().unwrap().is_error);
    }

    #[test]
    fn test_page_up_stops_following() {
        let mut state = TuiState::new(Theme::default());
        state.scroll = 30;
        state.handle_action(Action::PageUp);
        assert!(!state.follow);
        assert_eq!(state.scroll, 20);

        state.handle_chat_event(ChatEvent::MessageAppended {
            message: message(3, "new", Sender::Bot),
        });
        assert!(state.follow);
    }

    #[test]
    fn test_no_send_after_navigation() {
        let mut state = TuiState::new(Theme::default());
        state.bootstrapped = true;
        state.handle_chat_event(ChatEvent::StateChanged {
            state: ScreenState::Navigated,
        });
        typed(&mut state, "hi");
        assert_eq!(state.handle_action(Action::Submit), None);
    }
}
