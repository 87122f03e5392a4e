//! homelens-chat: chat interaction engine
//!
//! Owns the conversation shown on the chat screen, exchanges messages with
//! the analysis backend, reveals multi-part replies at a fixed cadence and
//! hands off to the report view once a reply says the analysis is ready.

pub mod deferred;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod events;
pub mod message;
pub mod report;
pub mod reveal;
pub mod session;
pub mod state;
pub mod store;

pub use dispatcher::{MessageDispatcher, RawReply};
pub use engine::{ChatEngine, EngineConfig, FALLBACK_ERROR, FALLBACK_GREETING, SendOutcome};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use message::{Message, Sender};
pub use report::{Navigator, ReportConfig, ReportTrigger};
pub use reveal::{RevealConfig, StagedRevealer, split_reply};
pub use session::SessionContext;
pub use state::ScreenState;
pub use store::ConversationStore;
