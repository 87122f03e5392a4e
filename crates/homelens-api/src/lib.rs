//! homelens-api: chat backend client
//!
//! Wire types for `POST /api/chat` and a reqwest-based client behind the
//! [`ChatBackend`] trait, so the engine can be driven by a real server or a
//! test double.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatBackend, HttpChatBackend};
pub use error::{Error, Result};
pub use types::{ChatRequest, ChatResponse};
