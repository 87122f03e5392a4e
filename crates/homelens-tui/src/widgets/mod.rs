//! Custom widgets for the chat screen

pub mod input_box;
pub mod message_list;
pub mod spinner;

pub use input_box::InputBox;
pub use message_list::{ChatBubble, MessageList, Speaker};
pub use spinner::Spinner;
