//! Chat module

pub mod reply;
pub mod session;

pub use reply::{classify, MessageBody, TableRow, UNKNOWN_REPLY};
pub use session::{render_body, ChatSession, ConversationEntry, QueryBackend, Sender};
