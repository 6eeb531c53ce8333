pub mod commands;
pub mod events;
pub mod types;

pub use commands::SocketCommand;
pub use events::SocketEvent;
pub use types::{HistoryEntry, IncomingChatMessage, OutgoingChatMessage};
