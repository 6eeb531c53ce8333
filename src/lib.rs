pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod render;
pub mod ui;

pub use error::{ChatError, ChatResult};
pub use ui::{ChatClient, ClientOptions};
