pub mod client;
pub mod endpoint;
pub mod transport;

pub use client::ChatSocket;
pub use endpoint::chat_endpoint;
