pub mod app;
pub mod client;
pub mod components;
pub mod state;

pub use app::ChatApp;
pub use client::{ChatClient, ClientOptions};
pub use state::AppState;
