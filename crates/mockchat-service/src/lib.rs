//! Mockchat service: authentication, sessions and the server tree that holds
//! the channels, plus runtime network configuration and a small command
//! prompt.

pub mod auth;
pub mod commander;
pub mod config;
pub mod error;
pub mod icon;
pub mod server;
pub mod service;
pub mod session;
pub mod state;

pub use auth::{AuthEntry, Authenticator};
pub use commander::Commander;
pub use config::Configurator;
pub use error::ServiceError;
pub use icon::StaticIcon;
pub use server::Server;
pub use service::Service;
pub use session::Session;
pub use state::{SessionState, SharedState};
