// varco-api: Async Rust client for the BFT u-Control cloud gate API

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod retry;
pub mod transport;
pub mod users;

pub use auth::{AccessToken, Credentials};
pub use client::CloudClient;
pub use dispatch::{Action, CommandAck, TelemetrySnapshot};
pub use error::{Error, FailureClass};
pub use retry::{Retry, RetryPolicy};
pub use transport::TransportConfig;
pub use users::Automation;
