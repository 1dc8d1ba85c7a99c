//! Push delivery through Firebase Cloud Messaging.
//!
//! - [`message`] builds the FCM v1 message for a scheduled notification.
//! - [`auth`] provides OAuth access tokens for the FCM API (service account or static).
//! - [`client`] defines the [`PushSender`] trait and its HTTP implementation.

pub mod auth;
pub mod client;
pub mod error;
pub mod message;

pub use auth::{ServiceAccountKey, TokenSource};
pub use client::{FcmClient, FcmConfig, PushSender};
pub use error::PushError;
pub use message::{build_message, PushMessage};
