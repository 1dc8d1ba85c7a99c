//! Background jobs for scheduled push notifications.
//!
//! - [`dispatcher`] sends every due pending notification once per tick.
//! - [`cleanup`] deletes records past the retention window.

pub mod cleanup;
pub mod config;
pub mod dispatcher;
