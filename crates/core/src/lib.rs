//! Domain types shared by the reminder API, worker, and database layers.
//!
//! This crate has zero internal dependencies so it can be used by every
//! other workspace member.

pub mod error;
pub mod scheduling;
pub mod types;
