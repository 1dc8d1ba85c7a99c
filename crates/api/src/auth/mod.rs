//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation for tooling/tests).

pub mod jwt;
