//! Functional core for incantation.
//!
//! Pure types, traits and functions shared by the auth shell and the server.
//! Nothing in this crate performs I/O.

#[cfg(feature = "auth")]
pub mod auth;
pub mod storage;
