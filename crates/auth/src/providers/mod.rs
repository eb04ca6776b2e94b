//! Identity provider implementations.
//!
//! This module contains implementations of `IdentityProviderClient` for:
//! - Google
//! - A scripted mock (with `mock` feature or in tests)

mod google;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use google::GoogleProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
