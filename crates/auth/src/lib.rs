//! Google OAuth2 login for incantation.
//!
//! This crate provides:
//! - The authorization-code flow against Google, with PKCE
//! - Server-side sessions (in-memory, or SQLite via the `sqlite` feature)
//! - Find-or-create resolution of provider subjects to local users
//! - Axum routes and extractors

mod config;
mod directory;
mod error;
mod extractors;
mod handlers;
mod providers;
mod sessions;
mod state;

#[cfg(test)]
mod testing;

pub use config::{AuthConfig, ProviderConfig};
pub use directory::UserDirectory;
pub use error::AuthError;
pub use extractors::CurrentSession;
pub use handlers::{auth_routes, LOGIN_STATE_COOKIE};
pub use providers::GoogleProvider;
#[cfg(any(test, feature = "mock"))]
pub use providers::MockProvider;
#[cfg(feature = "sqlite")]
pub use sessions::SqliteSessionStore;
pub use sessions::{MemorySessionStore, SessionManager};
pub use state::AuthState;
