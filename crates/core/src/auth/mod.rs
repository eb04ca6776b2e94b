mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, generate_session_id, generate_state, is_pending_login_expired,
    is_session_expired, is_well_formed_session_id, PENDING_LOGIN_TTL_SECS, SESSION_ID_LEN,
};
pub use traits::{IdentityProviderClient, Result, SessionRepository};
pub use types::{
    AccessToken, PendingLogin, ProviderProfile, Session, SessionAttributes, SessionId, SUB_ATTRIBUTE,
};
pub use validation::validate_return_to;
