mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::UserRepository;
pub use types::User;
