use serde::{Deserialize, Serialize};

/// A locally known user, identified by the provider's subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub sub: String,
}
