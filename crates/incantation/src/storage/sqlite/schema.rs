//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
///
/// `sub` is UNIQUE so concurrent first logins for one subject cannot both insert.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sub TEXT NOT NULL UNIQUE
);
"#;

pub const INSERT_USER: &str = r#"
INSERT INTO users (sub)
VALUES (?1)
"#;

pub const SELECT_USER_BY_SUB: &str = r#"
SELECT id, sub
FROM users
WHERE sub = ?1
"#;
