//! User records. The API only needs enough to resolve a path's user id
//! and to register a new user at sign-up.

use super::{now_ms, Database};
use crate::types::User;
use anyhow::Result;
use rusqlite::{params, Row};
use uuid::Uuid;

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    /// Create a new user with a generated id.
    pub fn create_user(&self, name: &str) -> Result<User> {
        let user = User {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            created_at: now_ms(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![user.id, user.name, user.created_at],
            )?;
            Ok(())
        })?;

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

            match stmt.query_row(params![user_id], parse_user_row) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("alice").unwrap();

        let found = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(found.name, "alice");
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn get_unknown_user_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_user("nope").unwrap().is_none());
    }
}
