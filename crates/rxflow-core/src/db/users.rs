//! User reference-data operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Role, User};

impl Database {
    /// Insert or update a user.
    pub fn upsert_user(&self, user: &User) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, name, email, role, nic, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                role = excluded.role,
                nic = excluded.nic
            "#,
            params![
                user.id,
                user.name,
                user.email,
                role_to_string(&user.role),
                user.nic,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, email, role, nic, created_at FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        role: row.get(3)?,
                        nic: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Count all users (dashboard report).
    pub fn count_users(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    nic: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: string_to_role(&row.role)?,
            nic: row.nic,
            created_at: row.created_at,
        })
    }
}

fn role_to_string(role: &Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

fn string_to_role(s: &str) -> Result<Role, DbError> {
    match s {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        _ => Err(DbError::Constraint(format!("Unknown role: {}", s))),
    }
}
