use crate::Database;
use crate::models::{CredentialRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::debug;

/// Follow-graph rule violations, kept apart from plain store failures so the
/// HTTP layer can tell a user mistake from a broken database.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("um usuário não pode seguir ele mesmo")]
    SelfFollow,
    #[error("você já segue o usuário informado")]
    AlreadyFollowing,
    #[error("você não segue este usuário")]
    NotFollowing,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Profile writes that collide with another user's nick or email.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("já existe um usuário com este nick ou e-mail")]
    IdentityTaken,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl Database {
    // -- Users --

    /// Insert a user whose password is already hashed. Returns the new id.
    ///
    /// The nick/email check and the insert share one connection lock; the
    /// `UNIQUE` columns catch any writer outside this process.
    pub fn create_user(
        &self,
        name: &str,
        nick: &str,
        email: &str,
        password_hash: &str,
    ) -> std::result::Result<u64, UserError> {
        let id = self.with_conn(|conn| {
            if identity_in_use(conn, nick, email, None)? {
                return Ok(None);
            }
            let inserted = conn.execute(
                "INSERT INTO usuarios (nome, nick, email, senha) VALUES (?1, ?2, ?3, ?4)",
                (name, nick, email, password_hash),
            );
            if unique_violation(inserted)?.is_none() {
                return Ok(None);
            }
            Ok(Some(u64::try_from(conn.last_insert_rowid())?))
        })?;

        id.ok_or(UserError::IdentityTaken)
    }

    pub fn get_user_by_id(&self, id: u64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Case-insensitive substring match on name or nick. Empty filter lists everyone.
    pub fn search_users(&self, filter: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let pattern = like_pattern(filter);
            let mut stmt = conn.prepare(
                "SELECT id, nome, nick, email, criado_em FROM usuarios
                 WHERE unicode_lower(nome) LIKE ?1 ESCAPE '\\' OR unicode_lower(nick) LIKE ?1 ESCAPE '\\'",
            )?;

            let rows = stmt
                .query_map([&pattern], |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        nick: row.get(2)?,
                        email: Some(row.get(3)?),
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Overwrite the profile fields. Returns false if no such user exists.
    /// The stored password hash is never touched here.
    pub fn update_user(
        &self,
        id: u64,
        name: &str,
        nick: &str,
        email: &str,
    ) -> std::result::Result<bool, UserError> {
        let changed = self.with_conn(|conn| {
            if identity_in_use(conn, nick, email, Some(id))? {
                return Ok(None);
            }
            let updated = conn.execute(
                "UPDATE usuarios SET nome = ?1, nick = ?2, email = ?3 WHERE id = ?4",
                params![name, nick, email, id],
            );
            unique_violation(updated)
        })?;

        changed.map(|n| n > 0).ok_or(UserError::IdentityTaken)
    }

    /// Remove the user row. Follow edges pointing at or from it are left alone.
    pub fn delete_user(&self, id: u64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM usuarios WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Credentials --

    pub fn get_credentials_by_email(&self, email: &str) -> Result<Option<CredentialRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, senha FROM usuarios WHERE email = ?1",
                [email],
                |row| {
                    Ok(CredentialRow {
                        id: row.get(0)?,
                        password: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn get_password_hash(&self, id: u64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT senha FROM usuarios WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    /// Replace the stored hash in a single statement. Returns false if no such user exists.
    pub fn set_password_hash(&self, id: u64, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE usuarios SET senha = ?1 WHERE id = ?2",
                params![password_hash, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Followers --

    /// Record that `follower_id` follows `target_id`.
    ///
    /// The existence check and the insert share one connection lock, so two
    /// requests in this process cannot both pass the check. There is no
    /// unique index backing this.
    pub fn follow(&self, follower_id: u64, target_id: u64) -> std::result::Result<(), GraphError> {
        if follower_id == target_id {
            return Err(GraphError::SelfFollow);
        }

        let inserted = self.with_conn(|conn| {
            if edge_exists(conn, follower_id, target_id)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO seguidores (usuario_id, seguidor_id) VALUES (?1, ?2)",
                params![target_id, follower_id],
            )?;
            Ok(true)
        })?;

        if !inserted {
            return Err(GraphError::AlreadyFollowing);
        }
        debug!("user {} now follows {}", follower_id, target_id);
        Ok(())
    }

    /// Remove the `follower_id` → `target_id` edge. A missing edge is an error.
    pub fn unfollow(&self, follower_id: u64, target_id: u64) -> std::result::Result<(), GraphError> {
        let deleted = self.with_conn(|conn| {
            if !edge_exists(conn, follower_id, target_id)? {
                return Ok(false);
            }
            conn.execute(
                "DELETE FROM seguidores WHERE usuario_id = ?1 AND seguidor_id = ?2",
                params![target_id, follower_id],
            )?;
            Ok(true)
        })?;

        if !deleted {
            return Err(GraphError::NotFollowing);
        }
        debug!("user {} unfollowed {}", follower_id, target_id);
        Ok(())
    }

    pub fn is_following(&self, follower_id: u64, target_id: u64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, follower_id, target_id))
    }

    /// Users who follow `target_id`.
    pub fn get_followers(&self, target_id: u64, filter: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_edge_users(
                conn,
                "SELECT u.id, u.nome, u.nick, u.criado_em FROM seguidores s
                 INNER JOIN usuarios u ON s.seguidor_id = u.id
                 WHERE s.usuario_id = ?1
                 AND (unicode_lower(u.nome) LIKE ?2 ESCAPE '\\' OR unicode_lower(u.nick) LIKE ?2 ESCAPE '\\')",
                target_id,
                filter,
            )
        })
    }

    /// Users that `follower_id` follows.
    pub fn get_following(&self, follower_id: u64, filter: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_edge_users(
                conn,
                "SELECT u.id, u.nome, u.nick, u.criado_em FROM seguidores s
                 INNER JOIN usuarios u ON s.usuario_id = u.id
                 WHERE s.seguidor_id = ?1
                 AND (unicode_lower(u.nome) LIKE ?2 ESCAPE '\\' OR unicode_lower(u.nick) LIKE ?2 ESCAPE '\\')",
                follower_id,
                filter,
            )
        })
    }
}

fn query_user_by_id(conn: &Connection, id: u64) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, nome, nick, email, criado_em FROM usuarios WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                nick: row.get(2)?,
                email: Some(row.get(3)?),
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// True if another user (any user when `except` is `None`) already has this
/// nick or email. Both columns compare case-insensitively.
fn identity_in_use(conn: &Connection, nick: &str, email: &str, except: Option<u64>) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(1) FROM usuarios WHERE (nick = ?1 OR email = ?2) AND id IS NOT ?3",
        params![nick, email, except],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Turn a `UNIQUE` constraint failure into `None`.
fn unique_violation(result: rusqlite::Result<usize>) -> Result<Option<usize>> {
    match result {
        Ok(changed) => Ok(Some(changed)),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn edge_exists(conn: &Connection, follower_id: u64, target_id: u64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(1) FROM seguidores WHERE usuario_id = ?1 AND seguidor_id = ?2",
        params![target_id, follower_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn query_edge_users(conn: &Connection, sql: &str, id: u64, filter: &str) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params![id, like_pattern(filter)], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                nick: row.get(2)?,
                email: None,
                created_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Lowercase `filter`, escape LIKE wildcards and wrap it in `%...%`.
fn like_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
