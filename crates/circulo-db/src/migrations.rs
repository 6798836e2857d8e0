use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS usuarios (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            nome        TEXT NOT NULL,
            nick        TEXT NOT NULL UNIQUE COLLATE NOCASE,
            email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
            senha       TEXT NOT NULL,
            criado_em   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Edge list: usuario_id is followed by seguidor_id.
        -- No unique constraint and no foreign keys; duplicate edges are
        -- rejected by the application and deleting a user leaves its edges.
        CREATE TABLE IF NOT EXISTS seguidores (
            usuario_id  INTEGER NOT NULL,
            seguidor_id INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_seguidores_usuario
            ON seguidores(usuario_id, seguidor_id);

        CREATE INDEX IF NOT EXISTS idx_seguidores_seguidor
            ON seguidores(seguidor_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('usuarios', 'seguidores')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
