use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
            name        TEXT,
            bio         TEXT,
            profilePic  TEXT,
            userBanner  TEXT,
            following   INTEGER,
            followers   INTEGER,
            isVerified  INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS chirps (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user        INTEGER NOT NULL REFERENCES users(id),
            chirp       TEXT NOT NULL,
            parent      INTEGER REFERENCES chirps(id),
            timestamp   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chirps_user
            ON chirps(user, timestamp);

        CREATE INDEX IF NOT EXISTS idx_chirps_parent
            ON chirps(parent);

        CREATE TABLE IF NOT EXISTS likes (
            chirp_id    INTEGER NOT NULL REFERENCES chirps(id),
            user_id     INTEGER NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (chirp_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS rechirps (
            chirp_id    INTEGER NOT NULL REFERENCES chirps(id),
            user_id     INTEGER NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (chirp_id, user_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
