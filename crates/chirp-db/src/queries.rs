use crate::models::{ChirpRow, NewUser, ToggleOutcome, UserRow};
use crate::Database;
use anyhow::Result;
use chirp_types::api::InteractAction;
use rusqlite::Connection;

const USER_COLUMNS: &str =
    "id, username, name, bio, profilePic, userBanner, following, followers, isVerified";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, name, bio, profilePic, userBanner, isVerified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.username,
                    user.name,
                    user.bio,
                    user.profile_pic,
                    user.user_banner,
                    user.is_verified,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Case-insensitive lookup, matching how usernames appear in profile links.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Chirps --

    pub fn insert_chirp(
        &self,
        author_id: i64,
        text: &str,
        parent: Option<i64>,
        timestamp: i64,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chirps (user, chirp, parent, timestamp) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![author_id, text, parent, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn chirp_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM chirps WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// One page of a user's top-level chirps, newest first. Viewer flags are
    /// computed against `viewer_id`; `None` (guest) yields false for both.
    pub fn get_user_chirps(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ChirpRow>> {
        self.with_conn(|conn| query_user_chirps(conn, user_id, viewer_id, limit, offset))
    }

    // -- Interactions --

    /// Toggle a like or rechirp: removes the row if present, inserts it if not.
    /// The returned count is read in the same transaction as the write.
    pub fn toggle_interaction(
        &self,
        action: InteractAction,
        chirp_id: i64,
        user_id: i64,
    ) -> Result<ToggleOutcome> {
        let table = interaction_table(action);

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let removed = tx.execute(
                &format!("DELETE FROM {table} WHERE chirp_id = ?1 AND user_id = ?2"),
                [chirp_id, user_id],
            )?;

            let active = if removed == 0 {
                tx.execute(
                    &format!("INSERT INTO {table} (chirp_id, user_id) VALUES (?1, ?2)"),
                    [chirp_id, user_id],
                )?;
                true
            } else {
                false
            };

            let count: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE chirp_id = ?1"),
                [chirp_id],
                |row| row.get(0),
            )?;

            tx.commit()?;
            Ok(ToggleOutcome { active, count })
        })
    }
}

fn interaction_table(action: InteractAction) -> &'static str {
    match action {
        InteractAction::Like => "likes",
        InteractAction::Rechirp => "rechirps",
    }
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        bio: row.get(3)?,
        profile_pic: row.get(4)?,
        user_banner: row.get(5)?,
        following: row.get(6)?,
        followers: row.get(7)?,
        is_verified: row.get(8)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER(?1)"
    ))?;

    let row = stmt.query_row([username], map_user).optional()?;
    Ok(row)
}

fn query_user_chirps(
    conn: &Connection,
    user_id: i64,
    viewer_id: Option<i64>,
    limit: u32,
    offset: u32,
) -> Result<Vec<ChirpRow>> {
    // Counts and viewer flags as correlated subqueries so one page is one query.
    let mut stmt = conn.prepare(
        "SELECT c.id, u.name, u.username, u.profilePic, COALESCE(u.isVerified, 0),
                c.chirp, c.timestamp,
                (SELECT COUNT(*) FROM chirps r WHERE r.parent = c.id),
                (SELECT COUNT(*) FROM rechirps rc WHERE rc.chirp_id = c.id),
                (SELECT COUNT(*) FROM likes l WHERE l.chirp_id = c.id),
                EXISTS(SELECT 1 FROM likes l WHERE l.chirp_id = c.id AND l.user_id = ?2),
                EXISTS(SELECT 1 FROM rechirps rc WHERE rc.chirp_id = c.id AND rc.user_id = ?2)
         FROM chirps c
         LEFT JOIN users u ON c.user = u.id
         WHERE c.user = ?1 AND c.parent IS NULL
         ORDER BY c.timestamp DESC, c.id DESC
         LIMIT ?3 OFFSET ?4",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![user_id, viewer_id, limit, offset], |row| {
            Ok(ChirpRow {
                id: row.get(0)?,
                author_name: row.get(1)?,
                author_username: row.get(2)?,
                author_profile_pic: row.get(3)?,
                author_verified: row.get(4)?,
                chirp: row.get(5)?,
                timestamp: row.get(6)?,
                reply_count: row.get(7)?,
                rechirp_count: row.get(8)?,
                like_count: row.get(9)?,
                liked_by_viewer: row.get(10)?,
                rechirped_by_viewer: row.get(11)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let author = db
            .create_user(&NewUser {
                username: "Ada",
                name: Some("Ada Lovelace"),
                is_verified: true,
                ..Default::default()
            })
            .unwrap();
        let viewer = db
            .create_user(&NewUser {
                username: "grace",
                ..Default::default()
            })
            .unwrap();
        (db, author, viewer)
    }

    #[test]
    fn username_lookup_ignores_case() {
        let (db, author, _) = seeded();

        let row = db.get_user_by_username("aDA").unwrap().unwrap();
        assert_eq!(row.id, author);
        assert_eq!(row.username, "Ada");
        assert!(row.is_verified);
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn chirps_page_newest_first_and_skips_replies() {
        let (db, author, viewer) = seeded();

        for ts in 0..15 {
            db.insert_chirp(author, &format!("chirp {ts}"), None, 1_000 + ts).unwrap();
        }
        let newest = db.insert_chirp(author, "newest", None, 5_000).unwrap();
        db.insert_chirp(viewer, "a reply", Some(newest), 5_001).unwrap();
        db.insert_chirp(author, "own reply", Some(newest), 5_002).unwrap();

        let first = db.get_user_chirps(author, None, 12, 0).unwrap();
        assert_eq!(first.len(), 12);
        assert_eq!(first[0].id, newest);
        assert_eq!(first[0].reply_count, 2);
        assert_eq!(first[0].author_username.as_deref(), Some("Ada"));
        assert!(first[0].author_verified);

        let second = db.get_user_chirps(author, None, 12, 12).unwrap();
        assert_eq!(second.len(), 4);
        assert!(second.iter().all(|c| c.chirp.starts_with("chirp ")));

        let third = db.get_user_chirps(author, None, 12, 24).unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn toggle_flips_state_and_count() {
        let (db, author, viewer) = seeded();
        let chirp = db.insert_chirp(author, "hello", None, 1).unwrap();

        let on = db.toggle_interaction(InteractAction::Like, chirp, viewer).unwrap();
        assert_eq!(on, ToggleOutcome { active: true, count: 1 });

        let other = db.toggle_interaction(InteractAction::Like, chirp, author).unwrap();
        assert_eq!(other, ToggleOutcome { active: true, count: 2 });

        let off = db.toggle_interaction(InteractAction::Like, chirp, viewer).unwrap();
        assert_eq!(off, ToggleOutcome { active: false, count: 1 });

        // Rechirps are tracked separately from likes.
        let rechirp = db.toggle_interaction(InteractAction::Rechirp, chirp, viewer).unwrap();
        assert_eq!(rechirp, ToggleOutcome { active: true, count: 1 });
    }

    #[test]
    fn viewer_flags_follow_viewer() {
        let (db, author, viewer) = seeded();
        let chirp = db.insert_chirp(author, "hello", None, 1).unwrap();
        db.toggle_interaction(InteractAction::Rechirp, chirp, viewer).unwrap();

        let as_viewer = db.get_user_chirps(author, Some(viewer), 12, 0).unwrap();
        assert!(as_viewer[0].rechirped_by_viewer);
        assert!(!as_viewer[0].liked_by_viewer);
        assert_eq!(as_viewer[0].rechirp_count, 1);

        let as_guest = db.get_user_chirps(author, None, 12, 0).unwrap();
        assert!(!as_guest[0].rechirped_by_viewer);
    }

    #[test]
    fn chirp_exists_checks_ids() {
        let (db, author, _) = seeded();
        let chirp = db.insert_chirp(author, "hello", None, 1).unwrap();
        assert!(db.chirp_exists(chirp).unwrap());
        assert!(!db.chirp_exists(chirp + 100).unwrap());
    }
}
