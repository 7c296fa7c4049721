use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{HarvestError, Result};
use crate::domain::{Author, Entry};
use crate::store::{Sink, Submission};

const SELECT_ENTRY: &str = "SELECT p.post_url, u.username, u.user_karma, u.user_cake_day, u.post_karma,
        u.comment_karma, p.post_date, p.number_of_comments, p.number_of_votes, p.post_category
     FROM posts p
     INNER JOIN users u ON u.username = p.user_name";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| HarvestError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            HarvestError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
        let author = Author {
            username: row.get(1)?,
            karma: row.get(2)?,
            cake_day: row.get(3)?,
            post_karma: row.get(4)?,
            comment_karma: row.get(5)?,
        };
        let published_at = row
            .get::<_, String>(6)
            .ok()
            .and_then(|s| Self::parse_datetime(&s))
            .unwrap_or_else(Utc::now);

        Ok(Entry::new(
            row.get::<_, String>(0)?,
            author,
            published_at,
            row.get(7)?,
            row.get(8)?,
            row.get::<_, String>(9)?,
        ))
    }

    /// Store an entry and refresh its author's snapshot.
    ///
    /// Returns `false` when an entry with the same id is already present.
    pub fn add_entry(&self, entry: &Entry) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let author = entry.author();
        tx.execute(
            "INSERT INTO users (username, user_karma, user_cake_day, post_karma, comment_karma)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(username) DO UPDATE SET
                user_karma = excluded.user_karma,
                user_cake_day = excluded.user_cake_day,
                post_karma = excluded.post_karma,
                comment_karma = excluded.comment_karma",
            params![
                author.username,
                author.karma,
                author.cake_day,
                author.post_karma,
                author.comment_karma
            ],
        )?;

        let inserted = tx.execute(
            "INSERT INTO posts (id, post_url, post_date, number_of_comments, number_of_votes,
                                post_category, user_name, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO NOTHING",
            params![
                entry.id(),
                entry.url(),
                entry.published_at().to_rfc3339(),
                entry.comments(),
                entry.votes(),
                entry.category(),
                author.username,
                Utc::now().to_rfc3339()
            ],
        )?;

        tx.commit()?;
        Ok(inserted > 0)
    }

    pub fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                &format!("{SELECT_ENTRY} WHERE p.id = ?1"),
                params![id],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(result)
    }

    /// All stored entries, newest publication first
    pub fn get_all_entries(&self) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} ORDER BY p.post_date DESC"))?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn delete_entry(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl Sink for SqliteStore {
    async fn submit(&self, entry: &Entry) -> Result<Submission> {
        match self.add_entry(entry) {
            Ok(true) => Ok(Submission::Accepted),
            Ok(false) => Ok(Submission::AlreadyExists),
            Err(e) => Err(HarvestError::SinkUnreachable(e.to_string())),
        }
    }
}
