//! SQLite-backed repository for deduplicated news articles.
//!
//! The database file is shared with unrelated parts of the host
//! application, so every operation opens and closes its own connection and
//! no transaction ever spans a network call.

use anyhow::Result;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{Article, Window};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub struct NewsStore {
    db_path: PathBuf,
}

impl NewsStore {
    /// Open (creating if needed) the store at the given database path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self { db_path };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS news_items (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                hash         TEXT NOT NULL UNIQUE,
                title        TEXT NOT NULL,
                description  TEXT,
                source       TEXT,
                published_at TEXT,
                url          TEXT,
                window       TEXT,
                region       TEXT,
                topic        TEXT,
                fetched_at   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_news_published ON news_items (published_at);
            CREATE INDEX IF NOT EXISTS idx_news_source ON news_items (source);
            CREATE INDEX IF NOT EXISTS idx_news_window ON news_items (window);
            CREATE INDEX IF NOT EXISTS idx_news_region ON news_items (region);
            CREATE INDEX IF NOT EXISTS idx_news_topic ON news_items (topic);",
        )?;
        Ok(())
    }

    /// Idempotent bulk insert: rows whose hash already exists are ignored,
    /// never replaced. Returns the number of rows actually inserted.
    pub fn store(&self, articles: &[Article]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connect()?;
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO news_items
                     (hash, title, description, source, published_at, url, window,
                      region, topic, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for art in articles {
                inserted += stmt.execute(params![
                    art.hash,
                    art.title,
                    art.description,
                    art.source,
                    art.published_at,
                    art.url,
                    art.window.label(),
                    art.region,
                    art.topic,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Stored articles - offered={}, inserted={}", articles.len(), inserted);
        Ok(inserted)
    }

    /// Stored articles for a given window, newest first.
    pub fn by_window(&self, window: Window, limit: usize) -> Result<Vec<Article>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT hash, title, description, source, published_at, url, window,
                    region, topic, fetched_at
             FROM news_items
             WHERE window = ?1
             ORDER BY published_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![window.label(), limit as i64], row_to_article)?;
        collect_rows(rows)
    }

    /// Articles published within the last `hours`, newest first.
    pub fn since(&self, hours: i64, limit: usize) -> Result<Vec<Article>> {
        let cutoff = (Utc::now() - Duration::hours(hours))
            .format(ISO_FORMAT)
            .to_string();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT hash, title, description, source, published_at, url, window,
                    region, topic, fetched_at
             FROM news_items
             WHERE published_at >= ?1
             ORDER BY published_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![cutoff, limit as i64], row_to_article)?;
        collect_rows(rows)
    }

    /// Articles published between `days_from` and `days_to` ago (0 = now),
    /// newest first.
    pub fn in_range(&self, days_from: i64, days_to: i64, limit: usize) -> Result<Vec<Article>> {
        let now = Utc::now();
        let start = (now - Duration::days(days_from)).format(ISO_FORMAT).to_string();
        let end = (now - Duration::days(days_to)).format(ISO_FORMAT).to_string();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT hash, title, description, source, published_at, url, window,
                    region, topic, fetched_at
             FROM news_items
             WHERE published_at >= ?1 AND published_at <= ?2
             ORDER BY published_at DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![start, end, limit as i64], row_to_article)?;
        collect_rows(rows)
    }

    /// Delete rows older than `days`. Returns the number of rows purged.
    pub fn cleanup(&self, days: i64) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(days))
            .format(ISO_FORMAT)
            .to_string();
        let conn = self.connect()?;
        let purged = conn.execute("DELETE FROM news_items WHERE published_at < ?1", params![cutoff])?;
        if purged > 0 {
            debug!("Purged {} articles older than {} days", purged, days);
        }
        Ok(purged)
    }
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    let window: String = row.get(6)?;
    Ok(Article {
        hash: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        source: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        published_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        window: Window::parse(&window).unwrap_or(Window::H24),
        region: row.get::<_, Option<String>>(7)?.filter(|s| !s.is_empty()),
        topic: row.get::<_, Option<String>>(8)?.filter(|s| !s.is_empty()),
        fetched_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<Article>>,
) -> Result<Vec<Article>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
