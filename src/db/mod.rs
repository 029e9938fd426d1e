mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;

pub type StoreResult<T> = Result<T, StoreError>;

const ARTICLE_COLUMNS: &str = "id, title, link, saved, notes, created_at";
const NOTE_COLUMNS: &str = "id, body, article_id, created_at";

/// Shared handle to the article/note store.
///
/// Cloning is cheap; every clone talks to the same connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "newsroom")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("newsroom.db"))
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open from a connection string: a file path, optionally prefixed with
    /// `sqlite://`, or `:memory:`.
    pub fn open_url(url: &str) -> anyhow::Result<Self> {
        match url.strip_prefix("sqlite://").unwrap_or(url) {
            ":memory:" => Self::open_memory(),
            path => Self::open(PathBuf::from(path)),
        }
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    // ============================================================
    // Article operations
    // ============================================================

    pub fn insert_article(&self, input: NewArticle) -> StoreResult<Article> {
        let conn = self.lock()?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO articles (id, title, link, saved, notes, created_at)
             VALUES (?, ?, ?, 0, '[]', ?)",
            (id.to_string(), &input.title, &input.link, now.to_rfc3339()),
        )?;

        Ok(Article {
            id,
            title: input.title,
            link: input.link,
            saved: false,
            notes: Vec::new(),
            created_at: now,
        })
    }

    pub fn list_articles(&self, filter: ArticleFilter) -> StoreResult<Vec<Article>> {
        let conn = self.lock()?;
        query_articles(&conn, filter)
    }

    /// Like [`list_articles`](Self::list_articles), with each article's notes resolved.
    pub fn list_articles_populated(
        &self,
        filter: ArticleFilter,
    ) -> StoreResult<Vec<PopulatedArticle>> {
        let conn = self.lock()?;
        query_articles(&conn, filter)?
            .into_iter()
            .map(|article| populate(&conn, article))
            .collect()
    }

    pub fn get_article(&self, id: &str) -> StoreResult<Option<PopulatedArticle>> {
        let id = parse_id(id)?;
        let conn = self.lock()?;
        match find_article(&conn, id)? {
            Some(article) => populate(&conn, article).map(Some),
            None => Ok(None),
        }
    }

    /// Mark an article as saved. Saving an already saved article is a no-op.
    pub fn save_article(&self, id: &str) -> StoreResult<Article> {
        let id = parse_id(id)?;
        let conn = self.lock()?;

        let rows = conn.execute(
            "UPDATE articles SET saved = 1 WHERE id = ?",
            [id.to_string()],
        )?;
        if rows == 0 {
            return Err(StoreError::article_not_found(id));
        }

        find_article(&conn, id)?.ok_or_else(|| StoreError::article_not_found(id))
    }

    /// Drop an article from the saved view: clear `saved`, empty its note
    /// list and delete every note that references it, all in one transaction.
    ///
    /// Returns the number of notes deleted.
    pub fn unsave_article(&self, id: &str) -> StoreResult<usize> {
        let id = parse_id(id)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE articles SET saved = 0, notes = '[]' WHERE id = ?",
            [id.to_string()],
        )?;
        if rows == 0 {
            return Err(StoreError::article_not_found(id));
        }

        let purged = tx.execute("DELETE FROM notes WHERE article_id = ?", [id.to_string()])?;
        tx.commit()?;

        Ok(purged)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn get_note(&self, id: &str) -> StoreResult<Option<Note>> {
        let id = parse_id(id)?;
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
            [id.to_string()],
            note_from_row,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Create a note and append it to the article's note list.
    pub fn add_note(&self, article_id: &str, body: String) -> StoreResult<Note> {
        let article_id = parse_id(article_id)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut note_ids = find_note_ids(&tx, article_id)?
            .ok_or_else(|| StoreError::article_not_found(article_id))?;

        let note = Note {
            id: Uuid::new_v4(),
            body,
            article: article_id,
            created_at: Utc::now(),
        };

        tx.execute(
            "INSERT INTO notes (id, body, article_id, created_at) VALUES (?, ?, ?, ?)",
            (
                note.id.to_string(),
                &note.body,
                article_id.to_string(),
                note.created_at.to_rfc3339(),
            ),
        )?;

        note_ids.push(note.id);
        write_note_ids(&tx, article_id, &note_ids)?;
        tx.commit()?;

        Ok(note)
    }

    /// Delete a note and pull its id from the article's note list.
    ///
    /// The note must belong to `article_id`; otherwise nothing changes and
    /// the note is reported as not found.
    pub fn delete_note(&self, note_id: &str, article_id: &str) -> StoreResult<()> {
        let note_id = parse_id(note_id)?;
        let article_id = parse_id(article_id)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut note_ids = find_note_ids(&tx, article_id)?
            .ok_or_else(|| StoreError::article_not_found(article_id))?;

        // A note only leaves the list of the article that owns it.
        let rows = tx.execute(
            "DELETE FROM notes WHERE id = ?1 AND article_id = ?2",
            (note_id.to_string(), article_id.to_string()),
        )?;
        if rows == 0 {
            return Err(StoreError::note_not_found(note_id));
        }

        note_ids.retain(|id| *id != note_id);
        write_note_ids(&tx, article_id, &note_ids)?;
        tx.commit()?;

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Parse a path or body identifier into the store's id format.
pub fn parse_id(id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn query_articles(conn: &Connection, filter: ArticleFilter) -> StoreResult<Vec<Article>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles
         WHERE (?1 IS NULL OR saved = ?1) ORDER BY rowid"
    ))?;

    let articles = stmt
        .query_map([filter.saved], article_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(articles)
}

fn find_article(conn: &Connection, id: Uuid) -> StoreResult<Option<Article>> {
    conn.query_row(
        &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?"),
        [id.to_string()],
        article_from_row,
    )
    .optional()
    .map_err(Into::into)
}

fn find_note_ids(conn: &Connection, article_id: Uuid) -> StoreResult<Option<Vec<Uuid>>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT notes FROM articles WHERE id = ?",
            [article_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    json.map(|s| serde_json::from_str::<Vec<Uuid>>(&s).map_err(StoreError::from))
        .transpose()
}

fn write_note_ids(conn: &Connection, article_id: Uuid, note_ids: &[Uuid]) -> StoreResult<()> {
    conn.execute(
        "UPDATE articles SET notes = ? WHERE id = ?",
        (serde_json::to_string(note_ids)?, article_id.to_string()),
    )?;
    Ok(())
}

fn populate(conn: &Connection, article: Article) -> StoreResult<PopulatedArticle> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes WHERE article_id = ?"
    ))?;

    let mut notes: HashMap<Uuid, Note> = stmt
        .query_map([article.id.to_string()], note_from_row)?
        .map(|note| note.map(|n| (n.id, n)))
        .collect::<Result<_, _>>()?;

    Ok(article.populate(|id| notes.remove(id)))
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let notes_json: String = row.get(4)?;
    let notes = serde_json::from_str(&notes_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Article {
        id: parse_uuid(row.get::<_, String>(0)?),
        title: row.get(1)?,
        link: row.get(2)?,
        saved: row.get::<_, i32>(3)? != 0,
        notes,
        created_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: parse_uuid(row.get::<_, String>(0)?),
        body: row.get(1)?,
        article: parse_uuid(row.get::<_, String>(2)?),
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
