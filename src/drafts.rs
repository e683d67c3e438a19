//! Draft store: local persistence of in-progress wiki edits, keyed by page
//! title. Overwritten on every save, removed on publish or discard.

use chrono::Utc;
use rusqlite::params;
use std::path::Path;
use tracing::info;

/// Sql for database migrations.
///
/// All operations must be idempotent.
const MIGRATIONS: &str = "
    CREATE TABLE IF NOT EXISTS wiki_drafts (
        page_title TEXT PRIMARY KEY ON CONFLICT REPLACE,
        content TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Draft {
    pub page_title: String,
    pub updated_at: String,
}

pub struct DraftStore(rusqlite::Connection);

impl DraftStore {
    #[tracing::instrument]
    pub fn new(path: &Path) -> Result<Self, anyhow::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)?;
        let store = Self(conn);
        migrate(&store)?;
        Ok(store)
    }

    /// Ephemeral store, nothing survives the process.
    pub fn in_memory() -> Result<Self, anyhow::Error> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let store = Self(conn);
        migrate(&store)?;
        Ok(store)
    }

    #[tracing::instrument(skip(self, content))]
    pub fn put_draft(&mut self, page_title: &str, content: &str) -> Result<(), anyhow::Error> {
        self.0.execute(
            "INSERT INTO wiki_drafts (page_title, content, updated_at) VALUES (?, ?, ?);",
            params![page_title, content, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn get_draft(&self, page_title: &str) -> Result<Option<String>, anyhow::Error> {
        let mut stmt =
            self.0.prepare_cached("SELECT content FROM wiki_drafts WHERE page_title = ?;")?;
        let mut rows = stmt.query_map([page_title], |x| x.get(0))?;
        let content = rows.next().transpose()?;
        Ok(content)
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_draft(&mut self, page_title: &str) -> Result<(), anyhow::Error> {
        let removed =
            self.0.execute("DELETE FROM wiki_drafts WHERE page_title = ?;", [page_title])?;
        if removed > 0 {
            info!(page_title, "draft removed");
        }
        Ok(())
    }

    pub fn list_drafts(&self) -> Result<Vec<Draft>, anyhow::Error> {
        let mut stmt = self.0.prepare_cached(
            "SELECT page_title, updated_at FROM wiki_drafts ORDER BY page_title;",
        )?;
        let drafts = stmt
            .query_map([], |x| {
                let page_title = x.get(0)?;
                let updated_at = x.get(1)?;
                Ok(Draft { page_title, updated_at })
            })?
            .collect::<Result<_, _>>()?;
        Ok(drafts)
    }
}

/// Migrates database.
fn migrate(store: &DraftStore) -> Result<(), anyhow::Error> {
    store.0.execute_batch(MIGRATIONS)?;
    Ok(())
}
