//! Low-level JSON document table.
//!
//! One table holds every collection; documents are stored as JSON text and
//! addressed by `(collection, id)`. Field lookups go through sqlite's
//! `json_extract`, so a natural-key query (events by title) is a plain
//! indexed-ish scan rather than a schema change.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use serde_json::Value;

use cyberclub_core::error::{ClubError, Result};

pub struct ContentStore {
    pub(crate) conn: Mutex<Connection>,
}

impl ContentStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        Self::init(conn)
    }

    /// An in-memory store, used by tests and `--ephemeral` runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                doc TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );",
        )
        .map_err(store_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert a document, assigning a fresh id. Returns the id.
    pub fn insert(&self, collection: &str, doc: &Value) -> Result<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, doc, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                collection,
                id,
                doc.to_string(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(store_err)?;
        Ok(id)
    }

    /// All documents in a collection, in insertion order. Insertion order is
    /// stable, which keeps "pick a random element" uniform.
    pub fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, doc FROM documents WHERE collection = ?1 ORDER BY rowid")
            .map_err(store_err)?;
        let rows = stmt
            .query_map(rusqlite::params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(store_err)?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, raw) = row.map_err(store_err)?;
            docs.push((id, parse_doc(&raw)?));
        }
        Ok(docs)
    }

    /// Fetch one document by id.
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT doc FROM documents WHERE collection = ?1 AND id = ?2")
            .map_err(store_err)?;
        let raw: Option<String> = stmt
            .query_row(rusqlite::params![collection, id], |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(store_err(other)),
            })?;
        raw.map(|r| parse_doc(&r)).transpose()
    }

    /// First document whose top-level `field` equals `value`, insertion
    /// order. Duplicate natural keys are tolerated; the oldest wins.
    pub fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<(String, Value)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, doc FROM documents
                 WHERE collection = ?1 AND json_extract(doc, '$.' || ?2) = ?3
                 ORDER BY rowid LIMIT 1",
            )
            .map_err(store_err)?;
        let row: Option<(String, String)> = stmt
            .query_row(rusqlite::params![collection, field, value], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(store_err(other)),
            })?;
        match row {
            Some((id, raw)) => Ok(Some((id, parse_doc(&raw)?))),
            None => Ok(None),
        }
    }

    /// Merge the top-level fields of `patch` into the stored document.
    /// Fields absent from the patch keep their prior value. Returns the
    /// merged document, or `None` when the id does not resolve.
    pub fn merge(&self, collection: &str, id: &str, patch: &Value) -> Result<Option<Value>> {
        let Some(mut doc) = self.get(collection, id)? else {
            return Ok(None);
        };

        if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        let conn = self.lock()?;
        conn.execute(
            "UPDATE documents SET doc = ?3 WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id, doc.to_string()],
        )
        .map_err(store_err)?;
        Ok(Some(doc))
    }

    /// Delete by id. Returns whether a row was actually removed; deleting
    /// an already-deleted id reports `false`, not an error.
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                rusqlite::params![collection, id],
            )
            .map_err(store_err)?;
        Ok(removed > 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ClubError::store(format!("store lock poisoned: {e}")))
    }
}

fn parse_doc(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| ClubError::store(format!("corrupt document: {e}")))
}

fn store_err(e: rusqlite::Error) -> ClubError {
    ClubError::store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let store = ContentStore::open_in_memory().expect("open");
        let id = store
            .insert("facts", &json!({"content": "sqlite ships JSON1"}))
            .expect("insert");
        let doc = store.get("facts", &id).expect("get").expect("present");
        assert_eq!(doc["content"], "sqlite ships JSON1");
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = ContentStore::open_in_memory().expect("open");
        for n in 0..3 {
            store.insert("jokes", &json!({"content": n})).expect("insert");
        }
        let docs = store.list("jokes").expect("list");
        let order: Vec<i64> = docs.iter().map(|(_, d)| d["content"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_collections_are_independent() {
        let store = ContentStore::open_in_memory().expect("open");
        store.insert("facts", &json!({"content": "a"})).expect("insert");
        assert!(store.list("jokes").expect("list").is_empty());
    }

    #[test]
    fn test_find_by_field_prefers_oldest_duplicate() {
        let store = ContentStore::open_in_memory().expect("open");
        store
            .insert("events", &json!({"title": "CTF Night", "location": "Lab 1"}))
            .expect("insert");
        store
            .insert("events", &json!({"title": "CTF Night", "location": "Lab 2"}))
            .expect("insert");
        let (_, doc) = store
            .find_by_field("events", "title", "CTF Night")
            .expect("find")
            .expect("present");
        assert_eq!(doc["location"], "Lab 1");
    }

    #[test]
    fn test_merge_preserves_unpatched_fields() {
        let store = ContentStore::open_in_memory().expect("open");
        let id = store
            .insert("events", &json!({"title": "Workshop", "location": "Room A", "date": "2026-01-01T10:00:00"}))
            .expect("insert");
        let doc = store
            .merge("events", &id, &json!({"location": "Room B"}))
            .expect("merge")
            .expect("present");
        assert_eq!(doc["location"], "Room B");
        assert_eq!(doc["title"], "Workshop");
        assert_eq!(doc["date"], "2026-01-01T10:00:00");
    }

    #[test]
    fn test_merge_missing_id_is_none() {
        let store = ContentStore::open_in_memory().expect("open");
        assert!(store
            .merge("events", "nope", &json!({"location": "x"}))
            .expect("merge")
            .is_none());
    }

    #[test]
    fn test_delete_twice_reports_false() {
        let store = ContentStore::open_in_memory().expect("open");
        let id = store.insert("quotes", &json!({"content": "q"})).expect("insert");
        assert!(store.delete("quotes", &id).expect("delete"));
        assert!(!store.delete("quotes", &id).expect("delete again"));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("content.db");
        {
            let store = ContentStore::open(&path).expect("open");
            store.insert("facts", &json!({"content": "persisted"})).expect("insert");
        }
        let store = ContentStore::open(&path).expect("reopen");
        assert_eq!(store.list("facts").expect("list").len(), 1);
    }
}
