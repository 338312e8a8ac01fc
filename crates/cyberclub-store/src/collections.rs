//! Typed CRUD over the five content collections.
//!
//! Facts, jokes, quotes, and quizzes are id-addressed: the store assigns an
//! opaque id on create and it never changes. Events are addressed by their
//! `title` — the identity a caller uses for get/update/delete is whatever
//! the title currently is, and renaming an event via update means the old
//! title stops resolving.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use cyberclub_core::error::{ClubError, Result};
use cyberclub_core::types::{
    Event, EventPatch, Fact, FactPatch, Joke, JokePatch, QuizItem, QuizPatch, Quote, QuotePatch,
};

use crate::documents::ContentStore;

pub const EVENTS: &str = "events";
pub const FACTS: &str = "facts";
pub const JOKES: &str = "jokes";
pub const QUOTES: &str = "quotes";
pub const QUIZZES: &str = "quizzes";

impl ContentStore {
    // ── Events (natural-key addressed) ──────────────────

    pub fn list_events(&self) -> Result<Vec<Event>> {
        self.list(EVENTS)?
            .into_iter()
            .map(|(_, doc)| decode(doc))
            .collect()
    }

    pub fn get_event(&self, title: &str) -> Result<Event> {
        match self.find_by_field(EVENTS, "title", title)? {
            Some((_, doc)) => decode(doc),
            None => Err(event_not_found(title)),
        }
    }

    /// The caller-supplied title is accepted as-is; no uniqueness check.
    pub fn create_event(&self, event: &Event) -> Result<Event> {
        let doc = encode(event)?;
        self.insert(EVENTS, &doc)?;
        Ok(event.clone())
    }

    pub fn update_event(&self, title: &str, patch: &EventPatch) -> Result<Event> {
        let Some((id, _)) = self.find_by_field(EVENTS, "title", title)? else {
            return Err(event_not_found(title));
        };
        let patch = encode(patch)?;
        match self.merge(EVENTS, &id, &patch)? {
            Some(doc) => decode(doc),
            None => Err(event_not_found(title)),
        }
    }

    pub fn delete_event(&self, title: &str) -> Result<()> {
        let Some((id, _)) = self.find_by_field(EVENTS, "title", title)? else {
            return Err(event_not_found(title));
        };
        if self.delete(EVENTS, &id)? {
            Ok(())
        } else {
            Err(event_not_found(title))
        }
    }

    // ── Facts ───────────────────────────────────────────

    pub fn list_facts(&self) -> Result<Vec<Fact>> {
        self.list_by_id(FACTS)
    }

    pub fn get_fact(&self, id: &str) -> Result<Fact> {
        self.get_by_id(FACTS, id)
    }

    pub fn create_fact(&self, fact: &Fact) -> Result<Fact> {
        self.create_by_id(FACTS, fact)
    }

    pub fn update_fact(&self, id: &str, patch: &FactPatch) -> Result<Fact> {
        self.update_by_id(FACTS, id, patch)
    }

    pub fn delete_fact(&self, id: &str) -> Result<()> {
        self.delete_by_id(FACTS, id)
    }

    // ── Jokes ───────────────────────────────────────────

    pub fn list_jokes(&self) -> Result<Vec<Joke>> {
        self.list_by_id(JOKES)
    }

    pub fn get_joke(&self, id: &str) -> Result<Joke> {
        self.get_by_id(JOKES, id)
    }

    pub fn create_joke(&self, joke: &Joke) -> Result<Joke> {
        self.create_by_id(JOKES, joke)
    }

    pub fn update_joke(&self, id: &str, patch: &JokePatch) -> Result<Joke> {
        self.update_by_id(JOKES, id, patch)
    }

    pub fn delete_joke(&self, id: &str) -> Result<()> {
        self.delete_by_id(JOKES, id)
    }

    // ── Quotes ──────────────────────────────────────────

    pub fn list_quotes(&self) -> Result<Vec<Quote>> {
        self.list_by_id(QUOTES)
    }

    pub fn get_quote(&self, id: &str) -> Result<Quote> {
        self.get_by_id(QUOTES, id)
    }

    pub fn create_quote(&self, quote: &Quote) -> Result<Quote> {
        self.create_by_id(QUOTES, quote)
    }

    pub fn update_quote(&self, id: &str, patch: &QuotePatch) -> Result<Quote> {
        self.update_by_id(QUOTES, id, patch)
    }

    pub fn delete_quote(&self, id: &str) -> Result<()> {
        self.delete_by_id(QUOTES, id)
    }

    // ── Quizzes ─────────────────────────────────────────

    pub fn list_quizzes(&self) -> Result<Vec<QuizItem>> {
        self.list_by_id(QUIZZES)
    }

    pub fn get_quiz(&self, id: &str) -> Result<QuizItem> {
        self.get_by_id(QUIZZES, id)
    }

    pub fn create_quiz(&self, quiz: &QuizItem) -> Result<QuizItem> {
        self.create_by_id(QUIZZES, quiz)
    }

    pub fn update_quiz(&self, id: &str, patch: &QuizPatch) -> Result<QuizItem> {
        self.update_by_id(QUIZZES, id, patch)
    }

    pub fn delete_quiz(&self, id: &str) -> Result<()> {
        self.delete_by_id(QUIZZES, id)
    }

    // ── Id-addressed plumbing ───────────────────────────

    fn list_by_id<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.list(collection)?
            .into_iter()
            .map(|(id, mut doc)| {
                attach_id(&mut doc, &id);
                decode(doc)
            })
            .collect()
    }

    fn get_by_id<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        match self.get(collection, id)? {
            Some(mut doc) => {
                attach_id(&mut doc, id);
                decode(doc)
            }
            None => Err(record_not_found(collection, id)),
        }
    }

    fn create_by_id<T: Serialize + DeserializeOwned>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<T> {
        let mut doc = encode(record)?;
        // The store owns identity assignment; a caller-supplied id is ignored.
        if let Some(obj) = doc.as_object_mut() {
            obj.remove("id");
        }
        let id = self.insert(collection, &doc)?;
        attach_id(&mut doc, &id);
        decode(doc)
    }

    fn update_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        patch: &impl Serialize,
    ) -> Result<T> {
        let patch = encode(patch)?;
        match self.merge(collection, id, &patch)? {
            Some(mut doc) => {
                attach_id(&mut doc, id);
                decode(doc)
            }
            None => Err(record_not_found(collection, id)),
        }
    }

    fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        if self.delete(collection, id)? {
            Ok(())
        } else {
            Err(record_not_found(collection, id))
        }
    }
}

fn attach_id(doc: &mut Value, id: &str) {
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("id".into(), Value::String(id.to_string()));
    }
}

fn encode(value: &impl Serialize) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ClubError::store(format!("encode failed: {e}")))
}

fn decode<T: DeserializeOwned>(doc: Value) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| ClubError::store(format!("decode failed: {e}")))
}

fn event_not_found(title: &str) -> ClubError {
    ClubError::not_found(format!("event '{title}'"))
}

fn record_not_found(collection: &str, id: &str) -> ClubError {
    ClubError::not_found(format!("{collection} record {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(title: &str) -> Event {
        Event {
            title: title.into(),
            date: "2026-05-01T18:00:00".into(),
            description: "Intro to binary exploitation".into(),
            location: "Lab 3".into(),
        }
    }

    #[test]
    fn test_event_roundtrip_by_title() {
        let store = ContentStore::open_in_memory().expect("open");
        store.create_event(&sample_event("Pwn Night")).expect("create");

        let fetched = store.get_event("Pwn Night").expect("get");
        assert_eq!(fetched.location, "Lab 3");

        assert!(matches!(
            store.get_event("Ghost Event"),
            Err(ClubError::NotFound(_))
        ));
    }

    #[test]
    fn test_event_partial_update_keeps_other_fields() {
        let store = ContentStore::open_in_memory().expect("open");
        store.create_event(&sample_event("Workshop")).expect("create");

        let patch = EventPatch { location: Some("Amphi B".into()), ..Default::default() };
        let updated = store.update_event("Workshop", &patch).expect("update");
        assert_eq!(updated.location, "Amphi B");
        assert_eq!(updated.date, "2026-05-01T18:00:00");
        assert_eq!(updated.description, "Intro to binary exploitation");
    }

    #[test]
    fn test_event_rename_invalidates_old_title() {
        let store = ContentStore::open_in_memory().expect("open");
        store.create_event(&sample_event("Old Name")).expect("create");

        let patch = EventPatch { title: Some("New Name".into()), ..Default::default() };
        store.update_event("Old Name", &patch).expect("rename");

        assert!(store.get_event("New Name").is_ok());
        assert!(matches!(
            store.get_event("Old Name"),
            Err(ClubError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_missing_identity_mutates_nothing() {
        let store = ContentStore::open_in_memory().expect("open");
        store.create_event(&sample_event("Kept")).expect("create");

        let patch = EventPatch { location: Some("Elsewhere".into()), ..Default::default() };
        assert!(matches!(
            store.update_event("Absent", &patch),
            Err(ClubError::NotFound(_))
        ));
        assert_eq!(store.get_event("Kept").expect("get").location, "Lab 3");
    }

    #[test]
    fn test_duplicate_titles_are_tolerated() {
        let store = ContentStore::open_in_memory().expect("open");
        store.create_event(&sample_event("CTF Night")).expect("create");
        store.create_event(&sample_event("CTF Night")).expect("create dup");

        assert_eq!(store.list_events().expect("list").len(), 2);
        // Delete removes one; the other still resolves.
        store.delete_event("CTF Night").expect("delete");
        assert!(store.get_event("CTF Night").is_ok());
    }

    #[test]
    fn test_fact_create_assigns_id() {
        let store = ContentStore::open_in_memory().expect("open");
        let created = store.create_fact(&Fact::new("RSA is from 1977")).expect("create");
        let id = created.id.expect("id assigned");

        let fetched = store.get_fact(&id).expect("get");
        assert_eq!(fetched.content, "RSA is from 1977");
    }

    #[test]
    fn test_quote_update_by_id() {
        let store = ContentStore::open_in_memory().expect("open");
        let created = store
            .create_quote(&Quote::new("Security is a process", "Schneier"))
            .expect("create");
        let id = created.id.expect("id");

        let patch = QuotePatch { author: Some("Bruce Schneier".into()), ..Default::default() };
        let updated = store.update_quote(&id, &patch).expect("update");
        assert_eq!(updated.author, "Bruce Schneier");
        assert_eq!(updated.content, "Security is a process");
    }

    #[test]
    fn test_delete_missing_id_is_not_found() {
        let store = ContentStore::open_in_memory().expect("open");
        assert!(matches!(
            store.delete_joke("missing"),
            Err(ClubError::NotFound(_))
        ));
    }

    #[test]
    fn test_quiz_roundtrip() {
        let store = ContentStore::open_in_memory().expect("open");
        let quiz = QuizItem {
            id: None,
            question: "Which port is HTTPS?".into(),
            options: vec!["80".into(), "443".into(), "8080".into()],
            correct_option: 1,
        };
        let created = store.create_quiz(&quiz).expect("create");
        let fetched = store.get_quiz(created.id.as_deref().expect("id")).expect("get");
        assert_eq!(fetched.correct_option, 1);
        assert_eq!(fetched.options.len(), 3);
    }
}
