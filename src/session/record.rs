use crate::dom::actions::ActionMap;
use crate::dom::listing::{ListingRow, tags};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A process tracked by the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record number, unique within a session
    pub id: String,

    /// Values scraped from the listing (see [`crate::dom::listing::tags`])
    pub known_tags: IndexMap<String, String>,

    /// Last action map built for this record; only valid for the page it was built on
    #[serde(skip)]
    pub action_cache: ActionMap,

    /// Portal link of the record page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), known_tags: IndexMap::new(), action_cache: ActionMap::new(), link: None }
    }

    pub fn from_row(row: ListingRow) -> Self {
        let id = row.id().to_string();
        let link = row.link().map(str::to_string);
        Self { id, known_tags: row.tags, action_cache: ActionMap::new(), link }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.known_tags.get(key).map(String::as_str)
    }

    pub fn set_tag(&mut self, key: &str, value: impl Into<String>) {
        self.known_tags.insert(key.to_string(), value.into());
    }

    pub fn annotation(&self) -> Option<&str> {
        self.tag(tags::ANNOTATION).filter(|v| !v.is_empty())
    }
}

/// Records of the current session, keyed by id in listing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordRegistry {
    records: IndexMap<String, Record>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from listing rows
    ///
    /// A record seen twice keeps the position of its first appearance and the tags of
    /// its last one. Rows without a number are ignored.
    pub fn from_rows(rows: impl IntoIterator<Item = ListingRow>) -> Self {
        let mut registry = Self::new();
        for row in rows {
            if row.id().is_empty() {
                log::debug!("Skipping listing row without a record number");
                continue;
            }
            registry.insert(Record::from_row(row));
        }
        registry
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        self.records.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Records whose tag `key` equals `value`
    pub fn filter<'a, 'q>(&'a self, key: &'q str, value: &'q str) -> impl Iterator<Item = &'a Record> + 'q
    where
        'a: 'q,
    {
        self.records.values().filter(move |record| record.tag(key) == Some(value))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
