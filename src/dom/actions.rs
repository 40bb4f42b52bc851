use crate::dom::label::derive_label;
use crate::dom::snapshot::HtmlSnapshot;
use crate::error::{Result, SeiError};
use indexmap::IndexMap;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// What activating an action does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Action {
    /// Portal link, usually relative to the base URL
    Href(String),
    /// Inline script, without the `javascript:` scheme
    Script(String),
}

impl Action {
    pub fn href(&self) -> Option<&str> {
        match self {
            Action::Href(href) => Some(href),
            Action::Script(_) => None,
        }
    }

    pub fn script(&self) -> Option<&str> {
        match self {
            Action::Script(script) => Some(script),
            Action::Href(_) => None,
        }
    }
}

/// One entry of a record's action panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub label: String,
    pub action: Action,
}

impl ActionEntry {
    /// Build an entry from an action anchor; anchors without a label or an action are skipped
    pub fn from_anchor(anchor: ElementRef<'_>) -> Option<Self> {
        let label = derive_label(anchor)?;
        let element = anchor.value();
        let href = element.attr("href").map(str::trim).unwrap_or_default();
        let onclick = element.attr("onclick").map(str::trim).unwrap_or_default();

        let action = if let Some(script) = strip_scheme(href) {
            Action::Script(script.to_string())
        } else if !href.is_empty() && href != "#" {
            Action::Href(href.to_string())
        } else if !onclick.is_empty() {
            Action::Script(onclick.to_string())
        } else {
            return None;
        };

        Some(Self { label, action })
    }
}

fn strip_scheme(href: &str) -> Option<&str> {
    let scheme = href.get(..11)?;
    scheme.eq_ignore_ascii_case("javascript:").then(|| href[11..].trim())
}

/// Label → action mapping for the record currently displayed
///
/// Uses IndexMap to preserve panel order. The map describes where the browser is
/// now; it is rebuilt on every step instead of being kept across navigations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMap {
    entries: IndexMap<String, ActionEntry>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the direct anchor children of the container with id `container_id`
    pub fn from_container(snapshot: &HtmlSnapshot, container_id: &str) -> Result<Self> {
        let container = snapshot
            .element_by_id(container_id)
            .ok_or_else(|| SeiError::NotFound(format!("action container #{}", container_id)))?;

        let mut map = Self::new();
        for child in container.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "a" {
                continue;
            }
            match ActionEntry::from_anchor(child) {
                Some(entry) => map.insert(entry),
                None => log::debug!("Skipping action anchor without label or target"),
            }
        }
        Ok(map)
    }

    /// Add an entry; the first entry with a given label is kept
    pub fn insert(&mut self, entry: ActionEntry) {
        if self.entries.contains_key(&entry.label) {
            log::debug!("Duplicate action label '{}' ignored", entry.label);
            return;
        }
        self.entries.insert(entry.label.clone(), entry);
    }

    pub fn get(&self, label: &str) -> Option<&ActionEntry> {
        self.entries.get(label)
    }

    /// Entry for `label`, or `NotFound`
    pub fn require(&self, label: &str) -> Result<&ActionEntry> {
        self.get(label).ok_or_else(|| SeiError::NotFound(format!("action '{}'", label)))
    }

    /// Link of the action `label`, or `NotFound` when it is absent or a script
    pub fn require_href(&self, label: &str) -> Result<&str> {
        self.require(label)?
            .action
            .href()
            .ok_or_else(|| SeiError::NotFound(format!("link for action '{}'", label)))
    }

    /// Script of the action `label`; a link target is returned as-is
    pub fn require_script(&self, label: &str) -> Result<&str> {
        Ok(match &self.require(label)?.action {
            Action::Script(script) => script,
            Action::Href(href) => href,
        })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
