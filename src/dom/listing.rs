//! Typed views over the portal's listing tables
//!
//! The home listing ("Controle de Processos", detailed view) has six cells per
//! record row; a signature block page has nine cells per document row.

use crate::dom::label::derive_label;
use crate::dom::snapshot::{cells, first_anchor, text};
use crate::error::{Result, SeiError};
use indexmap::IndexMap;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const LISTING_CELLS: usize = 6;
pub const BLOCK_CELLS: usize = 9;

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Tag keys extracted from a listing row, in column order
pub mod tags {
    pub const NUMBER: &str = "number";
    pub const LINK: &str = "link";
    pub const ANNOTATION: &str = "annotation";
    pub const ANNOTATION_LINK: &str = "annotation_link";
    pub const MARKER: &str = "marker";
    pub const SPECIAL_TRACKING: &str = "special_tracking";
    pub const ASSIGNED_TO: &str = "assigned_to";
    pub const TYPE: &str = "type";
    pub const INTERESTED: &str = "interested";
}

/// One record row of the home listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    pub tags: IndexMap<String, String>,
}

impl ListingRow {
    /// Parse a listing row; rows without exactly six cells are rejected
    ///
    /// Cells: selection checkbox, status icons (annotation, marker, special
    /// tracking), record number link, assignee, record type, interested parties.
    pub fn parse(row: ElementRef<'_>) -> Result<Self> {
        let cells = cells(row);
        if cells.len() != LISTING_CELLS {
            return Err(SeiError::InvalidRow { expected: LISTING_CELLS, found: cells.len() });
        }

        let mut tags = IndexMap::new();
        let number = first_anchor(cells[2]);
        tags.insert(tags::NUMBER.to_string(), number.map(text).unwrap_or_else(|| text(cells[2])));
        tags.insert(tags::LINK.to_string(), href(number));

        let mut annotation = (String::new(), String::new());
        let mut marker = String::new();
        let mut tracking = String::new();
        for icon in cells[1].select(&ANCHORS) {
            let target = icon.value().attr("href").unwrap_or_default();
            let label = icon_label(icon);
            if target.contains("anotacao") {
                annotation = (label, target.to_string());
            } else if target.contains("marcador") {
                marker = label;
            } else if target.contains("acompanhamento") {
                tracking = label;
            }
        }
        tags.insert(tags::ANNOTATION.to_string(), annotation.0);
        tags.insert(tags::ANNOTATION_LINK.to_string(), annotation.1);
        tags.insert(tags::MARKER.to_string(), marker);
        tags.insert(tags::SPECIAL_TRACKING.to_string(), tracking);

        tags.insert(tags::ASSIGNED_TO.to_string(), text(cells[3]));
        tags.insert(tags::TYPE.to_string(), text(cells[4]));
        tags.insert(tags::INTERESTED.to_string(), text(cells[5]));

        Ok(Self { tags })
    }

    /// Record number, the registry key
    pub fn id(&self) -> &str {
        self.tag(tags::NUMBER).unwrap_or_default()
    }

    pub fn link(&self) -> Option<&str> {
        self.tag(tags::LINK)
    }

    /// Non-empty tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }
}

/// Icon tooltip: `title` on the anchor, then on its image, then the label rule
fn icon_label(icon: ElementRef<'_>) -> String {
    icon.value()
        .attr("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .or_else(|| derive_label(icon))
        .unwrap_or_default()
}

fn href(anchor: Option<ElementRef<'_>>) -> String {
    anchor.and_then(|a| a.value().attr("href")).unwrap_or_default().to_string()
}

/// A document linked to a signature block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub seq: String,
    pub record: String,
    pub record_link: String,
    pub document: String,
    pub date: String,
    pub document_type: String,
    /// Signers, empty while unsigned
    pub signature: String,
    pub annotations: String,
}

impl BlockEntry {
    /// Parse a block row
    ///
    /// Cells: checkbox, sequence, record, document, date, type, signature,
    /// annotations, actions.
    pub fn parse(row: ElementRef<'_>) -> Result<Self> {
        let cells = cells(row);
        if cells.len() != BLOCK_CELLS {
            return Err(SeiError::InvalidRow { expected: BLOCK_CELLS, found: cells.len() });
        }

        let record = first_anchor(cells[2]);
        Ok(Self {
            seq: text(cells[1]),
            record: record.map(text).unwrap_or_else(|| text(cells[2])),
            record_link: href(record),
            document: first_anchor(cells[3]).map(text).unwrap_or_else(|| text(cells[3])),
            date: text(cells[4]),
            document_type: text(cells[5]),
            signature: text(cells[6]),
            annotations: text(cells[7]),
        })
    }

    /// Signed documents can be expedited
    pub fn is_expeditable(&self) -> bool {
        !self.signature.is_empty()
    }
}
