//! Contact directory lookups

use super::{SeiSession, expect_title};
use crate::browser::driver::PageDriver;
use crate::dom::label::derive_label;
use crate::dom::snapshot::{HtmlSnapshot, text};
use crate::error::{Result, SeiError};
use crate::locators::{contact, menu};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// A row of the contact search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMatch {
    /// Row text, cells separated by " | "
    pub summary: String,
    /// Link of the row's "Alterar Contato" action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_link: Option<String>,
}

/// Strip diacritics ("João" → "Joao")
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

impl<D: PageDriver> SeiSession<D> {
    /// Open the contact listing through the side menu's "Listar" entry
    pub fn go_to_contacts(&mut self) -> Result<()> {
        let snapshot = HtmlSnapshot::parse(&self.driver.page_source()?);
        let link = snapshot
            .menu_link(menu::CONTACTS_LIST_TEXT)
            .ok_or_else(|| SeiError::NotFound(format!("menu entry '{}'", menu::CONTACTS_LIST_TEXT)))?;
        self.go(&link)?;
        expect_title(&self.driver, &self.config.titles.contacts, self.config.timeouts.element())
    }

    /// Search the contact directory for `term`
    ///
    /// The term is searched without accents, and the first result row whose text
    /// contains it (case-insensitively, ignoring accents) is returned.
    pub fn search_contact(&mut self, term: &str) -> Result<Option<ContactMatch>> {
        if self.driver.title()? != self.config.titles.contacts {
            self.go_to_contacts()?;
        }

        let folded = fold_accents(term);
        let timeout = self.config.timeouts.element();
        self.driver.wait_and_fill(&contact::SEARCH, &folded, timeout)?;
        self.driver.wait_and_click(&contact::SEARCH_BUTTON, timeout)?;

        let snapshot = HtmlSnapshot::parse(&self.driver.page_source()?);
        let needle = folded.to_lowercase();
        for (row, cells) in snapshot.select(contact::RESULT_ROWS)?.into_iter().zip(snapshot.rows(contact::RESULT_ROWS)?) {
            let matched = cells.iter().any(|cell| fold_accents(&text(*cell)).to_lowercase().contains(&needle));
            if !matched {
                continue;
            }

            let summary = cells.iter().map(|cell| text(*cell)).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" | ");
            let edit_link = row
                .select(&ANCHORS)
                .find(|anchor| {
                    anchor.value().attr("title") == Some(contact::EDIT_TITLE)
                        || derive_label(*anchor).as_deref() == Some(contact::EDIT_TITLE)
                })
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::to_string);

            log::debug!("Contact '{}' found: {}", term, summary);
            return Ok(Some(ContactMatch { summary, edit_link }));
        }

        log::debug!("Contact '{}' not found", term);
        Ok(None)
    }
}
