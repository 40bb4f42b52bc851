//! Indexing pass over the home listing

use super::{RecordRegistry, SeiSession};
use crate::browser::driver::{PageDriver, poll_until};
use crate::dom::listing::ListingRow;
use crate::dom::snapshot::HtmlSnapshot;
use crate::error::{Result, SeiError};
use crate::locators::home;
use serde::{Deserialize, Serialize};

/// Progress of the indexing pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IndexingState {
    /// No listing captured yet
    NotStarted,
    /// Walking the page-size options; `page` is 1-based
    Paginating { page: usize, of: usize },
    /// Registry replaced with `records` entries
    Done { records: usize },
}

impl<D: PageDriver> SeiSession<D> {
    /// Capture every open record from the home listing into a fresh registry
    ///
    /// Every option of the listing's page control is selected in the order the
    /// control lists them, and the rows of each resulting page are collected; the
    /// page shown on arrival is revisited through the control, so the result does not
    /// depend on it. Rows without exactly six cells are dropped. On success the
    /// registry is replaced wholesale; on failure both the registry and the indexing
    /// state keep their prior values. Returns the number of records indexed.
    pub fn index_records(&mut self) -> Result<usize> {
        let prior = self.indexing.clone();
        match self.paginate() {
            Ok(rows) => {
                self.registry = RecordRegistry::from_rows(rows);
                let records = self.registry.len();
                self.indexing = IndexingState::Done { records };
                log::info!("Indexed {} records", records);
                Ok(records)
            }
            Err(e) => {
                self.indexing = prior;
                Err(e)
            }
        }
    }

    fn paginate(&mut self) -> Result<Vec<ListingRow>> {
        if !self.is_init_page()? {
            self.go_to_init_page()?;
        }
        self.see_detailed();

        let listing_timeout = self.config.timeouts.listing();
        self.driver.wait_for_element(&home::PAGE_SIZE, listing_timeout).map_err(|e| {
            log::warn!("Page-size control not found: {}", e);
            SeiError::NoListingControl
        })?;
        let options = self.driver.select_options(&home::PAGE_SIZE)?;

        let mut rows = Vec::new();
        let of = options.len();
        for (index, option) in options.iter().enumerate() {
            self.indexing = IndexingState::Paginating { page: index + 1, of };
            log::info!("Indexing listing page {} ({}/{})", option, index + 1, of);

            let before = self.driver.page_source()?;
            let already_shown = selected_page(&before).as_deref() == Some(option.as_str());
            self.driver.wait_and_select(&home::PAGE_SIZE, option, self.config.timeouts.element())?;
            let source = self.settle(&before, option, already_shown)?;
            rows.extend(listing_rows(&source)?);
        }

        Ok(rows)
    }

    /// Wait for the listing to re-render after selecting `option`
    ///
    /// The listing has re-rendered once the document has finished loading, the
    /// page-size control shows `option` and the source differs from `before` (or
    /// `option` was already shown, in which case nothing re-renders). Without that
    /// signal the whole settle interval elapses and the source at that point is used.
    fn settle(&self, before: &str, option: &str, already_shown: bool) -> Result<String> {
        let settle = self.config.timeouts.settle();
        let rendered = poll_until(settle, self.driver.poll_interval(), || {
            if !self.driver.is_loaded().ok()? {
                return None;
            }
            let source = self.driver.page_source().ok()?;
            let shows_option = selected_page(&source).as_deref() == Some(option);
            (shows_option && (already_shown || source != before)).then_some(source)
        });

        match rendered {
            Some(source) => Ok(source),
            None => {
                log::warn!("No re-render signal for page {} after {:?}, using current listing", option, settle);
                self.driver.page_source()
            }
        }
    }
}

/// Listing rows with exactly six cells
fn listing_rows(source: &str) -> Result<Vec<ListingRow>> {
    let snapshot = HtmlSnapshot::parse(source);
    let mut rows = Vec::new();
    for row in snapshot.select(home::LISTING_ROWS)? {
        match ListingRow::parse(row) {
            Ok(parsed) => rows.push(parsed),
            Err(e) => log::debug!("Dropping listing row: {}", e),
        }
    }
    Ok(rows)
}

/// Text of the option the page-size control renders as selected
fn selected_page(source: &str) -> Option<String> {
    let snapshot = HtmlSnapshot::parse(source);
    let css = format!("{} option[selected]", home::PAGE_SIZE.as_css()?);
    let option = snapshot.select(&css).ok()?.into_iter().next()?;
    Some(crate::dom::snapshot::text(option))
}
