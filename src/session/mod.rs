//! Session facade over one logged-in portal browser
//!
//! [`SeiSession`] owns the driver, the configuration and the record registry, and is
//! the explicit context every operation is threaded through: there is no ambient
//! cursor state, and frame/window moves go through the scoped guards in
//! [`crate::browser::scope`].

mod contacts;
mod indexing;
mod navigation;
mod record;

pub use contacts::{ContactMatch, fold_accents};
pub use indexing::IndexingState;
pub use record::{Record, RecordRegistry};

use crate::browser::driver::PageDriver;
use crate::config::SeiConfig;
use crate::error::{Result, SeiError};
use crate::locators::{home, login};
use std::time::Duration;

/// A browser session on the portal
pub struct SeiSession<D: PageDriver> {
    driver: D,
    config: SeiConfig,
    registry: RecordRegistry,
    indexing: IndexingState,
}

impl<D: PageDriver> SeiSession<D> {
    /// Wrap a driver that is already logged in (or about to call [`SeiSession::login`])
    ///
    /// The driver's bounded waits are switched to the configured poll interval.
    pub fn new(mut driver: D, config: SeiConfig) -> Self {
        driver.set_poll_interval(config.timeouts.poll());
        Self { driver, config, registry: RecordRegistry::new(), indexing: IndexingState::NotStarted }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn config(&self) -> &SeiConfig {
        &self.config
    }

    /// Borrow the driver mutably and the configuration shared at the same time
    pub fn split(&mut self) -> (&mut D, &SeiConfig) {
        (&mut self.driver, &self.config)
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Records captured by the last indexing pass
    pub fn records(&self) -> &RecordRegistry {
        &self.registry
    }

    pub fn records_mut(&mut self) -> &mut RecordRegistry {
        &mut self.registry
    }

    /// Records whose tag `key` equals `value`
    pub fn filter_records(&self, key: &str, value: &str) -> Vec<&Record> {
        self.registry.filter(key, value).collect()
    }

    pub fn indexing_state(&self) -> &IndexingState {
        &self.indexing
    }

    fn element_timeout(&self) -> Duration {
        self.config.timeouts.element()
    }

    /// Log in from the portal's login page
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let timeout = self.element_timeout();
        let url = self.config.absolute_url("");
        self.driver.navigate(&url)?;
        self.driver.wait_and_fill(&login::USER, user, timeout)?;
        self.driver.wait_and_fill(&login::PASSWORD, password, timeout)?;
        self.driver.wait_and_click(&login::SUBMIT, timeout)?;
        log::info!("Logged in as {}", user);
        Ok(())
    }

    /// Navigate to a portal link, prefixing the base URL when it is relative
    pub fn go(&mut self, link: &str) -> Result<()> {
        let url = self.config.absolute_url(link);
        log::debug!("Navigating to {}", url);
        self.driver.navigate(&url)
    }

    pub fn is_init_page(&self) -> Result<bool> {
        Ok(self.driver.title()? == self.config.titles.home)
    }

    /// Go to the home listing; the header link is tried first, then the base URL
    pub fn go_to_init_page(&mut self) -> Result<()> {
        match self.driver.click(&home::HOME_LINK) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::debug!("Home link unavailable ({}), loading base URL", e);
                self.go("")
            }
        }
    }

    /// Expand the side menu if it is collapsed
    pub fn show_side_menu(&mut self) -> Result<()> {
        let timeout = self.element_timeout();
        self.driver.wait_for_element(&home::MENU_TOGGLE, timeout)?;
        if self.driver.attribute(&home::MENU_TOGGLE, "title")?.as_deref() == Some(home::MENU_HIDDEN_TITLE) {
            self.driver.click(&home::MENU_TOGGLE)?;
        }
        Ok(())
    }

    /// Switch the home listing to "all records" and the detailed view
    ///
    /// Best effort: a toggle that is missing or already active is left alone.
    pub fn see_detailed(&mut self) {
        let timeout = self.element_timeout();
        for (toggle, text) in [(&home::SEE_ALL, home::SEE_ALL_TEXT), (&home::DETAILED_VIEW, home::DETAILED_VIEW_TEXT)] {
            let result = self.driver.wait_for_element(toggle, timeout).and_then(|()| {
                if self.driver.text(toggle)? == text {
                    self.driver.click(toggle)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                log::warn!("Listing toggle {} skipped: {}", toggle, e);
            }
        }
    }

    /// Select the user's current unit in the header
    pub fn change_unit(&mut self, unit: &str) -> Result<()> {
        let timeout = self.element_timeout();
        self.driver.wait_and_select(&home::UNIT_SELECT, unit, timeout)?;
        log::info!("Changed unit to {}", unit);
        Ok(())
    }

    /// Open a record page
    ///
    /// Indexed records are opened through their listing link; others through the
    /// quick search box, going back to the home page first when the box is not on
    /// the current page.
    pub fn open_record(&mut self, id: &str) -> Result<Record> {
        if let Some(record) = self.registry.get(id) {
            if let Some(link) = record.link.clone() {
                let mut record = record.clone();
                self.go(&link)?;
                record.link = Some(self.config.absolute_url(&link));
                log::debug!("Opened record {} from the registry", id);
                return Ok(record);
            }
        }

        if !self.driver.element_exists(&home::QUICK_SEARCH)? {
            self.go_to_init_page()?;
        }
        let timeout = self.element_timeout();
        self.driver.wait_and_fill(&home::QUICK_SEARCH, id, timeout)?;
        self.driver.press_enter(&home::QUICK_SEARCH)?;
        expect_title(&self.driver, &self.config.titles.record, timeout)?;

        let link = self.driver.current_url()?;
        log::debug!("Opened record {} by quick search", id);
        Ok(Record::new(id).with_link(link))
    }

    /// Update one tag of an indexed record, if it is indexed
    pub fn update_tag(&mut self, id: &str, key: &str, value: &str) {
        if let Some(record) = self.registry.get_mut(id) {
            record.set_tag(key, value);
        }
    }

    /// Fail with `WrongPageState` unless the current page is a record page
    pub fn require_record_page(&self) -> Result<()> {
        let actual = self.driver.title()?;
        if actual == self.config.titles.record {
            Ok(())
        } else {
            Err(SeiError::WrongPageState { expected: self.config.titles.record.clone(), actual })
        }
    }
}

/// Wait for the page title, reporting the page actually shown when it never appears
pub fn expect_title<D: PageDriver + ?Sized>(driver: &D, title: &str, timeout: Duration) -> Result<()> {
    match driver.wait_for_title(title, timeout) {
        Ok(()) => Ok(()),
        Err(SeiError::Timeout(_)) => {
            Err(SeiError::WrongPageState { expected: title.to_string(), actual: driver.title().unwrap_or_default() })
        }
        Err(e) => Err(e),
    }
}
