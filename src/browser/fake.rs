//! Scripted in-memory [`PageDriver`] for unit tests
//!
//! Pages are registered by URL with a title, a top-level HTML body and named frame
//! bodies. Element presence is decided by parsing the current frame's HTML, and
//! clicks, selections, Enter presses and scripts can be wired to reactions
//! (navigate, open a popup, close the current window). Every element action counts
//! as one step; `fail_at_step(n)` makes step `n` fail with `ElementTimeout`.

use crate::browser::driver::{PageDriver, WindowHandle};
use crate::error::{Result, SeiError};
use crate::locators::{By, Locator};
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub html: String,
    pub frames: HashMap<String, String>,
    /// Top-level HTML served while the page is still loading
    pub partial: Option<String>,
    /// Readiness checks answered "loading" after each navigation
    pub loading_checks: usize,
}

impl FakePage {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self { title: title.into(), html: html.into(), ..Self::default() }
    }

    /// Serve `partial` until `checks` readiness checks have reported the page as loading
    pub fn loading_first(mut self, partial: impl Into<String>, checks: usize) -> Self {
        self.partial = Some(partial.into());
        self.loading_checks = checks;
        self
    }

    pub fn with_frame(mut self, name: impl Into<String>, html: impl Into<String>) -> Self {
        self.frames.insert(name.into(), html.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum Reaction {
    /// Load another page in the current window
    Navigate(String),
    /// Open a popup without moving focus
    OpenWindow(String),
    /// Load the page listed for the text last filled into `input`, staying put for other texts
    Search { input: String, results: HashMap<String, String> },
    /// Close the current window
    CloseWindow,
    /// Fail the triggering action
    Fail(SeiError),
}

#[derive(Default)]
pub struct FakeDriver {
    pages: HashMap<String, FakePage>,
    windows: IndexMap<WindowHandle, String>,
    current: WindowHandle,
    frame: Option<String>,
    reactions: HashMap<String, Reaction>,
    values: HashMap<String, String>,
    toggled: HashSet<String>,
    uploads: Vec<(String, String)>,
    log: Vec<String>,
    steps: usize,
    fail_at: Option<usize>,
    next_handle: usize,
    poll: Duration,
    load_checks: Cell<usize>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, url: impl Into<String>, page: FakePage) {
        self.pages.insert(url.into(), page);
    }

    /// Replace the HTML of a registered page (or of one of its frames)
    pub fn set_html(&mut self, url: &str, frame: Option<&str>, html: impl Into<String>) {
        if let Some(page) = self.pages.get_mut(url) {
            match frame {
                Some(name) => {
                    page.frames.insert(name.to_string(), html.into());
                }
                None => page.html = html.into(),
            }
        }
    }

    /// Open the first window at `url`
    pub fn start_at(&mut self, url: &str) {
        let handle = self.new_handle();
        self.windows.insert(handle.clone(), url.to_string());
        self.current = handle;
    }

    pub fn on_click(&mut self, locator: &Locator, reaction: Reaction) {
        self.reactions.insert(format!("click {}", locator), reaction);
    }

    pub fn on_enter(&mut self, locator: &Locator, reaction: Reaction) {
        self.reactions.insert(format!("enter {}", locator), reaction);
    }

    pub fn on_select(&mut self, locator: &Locator, text: &str, reaction: Reaction) {
        self.reactions.insert(format!("select {}={}", locator, text), reaction);
    }

    pub fn on_script(&mut self, script: &str, reaction: Reaction) {
        self.reactions.insert(format!("script {}", script), reaction);
    }

    /// Make the `step`-th element action (0-based) fail with `ElementTimeout`
    pub fn fail_at_step(&mut self, step: usize) {
        self.fail_at = Some(step);
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn logged(&self, entry: &str) -> bool {
        self.log.iter().any(|e| e == entry)
    }

    /// Last value filled into `locator`
    pub fn value_of(&self, locator: &Locator) -> Option<&str> {
        self.values.get(&locator.to_string()).map(String::as_str)
    }

    pub fn uploads(&self) -> &[(String, String)] {
        &self.uploads
    }

    fn new_handle(&mut self) -> WindowHandle {
        let handle = format!("w{}", self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn current_url_ref(&self) -> Result<&str> {
        self.windows
            .get(&self.current)
            .map(String::as_str)
            .ok_or_else(|| SeiError::TabOperationFailed(format!("Window {} is closed", self.current)))
    }

    fn current_page(&self) -> Result<&FakePage> {
        let url = self.current_url_ref()?;
        self.pages.get(url).ok_or_else(|| SeiError::NavigationFailed(format!("No page at {}", url)))
    }

    fn current_html(&self) -> Result<String> {
        let page = self.current_page()?;
        match &self.frame {
            None => match &page.partial {
                Some(partial) if self.load_checks.get() < page.loading_checks => Ok(partial.clone()),
                _ => Ok(page.html.clone()),
            },
            Some(name) => page
                .frames
                .get(name)
                .cloned()
                .ok_or_else(|| SeiError::DomParseFailed(format!("No frame {}", name))),
        }
    }

    fn with_element<T>(&self, locator: &Locator, f: impl FnOnce(ElementRef<'_>) -> T) -> Result<T> {
        let html = Html::parse_document(&self.current_html()?);
        let element = find(&html, locator).ok_or_else(|| SeiError::NotFound(format!("element {}", locator)))?;
        Ok(f(element))
    }

    /// Count an element action, failing it when it is the configured step
    fn step(&mut self, locator: &Locator) -> Result<()> {
        let index = self.steps;
        self.steps += 1;
        if self.fail_at == Some(index) {
            return Err(SeiError::ElementTimeout(locator.to_string()));
        }
        if !self.element_exists(locator)? {
            return Err(SeiError::NotFound(format!("element {}", locator)));
        }
        Ok(())
    }

    fn react(&mut self, key: &str) -> Result<()> {
        let Some(reaction) = self.reactions.get(key).cloned() else {
            return Ok(());
        };
        match reaction {
            Reaction::Navigate(url) => self.navigate(&url),
            Reaction::OpenWindow(url) => {
                let handle = self.new_handle();
                self.windows.insert(handle, url);
                Ok(())
            }
            Reaction::Search { input, results } => {
                let target = self.values.get(&input).and_then(|term| results.get(term)).cloned();
                match target {
                    Some(url) => self.navigate(&url),
                    None => Ok(()),
                }
            }
            Reaction::CloseWindow => self.close_window(),
            Reaction::Fail(e) => Err(e),
        }
    }
}

fn find<'a>(html: &'a Html, locator: &Locator) -> Option<ElementRef<'a>> {
    match locator.by {
        By::LinkText | By::PartialLinkText => {
            let anchors = Selector::parse("a").ok()?;
            html.select(&anchors).find(|a| {
                let text = a.text().collect::<String>();
                match locator.by {
                    By::LinkText => text.trim() == locator.value,
                    _ => text.contains(locator.value.as_ref()),
                }
            })
        }
        _ => {
            let selector = Selector::parse(&locator.as_css()?).ok()?;
            html.select(&selector).next()
        }
    }
}

impl PageDriver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        if !self.pages.contains_key(url) {
            return Err(SeiError::NavigationFailed(format!("No page at {}", url)));
        }
        self.log.push(format!("navigate {}", url));
        let current = self.current.clone();
        match self.windows.get_mut(&current) {
            Some(slot) => *slot = url.to_string(),
            None => return Err(SeiError::TabOperationFailed(format!("Window {} is closed", current))),
        }
        self.frame = None;
        self.load_checks.set(0);
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        self.current_url_ref().map(str::to_string)
    }

    fn title(&self) -> Result<String> {
        Ok(self.current_page()?.title.clone())
    }

    fn page_source(&self) -> Result<String> {
        self.current_html()
    }

    fn is_loaded(&self) -> Result<bool> {
        let page = self.current_page()?;
        let checks = self.load_checks.get() + 1;
        self.load_checks.set(checks);
        Ok(checks > page.loading_checks)
    }

    fn switch_to_frame(&mut self, frame: &str, _timeout: Duration) -> Result<()> {
        if !self.current_page()?.frames.contains_key(frame) {
            return Err(SeiError::Timeout(format!("frame '{}'", frame)));
        }
        self.log.push(format!("frame {}", frame));
        self.frame = Some(frame.to_string());
        Ok(())
    }

    fn switch_to_default_content(&mut self) -> Result<()> {
        self.frame = None;
        Ok(())
    }

    fn current_frame(&self) -> Option<String> {
        self.frame.clone()
    }

    fn element_exists(&self, locator: &Locator) -> Result<bool> {
        let html = Html::parse_document(&self.current_html()?);
        Ok(find(&html, locator).is_some())
    }

    fn click(&mut self, locator: &Locator) -> Result<()> {
        self.step(locator)?;
        let key = locator.to_string();
        if !self.toggled.remove(&key) {
            self.toggled.insert(key);
        }
        self.log.push(format!("click {}", locator));
        self.react(&format!("click {}", locator))
    }

    fn fill(&mut self, locator: &Locator, text: &str) -> Result<()> {
        self.step(locator)?;
        self.values.insert(locator.to_string(), text.to_string());
        self.log.push(format!("fill {}={}", locator, text));
        Ok(())
    }

    fn press_enter(&mut self, locator: &Locator) -> Result<()> {
        self.step(locator)?;
        self.log.push(format!("enter {}", locator));
        self.react(&format!("enter {}", locator))
    }

    fn select_by_text(&mut self, locator: &Locator, text: &str) -> Result<()> {
        self.step(locator)?;
        if !self.select_options(locator)?.iter().any(|option| option == text) {
            return Err(SeiError::NotFound(format!("option '{}' in {}", text, locator)));
        }
        self.log.push(format!("select {}={}", locator, text));
        self.react(&format!("select {}={}", locator, text))
    }

    fn select_options(&self, locator: &Locator) -> Result<Vec<String>> {
        let option = Selector::parse("option").map_err(|e| SeiError::DomParseFailed(e.to_string()))?;
        self.with_element(locator, |select| {
            select.select(&option).map(|o| o.text().collect::<String>().trim().to_string()).collect()
        })
    }

    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        self.with_element(locator, |element| element.value().attr(name).map(str::to_string))
    }

    fn text(&self, locator: &Locator) -> Result<String> {
        self.with_element(locator, |element| element.text().collect::<String>().trim().to_string())
    }

    fn is_selected(&self, locator: &Locator) -> Result<bool> {
        let checked = self.with_element(locator, |element| element.value().attr("checked").is_some())?;
        Ok(checked ^ self.toggled.contains(&locator.to_string()))
    }

    fn execute_script(&mut self, script: &str) -> Result<Value> {
        self.log.push(format!("script {}", script));
        self.react(&format!("script {}", script))?;
        Ok(Value::Null)
    }

    fn accept_dialogs(&mut self) -> Result<()> {
        self.log.push("accept dialogs".to_string());
        Ok(())
    }

    fn current_window(&self) -> Result<WindowHandle> {
        Ok(self.current.clone())
    }

    fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.windows.keys().cloned().collect())
    }

    fn open_window(&mut self, url: &str) -> Result<WindowHandle> {
        if !self.pages.contains_key(url) {
            return Err(SeiError::NavigationFailed(format!("No page at {}", url)));
        }
        let handle = self.new_handle();
        self.windows.insert(handle.clone(), url.to_string());
        self.current = handle.clone();
        self.frame = None;
        self.load_checks.set(0);
        self.log.push(format!("open {}", url));
        Ok(handle)
    }

    fn switch_to_window(&mut self, handle: &str) -> Result<()> {
        if !self.windows.contains_key(handle) {
            return Err(SeiError::TabOperationFailed(format!("No window with handle {}", handle)));
        }
        self.current = handle.to_string();
        self.frame = None;
        Ok(())
    }

    fn close_window(&mut self) -> Result<()> {
        let current = self.current.clone();
        self.windows
            .shift_remove(&current)
            .ok_or_else(|| SeiError::TabOperationFailed(format!("Window {} is closed", current)))?;
        self.frame = None;
        self.log.push(format!("close {}", current));
        Ok(())
    }

    fn upload_file(&mut self, locator: &Locator, path: &str) -> Result<()> {
        self.step(locator)?;
        self.uploads.push((locator.to_string(), path.to_string()));
        self.log.push(format!("upload {}={}", locator, path));
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll.max(Duration::from_millis(1))
    }

    fn set_poll_interval(&mut self, poll: Duration) {
        self.poll = poll;
    }
}
