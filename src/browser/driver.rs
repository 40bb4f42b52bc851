use crate::error::{Result, SeiError};
use crate::locators::Locator;
use headless_chrome::util::Wait;
use std::time::Duration;

/// Opaque identifier of a browser window (a CDP target id for Chrome)
pub type WindowHandle = String;

/// Poll `predicate` every `interval` until it yields a value or `timeout` expires
pub fn poll_until<T>(timeout: Duration, interval: Duration, predicate: impl FnMut() -> Option<T>) -> Option<T> {
    Wait::new(timeout, interval).until(predicate).ok()
}

/// Primitive operations on the single browser cursor (current window + current frame)
///
/// Element operations act on the current frame of the current window and fail
/// immediately when the element is absent; the provided `wait_*` methods add the
/// bounded wait. Switching windows resets the frame to the top-level document.
pub trait PageDriver {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&self) -> Result<String>;

    /// Title of the top-level document of the current window
    fn title(&self) -> Result<String>;

    /// HTML of the current frame
    fn page_source(&self) -> Result<String>;

    /// Whether the current frame's document has finished loading
    fn is_loaded(&self) -> Result<bool>;

    /// Enter a child frame of the top-level document, identified by id, name or CSS selector
    fn switch_to_frame(&mut self, frame: &str, timeout: Duration) -> Result<()>;

    fn switch_to_default_content(&mut self) -> Result<()>;

    fn current_frame(&self) -> Option<String>;

    fn element_exists(&self, locator: &Locator) -> Result<bool>;

    fn click(&mut self, locator: &Locator) -> Result<()>;

    /// Replace the value of a form field
    fn fill(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Focus the element and press Enter
    fn press_enter(&mut self, locator: &Locator) -> Result<()>;

    /// Select the `<option>` whose visible text equals `text`
    fn select_by_text(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Visible text of every `<option>` of a `<select>`, in document order
    fn select_options(&self, locator: &Locator) -> Result<Vec<String>>;

    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

    fn text(&self, locator: &Locator) -> Result<String>;

    /// Checked state of a checkbox or radio button
    fn is_selected(&self, locator: &Locator) -> Result<bool>;

    /// Evaluate a script in the window of the current frame
    fn execute_script(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Make `confirm`/`alert` dialogs in the current frame resolve as accepted
    fn accept_dialogs(&mut self) -> Result<()>;

    fn current_window(&self) -> Result<WindowHandle>;

    fn window_handles(&self) -> Result<Vec<WindowHandle>>;

    /// Open `url` in a new window and focus it
    fn open_window(&mut self, url: &str) -> Result<WindowHandle>;

    fn switch_to_window(&mut self, handle: &str) -> Result<()>;

    /// Close the current window; focus must be restored with [`PageDriver::switch_to_window`]
    fn close_window(&mut self) -> Result<()>;

    /// Attach a local file to a file input
    fn upload_file(&mut self, locator: &Locator, path: &str) -> Result<()>;

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Change the polling interval of every bounded wait
    fn set_poll_interval(&mut self, poll: Duration);

    fn wait_for_element(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        poll_until(timeout, self.poll_interval(), || match self.element_exists(locator) {
            Ok(true) => Some(()),
            Ok(false) => None,
            Err(e) => {
                log::debug!("Probe for {} failed: {}", locator, e);
                None
            }
        })
        .ok_or_else(|| SeiError::ElementTimeout(locator.to_string()))
    }

    fn wait_and_click(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_for_element(locator, timeout)?;
        self.click(locator)
    }

    fn wait_and_fill(&mut self, locator: &Locator, text: &str, timeout: Duration) -> Result<()> {
        self.wait_for_element(locator, timeout)?;
        self.fill(locator, text)
    }

    fn wait_and_select(&mut self, locator: &Locator, text: &str, timeout: Duration) -> Result<()> {
        self.wait_for_element(locator, timeout)?;
        self.select_by_text(locator, text)
    }

    /// Wait until the top-level title equals `title`
    fn wait_for_title(&self, title: &str, timeout: Duration) -> Result<()> {
        poll_until(timeout, self.poll_interval(), || match self.title() {
            Ok(current) if current == title => Some(()),
            _ => None,
        })
        .ok_or_else(|| SeiError::Timeout(format!("page titled '{}'", title)))
    }

    /// Wait for a window that is not in `known` to appear
    fn wait_for_new_window(&self, known: &[WindowHandle], timeout: Duration) -> Result<WindowHandle> {
        poll_until(timeout, self.poll_interval(), || {
            self.window_handles().ok()?.into_iter().find(|handle| !known.contains(handle))
        })
        .ok_or_else(|| SeiError::Timeout("a new window".to_string()))
    }
}
