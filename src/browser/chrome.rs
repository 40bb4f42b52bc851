use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::browser::driver::{PageDriver, WindowHandle, poll_until};
use crate::error::{Result, SeiError};
use crate::locators::{By, Locator};
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, Tab};
use serde_json::Value;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Resolves a frame of the top-level document by id, then name, then CSS selector
const FRAME_LOOKUP: &str = r#"(function(sel){
    var f = document.getElementById(sel) || document.getElementsByName(sel)[0];
    if (!f) { try { f = document.querySelector(sel); } catch (e) { f = null; } }
    return f;
})"#;

/// [`PageDriver`] backed by a headless_chrome browser
///
/// Each window is a CDP tab. Frame-scoped operations are evaluated against the
/// frame's `contentDocument`, so only same-origin frames are reachable, which is
/// the case for every frame the portal renders.
pub struct ChromeDriver {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab that currently has the cursor
    tab: Arc<Tab>,

    /// Frame of `tab` that currently has the cursor, `None` for the top-level document
    frame: Option<String>,

    /// Polling interval of bounded waits
    poll: Duration,
}

impl ChromeDriver {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Long-running indexing passes would otherwise hit the 30 second idle default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| SeiError::LaunchFailed(e.to_string()))?;

        let tab = browser.new_tab().map_err(|e| SeiError::LaunchFailed(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(options.default_timeout));

        log::info!("Launched browser (headless: {})", options.headless);
        Ok(Self { browser, tab, frame: None, poll: Duration::from_millis(100) })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect(options.ws_url).map_err(|e| SeiError::ConnectionFailed(e.to_string()))?;

        let tab = match find_active_tab(&browser) {
            Some(tab) => tab,
            None => browser.new_tab().map_err(|e| SeiError::ConnectionFailed(format!("Failed to create tab: {}", e)))?,
        };
        tab.set_default_timeout(Duration::from_millis(options.timeout));

        Ok(Self { browser, tab, frame: None, poll: Duration::from_millis(100) })
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Get the tab that currently has the cursor
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| SeiError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();
        Ok(tabs)
    }

    fn evaluate(&self, js: &str) -> Result<Value> {
        let result = self.tab.evaluate(js, false).map_err(|e| SeiError::EvaluationFailed(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    /// Expression for the document of the current frame (may evaluate to `null`)
    fn document_expr(&self) -> String {
        match &self.frame {
            None => "document".to_string(),
            Some(frame) => format!("(function(){{var f={}({});return f?f.contentDocument:null;}})()", FRAME_LOOKUP, js_string(frame)),
        }
    }

    /// Expression for the window of the current frame (may evaluate to `null`)
    fn window_expr(&self) -> String {
        match &self.frame {
            None => "window".to_string(),
            Some(frame) => format!("(function(){{var f={}({});return f?f.contentWindow:null;}})()", FRAME_LOOKUP, js_string(frame)),
        }
    }

    /// Run `body` with `el` bound to the located element; `NotFound` when it is absent
    fn on_element(&self, locator: &Locator, body: &str) -> Result<Value> {
        let js = format!(
            "(function(){{var d={};if(!d)return null;var el={};if(!el)return null;{}}})()",
            self.document_expr(),
            finder_expr(locator),
            body
        );
        match self.evaluate(&js)? {
            Value::Null => Err(SeiError::NotFound(format!("element {}", locator))),
            value => Ok(value),
        }
    }
}

impl PageDriver for ChromeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        log::debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .map_err(|e| SeiError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?
            .wait_until_navigated()
            .map_err(|e| SeiError::NavigationFailed(format!("Navigation timeout: {}", e)))?;
        self.frame = None;
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn title(&self) -> Result<String> {
        self.tab.get_title().map_err(|e| SeiError::EvaluationFailed(format!("Failed to read title: {}", e)))
    }

    fn page_source(&self) -> Result<String> {
        let js = format!("(function(){{var d={};return d?d.documentElement.outerHTML:null;}})()", self.document_expr());
        match self.evaluate(&js)? {
            Value::String(html) => Ok(html),
            _ => Err(SeiError::DomParseFailed(format!("No document for frame {:?}", self.frame))),
        }
    }

    fn is_loaded(&self) -> Result<bool> {
        let js = format!("(function(){{var d={};return !!(d&&d.readyState==='complete');}})()", self.document_expr());
        Ok(matches!(self.evaluate(&js)?, Value::Bool(true)))
    }

    fn switch_to_frame(&mut self, frame: &str, timeout: Duration) -> Result<()> {
        let check = format!(
            "(function(){{var f={}({});return !!(f&&f.contentDocument&&f.contentDocument.readyState==='complete');}})()",
            FRAME_LOOKUP,
            js_string(frame)
        );
        poll_until(timeout, self.poll, || matches!(self.evaluate(&check), Ok(Value::Bool(true))).then_some(()))
            .ok_or_else(|| SeiError::Timeout(format!("frame '{}'", frame)))?;
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
        let js = format!("(function(){{var d={};if(!d)return false;return !!({});}})()", self.document_expr(), finder_expr(locator));
        Ok(matches!(self.evaluate(&js)?, Value::Bool(true)))
    }

    fn click(&mut self, locator: &Locator) -> Result<()> {
        self.on_element(locator, "el.click();return true;")?;
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, text: &str) -> Result<()> {
        let body = format!(
            "el.focus();el.value={};el.dispatchEvent(new Event('input',{{bubbles:true}}));\
             el.dispatchEvent(new Event('change',{{bubbles:true}}));return true;",
            js_string(text)
        );
        self.on_element(locator, &body)?;
        Ok(())
    }

    fn press_enter(&mut self, locator: &Locator) -> Result<()> {
        self.on_element(locator, "el.focus();return true;")?;
        self.tab
            .press_key("Enter")
            .map_err(|e| SeiError::EvaluationFailed(format!("Failed to press Enter: {}", e)))?;
        Ok(())
    }

    fn select_by_text(&mut self, locator: &Locator, text: &str) -> Result<()> {
        let body = format!(
            "var o=Array.prototype.find.call(el.options||[],function(o){{return o.text.trim()==={};}});\
             if(!o)return false;el.value=o.value;o.selected=true;\
             el.dispatchEvent(new Event('change',{{bubbles:true}}));return true;",
            js_string(text)
        );
        match self.on_element(locator, &body)? {
            Value::Bool(true) => Ok(()),
            _ => Err(SeiError::NotFound(format!("option '{}' in {}", text, locator))),
        }
    }

    fn select_options(&self, locator: &Locator) -> Result<Vec<String>> {
        let body = "return JSON.stringify(Array.prototype.map.call(el.options||[],function(o){return o.text.trim();}));";
        let json = self.on_element(locator, body)?;
        let json = json.as_str().unwrap_or("[]");
        serde_json::from_str(json).map_err(|e| SeiError::EvaluationFailed(format!("Failed to read options: {}", e)))
    }

    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let body = format!("return JSON.stringify(el.getAttribute({}));", js_string(name));
        let json = self.on_element(locator, &body)?;
        let json = json.as_str().unwrap_or("null");
        serde_json::from_str(json).map_err(|e| SeiError::EvaluationFailed(format!("Failed to read attribute: {}", e)))
    }

    fn text(&self, locator: &Locator) -> Result<String> {
        let value = self.on_element(locator, "return (el.textContent||'').trim();")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn is_selected(&self, locator: &Locator) -> Result<bool> {
        let value = self.on_element(locator, "return !!el.checked;")?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn execute_script(&mut self, script: &str) -> Result<Value> {
        let js = format!(
            "(function(){{var w={};if(!w)throw new Error('frame window unavailable');return w.eval({});}})()",
            self.window_expr(),
            js_string(script)
        );
        self.evaluate(&js)
    }

    fn accept_dialogs(&mut self) -> Result<()> {
        let js = format!(
            "(function(){{var ws=[window,{}];ws.forEach(function(w){{if(w){{w.confirm=function(){{return true;}};w.alert=function(){{}};}}}});return true;}})()",
            self.window_expr()
        );
        self.evaluate(&js)?;
        Ok(())
    }

    fn current_window(&self) -> Result<WindowHandle> {
        Ok(self.tab.get_target_id().clone())
    }

    fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.tabs()?.iter().map(|tab| tab.get_target_id().clone()).collect())
    }

    fn open_window(&mut self, url: &str) -> Result<WindowHandle> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| SeiError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        tab.navigate_to(url)
            .map_err(|e| SeiError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?
            .wait_until_navigated()
            .map_err(|e| SeiError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        tab.activate().map_err(|e| SeiError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;

        let handle = tab.get_target_id().clone();
        self.tab = tab;
        self.frame = None;
        Ok(handle)
    }

    fn switch_to_window(&mut self, handle: &str) -> Result<()> {
        let tab = self
            .tabs()?
            .into_iter()
            .find(|tab| tab.get_target_id() == handle)
            .ok_or_else(|| SeiError::TabOperationFailed(format!("No window with handle {}", handle)))?;

        tab.activate().map_err(|e| SeiError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;
        self.tab = tab;
        self.frame = None;
        Ok(())
    }

    fn close_window(&mut self) -> Result<()> {
        self.tab.close(true).map_err(|e| SeiError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        self.frame = None;
        Ok(())
    }

    fn upload_file(&mut self, locator: &Locator, path: &str) -> Result<()> {
        if self.frame.is_some() {
            return Err(SeiError::EvaluationFailed("File upload is only supported in the top-level document".into()));
        }
        let css = locator
            .as_css()
            .ok_or_else(|| SeiError::InvalidOption(format!("{} cannot address a file input", locator)))?;
        let element = self
            .tab
            .find_element(&css)
            .map_err(|e| SeiError::NotFound(format!("Element '{}' not found: {}", css, e)))?;

        self.tab
            .call_method(DOM::SetFileInputFiles {
                files: vec![path.to_string()],
                node_id: None,
                backend_node_id: None,
                object_id: Some(element.remote_object_id.clone()),
            })
            .map_err(|e| SeiError::EvaluationFailed(format!("Failed to attach {}: {}", path, e)))?;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll
    }

    fn set_poll_interval(&mut self, poll: Duration) {
        self.poll = poll;
    }
}

/// Pick the tab that is visible and focused, falling back to any visible tab
fn find_active_tab(browser: &Browser) -> Option<Arc<Tab>> {
    let tabs = browser.get_tabs().lock().ok()?.clone();

    let check = |tab: &Arc<Tab>, js: &str| match tab.evaluate(js, false) {
        Ok(remote_object) => remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false),
        Err(e) => {
            log::debug!("Failed to check tab status: {}", e);
            false
        }
    };

    tabs.iter()
        .find(|tab| check(*tab, "document.visibilityState === 'visible' && document.hasFocus()"))
        .or_else(|| tabs.iter().find(|tab| check(*tab, "document.visibilityState === 'visible'")))
        .cloned()
}

/// Quote a Rust string as a JavaScript string literal
fn js_string(value: &str) -> String {
    Value::from(value).to_string()
}

/// JavaScript expression locating `locator` inside the document bound to `d`
fn finder_expr(locator: &Locator) -> String {
    let value = js_string(&locator.value);
    match locator.by {
        By::Id => format!("d.getElementById({})", value),
        By::Name => format!("d.getElementsByName({})[0]", value),
        By::Css => format!("d.querySelector({})", value),
        By::LinkText => format!(
            "Array.prototype.find.call(d.querySelectorAll('a'),function(a){{return a.textContent.trim()==={};}})",
            value
        ),
        By::PartialLinkText => format!(
            "Array.prototype.find.call(d.querySelectorAll('a'),function(a){{return a.textContent.indexOf({})>=0;}})",
            value
        ),
    }
}
